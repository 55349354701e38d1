pub mod headless;
#[cfg(feature = "sdl2-sys")]
pub mod sdl2;

use std::{fmt, path::Path, str::FromStr, time::Duration};

use crate::{
    controls::Form,
    error::{Error, Result},
    input::InputEvent,
};

/// Choices offered by the main menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuChoice {
    Password,
    WatchIntro,
    SkipIntro,
    Quit,
}

impl FromStr for MenuChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "password" => MenuChoice::Password,
            "intro" => MenuChoice::WatchIntro,
            "skip" => MenuChoice::SkipIntro,
            "quit" => MenuChoice::Quit,
            _ => {
                return Err(Error::Config(format!(
                    "unknown menu choice {:?}, expected password, intro, skip or quit",
                    s
                )))
            }
        })
    }
}

/// Blocking dialogs the game asks the host to run. Forms are passed along
/// for hosts that want to lay the dialog out like the game did.
pub enum Modal<'a> {
    MainMenu { form: &'a Form },
    Password { form: &'a Form },
    Message { text: &'a str, actor: &'a str },
    Death { form: &'a Form },
}

impl<'a> fmt::Display for Modal<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Modal::MainMenu { .. } => write!(f, "main menu"),
            Modal::Password { .. } => write!(f, "password"),
            Modal::Message { text, actor } => write!(f, "{}: {}", actor, text),
            Modal::Death { .. } => write!(f, "death"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalResult {
    Menu(MenuChoice),
    Password(String),
    Dismissed,
}

/// Everything the game needs from the platform.
pub trait Sys {
    /// Next pending input event, or `None` once the queue is drained for
    /// this frame.
    fn poll_event(&mut self) -> Option<InputEvent>;
    /// Runs `modal` to completion.
    fn show_modal(&mut self, modal: &Modal) -> Result<ModalResult>;
    /// Shows a frame of `width`x`height` `0x00RRGGBB` pixels, `stride` pixels
    /// per row.
    fn present(&mut self, pixels: &[u32], width: usize, height: usize, stride: usize)
        -> Result<()>;
    fn play_sound(&mut self, path: &Path) -> Result<()>;
    fn delay(&mut self, duration: Duration);
}
