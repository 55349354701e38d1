//! A host without window nor sound, fed from a script. Used to run the game
//! from the command line and by tests.

use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
    time::Duration,
};

use log::{debug, info, trace};

use super::{MenuChoice, Modal, ModalResult, Sys};
use crate::{
    error::{Error, Result},
    input::InputEvent,
};

enum Scripted {
    Event(InputEvent),
    EndFrame,
}

pub struct HeadlessSys {
    script: VecDeque<Scripted>,
    answers: VecDeque<ModalResult>,
    /// Answer to the main menu once `answers` is exhausted.
    menu_choice: MenuChoice,
    frames_left: Option<usize>,

    frames: usize,
    frame: Vec<u32>,
    width: usize,
    height: usize,
    modals: Vec<String>,
    sounds: Vec<PathBuf>,
    delayed: Duration,
}

impl Default for HeadlessSys {
    fn default() -> Self {
        HeadlessSys {
            script: VecDeque::new(),
            answers: VecDeque::new(),
            menu_choice: MenuChoice::SkipIntro,
            frames_left: None,
            frames: 0,
            frame: Vec::new(),
            width: 0,
            height: 0,
            modals: Vec::new(),
            sounds: Vec::new(),
            delayed: Duration::from_millis(0),
        }
    }
}

impl HeadlessSys {
    pub fn new() -> Self {
        Default::default()
    }

    /// Requests to quit once `frames` frames have been presented.
    pub fn with_frame_limit(mut self, frames: usize) -> Self {
        self.frames_left = Some(frames);
        self
    }

    pub fn with_menu_choice(mut self, choice: MenuChoice) -> Self {
        self.menu_choice = choice;
        self
    }

    /// Queues an event for the current scripted frame.
    pub fn push_event(&mut self, event: InputEvent) -> &mut Self {
        self.script.push_back(Scripted::Event(event));
        self
    }

    /// Ends the current scripted frame; later events are delivered on the
    /// next one.
    pub fn end_frame(&mut self) -> &mut Self {
        self.script.push_back(Scripted::EndFrame);
        self
    }

    /// Queues the answer to the next modal.
    #[cfg(test)]
    pub fn push_answer(&mut self, answer: ModalResult) -> &mut Self {
        self.answers.push_back(answer);
        self
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    #[cfg(test)]
    pub fn last_frame(&self) -> &[u32] {
        &self.frame
    }

    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.frame[y * self.width + x]
    }

    /// Every modal shown so far, as text.
    pub fn modals(&self) -> &[String] {
        &self.modals
    }

    pub fn sounds(&self) -> &[PathBuf] {
        &self.sounds
    }

    pub fn delayed(&self) -> Duration {
        self.delayed
    }

    /// Writes the last presented frame as a bitmap.
    pub fn save_screenshot(&self, path: &Path) -> Result<()> {
        let mut rgb = Vec::with_capacity(self.frame.len() * 3);
        for p in &self.frame {
            rgb.extend_from_slice(&[(p >> 16) as u8, (p >> 8) as u8, *p as u8]);
        }
        let img = image::RgbImage::from_raw(self.width as u32, self.height as u32, rgb)
            .ok_or_else(|| Error::Host("no frame to save".to_string()))?;
        img.save_with_format(path, image::ImageFormat::Bmp)
            .map_err(|e| Error::Host(format!("cannot save {}: {}", path.display(), e)))?;
        info!("Screenshot saved to {}", path.display());
        Ok(())
    }
}

impl Sys for HeadlessSys {
    fn poll_event(&mut self) -> Option<InputEvent> {
        if self.frames_left == Some(0) {
            return Some(InputEvent::Quit);
        }

        match self.script.pop_front() {
            Some(Scripted::Event(event)) => {
                debug!("event {:?}", event);
                Some(event)
            }
            Some(Scripted::EndFrame) | None => None,
        }
    }

    fn show_modal(&mut self, modal: &Modal) -> Result<ModalResult> {
        debug!("modal {}", modal);
        if let Modal::MainMenu { form } | Modal::Password { form } | Modal::Death { form } = modal {
            trace!("modal form {:?}", form.caption.caption);
        }
        self.modals.push(modal.to_string());

        let answer = match self.answers.pop_front() {
            Some(answer) => answer,
            None => match modal {
                Modal::MainMenu { .. } => ModalResult::Menu(self.menu_choice),
                Modal::Password { .. } => ModalResult::Password(String::new()),
                Modal::Message { .. } | Modal::Death { .. } => ModalResult::Dismissed,
            },
        };
        Ok(answer)
    }

    fn present(
        &mut self,
        pixels: &[u32],
        width: usize,
        height: usize,
        stride: usize,
    ) -> Result<()> {
        self.frame.clear();
        for row in pixels.chunks(stride).take(height) {
            self.frame.extend_from_slice(&row[..width]);
        }
        self.width = width;
        self.height = height;
        self.frames += 1;
        if let Some(left) = self.frames_left.as_mut() {
            *left = left.saturating_sub(1);
        }
        Ok(())
    }

    fn play_sound(&mut self, path: &Path) -> Result<()> {
        debug!("sound {}", path.display());
        self.sounds.push(path.to_path_buf());
        Ok(())
    }

    fn delay(&mut self, duration: Duration) {
        self.delayed += duration;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{gfx::Point, input::Key};

    #[test]
    fn events_are_delivered_per_frame() {
        let mut sys = HeadlessSys::new();
        sys.push_event(InputEvent::KeyDown(Key::I))
            .push_event(InputEvent::MouseMove(Point::new(1, 2)))
            .end_frame()
            .push_event(InputEvent::KeyDown(Key::S));

        assert_eq!(sys.poll_event(), Some(InputEvent::KeyDown(Key::I)));
        assert_eq!(sys.poll_event(), Some(InputEvent::MouseMove(Point::new(1, 2))));
        assert_eq!(sys.poll_event(), None);
        assert_eq!(sys.poll_event(), Some(InputEvent::KeyDown(Key::S)));
        assert_eq!(sys.poll_event(), None);
    }

    #[test]
    fn frame_limit_quits() {
        let mut sys = HeadlessSys::new().with_frame_limit(1);
        assert_eq!(sys.poll_event(), None);
        sys.present(&[0; 4], 2, 2, 2).unwrap();
        assert_eq!(sys.poll_event(), Some(InputEvent::Quit));
    }

    #[test]
    fn modal_answers() {
        let mut sys = HeadlessSys::new().with_menu_choice(MenuChoice::Quit);
        sys.push_answer(ModalResult::Password("CLIMAX".to_string()));

        let form = crate::controls::Form::default();
        assert_eq!(
            sys.show_modal(&Modal::Password { form: &form }).unwrap(),
            ModalResult::Password("CLIMAX".to_string())
        );
        assert_eq!(
            sys.show_modal(&Modal::MainMenu { form: &form }).unwrap(),
            ModalResult::Menu(MenuChoice::Quit)
        );
        assert_eq!(
            sys.show_modal(&Modal::Message {
                text: "DING-DONG",
                actor: "Door"
            })
            .unwrap(),
            ModalResult::Dismissed
        );
        assert_eq!(sys.modals(), &["password", "main menu", "Door: DING-DONG"]);
    }

    #[test]
    fn menu_choices_by_name() {
        assert_eq!("Password".parse::<MenuChoice>().unwrap(), MenuChoice::Password);
        assert_eq!("intro".parse::<MenuChoice>().unwrap(), MenuChoice::WatchIntro);
        assert_eq!("skip".parse::<MenuChoice>().unwrap(), MenuChoice::SkipIntro);
        assert_eq!("QUIT".parse::<MenuChoice>().unwrap(), MenuChoice::Quit);
        assert!(matches!("later".parse::<MenuChoice>(), Err(Error::Config(_))));
    }

    #[test]
    fn present_honors_stride() {
        let mut sys = HeadlessSys::new();
        sys.present(&[1, 2, 9, 3, 4, 9], 2, 2, 3).unwrap();
        assert_eq!(sys.last_frame(), &[1, 2, 3, 4]);
        assert_eq!(sys.pixel(1, 1), 4);
    }

    #[test]
    fn screenshot() {
        let mut sys = HeadlessSys::new();
        sys.present(&[0x00ff_0000, 0x0000_ff00], 2, 1, 2).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.bmp");
        sys.save_screenshot(&path).unwrap();

        let picture = crate::res::decode_bitmap(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(picture.pixels, vec![0x00ff_0000, 0x0000_ff00]);
    }
}
