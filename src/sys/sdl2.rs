use std::{path::Path, thread, time::Duration};

use log::{debug, warn};
use sdl2::{
    audio::{AudioCVT, AudioQueue, AudioSpecDesired, AudioSpecWAV},
    event::Event,
    keyboard::Keycode,
    messagebox::{
        show_message_box, show_simple_message_box, ButtonData, ClickedButton,
        MessageBoxButtonFlag, MessageBoxFlag,
    },
    mouse::MouseButton,
    pixels::PixelFormatEnum,
    render::{Canvas, TextureCreator},
    video::{Window, WindowContext},
    AudioSubsystem, EventPump, VideoSubsystem,
};

use super::{MenuChoice, Modal, ModalResult, Sys};
use crate::{
    config::{SCREEN_HEIGHT, SCREEN_WIDTH},
    error::{Error, Result},
    gfx::Point,
    input::{InputEvent, Key},
};

const WINDOW_TITLE: &str = "Arthur Yahtzee";
const AUDIO_FREQUENCY: i32 = 22050;

fn host_error<E: std::fmt::Display>(what: &str) -> impl FnOnce(E) -> Error + '_ {
    move |e| Error::Host(format!("{}: {}", what, e))
}

pub struct SDL2Sys {
    video: VideoSubsystem,
    canvas: Canvas<Window>,
    texture_creator: TextureCreator<WindowContext>,
    events: EventPump,
    audio: Option<AudioSubsystem>,
    // Keeps the last sound playing.
    playing: Option<AudioQueue<i16>>,
}

impl SDL2Sys {
    pub fn new() -> Result<Self> {
        let context = sdl2::init().map_err(host_error("failed to initialize SDL"))?;
        let video = context
            .video()
            .map_err(host_error("failed to initialize SDL video"))?;
        let window = video
            .window(WINDOW_TITLE, SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32)
            .position_centered()
            .build()
            .map_err(host_error("failed to create window"))?;
        let canvas = window
            .into_canvas()
            .build()
            .map_err(host_error("failed to obtain canvas"))?;
        let texture_creator = canvas.texture_creator();
        let events = context
            .event_pump()
            .map_err(host_error("failed to obtain event pump"))?;

        // The game is playable without sound.
        let audio = context
            .audio()
            .map_err(|e| warn!("no audio: {}", e))
            .ok();

        Ok(SDL2Sys {
            video,
            canvas,
            texture_creator,
            events,
            audio,
            playing: None,
        })
    }

    fn show_buttons(
        &self,
        title: &str,
        message: &str,
        buttons: &[(i32, &str)],
    ) -> Result<Option<i32>> {
        let buttons: Vec<_> = buttons
            .iter()
            .map(|&(button_id, text)| ButtonData {
                flags: MessageBoxButtonFlag::NOTHING,
                button_id,
                text,
            })
            .collect();

        let clicked = show_message_box(
            MessageBoxFlag::INFORMATION,
            &buttons,
            title,
            message,
            self.canvas.window(),
            None,
        )
        .map_err(host_error("cannot show dialog"))?;

        Ok(match clicked {
            ClickedButton::CustomButton(button) => Some(button.button_id),
            ClickedButton::CloseButton => None,
        })
    }

    fn show_text(&self, title: &str, message: &str) -> Result<()> {
        show_simple_message_box(
            MessageBoxFlag::INFORMATION,
            title,
            message,
            self.canvas.window(),
        )
        .map_err(host_error("cannot show dialog"))
    }

    /// Collects typed text until Return. Escape or closing the window
    /// cancels.
    fn read_password(&mut self) -> Result<Option<String>> {
        let text_input = self.video.text_input();
        text_input.start();
        let mut password = String::new();

        let answer = 'input: loop {
            for event in self.events.poll_iter() {
                match event {
                    Event::Quit { .. } => break 'input None,
                    Event::TextInput { text, .. } => password.push_str(&text),
                    Event::KeyDown {
                        keycode: Some(key), ..
                    } => match key {
                        Keycode::Return | Keycode::KpEnter => break 'input Some(password),
                        Keycode::Escape => break 'input None,
                        Keycode::Backspace => {
                            password.pop();
                        }
                        _ => (),
                    },
                    _ => (),
                }
            }

            let title = format!("{} - password: {}_", WINDOW_TITLE, password);
            self.canvas
                .window_mut()
                .set_title(&title)
                .map_err(host_error("cannot set window title"))?;
            thread::sleep(Duration::from_millis(10));
        };

        text_input.stop();
        self.canvas
            .window_mut()
            .set_title(WINDOW_TITLE)
            .map_err(host_error("cannot set window title"))?;
        Ok(answer)
    }
}

fn map_key(key: Keycode) -> Option<Key> {
    Some(match key {
        Keycode::Left => Key::Left,
        Keycode::Right => Key::Right,
        Keycode::D => Key::D,
        Keycode::I => Key::I,
        Keycode::P => Key::P,
        Keycode::Q => Key::Q,
        Keycode::S => Key::S,
        _ => return None,
    })
}

impl Sys for SDL2Sys {
    fn poll_event(&mut self) -> Option<InputEvent> {
        while let Some(event) = self.events.poll_event() {
            let event = match event {
                Event::Quit { .. } => InputEvent::Quit,
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => match map_key(key) {
                    Some(key) => InputEvent::KeyDown(key),
                    None => continue,
                },
                Event::MouseMotion { x, y, .. } => InputEvent::MouseMove(Point::new(x, y)),
                Event::MouseButtonDown {
                    mouse_btn: MouseButton::Left,
                    x,
                    y,
                    ..
                } => InputEvent::MouseDown(Point::new(x, y)),
                _ => continue,
            };
            return Some(event);
        }
        None
    }

    fn show_modal(&mut self, modal: &Modal) -> Result<ModalResult> {
        debug!("modal {}", modal);
        match modal {
            Modal::MainMenu { form } => {
                let choices = [
                    (0, "Password"),
                    (1, "Watch intro"),
                    (2, "Skip intro"),
                    (3, "Quit"),
                ];
                let clicked = self.show_buttons(&form.caption.caption, WINDOW_TITLE, &choices)?;
                let choice = match clicked {
                    Some(0) => MenuChoice::Password,
                    Some(1) => MenuChoice::WatchIntro,
                    Some(2) => MenuChoice::SkipIntro,
                    _ => MenuChoice::Quit,
                };
                Ok(ModalResult::Menu(choice))
            }
            Modal::Password { .. } => Ok(match self.read_password()? {
                Some(password) => ModalResult::Password(password),
                None => ModalResult::Dismissed,
            }),
            Modal::Message { text, actor } => {
                self.show_text(actor, text)?;
                Ok(ModalResult::Dismissed)
            }
            Modal::Death { form } => {
                self.show_text(&form.caption.caption, "You are dead.")?;
                Ok(ModalResult::Dismissed)
            }
        }
    }

    fn present(
        &mut self,
        pixels: &[u32],
        width: usize,
        height: usize,
        stride: usize,
    ) -> Result<()> {
        let mut texture = self
            .texture_creator
            .create_texture_streaming(PixelFormatEnum::RGB888, width as u32, height as u32)
            .map_err(host_error("cannot create texture"))?;

        let bytes: Vec<u8> = pixels.iter().flat_map(|p| p.to_ne_bytes().to_vec()).collect();
        texture
            .update(None, &bytes, stride * 4)
            .map_err(host_error("cannot update texture"))?;

        self.canvas.clear();
        self.canvas
            .copy(&texture, None, None)
            .map_err(host_error("cannot copy texture"))?;
        self.canvas.present();
        Ok(())
    }

    fn play_sound(&mut self, path: &Path) -> Result<()> {
        let audio = match &self.audio {
            Some(audio) => audio,
            None => return Ok(()),
        };

        let wav = AudioSpecWAV::load_wav(path)
            .map_err(|e| Error::Host(format!("cannot load {}: {}", path.display(), e)))?;
        let desired = AudioSpecDesired {
            freq: Some(AUDIO_FREQUENCY),
            channels: Some(1),
            samples: None,
        };
        let queue = audio
            .open_queue::<i16, _>(None, &desired)
            .map_err(host_error("cannot open audio device"))?;

        let spec = queue.spec();
        let cvt = AudioCVT::new(
            wav.format,
            wav.channels,
            wav.freq,
            spec.format,
            spec.channels,
            spec.freq,
        )
        .map_err(host_error("cannot convert sound"))?;
        let data = cvt.convert(wav.buffer().to_vec());
        let samples: Vec<i16> = data
            .chunks_exact(2)
            .map(|c| i16::from_ne_bytes([c[0], c[1]]))
            .collect();

        if !queue.queue(&samples) {
            return Err(Error::Host(format!("cannot queue {}", path.display())));
        }
        queue.resume();
        self.playing = Some(queue);
        Ok(())
    }

    fn delay(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}
