use std::str::FromStr;

use crate::{
    error::{Error, Result},
    gfx::Point,
};

/// Keys the game reacts to. Hosts drop every other key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    D,
    I,
    P,
    Q,
    S,
}

impl FromStr for Key {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "left" => Key::Left,
            "right" => Key::Right,
            "d" => Key::D,
            "i" => Key::I,
            "p" => Key::P,
            "q" => Key::Q,
            "s" => Key::S,
            _ => return Err(Error::Config(format!("unknown key {:?}", s))),
        })
    }
}

/// Input events as delivered by the host, in screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Quit,
    KeyDown(Key),
    MouseMove(Point<i32>),
    MouseDown(Point<i32>),
}

fn parse_point(s: &str) -> Option<Point<i32>> {
    let (x, y) = s.split_once(',')?;
    Some(Point::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

/// Parses the event syntax of headless scripts: `quit`, `key:<name>`,
/// `move:<x>,<y>` and `click:<x>,<y>`.
impl FromStr for InputEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::Config(format!("invalid event {:?}", s));

        let (kind, arg) = match s.split_once(':') {
            Some((kind, arg)) => (kind, Some(arg)),
            None => (s, None),
        };
        match (kind.to_ascii_lowercase().as_str(), arg) {
            ("quit", None) => Ok(InputEvent::Quit),
            ("key", Some(key)) => Ok(InputEvent::KeyDown(key.parse()?)),
            ("move", Some(p)) => parse_point(p)
                .map(InputEvent::MouseMove)
                .ok_or_else(invalid),
            ("click", Some(p)) => parse_point(p)
                .map(InputEvent::MouseDown)
                .ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}
