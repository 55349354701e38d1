use log::debug;

use crate::error::Result;

/// A message shown in a modal dialog, attributed to `actor`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub actor: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    Dialog { text: String, actor: String },
    /// Hide the image with this name.
    Hide(String),
    /// Show the image with this name.
    Show(String),
}

impl Op {
    pub fn dialog(text: &str, actor: &str) -> Op {
        Op::Dialog {
            text: text.to_string(),
            actor: actor.to_string(),
        }
    }

    pub fn hide(name: &str) -> Op {
        Op::Hide(name.to_string())
    }

    pub fn show(name: &str) -> Op {
        Op::Show(name.to_string())
    }
}

pub type OpList = Vec<Op>;

/// What ops act upon.
pub trait OpTarget {
    /// Sets the visibility of a named image. Fails if no image has that name.
    fn set_image_visible(&mut self, name: &str, visible: bool) -> Result<()>;
    /// Queues `message` to be displayed once the current ops are done.
    fn queue_message(&mut self, message: Message);
    fn request_redraw(&mut self);
}

fn op_dialog(target: &mut dyn OpTarget, text: &str, actor: &str) -> Result<()> {
    target.queue_message(Message {
        text: text.to_string(),
        actor: actor.to_string(),
    });
    Ok(())
}

fn op_hide(target: &mut dyn OpTarget, name: &str) -> Result<()> {
    target.set_image_visible(name, false)
}

fn op_show(target: &mut dyn OpTarget, name: &str) -> Result<()> {
    target.set_image_visible(name, true)
}

/// Runs `ops` in order, then requests a single redraw of the active forms.
/// An empty list does nothing.
pub fn execute(ops: &[Op], target: &mut dyn OpTarget) -> Result<()> {
    if ops.is_empty() {
        return Ok(());
    }

    for op in ops {
        debug!("op {:?}", op);
        match op {
            Op::Dialog { text, actor } => op_dialog(target, text, actor)?,
            Op::Hide(name) => op_hide(target, name)?,
            Op::Show(name) => op_show(target, name)?,
        }
    }

    target.request_redraw();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{controls::ControlKind, error::Error};
    use std::collections::HashMap;

    #[derive(Default)]
    struct Recorder {
        images: HashMap<String, bool>,
        messages: Vec<Message>,
        redraws: usize,
    }

    impl OpTarget for Recorder {
        fn set_image_visible(&mut self, name: &str, visible: bool) -> Result<()> {
            match self.images.get_mut(name) {
                Some(v) => {
                    *v = visible;
                    Ok(())
                }
                None => Err(Error::missing(ControlKind::Image, name)),
            }
        }

        fn queue_message(&mut self, message: Message) {
            self.messages.push(message);
        }

        fn request_redraw(&mut self) {
            self.redraws += 1;
        }
    }

    fn recorder() -> Recorder {
        let mut r = Recorder::default();
        r.images.insert("Image1".to_string(), true);
        r.images.insert("Image2".to_string(), false);
        r
    }

    #[test]
    fn visibility_toggle_redraws_once() {
        let mut target = recorder();
        execute(&[Op::hide("Image1"), Op::show("Image2")], &mut target).unwrap();

        assert_eq!(target.images["Image1"], false);
        assert_eq!(target.images["Image2"], true);
        assert_eq!(target.redraws, 1);
        assert!(target.messages.is_empty());
    }

    #[test]
    fn dialogs_keep_order_and_redraw_once() {
        let mut target = recorder();
        execute(
            &[Op::dialog("Yah boo!", "Arthur"), Op::dialog("And...", "Arthur")],
            &mut target,
        )
        .unwrap();

        assert_eq!(target.redraws, 1);
        let texts: Vec<_> = target.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["Yah boo!", "And..."]);
    }

    #[test]
    fn lone_dialog_still_redraws() {
        let mut target = recorder();
        execute(&[Op::dialog("hi", "Arthur")], &mut target).unwrap();

        assert_eq!(target.redraws, 1);
        assert_eq!(
            target.messages,
            vec![Message {
                text: "hi".to_string(),
                actor: "Arthur".to_string(),
            }]
        );
        assert_eq!(target.images["Image1"], true);
    }

    #[test]
    fn missing_image_is_fatal() {
        let mut target = recorder();
        let res = execute(&[Op::hide("Image9")], &mut target);
        assert!(matches!(res, Err(Error::MissingControl { .. })));
        assert_eq!(target.redraws, 0);
    }

    #[test]
    fn empty_list_is_a_no_op() {
        let mut target = recorder();
        execute(&[], &mut target).unwrap();
        assert_eq!(target.redraws, 0);
    }
}
