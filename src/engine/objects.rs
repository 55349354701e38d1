use std::collections::HashMap;

use log::debug;

use super::ops::{Op, OpList};
use crate::{
    error::{Error, Result},
    gfx::{Point, Rect},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb {
    Look,
    Operate,
    Speak,
    Use,
}

impl Default for Verb {
    fn default() -> Self {
        Verb::Look
    }
}

impl Verb {
    pub fn caption(self) -> &'static str {
        match self {
            Verb::Look => "LOOK AT",
            Verb::Operate => "OPERATE",
            Verb::Speak => "SPEAK",
            Verb::Use => "USE",
        }
    }
}

/// A clickable area of a scene or of the inventory, and how it reacts to
/// each verb.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneObject {
    pub id: String,
    pub caption: String,
    pub area: Rect,
    pub look_ops: OpList,
    pub operate_ops: OpList,
    pub speak_ops: OpList,
    /// Reactions to `Use`, keyed by the caption of the held item.
    pub use_ops: HashMap<String, OpList>,
}

impl SceneObject {
    pub fn new(id: &str, caption: &str, area: Rect) -> Self {
        SceneObject {
            id: id.to_string(),
            caption: caption.to_string(),
            area,
            look_ops: Vec::new(),
            operate_ops: Vec::new(),
            speak_ops: Vec::new(),
            use_ops: HashMap::new(),
        }
    }

    pub fn on_look(mut self, ops: OpList) -> Self {
        self.look_ops = ops;
        self
    }

    pub fn on_operate(mut self, ops: OpList) -> Self {
        self.operate_ops = ops;
        self
    }

    pub fn on_speak(mut self, ops: OpList) -> Self {
        self.speak_ops = ops;
        self
    }

    pub fn on_use(mut self, item: &str, ops: OpList) -> Self {
        self.use_ops.insert(item.to_string(), ops);
        self
    }

    /// Ops run when `verb` is applied. Using an item nobody wrote a reaction
    /// for does nothing.
    pub fn reaction(&self, verb: Verb, held: Option<&str>) -> &[Op] {
        match verb {
            Verb::Look => &self.look_ops,
            Verb::Operate => &self.operate_ops,
            Verb::Speak => &self.speak_ops,
            Verb::Use => held
                .and_then(|item| self.use_ops.get(item))
                .map(|ops| ops.as_slice())
                .unwrap_or(&[]),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableKind {
    Scene,
    Inventory,
}

/// Handle to an object of an `ObjectTable`. Handles taken before the table
/// was rebuilt no longer resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObjectRef {
    pub kind: TableKind,
    generation: u32,
    index: usize,
}

/// Hotspots of a scene or of the inventory, in declaration order.
#[derive(Clone, Debug)]
pub struct ObjectTable {
    kind: TableKind,
    generation: u32,
    objects: Vec<SceneObject>,
}

impl ObjectTable {
    pub fn new(kind: TableKind) -> Self {
        ObjectTable {
            kind,
            generation: 0,
            objects: Vec::new(),
        }
    }

    /// Replaces the whole content, invalidating every outstanding reference.
    pub fn rebuild(&mut self, objects: Vec<SceneObject>) {
        self.generation = self.generation.wrapping_add(1);
        self.objects.clear();
        for object in objects {
            self.insert(object);
        }
        debug!(
            "{:?} table rebuilt with {} objects (generation {})",
            self.kind,
            self.objects.len(),
            self.generation
        );
    }

    /// Adds `object`, replacing in place any object with the same id.
    pub fn insert(&mut self, object: SceneObject) -> ObjectRef {
        let index = match self.objects.iter().position(|o| o.id == object.id) {
            Some(index) => {
                self.objects[index] = object;
                index
            }
            None => {
                self.objects.push(object);
                self.objects.len() - 1
            }
        };
        self.make_ref(index)
    }

    fn make_ref(&self, index: usize) -> ObjectRef {
        ObjectRef {
            kind: self.kind,
            generation: self.generation,
            index,
        }
    }

    pub fn resolve(&self, r: ObjectRef) -> Option<&SceneObject> {
        if r.kind != self.kind || r.generation != self.generation {
            return None;
        }
        self.objects.get(r.index)
    }

    #[cfg(test)]
    pub fn find(&self, id: &str) -> Option<ObjectRef> {
        self.objects
            .iter()
            .position(|o| o.id == id)
            .map(|index| self.make_ref(index))
    }

    pub fn get(&self, id: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// The last declared object whose area contains `p`.
    pub fn hit_test(&self, p: Point<i32>) -> Option<ObjectRef> {
        self.objects
            .iter()
            .rposition(|o| o.area.contains(p))
            .map(|index| self.make_ref(index))
    }

    /// Reaction of hotspot `id` to `verb`. An unknown hotspot is an error,
    /// while a known one without a reaction yields an empty list.
    pub fn reaction(&self, id: &str, verb: Verb, held: Option<&str>) -> Result<&[Op]> {
        self.get(id)
            .map(|o| o.reaction(verb, held))
            .ok_or_else(|| Error::UnknownObject(id.to_string()))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }
}
