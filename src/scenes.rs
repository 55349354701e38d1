use std::time::Duration;

use log::debug;

use crate::{
    config::{DEFAULT_TIMER_INTERVAL, INTRO_FORM, INTRO_TIMER},
    controls::Form,
    engine::{
        objects::SceneObject,
        ops::Op,
        timer::{SceneTimer, TimedOp},
    },
    error::Result,
    forms::FormSet,
};

/// The game is split into chapters, each unlocked by a password.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Chapter {
    Start,
    ChopSuey,
    Lubricant,
    Stressed,
    Infidel,
    Sniffer,
    Untoward,
    Climax,
}

pub const CHAPTERS: [Chapter; 8] = [
    Chapter::Start,
    Chapter::ChopSuey,
    Chapter::Lubricant,
    Chapter::Stressed,
    Chapter::Infidel,
    Chapter::Sniffer,
    Chapter::Untoward,
    Chapter::Climax,
];

impl Chapter {
    pub fn password(self) -> &'static str {
        match self {
            Chapter::Start => "",
            Chapter::ChopSuey => "CHOP SUEY",
            Chapter::Lubricant => "LUBRICANT",
            Chapter::Stressed => "STRESSED",
            Chapter::Infidel => "INFIDEL",
            Chapter::Sniffer => "SNIFFER",
            Chapter::Untoward => "UNTOWARD",
            Chapter::Climax => "CLIMAX",
        }
    }

    /// Chapter unlocked by `password`. Matching is exact; anything unknown
    /// starts the game from the beginning.
    pub fn from_password(password: &str) -> Chapter {
        CHAPTERS
            .iter()
            .copied()
            .find(|c| c.password() == password)
            .unwrap_or(Chapter::Start)
    }

    pub fn from_index(index: usize) -> Option<Chapter> {
        CHAPTERS.get(index).copied()
    }

    /// Scene forms of the chapter, in play order.
    pub fn scenes(self) -> &'static [&'static str] {
        match self {
            Chapter::Start => &["Form7", "Form8", "Form10", "Form11", "Form12"],
            Chapter::ChopSuey => &["Form13", "Form14", "Form15", "Form16"],
            Chapter::Lubricant => &[
                "Form18", "Form19", "Form20", "Form21", "Form22", "Form23", "Form24", "Form25",
                "Form26", "Form27",
            ],
            Chapter::Stressed => &[
                "Form28", "Form29", "Form30", "Form31", "Form32", "Form33", "Form34", "Form35",
            ],
            Chapter::Infidel => &["Form36"],
            Chapter::Sniffer => &[
                "Form37", "Form38", "Form39", "Form40", "Form41", "Form42", "Form43", "Form44",
                "Form45", "Form46", "Form47", "Form48", "Form49",
            ],
            Chapter::Untoward => &["Form50", "Form51", "Form52", "Form53", "Form54"],
            Chapter::Climax => &["Form55", "Form56", "Form57", "Form58", "Form59", "Form60"],
        }
    }

    pub fn first_scene(self) -> &'static str {
        self.scenes()[0]
    }
}

/// Hotspots and timed events of a scene.
#[derive(Default)]
pub struct SceneScript {
    pub objects: Vec<SceneObject>,
    /// New inventory content, if the scene changes it.
    pub inventory: Option<Vec<SceneObject>>,
    pub timer: Option<SceneTimer>,
}

fn timer_interval(form: &Form, timer: &str) -> Duration {
    form.timer(timer)
        .map(|t| Duration::from_millis(t.interval as u64))
        .unwrap_or(DEFAULT_TIMER_INTERVAL)
}

fn image_object(form: &Form, id: &str, caption: &str) -> Result<SceneObject> {
    let area = form.control_rect(form.require_image(id)?);
    Ok(SceneObject::new(id, caption, area))
}

fn label_object(form: &Form, id: &str, caption: &str) -> Result<SceneObject> {
    let area = form.control_rect(form.require_label(id)?);
    Ok(SceneObject::new(id, caption, area))
}

fn arthur(text: &str) -> Op {
    Op::dialog(text, "Arthur")
}

pub fn intro_script(forms: &FormSet) -> Result<SceneScript> {
    const FACE1: &str = "Image1";
    const FACE2: &str = "Image2";

    let form = forms.require(INTRO_FORM)?;
    let ops = vec![
        TimedOp::new(5, vec![Op::dialog("DING-DONG", "Door")]),
        TimedOp::new(6, vec![Op::hide(FACE1), Op::show(FACE2)]),
        TimedOp::new(8, vec![arthur("Bugger. The door.")]),
    ];

    Ok(SceneScript {
        timer: Some(SceneTimer::new(timer_interval(form, INTRO_TIMER), ops)),
        ..Default::default()
    })
}

/// Script of scene `name`. Scenes nobody scripted have no hotspots.
pub fn scene_script(name: &str, forms: &FormSet, inventory_form: &str) -> Result<SceneScript> {
    let form = forms.require(name)?;
    let script = match name {
        "Form7" => cell_script(form, forms.require(inventory_form)?)?,
        _ => SceneScript::default(),
    };
    debug!(
        "scene {}: {} hotspots, timer {}",
        name,
        script.objects.len(),
        script.timer.is_some()
    );
    Ok(script)
}

// Arthur's cell, first scene of the game.
fn cell_script(form: &Form, inventory: &Form) -> Result<SceneScript> {
    const MUG: &str = "MUG";
    let people_might_talk = || vec![arthur("People might talk.")];
    let not_thirsty =
        || vec![arthur("I'm not thirsty. Well, actually I am, but not for that stuff.")];

    let objects = vec![
        image_object(form, "Image1", MUG)?
            .on_look(vec![arthur("It's a little mug with brown stuff inside.")])
            .on_operate(vec![
                Op::hide("Image1"),
                Op::show("Image5"),
                arthur("Okay. Why not."),
            ])
            .on_speak(people_might_talk())
            .on_use(MUG, not_thirsty()),
        image_object(form, "Image2", "ARTHUR")?
            .on_look(vec![arthur("It's me! Arthur Yahtzee! Hero-type guy!")])
            .on_operate(vec![arthur("You filthy, evil minded pervert.")])
            .on_speak(people_might_talk())
            .on_use(MUG, not_thirsty()),
        label_object(form, "Label1", "ILL LOOKING BLOKE")?
            .on_look(vec![arthur(
                "A skeleton. In my cell. Chained up. Have these mutants no originality?",
            )])
            .on_operate(vec![arthur("You filthy, evil minded pervert.")])
            .on_speak(vec![arthur("So, what are you in for?")])
            .on_use(
                MUG,
                vec![arthur(
                    "He does look rather thirsty, but I don't think he'd appreciate me.",
                )],
            ),
        label_object(form, "Label2", "BARS")?
            .on_look(vec![arthur("I can see a guard through there. Isn't this fun?")])
            .on_operate(vec![arthur(
                "Yes, I think I'll just evolve the strength of ten men and tear the bars from their sockets. Yeah.",
            )])
            .on_speak(people_might_talk())
            .on_use(MUG, insults()),
    ];

    let inventory_objects = vec![image_object(inventory, "Image5", MUG)?
        .on_look(vec![arthur("Looks like a little mug to me.")])
        .on_operate(vec![arthur(
            "The brown water inside doesn't look too appetising.",
        )])
        .on_speak(people_might_talk())];

    // The guard paces behind the bars, then Arthur loses his temper.
    let mut ops = Vec::new();
    for tick in 1..=8u32 {
        let (from, to) = match tick {
            1 => ("Image2", "Image3"),
            t if t % 2 == 0 => ("Image3", "Image4"),
            _ => ("Image4", "Image3"),
        };
        ops.push(TimedOp::new(tick, vec![Op::hide(from), Op::show(to)]));
    }
    ops.push(TimedOp::new(9, insults()));

    Ok(SceneScript {
        objects,
        inventory: Some(inventory_objects),
        timer: Some(SceneTimer::new(timer_interval(form, "Timer1"), ops)),
    })
}

fn insults() -> Vec<Op> {
    vec![
        arthur("Yah boo! All mutants smell of fifteenth century London!"),
        arthur("And they probably perform unspecific obscene acts with small dalmation puppies!"),
        arthur("And..."),
    ]
}
