use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::ArgMatches;

use crate::{
    error::{Error, Result},
    scenes::Chapter,
};

pub const SCREEN_WIDTH: usize = 640;
pub const SCREEN_HEIGHT: usize = 480;

pub const REFRESH_DELAY: Duration = Duration::from_millis(10);

/// Archive prefix of this game. The other prefixes belong to sibling games
/// sharing the same engine and are only recognized to produce a better error.
pub const FRIDAY_PREFIX: &[u8; 4] = b"FDAY";
pub const OTHER_PREFIXES: [(&[u8; 4], &str); 7] = [
    (b"SDAY", "Saturday"),
    (b"YDAY", "Yesterday"),
    (b"RDF1", "Red Dwarf 1"),
    (b"RDF2", "Red Dwarf 2"),
    (b"RDF3", "Red Dwarf 3"),
    (b"RDF4", "Red Dwarf 4"),
    (b"RDF5", "Red Dwarf 5"),
];

pub const DATA_FILENAME: &str = "yahtzee.dat";
pub const DING_SOUND_FILENAME: &str = "DING.WAV";

// Forms with a fixed role.
pub const MAIN_MENU_FORM: &str = "Form1";
pub const INTRO_FORM: &str = "Form2";
pub const INVENTORY_FORM: &str = "Form6";
pub const DEATH_FORM: &str = "Form9";
pub const PASSWORD_FORM: &str = "Form17";

// Main menu form controls.
pub const NEW_GAME_LABEL: &str = "Label9";
pub const QUIT_LABEL: &str = "Label10";

pub const INTRO_TIMER: &str = "Timer1";
pub const DEFAULT_TIMER_INTERVAL: Duration = Duration::from_millis(1000);

// Inventory form controls.
pub const COMM_CAPTION_LABEL: &str = "comm";
pub const ITEM_CAPTION_LABEL: &str = "item";
pub const USE_ITEM_CAPTION_LABEL: &str = "useitem";

pub const BOTTOM_MENU_LOOK: &str = "Image1";
pub const BOTTOM_MENU_OPERATE: &str = "Image2";
pub const BOTTOM_MENU_SPEAK: &str = "Image3";
pub const BOTTOM_MENU_USE: &str = "Image4";
pub const BOTTOM_MENU_QUIT: &str = "Image25";

// Offsets relative to the inventory form origin.
pub const INVENTORY_AREA: [i32; 4] = [80, 10, 376, 91];
pub const ACTION_AREA: [i32; 4] = [8, 8, 75, 100];

pub const MS_SERIF_BOLD_FONT_FILE_NAME: &str = "SERIFEB.FON";
pub const MS_TIMES_NEW_ROMAN_BOLD_ITALIC_FONT_FILE_NAME: &str = "Times_New_Roman_Bold_Italic.ttf";

pub const COMM_LABEL_FONT_FILE_NAME: &str = MS_SERIF_BOLD_FONT_FILE_NAME;
pub const ITEM_LABEL_FONT_FILE_NAME: &str = MS_SERIF_BOLD_FONT_FILE_NAME;
pub const MAIN_MENU_BUTTON_FONT_FILE_NAME: &str = MS_TIMES_NEW_ROMAN_BOLD_ITALIC_FONT_FILE_NAME;

/// How the game starts once the forms are loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartMode {
    MainMenu,
    Intro,
    Chapter(Chapter),
}

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub data_dir: PathBuf,
    pub start: StartMode,
    /// TrueType file used in place of the game's bitmap fonts.
    pub font_substitute: PathBuf,
}

impl GameConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        let font_substitute = data_dir.join(MS_TIMES_NEW_ROMAN_BOLD_ITALIC_FONT_FILE_NAME);

        GameConfig {
            data_dir,
            start: StartMode::MainMenu,
            font_substitute,
        }
    }

    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let mut config = GameConfig::new(matches.value_of("data").unwrap_or("."));

        if let Some(font) = matches.value_of("font") {
            config.font_substitute = PathBuf::from(font);
        }

        config.start = if let Some(password) = matches.value_of("password") {
            StartMode::Chapter(Chapter::from_password(password))
        } else if let Some(chapter) = matches.value_of("chapter") {
            let index = chapter
                .parse::<usize>()
                .ok()
                .and_then(Chapter::from_index)
                .ok_or_else(|| {
                    Error::Config(format!("invalid chapter {:?}, expected 0..7", chapter))
                })?;
            StartMode::Chapter(index)
        } else if matches.is_present("intro") {
            StartMode::Intro
        } else {
            StartMode::MainMenu
        };

        Ok(config)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.data_file(DATA_FILENAME)
    }

    pub fn data_file(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }
}
