use std::path::Path;

use anyhow::{Context, Result};
use clap::{App, Arg, ArgMatches};
use log::{error, info};

mod config;
mod controls;
mod engine;
mod error;
#[cfg(test)]
mod fixtures;
mod font;
mod forms;
mod gfx;
mod input;
mod res;
mod scenes;
mod sys;

use config::GameConfig;
use engine::Game;
use font::FontdueLoader;
use input::InputEvent;
use sys::{headless::HeadlessSys, MenuChoice, Sys};

fn main() {
    env_logger::init();

    let matches = App::new("Arthur Yahtzee")
        .version("0.1")
        .arg(
            Arg::with_name("data")
                .short("d")
                .long("data")
                .help("Directory holding yahtzee.dat and the game assets")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("chapter")
                .short("c")
                .long("chapter")
                .help("The chapter to start from (0..7)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("password")
                .short("p")
                .long("password")
                .help("Start from the chapter unlocked by this password")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("intro")
                .short("i")
                .long("intro")
                .help("Play the intro instead of showing the main menu"),
        )
        .arg(
            Arg::with_name("font")
                .long("font")
                .help("TrueType font used in place of the game's bitmap fonts")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("headless")
                .long("headless")
                .help("Run without window nor sound"),
        )
        .arg(
            Arg::with_name("frames")
                .long("frames")
                .help("Quit after this many frames when running headless (default 100)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("menu")
                .long("menu")
                .help("Main menu answer when running headless: password, intro, skip or quit")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("script")
                .long("script")
                .help("Events fed to the headless game, one per frame (quit, key:i, move:x,y, click:x,y)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("screenshot")
                .long("screenshot")
                .help("Save the last headless frame to this bitmap file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("dump_forms")
                .long("dump-forms")
                .help("List the forms of the archive and exit"),
        )
        .get_matches();

    if let Err(e) = run(&matches) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config = GameConfig::from_matches(matches)?;

    let archive = config.archive_path();
    let forms = forms::read_forms(&archive)
        .with_context(|| format!("cannot load forms from {}", archive.display()))?;
    info!("Loaded {} forms from {}", forms.len(), archive.display());

    if matches.is_present("dump_forms") {
        print!("{}", forms.describe());
        return Ok(());
    }

    let fonts = FontdueLoader::new(&config.font_substitute);
    let mut game = Game::new(config, forms, &fonts).context("cannot start the game")?;

    if matches.is_present("headless") {
        let frames = matches.value_of("frames").unwrap_or("100");
        let frames = frames
            .parse::<usize>()
            .with_context(|| format!("invalid frame count {:?}", frames))?;
        let mut sys = HeadlessSys::new().with_frame_limit(frames);
        if let Some(choice) = matches.value_of("menu") {
            sys = sys.with_menu_choice(choice.parse::<MenuChoice>()?);
        }
        if let Some(script) = matches.value_of("script") {
            for event in script.split_whitespace() {
                let event = event
                    .parse::<InputEvent>()
                    .with_context(|| format!("invalid --script entry {:?}", event))?;
                sys.push_event(event).end_frame();
            }
        }

        game.run(&mut sys)?;
        for modal in sys.modals() {
            info!("dialog: {}", modal);
        }
        info!(
            "Headless run: {} frames, {} dialogs, {} sounds, {:?} waited",
            sys.frames(),
            sys.modals().len(),
            sys.sounds().len(),
            sys.delayed()
        );

        if let Some(path) = matches.value_of("screenshot") {
            sys.save_screenshot(Path::new(path))?;
        }
        return Ok(());
    }

    let mut sys = new_window_sys()?;
    game.run(sys.as_mut())?;
    Ok(())
}

#[cfg(feature = "sdl2-sys")]
fn new_window_sys() -> Result<Box<dyn Sys>> {
    Ok(Box::new(sys::sdl2::SDL2Sys::new()?))
}

#[cfg(not(feature = "sdl2-sys"))]
fn new_window_sys() -> Result<Box<dyn Sys>> {
    anyhow::bail!("built without a window system, run with --headless or enable the sdl2-sys feature")
}
