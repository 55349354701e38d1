pub mod objects;
pub mod ops;
pub mod timer;

use std::collections::VecDeque;

use log::{debug, info, warn};

use crate::{
    config::{
        GameConfig, StartMode, ACTION_AREA, BOTTOM_MENU_LOOK, BOTTOM_MENU_OPERATE,
        BOTTOM_MENU_QUIT, BOTTOM_MENU_SPEAK, BOTTOM_MENU_USE, COMM_CAPTION_LABEL,
        COMM_LABEL_FONT_FILE_NAME, DEATH_FORM, DING_SOUND_FILENAME, INVENTORY_AREA,
        INVENTORY_FORM, ITEM_CAPTION_LABEL, ITEM_LABEL_FONT_FILE_NAME,
        MAIN_MENU_BUTTON_FONT_FILE_NAME, MAIN_MENU_FORM, NEW_GAME_LABEL, PASSWORD_FORM,
        QUIT_LABEL, REFRESH_DELAY, USE_ITEM_CAPTION_LABEL,
    },
    controls::{ControlKind, Form},
    error::{Error, Result},
    font::{Font, FontLoader},
    forms::FormSet,
    gfx::{compositor::Compositor, Point, Rect, BLACK},
    input::{InputEvent, Key},
    scenes::{self, Chapter},
    sys::{MenuChoice, Modal, ModalResult, Sys},
};

use objects::{ObjectRef, ObjectTable, SceneObject, TableKind, Verb};
use ops::{Message, OpTarget};
use timer::SceneTimer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    MainMenu,
    PasswordEntry,
    IntroPlayback,
    SceneInteractive,
    InventoryOpen,
    Dialog,
    Death,
    Quit,
}

impl GameState {
    fn is_interactive(self) -> bool {
        matches!(self, GameState::SceneInteractive | GameState::InventoryOpen)
    }
}

/// Deferred work, drained once per frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Redraw the scene and inventory forms.
    Redraw,
    /// Redraw the inventory captions only.
    UpdateCaptions,
    PlaySound,
    /// Show the next queued message.
    DisplayMsg,
}

/// Screen areas of the inventory form the mouse interacts with.
struct Layout {
    inventory_area: Rect,
    action_area: Rect,
    menu: [(Verb, Rect); 4],
    quit: Rect,
}

impl Layout {
    fn new(inventory: &Form) -> Result<Self> {
        let item = |name: &str| -> Result<Rect> {
            Ok(inventory.control_rect(inventory.require_image(name)?))
        };

        Ok(Layout {
            inventory_area: inventory.offset_rect(INVENTORY_AREA),
            action_area: inventory.offset_rect(ACTION_AREA),
            menu: [
                (Verb::Look, item(BOTTOM_MENU_LOOK)?),
                (Verb::Operate, item(BOTTOM_MENU_OPERATE)?),
                (Verb::Speak, item(BOTTOM_MENU_SPEAK)?),
                (Verb::Use, item(BOTTOM_MENU_USE)?),
            ],
            quit: item(BOTTOM_MENU_QUIT)?,
        })
    }

    fn verb_at(&self, p: Point<i32>) -> Option<Verb> {
        self.menu
            .iter()
            .find(|(_, rect)| rect.contains(p))
            .map(|(verb, _)| *verb)
    }
}

/// What ops act upon: the images of the current scene and of the inventory,
/// and the game's queues.
struct Stage<'a> {
    forms: &'a mut FormSet,
    scene: &'a str,
    actions: &'a mut VecDeque<Action>,
    messages: &'a mut VecDeque<Message>,
}

impl<'a> OpTarget for Stage<'a> {
    fn set_image_visible(&mut self, name: &str, visible: bool) -> Result<()> {
        for form_name in [self.scene, INVENTORY_FORM].iter() {
            let image = self
                .forms
                .get_mut(form_name)
                .and_then(|form| form.image_mut(name));
            if let Some(image) = image {
                debug!("{}.{} visible: {}", form_name, name, visible);
                image.set_visible(visible);
                return Ok(());
            }
        }

        Err(Error::missing(ControlKind::Image, name))
    }

    fn queue_message(&mut self, message: Message) {
        self.messages.push_back(message);
        self.actions.push_back(Action::DisplayMsg);
    }

    fn request_redraw(&mut self) {
        self.actions.push_back(Action::Redraw);
    }
}

pub struct Game {
    config: GameConfig,
    forms: FormSet,
    compositor: Compositor,
    comm_font: Box<dyn Font>,
    item_font: Box<dyn Font>,
    menu_font: Box<dyn Font>,
    layout: Layout,

    state: GameState,
    chapter: Chapter,
    scene_index: usize,
    scene: String,
    scene_area: Rect,
    scene_visible: bool,
    inventory_visible: bool,

    scene_objects: ObjectTable,
    inventory_objects: ObjectTable,
    timer: Option<SceneTimer>,

    verb: Verb,
    held_item: Option<String>,
    hovered: Option<ObjectRef>,
    item_caption: String,

    actions: VecDeque<Action>,
    messages: VecDeque<Message>,
}

impl Game {
    pub fn new(config: GameConfig, forms: FormSet, fonts: &dyn FontLoader) -> Result<Self> {
        let inventory = forms.require(INVENTORY_FORM)?;
        let comm = inventory.require_label(COMM_CAPTION_LABEL)?;
        let item = inventory.require_label(ITEM_CAPTION_LABEL)?;
        inventory.require_label(USE_ITEM_CAPTION_LABEL)?;

        let comm_font = fonts.load_bitmap_font(
            &config.data_file(COMM_LABEL_FONT_FILE_NAME),
            &comm.font.name,
            comm.font.size,
        )?;
        let item_font = fonts.load_bitmap_font(
            &config.data_file(ITEM_LABEL_FONT_FILE_NAME),
            &item.font.name,
            item.font.size,
        )?;
        let layout = Layout::new(inventory)?;

        let menu = forms.require(MAIN_MENU_FORM)?;
        let new_game = menu.require_label(NEW_GAME_LABEL)?;
        menu.require_label(QUIT_LABEL)?;
        let menu_font = fonts.load_outline_font(
            &config.data_file(MAIN_MENU_BUTTON_FONT_FILE_NAME),
            new_game.font.size,
        )?;

        let mut game = Game {
            config,
            forms,
            compositor: Compositor::new(),
            comm_font,
            item_font,
            menu_font,
            layout,
            state: GameState::MainMenu,
            chapter: Chapter::Start,
            scene_index: 0,
            scene: String::new(),
            scene_area: Rect::default(),
            scene_visible: true,
            inventory_visible: false,
            scene_objects: ObjectTable::new(TableKind::Scene),
            inventory_objects: ObjectTable::new(TableKind::Inventory),
            timer: None,
            verb: Verb::default(),
            held_item: None,
            hovered: None,
            item_caption: String::new(),
            actions: VecDeque::new(),
            messages: VecDeque::new(),
        };

        match game.config.start {
            StartMode::MainMenu => (),
            StartMode::Intro => game.play_intro()?,
            StartMode::Chapter(chapter) => game.start_chapter(chapter)?,
        }

        Ok(game)
    }

    /// Name of the form currently shown as the scene.
    pub fn scene(&self) -> &str {
        &self.scene
    }

    fn set_state(&mut self, state: GameState) {
        if state != self.state {
            debug!("state {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    pub fn run(&mut self, sys: &mut dyn Sys) -> Result<()> {
        while self.state != GameState::Quit {
            self.run_frame(sys)?;
        }
        info!("Quitting");
        self.compositor.cache().show_stats();
        Ok(())
    }

    pub fn run_frame(&mut self, sys: &mut dyn Sys) -> Result<()> {
        match self.state {
            GameState::MainMenu => return self.main_menu(sys),
            GameState::PasswordEntry => return self.password_entry(sys, GameState::MainMenu),
            GameState::Death => return self.death(sys),
            GameState::Quit => return Ok(()),
            _ => (),
        }

        while let Some(event) = sys.poll_event() {
            self.handle_event(sys, event)?;
            if matches!(self.state, GameState::Death | GameState::Quit) {
                return Ok(());
            }
        }

        self.process_actions(sys)?;

        let fired = match self.timer.as_mut() {
            Some(timer) => timer.advance(REFRESH_DELAY),
            None => Vec::new(),
        };
        for timed in fired {
            ops::execute(&timed.ops, &mut self.stage())?;
        }

        self.process_actions(sys)?;

        let intro_done = self.timer.as_ref().map_or(true, SceneTimer::is_finished);
        if self.state == GameState::IntroPlayback && intro_done {
            info!("Intro finished");
            self.start_chapter(Chapter::Start)?;
            self.process_actions(sys)?;
        }

        if self.state == GameState::Quit {
            return Ok(());
        }

        self.present(sys)?;
        sys.delay(REFRESH_DELAY);

        Ok(())
    }

    fn stage(&mut self) -> Stage<'_> {
        Stage {
            forms: &mut self.forms,
            scene: &self.scene,
            actions: &mut self.actions,
            messages: &mut self.messages,
        }
    }

    fn present(&self, sys: &mut dyn Sys) -> Result<()> {
        let surface = self.compositor.surface();
        sys.present(
            surface.pixels(),
            surface.width(),
            surface.height(),
            surface.stride(),
        )
    }

    fn main_menu(&mut self, sys: &mut dyn Sys) -> Result<()> {
        let form = self.forms.require(MAIN_MENU_FORM)?;
        self.compositor.clear(BLACK);
        self.compositor.draw_form(form)?;
        for name in [NEW_GAME_LABEL, QUIT_LABEL].iter() {
            let label = form.require_label(name)?;
            self.compositor
                .draw_caption(form, label, &label.caption.caption, self.menu_font.as_ref());
        }
        self.present(sys)?;

        let answer = sys.show_modal(&Modal::MainMenu { form })?;
        match answer {
            ModalResult::Menu(MenuChoice::Password) => self.set_state(GameState::PasswordEntry),
            ModalResult::Menu(MenuChoice::WatchIntro) => self.play_intro()?,
            ModalResult::Menu(MenuChoice::SkipIntro) => self.start_chapter(Chapter::Start)?,
            ModalResult::Menu(MenuChoice::Quit) | ModalResult::Dismissed => {
                self.set_state(GameState::Quit)
            }
            other => {
                warn!("unexpected main menu answer {:?}", other);
                self.set_state(GameState::Quit);
            }
        }
        Ok(())
    }

    /// Asks for a password and starts the matching chapter. Going back
    /// without an answer returns to `fallback`.
    fn password_entry(&mut self, sys: &mut dyn Sys, fallback: GameState) -> Result<()> {
        self.set_state(GameState::PasswordEntry);
        if let Some(timer) = self.timer.as_mut() {
            timer.suspend();
        }

        let form = self.forms.require(PASSWORD_FORM)?;
        let answer = sys.show_modal(&Modal::Password { form })?;

        if let Some(timer) = self.timer.as_mut() {
            timer.resume();
        }

        match answer {
            ModalResult::Password(password) => {
                let chapter = Chapter::from_password(&password);
                info!("Password {:?} unlocks {:?}", password, chapter);
                self.start_chapter(chapter)
            }
            _ => {
                self.set_state(fallback);
                Ok(())
            }
        }
    }

    fn death(&mut self, sys: &mut dyn Sys) -> Result<()> {
        let form = self.forms.require(DEATH_FORM)?;
        self.compositor.clear(BLACK);
        self.compositor.draw_form(form)?;
        self.present(sys)?;

        sys.show_modal(&Modal::Death { form })?;
        self.set_state(GameState::Quit);
        Ok(())
    }

    fn play_intro(&mut self) -> Result<()> {
        info!("Playing intro");
        let script = scenes::intro_script(&self.forms)?;
        self.show_scene(crate::config::INTRO_FORM, script)?;
        self.inventory_visible = false;
        self.set_state(GameState::IntroPlayback);
        Ok(())
    }

    fn start_chapter(&mut self, chapter: Chapter) -> Result<()> {
        info!("Starting chapter {:?} at {}", chapter, chapter.first_scene());
        self.chapter = chapter;
        self.compositor.clear_cache();
        self.scene_index = 0;
        self.scene_visible = true;
        self.inventory_visible = true;
        self.enter_scene()?;
        self.set_state(GameState::InventoryOpen);
        Ok(())
    }

    /// Enters scene `scene_index` of the current chapter.
    fn enter_scene(&mut self) -> Result<()> {
        let name = self.chapter.scenes()[self.scene_index];
        info!(
            "Entering scene {} ({} of {} in {:?})",
            name,
            self.scene_index + 1,
            self.chapter.scenes().len(),
            self.chapter
        );
        let script = scenes::scene_script(name, &self.forms, INVENTORY_FORM)?;
        self.show_scene(name, script)
    }

    fn show_scene(&mut self, name: &str, script: scenes::SceneScript) -> Result<()> {
        self.scene_area = self.forms.require(name)?.rect();
        self.scene = name.to_string();
        self.scene_objects.rebuild(script.objects);
        if let Some(timer) = &script.timer {
            debug!("{} runs a timer every {:?}", name, timer.interval());
        }
        if let Some(inventory) = script.inventory {
            self.inventory_objects.rebuild(inventory);
        }
        self.timer = script.timer;
        self.hovered = None;
        self.item_caption.clear();
        self.actions.push_back(Action::Redraw);
        Ok(())
    }

    /// Moves `delta` scenes within the chapter, stopping at either end.
    fn navigate(&mut self, delta: isize) -> Result<()> {
        let last = self.chapter.scenes().len() - 1;
        let index = (self.scene_index as isize + delta).max(0).min(last as isize) as usize;
        if index == self.scene_index {
            debug!("no scene in that direction");
            return Ok(());
        }
        self.scene_index = index;
        self.enter_scene()
    }

    pub fn handle_event(&mut self, sys: &mut dyn Sys, event: InputEvent) -> Result<()> {
        match event {
            InputEvent::Quit => {
                info!("Quit requested");
                self.set_state(GameState::Quit);
                Ok(())
            }
            InputEvent::KeyDown(key) => self.handle_key(sys, key),
            InputEvent::MouseMove(p) => {
                self.handle_mouse_move(p);
                Ok(())
            }
            InputEvent::MouseDown(p) => self.handle_click(p),
        }
    }

    fn handle_key(&mut self, sys: &mut dyn Sys, key: Key) -> Result<()> {
        match key {
            Key::Q => {
                info!("Quit requested");
                self.set_state(GameState::Quit);
            }
            Key::D => {
                info!("Arthur dies");
                self.set_state(GameState::Death);
            }
            Key::P => {
                let previous = self.state;
                self.password_entry(sys, previous)?;
            }
            _ if !self.state.is_interactive() => (),
            Key::I => {
                self.inventory_visible = !self.inventory_visible;
                if self.inventory_visible {
                    self.set_state(GameState::InventoryOpen);
                } else {
                    self.set_state(GameState::SceneInteractive);
                    if self.hovered.map(|r| r.kind) == Some(TableKind::Inventory) {
                        self.hovered = None;
                    }
                }
                self.actions.push_back(Action::Redraw);
            }
            Key::S => {
                self.scene_visible = !self.scene_visible;
                self.actions.push_back(Action::Redraw);
            }
            Key::Left => self.navigate(-1)?,
            Key::Right => self.navigate(1)?,
        }
        Ok(())
    }

    fn resolve(&self, r: ObjectRef) -> Option<&SceneObject> {
        match r.kind {
            TableKind::Scene => self.scene_objects.resolve(r),
            TableKind::Inventory => self.inventory_objects.resolve(r),
        }
    }

    fn handle_mouse_move(&mut self, p: Point<i32>) {
        if !self.state.is_interactive() {
            return;
        }

        let still_hovered = self
            .hovered
            .and_then(|r| self.resolve(r))
            .map_or(false, |o| o.area.contains(p));
        if still_hovered {
            return;
        }

        let hovered = if self.scene_visible && self.scene_area.contains(p) {
            self.scene_objects.hit_test(p)
        } else if self.inventory_visible && self.layout.inventory_area.contains(p) {
            self.inventory_objects.hit_test(p)
        } else {
            None
        };

        let caption = hovered
            .and_then(|r| self.resolve(r))
            .map(|o| o.caption.clone())
            .unwrap_or_default();
        self.hovered = hovered;
        if caption != self.item_caption {
            self.item_caption = caption;
            self.actions.push_back(Action::UpdateCaptions);
        }
    }

    fn handle_click(&mut self, p: Point<i32>) -> Result<()> {
        if !self.state.is_interactive() {
            return Ok(());
        }
        debug!("click at {}", p);

        if self.scene_visible && self.scene_area.contains(p) {
            if let Some(r) = self.scene_objects.hit_test(p) {
                self.run_reaction(r)?;
            }
            return Ok(());
        }

        if self.inventory_visible {
            if self.layout.action_area.contains(p) {
                if let Some(verb) = self.layout.verb_at(p) {
                    self.select_verb(verb);
                }
                return Ok(());
            }

            if self.layout.inventory_area.contains(p) {
                if let Some(r) = self.inventory_objects.hit_test(p) {
                    if self.verb == Verb::Use {
                        self.hold_item(r);
                    } else {
                        self.run_reaction(r)?;
                    }
                }
                return Ok(());
            }

            if self.layout.quit.contains(p) {
                info!("Quit from the menu");
                self.set_state(GameState::Quit);
                return Ok(());
            }
        }

        self.actions.push_back(Action::PlaySound);
        Ok(())
    }

    fn select_verb(&mut self, verb: Verb) {
        debug!("verb {:?}", verb);
        self.verb = verb;
        self.held_item = None;
        self.actions.push_back(Action::UpdateCaptions);
    }

    fn hold_item(&mut self, r: ObjectRef) {
        let caption = self.resolve(r).map(|o| o.caption.clone());
        debug!("holding {:?}", caption);
        self.held_item = caption;
        self.actions.push_back(Action::UpdateCaptions);
    }

    /// Runs the reaction of hotspot `r` to the selected verb.
    fn run_reaction(&mut self, r: ObjectRef) -> Result<()> {
        let table = match r.kind {
            TableKind::Scene => &self.scene_objects,
            TableKind::Inventory => &self.inventory_objects,
        };
        let id = match table.resolve(r) {
            Some(object) => object.id.clone(),
            None => {
                warn!("stale reference to a {:?} hotspot", r.kind);
                return Ok(());
            }
        };
        let ops = table.reaction(&id, self.verb, self.held_item.as_deref())?;
        debug!("{} {}: {} ops", self.verb.caption(), id, ops.len());

        let mut stage = Stage {
            forms: &mut self.forms,
            scene: &self.scene,
            actions: &mut self.actions,
            messages: &mut self.messages,
        };
        ops::execute(ops, &mut stage)
    }

    fn process_actions(&mut self, sys: &mut dyn Sys) -> Result<()> {
        while let Some(action) = self.actions.pop_front() {
            match action {
                Action::Redraw => self.redraw()?,
                Action::UpdateCaptions => {
                    if self.inventory_visible {
                        self.draw_captions()?;
                    }
                }
                Action::PlaySound => self.play_ding(sys),
                Action::DisplayMsg => self.display_message(sys)?,
            }
            if self.state == GameState::Quit {
                break;
            }
        }
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let scene = self.forms.require(&self.scene)?;
        if self.scene_visible {
            self.compositor.draw_form(scene)?;
        } else {
            self.compositor.hide_rect(scene.rect());
        }

        let inventory = self.forms.require(INVENTORY_FORM)?;
        if self.inventory_visible {
            self.compositor.draw_form(inventory)?;
            self.draw_captions()?;
        } else {
            self.compositor.hide_rect(inventory.rect());
        }
        Ok(())
    }

    fn draw_captions(&mut self) -> Result<()> {
        let form = self.forms.require(INVENTORY_FORM)?;
        let held = self.held_item.as_deref().unwrap_or("");

        let comm = form.require_label(COMM_CAPTION_LABEL)?;
        self.compositor
            .draw_caption(form, comm, self.verb.caption(), &*self.comm_font);
        let item = form.require_label(ITEM_CAPTION_LABEL)?;
        self.compositor
            .draw_caption(form, item, &self.item_caption, &*self.item_font);
        let use_item = form.require_label(USE_ITEM_CAPTION_LABEL)?;
        self.compositor
            .draw_caption(form, use_item, held, &*self.item_font);
        Ok(())
    }

    fn play_ding(&mut self, sys: &mut dyn Sys) {
        let path = self.config.data_file(DING_SOUND_FILENAME);
        if let Err(e) = sys.play_sound(&path) {
            warn!("cannot play {}: {}", path.display(), e);
        }
    }

    /// Shows the next queued message in a modal dialog. Time stops while it
    /// is displayed.
    fn display_message(&mut self, sys: &mut dyn Sys) -> Result<()> {
        let message = match self.messages.pop_front() {
            Some(message) => message,
            None => return Ok(()),
        };

        // The dialog goes over the up to date screen.
        if self.actions.contains(&Action::Redraw) {
            self.actions.retain(|a| *a != Action::Redraw);
            self.redraw()?;
        }
        self.present(sys)?;

        let previous = self.state;
        self.set_state(GameState::Dialog);
        if let Some(timer) = self.timer.as_mut() {
            timer.suspend();
        }
        self.play_ding(sys);

        sys.show_modal(&Modal::Message {
            text: &message.text,
            actor: &message.actor,
        })?;

        if let Some(timer) = self.timer.as_mut() {
            timer.resume();
        }
        self.set_state(previous);
        Ok(())
    }
}
