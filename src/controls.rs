pub mod props;

use std::fmt;

use crate::{
    error::{Error, Result},
    gfx::Rect,
    res::Fileloc,
};

use props::{assign_property, ControlProperty as P, PropertyBag};

/// Form geometry is stored in picas, 15 of them per pixel.
pub const PICAS_PER_PIXEL: i32 = 15;

pub fn pica_to_pixels(picas: i32) -> i32 {
    picas / PICAS_PER_PIXEL
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Form,
    Label,
    Image,
    Timer,
    TextBox,
    CommandButton,
    OptionButton,
    Line,
}

impl fmt::Display for ControlKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match *self {
            ControlKind::Form => "form",
            ControlKind::Label => "label",
            ControlKind::Image => "image",
            ControlKind::Timer => "timer",
            ControlKind::TextBox => "textbox",
            ControlKind::CommandButton => "command button",
            ControlKind::OptionButton => "option button",
            ControlKind::Line => "line",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionFacet {
    pub left: i32,
    pub top: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleFacet {
    pub width: i32,
    pub height: i32,
    pub visible: bool,
}

impl Default for VisibleFacet {
    fn default() -> Self {
        VisibleFacet {
            width: 0,
            height: 0,
            visible: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TabFacet {
    pub tab_index: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptionFacet {
    pub caption: String,
}

/// Colors are packed as `0xBBGGRR`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorFacet {
    pub back_color: u32,
    pub fore_color: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PictureFacet {
    pub picture: Option<Fileloc>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FontFacet {
    pub name: String,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub strike_thru: bool,
    pub underline: bool,
}

fn assign_picas(target: &mut i32, key: P, bag: &mut PropertyBag) -> Result<()> {
    let mut picas = 0i32;
    if assign_property(&mut picas, key, bag)? {
        *target = pica_to_pixels(picas);
    }
    Ok(())
}

pub fn assign_position(facet: &mut PositionFacet, bag: &mut PropertyBag) -> Result<()> {
    assign_picas(&mut facet.left, P::Left, bag)?;
    assign_picas(&mut facet.top, P::Top, bag)
}

pub fn assign_visible(facet: &mut VisibleFacet, bag: &mut PropertyBag) -> Result<()> {
    assign_picas(&mut facet.width, P::Width, bag)?;
    assign_picas(&mut facet.height, P::Height, bag)?;
    assign_property(&mut facet.visible, P::Visible, bag)?;
    Ok(())
}

pub fn assign_tab(facet: &mut TabFacet, bag: &mut PropertyBag) -> Result<()> {
    assign_property(&mut facet.tab_index, P::TabIndex, bag)?;
    Ok(())
}

pub fn assign_caption(facet: &mut CaptionFacet, bag: &mut PropertyBag) -> Result<()> {
    assign_property(&mut facet.caption, P::Caption, bag)?;
    Ok(())
}

pub fn assign_color(facet: &mut ColorFacet, bag: &mut PropertyBag) -> Result<()> {
    assign_property(&mut facet.back_color, P::BackColor, bag)?;
    assign_property(&mut facet.fore_color, P::ForeColor, bag)?;
    Ok(())
}

pub fn assign_picture(facet: &mut PictureFacet, bag: &mut PropertyBag) -> Result<()> {
    let mut picture = Fileloc::default();
    if assign_property(&mut picture, P::Picture, bag)? {
        facet.picture = Some(picture);
    }
    Ok(())
}

pub fn assign_font(facet: &mut FontFacet, bag: &mut PropertyBag) -> Result<()> {
    assign_property(&mut facet.name, P::FontName, bag)?;
    assign_property(&mut facet.size, P::FontSize, bag)?;
    assign_property(&mut facet.bold, P::FontBold, bag)?;
    assign_property(&mut facet.italic, P::FontItalic, bag)?;
    assign_property(&mut facet.strike_thru, P::FontStrikeThru, bag)?;
    assign_property(&mut facet.underline, P::FontUnderline, bag)?;
    Ok(())
}

/// Controls that occupy a rectangle of their form.
pub trait Placed {
    fn position(&self) -> &PositionFacet;
    fn extent(&self) -> &VisibleFacet;
}

macro_rules! impl_placed {
    ($($t:ty),*) => {
        $(impl Placed for $t {
            fn position(&self) -> &PositionFacet {
                &self.position
            }

            fn extent(&self) -> &VisibleFacet {
                &self.extent
            }
        })*
    };
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Label {
    pub position: PositionFacet,
    pub extent: VisibleFacet,
    pub tab: TabFacet,
    pub caption: CaptionFacet,
    pub color: ColorFacet,
    pub font: FontFacet,
    pub alignment: u32,
    pub auto_size: bool,
    pub back_style: u32,
}

impl Label {
    pub fn from_properties(bag: &mut PropertyBag) -> Result<Self> {
        let mut label = Label::default();
        assign_position(&mut label.position, bag)?;
        assign_visible(&mut label.extent, bag)?;
        assign_tab(&mut label.tab, bag)?;
        assign_caption(&mut label.caption, bag)?;
        assign_color(&mut label.color, bag)?;
        assign_font(&mut label.font, bag)?;
        assign_property(&mut label.alignment, P::Alignment, bag)?;
        assign_property(&mut label.auto_size, P::AutoSize, bag)?;
        assign_property(&mut label.back_style, P::BackStyle, bag)?;
        Ok(label)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Image {
    pub position: PositionFacet,
    pub extent: VisibleFacet,
    pub picture: PictureFacet,
}

impl Image {
    pub fn from_properties(bag: &mut PropertyBag) -> Result<Self> {
        let mut image = Image::default();
        assign_position(&mut image.position, bag)?;
        assign_visible(&mut image.extent, bag)?;
        assign_picture(&mut image.picture, bag)?;
        Ok(image)
    }

    pub fn is_visible(&self) -> bool {
        self.extent.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.extent.visible = visible;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    pub position: PositionFacet,
    /// Milliseconds between two ticks.
    pub interval: u32,
}

impl Timer {
    pub fn from_properties(bag: &mut PropertyBag) -> Result<Self> {
        let mut timer = Timer::default();
        assign_position(&mut timer.position, bag)?;
        assign_property(&mut timer.interval, P::Interval, bag)?;
        Ok(timer)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextBox {
    pub position: PositionFacet,
    pub extent: VisibleFacet,
    pub tab: TabFacet,
    pub password_char: char,
}

impl Default for TextBox {
    fn default() -> Self {
        TextBox {
            position: Default::default(),
            extent: Default::default(),
            tab: Default::default(),
            password_char: '*',
        }
    }
}

impl TextBox {
    pub fn from_properties(bag: &mut PropertyBag) -> Result<Self> {
        let mut textbox = TextBox::default();
        assign_position(&mut textbox.position, bag)?;
        assign_visible(&mut textbox.extent, bag)?;
        assign_tab(&mut textbox.tab, bag)?;
        assign_property(&mut textbox.password_char, P::PasswordChar, bag)?;
        Ok(textbox)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandButton {
    pub position: PositionFacet,
    pub extent: VisibleFacet,
    pub tab: TabFacet,
    pub caption: CaptionFacet,
}

impl CommandButton {
    pub fn from_properties(bag: &mut PropertyBag) -> Result<Self> {
        let mut button = CommandButton::default();
        assign_position(&mut button.position, bag)?;
        assign_visible(&mut button.extent, bag)?;
        assign_tab(&mut button.tab, bag)?;
        assign_caption(&mut button.caption, bag)?;
        Ok(button)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionButton {
    pub position: PositionFacet,
    pub extent: VisibleFacet,
    pub tab: TabFacet,
    pub color: ColorFacet,
    pub caption: CaptionFacet,
}

impl OptionButton {
    pub fn from_properties(bag: &mut PropertyBag) -> Result<Self> {
        let mut button = OptionButton::default();
        assign_position(&mut button.position, bag)?;
        assign_visible(&mut button.extent, bag)?;
        assign_tab(&mut button.tab, bag)?;
        assign_color(&mut button.color, bag)?;
        assign_caption(&mut button.caption, bag)?;
        Ok(button)
    }
}

/// Only built from property descriptions, the binary archive has no lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Line {
    pub fn from_properties(bag: &mut PropertyBag) -> Result<Self> {
        let mut line = Line::default();
        assign_picas(&mut line.x1, P::X1, bag)?;
        assign_picas(&mut line.y1, P::Y1, bag)?;
        assign_picas(&mut line.x2, P::X2, bag)?;
        assign_picas(&mut line.y2, P::Y2, bag)?;
        Ok(line)
    }
}

impl_placed!(Label, Image, TextBox, CommandButton, OptionButton, Form);

#[derive(Clone, Debug, PartialEq)]
pub enum Control {
    Form(Box<Form>),
    Label(Label),
    Image(Image),
    Timer(Timer),
    TextBox(TextBox),
    CommandButton(CommandButton),
    OptionButton(OptionButton),
    Line(Line),
}

impl Control {
    pub fn kind(&self) -> ControlKind {
        match self {
            Control::Form(_) => ControlKind::Form,
            Control::Label(_) => ControlKind::Label,
            Control::Image(_) => ControlKind::Image,
            Control::Timer(_) => ControlKind::Timer,
            Control::TextBox(_) => ControlKind::TextBox,
            Control::CommandButton(_) => ControlKind::CommandButton,
            Control::OptionButton(_) => ControlKind::OptionButton,
            Control::Line(_) => ControlKind::Line,
        }
    }

    /// Builds a control of `kind` out of `bag`. Forms need their children and
    /// are built with `Form::from_properties` instead.
    pub fn from_properties(kind: ControlKind, bag: &mut PropertyBag) -> Result<Control> {
        Ok(match kind {
            ControlKind::Form => Control::Form(Box::new(Form::from_properties(bag, Vec::new())?)),
            ControlKind::Label => Control::Label(Label::from_properties(bag)?),
            ControlKind::Image => Control::Image(Image::from_properties(bag)?),
            ControlKind::Timer => Control::Timer(Timer::from_properties(bag)?),
            ControlKind::TextBox => Control::TextBox(TextBox::from_properties(bag)?),
            ControlKind::CommandButton => {
                Control::CommandButton(CommandButton::from_properties(bag)?)
            }
            ControlKind::OptionButton => Control::OptionButton(OptionButton::from_properties(bag)?),
            ControlKind::Line => Control::Line(Line::from_properties(bag)?),
        })
    }
}

/// Name-keyed controls in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlMap<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for ControlMap<T> {
    fn default() -> Self {
        ControlMap {
            entries: Vec::new(),
        }
    }
}

impl<T> ControlMap<T> {
    pub fn new() -> Self {
        Default::default()
    }

    /// Fails if a control with the same name already exists.
    pub fn insert(&mut self, name: &str, control: T) -> Result<()> {
        if self.contains(name) {
            return Err(Error::Format(format!("duplicate control name {:?}", name)));
        }
        self.entries.push((name.to_string(), control));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c))
    }

    #[cfg(test)]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Form {
    pub position: PositionFacet,
    pub extent: VisibleFacet,
    pub caption: CaptionFacet,
    pub color: ColorFacet,
    pub picture: PictureFacet,
    pub border_style: u32,
    pub client_left: i32,
    pub client_top: i32,
    pub client_width: i32,
    pub client_height: i32,
    pub scale_width: u32,
    pub scale_height: u32,
    pub link_topic: String,
    pub icon: Option<Fileloc>,

    pub labels: ControlMap<Label>,
    pub timers: ControlMap<Timer>,
    pub command_buttons: ControlMap<CommandButton>,
    pub option_buttons: ControlMap<OptionButton>,
    pub textboxes: ControlMap<TextBox>,
    pub images: ControlMap<Image>,
    /// Everything without a dedicated map (lines, nested forms).
    pub controls: ControlMap<Control>,
}

impl Form {
    /// Builds a form from its own properties and its named children, given
    /// in declaration order.
    pub fn from_properties(
        bag: &mut PropertyBag,
        children: Vec<(String, Control)>,
    ) -> Result<Self> {
        let mut form = Form::default();
        assign_position(&mut form.position, bag)?;
        assign_visible(&mut form.extent, bag)?;
        assign_caption(&mut form.caption, bag)?;
        assign_color(&mut form.color, bag)?;
        assign_picture(&mut form.picture, bag)?;
        assign_property(&mut form.border_style, P::BorderStyle, bag)?;
        assign_picas(&mut form.client_left, P::ClientLeft, bag)?;
        assign_picas(&mut form.client_top, P::ClientTop, bag)?;
        assign_picas(&mut form.client_width, P::ClientWidth, bag)?;
        assign_picas(&mut form.client_height, P::ClientHeight, bag)?;
        assign_property(&mut form.scale_width, P::ScaleWidth, bag)?;
        assign_property(&mut form.scale_height, P::ScaleHeight, bag)?;
        assign_property(&mut form.link_topic, P::LinkTopic, bag)?;

        let mut icon = Fileloc::default();
        if assign_property(&mut icon, P::Icon, bag)? {
            form.icon = Some(icon);
        }

        for (name, control) in children {
            form.insert_control(&name, control)?;
        }

        Ok(form)
    }

    /// Files `control` into the map matching its kind.
    pub fn insert_control(&mut self, name: &str, control: Control) -> Result<()> {
        match control {
            Control::Label(c) => self.labels.insert(name, c),
            Control::Image(c) => self.images.insert(name, c),
            Control::Timer(c) => self.timers.insert(name, c),
            Control::TextBox(c) => self.textboxes.insert(name, c),
            Control::CommandButton(c) => self.command_buttons.insert(name, c),
            Control::OptionButton(c) => self.option_buttons.insert(name, c),
            c @ Control::Form(_) | c @ Control::Line(_) => self.controls.insert(name, c),
        }
    }

    pub fn label(&self, name: &str) -> Option<&Label> {
        self.labels.get(name)
    }

    pub fn image(&self, name: &str) -> Option<&Image> {
        self.images.get(name)
    }

    pub fn image_mut(&mut self, name: &str) -> Option<&mut Image> {
        self.images.get_mut(name)
    }

    pub fn timer(&self, name: &str) -> Option<&Timer> {
        self.timers.get(name)
    }

    pub fn require_label(&self, name: &str) -> Result<&Label> {
        self.label(name)
            .ok_or_else(|| Error::missing(ControlKind::Label, name))
    }

    pub fn require_image(&self, name: &str) -> Result<&Image> {
        self.image(name)
            .ok_or_else(|| Error::missing(ControlKind::Image, name))
    }

    /// Outer rectangle of the form on screen.
    pub fn rect(&self) -> Rect {
        Rect::from_size(
            self.position.left,
            self.position.top,
            self.extent.width,
            self.extent.height,
        )
    }

    pub fn client_rect(&self) -> Rect {
        Rect::from_size(
            self.client_left,
            self.client_top,
            self.client_width,
            self.client_height,
        )
    }

    /// Screen rectangle of a child control, relative to the client origin.
    pub fn control_rect<C: Placed>(&self, control: &C) -> Rect {
        Rect::from_size(
            self.client_left + control.position().left,
            self.client_top + control.position().top,
            control.extent().width,
            control.extent().height,
        )
    }

    /// Rectangle at the given offsets from the outer origin of the form.
    pub fn offset_rect(&self, offsets: [i32; 4]) -> Rect {
        Rect::new(
            self.position.left + offsets[0],
            self.position.top + offsets[1],
            self.position.left + offsets[2],
            self.position.top + offsets[3],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pica_conversion() {
        assert_eq!(pica_to_pixels(150), 10);
        assert_eq!(pica_to_pixels(0), 0);
        assert_eq!(pica_to_pixels(14), 0);

        let mut bag = PropertyBag::new()
            .with(P::Left, &["150"])
            .with(P::Top, &["300"]);
        let mut position = PositionFacet::default();
        assign_position(&mut position, &mut bag).unwrap();
        assert_eq!(position, PositionFacet { left: 10, top: 20 });
    }

    #[test]
    fn image_from_properties() {
        let mut bag = PropertyBag::new()
            .with(P::Left, &["1500"])
            .with(P::Top, &["750"])
            .with(P::Width, &["600"])
            .with(P::Height, &["450"])
            .with(P::Visible, &["False"])
            .with(P::Picture, &["yahtzee.dat", "0x400"]);
        let image = Image::from_properties(&mut bag).unwrap();
        bag.ensure_consumed().unwrap();

        assert_eq!(image.position, PositionFacet { left: 100, top: 50 });
        assert_eq!(image.extent.width, 40);
        assert_eq!(image.extent.height, 30);
        assert!(!image.is_visible());
        assert_eq!(image.picture.picture.unwrap().location, 0x400);
    }

    #[test]
    fn textbox_masks_with_stars_by_default() {
        assert_eq!(TextBox::default().password_char, '*');

        let mut bag = PropertyBag::new().with(P::TabIndex, &["2"]);
        let textbox = TextBox::from_properties(&mut bag).unwrap();
        assert_eq!(textbox.password_char, '*');
        assert_eq!(textbox.tab.tab_index, 2);

        let mut bag = PropertyBag::new().with(P::PasswordChar, &["#"]);
        assert_eq!(TextBox::from_properties(&mut bag).unwrap().password_char, '#');
    }

    #[test]
    fn unconsumed_properties_are_detected() {
        let mut bag = PropertyBag::new()
            .with(P::Left, &["15"])
            .with(P::Caption, &["not for images"]);
        Image::from_properties(&mut bag).unwrap();
        assert!(matches!(
            bag.ensure_consumed(),
            Err(Error::UnexpectedProperty(ref keys)) if keys == &[P::Caption]
        ));
    }

    #[test]
    fn form_children_keep_order() {
        let children = vec![
            ("Image2".to_string(), Control::Image(Image::default())),
            ("Label1".to_string(), Control::Label(Label::default())),
            ("Image1".to_string(), Control::Image(Image::default())),
            ("Line1".to_string(), Control::Line(Line::default())),
        ];
        let form = Form::from_properties(&mut PropertyBag::new(), children).unwrap();

        assert_eq!(
            form.images.names().collect::<Vec<_>>(),
            vec!["Image2", "Image1"]
        );
        assert!(form.label("Label1").is_some());
        assert_eq!(form.controls.get("Line1").map(Control::kind), Some(ControlKind::Line));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let children = vec![
            ("Image1".to_string(), Control::Image(Image::default())),
            ("Image1".to_string(), Control::Image(Image::default())),
        ];
        assert!(matches!(
            Form::from_properties(&mut PropertyBag::new(), children),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn required_lookups() {
        let form = Form::default();
        assert!(form.image("Image1").is_none());
        match form.require_image("Image1") {
            Err(Error::MissingControl { kind, name }) => {
                assert_eq!(kind, ControlKind::Image);
                assert_eq!(name, "Image1");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn control_rect_uses_client_origin() {
        let mut form = Form::default();
        form.client_left = 4;
        form.client_top = 23;
        let mut image = Image::default();
        image.position = PositionFacet { left: 10, top: 20 };
        image.extent.width = 30;
        image.extent.height = 40;

        assert_eq!(form.control_rect(&image), Rect::new(14, 43, 44, 83));
    }
}
