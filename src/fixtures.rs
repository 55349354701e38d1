//! Synthetic archives and helpers shared by the tests.

use std::{io::Write, path::Path};

use crate::{
    config::FRIDAY_PREFIX,
    controls::PICAS_PER_PIXEL,
    error::Result,
    font::{Font, FontLoader},
    gfx::{Rect, Surface},
};

/// 24-bit uncompressed bitmap of a single `0xRRGGBB` color.
pub fn bmp(width: u32, height: u32, color: u32) -> Vec<u8> {
    let row_size = (width * 3 + 3) & !3;
    let image_size = row_size * height;
    let mut data = Vec::new();

    data.extend_from_slice(b"BM");
    data.extend_from_slice(&(54 + image_size).to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&54u32.to_le_bytes());

    data.extend_from_slice(&40u32.to_le_bytes());
    data.extend_from_slice(&(width as i32).to_le_bytes());
    data.extend_from_slice(&(height as i32).to_le_bytes());
    data.extend_from_slice(&1u16.to_le_bytes());
    data.extend_from_slice(&24u16.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&image_size.to_le_bytes());
    data.extend_from_slice(&2835u32.to_le_bytes());
    data.extend_from_slice(&2835u32.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());

    let [b, g, r] = [color as u8, (color >> 8) as u8, (color >> 16) as u8];
    for _ in 0..height {
        for _ in 0..width {
            data.extend_from_slice(&[b, g, r]);
        }
        for _ in width * 3..row_size {
            data.push(0);
        }
    }

    data
}

/// Low-level archive writer.
pub struct ArchiveWriter {
    data: Vec<u8>,
}

impl ArchiveWriter {
    pub fn new(count: u8) -> Self {
        let mut data = FRIDAY_PREFIX.to_vec();
        data.push(count);
        ArchiveWriter { data }
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.data.push(v);
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.data.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn picas(&mut self, pixels: i32) -> &mut Self {
        self.u32((pixels * PICAS_PER_PIXEL) as u32)
    }

    pub fn pascal(&mut self, s: &str) -> &mut Self {
        self.data.push(s.len() as u8);
        self.data.extend_from_slice(s.as_bytes());
        self
    }

    pub fn caption(&mut self, s: &str) -> &mut Self {
        self.u32(s.len() as u32);
        self.data.extend_from_slice(s.as_bytes());
        self
    }

    pub fn picture(&mut self, bmp: &[u8]) -> &mut Self {
        self.data.extend_from_slice(&(bmp.len() as u32).to_le_bytes());
        self.data.extend_from_slice(bmp);
        self
    }

    /// Height, width and visibility of a `[left, top, width, height]` rect.
    pub fn visible(&mut self, rect: [i32; 4], visible: bool) -> &mut Self {
        self.picas(rect[3]).picas(rect[2]).u8(visible as u8)
    }

    pub fn position(&mut self, rect: [i32; 4]) -> &mut Self {
        self.picas(rect[1]).picas(rect[0])
    }

    pub fn finish(self) -> Vec<u8> {
        self.data
    }
}

#[derive(Clone, Default)]
pub struct LabelFixture {
    pub name: &'static str,
    pub rect: [i32; 4],
    pub caption: &'static str,
    pub font_name: &'static str,
    pub font_size: u32,
    pub fore_color: u32,
}

impl LabelFixture {
    pub fn new(name: &'static str, rect: [i32; 4], caption: &'static str) -> Self {
        LabelFixture {
            name,
            rect,
            caption,
            font_name: "MS Serif",
            font_size: 8,
            fore_color: 0x00ff_ffff,
        }
    }
}

#[derive(Clone)]
pub struct ImageFixture {
    pub name: &'static str,
    pub rect: [i32; 4],
    pub visible: bool,
    pub bmp: Vec<u8>,
}

impl ImageFixture {
    pub fn new(name: &'static str, rect: [i32; 4], visible: bool, bmp: Vec<u8>) -> Self {
        ImageFixture {
            name,
            rect,
            visible,
            bmp,
        }
    }

    /// Image filled with `color` and exactly as large as its control.
    pub fn solid(name: &'static str, rect: [i32; 4], visible: bool, color: u32) -> Self {
        ImageFixture::new(name, rect, visible, bmp(rect[2] as u32, rect[3] as u32, color))
    }
}

/// Geometry is given in pixels; `[left, top, width, height]`.
#[derive(Clone, Default)]
pub struct FormFixture {
    pub name: &'static str,
    pub caption: &'static str,
    pub rect: [i32; 4],
    pub client: [i32; 4],
    pub labels: Vec<LabelFixture>,
    pub timers: Vec<(&'static str, u32)>,
    pub command_buttons: Vec<(&'static str, [i32; 4], &'static str)>,
    pub textboxes: Vec<(&'static str, [i32; 4], char)>,
    pub images: Vec<ImageFixture>,
    pub picture: Option<Vec<u8>>,
}

impl FormFixture {
    pub fn new(name: &'static str, rect: [i32; 4]) -> Self {
        FormFixture {
            name,
            rect,
            client: rect,
            ..Default::default()
        }
    }

    fn write(&self, w: &mut ArchiveWriter) {
        w.pascal(self.name)
            .visible(self.rect, true)
            .position(self.rect)
            .u32(0)
            .u32(0)
            .caption(self.caption)
            .u32(0)
            .picas(self.client[3])
            .picas(self.client[0])
            .picas(self.client[2])
            .picas(self.client[1])
            .pascal("")
            .u32(0)
            .u32(0);

        w.u8(self.labels.len() as u8);
        for label in &self.labels {
            w.pascal(label.name)
                .visible(label.rect, true)
                .position(label.rect)
                .u32(0)
                .u32(label.fore_color)
                .u32(0)
                .caption(label.caption)
                .u32(0)
                .u32(0)
                .pascal(label.font_name)
                .u32(label.font_size)
                .u8(0)
                .u8(0)
                .u8(0)
                .u8(0)
                .u8(0);
        }

        w.u8(self.timers.len() as u8);
        for (name, interval) in &self.timers {
            w.pascal(name).u32(0).u32(0).u32(*interval);
        }

        w.u8(self.command_buttons.len() as u8);
        for (name, rect, caption) in &self.command_buttons {
            w.pascal(name)
                .visible(*rect, true)
                .position(*rect)
                .u32(0)
                .caption(caption);
        }

        // Option buttons.
        w.u8(0);

        w.u8(self.textboxes.len() as u8);
        for (name, rect, password_char) in &self.textboxes {
            w.pascal(name)
                .visible(*rect, true)
                .position(*rect)
                .u32(0)
                .u8(*password_char as u8);
        }

        w.u8(self.images.len() as u8);
        for image in &self.images {
            w.pascal(image.name)
                .visible(image.rect, image.visible)
                .position(image.rect)
                .picture(&image.bmp);
        }

        match &self.picture {
            Some(bmp) => w.u8(1).picture(bmp),
            None => w.u8(0),
        };
    }
}

pub fn write_archive(forms: &[FormFixture]) -> Vec<u8> {
    let mut writer = ArchiveWriter::new(forms.len() as u8);
    for form in forms {
        form.write(&mut writer);
    }
    writer.finish()
}

pub fn write_temp_archive(forms: &[FormFixture]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&write_archive(forms)).unwrap();
    file.flush().unwrap();
    file
}

pub const MUG_COLOR: u32 = 0x00c0_4000;
pub const ARTHUR_COLOR: u32 = 0x00ff_d000;
pub const INVENTORY_MUG_COLOR: u32 = 0x0000_c000;
pub const INTRO_FACE1_COLOR: u32 = 0x00ff_0000;
pub const INTRO_FACE2_COLOR: u32 = 0x0000_00ff;

/// A small version of the game: menus, the intro, the inventory and the
/// first scenes.
pub fn game_forms() -> Vec<FormFixture> {
    let mut intro = FormFixture::new("Form2", [0, 0, 640, 360]);
    intro.images = vec![
        ImageFixture::solid("Image1", [100, 100, 50, 50], true, INTRO_FACE1_COLOR),
        ImageFixture::solid("Image2", [100, 100, 50, 50], false, INTRO_FACE2_COLOR),
    ];
    intro.timers = vec![("Timer1", 10)];

    let mut inventory = FormFixture::new("Form6", [0, 368, 640, 112]);
    inventory.labels = vec![
        LabelFixture::new("comm", [10, 70, 60, 15], "LOOK AT"),
        LabelFixture::new("item", [400, 10, 200, 20], ""),
        LabelFixture::new("useitem", [400, 40, 200, 20], ""),
    ];
    inventory.images = vec![
        ImageFixture::solid("Image1", [10, 10, 30, 20], true, 0x0080_8080),
        ImageFixture::solid("Image2", [10, 35, 30, 20], true, 0x0080_8080),
        ImageFixture::solid("Image3", [40, 10, 30, 20], true, 0x0080_8080),
        ImageFixture::solid("Image4", [40, 35, 30, 20], true, 0x0080_8080),
        ImageFixture::solid("Image25", [600, 10, 30, 30], true, 0x0080_0000),
        ImageFixture::solid("Image5", [100, 20, 40, 40], false, INVENTORY_MUG_COLOR),
    ];

    let mut cell = FormFixture::new("Form7", [0, 0, 640, 360]);
    cell.caption = "Cell";
    cell.images = vec![
        ImageFixture::solid("Image1", [100, 100, 40, 40], true, MUG_COLOR),
        ImageFixture::solid("Image2", [200, 100, 80, 120], true, ARTHUR_COLOR),
        ImageFixture::solid("Image3", [200, 100, 80, 120], false, 0x00d0_a000),
        ImageFixture::solid("Image4", [200, 100, 80, 120], false, 0x00a0_d000),
    ];
    cell.labels = vec![
        LabelFixture::new("Label1", [300, 50, 100, 150], ""),
        LabelFixture::new("Label2", [450, 50, 100, 100], ""),
    ];

    let mut password = FormFixture::new("Form17", [100, 100, 300, 150]);
    password.textboxes = vec![("Text1", [10, 40, 200, 20], '?')];
    password.command_buttons = vec![("Command2", [220, 40, 60, 20], "OK")];

    let mut menu = FormFixture::new("Form1", [0, 0, 640, 480]);
    menu.labels = vec![
        LabelFixture {
            font_name: "Times New Roman",
            font_size: 12,
            ..LabelFixture::new("Label9", [240, 300, 160, 30], "New game")
        },
        LabelFixture::new("Label10", [240, 340, 160, 30], "Quit"),
    ];

    vec![
        menu,
        intro,
        inventory,
        cell,
        FormFixture::new("Form8", [0, 0, 640, 360]),
        FormFixture::new("Form9", [0, 0, 640, 480]),
        FormFixture::new("Form10", [0, 0, 640, 360]),
        FormFixture::new("Form13", [0, 0, 640, 360]),
        password,
    ]
}

pub struct NullFont;

impl Font for NullFont {
    fn draw_string(&self, _surface: &mut Surface, _text: &str, _area: Rect, _color: u32) {}
}

pub struct NullFontLoader;

impl FontLoader for NullFontLoader {
    fn load_bitmap_font(&self, _file: &Path, _name: &str, _size: f64) -> Result<Box<dyn Font>> {
        Ok(Box::new(NullFont))
    }

    fn load_outline_font(&self, _file: &Path, _size: f64) -> Result<Box<dyn Font>> {
        Ok(Box::new(NullFont))
    }
}
