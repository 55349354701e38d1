//! Fonts used to draw control captions.
//!
//! The game ships Windows bitmap fonts (`.FON`) for its captions and a
//! TrueType face for the main menu. We only rasterize TrueType fonts, so
//! bitmap font requests are served by a TrueType substitute.

use std::{
    fs,
    path::{Path, PathBuf},
};

use fontdue::FontSettings;
use log::info;

use crate::{
    error::{Error, Result},
    gfx::{Rect, Surface},
};

pub trait Font {
    /// Draws `text` left-aligned at the top of `area`, clipped to its width.
    fn draw_string(&self, surface: &mut Surface, text: &str, area: Rect, color: u32);
}

pub trait FontLoader {
    /// Loads the face `name` at `size` points out of a bitmap font file.
    fn load_bitmap_font(&self, file: &Path, name: &str, size: f64) -> Result<Box<dyn Font>>;
    /// Loads a TrueType font file at `size` points.
    fn load_outline_font(&self, file: &Path, size: f64) -> Result<Box<dyn Font>>;
}

pub struct TrueTypeFont {
    font: fontdue::Font,
    px: f32,
}

impl TrueTypeFont {
    pub fn from_file(path: &Path, px: f32) -> Result<Self> {
        let data = fs::read(path)
            .map_err(|e| Error::Font(format!("cannot read {}: {}", path.display(), e)))?;
        let font = fontdue::Font::from_bytes(data, FontSettings::default())
            .map_err(|e| Error::Font(format!("cannot parse {}: {}", path.display(), e)))?;

        Ok(TrueTypeFont { font, px })
    }
}

impl Font for TrueTypeFont {
    fn draw_string(&self, surface: &mut Surface, text: &str, area: Rect, color: u32) {
        let ascent = self
            .font
            .horizontal_line_metrics(self.px)
            .map(|m| m.ascent)
            .unwrap_or(self.px);
        let baseline = area.top + ascent.ceil() as i32;
        let mut pen = area.left as f32;

        for c in text.chars() {
            let (metrics, coverage) = self.font.rasterize(c, self.px);
            let x0 = pen.round() as i32 + metrics.xmin;
            if x0 + metrics.width as i32 > area.right {
                break;
            }
            let y0 = baseline - metrics.ymin - metrics.height as i32;

            for (i, &alpha) in coverage.iter().enumerate() {
                let x = x0 + (i % metrics.width) as i32;
                let y = y0 + (i / metrics.width) as i32;
                if y >= area.top && y < area.bottom {
                    surface.blend(x, y, color, alpha);
                }
            }
            pen += metrics.advance_width;
        }
    }
}

// Points to pixels at the 96 DPI the game was designed for.
fn points_to_px(size: f64) -> f32 {
    (size * 4.0 / 3.0) as f32
}

/// Rasterizes a TrueType substitute with fontdue.
pub struct FontdueLoader {
    substitute: PathBuf,
}

impl FontdueLoader {
    pub fn new<P: Into<PathBuf>>(substitute: P) -> Self {
        FontdueLoader {
            substitute: substitute.into(),
        }
    }
}

impl FontLoader for FontdueLoader {
    fn load_bitmap_font(&self, file: &Path, name: &str, size: f64) -> Result<Box<dyn Font>> {
        info!(
            "Using {} in place of {} from {}",
            self.substitute.display(),
            name,
            file.display()
        );
        Ok(Box::new(TrueTypeFont::from_file(
            &self.substitute,
            points_to_px(size),
        )?))
    }

    fn load_outline_font(&self, file: &Path, size: f64) -> Result<Box<dyn Font>> {
        info!("Loading {} at {}pt", file.display(), size);
        Ok(Box::new(TrueTypeFont::from_file(file, points_to_px(size))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_font_file_is_an_error() {
        let loader = FontdueLoader::new("/nonexistent/font.ttf");
        assert!(matches!(
            loader.load_bitmap_font(Path::new("SERIFEB.FON"), "MS Serif", 8.25),
            Err(Error::Font(_))
        ));
        assert!(matches!(
            loader.load_outline_font(Path::new("/nonexistent/menu.ttf"), 12.0),
            Err(Error::Font(_))
        ));
    }

    #[test]
    fn garbage_font_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("font.ttf");
        fs::write(&path, b"not a font").unwrap();
        assert!(matches!(
            TrueTypeFont::from_file(&path, 12.0),
            Err(Error::Font(_))
        ));
    }
}
