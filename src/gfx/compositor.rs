use log::trace;

use super::{Rect, Surface, BLACK, SCREEN_RESOLUTION, WHITE};
use crate::{
    controls::{Form, Label},
    error::Result,
    font::Font,
    res::{ms_color_to_rgb, PictureCache},
};

/// Composes forms and captions into the screen surface.
pub struct Compositor {
    surface: Surface,
    cache: PictureCache,
}

impl Default for Compositor {
    fn default() -> Self {
        Compositor {
            surface: Surface::new(SCREEN_RESOLUTION[0], SCREEN_RESOLUTION[1]),
            cache: PictureCache::new(),
        }
    }
}

impl Compositor {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn cache(&self) -> &PictureCache {
        &self.cache
    }

    /// Forgets the pictures of scenes we are not coming back to.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn clear(&mut self, color: u32) {
        let bounds = self.surface.bounds();
        self.surface.fill_rect(bounds, color);
    }

    /// Blanks `rect`, used for hidden forms.
    pub fn hide_rect(&mut self, rect: Rect) {
        self.surface.fill_rect(rect, BLACK);
    }

    /// Draws the client area of `form`: its background picture, then each
    /// visible image in declaration order.
    pub fn draw_form(&mut self, form: &Form) -> Result<()> {
        let client = form.client_rect();
        self.surface.fill_rect(client, WHITE);

        if let Some(loc) = &form.picture.picture {
            let picture = self.cache.get(loc)?;
            self.surface
                .blit(&picture, client.left, client.top, client.width(), client.height());
        }

        for (name, image) in form.images.iter() {
            if !image.is_visible() {
                continue;
            }
            let loc = match &image.picture.picture {
                Some(loc) => loc,
                None => continue,
            };
            trace!("drawing image {}", name);

            let rect = form.control_rect(image);
            let picture = self.cache.get(loc)?;
            self.surface
                .blit(&picture, rect.left, rect.top, rect.width(), rect.height());
        }

        Ok(())
    }

    /// Draws `text` in the rectangle of `label` over a black background, or
    /// just blanks it if `text` is empty.
    pub fn draw_caption(&mut self, form: &Form, label: &Label, text: &str, font: &dyn Font) {
        let rect = form.control_rect(label);
        self.surface.fill_rect(rect, BLACK);
        if !text.is_empty() {
            font.draw_string(
                &mut self.surface,
                text,
                rect,
                ms_color_to_rgb(label.color.fore_color),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixtures::{self, FormFixture, ImageFixture},
        forms::read_forms,
    };

    #[test]
    fn images_drawn_over_background_in_order() {
        let mut form = FormFixture::new("Form7", [0, 0, 100, 100]);
        form.client = [10, 10, 80, 80];
        form.picture = Some(fixtures::bmp(80, 80, 0x0000_00ff));
        form.images = vec![
            ImageFixture::solid("Image1", [0, 0, 20, 20], true, 0x00ff_0000),
            ImageFixture::solid("Image2", [10, 10, 20, 20], true, 0x0000_ff00),
            ImageFixture::solid("Image3", [50, 50, 20, 20], false, 0x00ff_ffff),
        ];
        let file = fixtures::write_temp_archive(&[form]);
        let forms = read_forms(file.path()).unwrap();

        let mut compositor = Compositor::new();
        compositor.draw_form(forms.get("Form7").unwrap()).unwrap();
        let s = compositor.surface();

        assert_eq!(s.pixel(5, 5), BLACK);
        assert_eq!(s.pixel(12, 12), 0x00ff_0000);
        // Image2 overlaps Image1 and comes later.
        assert_eq!(s.pixel(25, 25), 0x0000_ff00);
        // Hidden Image3 leaves the background.
        assert_eq!(s.pixel(65, 65), 0x0000_00ff);
        // Hidden images are never loaded.
        assert_eq!(compositor.cache().len(), 3);
    }

    #[test]
    fn client_area_defaults_to_white() {
        let file = fixtures::write_temp_archive(&[FormFixture::new("Form8", [0, 0, 50, 50])]);
        let forms = read_forms(file.path()).unwrap();

        let mut compositor = Compositor::new();
        compositor.draw_form(forms.get("Form8").unwrap()).unwrap();
        assert_eq!(compositor.surface().pixel(10, 10), WHITE);
        assert_eq!(compositor.surface().pixel(60, 60), BLACK);
    }

    #[test]
    fn missing_asset_is_reported() {
        let mut form = FormFixture::new("Form7", [0, 0, 10, 10]);
        form.images = vec![ImageFixture::solid("Image1", [0, 0, 2, 2], true, 0)];
        let data = fixtures::write_archive(&[form]);
        let forms = crate::forms::read_forms_from(
            &mut std::io::Cursor::new(data),
            std::path::Path::new("/nonexistent/yahtzee.dat"),
        )
        .unwrap();

        let mut compositor = Compositor::new();
        assert!(matches!(
            compositor.draw_form(forms.get("Form7").unwrap()),
            Err(crate::error::Error::AssetNotFound { .. })
        ));
    }
}
