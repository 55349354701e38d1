pub mod compositor;

use std::{
    cmp::{max, min},
    fmt::{self, Formatter, Result},
};

use crate::{
    config::{SCREEN_HEIGHT, SCREEN_WIDTH},
    res::Picture,
};

pub const SCREEN_RESOLUTION: [usize; 2] = [SCREEN_WIDTH, SCREEN_HEIGHT];

pub const WHITE: u32 = 0x00ff_ffff;
pub const BLACK: u32 = 0x0000_0000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

impl<T: fmt::Display> fmt::Display for Point<T> {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl<T> Point<T> {
    pub fn new(x: T, y: T) -> Self {
        Point { x, y }
    }
}

/// Half-open rectangle: `right` and `bottom` are excluded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Rect {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Rect::new(left, top, left + width, top + height)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    pub fn contains(&self, p: Point<i32>) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect::new(
            max(self.left, other.left),
            max(self.top, other.top),
            min(self.right, other.right),
            min(self.bottom, other.bottom),
        )
    }
}

/// The screen we compose frames into, one `0x00RRGGBB` word per pixel.
#[derive(Clone)]
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Self {
        Surface {
            width,
            height,
            pixels: vec![BLACK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixels per row.
    pub fn stride(&self) -> usize {
        self.width
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(0, 0, self.width as i32, self.height as i32)
    }

    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    pub fn fill_rect(&mut self, rect: Rect, color: u32) {
        let rect = rect.intersect(&self.bounds());
        if rect.is_empty() {
            return;
        }

        for y in rect.top..rect.bottom {
            let line = y as usize * self.width;
            self.pixels[line + rect.left as usize..line + rect.right as usize].fill(color);
        }
    }

    /// Copies the top-left `width`x`height` part of `picture` to `(x, y)`.
    pub fn blit(&mut self, picture: &Picture, x: i32, y: i32, width: i32, height: i32) {
        let width = min(width, picture.width as i32);
        let height = min(height, picture.height as i32);
        let dst = Rect::from_size(x, y, width, height).intersect(&self.bounds());
        if dst.is_empty() {
            return;
        }

        for dy in dst.top..dst.bottom {
            let sy = (dy - y) as usize;
            let sx = (dst.left - x) as usize;
            let src = &picture.pixels[sy * picture.width + sx..][..dst.width() as usize];
            let line = dy as usize * self.width;
            self.pixels[line + dst.left as usize..line + dst.right as usize].copy_from_slice(src);
        }
    }

    /// Blends `color` into the pixel at `(x, y)` with the given coverage.
    pub fn blend(&mut self, x: i32, y: i32, color: u32, coverage: u8) {
        if !self.bounds().contains(Point::new(x, y)) || coverage == 0 {
            return;
        }

        let index = y as usize * self.width + x as usize;
        let old = self.pixels[index];
        let a = coverage as u32;
        let mix = |shift: u32| {
            let s = (color >> shift) & 0xff;
            let d = (old >> shift) & 0xff;
            ((s * a + d * (255 - a)) / 255) << shift
        };
        self.pixels[index] = mix(16) | mix(8) | mix(0);
    }
}
