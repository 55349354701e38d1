use byteorder::{ReadBytesExt, LE};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::rc::Rc;

use image::ImageFormat;
use log::{debug, info};

use crate::error::{Error, Result};

/// Location of an asset: a file and the offset of its length-prefixed record
/// inside it. Offset 0 means the record starts the file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Fileloc {
    pub filename: PathBuf,
    pub location: u32,
}

impl Fileloc {
    #[cfg(test)]
    pub fn new<P: Into<PathBuf>>(filename: P, location: u32) -> Self {
        Fileloc {
            filename: filename.into(),
            location,
        }
    }
}

/// Decoded picture, one `0x00RRGGBB` word per pixel, rows top to bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Picture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl Picture {
    #[cfg(test)]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }
}

/// Decodes a Windows bitmap.
pub fn decode_bitmap(data: &[u8]) -> std::result::Result<Picture, String> {
    let img = image::load_from_memory_with_format(data, ImageFormat::Bmp)
        .map_err(|e| e.to_string())?
        .to_rgb8();
    let (width, height) = img.dimensions();

    let pixels = img
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            (r as u32) << 16 | (g as u32) << 8 | b as u32
        })
        .collect();

    Ok(Picture {
        width: width as usize,
        height: height as usize,
        pixels,
    })
}

fn read_record(file: &mut File, location: u32) -> std::result::Result<Vec<u8>, String> {
    if location > 0 {
        file.seek(SeekFrom::Start(location as u64))
            .map_err(|e| e.to_string())?;
    }
    let len = file
        .read_u32::<LE>()
        .map_err(|e| format!("cannot read record length: {}", e))?;

    // Refuse lengths running past the end of the file before allocating.
    let file_len = file.metadata().map_err(|e| e.to_string())?.len();
    let pos = file.stream_position().map_err(|e| e.to_string())?;
    if pos + len as u64 > file_len {
        return Err(format!(
            "record of {} bytes runs past the end of the file",
            len
        ));
    }

    let mut data = vec![0u8; len as usize];
    file.read_exact(&mut data).map_err(|e| e.to_string())?;
    Ok(data)
}

/// Loads the picture stored at `loc`.
pub fn load_picture(loc: &Fileloc) -> Result<Picture> {
    let mut file = File::open(&loc.filename).map_err(|source| Error::AssetNotFound {
        path: loc.filename.clone(),
        source,
    })?;

    let decode_error = |reason: String| Error::AssetDecode {
        path: loc.filename.clone(),
        location: loc.location,
        reason,
    };

    let data = read_record(&mut file, loc.location).map_err(decode_error)?;
    let picture = decode_bitmap(&data).map_err(decode_error)?;

    debug!(
        "Picture {}@0x{:x}: {}x{}",
        loc.filename.display(),
        loc.location,
        picture.width,
        picture.height
    );

    Ok(picture)
}

/// Keeps decoded pictures around so that redraws do not hit the disk.
#[derive(Default)]
pub struct PictureCache {
    pictures: HashMap<Fileloc, Rc<Picture>>,
    hits: usize,
    misses: usize,
}

impl PictureCache {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get(&mut self, loc: &Fileloc) -> Result<Rc<Picture>> {
        if let Some(picture) = self.pictures.get(loc) {
            self.hits += 1;
            return Ok(Rc::clone(picture));
        }

        info!(
            "Loading picture {}@0x{:x}",
            loc.filename.display(),
            loc.location
        );
        let picture = Rc::new(load_picture(loc)?);
        self.misses += 1;
        self.pictures.insert(loc.clone(), Rc::clone(&picture));

        Ok(picture)
    }

    pub fn len(&self) -> usize {
        self.pictures.len()
    }

    /// Drops every picture. Hit and miss counts are kept.
    pub fn clear(&mut self) {
        self.pictures.clear();
    }

    pub fn show_stats(&self) {
        info!(
            "Picture cache: {} entries, {} hits, {} misses",
            self.len(),
            self.hits,
            self.misses
        );
    }
}

/// Windows colors are stored as 0x00BBGGRR, we draw with 0x00RRGGBB.
pub fn ms_color_to_rgb(color: u32) -> u32 {
    let r = color & 0xff;
    let g = (color >> 8) & 0xff;
    let b = (color >> 16) & 0xff;
    r << 16 | g << 8 | b
}
