//! Reader for the form archive (`yahtzee.dat`).
//!
//! The archive is a 4-byte prefix, a form count, then each form as a name
//! followed by its properties and child controls. Numbers are big-endian,
//! except picture lengths, which are little-endian like the bitmaps they
//! precede. Geometry is stored in picas and converted to pixels when the
//! controls are built.

use byteorder::{ReadBytesExt, BE, LE};
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use log::{debug, info, trace};

use crate::{
    config::{FRIDAY_PREFIX, OTHER_PREFIXES},
    controls::{
        props::{ControlProperty as P, PropertyBag},
        Control, ControlKind, ControlMap, Form,
    },
    error::{Error, Result},
};

/// All the forms of an archive, by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormSet {
    forms: BTreeMap<String, Form>,
}

impl FormSet {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert(&mut self, name: &str, form: Form) -> Result<()> {
        if self.forms.contains_key(name) {
            return Err(Error::Format(format!("duplicate form name {:?}", name)));
        }
        self.forms.insert(name.to_string(), form);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Form> {
        self.forms.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Form> {
        self.forms.get_mut(name)
    }

    pub fn require(&self, name: &str) -> Result<&Form> {
        self.get(name)
            .ok_or_else(|| Error::missing(ControlKind::Form, name))
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    /// Human-readable listing of every form and its controls.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (name, form) in &self.forms {
            let _ = writeln!(
                out,
                "{} {:?}: {} client {:?}{}",
                name,
                form.caption.caption,
                form.rect_description(),
                form.client_rect(),
                match &form.picture.picture {
                    Some(loc) => format!(" picture @0x{:x}", loc.location),
                    None => String::new(),
                }
            );
            describe_map(&mut out, "label", &form.labels, |l| {
                format!("{:?} font {:?} {}", l.caption.caption, l.font.name, l.font.size)
            });
            describe_map(&mut out, "image", &form.images, |i| {
                format!(
                    "{}x{}+{}+{}{}",
                    i.extent.width,
                    i.extent.height,
                    i.position.left,
                    i.position.top,
                    if i.is_visible() { "" } else { " hidden" }
                )
            });
            describe_map(&mut out, "timer", &form.timers, |t| {
                format!("every {}ms", t.interval)
            });
            describe_map(&mut out, "command button", &form.command_buttons, |b| {
                format!("{:?}", b.caption.caption)
            });
            describe_map(&mut out, "option button", &form.option_buttons, |b| {
                format!("{:?}", b.caption.caption)
            });
            describe_map(&mut out, "textbox", &form.textboxes, |t| {
                format!("password char {:?}", t.password_char)
            });
        }
        out
    }
}

fn describe_map<T, F: Fn(&T) -> String>(out: &mut String, kind: &str, map: &ControlMap<T>, f: F) {
    for (name, control) in map.iter() {
        let _ = writeln!(out, "    {} {}: {}", kind, name, f(control));
    }
}

impl Form {
    fn rect_description(&self) -> String {
        format!(
            "{}x{}+{}+{}",
            self.extent.width, self.extent.height, self.position.left, self.position.top
        )
    }
}

/// Reads all the forms of the archive at `path`.
pub fn read_forms<P: AsRef<Path>>(path: P) -> Result<FormSet> {
    let path = path.as_ref();
    info!("Reading forms from {}", path.display());
    let mut reader = BufReader::new(File::open(path)?);
    read_forms_from(&mut reader, path)
}

/// Reads an archive from `reader`. `filename` is recorded in the `Fileloc`
/// of every picture so they can be loaded later.
pub fn read_forms_from<R: Read + Seek>(reader: &mut R, filename: &Path) -> Result<FormSet> {
    let len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;

    // Pictures refer back to the archive by name.
    let filename = filename
        .to_str()
        .ok_or_else(|| Error::Format(format!("archive path {:?} is not UTF-8", filename)))?
        .to_string();
    let mut archive = ArchiveReader {
        reader,
        filename,
        len,
    };

    let mut prefix = [0u8; 4];
    archive
        .reader
        .read_exact(&mut prefix)
        .map_err(|e| Error::from_read(e, "archive prefix"))?;
    if &prefix != FRIDAY_PREFIX {
        return Err(Error::Format(
            match OTHER_PREFIXES.iter().find(|(p, _)| **p == prefix) {
                Some((_, game)) => format!("archive belongs to {}", game),
                None => format!("unexpected archive prefix {:02x?}", prefix),
            },
        ));
    }

    let count = archive.u8("form count")?;
    debug!("{} forms in archive", count);

    let mut forms = FormSet::new();
    for _ in 0..count {
        let name = archive.pascal_string("form name")?;
        let form = archive.form(&name)?;
        debug!(
            "Form {}: {} labels, {} images, {} timers",
            name,
            form.labels.len(),
            form.images.len(),
            form.timers.len()
        );
        forms.insert(&name, form)?;
    }

    Ok(forms)
}

struct ArchiveReader<'a, R> {
    reader: &'a mut R,
    filename: String,
    len: u64,
}

// Each control is read into a `PropertyBag` of raw tokens, then built by
// the same `from_properties` path as textual descriptions. Leftover
// properties are an error.
impl<'a, R: Read + Seek> ArchiveReader<'a, R> {
    fn u8(&mut self, what: &str) -> Result<u8> {
        self.reader.read_u8().map_err(|e| Error::from_read(e, what))
    }

    fn u32(&mut self, what: &str) -> Result<u32> {
        self.reader
            .read_u32::<BE>()
            .map_err(|e| Error::from_read(e, what))
    }

    fn number(&mut self, key: P, bag: &mut PropertyBag) -> Result<()> {
        let value = self.u32(key.name())?;
        bag.set(key, &[value.to_string()]);
        Ok(())
    }

    /// Geometry stays in picas in the bag; conversion happens on assignment.
    fn picas(&mut self, key: P, bag: &mut PropertyBag) -> Result<()> {
        let raw = self.u32(key.name())?;
        let picas = i32::try_from(raw)
            .map_err(|_| Error::Format(format!("{} of {} picas is out of range", key, raw)))?;
        bag.set(key, &[picas.to_string()]);
        Ok(())
    }

    fn flag(&mut self, key: P, bag: &mut PropertyBag) -> Result<()> {
        let value = self.u8(key.name())? != 0;
        bag.set(key, &[if value { "1" } else { "0" }]);
        Ok(())
    }

    fn remaining(&mut self) -> Result<u64> {
        let pos = self.reader.stream_position()?;
        Ok(self.len.saturating_sub(pos))
    }

    fn bytes(&mut self, len: usize, what: &str) -> Result<Vec<u8>> {
        if len as u64 > self.remaining()? {
            return Err(Error::TruncatedData(what.to_string()));
        }
        let mut data = vec![0u8; len];
        self.reader
            .read_exact(&mut data)
            .map_err(|e| Error::from_read(e, what))?;
        Ok(data)
    }

    // Strings are single-byte Windows text; Latin-1 decoding keeps every byte.
    fn string(&mut self, len: usize, what: &str) -> Result<String> {
        Ok(self.bytes(len, what)?.iter().map(|&b| b as char).collect())
    }

    fn pascal_string(&mut self, what: &str) -> Result<String> {
        let len = self.u8(what)?;
        self.string(len as usize, what)
    }

    fn pascal(&mut self, key: P, bag: &mut PropertyBag) -> Result<()> {
        let value = self.pascal_string(key.name())?;
        bag.set(key, &[value]);
        Ok(())
    }

    fn caption(&mut self, bag: &mut PropertyBag) -> Result<()> {
        let len = self.u32("caption length")?;
        let caption = self.string(len as usize, P::Caption.name())?;
        bag.set(P::Caption, &[caption]);
        Ok(())
    }

    /// Skips over a picture, recording where it starts.
    fn picture(&mut self, bag: &mut PropertyBag) -> Result<()> {
        let location = self.reader.stream_position()?;
        let len = self
            .reader
            .read_u32::<LE>()
            .map_err(|e| Error::from_read(e, "picture length"))?;
        if len as u64 > self.remaining()? {
            return Err(Error::TruncatedData("picture data".to_string()));
        }
        self.reader.seek(SeekFrom::Current(len as i64))?;
        trace!("picture of {} bytes at 0x{:x}", len, location);

        let location = u32::try_from(location)
            .map_err(|_| Error::Format(format!("picture offset 0x{:x} is out of range", location)))?;
        bag.set(
            P::Picture,
            &[self.filename.clone(), format!("0x{:x}", location)],
        );
        Ok(())
    }

    fn visible(&mut self, bag: &mut PropertyBag) -> Result<()> {
        self.picas(P::Height, bag)?;
        self.picas(P::Width, bag)?;
        self.flag(P::Visible, bag)
    }

    fn position(&mut self, bag: &mut PropertyBag) -> Result<()> {
        self.picas(P::Top, bag)?;
        self.picas(P::Left, bag)
    }

    fn color(&mut self, bag: &mut PropertyBag) -> Result<()> {
        self.number(P::BackColor, bag)?;
        self.number(P::ForeColor, bag)
    }

    fn label(&mut self, bag: &mut PropertyBag) -> Result<()> {
        self.visible(bag)?;
        self.position(bag)?;
        self.color(bag)?;
        self.number(P::TabIndex, bag)?;
        self.caption(bag)?;
        self.number(P::BackStyle, bag)?;
        self.number(P::Alignment, bag)?;
        self.pascal(P::FontName, bag)?;
        self.number(P::FontSize, bag)?;
        self.flag(P::AutoSize, bag)?;
        self.flag(P::FontBold, bag)?;
        self.flag(P::FontItalic, bag)?;
        self.flag(P::FontStrikeThru, bag)?;
        self.flag(P::FontUnderline, bag)
    }

    fn image(&mut self, bag: &mut PropertyBag) -> Result<()> {
        self.visible(bag)?;
        self.position(bag)?;
        self.picture(bag)
    }

    fn timer(&mut self, bag: &mut PropertyBag) -> Result<()> {
        self.position(bag)?;
        self.number(P::Interval, bag)
    }

    fn textbox(&mut self, bag: &mut PropertyBag) -> Result<()> {
        self.visible(bag)?;
        self.position(bag)?;
        self.number(P::TabIndex, bag)?;
        let password_char = self.u8(P::PasswordChar.name())? as char;
        bag.set(P::PasswordChar, &[password_char.to_string()]);
        Ok(())
    }

    fn command_button(&mut self, bag: &mut PropertyBag) -> Result<()> {
        self.visible(bag)?;
        self.position(bag)?;
        self.number(P::TabIndex, bag)?;
        self.caption(bag)
    }

    fn option_button(&mut self, bag: &mut PropertyBag) -> Result<()> {
        self.visible(bag)?;
        self.position(bag)?;
        self.number(P::TabIndex, bag)?;
        self.color(bag)?;
        self.caption(bag)
    }

    fn read_properties(&mut self, kind: ControlKind, bag: &mut PropertyBag) -> Result<()> {
        match kind {
            ControlKind::Label => self.label(bag),
            ControlKind::Image => self.image(bag),
            ControlKind::Timer => self.timer(bag),
            ControlKind::TextBox => self.textbox(bag),
            ControlKind::CommandButton => self.command_button(bag),
            ControlKind::OptionButton => self.option_button(bag),
            ControlKind::Form | ControlKind::Line => Err(Error::Format(format!(
                "{} controls cannot be nested in an archive form",
                kind
            ))),
        }
    }

    fn controls(&mut self, kind: ControlKind, children: &mut Vec<(String, Control)>) -> Result<()> {
        let count = self.u8("control count")?;
        for _ in 0..count {
            let name = self.pascal_string("control name")?;
            let mut bag = PropertyBag::new();
            self.read_properties(kind, &mut bag)?;
            let control = Control::from_properties(kind, &mut bag)?;
            bag.ensure_consumed()?;
            trace!("{} {}", control.kind(), name);
            children.push((name, control));
        }
        Ok(())
    }

    fn form(&mut self, name: &str) -> Result<Form> {
        trace!("reading form {}", name);
        let mut bag = PropertyBag::new();
        self.visible(&mut bag)?;
        self.position(&mut bag)?;
        self.color(&mut bag)?;
        self.caption(&mut bag)?;
        self.number(P::BorderStyle, &mut bag)?;
        self.picas(P::ClientHeight, &mut bag)?;
        self.picas(P::ClientLeft, &mut bag)?;
        self.picas(P::ClientWidth, &mut bag)?;
        self.picas(P::ClientTop, &mut bag)?;
        self.pascal(P::LinkTopic, &mut bag)?;
        self.number(P::ScaleHeight, &mut bag)?;
        self.number(P::ScaleWidth, &mut bag)?;

        let mut children = Vec::new();
        for kind in ARCHIVE_CONTROL_ORDER.iter() {
            self.controls(*kind, &mut children)?;
        }

        if self.u8("picture flag")? != 0 {
            self.picture(&mut bag)?;
        }

        let form = Form::from_properties(&mut bag, children)?;
        bag.ensure_consumed()?;
        Ok(form)
    }
}

/// Order of the control lists within an archive form.
const ARCHIVE_CONTROL_ORDER: [ControlKind; 6] = [
    ControlKind::Label,
    ControlKind::Timer,
    ControlKind::CommandButton,
    ControlKind::OptionButton,
    ControlKind::TextBox,
    ControlKind::Image,
];
