//! Declarative construction of controls from symbolic properties.
//!
//! A `PropertyBag` holds raw string tokens keyed by `ControlProperty`. Typed
//! fields pull their value out of the bag with `assign_property`, which
//! removes the consumed key so that leftovers can be detected afterwards.

use std::{collections::BTreeMap, convert::TryFrom, fmt, path::PathBuf};

use log::trace;

use crate::{
    error::{Error, Result},
    res::Fileloc,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControlProperty {
    Alignment,
    AutoSize,
    BackColor,
    BackStyle,
    BorderStyle,
    Caption,
    ClientHeight,
    ClientLeft,
    ClientTop,
    ClientWidth,
    FontBold,
    FontItalic,
    FontName,
    FontSize,
    FontStrikeThru,
    FontUnderline,
    ForeColor,
    Height,
    Icon,
    Interval,
    Left,
    LinkTopic,
    PasswordChar,
    Picture,
    ScaleHeight,
    ScaleWidth,
    TabIndex,
    Top,
    Visible,
    Width,
    X1,
    X2,
    Y1,
    Y2,
}

const PROPERTY_NAMES: [(ControlProperty, &str); 34] = [
    (ControlProperty::Alignment, "Alignment"),
    (ControlProperty::AutoSize, "AutoSize"),
    (ControlProperty::BackColor, "BackColor"),
    (ControlProperty::BackStyle, "BackStyle"),
    (ControlProperty::BorderStyle, "BorderStyle"),
    (ControlProperty::Caption, "Caption"),
    (ControlProperty::ClientHeight, "ClientHeight"),
    (ControlProperty::ClientLeft, "ClientLeft"),
    (ControlProperty::ClientTop, "ClientTop"),
    (ControlProperty::ClientWidth, "ClientWidth"),
    (ControlProperty::FontBold, "FontBold"),
    (ControlProperty::FontItalic, "FontItalic"),
    (ControlProperty::FontName, "FontName"),
    (ControlProperty::FontSize, "FontSize"),
    (ControlProperty::FontStrikeThru, "FontStrikethru"),
    (ControlProperty::FontUnderline, "FontUnderline"),
    (ControlProperty::ForeColor, "ForeColor"),
    (ControlProperty::Height, "Height"),
    (ControlProperty::Icon, "Icon"),
    (ControlProperty::Interval, "Interval"),
    (ControlProperty::Left, "Left"),
    (ControlProperty::LinkTopic, "LinkTopic"),
    (ControlProperty::PasswordChar, "PasswordChar"),
    (ControlProperty::Picture, "Picture"),
    (ControlProperty::ScaleHeight, "ScaleHeight"),
    (ControlProperty::ScaleWidth, "ScaleWidth"),
    (ControlProperty::TabIndex, "TabIndex"),
    (ControlProperty::Top, "Top"),
    (ControlProperty::Visible, "Visible"),
    (ControlProperty::Width, "Width"),
    (ControlProperty::X1, "X1"),
    (ControlProperty::X2, "X2"),
    (ControlProperty::Y1, "Y1"),
    (ControlProperty::Y2, "Y2"),
];

impl ControlProperty {
    /// Looks up a property by the name used in form descriptions. Matching is
    /// case-insensitive and ignores the `Font.` qualifier.
    #[cfg(test)]
    pub fn from_name(name: &str) -> Option<ControlProperty> {
        let name: String = name.chars().filter(|&c| c != '.').collect();
        PROPERTY_NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(&name))
            .map(|(p, _)| *p)
    }

    pub fn name(self) -> &'static str {
        PROPERTY_NAMES
            .iter()
            .find(|(p, _)| *p == self)
            .map(|(_, n)| *n)
            .unwrap_or("?")
    }
}

impl fmt::Display for ControlProperty {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Conversion from the raw tokens of a property value.
pub trait FromTokens: Sized {
    fn from_tokens(tokens: &[String]) -> Option<Self>;
}

// The optional second token is the radix of the first one.
fn parse_integer(tokens: &[String]) -> Option<i64> {
    let value = tokens.first()?.trim();
    let radix = match tokens.get(1) {
        Some(radix) => radix.trim().parse::<u32>().ok()?,
        None => 10,
    };
    if !(2..=36).contains(&radix) {
        return None;
    }

    i64::from_str_radix(value, radix).ok()
}

impl FromTokens for i32 {
    fn from_tokens(tokens: &[String]) -> Option<Self> {
        let value = parse_integer(tokens)?;
        // Colors written in hexadecimal may use the full 32 bits.
        if value > i32::MAX as i64 && value <= u32::MAX as i64 {
            return Some(value as u32 as i32);
        }
        i32::try_from(value).ok()
    }
}

impl FromTokens for u32 {
    fn from_tokens(tokens: &[String]) -> Option<Self> {
        let value = parse_integer(tokens)?;
        // VB stores "unset" sizes and colors as -1.
        if value < 0 && value >= i32::MIN as i64 {
            return Some(value as i32 as u32);
        }
        u32::try_from(value).ok()
    }
}

impl FromTokens for f64 {
    fn from_tokens(tokens: &[String]) -> Option<Self> {
        tokens.first()?.trim().parse::<f64>().ok()
    }
}

impl FromTokens for bool {
    fn from_tokens(tokens: &[String]) -> Option<Self> {
        let value = tokens.first()?.trim().to_ascii_lowercase();
        match value.as_str() {
            "true" | "yes" | "on" | "1" | "-1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl FromTokens for char {
    fn from_tokens(tokens: &[String]) -> Option<Self> {
        tokens.first()?.chars().next()
    }
}

impl FromTokens for String {
    fn from_tokens(tokens: &[String]) -> Option<Self> {
        tokens.first().cloned()
    }
}

impl FromTokens for Fileloc {
    fn from_tokens(tokens: &[String]) -> Option<Self> {
        let filename = tokens.first()?;
        if filename.is_empty() {
            return None;
        }
        let location = match tokens.get(1) {
            Some(offset) => {
                let offset = offset.trim();
                let offset = offset
                    .strip_prefix("0x")
                    .or_else(|| offset.strip_prefix("0X"))
                    .unwrap_or(offset);
                u32::from_str_radix(offset, 16).ok()?
            }
            None => 0,
        };

        Some(Fileloc {
            filename: PathBuf::from(filename),
            location,
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyValue(Vec<String>);

impl PropertyValue {
    pub fn new<S: AsRef<str>>(tokens: &[S]) -> Self {
        PropertyValue(tokens.iter().map(|t| t.as_ref().to_string()).collect())
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn into_tokens(self) -> Vec<String> {
        self.0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyBag {
    properties: BTreeMap<ControlProperty, PropertyValue>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set<S: AsRef<str>>(&mut self, key: ControlProperty, tokens: &[S]) -> &mut Self {
        self.properties.insert(key, PropertyValue::new(tokens));
        self
    }

    /// Builder-style variant of `set`.
    #[cfg(test)]
    pub fn with<S: AsRef<str>>(mut self, key: ControlProperty, tokens: &[S]) -> Self {
        self.set(key, tokens);
        self
    }

    #[cfg(test)]
    pub fn get(&self, key: ControlProperty) -> Option<&PropertyValue> {
        self.properties.get(&key)
    }

    pub fn remove(&mut self, key: ControlProperty) -> Option<PropertyValue> {
        self.properties.remove(&key)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Fails with the list of properties nobody consumed.
    pub fn ensure_consumed(&self) -> Result<()> {
        if self.properties.is_empty() {
            Ok(())
        } else {
            Err(Error::UnexpectedProperty(
                self.properties.keys().copied().collect(),
            ))
        }
    }

    /// Parses property lines as written in a form description:
    ///
    /// ```text
    /// Caption = "Hello"
    /// Left = 1200
    /// BackColor = &H00C0C0C0&
    /// Visible = 0 'False
    /// Picture = "Form1.frx":0A3C
    /// ```
    ///
    /// Blank lines are skipped. Unknown property names are an error.
    #[cfg(test)]
    pub fn parse(text: &str) -> Result<PropertyBag> {
        let mut bag = PropertyBag::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (key, value) = parse_line(line)?;
            bag.properties.insert(key, value);
        }
        Ok(bag)
    }
}

#[cfg(test)]
fn parse_line(line: &str) -> Result<(ControlProperty, PropertyValue)> {
    let invalid = || Error::Format(format!("malformed property line {:?}", line));

    let (name, value) = line.split_once('=').ok_or_else(invalid)?;
    let key = ControlProperty::from_name(name.trim())
        .ok_or_else(|| Error::Format(format!("unknown property {:?}", name.trim())))?;
    let value = value.trim();

    let tokens = if let Some(rest) = value.strip_prefix('"') {
        // Quoted string, optionally followed by `:offset` for file references.
        let (string, tail) = unquote(rest).ok_or_else(invalid)?;
        match tail.trim().strip_prefix(':') {
            Some(offset) => vec![string, offset.trim().to_string()],
            None => vec![string],
        }
    } else {
        // Drop trailing comments such as `-1 'True`.
        let value = value.split('\'').next().unwrap_or("").trim();
        match value.strip_prefix("&H") {
            Some(hex) => vec![hex.trim_end_matches('&').to_string(), "16".to_string()],
            None => vec![value.to_string()],
        }
    };

    Ok((key, PropertyValue(tokens)))
}

/// Splits the remainder of a quoted value after its opening quote into the
/// unescaped string and what follows the closing quote. A doubled quote
/// stands for a single one.
#[cfg(test)]
fn unquote(rest: &str) -> Option<(String, &str)> {
    let mut string = String::new();
    let mut chars = rest.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '"' {
            string.push(c);
            continue;
        }
        match chars.peek() {
            Some((_, '"')) => {
                string.push('"');
                chars.next();
            }
            _ => return Some((string, &rest[i + 1..])),
        }
    }
    None
}

/// Converts and assigns the value of `key` to `target` if the bag has it.
/// The key is removed from the bag. Returns whether an assignment happened.
pub fn assign_property<T: FromTokens>(
    target: &mut T,
    key: ControlProperty,
    bag: &mut PropertyBag,
) -> Result<bool> {
    let value = match bag.remove(key) {
        Some(value) => value,
        None => return Ok(false),
    };
    trace!("{} = {:?}", key, value.tokens());

    *target = T::from_tokens(value.tokens()).ok_or_else(|| Error::InvalidProperty {
        property: key,
        value: value.clone().into_tokens(),
    })?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_radix() {
        let mut bag = PropertyBag::new()
            .with(ControlProperty::Left, &["1500"])
            .with(ControlProperty::BackColor, &["FF8000", "16"]);

        let mut left = 0i32;
        let mut color = 0u32;
        assert!(assign_property(&mut left, ControlProperty::Left, &mut bag).unwrap());
        assert!(assign_property(&mut color, ControlProperty::BackColor, &mut bag).unwrap());
        assert_eq!(left, 1500);
        assert_eq!(color, 0xFF8000);
        assert!(bag.is_empty());
    }

    #[test]
    fn missing_key_leaves_target() {
        let mut bag = PropertyBag::new();
        let mut top = 42i32;
        assert!(!assign_property(&mut top, ControlProperty::Top, &mut bag).unwrap());
        assert_eq!(top, 42);
    }

    #[test]
    fn permissive_booleans() {
        for (token, expected) in [
            ("True", true),
            ("yes", true),
            ("ON", true),
            ("1", true),
            ("false", false),
            ("No", false),
            ("off", false),
            ("0", false),
        ]
        .iter()
        {
            let mut bag = PropertyBag::new().with(ControlProperty::Visible, &[*token]);
            let mut visible = !expected;
            assign_property(&mut visible, ControlProperty::Visible, &mut bag).unwrap();
            assert_eq!(visible, *expected, "token {:?}", token);
        }
    }

    #[test]
    fn invalid_value_is_reported() {
        let mut bag = PropertyBag::new().with(ControlProperty::Visible, &["maybe"]);
        let mut visible = true;
        match assign_property(&mut visible, ControlProperty::Visible, &mut bag) {
            Err(Error::InvalidProperty { property, value }) => {
                assert_eq!(property, ControlProperty::Visible);
                assert_eq!(value, vec!["maybe".to_string()]);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn char_and_fileloc() {
        let mut bag = PropertyBag::new()
            .with(ControlProperty::PasswordChar, &["*x"])
            .with(ControlProperty::Picture, &["yahtzee.dat", "0x1A2B"]);

        let mut c = ' ';
        let mut loc = Fileloc::default();
        assign_property(&mut c, ControlProperty::PasswordChar, &mut bag).unwrap();
        assign_property(&mut loc, ControlProperty::Picture, &mut bag).unwrap();
        assert_eq!(c, '*');
        assert_eq!(loc.filename, PathBuf::from("yahtzee.dat"));
        assert_eq!(loc.location, 0x1A2B);
    }

    #[test]
    fn leftovers_are_unexpected() {
        let bag = PropertyBag::new()
            .with(ControlProperty::Icon, &["x"])
            .with(ControlProperty::Top, &["0"]);
        match bag.ensure_consumed() {
            Err(Error::UnexpectedProperty(keys)) => {
                assert_eq!(keys, vec![ControlProperty::Icon, ControlProperty::Top])
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn parse_description() {
        let bag = PropertyBag::parse(
            r#"
            Caption = "It's a mug"
            Left = 1200
            BackColor = &H00C0C0C0&
            Visible = 0 'False
            Font.Bold = -1 'True
            Picture = "Form7.frx":0A3C
            "#,
        )
        .unwrap();

        assert_eq!(
            bag.get(ControlProperty::Caption).unwrap().tokens(),
            &["It's a mug".to_string()]
        );
        assert_eq!(
            bag.get(ControlProperty::BackColor).unwrap().tokens(),
            &["00C0C0C0".to_string(), "16".to_string()]
        );
        assert_eq!(
            bag.get(ControlProperty::Visible).unwrap().tokens(),
            &["0".to_string()]
        );
        assert_eq!(
            bag.get(ControlProperty::FontBold).unwrap().tokens(),
            &["-1".to_string()]
        );
        assert_eq!(
            bag.get(ControlProperty::Picture).unwrap().tokens(),
            &["Form7.frx".to_string(), "0A3C".to_string()]
        );
    }

    #[test]
    fn parse_doubled_quotes() {
        let bag = PropertyBag::parse(
            r#"
            Caption = "He said ""Yah boo!"" twice"
            LinkTopic = """"
            Picture = "odd""name.frx":0010
            "#,
        )
        .unwrap();

        assert_eq!(
            bag.get(ControlProperty::Caption).unwrap().tokens(),
            &[r#"He said "Yah boo!" twice"#.to_string()]
        );
        assert_eq!(
            bag.get(ControlProperty::LinkTopic).unwrap().tokens(),
            &["\"".to_string()]
        );
        assert_eq!(
            bag.get(ControlProperty::Picture).unwrap().tokens(),
            &["odd\"name.frx".to_string(), "0010".to_string()]
        );
    }

    #[test]
    fn parse_rejects_unterminated_string() {
        assert!(matches!(
            PropertyBag::parse(r#"Caption = "Yah ""boo!"""#),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn parse_rejects_unknown_property() {
        assert!(matches!(
            PropertyBag::parse("Wobble = 3"),
            Err(Error::Format(_))
        ));
    }
}
