use std::{io, path::PathBuf};

use thiserror::Error;

use crate::controls::{props::ControlProperty, ControlKind};

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid form archive: {0}")]
    Format(String),
    #[error("truncated data while reading {0}")]
    TruncatedData(String),
    #[error("cannot open asset {}: {source}", path.display())]
    AssetNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot decode asset {}@0x{location:x}: {reason}", path.display())]
    AssetDecode {
        path: PathBuf,
        location: u32,
        reason: String,
    },
    #[error("no {kind} named {name:?}")]
    MissingControl { kind: ControlKind, name: String },
    #[error("no hotspot named {0:?}")]
    UnknownObject(String),
    #[error("invalid value {value:?} for property {property}")]
    InvalidProperty {
        property: ControlProperty,
        value: Vec<String>,
    },
    #[error("properties left unassigned: {0:?}")]
    UnexpectedProperty(Vec<ControlProperty>),
    #[error("font error: {0}")]
    Font(String),
    #[error("host error: {0}")]
    Host(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Short reads become `TruncatedData` so callers can tell a cut archive
    /// from other I/O failures.
    pub fn from_read(e: io::Error, what: &str) -> Error {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => Error::TruncatedData(what.to_string()),
            _ => Error::Io(e),
        }
    }

    pub fn missing(kind: ControlKind, name: &str) -> Error {
        Error::MissingControl {
            kind,
            name: name.to_string(),
        }
    }
}
