use std::{fmt, io, num::{ParseIntError, TryFromIntError}, str::Utf8Error};
use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Location in the input stream, as reported by the line-tracking reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u64,
    pub column: u64,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} pos {}", self.line, self.column)
    }
}

fn position_suffix(position: &Option<Position>) -> String {
    match position {
        Some(position) => format!(" at {position}"),
        None => String::new(),
    }
}

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input: bad coordinates, unexpected elements or attributes,
    /// or a well-formedness violation reported by the tokenizer.
    #[error("input parsing error: {message}{}", position_suffix(.position))]
    Parsing {
        message: String,
        position: Option<Position>,
    },

    /// Well-formed input that is inconsistent, or a lookup of a missing entity.
    #[error("{0}")]
    Data(String),

    /// Failure to open or read the input stream.
    #[error("{context}: {source}")]
    System {
        context: &'static str,
        source: io::Error,
    },

    #[error("{0}")]
    Generic(String),
}

impl Error {
    pub fn parsing(message: impl Into<String>) -> Self {
        Error::Parsing {
            message: message.into(),
            position: None,
        }
    }

    pub fn data(message: impl Into<String>) -> Self {
        Error::Data(message.into())
    }

    /// Attaches a stream position to a parsing error that does not carry one yet.
    /// Other kinds are returned unchanged.
    pub fn at(self, at: Position) -> Self {
        match self {
            Error::Parsing { message, position: None } => Error::Parsing {
                message,
                position: Some(at),
            },
            other => other,
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            Error::Parsing { position, .. } => *position,
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error::System {
            context: "input read error",
            source: value,
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(value: quick_xml::Error) -> Self {
        match value {
            quick_xml::Error::Io(err) => Error::System {
                context: "input read error",
                source: io::Error::new(err.kind(), err.to_string()),
            },
            other => Error::parsing(other.to_string()),
        }
    }
}

impl From<AttrError> for Error {
    fn from(value: AttrError) -> Self {
        Error::parsing(value.to_string())
    }
}

impl From<ParseIntError> for Error {
    fn from(value: ParseIntError) -> Self {
        Error::parsing(value.to_string())
    }
}

impl From<Utf8Error> for Error {
    fn from(value: Utf8Error) -> Self {
        Error::parsing(value.to_string())
    }
}

impl From<TryFromIntError> for Error {
    fn from(value: TryFromIntError) -> Self {
        Error::parsing(value.to_string())
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Generic(value.to_string())
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Generic(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
