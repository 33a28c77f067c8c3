//! Error types for trackdump.

use std::fmt;
use std::io;

/// Byte range into the converted source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

/// Which record a line describes, from its leading tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Event,
    Track,
    Point,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Event => f.write_str("event"),
            RecordKind::Track => f.write_str("track"),
            RecordKind::Point => f.write_str("point"),
        }
    }
}

/// What was wrong with a record's fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// A required leading field is absent.
    MissingField {
        record: RecordKind,
        field: &'static str,
    },
    /// The record does not have exactly the expected number of fields.
    FieldCount {
        record: RecordKind,
        expected: usize,
        found: usize,
    },
    /// A field that must be an integer is not one.
    InvalidInteger { field: &'static str, token: String },
    /// A field that must be a number is not one.
    InvalidFloat { field: &'static str, token: String },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::MissingField { record, field } => {
                write!(f, "{record} record is missing field `{field}`")
            }
            ParseErrorKind::FieldCount {
                record,
                expected,
                found,
            } => write!(
                f,
                "{record} record expects {expected} fields, found {found}"
            ),
            ParseErrorKind::InvalidInteger { field, token } => {
                write!(f, "field `{field}` expects an integer, found `{token}`")
            }
            ParseErrorKind::InvalidFloat { field, token } => {
                write!(f, "field `{field}` expects a number, found `{token}`")
            }
        }
    }
}

/// A malformed record.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// 1-based line number.
    pub line: usize,
    /// The offending token, or the whole line for count errors.
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: usize, span: Span) -> Self {
        Self { kind, line, span }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for ParseError {}

/// A record that needs a parent which is not open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextErrorKind {
    /// A `T` line before any `E` line.
    TrackWithoutEvent,
    /// A `P` line before any `T` line, or after the event owning the last
    /// track was replaced.
    PointWithoutTrack,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextError {
    pub kind: ContextErrorKind,
    pub line: usize,
    pub span: Span,
}

impl ContextError {
    pub fn new(kind: ContextErrorKind, line: usize, span: Span) -> Self {
        Self { kind, line, span }
    }
}

impl fmt::Display for ContextErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextErrorKind::TrackWithoutEvent => f.write_str("track record before any event"),
            ContextErrorKind::PointWithoutTrack => f.write_str("point record before any track"),
        }
    }
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for ContextError {}

/// A color name missing from the palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupError {
    name: String,
}

impl LookupError {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The name that was looked up.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown color `{}`", self.name)
    }
}

impl std::error::Error for LookupError {}

/// Any failure of a conversion. All of them abort the run.
#[derive(Debug)]
pub enum Error {
    Parse(ParseError),
    Context(ContextError),
    Io(io::Error),
    Lookup(LookupError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "{e}"),
            Error::Context(e) => write!(f, "{e}"),
            Error::Io(e) => write!(f, "{e}"),
            Error::Lookup(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(e) => Some(e),
            Error::Context(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Lookup(e) => Some(e),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<ContextError> for Error {
    fn from(e: ContextError) -> Self {
        Error::Context(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<LookupError> for Error {
    fn from(e: LookupError) -> Self {
        Error::Lookup(e)
    }
}

/// Result type for trackdump operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
