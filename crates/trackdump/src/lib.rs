//! Conversion of simulation track dumps into Phoenix event-display JSON.
//!
//! A dump is a text file of tagged lines: `E` opens an event, `T` adds a track
//! to it and `P` adds a trajectory point to the last track. The result is an
//! [`EventCollection`] keyed by `{prefix}_{event number}`, serialized with
//! [`write_json`].
//!
//! ```
//! use trackdump::{ConvertOptions, convert_str, to_json_string};
//!
//! let source = "E 1 100\nT 0 11 e- -1 0.5 0.1 -2.0 1 2 3 0 0 0\nP 1 2 3 0.1\n";
//! let conversion = convert_str(source, &ConvertOptions::default()).unwrap();
//! assert_eq!(conversion.summary.points, 1);
//!
//! let json = to_json_string(&conversion.events, "  ").unwrap();
//! assert!(json.contains("\"event_100\""));
//! ```

pub mod color;
mod diagnostic;
mod error;
pub mod merge;
mod model;
mod options;
mod parser;
mod recoil;
mod serialize;

pub use color::Color;
pub use error::{
    ContextError, ContextErrorKind, Error, LookupError, ParseError, ParseErrorKind, RecordKind,
    Result, Span,
};
pub use model::{
    Event, EventCollection, Point, Track, TrackGroups, TrackParams, event_name,
    normalize_q_over_p,
};
pub use options::ConvertOptions;
pub use parser::{
    Conversion, ConversionSummary, Converter, Line, ParseState, Record, Token, classify_line,
    convert_reader, convert_str, parse_event, parse_point, parse_track,
};
pub use recoil::{RECOIL_PDG_NAME, mark_recoil_electrons};
pub use serialize::{to_json_string, write_json};
