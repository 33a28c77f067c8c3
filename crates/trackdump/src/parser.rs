//! Line-oriented parser for track dumps.
//!
//! Each non-comment line starts with a tag character:
//!
//! ```text
//! E <run> <event>
//! T <id> <pdg> <name> <charge> <eta> <phi> <qOverP> <px> <py> <pz> <vx> <vy> <vz>
//! P <x> <y> <z> <t>
//! ```
//!
//! Record parsers are pure: they turn one line into a value. The [`Converter`]
//! attaches those values to the open event or track, which it tracks in a
//! [`ParseState`].

use std::io::BufRead;

use tracing::{debug, trace, warn};

use crate::color::{self, Color};
use crate::error::{
    ContextError, ContextErrorKind, Error, ParseError, ParseErrorKind, RecordKind, Span,
};
use crate::model::{
    Event, EventCollection, Point, Track, TrackParams, event_name, normalize_q_over_p,
};
use crate::options::ConvertOptions;
use crate::recoil::mark_recoil_electrons;

const COMMENT: char = '#';

/// A whitespace-separated word of a record, with its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub text: &'src str,
    pub span: Span,
}

/// One tagged line, split into its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'src> {
    pub kind: RecordKind,
    pub tokens: Vec<Token<'src>>,
    /// 1-based line number.
    pub line: usize,
    /// The trimmed line, tag included.
    pub span: Span,
}

/// Outcome of classifying a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'src> {
    /// Blank line or `#` comment.
    Skip,
    /// Unknown leading character.
    Ignored(char),
    Record(Record<'src>),
}

/// Classify a raw line.
///
/// `offset` is the byte position of `raw` in the source; spans are absolute.
pub fn classify_line(raw: &str, line: usize, offset: usize) -> Line<'_> {
    let trimmed = raw.trim();
    let Some(tag) = trimmed.chars().next() else {
        return Line::Skip;
    };
    let start = offset + (raw.len() - raw.trim_start().len());

    let kind = match tag {
        COMMENT => return Line::Skip,
        'E' => RecordKind::Event,
        'T' => RecordKind::Track,
        'P' => RecordKind::Point,
        other => return Line::Ignored(other),
    };

    let body = &trimmed[tag.len_utf8()..];
    Line::Record(Record {
        kind,
        tokens: tokenize(body, start + tag.len_utf8()),
        line,
        span: Span::new(start, start + trimmed.len()),
    })
}

fn tokenize(text: &str, base: usize) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(Token {
                    text: &text[s..i],
                    span: Span::new(base + s, base + i),
                });
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(Token {
            text: &text[s..],
            span: Span::new(base + s, base + text.len()),
        });
    }
    tokens
}

impl<'src> Record<'src> {
    fn error(&self, kind: ParseErrorKind, span: Span) -> ParseError {
        ParseError::new(kind, self.line, span)
    }

    fn expect_fields(&self, expected: usize) -> Result<(), ParseError> {
        if self.tokens.len() == expected {
            Ok(())
        } else {
            Err(self.error(
                ParseErrorKind::FieldCount {
                    record: self.kind,
                    expected,
                    found: self.tokens.len(),
                },
                self.span,
            ))
        }
    }

    fn token(&self, index: usize, field: &'static str) -> Result<Token<'src>, ParseError> {
        self.tokens.get(index).copied().ok_or_else(|| {
            // Point at the end of the line, where the field should have been.
            let end = self.tokens.last().map_or(self.span.end, |t| t.span.end);
            self.error(
                ParseErrorKind::MissingField {
                    record: self.kind,
                    field,
                },
                Span::new(self.span.start, end),
            )
        })
    }

    fn int(&self, index: usize, field: &'static str) -> Result<i64, ParseError> {
        let token = self.token(index, field)?;
        token.text.parse().map_err(|_| {
            self.error(
                ParseErrorKind::InvalidInteger {
                    field,
                    token: token.text.to_string(),
                },
                token.span,
            )
        })
    }

    fn float(&self, index: usize, field: &'static str) -> Result<f64, ParseError> {
        let token = self.token(index, field)?;
        // f64's FromStr accepts inf, -inf, infinity and nan in any case
        token.text.parse().map_err(|_| {
            self.error(
                ParseErrorKind::InvalidFloat {
                    field,
                    token: token.text.to_string(),
                },
                token.span,
            )
        })
    }

    fn text(&self, index: usize, field: &'static str) -> Result<&'src str, ParseError> {
        Ok(self.token(index, field)?.text)
    }
}

/// Parse `E <run> <event> ...`. Extra fields are ignored.
///
/// Returns the event's name along with the new, empty event.
pub fn parse_event(record: &Record<'_>, prefix: &str) -> Result<(String, Event), ParseError> {
    let run_number = record.int(0, "run number")?;
    let event_number = record.int(1, "event number")?;
    Ok((
        event_name(prefix, event_number),
        Event::new(run_number, event_number),
    ))
}

/// Parse a 13-field track record and pick its color.
pub fn parse_track(record: &Record<'_>) -> Result<Track, ParseError> {
    record.expect_fields(13)?;

    let id = record.int(0, "id")?;
    let pdg_code = record.int(1, "pdg")?;
    let pdg_name = record.text(2, "pdg name")?;
    let charge = record.int(3, "charge")?;
    let eta = record.float(4, "eta")?;
    let phi = record.float(5, "phi")?;
    let q_over_p = record.float(6, "qOverP")?;
    let momentum_vertex = [
        record.float(7, "px")?,
        record.float(8, "py")?,
        record.float(9, "pz")?,
        record.float(10, "vx")?,
        record.float(11, "vy")?,
        record.float(12, "vz")?,
    ];

    Ok(Track {
        id,
        pdg_code,
        pdg_name: pdg_name.to_string(),
        charge,
        positions: Vec::new(),
        momentum_vertex,
        params: TrackParams::new(phi, eta, normalize_q_over_p(charge, q_over_p)),
        color: color::classify(pdg_name, charge),
    })
}

/// Parse `P <x> <y> <z> <t>`.
pub fn parse_point(record: &Record<'_>) -> Result<Point, ParseError> {
    record.expect_fields(4)?;
    Ok(Point::new(
        record.float(0, "x")?,
        record.float(1, "y")?,
        record.float(2, "z")?,
        record.float(3, "t")?,
    ))
}

/// The event and track that new records attach to.
///
/// Both start out empty and are only moved by the next `E` or `T` line. The
/// current track remembers its own event, so points after a new `E` line keep
/// extending the last track of the previous event until a `T` line arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseState {
    current_event: Option<usize>,
    current_track: Option<(usize, usize)>,
}

impl ParseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the open event in the collection.
    pub fn current_event(&self) -> Option<usize> {
        self.current_event
    }

    /// Event index and track index of the open track.
    pub fn current_track(&self) -> Option<(usize, usize)> {
        self.current_track
    }

    /// Make `event` the open event. The open track is left alone.
    pub fn enter_event(&mut self, event: usize) {
        self.current_event = Some(event);
    }

    /// Make `track` of `event` the open track.
    pub fn enter_track(&mut self, event: usize, track: usize) {
        self.current_track = Some((event, track));
    }

    /// The event at `event` was overwritten by a later one with the same
    /// name; its tracks are gone.
    pub fn discard_event(&mut self, event: usize) {
        if matches!(self.current_track, Some((owner, _)) if owner == event) {
            self.current_track = None;
        }
    }
}

/// Counts gathered over a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub events: usize,
    pub tracks: usize,
    pub points: usize,
    /// Events dropped because a later event had the same name.
    pub replaced_events: usize,
    /// Tracks recolored by the recoil pass.
    pub recoil_marked: usize,
}

/// Result of a successful conversion.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub events: EventCollection,
    pub summary: ConversionSummary,
}

/// Incremental converter: feed it lines, then [`finish`](Converter::finish).
pub struct Converter {
    prefix: String,
    recoil_color: Option<Color>,
    events: EventCollection,
    state: ParseState,
    line: usize,
    offset: usize,
    replaced_events: usize,
}

impl Converter {
    /// Create a converter.
    ///
    /// The recoil highlight color is resolved here, so a bad name fails
    /// before any input is read.
    pub fn new(options: &ConvertOptions) -> Result<Self, Error> {
        let recoil_color = if options.mark_recoil {
            Some(color::lookup(&options.recoil_color)?)
        } else {
            None
        };

        Ok(Self {
            prefix: options.event_prefix.clone(),
            recoil_color,
            events: EventCollection::new(),
            state: ParseState::new(),
            line: 0,
            offset: 0,
            replaced_events: 0,
        })
    }

    /// The current parse context.
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Events parsed so far.
    pub fn events(&self) -> &EventCollection {
        &self.events
    }

    /// Feed one raw line, including its line terminator if it has one.
    pub fn feed_line(&mut self, raw: &str) -> Result<(), Error> {
        self.line += 1;
        let offset = self.offset;
        self.offset += raw.len();

        match classify_line(raw, self.line, offset) {
            Line::Skip => Ok(()),
            Line::Ignored(tag) => {
                trace!(line = self.line, %tag, "ignoring line");
                Ok(())
            }
            Line::Record(record) => self.dispatch(&record),
        }
    }

    fn dispatch(&mut self, record: &Record<'_>) -> Result<(), Error> {
        match record.kind {
            RecordKind::Event => {
                let (name, event) = parse_event(record, &self.prefix)?;
                debug!(%name, run = event.run_number, event = event.event_number, "event");
                let (index, replaced) = self.events.insert(name, event);
                if replaced.is_some() {
                    self.replaced_events += 1;
                    if let Some((name, _)) = self.events.get_index(index) {
                        warn!(line = record.line, %name, "event replaces an earlier event with the same name");
                    }
                    self.state.discard_event(index);
                }
                self.state.enter_event(index);
            }
            RecordKind::Track => {
                let track = parse_track(record)?;
                let (index, event) = self
                    .state
                    .current_event()
                    .and_then(|index| Some((index, self.events.get_index_mut(index)?)))
                    .ok_or_else(|| {
                        ContextError::new(
                            ContextErrorKind::TrackWithoutEvent,
                            record.line,
                            record.span,
                        )
                    })?;
                trace!(id = track.id, pdg = %track.pdg_name, color = %track.color, "track");
                event.tracks_mut().push(track);
                self.state.enter_track(index, event.tracks().len() - 1);
            }
            RecordKind::Point => {
                let point = parse_point(record)?;
                let track = self.state.current_track().and_then(|(event, track)| {
                    self.events
                        .get_index_mut(event)
                        .and_then(|event| event.tracks_mut().get_mut(track))
                });
                let track = track.ok_or_else(|| {
                    ContextError::new(
                        ContextErrorKind::PointWithoutTrack,
                        record.line,
                        record.span,
                    )
                })?;
                track.positions.push(point);
            }
        }
        Ok(())
    }

    /// End of input: run the recoil pass if enabled and return the events.
    pub fn finish(mut self) -> Conversion {
        let recoil_marked = match self.recoil_color {
            Some(color) => mark_recoil_electrons(&mut self.events, color),
            None => 0,
        };

        let tracks = self.events.iter().map(|(_, e)| e.tracks().len()).sum();
        let points = self
            .events
            .iter()
            .flat_map(|(_, e)| e.tracks())
            .map(|t| t.positions.len())
            .sum();

        let summary = ConversionSummary {
            events: self.events.len(),
            tracks,
            points,
            replaced_events: self.replaced_events,
            recoil_marked,
        };

        Conversion {
            events: self.events,
            summary,
        }
    }
}

/// Convert a whole dump held in memory.
pub fn convert_str(source: &str, options: &ConvertOptions) -> Result<Conversion, Error> {
    let mut converter = Converter::new(options)?;
    for raw in source.split_inclusive('\n') {
        converter.feed_line(raw)?;
    }
    Ok(converter.finish())
}

/// Convert a dump read line by line.
pub fn convert_reader<R: BufRead>(
    mut reader: R,
    options: &ConvertOptions,
) -> Result<Conversion, Error> {
    let mut converter = Converter::new(options)?;
    let mut buf = String::new();
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        converter.feed_line(&buf)?;
    }
    Ok(converter.finish())
}

#[cfg(test)]
mod tests;
