//! Diagnostic rendering for conversion errors.

use std::io::Write;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};

use crate::error::{
    ContextError, ContextErrorKind, Error, ParseError, ParseErrorKind, RecordKind, Span,
};

type ReportBuilder<'a> = ariadne::ReportBuilder<'static, (&'a str, std::ops::Range<usize>)>;

impl Error {
    /// Render this error with source context.
    ///
    /// Errors without a source location render as their plain message.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the error report to a writer.
    pub fn write_report<W: Write>(&self, filename: &str, source: &str, mut writer: W) {
        match self {
            Error::Parse(e) => e.write_report(filename, source, writer),
            Error::Context(e) => e.write_report(filename, source, writer),
            Error::Io(_) | Error::Lookup(_) => {
                let _ = writeln!(writer, "error: {self}");
            }
        }
    }
}

impl ParseError {
    /// Write the error report to a writer.
    pub fn write_report<W: Write>(&self, filename: &str, source: &str, writer: W) {
        let report = self.build_report(filename);
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(&self, filename: &'a str) -> ReportBuilder<'a> {
        let range = clamp(self.span);
        let report = start_report(filename, range.clone()).with_message(self.kind.to_string());

        match &self.kind {
            ParseErrorKind::MissingField { record, field } => report
                .with_label(
                    Label::new((filename, range))
                        .with_message(format!("`{field}` expected after this"))
                        .with_color(Color::Red),
                )
                .with_help(format!("{record} lines look like `{}`", layout(*record))),

            ParseErrorKind::FieldCount { record, .. } => report
                .with_label(
                    Label::new((filename, range))
                        .with_message(format!("in this {record} record"))
                        .with_color(Color::Red),
                )
                .with_help(format!("{record} lines look like `{}`", layout(*record))),

            ParseErrorKind::InvalidInteger { .. } => report.with_label(
                Label::new((filename, range))
                    .with_message("not an integer")
                    .with_color(Color::Red),
            ),

            ParseErrorKind::InvalidFloat { .. } => report
                .with_label(
                    Label::new((filename, range))
                        .with_message("not a number")
                        .with_color(Color::Red),
                )
                .with_help("`inf`, `-inf` and `nan` are accepted"),
        }
    }
}

impl ContextError {
    /// Write the error report to a writer.
    pub fn write_report<W: Write>(&self, filename: &str, source: &str, writer: W) {
        let report = self.build_report(filename);
        let _ = report
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    fn build_report<'a>(&self, filename: &'a str) -> ReportBuilder<'a> {
        let range = clamp(self.span);
        let report = start_report(filename, range.clone()).with_message(self.kind.to_string());

        match self.kind {
            ContextErrorKind::TrackWithoutEvent => report
                .with_label(
                    Label::new((filename, range))
                        .with_message("no event is open")
                        .with_color(Color::Red),
                )
                .with_help("add an `E <run> <event>` line before the first track"),
            ContextErrorKind::PointWithoutTrack => report
                .with_label(
                    Label::new((filename, range))
                        .with_message("no track is open")
                        .with_color(Color::Red),
                )
                .with_help("points belong to the most recent `T` line"),
        }
    }
}

fn start_report<'a>(filename: &'a str, range: std::ops::Range<usize>) -> ReportBuilder<'a> {
    Report::build(ReportKind::Error, (filename, range))
        .with_config(Config::default().with_index_type(IndexType::Byte))
}

fn clamp(span: Span) -> std::ops::Range<usize> {
    // ariadne wants a non-empty range to draw a label
    if span.end > span.start {
        span.into()
    } else {
        span.start..span.start + 1
    }
}

fn layout(record: RecordKind) -> &'static str {
    match record {
        RecordKind::Event => "E <run> <event>",
        RecordKind::Track => {
            "T <id> <pdg> <name> <charge> <eta> <phi> <qOverP> <px> <py> <pz> <vx> <vy> <vz>"
        }
        RecordKind::Point => "P <x> <y> <z> <t>",
    }
}
