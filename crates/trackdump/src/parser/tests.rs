use super::*;
use crate::color::{BLUE, DEEP_BLUE, RADIANT_RED, RED, TEAL, VIOLET};
use tracing::trace;

fn convert(source: &str) -> Conversion {
    convert_str(source, &ConvertOptions::default()).unwrap()
}

fn convert_err(source: &str) -> Error {
    convert_str(source, &ConvertOptions::default()).unwrap_err()
}

fn record(line: &str) -> Record<'_> {
    match classify_line(line, 1, 0) {
        Line::Record(record) => record,
        other => panic!("expected a record, got {other:?}"),
    }
}

fn parse_error(source: &str) -> ParseError {
    match convert_err(source) {
        Error::Parse(e) => e,
        other => panic!("expected a parse error, got {other:?}"),
    }
}

fn context_error(source: &str) -> ContextError {
    match convert_err(source) {
        Error::Context(e) => e,
        other => panic!("expected a context error, got {other:?}"),
    }
}

// ============================================================================
// Line classification
// ============================================================================

#[test]
fn test_skip_comments_and_blank_lines() {
    assert_eq!(classify_line("# E 1 2\n", 1, 0), Line::Skip);
    assert_eq!(classify_line("   #T\n", 1, 0), Line::Skip);
    assert_eq!(classify_line("\n", 1, 0), Line::Skip);
    assert_eq!(classify_line("  \t ", 1, 0), Line::Skip);
    assert_eq!(classify_line("", 1, 0), Line::Skip);
}

#[test]
fn test_unknown_tags_ignored() {
    assert_eq!(classify_line("X 1 2 3\n", 1, 0), Line::Ignored('X'));
    assert_eq!(classify_line("e 1 2\n", 1, 0), Line::Ignored('e'));
    assert_eq!(classify_line("1 2 3\n", 1, 0), Line::Ignored('1'));
}

#[test]
fn test_record_tokens_and_spans() {
    let line = "  E 12  345 \n";
    let Line::Record(record) = classify_line(line, 4, 100) else {
        panic!("expected record");
    };
    trace!(?record, "classified");

    assert_eq!(record.kind, RecordKind::Event);
    assert_eq!(record.line, 4);
    assert_eq!(record.span, Span::new(102, 111));
    let texts: Vec<_> = record.tokens.iter().map(|t| t.text).collect();
    assert_eq!(texts, ["12", "345"]);
    assert_eq!(record.tokens[0].span, Span::new(104, 106));
    assert_eq!(record.tokens[1].span, Span::new(108, 111));
}

#[test]
fn test_tag_glued_to_first_field() {
    let record = record("E1 2");
    let texts: Vec<_> = record.tokens.iter().map(|t| t.text).collect();
    assert_eq!(texts, ["1", "2"]);
}

// ============================================================================
// Record parsers
// ============================================================================

#[test]
fn test_parse_event() {
    let (name, event) = parse_event(&record("E 1 100 trailing junk"), "event").unwrap();
    assert_eq!(name, "event_100");
    assert_eq!(event, Event::new(1, 100));
    assert!(event.tracks().is_empty());
}

#[test]
fn test_parse_event_prefix() {
    let (name, _) = parse_event(&record("E 2 5"), "sim").unwrap();
    assert_eq!(name, "sim_5");
}

#[test]
fn test_parse_event_missing_number() {
    let err = parse_event(&record("E 7"), "event").unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::MissingField {
            record: RecordKind::Event,
            field: "event number",
        }
    );
}

#[test]
fn test_parse_event_bad_integer() {
    let err = parse_event(&record("E 1.5 2"), "event").unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::InvalidInteger {
            field: "run number",
            token: "1.5".into(),
        }
    );
    assert_eq!(err.span, Span::new(2, 5));
}

#[test]
fn test_parse_track_fields() {
    let track = parse_track(&record("T 3 2212 proton 1 1.5 -0.25 0.5 1 2 3 4 5 6")).unwrap();
    assert_eq!(track.id, 3);
    assert_eq!(track.pdg_code, 2212);
    assert_eq!(track.pdg_name, "proton");
    assert_eq!(track.charge, 1);
    assert_eq!(track.momentum_vertex, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(track.params, TrackParams::new(-0.25, 1.5, 0.5));
    assert_eq!(track.color, VIOLET);
    assert!(track.positions.is_empty());
}

#[test]
fn test_parse_track_charge_colors() {
    let negative = parse_track(&record("T 1 13 mu- -1 0 0 -1 0 0 0 0 0 0")).unwrap();
    let positive = parse_track(&record("T 1 -13 mu+ 1 0 0 1 0 0 0 0 0 0")).unwrap();
    let neutral = parse_track(&record("T 1 130 kaon0L 0 0 0 0 0 0 0 0 0 0")).unwrap();
    assert_eq!(negative.color, DEEP_BLUE);
    assert_eq!(positive.color, RED);
    assert_eq!(neutral.color, TEAL);
}

#[test]
fn test_parse_track_normalizes_q_over_p() {
    for line in [
        "T 1 22 gamma 0 0 0 0.7 0 0 0 0 0 0",
        "T 1 11 e- -1 0 0 inf 0 0 0 0 0 0",
        "T 1 11 e- -1 0 0 -inf 0 0 0 0 0 0",
        "T 1 11 e- -1 0 0 NaN 0 0 0 0 0 0",
    ] {
        let track = parse_track(&record(line)).unwrap();
        assert_eq!(track.params.q_over_p.to_bits(), 0.0f64.to_bits(), "{line}");
    }
}

#[test]
fn test_parse_track_wrong_field_count() {
    let err = parse_track(&record("T 1 11 e- -1 0 0 0 0 0 0 0 0")).unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::FieldCount {
            record: RecordKind::Track,
            expected: 13,
            found: 12,
        }
    );

    let err = parse_track(&record("T 1 11 e- -1 0 0 0 0 0 0 0 0 0 9")).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::FieldCount { found: 14, .. }));
}

#[test]
fn test_parse_track_bad_fields() {
    let err = parse_track(&record("T 1 11 e- -1.0 0 0 0 0 0 0 0 0 0")).unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::InvalidInteger {
            field: "charge",
            token: "-1.0".into(),
        }
    );

    let err = parse_track(&record("T 1 11 e- -1 0 0 0 0 0 zz 0 0 0")).unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::InvalidFloat {
            field: "pz",
            token: "zz".into(),
        }
    );
}

#[test]
fn test_parse_point() {
    let point = parse_point(&record("P 1 -2.5 3e2 0.1")).unwrap();
    assert_eq!(point, Point::new(1.0, -2.5, 300.0, 0.1));
}

#[test]
fn test_parse_point_errors() {
    let err = parse_point(&record("P 1 2 3")).unwrap_err();
    assert!(matches!(
        err.kind,
        ParseErrorKind::FieldCount {
            record: RecordKind::Point,
            expected: 4,
            found: 3,
        }
    ));

    let err = parse_point(&record("P 1 2 x 4")).unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::InvalidFloat {
            field: "z",
            token: "x".into(),
        }
    );
}

// ============================================================================
// Parse state
// ============================================================================

#[test]
fn test_parse_state_transitions() {
    let mut state = ParseState::new();
    assert_eq!(state.current_event(), None);
    assert_eq!(state.current_track(), None);

    state.enter_event(0);
    assert_eq!(state.current_event(), Some(0));
    assert_eq!(state.current_track(), None);

    state.enter_track(0, 2);
    assert_eq!(state.current_track(), Some((0, 2)));

    state.enter_event(1);
    assert_eq!(state.current_event(), Some(1));
    assert_eq!(state.current_track(), Some((0, 2)));

    state.discard_event(1);
    assert_eq!(state.current_track(), Some((0, 2)));
    state.discard_event(0);
    assert_eq!(state.current_track(), None);
}

#[test]
fn test_converter_tracks_context() {
    let mut converter = Converter::new(&ConvertOptions::default()).unwrap();
    converter.feed_line("E 1 1\n").unwrap();
    assert_eq!(converter.state().current_event(), Some(0));
    converter.feed_line("T 0 22 gamma 0 0 0 0 0 0 0 0 0 0\n").unwrap();
    converter.feed_line("T 1 22 gamma 0 0 0 0 0 0 0 0 0 0\n").unwrap();
    assert_eq!(converter.state().current_track(), Some((0, 1)));
    converter.feed_line("# a comment does not change anything\n").unwrap();
    converter.feed_line("E 1 2\n").unwrap();
    assert_eq!(converter.events().len(), 2);
    assert_eq!(converter.state().current_event(), Some(1));
    assert_eq!(converter.state().current_track(), Some((0, 1)));
    converter.feed_line("T 2 22 gamma 0 0 0 0 0 0 0 0 0 0\n").unwrap();
    assert_eq!(converter.state().current_track(), Some((1, 0)));
}

// ============================================================================
// Whole conversions
// ============================================================================

#[test]
fn test_single_electron_event() {
    let conversion = convert("E 1 100\nT 0 11 e- -1 0.5 0.1 -2.0 1 2 3 0 0 0\nP 1 2 3 0.1");
    let events = &conversion.events;

    assert_eq!(events.names().collect::<Vec<_>>(), ["event_100"]);
    let event = events.get("event_100").unwrap();
    assert_eq!(event.run_number, 1);
    assert_eq!(event.event_number, 100);
    assert_eq!(event.tracks().len(), 1);

    let track = &event.tracks()[0];
    assert_eq!(track.charge, -1);
    assert_eq!(track.pdg_name, "e-");
    assert_eq!(track.color, BLUE);
    assert_eq!(track.positions, [Point::new(1.0, 2.0, 3.0, 0.1)]);
    assert_eq!(track.params.q_over_p, -2.0);
}

#[test]
fn test_neutral_unknown_particle_with_infinite_q_over_p() {
    let conversion = convert("E 1 1\nT 5 0 unknown_pdg 0 0.1 0.2 inf 1 1 1 0 0 0\n");
    let track = &conversion.events.get("event_1").unwrap().tracks()[0];
    assert_eq!(track.params.q_over_p, 0.0);
    assert_eq!(track.color, TEAL);
}

#[test]
fn test_duplicate_event_number_replaces() {
    let source = "\
E 1 5
T 0 22 gamma 0 0 0 0 0 0 0 0 0 0
P 0 0 0 0
E 1 6
E 2 5
T 9 2212 proton 1 0 0 1 0 0 0 0 0 0
";
    let conversion = convert(source);
    let events = &conversion.events;

    assert_eq!(events.names().collect::<Vec<_>>(), ["event_5", "event_6"]);
    let event = events.get("event_5").unwrap();
    assert_eq!(event.run_number, 2);
    assert_eq!(event.tracks().len(), 1);
    assert_eq!(event.tracks()[0].id, 9);
    assert_eq!(conversion.summary.replaced_events, 1);
}

#[test]
fn test_order_is_preserved() {
    let source = "\
# Format description
E 0 3
T 1 11 e- -1 0 0 -1 0 0 0 0 0 0
P 1 0 0 0
P 2 0 0 0
T 2 22 gamma 0 0 0 0 0 0 0 0 0 0
P 3 0 0 0
E 0 1
T 7 -11 e+ 1 0 0 1 0 0 0 0 0 0
P 4 0 0 0
P 5 0 0 0
P 6 0 0 0
";
    let conversion = convert(source);
    let events = &conversion.events;

    assert_eq!(events.names().collect::<Vec<_>>(), ["event_3", "event_1"]);
    let ids: Vec<_> = events
        .iter()
        .flat_map(|(_, e)| e.tracks())
        .map(|t| t.id)
        .collect();
    assert_eq!(ids, [1, 2, 7]);
    let xs: Vec<_> = events
        .iter()
        .flat_map(|(_, e)| e.tracks())
        .flat_map(|t| t.positions.iter().map(|p| p.x))
        .collect();
    assert_eq!(xs, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

    assert_eq!(
        conversion.summary,
        ConversionSummary {
            events: 2,
            tracks: 3,
            points: 6,
            replaced_events: 0,
            recoil_marked: 0,
        }
    );
}

#[test]
fn test_crlf_and_indentation() {
    let conversion = convert("E 1 1\r\n   T 0 22 gamma 0 0 0 0 0 0 0 0 0 0\r\n\tP 1 2 3 4\r\n");
    let track = &conversion.events.get("event_1").unwrap().tracks()[0];
    assert_eq!(track.positions, [Point::new(1.0, 2.0, 3.0, 4.0)]);
}

#[test]
fn test_track_before_event() {
    let err = context_error("# header\nT 0 11 e- -1 0 0 0 0 0 0 0 0 0\n");
    assert_eq!(err.kind, ContextErrorKind::TrackWithoutEvent);
    assert_eq!(err.line, 2);
}

#[test]
fn test_point_before_track() {
    let err = context_error("E 1 1\nP 0 0 0 0\n");
    assert_eq!(err.kind, ContextErrorKind::PointWithoutTrack);
    assert_eq!(err.line, 2);
}

#[test]
fn test_point_after_new_event_extends_previous_track() {
    let conversion = convert("E 1 1\nT 0 22 gamma 0 0 0 0 0 0 0 0 0 0\nE 1 2\nP 9 9 9 9\n");
    let events = &conversion.events;

    let old = &events.get("event_1").unwrap().tracks()[0];
    assert_eq!(old.positions, [Point::new(9.0, 9.0, 9.0, 9.0)]);
    assert!(events.get("event_2").unwrap().tracks().is_empty());
    assert_eq!(conversion.summary.points, 1);
}

#[test]
fn test_point_after_owner_event_replaced() {
    let err = context_error("E 1 5\nT 0 22 gamma 0 0 0 0 0 0 0 0 0 0\nE 2 5\nP 0 0 0 0\n");
    assert_eq!(err.kind, ContextErrorKind::PointWithoutTrack);
    assert_eq!(err.line, 4);
}

#[test]
fn test_replacing_other_event_keeps_track() {
    let source = "\
E 1 5
E 1 6
T 3 22 gamma 0 0 0 0 0 0 0 0 0 0
E 2 5
P 1 1 1 1
";
    let conversion = convert(source);
    let track = &conversion.events.get("event_6").unwrap().tracks()[0];
    assert_eq!(track.id, 3);
    assert_eq!(track.positions, [Point::new(1.0, 1.0, 1.0, 1.0)]);
}

#[test]
fn test_parse_error_reports_absolute_span() {
    let source = "E 1 1\nT 0 22 gamma 0 0 0 0 0 0 0 0 0 0\nP 1 2 oops 4\n";
    let err = parse_error(source);
    assert_eq!(err.line, 3);
    assert_eq!(&source[err.span.start..err.span.end], "oops");
    assert_eq!(err.to_string(), "line 3: field `z` expects a number, found `oops`");
}

#[test]
fn test_parse_error_aborts_conversion() {
    let err = parse_error("E 1 1\nE 1 two\nE 1 3\n");
    assert_eq!(err.line, 2);
}

#[test]
fn test_reader_matches_str() {
    let source = "E 4 2\nT 1 211 pi+ 1 0.3 0.2 0.1 1 2 3 4 5 6\nP 1 2 3 4\n";
    let from_str = convert(source);
    let from_reader = convert_reader(source.as_bytes(), &ConvertOptions::default()).unwrap();
    assert_eq!(from_str.events, from_reader.events);
    assert_eq!(from_str.summary, from_reader.summary);
}

#[test]
fn test_reader_error_spans_match_str() {
    let source = "E 1 1\n\nP 1 2 3\n";
    let Error::Parse(from_reader) =
        convert_reader(source.as_bytes(), &ConvertOptions::default()).unwrap_err()
    else {
        panic!("expected parse error");
    };
    assert_eq!(from_reader, parse_error(source));
}

// ============================================================================
// Recoil marking
// ============================================================================

#[test]
fn test_mark_recoil_first_electron_only() {
    let source = "\
E 1 1
T 1 22 gamma 0 0 0 0 0 0 0 0 0 0
T 2 11 e- -1 0 0 -1 0 0 0 0 0 0
T 3 11 e- -1 0 0 -1 0 0 0 0 0 0
";
    let options = ConvertOptions::default().mark_recoil(true);
    let conversion = convert_str(source, &options).unwrap();
    let colors: Vec<_> = conversion
        .events
        .get("event_1")
        .unwrap()
        .tracks()
        .iter()
        .map(|t| t.color)
        .collect();

    assert_eq!(colors[1], RADIANT_RED);
    assert_eq!(colors[2], BLUE);
    assert_eq!(conversion.summary.recoil_marked, 1);
}

#[test]
fn test_mark_recoil_off_by_default() {
    let conversion = convert("E 1 1\nT 2 11 e- -1 0 0 -1 0 0 0 0 0 0\n");
    let track = &conversion.events.get("event_1").unwrap().tracks()[0];
    assert_eq!(track.color, BLUE);
    assert_eq!(conversion.summary.recoil_marked, 0);
}

#[test]
fn test_unknown_recoil_color_fails_before_parsing() {
    let options = ConvertOptions::default()
        .mark_recoil(true)
        .recoil_color("radiant_blue");
    // The input is malformed too, but the lookup is checked first.
    let err = convert_str("T garbage\n", &options).unwrap_err();
    match err {
        Error::Lookup(e) => assert_eq!(e.name(), "radiant_blue"),
        other => panic!("expected lookup error, got {other:?}"),
    }
}

#[test]
fn test_unknown_recoil_color_ignored_when_disabled() {
    let options = ConvertOptions::default().recoil_color("radiant_blue");
    assert!(convert_str("E 1 1\n", &options).is_ok());
}
