//! Event, track and point records, laid out the way the Phoenix viewer
//! expects them in JSON.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::color::Color;

/// A trajectory point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub t: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64, t: f64) -> Self {
        Self { x, y, z, t }
    }
}

impl From<[f64; 4]> for Point {
    fn from([x, y, z, t]: [f64; 4]) -> Self {
        Self { x, y, z, t }
    }
}

impl From<Point> for [f64; 4] {
    fn from(p: Point) -> Self {
        [p.x, p.y, p.z, p.t]
    }
}

/// Track parameters `[d0, z0, phi, eta, qOverP]`.
///
/// `d0` and `z0` are not computed and stay at zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 5]", into = "[f64; 5]")]
pub struct TrackParams {
    pub d0: f64,
    pub z0: f64,
    pub phi: f64,
    pub eta: f64,
    pub q_over_p: f64,
}

impl TrackParams {
    /// Parameters with `d0 = z0 = 0`. `q_over_p` is stored as given.
    pub fn new(phi: f64, eta: f64, q_over_p: f64) -> Self {
        Self {
            d0: 0.0,
            z0: 0.0,
            phi,
            eta,
            q_over_p,
        }
    }
}

impl From<[f64; 5]> for TrackParams {
    fn from([d0, z0, phi, eta, q_over_p]: [f64; 5]) -> Self {
        Self {
            d0,
            z0,
            phi,
            eta,
            q_over_p,
        }
    }
}

impl From<TrackParams> for [f64; 5] {
    fn from(p: TrackParams) -> Self {
        [p.d0, p.z0, p.phi, p.eta, p.q_over_p]
    }
}

/// The q/p value that gets stored for a track.
///
/// Neutral tracks and non-finite values store `0.0`, so nothing non-finite
/// reaches the JSON output through this field.
pub fn normalize_q_over_p(charge: i64, q_over_p: f64) -> f64 {
    if charge == 0 || !q_over_p.is_finite() {
        0.0
    } else {
        q_over_p
    }
}

/// A simulated particle track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    #[serde(rename = "pdg")]
    pub pdg_code: i64,
    pub pdg_name: String,
    pub charge: i64,
    #[serde(rename = "pos")]
    pub positions: Vec<Point>,
    /// `[px, py, pz, vx, vy, vz]`
    #[serde(rename = "pnv")]
    pub momentum_vertex: [f64; 6],
    #[serde(rename = "dparams")]
    pub params: TrackParams,
    pub color: Color,
}

/// Tracks of an event, grouped under the collection name Phoenix displays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackGroups {
    pub mc_tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "run number")]
    pub run_number: i64,
    #[serde(rename = "event number")]
    pub event_number: i64,
    #[serde(rename = "Tracks")]
    pub tracks: TrackGroups,
}

impl Event {
    /// An event with no tracks.
    pub fn new(run_number: i64, event_number: i64) -> Self {
        Self {
            run_number,
            event_number,
            tracks: TrackGroups::default(),
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks.mc_tracks
    }

    pub fn tracks_mut(&mut self) -> &mut Vec<Track> {
        &mut self.tracks.mc_tracks
    }
}

/// Name under which an event is stored.
pub fn event_name(prefix: &str, event_number: i64) -> String {
    format!("{prefix}_{event_number}")
}

/// Events keyed by name, in the order their names first appeared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventCollection {
    events: IndexMap<String, Event>,
}

impl EventCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event, returning its index and the event it replaced.
    ///
    /// A replaced event keeps its position in the ordering.
    pub fn insert(&mut self, name: String, event: Event) -> (usize, Option<Event>) {
        self.events.insert_full(name, event)
    }

    pub fn get(&self, name: &str) -> Option<&Event> {
        self.events.get(name)
    }

    pub fn get_index(&self, index: usize) -> Option<(&str, &Event)> {
        self.events
            .get_index(index)
            .map(|(name, event)| (name.as_str(), event))
    }

    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut Event> {
        self.events.get_index_mut(index).map(|(_, event)| event)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Event)> {
        self.events.iter().map(|(name, event)| (name.as_str(), event))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Event)> {
        self.events
            .iter_mut()
            .map(|(name, event)| (name.as_str(), event))
    }
}
