//! Recoil electron highlighting.

use tracing::info;

use crate::color::Color;
use crate::model::EventCollection;

/// Particle name of a recoil electron candidate.
pub const RECOIL_PDG_NAME: &str = "e-";

/// Recolor the first `e-` track of every event with `highlight`.
///
/// Runs on a fully parsed collection. Later `e-` tracks of the same event keep
/// their color. Returns the number of recolored tracks.
pub fn mark_recoil_electrons(events: &mut EventCollection, highlight: Color) -> usize {
    let mut marked = 0;
    for (name, event) in events.iter_mut() {
        if let Some(track) = event
            .tracks_mut()
            .iter_mut()
            .find(|t| t.pdg_name == RECOIL_PDG_NAME)
        {
            info!(event = %name, track = track.id, "marking recoil electron");
            track.color = highlight;
            marked += 1;
        }
    }
    marked
}
