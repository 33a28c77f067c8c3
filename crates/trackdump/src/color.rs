//! Display colors for tracks.
//!
//! Colors are 24-bit RGB integers, the form the Phoenix viewer reads from the
//! `color` field of a track. A track gets its color from its particle name
//! when that name is in [`PDG_COLORS`], otherwise from the sign of its charge.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LookupError;

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(u32);

impl Color {
    /// Create a color from a `0xRRGGBB` value. Bits above 24 are dropped.
    pub const fn from_rgb(rgb: u32) -> Self {
        Self(rgb & 0x00FF_FFFF)
    }

    /// The `0xRRGGBB` value.
    pub const fn rgb(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

pub const RED: Color = Color::from_rgb(0xFF0007);
pub const PINK: Color = Color::from_rgb(0xCF00FF);
pub const VIOLET: Color = Color::from_rgb(0x5400FF);
pub const BLUE: Color = Color::from_rgb(0x0097FF);
pub const DEEP_BLUE: Color = Color::from_rgb(0x003BFF);
pub const TEAL: Color = Color::from_rgb(0x00FFD1);
pub const GREEN: Color = Color::from_rgb(0x13FF00);
pub const SALAD: Color = Color::from_rgb(0x8CFF00);
pub const YELLOW: Color = Color::from_rgb(0xFFEE00);
pub const ORANGE: Color = Color::from_rgb(0xFF3500);
pub const RADIANT_RED: Color = Color::from_rgb(0xFF0040);

/// Palette name used to highlight recoil electrons unless configured otherwise.
pub const RECOIL_HIGHLIGHT: &str = "radiant_red";

/// Named colors, in the order they are listed by `--help`.
pub const PALETTE: &[(&str, Color)] = &[
    ("red", RED),
    ("pink", PINK),
    ("violet", VIOLET),
    ("blue", BLUE),
    ("deep_blue", DEEP_BLUE),
    ("teal", TEAL),
    ("green", GREEN),
    ("salad", SALAD),
    ("yellow", YELLOW),
    ("orange", ORANGE),
    (RECOIL_HIGHLIGHT, RADIANT_RED),
];

/// Particle names with a fixed color.
pub const PDG_COLORS: &[(&str, Color)] = &[
    ("gamma", YELLOW),
    ("e-", BLUE),
    ("pi+", PINK),
    ("pi-", SALAD),
    ("proton", VIOLET),
    ("neutron", GREEN),
];

/// Look up a palette color by name.
pub fn lookup(name: &str) -> Result<Color, LookupError> {
    PALETTE
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, color)| *color)
        .ok_or_else(|| LookupError::new(name))
}

/// Color assigned to a particle name, if it has one.
pub fn pdg_color(pdg_name: &str) -> Option<Color> {
    PDG_COLORS
        .iter()
        .find(|(n, _)| *n == pdg_name)
        .map(|(_, color)| *color)
}

/// Fallback color from the charge sign.
pub fn charge_color(charge: i64) -> Color {
    match charge.signum() {
        -1 => DEEP_BLUE,
        1 => RED,
        _ => TEAL,
    }
}

/// Color of a track: the particle's color if known, else by charge.
pub fn classify(pdg_name: &str, charge: i64) -> Color {
    pdg_color(pdg_name).unwrap_or_else(|| charge_color(charge))
}
