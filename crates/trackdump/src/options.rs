//! Options for a conversion.

use crate::color::RECOIL_HIGHLIGHT;

/// Options for converting a dump to JSON.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Prefix of event names, `{prefix}_{event number}` (default: "event")
    pub event_prefix: String,

    /// Highlight the first `e-` track of every event (default: false)
    pub mark_recoil: bool,

    /// Palette color used by `mark_recoil` (default: "radiant_red")
    pub recoil_color: String,

    /// Indentation of the JSON output (default: "  " - 2 spaces)
    pub indent: &'static str,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            event_prefix: "event".to_string(),
            mark_recoil: false,
            recoil_color: RECOIL_HIGHLIGHT.to_string(),
            indent: "  ",
        }
    }
}

impl ConvertOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the event name prefix.
    pub fn event_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.event_prefix = prefix.into();
        self
    }

    /// Enable or disable recoil electron highlighting.
    pub fn mark_recoil(mut self, enabled: bool) -> Self {
        self.mark_recoil = enabled;
        self
    }

    /// Set the palette color used to highlight recoil electrons.
    pub fn recoil_color(mut self, name: impl Into<String>) -> Self {
        self.recoil_color = name.into();
        self
    }

    /// Set a custom indentation string.
    pub fn indent(mut self, indent: &'static str) -> Self {
        self.indent = indent;
        self
    }
}
