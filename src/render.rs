//! Event Rendering
//!
//! TigerStyle: The engine never prints. Renderers turn [`SimEvent`]s into
//! lines of output and can be swapped without touching the simulation.

use crate::event::SimEvent;
use serde::Serialize;

/// Converts one event into one line of output (no trailing newline).
pub trait EventRenderer {
    /// Render a single event.
    fn render(&self, event: &SimEvent) -> String;
}

/// Output formats selectable from the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// `[HH:MM:SS] message`
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl OutputFormat {
    /// Renderer for this format.
    #[must_use]
    pub fn renderer(self) -> Box<dyn EventRenderer> {
        match self {
            Self::Text => Box::new(TextRenderer),
            Self::Json => Box::new(JsonLinesRenderer),
        }
    }
}

/// Plain text, prefixed with the simulated clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl EventRenderer for TextRenderer {
    fn render(&self, event: &SimEvent) -> String {
        format!("[{}] {}", event.at(), event)
    }
}

/// JSON Lines with one-based server numbers, as shown to people.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesRenderer;

#[derive(Serialize)]
struct EventRecord {
    #[serde(rename = "type")]
    kind: &'static str,
    at: u64,
    time: String,
    client: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    server: Option<usize>,
    message: String,
}

impl EventRenderer for JsonLinesRenderer {
    fn render(&self, event: &SimEvent) -> String {
        let record = EventRecord {
            kind: event.kind(),
            at: event.at().secs(),
            time: event.at().to_string(),
            client: event.client().0,
            server: event.server_index().map(|index| index + 1),
            message: event.to_string(),
        };

        serde_json::to_string(&record).expect("EventRecord holds only strings and integers")
    }
}
