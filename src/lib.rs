//! Queuesim - Deterministic Service Center Simulation
//!
//! TigerStyle: single queue, multiple servers, one-second ticks.
//!
//! # Philosophy
//!
//! > "Same seed, same trace."
//!
//! The simulation is deterministic end to end:
//! 1. All randomness comes from a linear-congruential [`SequenceGenerator`]
//! 2. Time is a tick counter, never the wall clock
//! 3. The engine emits structured [`SimEvent`]s; rendering is a separate layer
//! 4. Unstable configurations are rejected before the first tick
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │             SimulationEngine                │
//! ├─────────────────────────────────────────────┤
//! │  1. release    │ servers tick, departures   │
//! │  2. arrival    │ admit due client, queue it │
//! │  3. assignment │ FIFO → lowest idle server  │
//! │  4. advance    │ clock += 1                 │
//! ├─────────────────────────────────────────────┤
//! │  SequenceGenerator │ ServerState[] │ queue  │
//! └─────────────────────────────────────────────┘
//!                      │
//!                      ▼ SimEvent
//!          ┌───────────────────────┐
//!          │ EventRenderer (text,  │
//!          │ JSON lines)           │
//!          └───────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use queuesim::{SimConfig, SimulationEngine, SimEvent};
//!
//! let config = SimConfig::parse_whitespace("1 3 5 13 2 1 4 10").unwrap();
//! let mut engine = SimulationEngine::new(&config).unwrap();
//! let events = engine.run();
//!
//! let departures = events
//!     .iter()
//!     .filter(|e| matches!(e, SimEvent::Departed { .. }))
//!     .count();
//! assert_eq!(departures, 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod config;
pub mod constants;
pub mod engine;
pub mod event;
pub mod render;
pub mod sequence;
pub mod server;
pub mod summary;

// Re-export common types
pub use clock::{SimClock, Timestamp};
pub use config::{ConfigError, SimConfig};
pub use constants::*;
pub use engine::{SimError, SimulationEngine};
pub use event::SimEvent;
pub use render::{EventRenderer, JsonLinesRenderer, OutputFormat, TextRenderer};
pub use sequence::{GeneratorError, SequenceGenerator};
pub use server::{ClientId, ServerState};
pub use summary::{RunSummary, ServerUtilization, SummaryError};
