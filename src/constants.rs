//! TigerStyle Constants
//!
//! Units are part of the name; limits end in `_MAX`, defaults in `_DEFAULT`.

/// Seconds in one minute (rates are configured per minute)
pub const TIME_SECS_PER_MINUTE: u64 = 60;

/// Seconds in one hour (timestamp rendering)
pub const TIME_SECS_PER_HOUR: u64 = 3_600;

/// Simulated seconds advanced per tick
pub const TICK_SECS: u64 = 1;

/// Default real-time delay between ticks in the CLI (no pacing)
pub const TICK_DELAY_MS_DEFAULT: u64 = 0;

/// Maximum real-time delay between ticks in the CLI
pub const TICK_DELAY_MS_MAX: u64 = 10_000;

/// Maximum number of values printed by `queuesim sequence`
pub const SEQUENCE_BATCH_COUNT_MAX: usize = 1_000_000;

/// Number of integers in a whitespace-separated configuration
pub const CONFIG_VALUES_COUNT: usize = 8;

/// Maximum number of server slots in one simulation
pub const SERVERS_COUNT_MAX: usize = 1_000_000;
