//! SimConfig - Run Configuration
//!
//! TigerStyle: Eight integers, always in the same order:
//! seed, multiplier, increment, modulus, clients, servers,
//! arrival rate (per minute), service rate (per minute, per server).
//!
//! Values are kept signed exactly as the caller supplied them; range checks
//! belong to [`crate::SequenceGenerator`] and [`crate::SimulationEngine`].

use crate::constants::CONFIG_VALUES_COUNT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Field names in input order.
pub const CONFIG_FIELD_NAMES: [&str; CONFIG_VALUES_COUNT] = [
    "seed",
    "multiplier",
    "increment",
    "modulus",
    "clients",
    "servers",
    "arrival_rate",
    "service_rate",
];

// =============================================================================
// Types
// =============================================================================

/// Everything needed to reproduce a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Generator seed
    pub seed: i64,
    /// Generator multiplier
    pub multiplier: i64,
    /// Generator increment
    pub increment: i64,
    /// Generator modulus
    pub modulus: i64,
    /// Number of clients that will arrive
    pub clients: i64,
    /// Number of servers
    pub servers: i64,
    /// Client arrivals per minute
    pub arrival_rate: i64,
    /// Clients served per minute by one server
    pub service_rate: i64,
}

impl SimConfig {
    /// Parse eight whitespace-separated integers.
    ///
    /// Tokens after the eighth are ignored.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingValue`] if fewer than eight tokens are
    /// present, or [`ConfigError::InvalidInteger`] for a token that is not an
    /// integer.
    ///
    /// # Example
    /// ```
    /// use queuesim::SimConfig;
    /// let config = SimConfig::parse_whitespace("1 3 5 13\n2 1 4 10").unwrap();
    /// assert_eq!(config.modulus, 13);
    /// assert_eq!(config.service_rate, 10);
    /// ```
    pub fn parse_whitespace(input: &str) -> Result<Self, ConfigError> {
        let mut tokens = input.split_whitespace();
        let mut values = [0_i64; CONFIG_VALUES_COUNT];

        for (slot, field) in values.iter_mut().zip(CONFIG_FIELD_NAMES) {
            let token = tokens.next().ok_or(ConfigError::MissingValue { field })?;
            *slot = token.parse().map_err(|_| ConfigError::InvalidInteger {
                field,
                value: token.to_string(),
            })?;
        }

        let ignored = tokens.count();
        if ignored > 0 {
            tracing::warn!(ignored, "ignoring trailing configuration input");
        }

        let [seed, multiplier, increment, modulus, clients, servers, arrival_rate, service_rate] =
            values;

        Ok(Self {
            seed,
            multiplier,
            increment,
            modulus,
            clients,
            servers,
            arrival_rate,
            service_rate,
        })
    }

    /// Load a JSON object with the same eight fields.
    ///
    /// A leading `~` in `path` expands to the home directory.
    ///
    /// # Errors
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Json`] if it is not a valid configuration object.
    pub fn from_json_file(path: &str) -> Result<Self, ConfigError> {
        let path = PathBuf::from(shellexpand::tilde(path).as_ref());

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        let config: Self = serde_json::from_str(&contents)?;
        tracing::debug!(path = %path.display(), ?config, "loaded configuration");

        Ok(config)
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Configuration could not be obtained.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Input ended before all eight values were read
    #[error("missing value for {field}")]
    MissingValue {
        /// First field without a value
        field: &'static str,
    },

    /// A token did not parse as an integer
    #[error("{field} must be an integer, got {value:?}")]
    InvalidInteger {
        /// Field the token was meant for
        field: &'static str,
        /// Offending token
        value: String,
    },

    /// Configuration file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// Path after tilde expansion
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not a valid configuration object
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Tests
// =============================================================================
