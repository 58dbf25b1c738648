//! SimEvent - Structured Simulation Output
//!
//! The engine emits these in strict chronological order. Text and JSON
//! rendering live in [`crate::render`].

use crate::clock::Timestamp;
use crate::server::ClientId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Something observable that happened during one tick.
///
/// `server_index` is the zero-based slot; rendered text shows it one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    /// A client entered the service center
    Arrived {
        /// When
        at: Timestamp,
        /// Who
        client: ClientId,
    },
    /// A client arrived while no idle server was left for it
    Waiting {
        /// When
        at: Timestamp,
        /// Who
        client: ClientId,
    },
    /// A server took a client from the front of the queue
    ServiceStarted {
        /// When
        at: Timestamp,
        /// Zero-based server slot
        server_index: usize,
        /// Who
        client: ClientId,
    },
    /// A server finished with its client
    Departed {
        /// When
        at: Timestamp,
        /// Zero-based server slot
        server_index: usize,
        /// Who
        client: ClientId,
    },
}

impl SimEvent {
    /// Time the event happened.
    #[must_use]
    pub fn at(&self) -> Timestamp {
        match self {
            Self::Arrived { at, .. }
            | Self::Waiting { at, .. }
            | Self::ServiceStarted { at, .. }
            | Self::Departed { at, .. } => *at,
        }
    }

    /// Client the event concerns.
    #[must_use]
    pub fn client(&self) -> ClientId {
        match self {
            Self::Arrived { client, .. }
            | Self::Waiting { client, .. }
            | Self::ServiceStarted { client, .. }
            | Self::Departed { client, .. } => *client,
        }
    }

    /// Zero-based server slot, for server events.
    #[must_use]
    pub fn server_index(&self) -> Option<usize> {
        match self {
            Self::ServiceStarted { server_index, .. } | Self::Departed { server_index, .. } => {
                Some(*server_index)
            }
            Self::Arrived { .. } | Self::Waiting { .. } => None,
        }
    }

    /// Short machine name, matching the serde tag.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Arrived { .. } => "arrived",
            Self::Waiting { .. } => "waiting",
            Self::ServiceStarted { .. } => "service_started",
            Self::Departed { .. } => "departed",
        }
    }
}

/// Human-readable message, without the timestamp.
impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arrived { client, .. } => write!(f, "Client #{client} arrived."),
            Self::Waiting { client, .. } => write!(
                f,
                "Client #{client} is waiting for a server to become available."
            ),
            Self::ServiceStarted {
                server_index,
                client,
                ..
            } => write!(
                f,
                "Client #{client} is being served by server #{}.",
                server_index + 1
            ),
            Self::Departed {
                server_index,
                client,
                ..
            } => write!(
                f,
                "Server #{} finished serving client #{client}.",
                server_index + 1
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let at = Timestamp(5);
        let client = ClientId(3);

        assert_eq!(
            SimEvent::Arrived { at, client }.to_string(),
            "Client #3 arrived."
        );
        assert_eq!(
            SimEvent::Waiting { at, client }.to_string(),
            "Client #3 is waiting for a server to become available."
        );
        assert_eq!(
            SimEvent::ServiceStarted {
                at,
                server_index: 0,
                client
            }
            .to_string(),
            "Client #3 is being served by server #1."
        );
        assert_eq!(
            SimEvent::Departed {
                at,
                server_index: 1,
                client
            }
            .to_string(),
            "Server #2 finished serving client #3."
        );
    }

    #[test]
    fn test_accessors() {
        let event = SimEvent::Departed {
            at: Timestamp(9),
            server_index: 2,
            client: ClientId(4),
        };

        assert_eq!(event.at(), Timestamp(9));
        assert_eq!(event.client(), ClientId(4));
        assert_eq!(event.server_index(), Some(2));
        assert_eq!(event.kind(), "departed");

        let event = SimEvent::Arrived {
            at: Timestamp(1),
            client: ClientId(1),
        };
        assert_eq!(event.server_index(), None);
        assert_eq!(event.kind(), "arrived");
    }

    #[test]
    fn test_serde_tag() {
        let event = SimEvent::ServiceStarted {
            at: Timestamp(12),
            server_index: 0,
            client: ClientId(2),
        };

        let json = serde_json::to_value(event).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "type": "service_started",
                "at": 12,
                "server_index": 0,
                "client": 2,
            })
        );

        let back: SimEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
