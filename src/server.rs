//! ServerState - One Service Slot
//!
//! TigerStyle: `remaining_secs == 0` if and only if the server is idle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a client, assigned in arrival order starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Occupancy of a single server slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerState {
    /// Client most recently assigned (kept after release until reassigned)
    client: Option<ClientId>,
    /// Seconds until the server frees
    remaining_secs: u64,
}

impl ServerState {
    /// Create an idle server that has never served anyone.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff no time remains on the current client.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.remaining_secs == 0
    }

    /// Client being served, or the last one served if idle.
    #[must_use]
    pub fn client_id(&self) -> Option<ClientId> {
        self.client
    }

    /// Seconds until the server frees.
    #[must_use]
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Start serving `client` for `duration_secs`.
    ///
    /// # Panics
    /// Panics if the server is busy or `duration_secs` is zero.
    pub fn assign(&mut self, client: ClientId, duration_secs: u64) {
        // Preconditions
        assert!(
            self.is_idle(),
            "assign({client}) on busy server ({} secs remaining)",
            self.remaining_secs
        );
        assert!(duration_secs > 0, "service duration must be positive");

        self.client = Some(client);
        self.remaining_secs = duration_secs;

        // Postcondition
        assert!(!self.is_idle(), "server must be busy after assign");
    }

    /// Advance one second.
    ///
    /// # Returns
    /// `true` only when this call moved the server from busy to idle.
    pub fn tick(&mut self) -> bool {
        if self.remaining_secs == 0 {
            return false;
        }

        self.remaining_secs -= 1;
        self.remaining_secs == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_server_is_idle() {
        let server = ServerState::new();
        assert!(server.is_idle());
        assert_eq!(server.client_id(), None);
        assert_eq!(server.remaining_secs(), 0);
    }

    #[test]
    fn test_assign_and_release() {
        let mut server = ServerState::new();

        server.assign(ClientId(7), 3);
        assert!(!server.is_idle());
        assert_eq!(server.client_id(), Some(ClientId(7)));

        assert!(!server.tick());
        assert!(!server.tick());
        assert!(server.tick());

        assert!(server.is_idle());
        assert_eq!(server.client_id(), Some(ClientId(7)));
    }

    #[test]
    fn test_tick_when_idle_is_noop() {
        let mut server = ServerState::new();

        assert!(!server.tick());
        assert!(!server.tick());
        assert_eq!(server.remaining_secs(), 0);
    }

    #[test]
    fn test_reassign_after_release() {
        let mut server = ServerState::new();
        server.assign(ClientId(1), 1);
        assert!(server.tick());

        server.assign(ClientId(2), 2);
        assert_eq!(server.client_id(), Some(ClientId(2)));
        assert_eq!(server.remaining_secs(), 2);
    }

    #[test]
    #[should_panic(expected = "on busy server")]
    fn test_assign_busy_panics() {
        let mut server = ServerState::new();
        server.assign(ClientId(1), 5);
        server.assign(ClientId(2), 5);
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn test_assign_zero_duration_panics() {
        let mut server = ServerState::new();
        server.assign(ClientId(1), 0);
    }

    #[test]
    fn test_client_id_display() {
        assert_eq!(ClientId(42).to_string(), "42");
    }
}
