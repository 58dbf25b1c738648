//! Run Summary
//!
//! Aggregate statistics computed from a finished event trace. Useful for
//! judging how close a configuration runs to saturation.

use crate::clock::Timestamp;
use crate::event::SimEvent;
use crate::server::ClientId;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Per-server totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServerUtilization {
    /// One-based server number
    pub server: usize,
    /// Clients this server finished
    pub clients_served: u64,
    /// Seconds spent serving
    pub busy_secs: u64,
    /// `busy_secs / finished_at` (0 when the run took no time)
    pub utilization: f64,
}

/// Totals for a complete run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Clients that arrived
    pub clients_arrived: u64,
    /// Clients that departed
    pub clients_served: u64,
    /// Clients that had to wait on arrival
    pub clients_waited: u64,
    /// Time of the last event
    pub finished_at: Timestamp,
    /// Longest queue observed at the end of a tick
    pub queue_len_max: usize,
    /// Sum over clients of service start minus arrival
    pub wait_secs_total: u64,
    /// Longest single wait
    pub wait_secs_max: u64,
    /// Mean wait per served client
    pub wait_secs_mean: f64,
    /// One entry per server slot
    pub servers: Vec<ServerUtilization>,
}

impl RunSummary {
    /// Summarize a chronologically ordered trace from a run with
    /// `server_count` servers.
    ///
    /// # Errors
    /// Returns a [`SummaryError`] if the trace goes back in time, names a
    /// server outside `server_count`, starts service for a client with no
    /// pending arrival, or ends service that was never started on that server.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_events(events: &[SimEvent], server_count: usize) -> Result<Self, SummaryError> {
        let mut summary = Self {
            servers: (1..=server_count)
                .map(|server| ServerUtilization {
                    server,
                    ..ServerUtilization::default()
                })
                .collect(),
            ..Self::default()
        };

        // Clients that arrived but have not started service: the queue.
        let mut arrived_at: HashMap<ClientId, Timestamp> = HashMap::new();
        let mut started_at: HashMap<ClientId, (Timestamp, usize)> = HashMap::new();
        let mut tick: Option<Timestamp> = None;

        for event in events {
            let at = event.at();
            if let Some(previous) = tick {
                if at < previous {
                    return Err(SummaryError::OutOfOrder { at, previous });
                }
                // Queue length is sampled once per tick, after all its events.
                if at != previous {
                    summary.queue_len_max = summary.queue_len_max.max(arrived_at.len());
                }
            }
            tick = Some(at);

            if let Some(server_index) = event.server_index() {
                if server_index >= server_count {
                    return Err(SummaryError::ServerOutOfRange {
                        server_index,
                        server_count,
                    });
                }
            }

            match *event {
                SimEvent::Arrived { client, .. } => {
                    summary.clients_arrived += 1;
                    arrived_at.insert(client, at);
                }
                SimEvent::Waiting { .. } => {
                    summary.clients_waited += 1;
                }
                SimEvent::ServiceStarted {
                    server_index,
                    client,
                    ..
                } => {
                    let arrival = arrived_at
                        .remove(&client)
                        .ok_or(SummaryError::NotArrived { at, client })?;
                    let wait_secs = at.secs() - arrival.secs();
                    summary.wait_secs_total += wait_secs;
                    summary.wait_secs_max = summary.wait_secs_max.max(wait_secs);
                    started_at.insert(client, (at, server_index));
                }
                SimEvent::Departed {
                    server_index,
                    client,
                    ..
                } => {
                    let start = match started_at.remove(&client) {
                        Some((start, index)) if index == server_index => start,
                        _ => {
                            return Err(SummaryError::NotInService {
                                at,
                                server_index,
                                client,
                            })
                        }
                    };
                    summary.clients_served += 1;
                    let server = &mut summary.servers[server_index];
                    server.clients_served += 1;
                    server.busy_secs += at.secs() - start.secs();
                }
            }
        }

        summary.queue_len_max = summary.queue_len_max.max(arrived_at.len());
        summary.finished_at = tick.unwrap_or_default();

        if summary.clients_served > 0 {
            summary.wait_secs_mean = summary.wait_secs_total as f64 / summary.clients_served as f64;
        }

        let elapsed_secs = summary.finished_at.secs();
        if elapsed_secs > 0 {
            for server in &mut summary.servers {
                server.utilization = server.busy_secs as f64 / elapsed_secs as f64;
            }
        }

        Ok(summary)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Finished at {}.", self.finished_at)?;
        writeln!(
            f,
            "Clients: {} arrived, {} served, {} waited.",
            self.clients_arrived, self.clients_served, self.clients_waited
        )?;
        writeln!(
            f,
            "Wait: {:.2}s mean, {}s max, {}s total. Longest queue: {}.",
            self.wait_secs_mean, self.wait_secs_max, self.wait_secs_total, self.queue_len_max
        )?;
        for server in &self.servers {
            writeln!(
                f,
                "Server #{}: {} clients, {}s busy ({:.1}%).",
                server.server,
                server.clients_served,
                server.busy_secs,
                server.utilization * 100.0
            )?;
        }
        Ok(())
    }
}

// =============================================================================
// Errors
// =============================================================================

/// A trace that no run of the engine could have produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummaryError {
    /// An event is earlier than the one before it
    #[error("event at {at} follows an event at {previous}")]
    OutOfOrder {
        /// Time of the offending event
        at: Timestamp,
        /// Time of the preceding event
        previous: Timestamp,
    },

    /// An event names a server the run did not have
    #[error("server index {server_index} out of range for {server_count} servers")]
    ServerOutOfRange {
        /// Zero-based index from the event
        server_index: usize,
        /// Servers in the run
        server_count: usize,
    },

    /// Service started for a client with no pending arrival
    #[error("client #{client} started service at {at} without a pending arrival")]
    NotArrived {
        /// When service started
        at: Timestamp,
        /// Client named by the event
        client: ClientId,
    },

    /// Service ended that was never started on that server
    #[error("client #{client} departed server #{} at {at} without being served there", .server_index + 1)]
    NotInService {
        /// When the departure happened
        at: Timestamp,
        /// Zero-based index from the event
        server_index: usize,
        /// Client named by the event
        client: ClientId,
    },
}

// =============================================================================
// Tests
// =============================================================================
