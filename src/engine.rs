//! SimulationEngine - Tick-Driven Service Center
//!
//! TigerStyle: One queue, a fixed array of servers, one-second ticks.
//!
//! Each tick runs four phases in a fixed order:
//! 1. Release: every server ticks; departures are emitted
//! 2. Arrival: a due client arrives and joins the back of the queue
//! 3. Assignment: waiting clients go to the lowest-indexed idle servers
//! 4. Advance: the clock moves forward one second
//!
//! A server freed in phase 1 is available in phase 3 of the same tick.

use crate::clock::{SimClock, Timestamp};
use crate::config::SimConfig;
use crate::constants::{SERVERS_COUNT_MAX, TIME_SECS_PER_MINUTE};
use crate::event::SimEvent;
use crate::sequence::{GeneratorError, SequenceGenerator};
use crate::server::{ClientId, ServerState};
use std::collections::VecDeque;

// =============================================================================
// Types
// =============================================================================

/// Owns all mutable state of one simulation run.
///
/// TigerStyle:
/// - Configuration is validated before the first tick; the loop itself is infallible
/// - `clients_served <= clients_arrived <= clients_total`
/// - Every arrived client is either waiting, being served, or departed
#[derive(Debug, Clone)]
pub struct SimulationEngine {
    generator: SequenceGenerator,
    servers: Vec<ServerState>,
    /// FIFO of clients without a server, front is the earliest arrival
    waiting: VecDeque<ClientId>,
    clock: SimClock,
    next_arrival_secs: u64,
    clients_total: u64,
    clients_arrived: u64,
    clients_served: u64,
    arrival_gap_base_secs: u64,
    service_duration_base_secs: u64,
}

impl SimulationEngine {
    /// Build an engine from a full configuration.
    ///
    /// # Errors
    /// - [`SimError::InvalidGeneratorParameters`] for generator parameters out of range
    /// - [`SimError::InvalidConfig`] for non-positive rates or server count, or negative clients
    /// - [`SimError::UnstableQueue`] when arrivals meet or exceed total service capacity
    pub fn new(config: &SimConfig) -> Result<Self, SimError> {
        let generator = SequenceGenerator::new(
            config.seed,
            config.multiplier,
            config.increment,
            config.modulus,
        )?;

        Self::with_generator(
            generator,
            config.clients,
            config.servers,
            config.arrival_rate,
            config.service_rate,
        )
    }

    /// Build an engine around a caller-supplied generator.
    ///
    /// The generator is used from its current state, so a caller that has
    /// already drawn values gets a different (still deterministic) run.
    ///
    /// # Errors
    /// Same as [`new`](Self::new), minus generator validation.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn with_generator(
        generator: SequenceGenerator,
        clients: i64,
        servers: i64,
        arrival_rate: i64,
        service_rate: i64,
    ) -> Result<Self, SimError> {
        if clients < 0 {
            return Err(SimError::invalid("clients", clients, "must not be negative"));
        }
        if servers <= 0 {
            return Err(SimError::invalid("servers", servers, "must be positive"));
        }
        if servers as u64 > SERVERS_COUNT_MAX as u64 {
            return Err(SimError::invalid(
                "servers",
                servers,
                "exceeds SERVERS_COUNT_MAX",
            ));
        }
        if arrival_rate <= 0 {
            return Err(SimError::invalid(
                "arrival_rate",
                arrival_rate,
                "must be positive",
            ));
        }
        if service_rate <= 0 {
            return Err(SimError::invalid(
                "service_rate",
                service_rate,
                "must be positive",
            ));
        }

        Self::validate(arrival_rate, service_rate, servers)?;

        // All four values are positive (clients non-negative) past this point.
        let server_count = servers as usize;
        let arrival_gap_base_secs = TIME_SECS_PER_MINUTE.div_ceil(arrival_rate as u64);
        let service_duration_base_secs = TIME_SECS_PER_MINUTE.div_ceil(service_rate as u64);

        tracing::info!(
            clients,
            servers,
            arrival_rate,
            service_rate,
            arrival_gap_base_secs,
            service_duration_base_secs,
            seed = generator.seed(),
            "simulation configured"
        );

        let engine = Self {
            generator,
            servers: vec![ServerState::new(); server_count],
            waiting: VecDeque::new(),
            clock: SimClock::new(),
            next_arrival_secs: 0,
            clients_total: clients as u64,
            clients_arrived: 0,
            clients_served: 0,
            arrival_gap_base_secs,
            service_duration_base_secs,
        };

        // Postconditions
        assert_eq!(engine.servers.len(), server_count);
        assert!(engine.servers.iter().all(ServerState::is_idle));

        Ok(engine)
    }

    /// Reject rate combinations where the queue would grow without bound.
    ///
    /// # Errors
    /// Returns [`SimError::UnstableQueue`] when
    /// `arrival_rate >= service_rate * servers`.
    ///
    /// # Example
    /// ```
    /// use queuesim::{SimError, SimulationEngine};
    /// assert!(SimulationEngine::validate(4, 10, 1).is_ok());
    /// assert!(matches!(
    ///     SimulationEngine::validate(10, 5, 1),
    ///     Err(SimError::UnstableQueue { .. })
    /// ));
    /// ```
    pub fn validate(arrival_rate: i64, service_rate: i64, servers: i64) -> Result<(), SimError> {
        let capacity = i128::from(service_rate) * i128::from(servers);

        if i128::from(arrival_rate) >= capacity {
            tracing::warn!(
                arrival_rate,
                service_rate,
                servers,
                "rejecting unstable configuration"
            );
            return Err(SimError::UnstableQueue {
                arrival_rate,
                service_rate,
                servers,
            });
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    /// Current simulated time.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.timestamp()
    }

    /// True once every client has departed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.clients_served == self.clients_total
    }

    /// Server slots, in index order.
    #[must_use]
    pub fn servers(&self) -> &[ServerState] {
        &self.servers
    }

    /// Number of clients waiting for a server.
    #[must_use]
    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    /// Clients the run will admit in total.
    #[must_use]
    pub fn clients_total(&self) -> u64 {
        self.clients_total
    }

    /// Clients admitted so far.
    #[must_use]
    pub fn clients_arrived(&self) -> u64 {
        self.clients_arrived
    }

    /// Clients whose service has finished.
    #[must_use]
    pub fn clients_served(&self) -> u64 {
        self.clients_served
    }

    /// Time of the next scheduled arrival.
    #[must_use]
    pub fn next_arrival(&self) -> Timestamp {
        Timestamp(self.next_arrival_secs)
    }

    /// Center of the arrival gap distribution, `ceil(60 / arrival_rate)`.
    #[must_use]
    pub fn arrival_gap_base_secs(&self) -> u64 {
        self.arrival_gap_base_secs
    }

    /// Center of the service duration distribution, `ceil(60 / service_rate)`.
    #[must_use]
    pub fn service_duration_base_secs(&self) -> u64 {
        self.service_duration_base_secs
    }

    /// Randomness source, for inspection.
    #[must_use]
    pub fn generator(&self) -> &SequenceGenerator {
        &self.generator
    }

    // -------------------------------------------------------------------------
    // Execution
    // -------------------------------------------------------------------------

    /// Run every remaining tick and collect the full event trace.
    pub fn run(&mut self) -> Vec<SimEvent> {
        let mut events = Vec::new();
        self.run_with(|event| events.push(event));
        events
    }

    /// Run every remaining tick, handing each event to `sink` in order.
    pub fn run_with<F>(&mut self, mut sink: F)
    where
        F: FnMut(SimEvent),
    {
        let mut tick_events = Vec::new();

        while !self.is_finished() {
            self.step_into(&mut tick_events);
            for event in tick_events.drain(..) {
                sink(event);
            }
        }

        tracing::info!(
            end = %self.now(),
            clients_served = self.clients_served,
            "simulation finished"
        );
    }

    /// Execute exactly one tick and return its events.
    ///
    /// # Panics
    /// Panics if the run is already finished.
    pub fn step(&mut self) -> Vec<SimEvent> {
        let mut events = Vec::new();
        self.step_into(&mut events);
        events
    }

    fn step_into(&mut self, events: &mut Vec<SimEvent>) {
        // Precondition
        assert!(
            !self.is_finished(),
            "step() called after all {} clients were served",
            self.clients_total
        );

        let at = self.clock.timestamp();
        tracing::trace!(%at, waiting = self.waiting.len(), "tick");

        self.release_servers(at, events);
        self.admit_arrival(at, events);
        self.assign_waiting(at, events);
        self.clock.tick();

        self.assert_invariants();
    }

    /// Phase 1: tick every server and report the ones that just freed.
    fn release_servers(&mut self, at: Timestamp, events: &mut Vec<SimEvent>) {
        for (server_index, server) in self.servers.iter_mut().enumerate() {
            if !server.tick() {
                continue;
            }

            let client = server
                .client_id()
                .expect("a server that just freed was serving someone");
            self.clients_served += 1;
            emit(
                events,
                SimEvent::Departed {
                    at,
                    server_index,
                    client,
                },
            );
        }
    }

    /// Phase 2: admit the client due now, if any remain.
    fn admit_arrival(&mut self, at: Timestamp, events: &mut Vec<SimEvent>) {
        let now_secs = self.clock.now_secs();
        if now_secs != self.next_arrival_secs || self.clients_arrived >= self.clients_total {
            return;
        }

        self.clients_arrived += 1;
        let client = ClientId(self.clients_arrived);
        emit(events, SimEvent::Arrived { at, client });

        // Saturation is judged against the queue as it was before this client.
        if self.idle_count() <= self.waiting.len() {
            emit(events, SimEvent::Waiting { at, client });
        }
        self.waiting.push_back(client);

        let gap_secs = self.generator.random_time(self.arrival_gap_base_secs);
        self.next_arrival_secs = now_secs + gap_secs;

        // Postcondition
        assert!(
            self.next_arrival_secs > now_secs,
            "next arrival must be in the future"
        );
    }

    /// Phase 3: hand waiting clients to idle servers, lowest index first.
    fn assign_waiting(&mut self, at: Timestamp, events: &mut Vec<SimEvent>) {
        while let Some(server_index) = self.servers.iter().position(ServerState::is_idle) {
            let Some(client) = self.waiting.pop_front() else {
                break;
            };

            let duration_secs = self.generator.random_time(self.service_duration_base_secs);
            self.servers[server_index].assign(client, duration_secs);
            emit(
                events,
                SimEvent::ServiceStarted {
                    at,
                    server_index,
                    client,
                },
            );
        }
    }

    fn idle_count(&self) -> usize {
        self.servers.iter().filter(|s| s.is_idle()).count()
    }

    fn assert_invariants(&self) {
        assert!(
            self.clients_arrived <= self.clients_total,
            "arrived {} > total {}",
            self.clients_arrived,
            self.clients_total
        );
        assert!(
            self.clients_served <= self.clients_arrived,
            "served {} > arrived {}",
            self.clients_served,
            self.clients_arrived
        );

        // Scans every server, so debug builds only.
        if cfg!(debug_assertions) {
            let busy = self.servers.len() - self.idle_count();
            assert_eq!(
                (self.waiting.len() + busy) as u64,
                self.clients_arrived - self.clients_served,
                "every arrived client must be waiting, in service, or departed"
            );
        }
    }
}

fn emit(events: &mut Vec<SimEvent>, event: SimEvent) {
    tracing::debug!(at = %event.at(), kind = event.kind(), client = %event.client(), "{event}");
    events.push(event);
}

// =============================================================================
// Errors
// =============================================================================

/// Reasons a simulation cannot start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// Generator parameters out of range
    #[error("invalid generator parameters: {0}")]
    InvalidGeneratorParameters(#[from] GeneratorError),

    /// Arrivals meet or exceed total service capacity
    #[error(
        "unstable queue: arrival rate {arrival_rate}/min >= capacity \
         {service_rate}/min x {servers} servers"
    )]
    UnstableQueue {
        /// Client arrivals per minute
        arrival_rate: i64,
        /// Clients served per minute by one server
        service_rate: i64,
        /// Number of servers
        servers: i64,
    },

    /// A count or rate outside its allowed range
    #[error("invalid {field} = {value}: {reason}")]
    InvalidConfig {
        /// Configuration field name
        field: &'static str,
        /// Value as supplied
        value: i64,
        /// What the value must satisfy
        reason: &'static str,
    },
}

impl SimError {
    fn invalid(field: &'static str, value: i64, reason: &'static str) -> Self {
        Self::InvalidConfig {
            field,
            value,
            reason,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config(
        (seed, multiplier, increment, modulus): (i64, i64, i64, i64),
        clients: i64,
        servers: i64,
        arrival_rate: i64,
        service_rate: i64,
    ) -> SimConfig {
        SimConfig {
            seed,
            multiplier,
            increment,
            modulus,
            clients,
            servers,
            arrival_rate,
            service_rate,
        }
    }

    fn arrived(at: u64, client: u64) -> SimEvent {
        SimEvent::Arrived {
            at: Timestamp(at),
            client: ClientId(client),
        }
    }

    fn started(at: u64, server_index: usize, client: u64) -> SimEvent {
        SimEvent::ServiceStarted {
            at: Timestamp(at),
            server_index,
            client: ClientId(client),
        }
    }

    fn departed(at: u64, server_index: usize, client: u64) -> SimEvent {
        SimEvent::Departed {
            at: Timestamp(at),
            server_index,
            client: ClientId(client),
        }
    }

    #[test]
    fn test_validate_stable() {
        assert!(SimulationEngine::validate(4, 10, 1).is_ok());
        assert!(SimulationEngine::validate(9, 5, 2).is_ok());
    }

    #[test]
    fn test_validate_unstable() {
        assert_eq!(
            SimulationEngine::validate(10, 5, 1),
            Err(SimError::UnstableQueue {
                arrival_rate: 10,
                service_rate: 5,
                servers: 1,
            })
        );
        // Equal demand and capacity is also unstable.
        assert!(SimulationEngine::validate(10, 5, 2).is_err());
    }

    #[test]
    fn test_validate_does_not_overflow() {
        assert!(SimulationEngine::validate(i64::MAX, i64::MAX, 2).is_ok());
    }

    #[test]
    fn test_new_rejects_unstable_before_any_tick() {
        let err = SimulationEngine::new(&config((1, 3, 5, 13), 5, 1, 10, 5)).unwrap_err();
        assert!(matches!(err, SimError::UnstableQueue { .. }));
    }

    #[test]
    fn test_new_rejects_bad_generator() {
        let err = SimulationEngine::new(&config((1, 13, 5, 13), 5, 1, 4, 10)).unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidGeneratorParameters(GeneratorError::MultiplierOutOfRange { .. })
        ));
    }

    #[test]
    fn test_new_rejects_bad_counts() {
        let generator = (1, 3, 5, 13);

        for (cfg, field) in [
            (config(generator, -1, 1, 4, 10), "clients"),
            (config(generator, 2, 0, 4, 10), "servers"),
            (config(generator, 2, 1, 0, 10), "arrival_rate"),
            (config(generator, 2, 1, -4, 10), "arrival_rate"),
            (config(generator, 2, -2, 4, -10), "servers"),
        ] {
            match SimulationEngine::new(&cfg) {
                Err(SimError::InvalidConfig { field: got, .. }) => assert_eq!(got, field),
                other => panic!("expected InvalidConfig for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_derived_bases() {
        let engine = SimulationEngine::new(&config((1, 3, 5, 13), 2, 1, 4, 10)).unwrap();
        assert_eq!(engine.arrival_gap_base_secs(), 15);
        assert_eq!(engine.service_duration_base_secs(), 6);

        // Ceiling, not truncation: 60 / 7 = 8.57
        let engine = SimulationEngine::new(&config((1, 3, 5, 13), 2, 1, 7, 8)).unwrap();
        assert_eq!(engine.arrival_gap_base_secs(), 9);
        assert_eq!(engine.service_duration_base_secs(), 8);
    }

    #[test]
    fn test_zero_clients_finishes_immediately() {
        let mut engine = SimulationEngine::new(&config((1, 3, 5, 13), 0, 3, 4, 10)).unwrap();

        assert!(engine.is_finished());
        assert!(engine.run().is_empty());
        assert_eq!(engine.now(), Timestamp(0));
    }

    #[test]
    fn test_first_client_arrives_at_tick_zero() {
        let mut engine = SimulationEngine::new(&config((1, 3, 5, 13), 2, 1, 4, 10)).unwrap();

        let events = engine.step();

        assert_eq!(events, vec![arrived(0, 1), started(0, 0, 1)]);
        assert_eq!(engine.now(), Timestamp(1));
        assert_eq!(engine.next_arrival(), Timestamp(18));
        assert_eq!(engine.servers()[0].remaining_secs(), 5);
    }

    #[test]
    fn test_single_server_trace() {
        let mut engine = SimulationEngine::new(&config((1, 3, 5, 13), 2, 1, 4, 10)).unwrap();

        let events = engine.run();

        assert_eq!(
            events,
            vec![
                arrived(0, 1),
                started(0, 0, 1),
                departed(5, 0, 1),
                arrived(18, 2),
                started(18, 0, 2),
                departed(25, 0, 2),
            ]
        );
        assert_eq!(engine.now(), Timestamp(26));
        assert_eq!(engine.clients_served(), 2);
        assert!(engine.is_finished());
    }

    #[test]
    fn test_same_tick_release_and_assignment() {
        // Client 5 waits at 46; server 1 frees at 54 and takes client 5 in that same tick.
        let mut engine = SimulationEngine::new(&config((3, 7, 7, 11), 5, 2, 5, 4)).unwrap();

        let events = engine.run();

        let position = events
            .iter()
            .position(|e| *e == departed(54, 0, 3))
            .unwrap();
        assert_eq!(events[position + 1], started(54, 0, 5));
        assert!(events.contains(&SimEvent::Waiting {
            at: Timestamp(46),
            client: ClientId(5),
        }));
    }

    #[test]
    fn test_arrival_goes_straight_to_freed_server() {
        // Departure and arrival share tick 9; the new client is served immediately.
        let mut engine = SimulationEngine::new(&config((7, 5, 3, 16), 6, 2, 6, 4)).unwrap();

        let events = engine.run();

        assert_eq!(
            &events[2..5],
            &[departed(9, 0, 1), arrived(9, 2), started(9, 0, 2)]
        );
    }

    #[test]
    fn test_waiting_when_no_idle_server() {
        let mut engine = SimulationEngine::new(&config((3, 7, 7, 11), 6, 1, 4, 5)).unwrap();

        let events = engine.run();
        let waiting: Vec<u64> = events
            .iter()
            .filter(|e| matches!(e, SimEvent::Waiting { .. }))
            .map(|e| e.client().0)
            .collect();

        assert_eq!(waiting, vec![4, 5, 6]);
    }

    #[test]
    fn test_next_arrival_stays_ahead_of_clock() {
        let mut engine = SimulationEngine::new(&config((3, 7, 7, 11), 6, 1, 4, 5)).unwrap();
        let mut arrival_ticks = Vec::new();

        while !engine.is_finished() {
            let at = engine.now();
            let due = engine.next_arrival();
            let events = engine.step();

            if events.iter().any(|e| matches!(e, SimEvent::Arrived { .. })) {
                assert_eq!(at, due, "arrival admitted off schedule");
                arrival_ticks.push(at.secs());
            }
            if engine.clients_arrived() < engine.clients_total() {
                assert!(engine.next_arrival() >= engine.now());
            }
        }

        assert_eq!(arrival_ticks.len(), 6);
        assert_eq!(arrival_ticks[0], 0);
    }

    #[test]
    fn test_every_arrived_client_is_accounted_for() {
        let mut engine = SimulationEngine::new(&config((7, 5, 3, 16), 40, 3, 10, 4)).unwrap();

        while !engine.is_finished() {
            engine.step();

            let busy = engine.servers().iter().filter(|s| !s.is_idle()).count();
            assert_eq!(
                (engine.waiting_len() + busy) as u64,
                engine.clients_arrived() - engine.clients_served()
            );
        }
    }

    #[test]
    #[should_panic(expected = "step() called after")]
    fn test_step_after_finish_panics() {
        let mut engine = SimulationEngine::new(&config((1, 3, 5, 13), 1, 1, 4, 10)).unwrap();
        engine.run();
        engine.step();
    }

    #[test]
    fn test_step_matches_run() {
        let cfg = config((3, 7, 7, 11), 5, 2, 5, 4);

        let mut stepped = SimulationEngine::new(&cfg).unwrap();
        let mut by_step = Vec::new();
        while !stepped.is_finished() {
            by_step.extend(stepped.step());
        }

        let by_run = SimulationEngine::new(&cfg).unwrap().run();

        assert_eq!(by_step, by_run);
    }

    #[test]
    fn test_with_generator_uses_current_state() {
        let mut generator = SequenceGenerator::new(1, 3, 5, 13).unwrap();
        generator.next();

        let mut engine = SimulationEngine::with_generator(generator, 2, 1, 4, 10).unwrap();
        let from_advanced = engine.run();

        let from_seed = SimulationEngine::new(&config((1, 3, 5, 13), 2, 1, 4, 10))
            .unwrap()
            .run();

        assert_ne!(from_advanced, from_seed);
    }

    #[test]
    fn test_error_messages() {
        let err = SimulationEngine::validate(10, 5, 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unstable queue: arrival rate 10/min >= capacity 5/min x 1 servers"
        );

        let err: SimError = GeneratorError::ModulusNotPositive { modulus: 0 }.into();
        assert_eq!(
            err.to_string(),
            "invalid generator parameters: mod should be greater than 0, got 0"
        );

        let err = SimulationEngine::new(&config((1, 3, 5, 13), 2, 0, 4, 10)).unwrap_err();
        assert_eq!(err.to_string(), "invalid servers = 0: must be positive");
    }
}
