//! The simulation engine — one cabin session's tick pipeline.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Telemetry subsystem  (zone latency, reads last tick's overload flags)
//!   2. Crew subsystem       (fatigue, task churn, zone transfers)
//!   3. Staffing subsystem   (reconcile zones against the new roster)
//!
//! RULES:
//!   - Subsystems execute in registration order, every tick.
//!   - A tick runs against a working copy of the cabin and a staged clock.
//!     State, clock and journal change only after every subsystem
//!     succeeded. A failed tick still consumes random draws, and
//!     subsystem-private bookkeeping (the crew notice set) is not rewound.
//!   - All randomness flows through the RngBank.
//!   - All state changes are recorded in the event journal.

use crate::{
    clock::SimClock,
    config::SimConfig,
    crew_subsystem::CrewSubsystem,
    entity::{EmergencyAlert, FlightPhase},
    error::SimResult,
    event::{EventJournal, EventLogEntry, SimEvent},
    rng::RngBank,
    snapshot::CabinSnapshot,
    sop_evaluator,
    staffing_subsystem::StaffingSubsystem,
    state::CabinState,
    subsystem::SimSubsystem,
    telemetry_subsystem::TelemetrySubsystem,
    types::{SessionId, Tick},
};

pub struct SimEngine {
    pub session_id:     SessionId,
    pub clock:          SimClock,
    pub rng_bank:       RngBank,
    seed:               u64,
    subsystems:         Vec<Box<dyn SimSubsystem>>,
    state:              CabinState,
    journal:            EventJournal,
    flight_phase:       FlightPhase,
    briefing_label:     String,
}

impl SimEngine {
    /// Build a fully wired engine with all subsystems registered.
    pub fn new(session_id: SessionId, seed: u64, config: &SimConfig) -> SimResult<Self> {
        config.validate()?;
        let state = CabinState::from_config(config)?;

        let mut engine = Self {
            clock:          SimClock::new(session_id.clone(), config.tick_interval_secs),
            rng_bank:       RngBank::new(seed),
            seed,
            subsystems:     Vec::new(),
            state,
            journal:        EventJournal::default(),
            flight_phase:   config.flight_phase,
            briefing_label: config.briefing_label.clone(),
            session_id,
        };

        // EXECUTION ORDER — fixed, documented, never reordered.
        engine.register(Box::new(TelemetrySubsystem::new(config.telemetry.clone())));
        engine.register(Box::new(CrewSubsystem::new(
            config.dynamics.clone(),
            config.zone_ids(),
            config.tick_interval_secs,
        )));
        engine.register(Box::new(StaffingSubsystem::new()));

        log::info!(
            "session {} ready: seed={seed}, {} crew, {} zones",
            engine.session_id,
            engine.state.crew().len(),
            engine.state.zones().len()
        );
        Ok(engine)
    }

    fn register(&mut self, subsystem: Box<dyn SimSubsystem>) {
        self.subsystems.push(subsystem);
    }

    /// Advance one tick. This is the core simulation step.
    pub fn tick(&mut self) -> SimResult<Vec<SimEvent>> {
        let mut clock = self.clock.clone();
        let current_tick = clock.advance()?;
        let mut working = self.state.clone();
        let mut tick_events = vec![SimEvent::TickStarted { tick: current_tick }];
        let mut sources = vec!["engine"];

        // Each subsystem sees all events emitted so far this tick.
        for subsystem in &mut self.subsystems {
            let rng = self.rng_bank.for_subsystem(subsystem.slot());
            let new_events = subsystem.update(current_tick, &mut working, &tick_events, rng)?;
            sources.extend(std::iter::repeat(subsystem.name()).take(new_events.len()));
            tick_events.extend(new_events);
        }
        tick_events.push(SimEvent::TickCompleted { tick: current_tick });
        sources.push("engine");

        // ── Commit ───────────────────────────────────────────────────
        self.clock = clock;
        self.state = working;
        for (source, event) in sources.iter().zip(&tick_events) {
            self.journal.append(&self.session_id, current_tick, source, event)?;
        }
        log::debug!("tick={current_tick} committed, {} events", tick_events.len());
        Ok(tick_events)
    }

    /// Start (or resume) the clock. The first call journals RunInitialized
    /// at tick 0 so seed differences are observable.
    pub fn begin(&mut self) -> SimResult<()> {
        if self.clock.current_tick == 0 && self.journal.is_empty() {
            let init_event = SimEvent::RunInitialized {
                session_id: self.session_id.clone(),
                seed:       self.seed,
            };
            self.journal.append(&self.session_id, 0, "engine", &init_event)?;
        }
        self.clock.resume();
        Ok(())
    }

    /// Run n ticks in a loop. Used for headless runs and tests.
    pub fn run_ticks(&mut self, n: u64) -> SimResult<Vec<SimEvent>> {
        self.begin()?;
        let mut events = Vec::new();
        for _ in 0..n {
            match self.tick() {
                Ok(tick_events) => events.extend(tick_events),
                Err(err) => {
                    self.clock.pause();
                    return Err(err);
                }
            }
        }
        self.clock.pause();
        Ok(events)
    }

    /// Journal events produced outside the tick pipeline (alert desk).
    pub fn record_events(&mut self, source: &str, events: &[SimEvent]) -> SimResult<()> {
        let tick = self.clock.current_tick;
        for event in events {
            self.journal.append(&self.session_id, tick, source, event)?;
        }
        Ok(())
    }

    /// Read-only view at the current tick boundary.
    pub fn snapshot(&self, active_alert: Option<&EmergencyAlert>) -> CabinSnapshot {
        CabinSnapshot {
            session_id:     self.session_id.clone(),
            tick:           self.clock.current_tick,
            elapsed_secs:   self.clock.elapsed_secs(),
            flight_phase:   self.flight_phase,
            crew:           self.state.crew().to_vec(),
            zones:          self.state.zones().to_vec(),
            latencies:      self.state.latencies().clone(),
            sop_report:     sop_evaluator::evaluate(self.state.zones()),
            active_alert:   active_alert.cloned(),
            medical_active: self.state.has_medical_case() || active_alert.is_some(),
        }
    }

    pub fn state(&self) -> &CabinState {
        &self.state
    }

    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }

    pub fn events_for_tick(&self, tick: Tick) -> Vec<&EventLogEntry> {
        self.journal.for_tick(tick)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn flight_phase(&self) -> FlightPhase {
        self.flight_phase
    }

    /// Phase text for a briefing request, e.g. "Cruise: Long-Haul Cruise (A330)".
    pub fn briefing_phase(&self) -> String {
        format!("{}: {}", self.flight_phase, self.briefing_label)
    }
}
