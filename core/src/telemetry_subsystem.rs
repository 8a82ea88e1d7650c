//! Zone telemetry — simulated per-zone response latency.
//!
//! Execution order: first stage of every tick, so the overload penalty
//! uses the flags from the previous tick's reconciliation.
//! Presentation only; no invariant depends on these numbers.

use crate::{
    config::TelemetryConfig,
    error::SimResult,
    event::SimEvent,
    rng::{RandomSource, SubsystemSlot},
    state::CabinState,
    subsystem::SimSubsystem,
    types::Tick,
};

pub struct TelemetrySubsystem {
    config: TelemetryConfig,
}

impl TelemetrySubsystem {
    pub fn new(config: TelemetryConfig) -> Self {
        Self { config }
    }
}

impl SimSubsystem for TelemetrySubsystem {
    fn name(&self) -> &'static str { "telemetry" }

    fn slot(&self) -> SubsystemSlot { SubsystemSlot::Telemetry }

    fn update(
        &mut self,
        tick: Tick,
        state: &mut CabinState,
        _events_in: &[SimEvent],
        rng: &mut dyn RandomSource,
    ) -> SimResult<Vec<SimEvent>> {
        let mut events = Vec::with_capacity(state.zones.len());

        for zone in &state.zones {
            let mut latency_ms = self.config.latency_min_ms
                + rng.next_u64_below(self.config.latency_span_ms as u64) as u32;
            if zone.is_overloaded {
                latency_ms += self.config.overload_penalty_ms;
            }
            state.latencies.insert(zone.zone_id, latency_ms);
            events.push(SimEvent::ZoneLatencySampled {
                tick,
                zone_id: zone.zone_id,
                latency_ms,
            });
        }

        Ok(events)
    }
}
