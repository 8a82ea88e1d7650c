//! Staffing reconciler — rebuilds every zone's derived fields from the
//! crew-to-zone assignment.
//!
//! Execution order: last stage of every tick, after crew dynamics.
//!
//! Design:
//!   - current_staff_count = |{c : c.zone == zone_id}|
//!   - is_overloaded       = current_staff_count < sop_required_staff
//!   - coverage            = clamp(0, 100, count / required * 100 - pending * 2)
//!   - Never reads a previously derived value. Running twice on the same
//!     crew yields identical zones.
//!   - sop_required_staff >= 1 is a setup precondition (config validation).

use crate::{
    entity::{CrewMember, ZoneStatus},
    error::SimResult,
    event::SimEvent,
    rng::{RandomSource, SubsystemSlot},
    state::CabinState,
    subsystem::SimSubsystem,
    types::Tick,
};

/// Coverage lost per pending passenger request.
pub const COVERAGE_PENALTY_PER_REQUEST: f64 = 2.0;

/// Coverage percentage for a zone, clamped to [0, 100].
pub fn compute_coverage(current_staff: u32, required_staff: u32, requests_pending: u32) -> f64 {
    debug_assert!(required_staff > 0, "sop_required_staff must be >= 1");
    let raw = (current_staff as f64 / required_staff as f64) * 100.0
        - requests_pending as f64 * COVERAGE_PENALTY_PER_REQUEST;
    raw.clamp(0.0, 100.0)
}

/// Recompute derived fields of every zone in place from `crew`.
pub fn reconcile_zones(crew: &[CrewMember], zones: &mut [ZoneStatus]) {
    for zone in zones.iter_mut() {
        let count = crew.iter().filter(|c| c.zone == zone.zone_id).count() as u32;
        zone.current_staff_count = count;
        zone.is_overloaded = count < zone.sop_required_staff;
        zone.coverage = compute_coverage(count, zone.sop_required_staff, zone.requests_pending);
    }
}

/// Pure variant: returns reconciled copies and leaves the input untouched.
pub fn reconciled(crew: &[CrewMember], zones: &[ZoneStatus]) -> Vec<ZoneStatus> {
    let mut out = zones.to_vec();
    reconcile_zones(crew, &mut out);
    out
}

#[derive(Debug, Default)]
pub struct StaffingSubsystem;

impl StaffingSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl SimSubsystem for StaffingSubsystem {
    fn name(&self) -> &'static str { "staffing" }

    fn slot(&self) -> SubsystemSlot { SubsystemSlot::Staffing }

    fn update(
        &mut self,
        tick: Tick,
        state: &mut CabinState,
        _events_in: &[SimEvent],
        _rng: &mut dyn RandomSource,
    ) -> SimResult<Vec<SimEvent>> {
        reconcile_zones(&state.crew, &mut state.zones);

        let events = state
            .zones
            .iter()
            .map(|z| SimEvent::ZoneReconciled {
                tick,
                zone_id:             z.zone_id,
                current_staff_count: z.current_staff_count,
                coverage:            z.coverage,
                is_overloaded:       z.is_overloaded,
            })
            .collect();

        log::debug!(
            "tick={tick} staffing: overloaded zones={:?}",
            state.zones.iter().filter(|z| z.is_overloaded).map(|z| z.zone_id).collect::<Vec<_>>()
        );
        Ok(events)
    }
}
