//! Read-only views of a session, taken only at tick boundaries.
//!
//! Presentation consumes these and never holds a reference into the
//! live engine, so it cannot observe a half-applied tick.

use crate::{
    entity::{CrewMember, EmergencyAlert, FlightPhase, ZoneStatus},
    sop_evaluator::SopReport,
    types::{SessionId, Tick, ZoneId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CabinSnapshot {
    pub session_id:     SessionId,
    pub tick:           Tick,
    pub elapsed_secs:   u64,
    pub flight_phase:   FlightPhase,
    pub crew:           Vec<CrewMember>,
    pub zones:          Vec<ZoneStatus>,
    pub latencies:      BTreeMap<ZoneId, u32>,
    pub sop_report:     SopReport,
    pub active_alert:   Option<EmergencyAlert>,
    /// A crew member is on a medical case or an alert is active.
    pub medical_active: bool,
}
