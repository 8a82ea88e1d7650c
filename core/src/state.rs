//! The simulation context: every mutable collection a session owns.
//!
//! RULE: Crew is written only by the crew subsystem, zones only by the
//! staffing reconciler, latencies only by the telemetry subsystem.
//! Everyone else gets shared references.

use crate::{
    config::{SimConfig, ZoneConfig},
    entity::{CrewMember, CrewTask, ZoneStatus},
    error::{SimError, SimResult},
    staffing_subsystem::reconcile_zones,
    types::ZoneId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CabinState {
    pub(crate) crew:      Vec<CrewMember>,
    pub(crate) zones:     Vec<ZoneStatus>,
    pub(crate) latencies: BTreeMap<ZoneId, u32>,
}

impl CabinState {
    /// Build a cabin from a roster and zone layout. Derived zone
    /// fields are reconciled immediately, never taken from input.
    pub fn new(crew: Vec<CrewMember>, zone_configs: &[ZoneConfig]) -> SimResult<Self> {
        let mut zones: Vec<ZoneStatus> = zone_configs
            .iter()
            .map(|z| ZoneStatus {
                zone_id:             z.zone_id,
                label:               z.label.clone(),
                sop_required_staff:  z.sop_required_staff,
                activity_level:      z.activity_level,
                requests_pending:    z.requests_pending,
                current_staff_count: 0,
                coverage:            0.0,
                is_overloaded:       false,
            })
            .collect();

        if let Some(z) = zones.iter().find(|z| z.sop_required_staff == 0) {
            return Err(SimError::Config(format!(
                "zone {} has sop_required_staff = 0",
                z.zone_id
            )));
        }
        if let Some(c) = crew.iter().find(|c| !zones.iter().any(|z| z.zone_id == c.zone)) {
            return Err(SimError::ZoneNotFound { zone_id: c.zone });
        }

        reconcile_zones(&crew, &mut zones);
        Ok(Self { crew, zones, latencies: BTreeMap::new() })
    }

    pub fn from_config(config: &SimConfig) -> SimResult<Self> {
        Self::new(config.crew.clone(), &config.zones)
    }

    pub fn crew(&self) -> &[CrewMember] {
        &self.crew
    }

    pub fn zones(&self) -> &[ZoneStatus] {
        &self.zones
    }

    pub fn latencies(&self) -> &BTreeMap<ZoneId, u32> {
        &self.latencies
    }

    pub fn zone(&self, zone_id: ZoneId) -> Option<&ZoneStatus> {
        self.zones.iter().find(|z| z.zone_id == zone_id)
    }

    pub fn zone_ids(&self) -> Vec<ZoneId> {
        self.zones.iter().map(|z| z.zone_id).collect()
    }

    pub fn crew_in_zone(&self, zone_id: ZoneId) -> impl Iterator<Item = &CrewMember> {
        self.crew.iter().filter(move |c| c.zone == zone_id)
    }

    pub fn member(&self, crew_id: &str) -> Option<&CrewMember> {
        self.crew.iter().find(|c| c.id == crew_id)
    }

    /// Any crew member currently working a medical case.
    pub fn has_medical_case(&self) -> bool {
        self.crew.iter().any(|c| c.current_task == Some(CrewTask::MedicalCase))
    }

    /// Newline-joined crew lines for a briefing request.
    pub fn crew_summary(&self) -> String {
        self.crew.iter().map(CrewMember::summary_line).collect::<Vec<_>>().join("\n")
    }

    /// Newline-joined zone lines for a briefing request.
    pub fn zone_summary(&self) -> String {
        self.zones.iter().map(ZoneStatus::summary_line).collect::<Vec<_>>().join("\n")
    }
}
