//! Session configuration — roster, zone layout, and the probability table.
//!
//! `SimConfig::default()` is the reference A330-300 long-haul cruise setup:
//! eight crew across six cabin zones. `SimConfig::load()` reads the same
//! shape from JSON. Every config passes `validate()` before an engine is
//! built from it; the reconciler relies on `sop_required_staff >= 1`.

use crate::{
    alert::AlertPolicy,
    clock::DEFAULT_TICK_INTERVAL_SECS,
    entity::{
        ActivityLevel, CrewMember, CrewTask, FlightPhase, StressLevel, FATIGUE_MAX,
        FATIGUE_NOTIFY_THRESHOLD,
    },
    error::{SimError, SimResult},
    types::ZoneId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,
    #[serde(default = "default_flight_phase")]
    pub flight_phase:       FlightPhase,
    /// Free-text aircraft/phase label sent with briefing requests.
    #[serde(default = "default_briefing_label")]
    pub briefing_label:     String,
    #[serde(default)]
    pub dynamics:           CrewDynamicsConfig,
    #[serde(default)]
    pub telemetry:          TelemetryConfig,
    #[serde(default)]
    pub alerts:             AlertConfig,
    pub zones:              Vec<ZoneConfig>,
    pub crew:               Vec<CrewMember>,
}

/// Per-tick, per-crew-member probability table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CrewDynamicsConfig {
    pub fatigue_roll_probability:  f64,
    pub fatigue_step:              u8,
    /// Applied every tick while stress is High, in place of `fatigue_step`.
    pub high_stress_fatigue_step:  u8,
    pub task_reassign_probability: f64,
    pub zone_transfer_probability: f64,
    pub fatigue_notify_threshold:  u8,
    /// Fatigue removed per tick while resting. Zero keeps fatigue monotonic.
    pub rest_recovery_per_tick:    u8,
}

impl Default for CrewDynamicsConfig {
    fn default() -> Self {
        Self {
            fatigue_roll_probability:  0.20,
            fatigue_step:              1,
            high_stress_fatigue_step:  2,
            task_reassign_probability: 0.02,
            zone_transfer_probability: 0.05,
            fatigue_notify_threshold:  FATIGUE_NOTIFY_THRESHOLD,
            rest_recovery_per_tick:    0,
        }
    }
}

/// Zone latency telemetry. Presentation only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TelemetryConfig {
    pub latency_min_ms:      u32,
    /// Samples fall in [min, min + span).
    pub latency_span_ms:     u32,
    pub overload_penalty_ms: u32,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            latency_min_ms:      200,
            latency_span_ms:     600,
            overload_penalty_ms: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlertConfig {
    pub policy:            AlertPolicy,
    /// Seat reported by voice detections until seat sensing exists.
    pub default_seat:      String,
    pub default_crew_name: String,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            policy:            AlertPolicy::DropNewest,
            default_seat:      "42K".into(),
            default_crew_name: "David W.".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneConfig {
    pub zone_id:            ZoneId,
    pub label:              String,
    pub sop_required_staff: u32,
    pub activity_level:     ActivityLevel,
    #[serde(default)]
    pub requests_pending:   u32,
}

fn default_tick_interval() -> u64 { DEFAULT_TICK_INTERVAL_SECS }
fn default_flight_phase() -> FlightPhase { FlightPhase::Cruise }
fn default_briefing_label() -> String { "Long-Haul Cruise (A330)".into() }

impl SimConfig {
    /// Load a JSON config file and validate it.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&content)?;
        config.validate()?;
        log::info!(
            "Loaded config from {}: {} zones, {} crew",
            path.display(),
            config.zones.len(),
            config.crew.len()
        );
        Ok(config)
    }

    pub fn zone_ids(&self) -> Vec<ZoneId> {
        self.zones.iter().map(|z| z.zone_id).collect()
    }

    /// Reject setups the simulation cannot run against.
    pub fn validate(&self) -> SimResult<()> {
        if self.tick_interval_secs == 0 {
            return Err(SimError::Config("tick_interval_secs must be greater than 0".into()));
        }
        if self.zones.is_empty() {
            return Err(SimError::Config("at least one zone is required".into()));
        }

        let mut zone_ids = HashSet::new();
        for zone in &self.zones {
            if zone.sop_required_staff == 0 {
                return Err(SimError::Config(format!(
                    "zone {} has sop_required_staff = 0",
                    zone.zone_id
                )));
            }
            if !zone_ids.insert(zone.zone_id) {
                return Err(SimError::Config(format!("duplicate zone id {}", zone.zone_id)));
            }
        }

        let mut crew_ids = HashSet::new();
        for member in &self.crew {
            if !zone_ids.contains(&member.zone) {
                return Err(SimError::Config(format!(
                    "crew member {} assigned to unknown zone {}",
                    member.id, member.zone
                )));
            }
            if member.fatigue_score > FATIGUE_MAX {
                return Err(SimError::Config(format!(
                    "crew member {} fatigue_score {} exceeds {FATIGUE_MAX}",
                    member.id, member.fatigue_score
                )));
            }
            if !crew_ids.insert(member.id.as_str()) {
                return Err(SimError::Config(format!("duplicate crew id {}", member.id)));
            }
        }

        let d = &self.dynamics;
        for (name, p) in [
            ("fatigue_roll_probability", d.fatigue_roll_probability),
            ("task_reassign_probability", d.task_reassign_probability),
            ("zone_transfer_probability", d.zone_transfer_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(SimError::Config(format!("{name} must be within [0, 1], got {p}")));
            }
        }
        if d.fatigue_notify_threshold >= FATIGUE_MAX {
            return Err(SimError::Config(format!(
                "fatigue_notify_threshold must be below {FATIGUE_MAX}"
            )));
        }
        if self.telemetry.latency_span_ms == 0 {
            return Err(SimError::Config("latency_span_ms must be greater than 0".into()));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            flight_phase:       FlightPhase::Cruise,
            briefing_label:     default_briefing_label(),
            dynamics:           CrewDynamicsConfig::default(),
            telemetry:          TelemetryConfig::default(),
            alerts:             AlertConfig::default(),
            zones:              reference_zones(),
            crew:               reference_crew(),
        }
    }
}

fn reference_zones() -> Vec<ZoneConfig> {
    use ActivityLevel::*;
    [
        (1, "FWD GAL", 1, Low,     0),
        (2, "BUS CAB", 2, Normal,  2),
        (3, "MID GAL", 1, Low,     1),
        (4, "ECO 1",   3, Normal,  8),
        (5, "ECO 2",   3, Intense, 14),
        (6, "AFT GAL", 1, Normal,  3),
    ]
    .into_iter()
    .map(|(zone_id, label, sop_required_staff, activity_level, requests_pending)| ZoneConfig {
        zone_id,
        label: label.to_string(),
        sop_required_staff,
        activity_level,
        requests_pending,
    })
    .collect()
}

fn reference_crew() -> Vec<CrewMember> {
    use CrewTask::*;
    use StressLevel::*;
    [
        ("1", "Sarah J.", "Lead",    1, Baseline, 15, 450, GalleyDuty,       72,  "2m ago"),
        ("2", "Mark T.",  "Cabin 1", 2, Elevated, 45, 120, MealDistribution, 88,  "30s ago"),
        ("3", "Elena R.", "Cabin 2", 3, Baseline, 22, 600, GalleyDuty,       68,  "5m ago"),
        ("4", "David W.", "Cabin 3", 5, High,     82, 30,  MedicalCase,      104, "10s ago"),
        ("5", "Li N.",    "Cabin 4", 5, Baseline, 30, 200, MealDistribution, 75,  "1m ago"),
        ("6", "Tom H.",   "Cabin 5", 6, Baseline, 18, 150, SafetyCheck,      70,  "4m ago"),
        ("7", "Sofia B.", "Cabin 6", 4, Elevated, 55, 300, PassengerAssist,  92,  "2m ago"),
        ("8", "James K.", "Cabin 7", 5, Baseline, 25, 400, MealDistribution, 74,  "3m ago"),
    ]
    .into_iter()
    .map(|(id, name, position, zone, stress, fatigue, secs, task, hr, comm)| CrewMember {
        id:                    id.to_string(),
        name:                  name.to_string(),
        position:              position.to_string(),
        zone,
        stress,
        fatigue_score:         fatigue,
        current_task:          Some(task),
        current_task_duration: secs,
        current_task_time:     secs,
        heart_rate:            Some(hr),
        last_communication:    comm.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_config_is_valid() {
        let config = SimConfig::default();
        config.validate().unwrap();
        assert_eq!(config.zones.len(), 6);
        assert_eq!(config.crew.len(), 8);
    }

    #[test]
    fn zero_required_staff_is_rejected() {
        let mut config = SimConfig::default();
        config.zones[2].sop_required_staff = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sop_required_staff"));
    }

    #[test]
    fn crew_in_unknown_zone_is_rejected() {
        let mut config = SimConfig::default();
        config.crew[0].zone = 9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn probability_out_of_range_is_rejected() {
        let mut config = SimConfig::default();
        config.dynamics.zone_transfer_probability = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn json_round_trip_fills_defaults() {
        let json = r#"{
            "zones": [{ "zone_id": 1, "label": "FWD", "sop_required_staff": 1, "activity_level": "Low" }],
            "crew": [{
                "id": "1", "name": "A", "position": "Lead", "zone": 1, "stress": "Baseline",
                "fatigue_score": 10, "current_task": null,
                "current_task_duration": 0, "current_task_time": 0
            }]
        }"#;
        let config: SimConfig = serde_json::from_str(json).unwrap();
        config.validate().unwrap();
        assert_eq!(config.tick_interval_secs, 2);
        assert_eq!(config.dynamics, CrewDynamicsConfig::default());
        assert_eq!(config.alerts.default_seat, "42K");
    }
}
