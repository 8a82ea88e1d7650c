//! Entity model — crew, zones, and alerts.
//!
//! RULE: These are data contracts only. Behaviour lives in the subsystems.
//! Derived zone fields are written by the staffing reconciler and nothing else.

use crate::types::{CrewId, ZoneId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fatigue above this fires the one-shot soft notification.
pub const FATIGUE_NOTIFY_THRESHOLD: u8 = 85;
/// Fatigue above this is shown as a critical band.
pub const FATIGUE_CRITICAL_THRESHOLD: u8 = 75;
pub const FATIGUE_MAX: u8 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StressLevel {
    Baseline,
    Elevated,
    High,
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Baseline => "Baseline",
            Self::Elevated => "Elevated",
            Self::High     => "High",
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CrewTask {
    MealDistribution,
    MedicalCase,
    SafetyCheck,
    GalleyDuty,
    Rest,
    PassengerAssist,
}

impl CrewTask {
    /// Tasks the simulation may reassign at random. Medical cases and
    /// rest are only ever set by configuration.
    pub const REASSIGNABLE: [CrewTask; 4] = [
        Self::MealDistribution,
        Self::SafetyCheck,
        Self::GalleyDuty,
        Self::PassengerAssist,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::MealDistribution => "Meal Distribution",
            Self::MedicalCase      => "Medical Case",
            Self::SafetyCheck      => "Safety Check",
            Self::GalleyDuty       => "Galley Duty",
            Self::Rest             => "Rest",
            Self::PassengerAssist  => "Passenger Assist",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FatigueBand {
    Nominal,
    Critical,
    HighAlert,
}

impl FatigueBand {
    pub fn of(score: u8) -> Self {
        if score > FATIGUE_NOTIFY_THRESHOLD {
            Self::HighAlert
        } else if score > FATIGUE_CRITICAL_THRESHOLD {
            Self::Critical
        } else {
            Self::Nominal
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewMember {
    pub id:                    CrewId,
    pub name:                  String,
    pub position:              String,
    pub zone:                  ZoneId,
    pub stress:                StressLevel,
    /// 0–100, clamped.
    pub fatigue_score:         u8,
    pub current_task:          Option<CrewTask>,
    /// Seconds engaged in the current task.
    pub current_task_duration: u64,
    /// Seconds since the last zone change.
    pub current_task_time:     u64,
    #[serde(default)]
    pub heart_rate:            Option<u16>,
    #[serde(default)]
    pub last_communication:    String,
}

impl CrewMember {
    pub fn fatigue_band(&self) -> FatigueBand {
        FatigueBand::of(self.fatigue_score)
    }

    /// One line of the crew summary sent with a briefing request.
    pub fn summary_line(&self) -> String {
        let task = self.current_task.map_or("None", |t| t.label());
        format!(
            "{} ({}): Stress={}, Task={}, Zone={}",
            self.name, self.position, self.stress, task, self.zone
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivityLevel {
    Low,
    Normal,
    Intense,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneStatus {
    pub zone_id:             ZoneId,
    pub label:               String,
    /// Static SOP minimum. Must be >= 1.
    pub sop_required_staff:  u32,
    pub activity_level:      ActivityLevel,
    pub requests_pending:    u32,
    // ── Derived by the staffing reconciler ──
    pub current_staff_count: u32,
    /// Percent, clamped to [0, 100].
    pub coverage:            f64,
    pub is_overloaded:       bool,
}

impl ZoneStatus {
    /// Positive = surplus, negative = shortage.
    pub fn staffing_delta(&self) -> i64 {
        self.current_staff_count as i64 - self.sop_required_staff as i64
    }

    /// One line of the zone summary sent with a briefing request.
    pub fn summary_line(&self) -> String {
        format!(
            "Zone {}: Staff={}/{}, Req={}",
            self.zone_id, self.current_staff_count, self.sop_required_staff, self.requests_pending
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AlertType {
    Medical,
    Security,
    Safety,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmergencyAlert {
    pub id:           String,
    #[serde(rename = "type")]
    pub alert_type:   AlertType,
    pub medical_type: Option<String>,
    pub sop_brief:    Vec<String>,
    pub seat_number:  String,
    pub crew_name:    String,
    /// Unix epoch milliseconds.
    pub timestamp:    i64,
}

impl EmergencyAlert {
    /// Category shown on the alert modal.
    pub fn category_label(&self) -> &str {
        self.medical_type.as_deref().unwrap_or("Detected")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FlightPhase {
    PreFlight,
    Taxi,
    Takeoff,
    Climb,
    Cruise,
    Descent,
    Approach,
    Landing,
    Deboarding,
}

impl fmt::Display for FlightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PreFlight  => "Pre-Flight",
            Self::Taxi       => "Taxi",
            Self::Takeoff    => "Takeoff",
            Self::Climb      => "Climb",
            Self::Cruise     => "Cruise",
            Self::Descent    => "Descent",
            Self::Approach   => "Approach",
            Self::Landing    => "Landing",
            Self::Deboarding => "De-boarding",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatigue_bands_follow_thresholds() {
        assert_eq!(FatigueBand::of(75), FatigueBand::Nominal);
        assert_eq!(FatigueBand::of(76), FatigueBand::Critical);
        assert_eq!(FatigueBand::of(85), FatigueBand::Critical);
        assert_eq!(FatigueBand::of(86), FatigueBand::HighAlert);
    }

    #[test]
    fn alert_serializes_type_field() {
        let alert = EmergencyAlert {
            id:           "a1".into(),
            alert_type:   AlertType::Medical,
            medical_type: None,
            sop_brief:    vec![],
            seat_number:  "42K".into(),
            crew_name:    "David W.".into(),
            timestamp:    0,
        };
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["type"], "Medical");
        assert_eq!(alert.category_label(), "Detected");
    }
}
