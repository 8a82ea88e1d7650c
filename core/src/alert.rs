//! Emergency alert state machine.
//!
//! STATES:
//!   Idle   — no active alert
//!   Active — exactly one EmergencyAlert held
//!
//! TRANSITIONS:
//!   Idle   → Active : submit(); plays the emergency cue once
//!   Active → Idle   : acknowledge() or dismiss(); identical effect
//!   Active → Active : submit() while occupied, governed by AlertPolicy;
//!                     never replays the cue
//!
//! Every transition is recorded as a SimEvent in the desk's outbox. The
//! owner drains it into the session journal.

use crate::{
    cue::{AudioCue, CueSink},
    emergency_tag::parse_emergency_block,
    entity::{AlertType, EmergencyAlert},
    error::{SimError, SimResult},
    event::{AlertResolution, SimEvent},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Substituted when a detection supplies no steps of its own.
pub const DEFAULT_SOP_BRIEF: [&str; 3] = [
    "Assess Cabin",
    "Notify Flight Deck",
    "Request Medical Volunteer",
];

/// Free-text keywords that count as a detection without a structured block.
pub const DETECTION_KEYWORDS: [&str; 2] = ["medical", "emergency"];

/// What to do with a detection that arrives while an alert is active.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertPolicy {
    /// Keep the active alert; the newcomer is logged and discarded.
    #[default]
    DropNewest,
    /// The newcomer takes the slot; the old alert is discarded.
    ReplaceActive,
    /// Return an error to the submitter.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertState {
    Idle,
    Active,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlertOutcome {
    Raised { alert_id: String },
    Replaced { previous: EmergencyAlert, alert_id: String },
    Dropped { alert_id: String, active_id: String },
}

pub struct AlertDesk {
    policy: AlertPolicy,
    active: Option<EmergencyAlert>,
    cues:   Arc<dyn CueSink>,
    outbox: Vec<SimEvent>,
}

impl AlertDesk {
    pub fn new(policy: AlertPolicy, cues: Arc<dyn CueSink>) -> Self {
        Self {
            policy,
            active: None,
            cues,
            outbox: Vec::new(),
        }
    }

    pub fn policy(&self) -> AlertPolicy {
        self.policy
    }

    pub fn state(&self) -> AlertState {
        if self.active.is_some() {
            AlertState::Active
        } else {
            AlertState::Idle
        }
    }

    pub fn active(&self) -> Option<&EmergencyAlert> {
        self.active.as_ref()
    }

    /// Offer a newly detected alert to the slot.
    pub fn submit(&mut self, alert: EmergencyAlert) -> SimResult<AlertOutcome> {
        match (self.active.take(), self.policy) {
            (None, _) => {
                log::info!(
                    "alert {} raised: {} at seat {}",
                    alert.id,
                    alert.category_label(),
                    alert.seat_number
                );
                self.outbox.push(SimEvent::AlertRaised {
                    alert_id:     alert.id.clone(),
                    medical_type: alert.medical_type.clone(),
                    seat_number:  alert.seat_number.clone(),
                });
                let alert_id = alert.id.clone();
                self.active = Some(alert);
                self.cues.play(AudioCue::EMERGENCY);
                Ok(AlertOutcome::Raised { alert_id })
            }
            (Some(current), AlertPolicy::DropNewest) => {
                log::warn!("alert {} dropped; {} still active", alert.id, current.id);
                self.outbox.push(SimEvent::AlertDropped {
                    alert_id:  alert.id.clone(),
                    active_id: current.id.clone(),
                });
                let outcome = AlertOutcome::Dropped {
                    alert_id:  alert.id,
                    active_id: current.id.clone(),
                };
                self.active = Some(current);
                Ok(outcome)
            }
            (Some(previous), AlertPolicy::ReplaceActive) => {
                log::info!("alert {} replaces {}", alert.id, previous.id);
                self.outbox.push(SimEvent::AlertReplaced {
                    previous_id: previous.id.clone(),
                    alert_id:    alert.id.clone(),
                });
                let alert_id = alert.id.clone();
                self.active = Some(alert);
                Ok(AlertOutcome::Replaced { previous, alert_id })
            }
            (Some(current), AlertPolicy::Reject) => {
                let err = SimError::AlertSlotOccupied {
                    active_id:   current.id.clone(),
                    incoming_id: alert.id,
                };
                self.active = Some(current);
                Err(err)
            }
        }
    }

    pub fn acknowledge(&mut self) -> Option<EmergencyAlert> {
        self.clear(AlertResolution::Acknowledged)
    }

    pub fn dismiss(&mut self) -> Option<EmergencyAlert> {
        self.clear(AlertResolution::Dismissed)
    }

    fn clear(&mut self, resolution: AlertResolution) -> Option<EmergencyAlert> {
        let alert = self.active.take()?;
        log::info!("alert {} cleared ({resolution:?})", alert.id);
        self.outbox.push(SimEvent::AlertCleared {
            alert_id: alert.id.clone(),
            resolution,
        });
        Some(alert)
    }

    /// Take the transitions recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.outbox)
    }
}

/// Build an alert; missing steps fall back to `DEFAULT_SOP_BRIEF`.
pub fn build_alert(
    alert_type: AlertType,
    medical_type: Option<String>,
    sop_brief: Option<Vec<String>>,
    seat_number: impl Into<String>,
    crew_name: impl Into<String>,
    at: DateTime<Utc>,
) -> EmergencyAlert {
    EmergencyAlert {
        id: uuid::Uuid::new_v4().simple().to_string(),
        alert_type,
        medical_type,
        sop_brief: sop_brief
            .unwrap_or_else(|| DEFAULT_SOP_BRIEF.iter().map(|s| s.to_string()).collect()),
        seat_number: seat_number.into(),
        crew_name: crew_name.into(),
        timestamp: at.timestamp_millis(),
    }
}

/// True when `report` carries a structured block or a detection keyword.
pub fn is_emergency_report(report: &str) -> bool {
    if parse_emergency_block(report).is_some() {
        return true;
    }
    let lower = report.to_lowercase();
    DETECTION_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Turn an analysis report into a medical alert, if it describes one.
pub fn detect_medical_emergency(
    report: &str,
    seat_number: &str,
    crew_name: &str,
    at: DateTime<Utc>,
) -> Option<EmergencyAlert> {
    if !is_emergency_report(report) {
        return None;
    }
    let block = parse_emergency_block(report).unwrap_or_default();
    Some(build_alert(
        AlertType::Medical,
        block.medical_type,
        block.sop_steps,
        seat_number,
        crew_name,
        at,
    ))
}
