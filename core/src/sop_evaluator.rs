//! SOP discrepancy evaluator — compares current against required staffing.
//!
//! Pure read/report over the zone collection. No mutation, no memory.

use crate::{entity::ZoneStatus, types::ZoneId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    DiscrepancyDetected,
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Compliant           => "compliant",
            Self::DiscrepancyDetected => "discrepancy detected",
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StaffingClass {
    Understaffed,
    Overstaffed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneDiscrepancy {
    pub zone_id:  ZoneId,
    pub label:    String,
    pub current:  u32,
    pub required: u32,
    /// current - required; never zero.
    pub delta:    i64,
    pub class:    StaffingClass,
    pub advisory: String,
}

impl ZoneDiscrepancy {
    /// Short badge text, e.g. "-2 SHORT" or "+1 SURPLUS".
    pub fn badge(&self) -> String {
        match self.class {
            StaffingClass::Understaffed => format!("{} SHORT", self.delta),
            StaffingClass::Overstaffed  => format!("+{} SURPLUS", self.delta),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SopReport {
    pub status:        ComplianceStatus,
    pub discrepancies: Vec<ZoneDiscrepancy>,
}

impl SopReport {
    pub fn is_compliant(&self) -> bool {
        self.status == ComplianceStatus::Compliant
    }

    pub fn for_zone(&self, zone_id: ZoneId) -> Option<&ZoneDiscrepancy> {
        self.discrepancies.iter().find(|d| d.zone_id == zone_id)
    }
}

fn plural(n: u64) -> &'static str {
    if n > 1 { "s" } else { "" }
}

fn advisory(label: &str, delta: i64) -> String {
    let n = delta.unsigned_abs();
    if delta < 0 {
        format!("{label} requires {n} additional crew member{} for optimal service flow.", plural(n))
    } else {
        format!(
            "{label} has {n} surplus crew member{} available for redistribution to high-demand zones.",
            plural(n)
        )
    }
}

/// Classify every zone whose staffing differs from its SOP minimum.
pub fn evaluate(zones: &[ZoneStatus]) -> SopReport {
    let discrepancies: Vec<ZoneDiscrepancy> = zones
        .iter()
        .filter_map(|z| {
            let delta = z.staffing_delta();
            if delta == 0 {
                return None;
            }
            let class = if delta < 0 {
                StaffingClass::Understaffed
            } else {
                StaffingClass::Overstaffed
            };
            Some(ZoneDiscrepancy {
                zone_id:  z.zone_id,
                label:    z.label.clone(),
                current:  z.current_staff_count,
                required: z.sop_required_staff,
                delta,
                class,
                advisory: advisory(&z.label, delta),
            })
        })
        .collect();

    let status = if discrepancies.is_empty() {
        ComplianceStatus::Compliant
    } else {
        ComplianceStatus::DiscrepancyDetected
    };
    SopReport { status, discrepancies }
}
