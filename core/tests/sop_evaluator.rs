//! SOP discrepancy evaluation over reconciled zones.

use cabin_crm_core::{
    config::SimConfig,
    entity::{ActivityLevel, ZoneStatus},
    sop_evaluator::{evaluate, ComplianceStatus, StaffingClass},
    state::CabinState,
};

fn zone(zone_id: u32, label: &str, current: u32, required: u32) -> ZoneStatus {
    ZoneStatus {
        zone_id,
        label:               label.into(),
        sop_required_staff:  required,
        activity_level:      ActivityLevel::Normal,
        requests_pending:    0,
        current_staff_count: current,
        coverage:            0.0,
        is_overloaded:       current < required,
    }
}

#[test]
fn understaffed_zone_reports_shortfall() {
    let report = evaluate(&[zone(4, "ECO 1", 1, 3)]);

    assert_eq!(report.status, ComplianceStatus::DiscrepancyDetected);
    let d = report.for_zone(4).unwrap();
    assert_eq!(d.delta, -2);
    assert_eq!(d.class, StaffingClass::Understaffed);
    assert_eq!(d.badge(), "-2 SHORT");
    assert_eq!(
        d.advisory,
        "ECO 1 requires 2 additional crew members for optimal service flow."
    );
}

#[test]
fn overstaffed_zone_reports_surplus() {
    let report = evaluate(&[zone(1, "FWD GAL", 2, 1)]);

    let d = report.for_zone(1).unwrap();
    assert_eq!(d.delta, 1);
    assert_eq!(d.class, StaffingClass::Overstaffed);
    assert_eq!(d.badge(), "+1 SURPLUS");
    assert_eq!(
        d.advisory,
        "FWD GAL has 1 surplus crew member available for redistribution to high-demand zones."
    );
}

#[test]
fn matching_zones_are_compliant() {
    let report = evaluate(&[zone(1, "A", 1, 1), zone(2, "B", 3, 3)]);
    assert!(report.is_compliant());
    assert!(report.discrepancies.is_empty());
    assert_eq!(report.status.to_string(), "compliant");
}

#[test]
fn only_mismatched_zones_are_listed() {
    let report = evaluate(&[zone(1, "A", 1, 1), zone(2, "B", 0, 2), zone(3, "C", 4, 1)]);
    let ids: Vec<_> = report.discrepancies.iter().map(|d| d.zone_id).collect();
    assert_eq!(ids, vec![2, 3]);
    assert_eq!(report.status.to_string(), "discrepancy detected");
}

#[test]
fn reference_cabin_is_short_in_business_and_eco_one() {
    let state = CabinState::from_config(&SimConfig::default()).unwrap();
    let report = evaluate(state.zones());

    assert!(!report.is_compliant());
    assert_eq!(report.discrepancies.len(), 2);
    assert_eq!(report.for_zone(2).unwrap().delta, -1);
    assert_eq!(report.for_zone(4).unwrap().delta, -2);
    assert!(report.for_zone(5).is_none());
}
