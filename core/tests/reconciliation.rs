//! Integration tests for the staffing reconciler.
//!
//! Tests verify:
//! 1. Staff counts always equal crew membership per zone
//! 2. Overload flags follow count < required
//! 3. Coverage is clamped to [0, 100] and penalised by pending requests
//! 4. Reconciliation is idempotent
//! 5. Derived fields stay consistent across a long engine run

use cabin_crm_core::{
    config::SimConfig,
    engine::SimEngine,
    entity::{ActivityLevel, CrewMember, StressLevel, ZoneStatus},
    staffing_subsystem::{compute_coverage, reconcile_zones, reconciled},
    state::CabinState,
};

fn member(id: &str, zone: u32) -> CrewMember {
    CrewMember {
        id:                    id.into(),
        name:                  format!("Crew {id}"),
        position:              "Cabin".into(),
        zone,
        stress:                StressLevel::Baseline,
        fatigue_score:         20,
        current_task:          None,
        current_task_duration: 0,
        current_task_time:     0,
        heart_rate:            None,
        last_communication:    String::new(),
    }
}

fn zone(zone_id: u32, required: u32, pending: u32) -> ZoneStatus {
    ZoneStatus {
        zone_id,
        label:               format!("Z{zone_id}"),
        sop_required_staff:  required,
        activity_level:      ActivityLevel::Normal,
        requests_pending:    pending,
        // Stale values; reconciliation must overwrite them.
        current_staff_count: 99,
        coverage:            -5.0,
        is_overloaded:       true,
    }
}

fn assert_consistent(crew: &[CrewMember], zones: &[ZoneStatus]) {
    for z in zones {
        let count = crew.iter().filter(|c| c.zone == z.zone_id).count() as u32;
        assert_eq!(z.current_staff_count, count, "zone {} count", z.zone_id);
        assert_eq!(z.is_overloaded, count < z.sop_required_staff, "zone {} overload", z.zone_id);
        assert!((0.0..=100.0).contains(&z.coverage), "zone {} coverage {}", z.zone_id, z.coverage);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: reference cabin reconciles to the expected figures
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn reference_cabin_reconciles() {
    let state = CabinState::from_config(&SimConfig::default()).unwrap();
    assert_consistent(state.crew(), state.zones());

    let eco2 = state.zone(5).unwrap();
    assert_eq!(eco2.current_staff_count, 3);
    assert_eq!(state.crew_in_zone(5).count(), 3);
    assert!(!eco2.is_overloaded);
    assert!((eco2.coverage - 72.0).abs() < 1e-9);

    let eco1 = state.zone(4).unwrap();
    assert_eq!(eco1.current_staff_count, 1);
    assert!(eco1.is_overloaded);
    assert!((eco1.coverage - (100.0 / 3.0 - 16.0)).abs() < 1e-9);

    let business = state.zone(2).unwrap();
    assert!(business.is_overloaded);
    assert!((business.coverage - 46.0).abs() < 1e-9);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: coverage clamps at both ends
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn coverage_is_clamped() {
    assert_eq!(compute_coverage(0, 3, 0), 0.0);
    assert_eq!(compute_coverage(5, 1, 0), 100.0);
    assert_eq!(compute_coverage(1, 1, 60), 0.0);
    assert_eq!(compute_coverage(2, 2, 5), 90.0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: an empty zone is overloaded with zero coverage
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn empty_zone_is_overloaded() {
    let crew = vec![member("1", 1)];
    let mut zones = vec![zone(1, 1, 0), zone(2, 2, 4)];
    reconcile_zones(&crew, &mut zones);

    assert_eq!(zones[1].current_staff_count, 0);
    assert!(zones[1].is_overloaded);
    assert_eq!(zones[1].coverage, 0.0);
    assert!(!zones[0].is_overloaded);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: idempotence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn reconciling_twice_changes_nothing() {
    let crew = vec![member("1", 1), member("2", 1), member("3", 2)];
    let zones = vec![zone(1, 1, 3), zone(2, 3, 0), zone(3, 1, 1)];

    let once = reconciled(&crew, &zones);
    let twice = reconciled(&crew, &once);
    assert_eq!(once, twice);
    assert_consistent(&crew, &once);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: moving a member moves exactly one unit of staff
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn transfer_moves_one_unit_of_staff() {
    let mut crew = vec![member("1", 1), member("2", 1)];
    let mut zones = vec![zone(1, 2, 0), zone(2, 1, 0)];
    reconcile_zones(&crew, &mut zones);
    assert!(!zones[0].is_overloaded);
    assert!(zones[1].is_overloaded);

    crew[1].zone = 2;
    reconcile_zones(&crew, &mut zones);
    assert_eq!(zones[0].current_staff_count, 1);
    assert_eq!(zones[1].current_staff_count, 1);
    assert!(zones[0].is_overloaded);
    assert!(!zones[1].is_overloaded);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 6: derived fields hold after every tick of a long run
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn derived_fields_hold_across_engine_run() {
    let mut engine = SimEngine::new("recon-run".into(), 7, &SimConfig::default()).unwrap();
    for _ in 0..20 {
        engine.run_ticks(10).unwrap();
        assert_consistent(engine.state().crew(), engine.state().zones());
    }
    assert_eq!(engine.clock.current_tick, 200);
}
