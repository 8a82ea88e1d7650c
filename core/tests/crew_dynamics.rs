//! Crew dynamics under scripted rolls.
//!
//! Rolls per member, in order: fatigue, task (+ pick), zone (+ pick).
//! With default probabilities 0.1 fires the fatigue roll, 0.01 fires
//! the task and zone rolls, and 0.5 fires nothing.

use cabin_crm_core::{
    config::{CrewDynamicsConfig, SimConfig, ZoneConfig},
    crew_subsystem::CrewSubsystem,
    engine::SimEngine,
    entity::{ActivityLevel, CrewMember, CrewTask, StressLevel},
    event::SimEvent,
    rng::{ScriptedRandom, SubsystemSlot},
    state::CabinState,
    subsystem::SimSubsystem,
};

const QUIET: [f64; 3] = [0.5, 0.5, 0.5];

fn member(id: &str, zone: u32, stress: StressLevel, fatigue: u8) -> CrewMember {
    CrewMember {
        id:                    id.into(),
        name:                  format!("Crew {id}"),
        position:              "Cabin".into(),
        zone,
        stress,
        fatigue_score:         fatigue,
        current_task:          Some(CrewTask::GalleyDuty),
        current_task_duration: 10,
        current_task_time:     10,
        heart_rate:            None,
        last_communication:    String::new(),
    }
}

fn zones(n: u32) -> Vec<ZoneConfig> {
    (1..=n)
        .map(|zone_id| ZoneConfig {
            zone_id,
            label:              format!("Z{zone_id}"),
            sop_required_staff: 1,
            activity_level:     ActivityLevel::Normal,
            requests_pending:   0,
        })
        .collect()
}

fn setup(crew: Vec<CrewMember>, config: CrewDynamicsConfig) -> (CrewSubsystem, CabinState) {
    let layout = zones(3);
    let ids = layout.iter().map(|z| z.zone_id).collect();
    let state = CabinState::new(crew, &layout).unwrap();
    (CrewSubsystem::new(config, ids, 2), state)
}

fn tick(
    crew: &mut CrewSubsystem,
    state: &mut CabinState,
    tick: u64,
    rolls: &[f64],
) -> Vec<SimEvent> {
    let mut rng = ScriptedRandom::new(rolls.iter().copied());
    let events = crew.update(tick, state, &[], &mut rng).unwrap();
    assert_eq!(rng.remaining(), 0, "tick {tick} left rolls unconsumed");
    events
}

fn crossings(events: &[SimEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, SimEvent::FatigueThresholdCrossed { .. }))
        .count()
}

#[test]
fn fatigue_roll_adds_one_step() {
    let (mut crew, mut state) =
        setup(vec![member("1", 1, StressLevel::Baseline, 10)], CrewDynamicsConfig::default());

    tick(&mut crew, &mut state, 1, &[0.1, 0.5, 0.5]);
    let m = state.member("1").unwrap();
    assert_eq!(m.fatigue_score, 11);
    assert_eq!(m.current_task_duration, 12);
    assert_eq!(m.current_task_time, 12);

    tick(&mut crew, &mut state, 2, &QUIET);
    assert_eq!(state.member("1").unwrap().fatigue_score, 11);
}

#[test]
fn high_stress_adds_two_every_tick() {
    let (mut crew, mut state) =
        setup(vec![member("1", 1, StressLevel::High, 40)], CrewDynamicsConfig::default());

    tick(&mut crew, &mut state, 1, &QUIET);
    assert_eq!(state.member("1").unwrap().fatigue_score, 42);
    tick(&mut crew, &mut state, 2, &[0.1, 0.5, 0.5]);
    assert_eq!(state.member("1").unwrap().fatigue_score, 44);
}

#[test]
fn fatigue_never_exceeds_one_hundred() {
    let (mut crew, mut state) =
        setup(vec![member("1", 1, StressLevel::High, 99)], CrewDynamicsConfig::default());

    tick(&mut crew, &mut state, 1, &QUIET);
    assert_eq!(state.member("1").unwrap().fatigue_score, 100);

    let events = tick(&mut crew, &mut state, 2, &QUIET);
    assert_eq!(state.member("1").unwrap().fatigue_score, 100);
    assert!(!events.iter().any(|e| matches!(e, SimEvent::FatigueIncreased { .. })));
}

#[test]
fn threshold_crossing_is_announced_once() {
    let (mut crew, mut state) =
        setup(vec![member("1", 1, StressLevel::Baseline, 85)], CrewDynamicsConfig::default());

    let first = tick(&mut crew, &mut state, 1, &[0.1, 0.5, 0.5]);
    assert_eq!(state.member("1").unwrap().fatigue_score, 86);
    assert_eq!(crossings(&first), 1);
    assert!(crew.is_notified("1"));

    for t in 2..6 {
        let events = tick(&mut crew, &mut state, t, &[0.1, 0.5, 0.5]);
        assert_eq!(crossings(&events), 0, "tick {t} re-announced");
    }
    assert_eq!(state.member("1").unwrap().fatigue_score, 90);
}

#[test]
fn member_starting_above_threshold_is_announced_on_first_tick() {
    let (mut crew, mut state) =
        setup(vec![member("1", 1, StressLevel::Baseline, 95)], CrewDynamicsConfig::default());

    let events = tick(&mut crew, &mut state, 1, &QUIET);
    assert_eq!(crossings(&events), 1);
}

#[test]
fn recovery_below_threshold_rearms_the_announcement() {
    let config = CrewDynamicsConfig {
        fatigue_step: 5,
        rest_recovery_per_tick: 3,
        ..CrewDynamicsConfig::default()
    };
    let mut resting = member("1", 1, StressLevel::Baseline, 88);
    resting.current_task = Some(CrewTask::Rest);
    let (mut crew, mut state) = setup(vec![resting], config);

    // 88 + 5 - 3 = 90: announced.
    assert_eq!(crossings(&tick(&mut crew, &mut state, 1, &[0.1, 0.5, 0.5])), 1);
    // 90 - 3 = 87: still above, silent.
    assert_eq!(crossings(&tick(&mut crew, &mut state, 2, &QUIET)), 0);
    // 87 - 3 = 84: below, re-armed; task moves off Rest.
    assert_eq!(crossings(&tick(&mut crew, &mut state, 3, &[0.5, 0.01, 0.0, 0.5])), 0);
    assert_eq!(state.member("1").unwrap().fatigue_score, 84);
    assert!(!crew.is_notified("1"));
    // 84 + 5 = 89: announced again.
    assert_eq!(crossings(&tick(&mut crew, &mut state, 4, &[0.1, 0.5, 0.5])), 1);
}

#[test]
fn task_reassignment_resets_task_duration() {
    let (mut crew, mut state) =
        setup(vec![member("1", 1, StressLevel::Baseline, 10)], CrewDynamicsConfig::default());

    let events = tick(&mut crew, &mut state, 1, &[0.5, 0.01, 0.99, 0.5]);
    let m = state.member("1").unwrap();
    assert_eq!(m.current_task, Some(CrewTask::PassengerAssist));
    assert_eq!(m.current_task_duration, 0);
    assert_eq!(m.current_task_time, 12);
    assert!(events.contains(&SimEvent::TaskReassigned {
        tick:    1,
        crew_id: "1".into(),
        from:    Some(CrewTask::GalleyDuty),
        to:      CrewTask::PassengerAssist,
    }));
}

#[test]
fn zone_transfer_picks_uniformly_and_resets_zone_time() {
    let (mut crew, mut state) =
        setup(vec![member("1", 1, StressLevel::Baseline, 10)], CrewDynamicsConfig::default());

    let events = tick(&mut crew, &mut state, 1, &[0.5, 0.5, 0.01, 0.7]);
    let m = state.member("1").unwrap();
    assert_eq!(m.zone, 3);
    assert_eq!(m.current_task_time, 0);
    assert_eq!(m.current_task_duration, 12);
    assert!(events.contains(&SimEvent::ZoneTransferred {
        tick:      1,
        crew_id:   "1".into(),
        from_zone: 1,
        to_zone:   3,
    }));
}

#[test]
fn members_roll_in_roster_order() {
    let (mut crew, mut state) = setup(
        vec![
            member("1", 1, StressLevel::Baseline, 10),
            member("2", 2, StressLevel::Baseline, 10),
        ],
        CrewDynamicsConfig::default(),
    );

    tick(&mut crew, &mut state, 1, &[0.5, 0.5, 0.5, 0.1, 0.5, 0.5]);
    assert_eq!(state.member("1").unwrap().fatigue_score, 10);
    assert_eq!(state.member("2").unwrap().fatigue_score, 11);
}

#[test]
fn engine_reconciles_after_a_scripted_transfer() {
    let config = SimConfig {
        zones: zones(2),
        crew: vec![member("1", 1, StressLevel::Baseline, 10)],
        ..SimConfig::default()
    };
    let mut engine = SimEngine::new("scripted".into(), 1, &config).unwrap();
    engine.rng_bank.override_slot(
        SubsystemSlot::Crew,
        Box::new(ScriptedRandom::new([0.5, 0.5, 0.01, 0.9])),
    );

    assert!(engine.state().zone(2).unwrap().is_overloaded);
    engine.run_ticks(1).unwrap();

    assert_eq!(engine.state().member("1").unwrap().zone, 2);
    assert_eq!(engine.state().zone(1).unwrap().current_staff_count, 0);
    assert!(engine.state().zone(1).unwrap().is_overloaded);
    assert!(!engine.state().zone(2).unwrap().is_overloaded);
}

#[test]
fn constant_low_roll_fires_only_fatigue() {
    // 0.1 is under the fatigue probability but over task and zone.
    let config = SimConfig {
        zones: zones(2),
        crew: vec![member("1", 1, StressLevel::Baseline, 10)],
        ..SimConfig::default()
    };
    let mut engine = SimEngine::new("steady".into(), 1, &config).unwrap();
    engine
        .rng_bank
        .override_slot(SubsystemSlot::Crew, Box::new(ScriptedRandom::new([]).then_repeat(0.1)));

    engine.run_ticks(5).unwrap();

    let m = engine.state().member("1").unwrap();
    assert_eq!(m.fatigue_score, 15);
    assert_eq!(m.current_task, Some(CrewTask::GalleyDuty));
    assert_eq!(engine.state().crew_in_zone(1).count(), 1);
    assert_eq!(engine.state().crew_in_zone(2).count(), 0);
}
