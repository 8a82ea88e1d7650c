//! Crew dynamics — fatigue, task churn, and zone transfers.
//!
//! Execution order: after telemetry, before staffing reconciliation.
//!
//! Every member is advanced from the start-of-tick roster; no member's
//! update can see another member's update from the same tick. The new
//! roster replaces the old one in a single assignment.
//!
//! Roll order per member (fixed, scripted tests depend on it):
//!   1. fatigue roll
//!   2. task reassignment roll, then task pick if it fired
//!   3. zone transfer roll, then zone pick if it fired

use crate::{
    config::CrewDynamicsConfig,
    entity::{CrewMember, CrewTask, StressLevel, FATIGUE_MAX},
    error::SimResult,
    event::SimEvent,
    rng::{RandomSource, SubsystemSlot},
    state::CabinState,
    subsystem::SimSubsystem,
    types::{CrewId, Tick, ZoneId},
};
use std::collections::BTreeSet;

pub struct CrewSubsystem {
    config:             CrewDynamicsConfig,
    zone_ids:           Vec<ZoneId>,
    tick_interval_secs: u64,
    /// Members whose threshold crossing has already been announced.
    notified:           BTreeSet<CrewId>,
}

impl CrewSubsystem {
    pub fn new(config: CrewDynamicsConfig, zone_ids: Vec<ZoneId>, tick_interval_secs: u64) -> Self {
        debug_assert!(!zone_ids.is_empty(), "crew subsystem needs at least one zone");
        Self {
            config,
            zone_ids,
            tick_interval_secs,
            notified: BTreeSet::new(),
        }
    }

    pub fn is_notified(&self, crew_id: &str) -> bool {
        self.notified.contains(crew_id)
    }

    fn advance_fatigue(
        &self,
        member: &CrewMember,
        rng: &mut dyn RandomSource,
    ) -> u8 {
        let rolled = rng.chance(self.config.fatigue_roll_probability);
        let step = if member.stress == StressLevel::High {
            self.config.high_stress_fatigue_step
        } else if rolled {
            self.config.fatigue_step
        } else {
            0
        };
        let mut fatigue = member.fatigue_score.saturating_add(step).min(FATIGUE_MAX);
        if member.current_task == Some(CrewTask::Rest) {
            fatigue = fatigue.saturating_sub(self.config.rest_recovery_per_tick);
        }
        fatigue
    }

    fn advance_member(
        &mut self,
        tick: Tick,
        member: &CrewMember,
        rng: &mut dyn RandomSource,
        events: &mut Vec<SimEvent>,
    ) -> CrewMember {
        let mut next = member.clone();

        // ── Fatigue ────────────────────────────────────────────────
        next.fatigue_score = self.advance_fatigue(member, rng);
        if next.fatigue_score > member.fatigue_score {
            events.push(SimEvent::FatigueIncreased {
                tick,
                crew_id: member.id.clone(),
                from:    member.fatigue_score,
                to:      next.fatigue_score,
            });
        } else if next.fatigue_score < member.fatigue_score {
            events.push(SimEvent::FatigueRecovered {
                tick,
                crew_id: member.id.clone(),
                from:    member.fatigue_score,
                to:      next.fatigue_score,
            });
        }

        if next.fatigue_score > self.config.fatigue_notify_threshold {
            if self.notified.insert(member.id.clone()) {
                log::info!(
                    "tick={tick} crew {} ({}) fatigue {} crossed {}",
                    member.id,
                    member.name,
                    next.fatigue_score,
                    self.config.fatigue_notify_threshold
                );
                events.push(SimEvent::FatigueThresholdCrossed {
                    tick,
                    crew_id:       member.id.clone(),
                    crew_name:     member.name.clone(),
                    fatigue_score: next.fatigue_score,
                });
            }
        } else {
            self.notified.remove(&member.id);
        }

        // ── Task ───────────────────────────────────────────────────
        if rng.chance(self.config.task_reassign_probability) {
            let pick = rng.next_u64_below(CrewTask::REASSIGNABLE.len() as u64) as usize;
            let task = CrewTask::REASSIGNABLE[pick];
            next.current_task = Some(task);
            next.current_task_duration = 0;
            events.push(SimEvent::TaskReassigned {
                tick,
                crew_id: member.id.clone(),
                from:    member.current_task,
                to:      task,
            });
        } else {
            next.current_task_duration += self.tick_interval_secs;
        }

        // ── Zone ───────────────────────────────────────────────────
        if rng.chance(self.config.zone_transfer_probability) {
            let pick = rng.next_u64_below(self.zone_ids.len() as u64) as usize;
            next.zone = self.zone_ids[pick];
            next.current_task_time = 0;
            events.push(SimEvent::ZoneTransferred {
                tick,
                crew_id:   member.id.clone(),
                from_zone: member.zone,
                to_zone:   next.zone,
            });
        } else {
            next.current_task_time += self.tick_interval_secs;
        }

        next
    }
}

impl SimSubsystem for CrewSubsystem {
    fn name(&self) -> &'static str { "crew" }

    fn slot(&self) -> SubsystemSlot { SubsystemSlot::Crew }

    fn update(
        &mut self,
        tick: Tick,
        state: &mut CabinState,
        _events_in: &[SimEvent],
        rng: &mut dyn RandomSource,
    ) -> SimResult<Vec<SimEvent>> {
        let mut events = Vec::new();
        let roster: Vec<CrewMember> = state
            .crew
            .iter()
            .map(|member| self.advance_member(tick, member, rng, &mut events))
            .collect();
        state.crew = roster;

        log::debug!(
            "tick={tick} crew: {} members, {} events",
            state.crew.len(),
            events.len()
        );
        Ok(events)
    }
}
