//! The event bus — everything that happened, in order.
//!
//! RULE: Subsystems report what they changed ONLY through events.
//! The engine journals every event; the session forwards the audible ones.

use crate::{
    entity::CrewTask,
    types::{CrewId, SessionId, Tick, ZoneId},
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Every event emitted during a session.
/// Variants are appended — never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    TickStarted {
        tick: Tick,
    },
    TickCompleted {
        tick: Tick,
    },
    RunInitialized {
        session_id: SessionId,
        seed: u64,
    },

    // ── Telemetry events ───────────────────────────
    ZoneLatencySampled {
        tick: Tick,
        zone_id: ZoneId,
        latency_ms: u32,
    },

    // ── Crew events ────────────────────────────────
    FatigueIncreased {
        tick: Tick,
        crew_id: CrewId,
        from: u8,
        to: u8,
    },
    FatigueRecovered {
        tick: Tick,
        crew_id: CrewId,
        from: u8,
        to: u8,
    },
    FatigueThresholdCrossed {
        tick: Tick,
        crew_id: CrewId,
        crew_name: String,
        fatigue_score: u8,
    },
    TaskReassigned {
        tick: Tick,
        crew_id: CrewId,
        from: Option<CrewTask>,
        to: CrewTask,
    },
    ZoneTransferred {
        tick: Tick,
        crew_id: CrewId,
        from_zone: ZoneId,
        to_zone: ZoneId,
    },

    // ── Staffing events ────────────────────────────
    ZoneReconciled {
        tick: Tick,
        zone_id: ZoneId,
        current_staff_count: u32,
        coverage: f64,
        is_overloaded: bool,
    },

    // ── Alert events ───────────────────────────────
    AlertRaised {
        alert_id: String,
        medical_type: Option<String>,
        seat_number: String,
    },
    AlertReplaced {
        previous_id: String,
        alert_id: String,
    },
    AlertDropped {
        alert_id: String,
        active_id: String,
    },
    AlertCleared {
        alert_id: String,
        resolution: AlertResolution,
    },
}

impl SimEvent {
    /// Stable string name for a variant. Used for journal entries.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::TickStarted { .. }             => "tick_started",
            Self::TickCompleted { .. }           => "tick_completed",
            Self::RunInitialized { .. }          => "run_initialized",
            Self::ZoneLatencySampled { .. }      => "zone_latency_sampled",
            Self::FatigueIncreased { .. }        => "fatigue_increased",
            Self::FatigueRecovered { .. }        => "fatigue_recovered",
            Self::FatigueThresholdCrossed { .. } => "fatigue_threshold_crossed",
            Self::TaskReassigned { .. }          => "task_reassigned",
            Self::ZoneTransferred { .. }         => "zone_transferred",
            Self::ZoneReconciled { .. }          => "zone_reconciled",
            Self::AlertRaised { .. }             => "alert_raised",
            Self::AlertReplaced { .. }           => "alert_replaced",
            Self::AlertDropped { .. }            => "alert_dropped",
            Self::AlertCleared { .. }            => "alert_cleared",
        }
    }
}

/// How an alert left the active slot. Both have the same effect.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertResolution {
    Acknowledged,
    Dismissed,
}

/// A journal entry: one serialized event with its provenance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventLogEntry {
    pub seq:        u64,
    pub session_id: SessionId,
    pub tick:       Tick,
    pub source:     String,
    pub event_type: String,
    pub payload:    String, // JSON-serialized SimEvent
}

/// Bounded in-memory event journal. Oldest entries fall off first.
#[derive(Debug, Clone)]
pub struct EventJournal {
    entries:  VecDeque<EventLogEntry>,
    capacity: usize,
    next_seq: u64,
}

pub const DEFAULT_JOURNAL_CAPACITY: usize = 10_000;

impl EventJournal {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
            next_seq: 0,
        }
    }

    pub fn append(
        &mut self,
        session_id: &str,
        tick: Tick,
        source: &str,
        event: &SimEvent,
    ) -> serde_json::Result<()> {
        let entry = EventLogEntry {
            seq:        self.next_seq,
            session_id: session_id.to_string(),
            tick,
            source:     source.to_string(),
            event_type: event.type_name().to_string(),
            payload:    serde_json::to_string(event)?,
        };
        self.next_seq += 1;
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        Ok(())
    }

    pub fn entries(&self) -> impl Iterator<Item = &EventLogEntry> {
        self.entries.iter()
    }

    pub fn for_tick(&self, tick: Tick) -> Vec<&EventLogEntry> {
        self.entries.iter().filter(|e| e.tick == tick).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EventJournal {
    fn default() -> Self {
        Self::new(DEFAULT_JOURNAL_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn journal_drops_oldest_at_capacity() {
        let mut journal = EventJournal::new(2);
        for tick in 1..=3 {
            journal.append("s", tick, "engine", &SimEvent::TickStarted { tick }).unwrap();
        }
        let ticks: Vec<_> = journal.entries().map(|e| e.tick).collect();
        assert_eq!(ticks, vec![2, 3]);
        assert_eq!(journal.entries().last().unwrap().seq, 2);
    }

    #[test]
    fn payload_is_tagged_json() {
        let mut journal = EventJournal::default();
        journal.append("s", 4, "engine", &SimEvent::TickCompleted { tick: 4 }).unwrap();
        let entry = journal.for_tick(4)[0];
        assert_eq!(entry.event_type, "tick_completed");
        assert_eq!(entry.payload, r#"{"type":"tick_completed","tick":4}"#);
    }
}
