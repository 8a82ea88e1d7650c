//! Simulation clock — owns tick state, tick period, and pause.

use crate::{
    error::{SimError, SimResult},
    types::{SessionId, Tick},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reference tick period: the dashboard advanced every 2 seconds.
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 2;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub session_id:         SessionId,
    pub current_tick:       Tick,
    pub tick_interval_secs: u64,
    pub paused:             bool,
}

impl SimClock {
    pub fn new(session_id: SessionId, tick_interval_secs: u64) -> Self {
        Self {
            session_id,
            current_tick: 0,
            tick_interval_secs,
            paused: true,
        }
    }

    /// Advance one tick. Returns the new tick number.
    pub fn advance(&mut self) -> SimResult<Tick> {
        if self.paused {
            return Err(SimError::ClockPaused { tick: self.current_tick });
        }
        self.current_tick += 1;
        Ok(self.current_tick)
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    /// Simulated seconds elapsed since the session started.
    pub fn elapsed_secs(&self) -> u64 {
        self.current_tick * self.tick_interval_secs
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }
}
