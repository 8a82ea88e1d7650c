//! Deterministic, injectable random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through a `RandomSource`. The engine hands each
//! subsystem its own stream from the RngBank, seeded deterministically
//! from (master_seed XOR subsystem_index). This means:
//!   - Adding a new subsystem never changes existing subsystems' streams.
//!   - Each subsystem's stream is fully reproducible in isolation.
//!   - Tests can swap any slot for a `ScriptedRandom` and assert exact states.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use std::collections::VecDeque;

/// The only randomness capability subsystems see.
pub trait RandomSource: Send {
    /// Roll a float in [0.0, 1.0).
    fn next_f64(&mut self) -> f64;

    /// Roll a u64 in [0, n).
    fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        ((self.next_f64() * n as f64) as u64).min(n - 1)
    }

    /// Bernoulli trial: returns true with probability p.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// A named, deterministic RNG for a single subsystem.
pub struct SubsystemRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SubsystemRng {
    /// Create a subsystem RNG from the master seed and a stable
    /// subsystem index. The index must never change once assigned.
    pub fn new(master_seed: u64, subsystem_index: u64) -> Self {
        let derived_seed = master_seed ^ (subsystem_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

impl RandomSource for SubsystemRng {
    fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }
}

/// Replays a fixed sequence of rolls, then a constant.
///
/// The default tail value of 0.5 keeps every low-probability branch
/// (fatigue, task, zone) from firing once the script is exhausted.
pub struct ScriptedRandom {
    rolls: VecDeque<f64>,
    tail:  f64,
}

impl ScriptedRandom {
    pub fn new(rolls: impl IntoIterator<Item = f64>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            tail:  0.5,
        }
    }

    pub fn then_repeat(mut self, tail: f64) -> Self {
        self.tail = tail.clamp(0.0, 0.999_999);
        self
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        self.rolls.pop_front().unwrap_or(self.tail)
    }
}

/// All subsystem RNGs for a single session, indexed by stable slot.
pub struct RngBank {
    streams: Vec<Box<dyn RandomSource>>,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        let streams = SubsystemSlot::ALL
            .iter()
            .map(|slot| {
                Box::new(SubsystemRng::new(master_seed, *slot as u64).with_name(slot.name()))
                    as Box<dyn RandomSource>
            })
            .collect();
        Self { streams }
    }

    pub fn for_subsystem(&mut self, slot: SubsystemSlot) -> &mut dyn RandomSource {
        self.streams[slot as usize].as_mut()
    }

    /// Replace one slot's stream. Used by tests to script exact rolls.
    pub fn override_slot(&mut self, slot: SubsystemSlot, source: Box<dyn RandomSource>) {
        self.streams[slot as usize] = source;
    }
}

/// Stable subsystem slot assignments.
/// NEVER reorder or remove entries — only append.
/// Reordering changes every subsystem's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum SubsystemSlot {
    Telemetry = 0,
    Crew = 1,
    Staffing = 2,
    // Add new subsystems here — append only.
}

impl SubsystemSlot {
    pub const ALL: [SubsystemSlot; 3] = [Self::Telemetry, Self::Crew, Self::Staffing];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Telemetry => "telemetry",
            Self::Crew => "crew",
            Self::Staffing => "staffing",
        }
    }
}
