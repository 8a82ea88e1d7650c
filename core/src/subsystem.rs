//! Subsystem trait and registry.
//!
//! RULE: Every per-tick stage implements SimSubsystem.
//! The engine calls update() on each registered subsystem
//! in registration order, every tick.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    error::SimResult,
    event::SimEvent,
    rng::{RandomSource, SubsystemSlot},
    state::CabinState,
    types::Tick,
};

/// The contract every subsystem must fulfill.
pub trait SimSubsystem: Send {
    /// Unique stable name for this subsystem.
    fn name(&self) -> &'static str;

    /// The RNG slot this subsystem draws from.
    fn slot(&self) -> SubsystemSlot;

    /// Called once per tick by the engine.
    ///
    /// - `tick`:      the current tick number
    /// - `state`:     the working copy of the cabin for this tick
    /// - `events_in`: events emitted by earlier subsystems this tick
    /// - `rng`:       this subsystem's random stream
    ///
    /// Returns a vec of new events to add to the tick's event log.
    fn update(
        &mut self,
        tick: Tick,
        state: &mut CabinState,
        events_in: &[SimEvent],
        rng: &mut dyn RandomSource,
    ) -> SimResult<Vec<SimEvent>>;
}
