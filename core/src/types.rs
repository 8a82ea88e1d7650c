//! Shared primitive types used across the entire simulation.

/// A simulation tick. One tick = one timer period (2 s by default).
pub type Tick = u64;

/// Cabin zone identifier. Zones are numbered 1..=N at startup.
pub type ZoneId = u32;

/// A stable, unique identifier for a crew member.
pub type CrewId = String;

/// The canonical session identifier.
pub type SessionId = String;
