//! Cabin CRM core: crew simulation, staffing reconciliation, SOP checks,
//! emergency alerts, and the external insight gateway.

pub mod alert;
pub mod clock;
pub mod config;
pub mod crew_subsystem;
pub mod cue;
pub mod emergency_tag;
pub mod engine;
pub mod entity;
pub mod error;
pub mod event;
pub mod gateway;
pub mod gemini;
pub mod rng;
pub mod session;
pub mod snapshot;
pub mod sop_evaluator;
pub mod staffing_subsystem;
pub mod state;
pub mod subsystem;
pub mod telemetry_subsystem;
pub mod types;
pub mod voice;
