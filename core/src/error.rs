use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("tick() called while the clock is paused (tick {tick})")]
    ClockPaused { tick: u64 },

    #[error("Zone {zone_id} not found")]
    ZoneNotFound { zone_id: u32 },

    #[error("Alert slot occupied by '{active_id}'; incoming alert '{incoming_id}' rejected")]
    AlertSlotOccupied { active_id: String, incoming_id: String },

    #[error("Session has shut down")]
    SessionClosed,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;

/// Failure of the external analysis collaborator.
///
/// Never crosses the insight gateway boundary: the gateway turns every
/// variant into a fixed human-readable text.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("missing API key ({0})")]
    MissingApiKey(&'static str),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url().to_string())
    }
}

/// Audio device could not be acquired (permission denied, no device).
#[derive(Error, Debug)]
#[error("audio device unavailable: {reason}")]
pub struct DeviceError {
    pub reason: String,
}

impl DeviceError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}
