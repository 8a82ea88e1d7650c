//! Audible cues. Playback devices are external; this module only says
//! which tone to play and hands it to a `CueSink`.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cue", rename_all = "snake_case")]
pub enum AudioCue {
    /// Single soft sine tone. Fatigue threshold notification.
    SoftChime { frequency_hz: f32, duration_ms: u32 },
    /// Repeated triangle pulses. Emergency alert announcement.
    HiChime { frequency_hz: f32, pulses: u8, spacing_ms: u32 },
}

impl AudioCue {
    pub const FATIGUE: AudioCue = AudioCue::SoftChime {
        frequency_hz: 880.0,
        duration_ms:  1500,
    };

    pub const EMERGENCY: AudioCue = AudioCue::HiChime {
        frequency_hz: 1480.0,
        pulses:       3,
        spacing_ms:   800,
    };
}

/// Output device for cues. Implementations must not block.
pub trait CueSink: Send + Sync {
    fn play(&self, cue: AudioCue);
}

/// Discards every cue. Used when no audio device is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCueSink;

impl CueSink for SilentCueSink {
    fn play(&self, _cue: AudioCue) {}
}

/// Logs each cue at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCueSink;

impl CueSink for LogCueSink {
    fn play(&self, cue: AudioCue) {
        log::info!("cue: {cue:?}");
    }
}

/// Keeps every cue it is asked to play, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingCueSink {
    played: Arc<Mutex<Vec<AudioCue>>>,
}

impl RecordingCueSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<AudioCue> {
        self.played.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl CueSink for RecordingCueSink {
    fn play(&self, cue: AudioCue) {
        if let Ok(mut played) = self.played.lock() {
            played.push(cue);
        }
    }
}
