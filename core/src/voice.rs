//! Voice stress flow: capture a clip, analyse it, maybe raise an alert.
//!
//! Capture devices are external. A `VoiceCapture` hands over finished
//! clips; this module never touches audio hardware itself.

use crate::{
    alert::detect_medical_emergency,
    config::AlertConfig,
    entity::EmergencyAlert,
    error::DeviceError,
    gateway::{Insight, InsightGateway},
};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIME_TYPE: &str = "audio/webm";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes:     Vec<u8>,
    pub mime_type: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: DEFAULT_MIME_TYPE.to_string(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }
}

#[async_trait]
pub trait VoiceCapture: Send + Sync {
    /// Acquire the device once and release it immediately.
    async fn probe(&self) -> Result<(), DeviceError>;

    /// Record one clip.
    async fn capture(&self) -> Result<AudioClip, DeviceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiagnosticStatus {
    Passed,
    Failed { reason: String },
}

pub async fn run_diagnostic(device: &dyn VoiceCapture) -> DiagnosticStatus {
    match device.probe().await {
        Ok(()) => DiagnosticStatus::Passed,
        Err(err) => {
            log::warn!("microphone diagnostic failed: {err}");
            DiagnosticStatus::Failed { reason: err.reason }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoiceAnalysis {
    pub report: Insight,
    pub alert:  Option<EmergencyAlert>,
}

#[derive(Debug, Clone)]
pub struct VoiceStressFlow {
    gateway:   InsightGateway,
    seat:      String,
    crew_name: String,
}

impl VoiceStressFlow {
    pub fn new(gateway: InsightGateway, seat: impl Into<String>, crew_name: impl Into<String>) -> Self {
        Self {
            gateway,
            seat: seat.into(),
            crew_name: crew_name.into(),
        }
    }

    pub fn from_config(gateway: InsightGateway, config: &AlertConfig) -> Self {
        Self::new(gateway, &config.default_seat, &config.default_crew_name)
    }

    /// Analyse a clip. Fallback texts never raise an alert.
    pub async fn process(&self, clip: &AudioClip) -> VoiceAnalysis {
        let report = self
            .gateway
            .request_voice_stress_analysis(&clip.bytes, &clip.mime_type)
            .await;
        let alert = if report.is_fallback() {
            None
        } else {
            detect_medical_emergency(&report.text, &self.seat, &self.crew_name, Utc::now())
        };
        if let Some(alert) = &alert {
            log::info!("voice analysis detected {} emergency", alert.category_label());
        }
        VoiceAnalysis { report, alert }
    }

    /// Capture one clip from `device` and analyse it.
    pub async fn record_and_analyze(
        &self,
        device: &dyn VoiceCapture,
    ) -> Result<VoiceAnalysis, DeviceError> {
        let clip = device.capture().await?;
        log::debug!("captured {} bytes of {}", clip.bytes.len(), clip.mime_type);
        Ok(self.process(&clip).await)
    }
}
