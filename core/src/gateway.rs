//! External insight gateway.
//!
//! RULE: Nothing past this boundary ever sees an error. Every transport
//! or analysis failure becomes a fixed, human-readable text, tagged as a
//! fallback so callers can tell it apart from a real analysis.
//! One request, one response: no retry, no streaming.

use crate::error::AnalysisError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const BRIEFING_ERROR_TEXT: &str = "Error connecting to CRM Insight Engine.";
pub const BRIEFING_EMPTY_TEXT: &str = "Analysis unavailable.";
pub const VOICE_ERROR_TEXT: &str =
    "Analysis unavailable: Ensure your microphone is active and you provided a clear sample.";
pub const VOICE_EMPTY_TEXT: &str = "Acoustic analysis failed.";
pub const DEBRIEF_ERROR_TEXT: &str = "Error generating post-flight report.";
pub const DEBRIEF_EMPTY_TEXT: &str = "Report generation failed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    CrewBriefing,
    VoiceStress,
    Debrief,
}

impl RequestKind {
    fn error_text(&self) -> &'static str {
        match self {
            Self::CrewBriefing => BRIEFING_ERROR_TEXT,
            Self::VoiceStress  => VOICE_ERROR_TEXT,
            Self::Debrief      => DEBRIEF_ERROR_TEXT,
        }
    }

    fn empty_text(&self) -> &'static str {
        match self {
            Self::CrewBriefing => BRIEFING_EMPTY_TEXT,
            Self::VoiceStress  => VOICE_EMPTY_TEXT,
            Self::Debrief      => DEBRIEF_EMPTY_TEXT,
        }
    }
}

/// One call to the analysis collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    CrewBriefing {
        crew_summary: String,
        zone_summary: String,
        flight_phase: String,
    },
    VoiceStress {
        audio:     Vec<u8>,
        mime_type: String,
    },
    Debrief {
        flight_summary: String,
    },
}

impl AnalysisRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::CrewBriefing { .. } => RequestKind::CrewBriefing,
            Self::VoiceStress { .. }  => RequestKind::VoiceStress,
            Self::Debrief { .. }      => RequestKind::Debrief,
        }
    }

    /// The instruction text sent alongside the payload.
    pub fn prompt(&self) -> String {
        match self {
            Self::CrewBriefing { crew_summary, zone_summary, flight_phase } => format!(
                "You are an aviation human-factors and Crew Resource Management specialist. \
                 Review the live crew and cabin-zone data below for a flight in the {flight_phase} phase.\n\n\
                 Crew stress:\n{crew_summary}\n\n\
                 Zone staffing and activity:\n{zone_summary}\n\n\
                 Give a short, non-punitive CRM assessment covering:\n\
                 1. Zone bottlenecks: unstaffed zones or crowded galleys.\n\
                 2. Coordination health: does movement match SOP for {flight_phase}?\n\
                 3. Support actions: how to redistribute tasks to balance workload.\n\n\
                 Write it as a supportive briefing for the Lead Flight Attendant."
            ),
            Self::VoiceStress { .. } => "Analyse this cabin crew recording for non-lexical stress markers \
                 and their Crew Resource Management implications.\n\
                 Also decide whether the speakers describe a medical emergency. If so, name the \
                 category (for example Cardiac, Respiratory, Fainting, Choking, Anaphylaxis) and the \
                 standard airline SOP steps.\n\n\
                 Focus on fundamental frequency (F0) elevation, speech rate and jitter. \
                 Do not transcribe the words; report acoustic features.\n\n\
                 When a medical emergency is present, include exactly this section:\n\
                 [EMERGENCY_DATA]\n\
                 Type: {Category}\n\
                 SOP: {Action 1}; {Action 2}; {Action 3}\n\
                 [/EMERGENCY_DATA]\n\n\
                 Format the answer as a structured technical report."
                .to_string(),
            Self::Debrief { flight_summary } => format!(
                "Write a post-flight human-factors debrief. Use anonymised, team-level metrics \
                 and focus on systemic improvements; do not blame individuals.\n\n\
                 Flight data:\n{flight_summary}\n\n\
                 Cover: team cohesion trend, phase-specific workload spikes, SOP refinement \
                 recommendations, and a wellness summary."
            ),
        }
    }
}

/// The analysis capability the gateway wraps.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String, AnalysisError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightSource {
    Analysis,
    Fallback,
}

/// Text handed back to callers. Never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub kind:   RequestKind,
    pub text:   String,
    pub source: InsightSource,
}

impl Insight {
    pub fn is_fallback(&self) -> bool {
        self.source == InsightSource::Fallback
    }
}

#[derive(Clone)]
pub struct InsightGateway {
    analyzer: Arc<dyn Analyzer>,
}

impl std::fmt::Debug for InsightGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightGateway").finish_non_exhaustive()
    }
}

impl InsightGateway {
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        Self { analyzer }
    }

    pub async fn request_crew_briefing(
        &self,
        crew_summary: &str,
        zone_summary: &str,
        flight_phase: &str,
    ) -> Insight {
        self.run(AnalysisRequest::CrewBriefing {
            crew_summary: crew_summary.to_string(),
            zone_summary: zone_summary.to_string(),
            flight_phase: flight_phase.to_string(),
        })
        .await
    }

    pub async fn request_voice_stress_analysis(&self, audio: &[u8], mime_type: &str) -> Insight {
        self.run(AnalysisRequest::VoiceStress {
            audio:     audio.to_vec(),
            mime_type: mime_type.to_string(),
        })
        .await
    }

    pub async fn request_debrief_report(&self, flight_summary: &str) -> Insight {
        self.run(AnalysisRequest::Debrief {
            flight_summary: flight_summary.to_string(),
        })
        .await
    }

    async fn run(&self, request: AnalysisRequest) -> Insight {
        let kind = request.kind();
        match self.analyzer.analyze(&request).await {
            Ok(text) if !text.trim().is_empty() => Insight {
                kind,
                text,
                source: InsightSource::Analysis,
            },
            Ok(_) => {
                log::warn!("{kind:?} analysis returned no text");
                Insight {
                    kind,
                    text:   kind.empty_text().to_string(),
                    source: InsightSource::Fallback,
                }
            }
            Err(err) => {
                log::warn!("{kind:?} analysis failed: {err}");
                Insight {
                    kind,
                    text:   kind.error_text().to_string(),
                    source: InsightSource::Fallback,
                }
            }
        }
    }
}

/// Returns canned text for every request. Offline sessions and tests.
#[derive(Debug, Clone)]
pub struct CannedAnalyzer {
    reply: Result<String, String>,
}

impl CannedAnalyzer {
    pub fn replying(text: impl Into<String>) -> Self {
        Self { reply: Ok(text.into()) }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self { reply: Err(reason.into()) }
    }
}

#[async_trait]
impl Analyzer for CannedAnalyzer {
    async fn analyze(&self, _request: &AnalysisRequest) -> Result<String, AnalysisError> {
        self.reply.clone().map_err(AnalysisError::Transport)
    }
}
