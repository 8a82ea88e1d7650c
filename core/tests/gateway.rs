//! Insight gateway: every failure becomes fixed fallback text.

use async_trait::async_trait;
use cabin_crm_core::{
    error::AnalysisError,
    gateway::{
        AnalysisRequest, Analyzer, CannedAnalyzer, InsightGateway, InsightSource, RequestKind,
        BRIEFING_EMPTY_TEXT, BRIEFING_ERROR_TEXT, DEBRIEF_EMPTY_TEXT, DEBRIEF_ERROR_TEXT,
        VOICE_EMPTY_TEXT, VOICE_ERROR_TEXT,
    },
};
use std::sync::{Arc, Mutex};

/// Remembers every request it sees and answers "noted".
#[derive(Default)]
struct RecordingAnalyzer {
    seen: Mutex<Vec<AnalysisRequest>>,
}

#[async_trait]
impl Analyzer for RecordingAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String, AnalysisError> {
        self.seen.lock().unwrap().push(request.clone());
        Ok("noted".into())
    }
}

struct StatusAnalyzer;

#[async_trait]
impl Analyzer for StatusAnalyzer {
    async fn analyze(&self, _request: &AnalysisRequest) -> Result<String, AnalysisError> {
        Err(AnalysisError::Status { status: 503, body: "overloaded".into() })
    }
}

fn gateway(analyzer: impl Analyzer + 'static) -> InsightGateway {
    InsightGateway::new(Arc::new(analyzer))
}

#[tokio::test]
async fn successful_analysis_passes_text_through() {
    let gw = gateway(CannedAnalyzer::replying("Zone ECO 2 is saturated."));
    let insight = gw.request_crew_briefing("crew", "zones", "Cruise").await;

    assert_eq!(insight.kind, RequestKind::CrewBriefing);
    assert_eq!(insight.text, "Zone ECO 2 is saturated.");
    assert_eq!(insight.source, InsightSource::Analysis);
    assert!(!insight.is_fallback());
}

#[tokio::test]
async fn transport_failures_become_per_kind_error_text() {
    let gw = gateway(CannedAnalyzer::failing("connection refused"));

    let briefing = gw.request_crew_briefing("crew", "zones", "Cruise").await;
    assert_eq!(briefing.text, BRIEFING_ERROR_TEXT);
    assert!(briefing.is_fallback());

    let voice = gw.request_voice_stress_analysis(b"clip", "audio/webm").await;
    assert_eq!(voice.text, VOICE_ERROR_TEXT);

    let debrief = gw.request_debrief_report("summary").await;
    assert_eq!(debrief.text, DEBRIEF_ERROR_TEXT);
}

#[tokio::test]
async fn error_status_is_a_fallback_too() {
    let insight = gateway(StatusAnalyzer).request_debrief_report("summary").await;
    assert_eq!(insight.text, DEBRIEF_ERROR_TEXT);
    assert_eq!(insight.source, InsightSource::Fallback);
}

#[tokio::test]
async fn blank_replies_become_empty_text() {
    let gw = gateway(CannedAnalyzer::replying("   \n"));

    assert_eq!(gw.request_crew_briefing("c", "z", "p").await.text, BRIEFING_EMPTY_TEXT);
    assert_eq!(gw.request_voice_stress_analysis(b"x", "audio/webm").await.text, VOICE_EMPTY_TEXT);
    assert_eq!(gw.request_debrief_report("s").await.text, DEBRIEF_EMPTY_TEXT);
}

#[tokio::test]
async fn requests_carry_their_inputs() {
    let analyzer = Arc::new(RecordingAnalyzer::default());
    let gw = InsightGateway::new(analyzer.clone());

    gw.request_crew_briefing("Sarah J. (Lead): Stress=Baseline", "Zone 1: Staff=1/1", "Cruise")
        .await;
    gw.request_voice_stress_analysis(&[1, 2, 3], "audio/ogg").await;

    let seen = analyzer.seen.lock().unwrap();
    let prompt = seen[0].prompt();
    assert!(prompt.contains("Sarah J. (Lead): Stress=Baseline"));
    assert!(prompt.contains("Zone 1: Staff=1/1"));
    assert!(prompt.contains("Cruise"));
    assert_eq!(
        seen[1],
        AnalysisRequest::VoiceStress { audio: vec![1, 2, 3], mime_type: "audio/ogg".into() }
    );
    assert!(seen[1].prompt().contains("[EMERGENCY_DATA]"));
}
