//! Gemini `generateContent` transport for the insight gateway.

use crate::{
    error::AnalysisError,
    gateway::{AnalysisRequest, Analyzer, RequestKind},
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{Client, Url};
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const AUTH_ENV_VAR: &str = "GEMINI_API_KEY";
pub const FLASH_MODEL: &str = "gemini-3-flash-preview";
pub const PRO_MODEL: &str = "gemini-3-pro-preview";
/// The key travels in this header, never in the URL.
pub const API_KEY_HEADER: &str = "x-goog-api-key";
/// Thinking budget for the debrief report; the quick requests use none.
pub const DEBRIEF_THINKING_BUDGET: u32 = 5000;

#[derive(Debug, Clone)]
pub struct GeminiAnalyzer {
    client:      Client,
    endpoint:    String,
    api_key:     String,
    flash_model: String,
    pro_model:   String,
}

impl GeminiAnalyzer {
    pub fn new(api_key: impl Into<String>) -> Result<Self, AnalysisError> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
        Ok(Self {
            client,
            endpoint:    DEFAULT_ENDPOINT.to_string(),
            api_key:     api_key.into(),
            flash_model: FLASH_MODEL.to_string(),
            pro_model:   PRO_MODEL.to_string(),
        })
    }

    pub fn from_env() -> Result<Self, AnalysisError> {
        let key = std::env::var(AUTH_ENV_VAR)
            .map_err(|_| AnalysisError::MissingApiKey(AUTH_ENV_VAR))?;
        Self::new(key)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_models(mut self, flash: impl Into<String>, pro: impl Into<String>) -> Self {
        self.flash_model = flash.into();
        self.pro_model = pro.into();
        self
    }

    fn model_for(&self, kind: RequestKind) -> &str {
        match kind {
            RequestKind::Debrief => &self.pro_model,
            RequestKind::CrewBriefing | RequestKind::VoiceStress => &self.flash_model,
        }
    }

    fn url_for(&self, model: &str) -> Result<Url, AnalysisError> {
        let generated = format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            model
        );
        Url::parse(&generated)
            .map_err(|e| AnalysisError::Transport(format!("invalid endpoint {generated}: {e}")))
    }
}

/// Request body for one analysis call.
pub fn build_payload(request: &AnalysisRequest) -> Value {
    let prompt = request.prompt();
    let parts = match request {
        AnalysisRequest::VoiceStress { audio, mime_type } => json!([
            { "inlineData": { "mimeType": mime_type, "data": BASE64.encode(audio) } },
            { "text": prompt }
        ]),
        _ => json!([{ "text": prompt }]),
    };
    let thinking_budget = match request.kind() {
        RequestKind::Debrief => DEBRIEF_THINKING_BUDGET,
        _ => 0,
    };
    json!({
        "contents": [{ "parts": parts }],
        "generationConfig": {
            "thinkingConfig": { "thinkingBudget": thinking_budget }
        }
    })
}

/// Concatenate the text parts of the first candidate.
pub fn extract_text(body: &Value) -> String {
    body["candidates"]
        .as_array()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate["content"]["parts"].as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

fn truncate(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{truncated}...")
    } else {
        truncated
    }
}

#[async_trait]
impl Analyzer for GeminiAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<String, AnalysisError> {
        let model = self.model_for(request.kind());
        let url = self.url_for(model)?;
        log::debug!("gemini {:?} request to model {model}", request.kind());

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&build_payload(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body:   truncate(&body, 320),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::Malformed(e.without_url().to_string()))?;
        Ok(extract_text(&body).trim().to_string())
    }
}
