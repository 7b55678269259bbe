//! Gemini arbiter client
//!
//! Calls `generateContent` and expects the first candidate's text to be the
//! verdict object described in `schema`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::schema::{parse_verdict, response_schema};
use super::Arbiter;
use crate::models::{ArbiterOutcome, LocalPrediction};

/// Arbiter connection settings
#[derive(Debug, Clone)]
pub struct ArbiterConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

pub struct GeminiArbiter {
    config: ArbiterConfig,
    http_client: reqwest::Client,
}

// Wire types

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiArbiter {
    pub fn new(config: ArbiterConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { config, http_client })
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    fn request_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

/// Prompt carrying the URL and the local model's opinion
pub fn build_prompt(url: &str, local: &LocalPrediction) -> String {
    format!(
        "Analyze this URL: {url}\n\
         \n\
         Our local deep learning model prediction:\n\
         - Status: {label}\n\
         - Confidence: {confidence:.4}\n\
         \n\
         Act as the final arbiter. Decide whether the URL is Safe, Malicious, or \
         Adversarial (crafted to evade detection, e.g. typo-squatting, homoglyphs, \
         encoded payloads). You may overrule the local model.\n\
         Respond with JSON only: verdict, confidence_score (0 to 1), reasoning \
         (at most 3 short plain lines, not numbered or bulleted), \
         adversarial_technique (null if none).",
        url = url,
        label = local.label,
        confidence = local.confidence,
    )
}

/// Concatenated text of the first candidate
fn candidate_text(response: GenerateResponse) -> Option<String> {
    let parts = response.candidates.into_iter().next()?.content?.parts;
    let text: String = parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl Arbiter for GeminiArbiter {
    async fn arbitrate(&self, url: &str, local: &LocalPrediction) -> ArbiterOutcome {
        let Some(api_key) = self.api_key() else {
            return ArbiterOutcome::Unconfigured("GEMINI_API_KEY is not set".to_string());
        };

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: build_prompt(url, local) }],
            }],
            generation_config: json!({
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
            }),
        };

        let response = match self
            .http_client
            .post(self.request_url())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return ArbiterOutcome::Unreachable(format!(
                    "timed out after {}s",
                    self.config.timeout.as_secs_f32()
                ));
            }
            Err(e) => return ArbiterOutcome::Unreachable(e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return ArbiterOutcome::Unreachable(format!("arbiter returned {}: {}", status.as_u16(), body));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return ArbiterOutcome::Unreachable(format!("reading body: {}", e)),
        };

        let envelope: GenerateResponse = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) => return ArbiterOutcome::MalformedResponse(format!("invalid envelope: {}", e)),
        };

        let Some(text) = candidate_text(envelope) else {
            return ArbiterOutcome::MalformedResponse("response has no candidate text".to_string());
        };

        match parse_verdict(&text) {
            Ok(verdict) => ArbiterOutcome::Verdict(verdict),
            Err(message) => ArbiterOutcome::MalformedResponse(message),
        }
    }

    fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }
}
