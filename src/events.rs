//! Wire types for the DuoDebate API and decoding of stream frame payloads.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Bounds enforced by the backend on the round count.
pub const MAX_ITERATIONS_LIMIT: u32 = 20;
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Proposer,
    Challenger,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Proposer => write!(f, "PROPOSER"),
            Role::Challenger => write!(f, "CHALLENGER"),
        }
    }
}

/// One turn of the debate, attributed to either role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateMessage {
    pub role: Role,
    pub content: String,
    pub model: String,
    pub iteration: u32,
    /// Per-message progress marker ("ONGOING", "READY", "MAX_ITERATIONS").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Final artifact carried by the completion event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalResponse {
    pub final_draft: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub final_status: String,
}

// -- Request / non-streaming response types ---------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebateRequest {
    pub prompt: String,
    pub max_iterations: u32,
}

impl DebateRequest {
    /// Builds a request, clamping the round count into the backend's
    /// accepted 1–20 range.
    pub fn new(prompt: impl Into<String>, max_iterations: u32) -> Self {
        Self {
            prompt: prompt.into(),
            max_iterations: max_iterations.clamp(1, MAX_ITERATIONS_LIMIT),
        }
    }
}

/// Full-transcript response from the non-streaming `/api/debate` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebateResponse {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub transcript: Vec<DebateMessage>,
    #[serde(default)]
    pub final_status: Option<String>,
    #[serde(default)]
    pub total_iterations: Option<u32>,
    #[serde(default)]
    pub final_draft: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

/// Model pairing reported by `/api/config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    pub proposer_model: String,
    pub challenger_model: String,
}

// -- Stream events ----------------------------------------------------------

/// A typed, decoded unit of debate progress.
#[derive(Debug, Clone, PartialEq)]
pub enum DebateEvent {
    DebateStart,
    IterationStart { iteration: Option<u32> },
    ProposerResponse { message: Option<DebateMessage> },
    ChallengerResponse { message: Option<DebateMessage> },
    DebateComplete { final_response: Option<FinalResponse> },
    Error { error: String, message: Option<DebateMessage> },
    /// Forward-compatibility catch-all for discriminators this client does
    /// not know. Never fatal, ignored by the fold.
    Unknown { raw: Value },
}

impl DebateEvent {
    /// Decodes one frame payload.
    ///
    /// The payload must be valid JSON; within valid JSON, an unrecognized or
    /// missing `type` discriminator yields [`DebateEvent::Unknown`] rather
    /// than an error. Older backends emit SCREAMING_SNAKE discriminators, so
    /// both spellings are accepted.
    pub fn decode(payload: &str) -> Result<Self, serde_json::Error> {
        let raw: Value = serde_json::from_str(payload)?;
        let event = match raw.get("type").and_then(Value::as_str) {
            Some("DebateStart" | "DEBATE_START") => DebateEvent::DebateStart,
            Some("IterationStart" | "ITERATION_START") => DebateEvent::IterationStart {
                iteration: raw
                    .get("iteration")
                    .and_then(Value::as_u64)
                    .map(|i| i as u32),
            },
            Some("ProposerResponse" | "PROPOSER_RESPONSE") => DebateEvent::ProposerResponse {
                message: optional_field(&raw, "message")?,
            },
            Some("ChallengerResponse" | "CHALLENGER_RESPONSE") => DebateEvent::ChallengerResponse {
                message: optional_field(&raw, "message")?,
            },
            Some("DebateComplete" | "DEBATE_COMPLETE") => DebateEvent::DebateComplete {
                final_response: optional_field(&raw, "finalResponse")?,
            },
            Some("Error" | "ERROR") => DebateEvent::Error {
                error: raw
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                message: optional_field(&raw, "message")?,
            },
            _ => DebateEvent::Unknown { raw },
        };
        Ok(event)
    }
}

/// Reads an optional object field; absent and `null` both mean `None`, a
/// present-but-malformed value is a decode error (the frame gets skipped).
fn optional_field<T: DeserializeOwned>(
    raw: &Value,
    key: &str,
) -> Result<Option<T>, serde_json::Error> {
    match raw.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone()).map(Some),
    }
}
