//! Per-run debate state and the event fold.
//!
//! The original client dispatched each stream event through a callback with
//! a big per-type branch mutating UI fields in place. Here every transition
//! is a pure fold `apply(state, event) -> (state, directive?)`: the state is
//! consumed and replaced wholesale, so observers never see a half-updated
//! record, and each transition is testable in isolation.

use serde::Serialize;

use crate::events::{DebateEvent, DebateMessage};
use crate::framer::Frame;

/// Set as `last_error` when the stream ends before a terminal event.
pub const STREAM_ENDED_EARLY: &str = "stream ended before the debate completed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    /// Terminal: a `DebateComplete` event was folded.
    Complete,
    /// Terminal: an `Error` event was folded or the transport gave up.
    Failed,
}

/// Side-effect directive for the host UI, at most one per fold.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Directive {
    /// Surface an error to the user.
    Alert { message: String },
    /// A frame payload failed to decode and was skipped.
    DecodeError { raw: String },
}

/// State accumulated for one debate run, from submission to terminal
/// outcome. Owned exclusively by the fold; a new submission replaces it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub phase: Phase,
    pub prompt: String,
    /// Append-only for the lifetime of one run; arrival order is the
    /// authoritative round order.
    pub transcript: Vec<DebateMessage>,
    pub final_draft: Option<String>,
    pub sources: Vec<String>,
    pub status: Option<String>,
    pub last_error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::idle()
    }
}

impl SessionState {
    pub fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            prompt: String::new(),
            transcript: Vec::new(),
            final_draft: None,
            sources: Vec::new(),
            status: None,
            last_error: None,
        }
    }

    /// Fresh state for a new submission. Everything from the previous run is
    /// cleared; terminal states are never resumed.
    pub fn start(prompt: impl Into<String>) -> Self {
        Self {
            phase: Phase::Running,
            prompt: prompt.into(),
            ..Self::idle()
        }
    }

    /// Completed state assembled from a non-streaming `/api/debate` body.
    pub fn from_response(prompt: impl Into<String>, response: crate::events::DebateResponse) -> Self {
        Self {
            phase: Phase::Complete,
            prompt: prompt.into(),
            transcript: response.transcript,
            final_draft: response.final_draft,
            sources: response.sources,
            status: response.final_status,
            last_error: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Complete | Phase::Failed)
    }

    /// Folds one event into the state.
    ///
    /// Events arriving outside `Running` are ignored — late or duplicate
    /// terminal frames cause no state change and no directive.
    pub fn apply(self, event: DebateEvent) -> (Self, Option<Directive>) {
        if !self.is_running() {
            return (self, None);
        }
        let mut next = self;
        match event {
            DebateEvent::DebateStart
            | DebateEvent::IterationStart { .. }
            | DebateEvent::Unknown { .. } => (next, None),

            DebateEvent::ProposerResponse { message }
            | DebateEvent::ChallengerResponse { message } => {
                if let Some(message) = message {
                    next.transcript.push(message);
                }
                (next, None)
            }

            DebateEvent::DebateComplete { final_response } => {
                if let Some(final_response) = final_response {
                    next.final_draft = Some(final_response.final_draft);
                    next.sources = final_response.sources;
                    next.status = Some(final_response.final_status);
                }
                next.phase = Phase::Complete;
                (next, None)
            }

            DebateEvent::Error { error, message } => {
                // Keep the failure point visible in the transcript
                if let Some(message) = message {
                    next.transcript.push(message);
                }
                next.last_error = Some(error.clone());
                next.phase = Phase::Failed;
                (next, Some(Directive::Alert { message: error }))
            }
        }
    }

    /// Decodes and folds one frame. A payload that fails to decode leaves
    /// the state untouched and surfaces a non-fatal [`Directive::DecodeError`].
    pub fn apply_frame(self, frame: &Frame) -> (Self, Option<Directive>) {
        match DebateEvent::decode(&frame.payload) {
            Ok(event) => {
                tracing::debug!(event = ?event, "folding stream event");
                self.apply(event)
            }
            Err(err) => {
                tracing::warn!(error = %err, payload = %frame.payload, "dropping undecodable frame");
                (
                    self,
                    Some(Directive::DecodeError {
                        raw: frame.payload.clone(),
                    }),
                )
            }
        }
    }

    /// The transport reached natural end-of-stream. If no terminal event was
    /// seen the run is failed with a generic error; otherwise a no-op.
    pub fn stream_closed(self) -> Self {
        if !self.is_running() {
            return self;
        }
        Self {
            phase: Phase::Failed,
            last_error: Some(STREAM_ENDED_EARLY.to_string()),
            ..self
        }
    }

    /// The transport broke mid-flight or the run was aborted. Idempotent: a
    /// second teardown on an already-terminal state is a no-op.
    pub fn stream_failed(self, error: impl Into<String>) -> (Self, Option<Directive>) {
        if !self.is_running() {
            return (self, None);
        }
        let error = error.into();
        (
            Self {
                phase: Phase::Failed,
                last_error: Some(error.clone()),
                ..self
            },
            Some(Directive::Alert { message: error }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{FinalResponse, Role};

    fn message(role: Role, iteration: u32) -> DebateMessage {
        DebateMessage {
            role,
            content: format!("turn {}", iteration),
            model: "m".to_string(),
            iteration,
            status: None,
        }
    }

    fn complete_event() -> DebateEvent {
        DebateEvent::DebateComplete {
            final_response: Some(FinalResponse {
                final_draft: "D".to_string(),
                sources: vec!["s1".to_string()],
                final_status: "READY".to_string(),
            }),
        }
    }

    #[test]
    fn test_start_resets_everything() {
        let state = SessionState::start("topic");
        assert_eq!(state.phase, Phase::Running);
        assert_eq!(state.prompt, "topic");
        assert!(state.transcript.is_empty());
        assert!(state.final_draft.is_none());
        assert!(state.sources.is_empty());
        assert!(state.status.is_none());
        assert!(state.last_error.is_none());
        assert!(state.is_running());
    }

    #[test]
    fn test_informational_events_change_nothing() {
        let state = SessionState::start("t");
        let (state, d) = state.apply(DebateEvent::DebateStart);
        assert!(d.is_none());
        let before = state.clone();
        let (state, d) = state.apply(DebateEvent::IterationStart { iteration: Some(1) });
        assert!(d.is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn test_responses_append_in_arrival_order() {
        let state = SessionState::start("t");
        let (state, _) = state.apply(DebateEvent::ProposerResponse {
            message: Some(message(Role::Proposer, 1)),
        });
        let (state, _) = state.apply(DebateEvent::ChallengerResponse {
            message: Some(message(Role::Challenger, 1)),
        });
        assert_eq!(state.transcript.len(), 2);
        assert_eq!(state.transcript[0].role, Role::Proposer);
        assert_eq!(state.transcript[1].role, Role::Challenger);
        assert!(state.is_running());
    }

    #[test]
    fn test_response_without_message_is_noop() {
        let state = SessionState::start("t");
        let (state, d) = state.apply(DebateEvent::ProposerResponse { message: None });
        assert!(d.is_none());
        assert!(state.transcript.is_empty());
    }

    #[test]
    fn test_complete_sets_final_fields() {
        let state = SessionState::start("t");
        let (state, d) = state.apply(complete_event());
        assert!(d.is_none());
        assert_eq!(state.phase, Phase::Complete);
        assert!(!state.is_running());
        assert_eq!(state.final_draft.as_deref(), Some("D"));
        assert_eq!(state.sources, vec!["s1"]);
        assert_eq!(state.status.as_deref(), Some("READY"));
    }

    #[test]
    fn test_duplicate_complete_is_idempotent() {
        let state = SessionState::start("t");
        let (state, _) = state.apply(complete_event());
        let before = state.clone();
        let (state, d) = state.apply(complete_event());
        assert_eq!(state, before);
        assert!(d.is_none());
    }

    #[test]
    fn test_complete_without_final_response_still_terminates() {
        let state = SessionState::start("t");
        let (state, _) = state.apply(DebateEvent::DebateComplete {
            final_response: None,
        });
        assert_eq!(state.phase, Phase::Complete);
        assert!(state.final_draft.is_none());
    }

    #[test]
    fn test_error_event_fails_run_and_alerts() {
        let state = SessionState::start("t");
        let (state, directive) = state.apply(DebateEvent::Error {
            error: "timeout".to_string(),
            message: None,
        });
        assert_eq!(state.phase, Phase::Failed);
        assert!(!state.is_running());
        assert_eq!(state.last_error.as_deref(), Some("timeout"));
        assert!(state.transcript.is_empty());
        assert_eq!(
            directive,
            Some(Directive::Alert {
                message: "timeout".to_string()
            })
        );
    }

    #[test]
    fn test_error_event_preserves_failure_message_in_transcript() {
        let state = SessionState::start("t");
        let (state, _) = state.apply(DebateEvent::Error {
            error: "model refused".to_string(),
            message: Some(message(Role::Challenger, 3)),
        });
        assert_eq!(state.transcript.len(), 1);
        assert_eq!(state.transcript[0].iteration, 3);
    }

    #[test]
    fn test_events_after_failure_are_ignored() {
        let state = SessionState::start("t");
        let (state, _) = state.apply(DebateEvent::Error {
            error: "boom".to_string(),
            message: None,
        });
        let before = state.clone();
        let (state, d) = state.apply(DebateEvent::ProposerResponse {
            message: Some(message(Role::Proposer, 1)),
        });
        assert_eq!(state, before);
        assert!(d.is_none());
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        let state = SessionState::start("t");
        let before = state.clone();
        let (state, d) = state.apply(DebateEvent::Unknown {
            raw: serde_json::json!({"type": "SOMETHING_NEW"}),
        });
        assert_eq!(state, before);
        assert!(d.is_none());
    }

    #[test]
    fn test_apply_frame_decode_error_is_nonfatal() {
        let state = SessionState::start("t");
        let frame = Frame {
            payload: "{not json".to_string(),
        };
        let (state, directive) = state.apply_frame(&frame);
        assert!(state.is_running());
        assert!(state.transcript.is_empty());
        assert!(state.final_draft.is_none());
        assert!(state.status.is_none());
        assert_eq!(
            directive,
            Some(Directive::DecodeError {
                raw: "{not json".to_string()
            })
        );
    }

    #[test]
    fn test_stream_closed_before_terminal_sets_generic_error() {
        let state = SessionState::start("t");
        let (state, _) = state.apply(DebateEvent::ProposerResponse {
            message: Some(message(Role::Proposer, 1)),
        });
        let state = state.stream_closed();
        assert_eq!(state.phase, Phase::Failed);
        assert_eq!(state.last_error.as_deref(), Some(STREAM_ENDED_EARLY));
        assert_eq!(state.transcript.len(), 1);
    }

    #[test]
    fn test_stream_closed_after_complete_is_noop() {
        let state = SessionState::start("t");
        let (state, _) = state.apply(complete_event());
        let after = state.clone().stream_closed();
        assert_eq!(after, state);
    }

    #[test]
    fn test_stream_failed_raises_alert_once() {
        let state = SessionState::start("t");
        let (state, first) = state.stream_failed("connection reset");
        assert_eq!(state.phase, Phase::Failed);
        assert_eq!(state.last_error.as_deref(), Some("connection reset"));
        assert!(matches!(first, Some(Directive::Alert { .. })));
        // second teardown is a no-op
        let before = state.clone();
        let (state, second) = state.stream_failed("again");
        assert_eq!(state, before);
        assert!(second.is_none());
    }

    #[test]
    fn test_new_submission_after_terminal_starts_clean() {
        let state = SessionState::start("first");
        let (state, _) = state.apply(complete_event());
        assert!(state.is_terminal());
        let fresh = SessionState::start("second");
        assert_eq!(fresh.prompt, "second");
        assert!(fresh.transcript.is_empty());
        assert!(fresh.final_draft.is_none());
        assert!(fresh.is_running());
    }

    #[test]
    fn test_directive_wire_shape() {
        let alert = serde_json::to_value(Directive::Alert {
            message: "oops".to_string(),
        })
        .expect("serialize");
        assert_eq!(alert["kind"], "alert");
        assert_eq!(alert["message"], "oops");

        let decode = serde_json::to_value(Directive::DecodeError {
            raw: "garbage".to_string(),
        })
        .expect("serialize");
        assert_eq!(decode["kind"], "decodeError");
        assert_eq!(decode["raw"], "garbage");
    }

    #[test]
    fn test_from_response_builds_complete_state() {
        let response: crate::events::DebateResponse = serde_json::from_str(
            r#"{"transcript":[{"role":"PROPOSER","content":"x","model":"m","iteration":1}],
                "finalStatus":"MAX_ITERATIONS","finalDraft":"draft","sources":[]}"#,
        )
        .expect("deser");
        let state = SessionState::from_response("topic", response);
        assert_eq!(state.phase, Phase::Complete);
        assert_eq!(state.transcript.len(), 1);
        assert_eq!(state.final_draft.as_deref(), Some("draft"));
        assert_eq!(state.status.as_deref(), Some("MAX_ITERATIONS"));
    }
}
