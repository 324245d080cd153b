pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod framer;
pub mod session;

use colored::*;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;

use client::DebateClient;
use error::DebateError;
use events::{DebateMessage, DebateRequest, Role};
use framer::{Frame, StreamFramer};
use session::{Directive, SessionState};

// ---------------------------------------------------------------------------
// Session updates (for host UIs observing a run)
// ---------------------------------------------------------------------------

/// One observable transition from a debate run: the state snapshot after a
/// fold, or a discrete side-effect directive.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    State(SessionState),
    Directive(Directive),
}

// ---------------------------------------------------------------------------
// DebateSession — the streaming consumer
// ---------------------------------------------------------------------------

/// Drives one debate run at a time: opens the stream, reassembles frames,
/// folds each event into [`SessionState`] strictly in arrival order.
pub struct DebateSession {
    client: DebateClient,
    pub state: SessionState,
    /// When set, state snapshots and directives are sent here instead of
    /// rendered to the terminal.
    pub update_tx: Option<mpsc::UnboundedSender<SessionUpdate>>,
}

impl DebateSession {
    pub fn new(client: DebateClient) -> Self {
        Self {
            client,
            state: SessionState::idle(),
            update_tx: None,
        }
    }

    /// Runs one debate to its terminal outcome.
    ///
    /// The previous run's state is replaced wholesale before any of the new
    /// run's events are visible; a run that ends without a terminal event is
    /// failed with a generic error. The transport error (if any) is returned
    /// after the state machine has been driven to `Failed`, so a fresh
    /// submission can always start cleanly afterward.
    pub async fn run(
        &mut self,
        prompt: &str,
        max_iterations: u32,
    ) -> Result<SessionState, DebateError> {
        let request = DebateRequest::new(prompt, max_iterations);
        self.state = SessionState::start(prompt);
        self.emit(SessionUpdate::State(self.state.clone()));
        tracing::info!(
            prompt,
            max_iterations = request.max_iterations,
            "starting debate run"
        );

        if self.update_tx.is_none() {
            self.print_header(prompt);
        }

        let response = match self.client.start_debate(&request).await {
            Ok(response) => response,
            Err(err) => {
                self.fail(err.to_string());
                return Err(err);
            }
        };

        let mut framer = StreamFramer::new();
        let mut stream = response.bytes_stream();

        'read: while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    for frame in framer.feed(&bytes) {
                        self.fold_frame(frame);
                        if self.state.is_terminal() {
                            // Teardown: dropping the stream aborts the transport
                            break 'read;
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "transport failed mid-stream");
                    self.fail(err.to_string());
                    return Err(err.into());
                }
            }
        }

        if !self.state.is_terminal() {
            for frame in framer.finish() {
                self.fold_frame(frame);
            }
        }
        if !self.state.is_terminal() {
            self.state = std::mem::take(&mut self.state).stream_closed();
            self.emit(SessionUpdate::State(self.state.clone()));
        }
        tracing::info!(phase = ?self.state.phase, turns = self.state.transcript.len(), "debate run finished");

        if self.update_tx.is_none() {
            self.print_final();
        }
        Ok(self.state.clone())
    }

    // -----------------------------------------------------------------------
    // Fold plumbing
    // -----------------------------------------------------------------------

    fn fold_frame(&mut self, frame: Frame) {
        let turns_before = self.state.transcript.len();
        let (next, directive) = std::mem::take(&mut self.state).apply_frame(&frame);
        self.state = next;

        self.emit(SessionUpdate::State(self.state.clone()));
        if self.update_tx.is_none() && self.state.transcript.len() > turns_before {
            if let Some(message) = self.state.transcript.last() {
                print_message(message);
            }
        }
        if let Some(directive) = directive {
            self.surface(directive);
        }
    }

    /// Idempotent transport-failure teardown.
    fn fail(&mut self, error: String) {
        let (next, directive) = std::mem::take(&mut self.state).stream_failed(error);
        self.state = next;
        self.emit(SessionUpdate::State(self.state.clone()));
        if let Some(directive) = directive {
            self.surface(directive);
        }
    }

    fn surface(&mut self, directive: Directive) {
        if self.update_tx.is_some() {
            self.emit(SessionUpdate::Directive(directive));
            return;
        }
        match directive {
            Directive::Alert { message } => {
                eprintln!("{} {}", "error:".bright_red().bold(), message);
            }
            // Already logged at warn by the fold; nothing to render
            Directive::DecodeError { .. } => {}
        }
    }

    fn emit(&self, update: SessionUpdate) {
        if let Some(tx) = &self.update_tx {
            let _ = tx.send(update);
        }
    }

    // -----------------------------------------------------------------------
    // Terminal rendering
    // -----------------------------------------------------------------------

    fn print_header(&self, prompt: &str) {
        println!("{}", "DUODEBATE".bright_cyan().bold());
        println!("{}: {}", "Backend".bright_yellow(), self.client.base_url());
        println!("{}: {}", "Topic".bright_yellow(), prompt);
        println!("{}", "=".repeat(50).bright_blue());
        println!();
    }

    fn print_final(&self) {
        println!("{}", "=".repeat(50).bright_blue());
        if let Some(draft) = &self.state.final_draft {
            let status = self.state.status.as_deref().unwrap_or("UNKNOWN");
            println!("{} [{}]", "Final Draft".bright_green().bold(), status);
            println!("\n{}", draft);
            if !self.state.sources.is_empty() {
                println!("\n{}", "Sources".bright_green().bold());
                for (i, source) in self.state.sources.iter().enumerate() {
                    println!("  {}. {}", i + 1, source);
                }
            }
        } else if let Some(error) = &self.state.last_error {
            println!("{} {}", "Debate failed:".bright_red().bold(), error);
        }
        println!(
            "\nComplete! {} turns over the run.",
            self.state.transcript.len()
        );
    }
}

/// Renders one transcript turn as a role-tinted bubble.
pub fn print_message(message: &DebateMessage) {
    let header = format!(
        "{} [iteration {}] ({})",
        message.role, message.iteration, message.model
    );
    let header = match message.role {
        Role::Proposer => header.bright_cyan().bold(),
        Role::Challenger => header.bright_magenta().bold(),
    };
    println!("{}", header);
    println!("{}\n", message.content);
}
