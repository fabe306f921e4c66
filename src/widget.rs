//! Widget controller: the chat panel's state machine.
//!
//! DESIGN
//! ======
//! Three phases: `Closed`, `OpenIdle`, `OpenSending`. Every transition is a
//! synchronous method; the only suspension point is [`PendingSend::run`],
//! which the host drives and then feeds back through
//! [`WidgetController::complete`]. While a send is outstanding new
//! submissions are rejected rather than queued.
//!
//! Closing clears the transcript, replaces the session, and bumps an epoch.
//! A reply that lands after its conversation was closed carries the old epoch
//! and is dropped, together with the session it carried.
//!
//! Failures never reach the user verbatim: they are logged and the transcript
//! gets the configured apology instead.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::WidgetConfig;
use crate::error::ErrorCode;
use crate::llm::types::Backend;
use crate::session::{Relay, Session, SessionError, SessionManager};
use crate::transcript::{Message, Transcript};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Closed,
    OpenIdle,
    OpenSending,
}

/// Flags the rendering layer binds to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WidgetState {
    pub is_open: bool,
    pub is_loading: bool,
}

/// Why a submission was rejected. None of these change any state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("message is empty")]
    Empty,
    #[error("chat panel is closed")]
    Closed,
    #[error("a reply is still pending")]
    Busy,
    #[error("suggested prompts are only offered before the first message")]
    CatalogHidden,
    #[error("no suggested prompt at index {0}")]
    UnknownPrompt(usize),
}

impl ErrorCode for SubmitError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "E_EMPTY_INPUT",
            Self::Closed => "E_WIDGET_CLOSED",
            Self::Busy => "E_BUSY",
            Self::CatalogHidden => "E_CATALOG_HIDDEN",
            Self::UnknownPrompt(_) => "E_UNKNOWN_PROMPT",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Busy)
    }
}

/// An accepted submission waiting to be relayed.
///
/// Owns the session for the duration of the call.
pub struct PendingSend {
    epoch: u64,
    text: String,
    session: Option<Session>,
    relay: Relay,
}

impl PendingSend {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Perform the remote round trip. Creates a session first when none was
    /// available at submit time.
    pub async fn run(self) -> SendOutcome {
        let Self { epoch, text, session, relay } = self;
        let (session, result) = relay.send_or_create(session, &text).await;
        SendOutcome { epoch, session, result }
    }
}

/// Result of [`PendingSend::run`], to be handed to [`WidgetController::complete`].
#[must_use]
pub struct SendOutcome {
    epoch: u64,
    session: Option<Session>,
    result: Result<String, SessionError>,
}

impl SendOutcome {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Render snapshot of the whole widget.
#[derive(Debug, Serialize)]
pub struct WidgetView<'a> {
    pub title: &'a str,
    pub state: WidgetState,
    /// Notification dot on the icon while the panel is closed.
    pub show_badge: bool,
    pub messages: &'a [Message],
    pub greeting: Option<&'a str>,
    pub suggested_prompts: Option<&'a [String]>,
    pub input_enabled: bool,
}

// =============================================================================
// CONTROLLER
// =============================================================================

pub struct WidgetController {
    config: WidgetConfig,
    phase: Phase,
    transcript: Transcript,
    sessions: SessionManager,
    epoch: u64,
}

impl WidgetController {
    /// Mount the widget closed, with a session created up front so the first
    /// question does not pay for it. An init failure is logged and retried on
    /// the first submit.
    pub async fn mount(backend: Arc<dyn Backend>, config: WidgetConfig) -> Self {
        let mut sessions = SessionManager::new(backend, config.send_timeout);
        if let Err(e) = sessions.reset().await {
            warn!(error = %e, code = e.error_code(), "widget: session init failed at mount");
        }
        Self { config, phase: Phase::Closed, transcript: Transcript::new(), sessions, epoch: 0 }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn state(&self) -> WidgetState {
        WidgetState { is_open: self.phase != Phase::Closed, is_loading: self.phase == Phase::OpenSending }
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The idle session; `None` while a send holds it or after an init failure.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.sessions.current()
    }

    #[must_use]
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Icon clicked. Reopening keeps the transcript and session as they were.
    pub fn activate(&mut self) {
        if self.phase == Phase::Closed {
            self.phase = Phase::OpenIdle;
            info!(messages = self.transcript.len(), "widget: opened");
        }
    }

    /// Close button. Always ends with an empty transcript and a new session,
    /// whatever the prior phase.
    pub async fn deactivate(&mut self) {
        if self.phase == Phase::OpenSending {
            debug!(epoch = self.epoch, "widget: closing with a reply pending");
        }
        self.epoch += 1;
        self.phase = Phase::Closed;
        self.transcript.clear();
        if let Err(e) = self.sessions.reset().await {
            warn!(error = %e, code = e.error_code(), "widget: session init failed on close");
        }
        info!(epoch = self.epoch, "widget: closed");
    }

    /// Accept `text` as the next user turn.
    ///
    /// The user message is appended immediately; the caller must run the
    /// returned [`PendingSend`] and pass its outcome to [`Self::complete`].
    ///
    /// # Errors
    ///
    /// Rejects without any state change when the panel is closed, a reply is
    /// pending, or `text` is blank.
    pub fn submit(&mut self, text: &str) -> Result<PendingSend, SubmitError> {
        match self.phase {
            Phase::Closed => return Err(SubmitError::Closed),
            Phase::OpenSending => {
                debug!("widget: submit rejected, reply pending");
                return Err(SubmitError::Busy);
            }
            Phase::OpenIdle => {}
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(SubmitError::Empty);
        }

        self.transcript.append(Message::user(text));
        self.phase = Phase::OpenSending;
        let session = self.sessions.take();
        info!(epoch = self.epoch, text_len = text.len(), has_session = session.is_some(), "widget: submit");

        Ok(PendingSend { epoch: self.epoch, text: text.to_owned(), session, relay: self.sessions.relay() })
    }

    /// Submit the suggested prompt at `index`. Only offered while the
    /// transcript is empty.
    ///
    /// # Errors
    ///
    /// [`SubmitError::CatalogHidden`] once a conversation started,
    /// [`SubmitError::UnknownPrompt`] for a bad index, otherwise as [`Self::submit`].
    pub fn select_prompt(&mut self, index: usize) -> Result<PendingSend, SubmitError> {
        if !self.transcript.is_empty() {
            return Err(SubmitError::CatalogHidden);
        }
        let prompt = self
            .config
            .suggested_prompts
            .get(index)
            .cloned()
            .ok_or(SubmitError::UnknownPrompt(index))?;
        self.submit(&prompt)
    }

    /// Apply a finished send. Returns `false` when the outcome belongs to a
    /// conversation that has since been closed.
    pub fn complete(&mut self, outcome: SendOutcome) -> bool {
        let SendOutcome { epoch, session, result } = outcome;
        if epoch != self.epoch || self.phase != Phase::OpenSending {
            debug!(epoch, current = self.epoch, "widget: stale reply discarded");
            return false;
        }

        if let Some(session) = session {
            self.sessions.restore(session);
        }

        let message = match result {
            Ok(reply) => Message::assistant(reply),
            Err(e) => {
                warn!(error = %e, code = e.error_code(), retryable = e.retryable(), "widget: send failed");
                Message::assistant(self.config.apology.clone())
            }
        };
        self.transcript.append(message);
        self.phase = Phase::OpenIdle;
        true
    }

    /// Run `pending` to completion and apply it, for hosts that process one
    /// event at a time.
    pub async fn settle(&mut self, pending: PendingSend) -> bool {
        let outcome = pending.run().await;
        self.complete(outcome)
    }

    #[must_use]
    pub fn view(&self) -> WidgetView<'_> {
        let state = self.state();
        let empty = self.transcript.is_empty();
        WidgetView {
            title: &self.config.title,
            state,
            show_badge: !state.is_open,
            messages: self.transcript.messages(),
            greeting: empty.then_some(self.config.greeting.as_str()),
            suggested_prompts: empty.then_some(self.config.suggested_prompts.as_slice()),
            input_enabled: self.phase == Phase::OpenIdle,
        }
    }
}

#[cfg(test)]
#[path = "widget_test.rs"]
mod tests;
