//! Session lifecycle: ownership of the remote conversation handle.
//!
//! ARCHITECTURE
//! ============
//! `SessionManager` holds at most one [`Session`] in a single slot. A send
//! takes the session out of the slot, so no two requests can ever use it at
//! once, and the widget hands it back when the reply arrives. `reset` drops
//! the slot's content and starts over with an empty server-side context.
//!
//! `Relay` is the cheap, cloneable part (backend + fixed settings) that the
//! widget carries into an in-flight send without borrowing the manager.
//!
//! TRADE-OFFS
//! ==========
//! History lives client-side and is replayed on every request. A failed send
//! leaves the history untouched, so the server context never contains a
//! question that was not answered.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::llm::types::{Backend, GenerationConfig, LlmError, Turn};

/// Fixed generation settings; not user-configurable.
pub const GENERATION: GenerationConfig = GenerationConfig { max_output_tokens: 1000, temperature: 0.9, top_p: 0.9 };

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session init failed: {0}")]
    Init(#[source] LlmError),
    #[error("send failed: {0}")]
    Send(#[source] LlmError),
    #[error("backend did not answer within {secs}s")]
    Timeout { secs: u64 },
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Init(_) => "E_SESSION_INIT",
            Self::Send(_) => "E_SESSION_SEND",
            Self::Timeout { .. } => "E_SESSION_TIMEOUT",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Init(e) | Self::Send(e) => e.retryable(),
            Self::Timeout { .. } => true,
        }
    }
}

/// Opaque handle to one remote conversation.
///
/// Deliberately not `Clone`: exactly one owner at a time.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    history: Vec<Turn>,
}

impl Session {
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Turns the backend has acknowledged, oldest first.
    #[must_use]
    pub fn history(&self) -> &[Turn] {
        &self.history
    }
}

// =============================================================================
// RELAY
// =============================================================================

#[derive(Clone)]
pub struct Relay {
    backend: Arc<dyn Backend>,
    generation: GenerationConfig,
    send_timeout: Duration,
}

impl Relay {
    /// Start a new conversation with the fixed generation settings, bounded
    /// by the same timeout as a send.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Init`] if the backend refuses to start and
    /// [`SessionError::Timeout`] if it does not answer in time.
    pub async fn create(&self) -> Result<Session, SessionError> {
        match tokio::time::timeout(self.send_timeout, self.backend.start(&self.generation)).await {
            Ok(result) => result.map_err(SessionError::Init)?,
            Err(_) => return Err(SessionError::Timeout { secs: self.send_timeout.as_secs() }),
        }
        let session = Session { id: Uuid::new_v4(), history: Vec::new() };
        info!(session_id = %session.id, "session: created");
        Ok(session)
    }

    /// Forward `text` as the next turn of `session`. Single attempt, bounded
    /// by the send timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Send`] on backend failure and
    /// [`SessionError::Timeout`] when no reply arrives in time.
    pub async fn send(&self, session: &mut Session, text: &str) -> Result<String, SessionError> {
        debug!(session_id = %session.id, turns = session.history.len(), text_len = text.len(), "session: sending");
        let call = self
            .backend
            .converse(&self.generation, &session.history, text);
        let reply = match tokio::time::timeout(self.send_timeout, call).await {
            Ok(result) => result.map_err(SessionError::Send)?,
            Err(_) => return Err(SessionError::Timeout { secs: self.send_timeout.as_secs() }),
        };

        session.history.push(Turn::user(text));
        session.history.push(Turn::model(reply.clone()));
        debug!(session_id = %session.id, reply_len = reply.len(), "session: reply received");
        Ok(reply)
    }

    /// Send on `session`, creating one first when there is none. Hands the
    /// session back alongside the result; it is `None` only if creation failed.
    pub async fn send_or_create(
        &self,
        session: Option<Session>,
        text: &str,
    ) -> (Option<Session>, Result<String, SessionError>) {
        let mut session = match session {
            Some(session) => session,
            None => match self.create().await {
                Ok(session) => session,
                Err(e) => return (None, Err(e)),
            },
        };
        let result = self.send(&mut session, text).await;
        (Some(session), result)
    }
}

// =============================================================================
// MANAGER
// =============================================================================

pub struct SessionManager {
    relay: Relay,
    slot: Option<Session>,
}

impl SessionManager {
    /// Manager with an empty slot. Call [`SessionManager::reset`] to fill it.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>, send_timeout: Duration) -> Self {
        Self { relay: Relay { backend, generation: GENERATION, send_timeout }, slot: None }
    }

    /// Create a session without touching the slot.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Init`] if the backend refuses to start.
    pub async fn create(&self) -> Result<Session, SessionError> {
        self.relay.create().await
    }

    /// Send on the current session, creating one first if the slot is empty.
    ///
    /// # Errors
    ///
    /// Propagates [`Relay::create`] and [`Relay::send`] failures. A session
    /// that was created or used stays in the slot either way.
    pub async fn send(&mut self, text: &str) -> Result<String, SessionError> {
        let (session, result) = self.relay.send_or_create(self.slot.take(), text).await;
        self.slot = session;
        result
    }

    /// Discard the current session and create a fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Init`] or [`SessionError::Timeout`]; the slot
    /// is left empty in that case.
    pub async fn reset(&mut self) -> Result<(), SessionError> {
        if let Some(old) = self.slot.take() {
            debug!(session_id = %old.id, turns = old.history.len(), "session: discarded");
        }
        self.slot = Some(self.relay.create().await?);
        Ok(())
    }

    #[must_use]
    pub fn current(&self) -> Option<&Session> {
        self.slot.as_ref()
    }

    /// Move the session out for an in-flight send.
    pub fn take(&mut self) -> Option<Session> {
        self.slot.take()
    }

    /// Return a session after its send completed.
    pub fn restore(&mut self, session: Session) {
        self.slot = Some(session);
    }

    #[must_use]
    pub fn relay(&self) -> Relay {
        self.relay.clone()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
