//! Scripted backend shared by unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::llm::types::{Backend, GenerationConfig, LlmError, Turn};

/// Backend that answers from a script, or echoes `answer: <text>` once the
/// script runs dry.
#[derive(Default)]
pub struct MockBackend {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    start_failures: AtomicUsize,
    delay: Option<Duration>,
    start_delay: Option<Duration>,
    starts: AtomicUsize,
    calls: Mutex<Vec<(usize, String)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies consumed in order by `converse`.
    pub fn with_replies(self, replies: Vec<Result<String, LlmError>>) -> Self {
        *self.replies.lock().unwrap() = replies.into();
        self
    }

    /// Make the next `n` calls to `start` fail.
    pub fn failing_starts(self, n: usize) -> Self {
        self.start_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Sleep before every reply (use with a paused tokio clock).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep inside every `start` that does not fail outright.
    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = Some(delay);
        self
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    /// Number of `converse` calls issued so far.
    pub fn sends(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// `(history_len, text)` for every `converse` call, in order.
    pub fn calls(&self) -> Vec<(usize, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Backend for MockBackend {
    async fn start(&self, config: &GenerationConfig) -> Result<(), LlmError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .start_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(LlmError::ApiRequest("backend unreachable".into()));
        }
        if let Some(delay) = self.start_delay {
            tokio::time::sleep(delay).await;
        }
        config.validate()
    }

    async fn converse(&self, _config: &GenerationConfig, history: &[Turn], text: &str) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push((history.len(), text.to_owned()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.replies.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(format!("answer: {text}")))
    }
}
