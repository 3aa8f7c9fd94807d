//! In-process backend for tests and `--dry-run`.
//!
//! Behaviours:
//! - `MockBackend::echo()`: returns the input unchanged
//! - `MockBackend::tagging()`: prefixes every non-blank line with `[target] `
//! - `MockBackend::uppercase()`: upper-cases the input
//! - `MockBackend::fixed(s)`: always returns `s`
//! - `MockBackend::failing(e)`: always fails with `e`
//! - `MockBackend::fail_after(n, e)`: succeeds `n` times (echo), then fails
//! - `MockBackend::empty()`: always fails with `EmptyResponse`
//!
//! Every call is counted and recorded, so tests can assert on exactly what
//! reached the backend.

use super::{BackendRequest, TranslationBackend};
use crate::error::BackendError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// What the mock does with each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    Echo,
    Tagging,
    Uppercase,
    Fixed(String),
    Failing(BackendError),
    FailAfter { ok_calls: usize, error: BackendError },
    Empty,
}

/// A request as seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}

#[derive(Debug)]
pub struct MockBackend {
    behavior: MockBehavior,
    request_count: AtomicUsize,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockBackend {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn tagging() -> Self {
        Self::new(MockBehavior::Tagging)
    }

    pub fn uppercase() -> Self {
        Self::new(MockBehavior::Uppercase)
    }

    pub fn fixed(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::Fixed(text.into()))
    }

    pub fn failing(error: BackendError) -> Self {
        Self::new(MockBehavior::Failing(error))
    }

    pub fn fail_after(ok_calls: usize, error: BackendError) -> Self {
        Self::new(MockBehavior::FailAfter { ok_calls, error })
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Number of `translate` calls so far, including failed ones.
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of every request received, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        match self.requests.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(&self, request: BackendRequest<'_>) -> Result<String, BackendError> {
        let call = self.request_count.fetch_add(1, Ordering::SeqCst);
        let recorded = RecordedRequest {
            text: request.text.to_string(),
            source_language: request.source_language.to_string(),
            target_language: request.target_language.to_string(),
        };
        match self.requests.lock() {
            Ok(mut guard) => guard.push(recorded),
            Err(poisoned) => poisoned.into_inner().push(recorded),
        }

        match &self.behavior {
            MockBehavior::Echo => Ok(request.text.to_string()),
            MockBehavior::Tagging => Ok(tag_lines(request.text, request.target_language)),
            MockBehavior::Uppercase => Ok(request.text.to_uppercase()),
            MockBehavior::Fixed(text) => Ok(text.clone()),
            MockBehavior::Failing(error) => Err(error.clone()),
            MockBehavior::FailAfter { ok_calls, error } => {
                if call < *ok_calls {
                    Ok(request.text.to_string())
                } else {
                    Err(error.clone())
                }
            }
            MockBehavior::Empty => Err(BackendError::EmptyResponse),
        }
    }
}

fn tag_lines(text: &str, target: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("[{target}] {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
