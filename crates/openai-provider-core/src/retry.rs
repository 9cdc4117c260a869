//! Retry-until-visible helper for eventually consistent reads.
//!
//! OpenAI objects are not always readable right after the call that created
//! them returns. [`RetryingReader`] wraps a single "try once" read, retries it
//! with exponential backoff while the failure looks like "not visible yet",
//! and fails fast on anything else.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Serializable retry settings carried by provider and resource configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Length of one backoff unit in milliseconds.
    #[serde(default = "default_unit_ms")]
    pub unit_ms: u64,
}

const fn default_max_attempts() -> u32 {
    5
}

const fn default_unit_ms() -> u64 {
    1_000
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            unit_ms: default_unit_ms(),
        }
    }
}

impl RetrySettings {
    pub const fn new(max_attempts: u32, unit_ms: u64) -> Self {
        Self {
            max_attempts,
            unit_ms,
        }
    }

    pub fn unit(&self) -> Duration {
        Duration::from_millis(self.unit_ms)
    }

    /// Builds a reader with the default not-found classifier.
    pub fn reader<E>(&self) -> RetryingReader<E>
    where
        E: fmt::Display + 'static,
    {
        RetryingReader::new(self.max_attempts).unit(self.unit())
    }
}

/// Backoff to wait before the 1-indexed `attempt`.
///
/// Zero before the first attempt, then `unit * 2^(attempt - 2)`: 1, 2, 4, 8, ...
pub fn backoff_before(attempt: u32, unit: Duration) -> Duration {
    if attempt < 2 {
        return Duration::ZERO;
    }
    let exp = (attempt - 2).min(31);
    unit.saturating_mul(1u32 << exp)
}

/// Milliseconds for logging, saturating at `u64::MAX`.
fn whole_millis(wait: Duration) -> u64 {
    u64::try_from(wait.as_millis()).unwrap_or(u64::MAX)
}

/// Returns true when an error message means "the object is not visible yet".
///
/// Matches "not found", "no file found" (case-insensitive) or a standalone
/// `404` status code anywhere in the message.
pub fn is_not_yet_visible(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("not found") || lower.contains("no file found") || has_404_status(&lower)
}

fn has_404_status(message: &str) -> bool {
    let bytes = message.as_bytes();
    message.match_indices("404").any(|(idx, _)| {
        let before = idx.checked_sub(1).map(|i| bytes[i]);
        let after = bytes.get(idx + 3).copied();
        !before.is_some_and(|b| b.is_ascii_digit()) && !after.is_some_and(|b| b.is_ascii_digit())
    })
}

/// Decides whether a failed read is worth retrying.
pub trait TransientClassifier<E>: Send + Sync {
    fn is_transient(&self, error: &E) -> bool;
}

impl<E, F> TransientClassifier<E> for F
where
    F: Fn(&E) -> bool + Send + Sync,
{
    fn is_transient(&self, error: &E) -> bool {
        self(error)
    }
}

/// Default classifier: applies [`is_not_yet_visible`] to the error's display text.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotFoundClassifier;

impl<E: fmt::Display> TransientClassifier<E> for NotFoundClassifier {
    fn is_transient(&self, error: &E) -> bool {
        is_not_yet_visible(&error.to_string())
    }
}

/// Blocks the calling thread between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Wall-clock sleeper backed by [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Shared flag used to stop a retry sequence between attempts.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Where a read sequence currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    Attempting,
    Succeeded,
    Exhausted,
    Failed,
}

/// Transition taken after a failed attempt.
pub fn after_failure(transient: bool, attempt: u32, max_attempts: u32) -> ReadState {
    if !transient {
        ReadState::Failed
    } else if attempt >= max_attempts {
        ReadState::Exhausted
    } else {
        ReadState::Attempting
    }
}

/// Failure returned by [`RetryingReader::read`].
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// Reader was misconfigured; no attempt was made.
    #[error("invalid retry configuration: {0}")]
    InvalidConfiguration(String),
    /// Non-transient failure, surfaced on the attempt that produced it.
    #[error("{error}")]
    Failed { attempts: u32, error: E },
    /// Every permitted attempt failed transiently; carries the last failure.
    #[error("{last} (gave up after {attempts} attempts)")]
    Exhausted { attempts: u32, last: E },
    /// Cancel flag or deadline stopped the sequence before the next attempt.
    #[error("retry cancelled after {attempts} attempts")]
    Cancelled { attempts: u32, last: Option<E> },
}

impl<E> RetryError<E> {
    /// Number of read attempts made before this error was produced.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::InvalidConfiguration(_) => 0,
            Self::Failed { attempts, .. }
            | Self::Exhausted { attempts, .. }
            | Self::Cancelled { attempts, .. } => *attempts,
        }
    }

    pub fn last_error(&self) -> Option<&E> {
        match self {
            Self::InvalidConfiguration(_) => None,
            Self::Failed { error, .. } | Self::Exhausted { last: error, .. } => Some(error),
            Self::Cancelled { last, .. } => last.as_ref(),
        }
    }

    pub fn into_last_error(self) -> Option<E> {
        match self {
            Self::InvalidConfiguration(_) => None,
            Self::Failed { error, .. } | Self::Exhausted { last: error, .. } => Some(error),
            Self::Cancelled { last, .. } => last,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

/// Retries a read while its failures are classified as transient.
///
/// Each call to [`read`](RetryingReader::read) owns its own attempt counter
/// and last error, so one reader can be shared by concurrent callers.
pub struct RetryingReader<E> {
    max_attempts: u32,
    unit: Duration,
    label: String,
    classifier: Arc<dyn TransientClassifier<E>>,
    sleeper: Arc<dyn Sleeper>,
    deadline: Option<Instant>,
    cancel: Option<CancelFlag>,
}

impl<E> fmt::Debug for RetryingReader<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryingReader")
            .field("max_attempts", &self.max_attempts)
            .field("unit", &self.unit)
            .field("label", &self.label)
            .field("deadline", &self.deadline)
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

impl<E> RetryingReader<E>
where
    E: fmt::Display + 'static,
{
    /// Reader with a one-second unit, the not-found classifier and a blocking sleeper.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            unit: Duration::from_secs(1),
            label: "read".to_string(),
            classifier: Arc::new(NotFoundClassifier),
            sleeper: Arc::new(ThreadSleeper),
            deadline: None,
            cancel: None,
        }
    }
}

impl<E> RetryingReader<E> {
    pub fn unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    /// Name used in log events (for example `vector_store_file`).
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn classifier(mut self, classifier: impl TransientClassifier<E> + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Gives up instead of sleeping past `deadline`.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn interrupted(&self, wait: Duration) -> bool {
        if self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
            return true;
        }
        self.deadline
            .is_some_and(|deadline| Instant::now() + wait > deadline)
    }
}

impl<E> RetryingReader<E>
where
    E: fmt::Display,
{
    /// Runs `op` until it succeeds, fails non-transiently, or the attempt budget runs out.
    pub fn read<T, F>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Result<T, E>,
    {
        if self.max_attempts < 1 {
            return Err(RetryError::InvalidConfiguration(format!(
                "max_attempts must be at least 1 (got {})",
                self.max_attempts
            )));
        }

        let mut last: Option<E> = None;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let wait = backoff_before(attempt, self.unit);
            if !wait.is_zero() {
                if self.interrupted(wait) {
                    info!(
                        event = "retry.cancelled",
                        label = %self.label,
                        attempts = attempt - 1
                    );
                    return Err(RetryError::Cancelled {
                        attempts: attempt - 1,
                        last,
                    });
                }
                info!(
                    event = "retry.scheduled",
                    label = %self.label,
                    next_attempt = attempt,
                    backoff_ms = whole_millis(wait)
                );
                self.sleeper.sleep(wait);
            }

            debug!(
                event = "retry.attempt",
                label = %self.label,
                attempt = attempt,
                max_attempts = self.max_attempts
            );
            let err = match op() {
                Ok(value) => {
                    debug!(event = "retry.succeeded", label = %self.label, attempt = attempt);
                    return Ok(value);
                }
                Err(err) => err,
            };

            let transient = self.classifier.is_transient(&err);
            debug!(
                event = "retry.attempt_failed",
                label = %self.label,
                attempt = attempt,
                transient = transient,
                error = %err
            );
            match after_failure(transient, attempt, self.max_attempts) {
                ReadState::Failed => {
                    return Err(RetryError::Failed {
                        attempts: attempt,
                        error: err,
                    });
                }
                ReadState::Exhausted => {
                    info!(
                        event = "retry.exhausted",
                        label = %self.label,
                        attempts = attempt,
                        error = %err
                    );
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: err,
                    });
                }
                ReadState::Attempting | ReadState::Succeeded => last = Some(err),
            }
        }
    }
}
