//! Shared building blocks for the OpenAI provider crates: the
//! retry-until-visible reader and process-wide tracing setup.

pub mod observability;
pub mod retry;

pub use observability::init_observability;
pub use retry::{
    CancelFlag, NotFoundClassifier, ReadState, RetryError, RetrySettings, RetryingReader,
    Sleeper, ThreadSleeper, TransientClassifier, backoff_before, is_not_yet_visible,
};
