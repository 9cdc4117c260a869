use std::sync::Arc;

use openai_provider_client::{ClientError, OpenAiClient, ProviderConfig};
use openai_provider_core::{CancelFlag, RetrySettings, RetryingReader, Sleeper, ThreadSleeper};

/// Everything an operation needs from the configured provider.
///
/// Built once when the provider is configured and shared read-only by every
/// resource and data source.
#[derive(Clone)]
pub struct ResourceContext {
    client: OpenAiClient,
    retry: RetrySettings,
    sleeper: Arc<dyn Sleeper>,
    cancel: CancelFlag,
}

impl ResourceContext {
    pub fn new(client: OpenAiClient, retry: RetrySettings) -> Self {
        Self {
            client,
            retry,
            sleeper: Arc::new(ThreadSleeper),
            cancel: CancelFlag::new(),
        }
    }

    pub fn from_config(config: ProviderConfig) -> Result<Self, ClientError> {
        let retry = config.retry;
        Ok(Self::new(OpenAiClient::new(config)?, retry))
    }

    /// Replaces the sleeper used between retry attempts.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Flag that stops in-flight retry loops between attempts when cancelled.
    ///
    /// Nothing in the provider trips it. Embedders cancel it from their own
    /// shutdown path; the CLI leaves Ctrl-C to terminate the process.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn client(&self) -> &OpenAiClient {
        &self.client
    }

    pub fn retry_settings(&self) -> RetrySettings {
        self.retry
    }

    /// Reader with the provider-wide retry budget.
    pub fn reader(&self, label: &str) -> RetryingReader<ClientError> {
        self.reader_with(self.retry, label)
    }

    /// Reader with a per-resource retry budget.
    pub fn reader_with(&self, settings: RetrySettings, label: &str) -> RetryingReader<ClientError> {
        settings
            .reader()
            .label(label)
            .sleeper(self.sleeper.clone())
            .cancel_flag(self.cancel.clone())
    }
}
