//! Test fixtures shared by the resource and data source modules.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use openai_provider_client::OpenAiClient;
use openai_provider_client::mock::MockTransport;
use openai_provider_core::{CancelFlag, RetrySettings, Sleeper};

use crate::context::ResourceContext;

#[derive(Default)]
pub(crate) struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
    cancel_on_sleep: Mutex<Option<CancelFlag>>,
}

impl RecordingSleeper {
    pub(crate) fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }

    /// Trips `flag` during the next sleep, as a shutdown would mid-wait.
    pub(crate) fn cancel_on_sleep(&self, flag: CancelFlag) {
        *self.cancel_on_sleep.lock().unwrap() = Some(flag);
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
        if let Some(flag) = self.cancel_on_sleep.lock().unwrap().take() {
            flag.cancel();
        }
    }
}

pub(crate) struct Harness {
    pub transport: Arc<MockTransport>,
    pub sleeper: Arc<RecordingSleeper>,
    pub ctx: ResourceContext,
}

/// Context over a scripted transport with 1 ms backoff units and 5 attempts.
pub(crate) fn harness() -> Harness {
    let transport = Arc::new(MockTransport::new());
    let sleeper = Arc::new(RecordingSleeper::default());
    let ctx = ResourceContext::new(
        OpenAiClient::with_transport(transport.clone()),
        RetrySettings::new(5, 1),
    )
    .with_sleeper(sleeper.clone());
    Harness {
        transport,
        sleeper,
        ctx,
    }
}
