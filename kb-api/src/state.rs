use kb_config::{AppConfig, ConfigSiteResolver};
use kb_messages::MESSAGES;
use kb_orchestrator::{NamespaceSaga, RetryPolicy};
use kb_provider::HttpKuboard;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub saga: Arc<NamespaceSaga>,
    pub task_queue: String,
    /// Cancelled on shutdown. Each run works on a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(saga: NamespaceSaga, task_queue: impl Into<String>) -> Self {
        Self {
            saga: Arc::new(saga),
            task_queue: task_queue.into(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Wire the saga to the real Kuboard client.
    pub fn from_config(config: &AppConfig) -> Self {
        if config.kuboard.is_none() {
            warn!("{}", MESSAGES.config.kuboard_section_missing);
        }

        let policy = RetryPolicy::from(&config.retry);
        let api = HttpKuboard::with_timeout(policy.call_timeout);
        let resolver = ConfigSiteResolver::new(config.kuboard.clone());
        let saga = NamespaceSaga::new(Arc::new(resolver), Arc::new(api), policy);

        Self::new(saga, config.worker.task_queue.clone())
    }
}
