//! Central registry for all user-facing message templates.
//!
//! Organized by domain:
//! - `saga` - namespace creation / authorization outcomes shown to operators
//! - `config` - configuration loading and validation
//! - `worker` - worker service lifecycle
//!
//! ```rust
//! use kb_messages::{msg, MESSAGES};
//!
//! let text = msg!(MESSAGES.saga.manual_authorization_required, cluster_id = "c1");
//! assert!(text.contains("c1"));
//! ```

mod config;
mod saga;
mod worker;

pub use config::{ConfigMessages, CONFIG_MESSAGES};
pub use saga::{SagaMessages, SAGA_MESSAGES};
pub use worker::{WorkerMessages, WORKER_MESSAGES};

/// Unified messages struct containing all domain-specific message modules
pub struct Messages {
    pub saga: SagaMessages,
    pub config: ConfigMessages,
    pub worker: WorkerMessages,
}

/// Global messages constant - main entry point for all message templates
pub const MESSAGES: Messages = Messages {
    saga: SAGA_MESSAGES,
    config: CONFIG_MESSAGES,
    worker: WORKER_MESSAGES,
};
