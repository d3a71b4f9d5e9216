//! kb-messages
//!
//! Centralized messaging for the Kuboard saga.
//! Provides the operator-facing templates and a small builder that fills in
//! `{variable}` placeholders.

pub mod builder;
pub mod macros;
pub mod messages;

pub use builder::MessageBuilder;
pub use messages::MESSAGES;
