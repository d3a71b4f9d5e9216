//! Namespace provisioning saga
//!
//! Sequences namespace creation and the two-stage permission grant against a
//! Kuboard panel, classifying every failure as terminal or transient and
//! retrying only the latter. It is consumed by the kb-api worker but can be
//! driven directly from any async entry point.

pub mod error;
pub mod report;
pub mod retry;
pub mod saga;
pub mod workflow;

pub use error::{Result, SagaError, UnknownProcedure};
pub use report::{SagaReport, SagaState, Step, StepRecord};
pub use retry::{Attempted, Cancelled, RetryPolicy};
pub use saga::NamespaceSaga;
pub use workflow::{Procedure, WorkflowParams, TASK_QUEUE};
