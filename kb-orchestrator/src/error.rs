use crate::report::Step;
use kb_provider::OperationOutcome;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SagaError>;

/// Terminal failure of a saga run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SagaError {
    /// No site mapping for the cluster. `message` is the operator-facing text.
    #[error("{message}")]
    Configuration { cluster_id: String, message: String },

    /// Namespace already exists on create, or is missing on grant.
    #[error("Precondition violated at {step}: {outcome}")]
    PreconditionViolation { step: Step, outcome: OperationOutcome },

    #[error("Authorization rejected at {step}: {outcome}")]
    Authorization { step: Step, outcome: OperationOutcome },

    #[error("Gave up on {step} after {attempts} attempt(s): {outcome}")]
    Transient {
        step: Step,
        attempts: u32,
        outcome: OperationOutcome,
    },

    #[error("Cancelled at {step}")]
    Cancelled { step: Step },
}

impl SagaError {
    /// Stable, machine-readable name of the variant.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration_error",
            Self::PreconditionViolation { .. } => "precondition_violation",
            Self::Authorization { .. } => "authorization_failure",
            Self::Transient { .. } => "transient_failure",
            Self::Cancelled { .. } => "cancelled",
        }
    }

    pub fn step(&self) -> Step {
        match self {
            Self::Configuration { .. } => Step::Resolve,
            Self::PreconditionViolation { step, .. }
            | Self::Authorization { step, .. }
            | Self::Transient { step, .. }
            | Self::Cancelled { step } => *step,
        }
    }

    /// Last classified outcome, when a remote call was made.
    pub fn outcome(&self) -> Option<&OperationOutcome> {
        match self {
            Self::PreconditionViolation { outcome, .. }
            | Self::Authorization { outcome, .. }
            | Self::Transient { outcome, .. } => Some(outcome),
            Self::Configuration { .. } | Self::Cancelled { .. } => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown procedure '{0}'")]
pub struct UnknownProcedure(pub String);
