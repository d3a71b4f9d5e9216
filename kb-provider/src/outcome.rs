//! Classified result of a single Kuboard call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tagged result of any remote call. Exactly one tag is active; failure tags
/// carry the classified detail (HTTP status and body, or transport error).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum OperationOutcome {
    Success,
    AlreadyDone,
    NotFound(String),
    AuthFailure(String),
    NetworkFailure(String),
    UnexpectedFailure(String),
}

/// Payload-free tag of an [`OperationOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    AlreadyDone,
    NotFound,
    AuthFailure,
    NetworkFailure,
    UnexpectedFailure,
}

impl OperationOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success => OutcomeKind::Success,
            Self::AlreadyDone => OutcomeKind::AlreadyDone,
            Self::NotFound(_) => OutcomeKind::NotFound,
            Self::AuthFailure(_) => OutcomeKind::AuthFailure,
            Self::NetworkFailure(_) => OutcomeKind::NetworkFailure,
            Self::UnexpectedFailure(_) => OutcomeKind::UnexpectedFailure,
        }
    }

    /// Only transport failures and unclassified HTTP errors are worth retrying.
    pub fn is_retry_eligible(&self) -> bool {
        self.kind().is_retry_eligible()
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Success | Self::AlreadyDone => None,
            Self::NotFound(d)
            | Self::AuthFailure(d)
            | Self::NetworkFailure(d)
            | Self::UnexpectedFailure(d) => Some(d),
        }
    }
}

impl OutcomeKind {
    pub fn is_retry_eligible(self) -> bool {
        matches!(self, Self::NetworkFailure | Self::UnexpectedFailure)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::AlreadyDone => "already_done",
            Self::NotFound => "not_found",
            Self::AuthFailure => "auth_failure",
            Self::NetworkFailure => "network_failure",
            Self::UnexpectedFailure => "unexpected_failure",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            Some(detail) => write!(f, "{}: {}", self.kind(), detail),
            None => write!(f, "{}", self.kind()),
        }
    }
}
