use crate::workflow::Procedure;
use chrono::{DateTime, Utc};
use kb_provider::OperationOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Resolve,
    CreateNamespace,
    GrantPermission,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Resolve => "resolve",
            Self::CreateNamespace => "create_namespace",
            Self::GrantPermission => "grant_permission",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SagaState {
    Resolving,
    Creating,
    Granting,
    Done,
    Failed,
}

impl fmt::Display for SagaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Resolving => "resolving",
            Self::Creating => "creating",
            Self::Granting => "granting",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

/// One remote step as it finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: Step,
    pub attempts: u32,
    pub outcome: OperationOutcome,
}

/// Summary of a saga run that reached `Done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SagaReport {
    pub run_id: Uuid,
    pub procedure: Procedure,
    pub cluster_id: String,
    pub namespace: String,
    pub steps: Vec<StepRecord>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SagaReport {
    pub fn step(&self, step: Step) -> Option<&StepRecord> {
        self.steps.iter().find(|r| r.step == step)
    }

    pub fn total_attempts(&self) -> u32 {
        self.steps.iter().map(|r| r.attempts).sum()
    }
}
