//! Namespace provisioning saga.
//!
//! Two procedures share the same steps:
//!
//! - authorize-only: Resolving -> Granting -> Done/Failed
//! - create-and-authorize: Resolving -> Creating -> Granting -> Done/Failed
//!
//! Retry-eligible outcomes go through the [`RetryPolicy`]. Everything else
//! terminates the run on the first attempt, so an existing namespace on create
//! or a missing one on grant is always surfaced.

use crate::error::{Result, SagaError};
use crate::report::{SagaReport, SagaState, Step, StepRecord};
use crate::retry::{Attempted, RetryPolicy};
use crate::workflow::{Procedure, WorkflowParams};
use chrono::Utc;
use kb_config::{ClusterSite, SiteResolver};
use kb_messages::{msg, MESSAGES};
use kb_provider::{GrantRequest, KuboardApi, NamespaceRequest, OperationOutcome};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

pub struct NamespaceSaga {
    resolver: Arc<dyn SiteResolver>,
    api: Arc<dyn KuboardApi>,
    policy: RetryPolicy,
}

impl NamespaceSaga {
    pub fn new(
        resolver: Arc<dyn SiteResolver>,
        api: Arc<dyn KuboardApi>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            resolver,
            api,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Dispatch a scheduler procedure.
    pub async fn run(
        &self,
        procedure: Procedure,
        params: &WorkflowParams,
        token: &CancellationToken,
    ) -> Result<SagaReport> {
        let request = params.grant_request();
        match procedure {
            Procedure::NamespaceAuthorize => self.authorize_only(&request, token).await,
            Procedure::NamespaceCreate => self.create_and_authorize(&request, token).await,
        }
    }

    /// Grant `request.role` on a namespace that must already exist.
    pub async fn authorize_only(
        &self,
        request: &GrantRequest,
        token: &CancellationToken,
    ) -> Result<SagaReport> {
        let mut run = SagaRun::start(Procedure::NamespaceAuthorize, request);
        let span = run.span();
        async move {
            let result = self.authorize_steps(&mut run, request, token).await;
            run.settle(result)
        }
        .instrument(span)
        .await
    }

    /// Create the namespace, then grant `request.role` on it.
    pub async fn create_and_authorize(
        &self,
        request: &GrantRequest,
        token: &CancellationToken,
    ) -> Result<SagaReport> {
        let mut run = SagaRun::start(Procedure::NamespaceCreate, request);
        let span = run.span();
        async move {
            let result = self.create_steps(&mut run, request, token).await;
            run.settle(result)
        }
        .instrument(span)
        .await
    }

    async fn authorize_steps(
        &self,
        run: &mut SagaRun,
        request: &GrantRequest,
        token: &CancellationToken,
    ) -> Result<()> {
        let site = self.resolve(request, token, manual_authorization)?;
        self.grant(run, &site, request, token).await
    }

    async fn create_steps(
        &self,
        run: &mut SagaRun,
        request: &GrantRequest,
        token: &CancellationToken,
    ) -> Result<()> {
        let site = self.resolve(request, token, manual_namespace_creation)?;
        self.create(run, &site, request, token).await?;
        self.grant(run, &site, request, token).await
    }

    fn resolve(
        &self,
        request: &GrantRequest,
        token: &CancellationToken,
        operator_message: fn(&GrantRequest) -> String,
    ) -> Result<ClusterSite> {
        if token.is_cancelled() {
            return Err(SagaError::Cancelled {
                step: Step::Resolve,
            });
        }
        match self.resolver.resolve(&request.cluster_id) {
            Ok(site) => {
                debug!(site = %site.name, "cluster resolved");
                Ok(site)
            }
            Err(e) => {
                warn!(error = %e, "site resolution failed");
                Err(SagaError::Configuration {
                    cluster_id: request.cluster_id.clone(),
                    message: operator_message(request),
                })
            }
        }
    }

    async fn create(
        &self,
        run: &mut SagaRun,
        site: &ClusterSite,
        request: &GrantRequest,
        token: &CancellationToken,
    ) -> Result<()> {
        run.enter(SagaState::Creating);
        let namespace = NamespaceRequest::new(request.cluster_id.as_str(), request.namespace.as_str());
        let namespace = &namespace;
        let api = self.api.as_ref();

        let attempted = self
            .policy
            .execute(token, || api.create_namespace(site, namespace))
            .await
            .map_err(|_| SagaError::Cancelled {
                step: Step::CreateNamespace,
            })?;
        run.record(Step::CreateNamespace, &attempted);

        match attempted.outcome {
            OperationOutcome::Success => Ok(()),
            _ => Err(terminal(Step::CreateNamespace, attempted)),
        }
    }

    async fn grant(
        &self,
        run: &mut SagaRun,
        site: &ClusterSite,
        request: &GrantRequest,
        token: &CancellationToken,
    ) -> Result<()> {
        run.enter(SagaState::Granting);
        let api = self.api.as_ref();

        let attempted = self
            .policy
            .execute(token, || api.grant_permission(site, request))
            .await
            .map_err(|_| SagaError::Cancelled {
                step: Step::GrantPermission,
            })?;
        run.record(Step::GrantPermission, &attempted);

        match attempted.outcome {
            OperationOutcome::Success | OperationOutcome::AlreadyDone => Ok(()),
            _ => Err(terminal(Step::GrantPermission, attempted)),
        }
    }
}

/// Map a settled, unsuccessful outcome to the saga's error taxonomy.
fn terminal(step: Step, attempted: Attempted) -> SagaError {
    match attempted.outcome {
        outcome @ (OperationOutcome::AlreadyDone | OperationOutcome::NotFound(_)) => {
            SagaError::PreconditionViolation { step, outcome }
        }
        outcome @ OperationOutcome::AuthFailure(_) => SagaError::Authorization { step, outcome },
        outcome => SagaError::Transient {
            step,
            attempts: attempted.attempts,
            outcome,
        },
    }
}

fn manual_authorization(request: &GrantRequest) -> String {
    msg!(
        MESSAGES.saga.manual_authorization_required,
        cluster_id = request.cluster_id.as_str(),
        user = request.user.as_str(),
        role = request.role.as_str(),
        namespace = request.namespace.as_str()
    )
}

fn manual_namespace_creation(request: &GrantRequest) -> String {
    msg!(
        MESSAGES.saga.manual_namespace_creation_required,
        cluster_id = request.cluster_id.as_str(),
        namespace = request.namespace.as_str(),
        user = request.user.as_str()
    )
}

/// Bookkeeping for one run.
struct SagaRun {
    run_id: Uuid,
    procedure: Procedure,
    cluster_id: String,
    namespace: String,
    state: SagaState,
    steps: Vec<StepRecord>,
    started_at: chrono::DateTime<Utc>,
}

impl SagaRun {
    fn start(procedure: Procedure, request: &GrantRequest) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            procedure,
            cluster_id: request.cluster_id.clone(),
            namespace: request.namespace.clone(),
            state: SagaState::Resolving,
            steps: Vec::new(),
            started_at: Utc::now(),
        }
    }

    fn span(&self) -> Span {
        info_span!(
            "saga",
            run_id = %self.run_id,
            procedure = %self.procedure,
            cluster_id = %self.cluster_id,
            namespace = %self.namespace,
        )
    }

    fn enter(&mut self, state: SagaState) {
        debug!(from = %self.state, to = %state, "saga transition");
        self.state = state;
    }

    fn record(&mut self, step: Step, attempted: &Attempted) {
        info!(
            step = %step,
            attempts = attempted.attempts,
            outcome = %attempted.outcome,
            "step settled"
        );
        self.steps.push(StepRecord {
            step,
            attempts: attempted.attempts,
            outcome: attempted.outcome.clone(),
        });
    }

    fn settle(mut self, result: Result<()>) -> Result<SagaReport> {
        match result {
            Ok(()) => {
                self.enter(SagaState::Done);
                info!(steps = self.steps.len(), "saga done");
                Ok(SagaReport {
                    run_id: self.run_id,
                    procedure: self.procedure,
                    cluster_id: self.cluster_id,
                    namespace: self.namespace,
                    steps: self.steps,
                    started_at: self.started_at,
                    finished_at: Utc::now(),
                })
            }
            Err(err) => {
                self.enter(SagaState::Failed);
                self.report_failure(&err);
                Err(err)
            }
        }
    }

    fn report_failure(&self, err: &SagaError) {
        let detail = err
            .outcome()
            .map(ToString::to_string)
            .unwrap_or_default();
        let text = match err {
            SagaError::Configuration { message, .. } => message.clone(),
            SagaError::PreconditionViolation { step, .. } => {
                let template = match step {
                    Step::CreateNamespace => MESSAGES.saga.namespace_already_exists,
                    _ => MESSAGES.saga.namespace_not_found,
                };
                msg!(
                    template,
                    cluster_id = self.cluster_id.as_str(),
                    namespace = self.namespace.as_str()
                )
            }
            SagaError::Authorization { step, .. } => msg!(
                MESSAGES.saga.authorization_rejected,
                step = step.to_string(),
                detail = detail.as_str()
            ),
            SagaError::Transient { step, attempts, .. } => msg!(
                MESSAGES.saga.retries_exhausted,
                step = step.to_string(),
                attempts = attempts.to_string(),
                detail = detail.as_str()
            ),
            SagaError::Cancelled { step } => {
                msg!(MESSAGES.saga.cancelled, step = step.to_string())
            }
        };
        error!(code = err.code(), "{}", text);
    }
}
