use crate::{error::ApiResult, state::AppState};
use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use kb_messages::{msg, MESSAGES};
use kb_orchestrator::{Procedure, SagaReport, WorkflowParams};
use serde_json::{json, Value};
use tracing::info;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/workflows", get(list_procedures))
        .route("/api/v1/workflows/{procedure}", post(run_workflow))
}

async fn list_procedures(State(state): State<AppState>) -> Json<Value> {
    let procedures: Vec<Value> = Procedure::ALL
        .iter()
        .map(|p| json!({ "name": p.name(), "alias": p.alias() }))
        .collect();

    Json(json!({
        "task_queue": state.task_queue,
        "procedures": procedures,
    }))
}

async fn run_workflow(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> ApiResult<Json<SagaReport>> {
    // Unknown procedures are a 404 whatever the body holds.
    let procedure: Procedure = name.parse()?;
    let Json(params) = Json::<WorkflowParams>::from_bytes(&body)?;
    let token = state.shutdown.child_token();

    let report = state.saga.run(procedure, &params, &token).await?;

    info!(
        "{}",
        msg!(
            MESSAGES.worker.run_finished,
            procedure = procedure.name(),
            cluster_id = report.cluster_id.as_str(),
            namespace = report.namespace.as_str(),
            run_id = report.run_id.to_string()
        )
    );
    Ok(Json(report))
}
