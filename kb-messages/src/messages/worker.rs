//! Worker service messages

pub struct WorkerMessages {
    pub starting: &'static str,
    pub listening: &'static str,
    pub shutting_down: &'static str,
    pub unknown_procedure: &'static str,
    pub run_finished: &'static str,
}

pub const WORKER_MESSAGES: WorkerMessages = WorkerMessages {
    starting: "Starting kuboard worker (task queue: {task_queue})...",
    listening: "Listening on http://{addr}",
    shutting_down: "Shutdown requested, cancelling in-flight sagas",
    unknown_procedure: "Unknown procedure '{name}'. Expected KuboardNamespaceAuthorize or KuboardNamespaceCreate",
    run_finished: "✅ {procedure} finished for {cluster_id}/{namespace} (run {run_id})",
};
