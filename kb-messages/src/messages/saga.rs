//! Saga messages (operator-facing outcomes of create / authorize runs)

pub struct SagaMessages {
    // ============================================================================
    // Configuration errors (fixed operator contract, do not reword casually)
    // ============================================================================
    pub manual_authorization_required: &'static str,
    pub manual_namespace_creation_required: &'static str,

    // ============================================================================
    // Precondition violations
    // ============================================================================
    pub namespace_already_exists: &'static str,
    pub namespace_not_found: &'static str,

    // ============================================================================
    // Terminal failures
    // ============================================================================
    pub authorization_rejected: &'static str,
    pub retries_exhausted: &'static str,
    pub cancelled: &'static str,

    // ============================================================================
    // Progress
    // ============================================================================
    pub namespace_created: &'static str,
    pub permission_granted: &'static str,
    pub viewer_binding_exists: &'static str,
    pub role_binding_exists: &'static str,
}

pub const SAGA_MESSAGES: SagaMessages = SagaMessages {
    manual_authorization_required: "No Kuboard site mapping found for cluster '{cluster_id}'. \
        Manual authorization is required: grant '{user}' the '{role}' role on namespace '{namespace}' by hand, \
        or add the cluster to 'kuboard.clusters' and retry.",
    manual_namespace_creation_required: "No Kuboard site mapping found for cluster '{cluster_id}'. \
        Manual namespace creation is required: create namespace '{namespace}' and authorize '{user}' by hand, \
        or add the cluster to 'kuboard.clusters' and retry.",

    namespace_already_exists: "Namespace '{namespace}' already exists on cluster '{cluster_id}'",
    namespace_not_found: "Namespace '{namespace}' does not exist on cluster '{cluster_id}'",

    authorization_rejected: "Kuboard rejected the {step} step: {detail}",
    retries_exhausted: "{step} step failed after {attempts} attempts: {detail}",
    cancelled: "Saga cancelled during the {step} step",

    namespace_created: "Namespace created: cluster={cluster_id} namespace={namespace}",
    permission_granted: "Permission granted: cluster={cluster_id} namespace={namespace} user={user} role={role}",
    viewer_binding_exists: "Viewer binding already exists: cluster={cluster_id} user={user}",
    role_binding_exists: "Role binding already exists: cluster={cluster_id} namespace={namespace} user={user} role={role}",
};
