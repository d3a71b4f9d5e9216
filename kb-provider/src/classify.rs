//! Response classification, one function per call.
//!
//! Kuboard signals "already exists" on the viewer binding with an ordinary
//! error status plus message text, and Kubernetes does so on a role binding
//! with 409 plus text. These substring contracts are kept here and nowhere
//! else.

use crate::outcome::OperationOutcome;

/// Marker Kuboard puts in the body when a binding object already exists.
pub const KUBOARD_ALREADY_EXISTS: &str = "对象已存在";

/// Marker the Kubernetes API puts in a 409 body.
pub const K8S_ALREADY_EXISTS: &str = "already exists";

fn failure_detail(status: u16, body: &str) -> String {
    format!("HTTP {status}, {body}")
}

/// `POST /api/v1/namespaces`: 201/200 created, 409 exists, anything else retryable.
pub fn classify_namespace_creation(status: u16, body: &str) -> OperationOutcome {
    match status {
        200 | 201 => OperationOutcome::Success,
        409 => OperationOutcome::AlreadyDone,
        _ => OperationOutcome::UnexpectedFailure(failure_detail(status, body)),
    }
}

/// Stage 1, `KuboardAuthClusterRoleBinding`. The binding name is derived from
/// the user, so an existing object is a previous run's artifact.
pub fn classify_viewer_binding(status: u16, body: &str) -> OperationOutcome {
    if status == 200 {
        return OperationOutcome::Success;
    }
    if body.contains(KUBOARD_ALREADY_EXISTS) || body.contains(K8S_ALREADY_EXISTS) {
        return OperationOutcome::AlreadyDone;
    }
    OperationOutcome::AuthFailure(failure_detail(status, body))
}

/// Stage 2, namespaced `RoleBinding`.
pub fn classify_role_binding(status: u16, body: &str) -> OperationOutcome {
    match status {
        201 => OperationOutcome::Success,
        409 if body.contains(K8S_ALREADY_EXISTS) => OperationOutcome::AlreadyDone,
        404 => OperationOutcome::NotFound(failure_detail(status, body)),
        _ => OperationOutcome::AuthFailure(failure_detail(status, body)),
    }
}

/// Anything that prevented a response from arriving.
pub fn classify_transport(err: &reqwest::Error) -> OperationOutcome {
    let reason = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    OperationOutcome::NetworkFailure(format!("{reason}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::OutcomeKind;

    #[test]
    fn test_namespace_creation() {
        assert_eq!(classify_namespace_creation(201, ""), OperationOutcome::Success);
        assert_eq!(classify_namespace_creation(200, ""), OperationOutcome::Success);
        assert_eq!(
            classify_namespace_creation(409, "namespaces \"ns1\" already exists"),
            OperationOutcome::AlreadyDone
        );
        assert_eq!(
            classify_namespace_creation(500, "boom"),
            OperationOutcome::UnexpectedFailure("HTTP 500, boom".into())
        );
        assert_eq!(
            classify_namespace_creation(403, "").kind(),
            OutcomeKind::UnexpectedFailure
        );
    }

    #[test]
    fn test_viewer_binding_marker_on_any_status() {
        assert_eq!(classify_viewer_binding(200, ""), OperationOutcome::Success);
        for status in [400, 409, 500] {
            assert_eq!(
                classify_viewer_binding(status, "{\"message\":\"对象已存在\"}"),
                OperationOutcome::AlreadyDone
            );
        }
        assert_eq!(
            classify_viewer_binding(500, "object already exists"),
            OperationOutcome::AlreadyDone
        );
    }

    #[test]
    fn test_viewer_binding_other_failures_are_auth_failures() {
        assert_eq!(
            classify_viewer_binding(500, "internal error"),
            OperationOutcome::AuthFailure("HTTP 500, internal error".into())
        );
        assert_eq!(
            classify_viewer_binding(201, "").kind(),
            OutcomeKind::AuthFailure
        );
    }

    #[test]
    fn test_role_binding() {
        assert_eq!(classify_role_binding(201, ""), OperationOutcome::Success);
        assert_eq!(
            classify_role_binding(409, "rolebindings \"user-alice-edit\" already exists"),
            OperationOutcome::AlreadyDone
        );
        assert_eq!(
            classify_role_binding(404, "namespaces \"ns1\" not found").kind(),
            OutcomeKind::NotFound
        );
        assert_eq!(
            classify_role_binding(409, "conflict").kind(),
            OutcomeKind::AuthFailure
        );
        assert_eq!(
            classify_role_binding(403, "forbidden").kind(),
            OutcomeKind::AuthFailure
        );
    }

    #[test]
    fn test_role_binding_ignores_kuboard_marker() {
        assert_eq!(
            classify_role_binding(500, KUBOARD_ALREADY_EXISTS).kind(),
            OutcomeKind::AuthFailure
        );
    }
}
