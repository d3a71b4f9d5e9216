//! Request bodies sent to Kuboard and the Kubernetes API behind it.

use serde::Serialize;

pub const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";
pub const VIEWER_ROLE: &str = "viewer";

/// Deterministic name of the cluster-wide viewer binding for `user`.
pub fn viewer_binding_name(user: &str) -> String {
    format!("user.{user}.{VIEWER_ROLE}")
}

/// Deterministic name of the namespaced role binding for `user` and `role`.
pub fn role_binding_name(user: &str, role: &str) -> String {
    format!("user-{user}-{role}")
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceManifest {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: ObjectMeta,
}

impl NamespaceManifest {
    pub fn new(namespace: &str) -> Self {
        Self {
            api_version: "v1",
            kind: "Namespace",
            metadata: ObjectMeta {
                name: namespace.to_string(),
                namespace: None,
                cluster: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NamedRef {
    pub kind: &'static str,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleName {
    pub name: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewerBindingSpec {
    pub subject: NamedRef,
    pub role: RoleName,
}

/// Kuboard's own `KuboardAuthClusterRoleBinding`, granting cluster-wide view.
#[derive(Debug, Clone, Serialize)]
pub struct ViewerBindingManifest {
    pub kind: &'static str,
    pub metadata: ObjectMeta,
    pub spec: ViewerBindingSpec,
}

impl ViewerBindingManifest {
    pub fn new(cluster_id: &str, user: &str) -> Self {
        Self {
            kind: "KuboardAuthClusterRoleBinding",
            metadata: ObjectMeta {
                name: viewer_binding_name(user),
                namespace: None,
                cluster: Some(cluster_id.to_string()),
            },
            spec: ViewerBindingSpec {
                subject: NamedRef {
                    kind: "KuboardAuthUser",
                    name: user.to_string(),
                },
                role: RoleName { name: VIEWER_ROLE },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RbacRef {
    pub api_group: &'static str,
    pub kind: &'static str,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBindingManifest {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub metadata: ObjectMeta,
    pub role_ref: RbacRef,
    pub subjects: Vec<RbacRef>,
}

impl RoleBindingManifest {
    pub fn new(namespace: &str, user: &str, role: &str) -> Self {
        Self {
            api_version: "rbac.authorization.k8s.io/v1",
            kind: "RoleBinding",
            metadata: ObjectMeta {
                name: role_binding_name(user, role),
                namespace: Some(namespace.to_string()),
                cluster: None,
            },
            role_ref: RbacRef {
                api_group: RBAC_API_GROUP,
                kind: "Role",
                name: role.to_string(),
            },
            subjects: vec![RbacRef {
                api_group: RBAC_API_GROUP,
                kind: "User",
                name: user.to_string(),
            }],
        }
    }
}
