//! Procedure names and parameters as a scheduler sees them.

use crate::error::UnknownProcedure;
use kb_provider::GrantRequest;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task queue both procedures are registered on.
pub const TASK_QUEUE: &str = "kuboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Procedure {
    /// Authorize a user on an existing namespace.
    #[serde(rename = "KuboardNamespaceAuthorize", alias = "namespace-authorize")]
    NamespaceAuthorize,
    /// Create a namespace, then authorize a user on it.
    #[serde(rename = "KuboardNamespaceCreate", alias = "namespace-create")]
    NamespaceCreate,
}

impl Procedure {
    pub const ALL: [Procedure; 2] = [Procedure::NamespaceAuthorize, Procedure::NamespaceCreate];

    /// Registered workflow name.
    pub fn name(self) -> &'static str {
        match self {
            Self::NamespaceAuthorize => "KuboardNamespaceAuthorize",
            Self::NamespaceCreate => "KuboardNamespaceCreate",
        }
    }

    pub fn alias(self) -> &'static str {
        match self {
            Self::NamespaceAuthorize => "namespace-authorize",
            Self::NamespaceCreate => "namespace-create",
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Procedure {
    type Err = UnknownProcedure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s || p.alias() == s)
            .ok_or_else(|| UnknownProcedure(s.to_string()))
    }
}

/// Parameters shared by both procedures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowParams {
    pub cluster_id: String,
    pub namespace: String,
    #[serde(rename = "ldap_user_name", alias = "username")]
    pub user: String,
    pub role: String,
}

impl WorkflowParams {
    pub fn grant_request(&self) -> GrantRequest {
        GrantRequest::new(
            self.cluster_id.as_str(),
            self.namespace.as_str(),
            self.user.as_str(),
            self.role.as_str(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_procedure_parses_name_and_alias() {
        assert_eq!(
            "KuboardNamespaceCreate".parse::<Procedure>().unwrap(),
            Procedure::NamespaceCreate
        );
        assert_eq!(
            "namespace-authorize".parse::<Procedure>().unwrap(),
            Procedure::NamespaceAuthorize
        );
        assert_eq!(
            "namespace-delete".parse::<Procedure>().unwrap_err(),
            UnknownProcedure("namespace-delete".into())
        );
    }

    #[test]
    fn test_procedure_serde_uses_workflow_name() {
        assert_eq!(
            serde_json::to_value(Procedure::NamespaceAuthorize).unwrap(),
            json!("KuboardNamespaceAuthorize")
        );
        let parsed: Procedure = serde_json::from_value(json!("namespace-create")).unwrap();
        assert_eq!(parsed, Procedure::NamespaceCreate);
    }

    #[test]
    fn test_params_accept_ldap_user_name_and_username() {
        let a: WorkflowParams = serde_json::from_value(json!({
            "cluster_id": "c1", "namespace": "ns1", "ldap_user_name": "alice", "role": "edit"
        }))
        .unwrap();
        let b: WorkflowParams = serde_json::from_value(json!({
            "cluster_id": "c1", "namespace": "ns1", "username": "alice", "role": "edit"
        }))
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(
            a.grant_request(),
            GrantRequest::new("c1", "ns1", "alice", "edit")
        );
    }

    #[test]
    fn test_params_serialize_as_ldap_user_name() {
        let params = WorkflowParams {
            cluster_id: "c1".into(),
            namespace: "ns1".into(),
            user: "alice".into(),
            role: "view".into(),
        };
        assert_eq!(serde_json::to_value(&params).unwrap()["ldap_user_name"], "alice");
    }
}
