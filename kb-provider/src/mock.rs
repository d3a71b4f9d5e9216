//! Scripted in-memory [`KuboardApi`] for saga and service tests.

use crate::{GrantRequest, KuboardApi, NamespaceRequest, OperationOutcome};
use async_trait::async_trait;
use kb_config::ClusterSite;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A call observed by [`ScriptedKuboard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateNamespace { cluster_id: String, namespace: String },
    ViewerBinding { cluster_id: String, user: String },
    RoleBinding { cluster_id: String, namespace: String, user: String, role: String },
}

#[derive(Debug)]
struct Script {
    queued: VecDeque<OperationOutcome>,
    fallback: OperationOutcome,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            queued: VecDeque::new(),
            fallback: OperationOutcome::Success,
        }
    }
}

impl Script {
    fn next(&mut self) -> OperationOutcome {
        self.queued
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Returns queued outcomes in order, then the fallback (`Success` unless set).
#[derive(Debug, Default)]
pub struct ScriptedKuboard {
    create: Mutex<Script>,
    viewer: Mutex<Script>,
    role: Mutex<Script>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedKuboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_create(self, outcome: OperationOutcome) -> Self {
        push(&self.create, outcome);
        self
    }

    pub fn always_create(self, outcome: OperationOutcome) -> Self {
        set_fallback(&self.create, outcome);
        self
    }

    pub fn on_viewer(self, outcome: OperationOutcome) -> Self {
        push(&self.viewer, outcome);
        self
    }

    pub fn always_viewer(self, outcome: OperationOutcome) -> Self {
        set_fallback(&self.viewer, outcome);
        self
    }

    pub fn on_role(self, outcome: OperationOutcome) -> Self {
        push(&self.role, outcome);
        self
    }

    pub fn always_role(self, outcome: OperationOutcome) -> Self {
        set_fallback(&self.role, outcome);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn create_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::CreateNamespace { .. }))
    }

    pub fn viewer_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::ViewerBinding { .. }))
    }

    pub fn role_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::RoleBinding { .. }))
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

fn push(script: &Mutex<Script>, outcome: OperationOutcome) {
    if let Ok(mut script) = script.lock() {
        script.queued.push_back(outcome);
    }
}

fn set_fallback(script: &Mutex<Script>, outcome: OperationOutcome) {
    if let Ok(mut script) = script.lock() {
        script.fallback = outcome;
    }
}

fn next(script: &Mutex<Script>) -> OperationOutcome {
    script
        .lock()
        .map(|mut s| s.next())
        .unwrap_or_else(|_| OperationOutcome::UnexpectedFailure("script poisoned".into()))
}

#[async_trait]
impl KuboardApi for ScriptedKuboard {
    async fn create_namespace(
        &self,
        _site: &ClusterSite,
        request: &NamespaceRequest,
    ) -> OperationOutcome {
        self.record(Call::CreateNamespace {
            cluster_id: request.cluster_id.clone(),
            namespace: request.namespace.clone(),
        });
        next(&self.create)
    }

    async fn grant_viewer_binding(
        &self,
        _site: &ClusterSite,
        cluster_id: &str,
        user: &str,
    ) -> OperationOutcome {
        self.record(Call::ViewerBinding {
            cluster_id: cluster_id.to_string(),
            user: user.to_string(),
        });
        next(&self.viewer)
    }

    async fn grant_role_binding(
        &self,
        _site: &ClusterSite,
        request: &GrantRequest,
    ) -> OperationOutcome {
        self.record(Call::RoleBinding {
            cluster_id: request.cluster_id.clone(),
            namespace: request.namespace.clone(),
            user: request.user.clone(),
            role: request.role.clone(),
        });
        next(&self.role)
    }
}
