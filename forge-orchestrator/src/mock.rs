//! Recording in-memory implementations of the external-system traits.
//!
//! Every call appends a `"<operation>:<args>"` entry to a shared log
//! so tests can assert on call order and count. Failures are injected
//! per operation prefix with [`MockClients::fail_on`].

use crate::clients::{
    ClientError, ClientResult, Clients, DeploymentJob, DeploymentRequest, DirectoryUser,
    GatewayRegistrar, GitHost, JobOutcome, NotificationEvent, NotificationPublisher, UserDirectory,
    WorkbenchAction, WorkbenchProvisioner, WorkbenchRequest,
};
use crate::model::DeployTarget;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MockState {
    calls: Vec<String>,
    fail_on: Vec<String>,
    directory_users: Vec<DirectoryUser>,
    notifications: Vec<NotificationEvent>,
}

/// Shared handle over all six mocked external systems.
#[derive(Clone, Default)]
pub struct MockClients {
    state: Arc<Mutex<MockState>>,
}

impl MockClients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call whose log entry starts with `prefix` fail.
    /// Job-dispatch operations report a failed [`JobOutcome`]; all
    /// others return a rejection error.
    pub fn fail_on(&self, prefix: &str) {
        self.state.lock().unwrap().fail_on.push(prefix.to_string());
    }

    pub fn set_directory_users(&self, users: Vec<DirectoryUser>) {
        self.state.lock().unwrap().directory_users = users;
    }

    /// All recorded calls, in invocation order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_matching(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    pub fn notifications(&self) -> Vec<NotificationEvent> {
        self.state.lock().unwrap().notifications.clone()
    }

    pub fn clients(&self) -> Clients {
        Clients {
            git: Arc::new(self.clone()),
            workbench: Arc::new(self.clone()),
            deployment: Arc::new(self.clone()),
            gateway: Arc::new(self.clone()),
            notifications: Arc::new(self.clone()),
            directory: Arc::new(self.clone()),
        }
    }

    /// Record the call; true when a failure was injected for it.
    fn record(&self, call: String) -> bool {
        let mut state = self.state.lock().unwrap();
        let fail = state.fail_on.iter().any(|p| call.starts_with(p.as_str()));
        state.calls.push(call);
        fail
    }

    fn rejected(service: &'static str, call: &str) -> ClientError {
        ClientError::Rejected {
            service,
            message: format!("injected failure for {call}"),
        }
    }
}

#[async_trait]
impl GitHost for MockClients {
    async fn validate_pat(&self, git_user: &str, _pat: &str) -> ClientResult<()> {
        let call = format!("validate_pat:{git_user}");
        if self.record(call.clone()) {
            return Err(Self::rejected("git", &call));
        }
        Ok(())
    }

    async fn validate_public_pat(
        &self,
        git_user: &str,
        _pat: &str,
        repo: &str,
    ) -> ClientResult<()> {
        let call = format!("validate_public_pat:{git_user}:{repo}");
        if self.record(call.clone()) {
            return Err(Self::rejected("git", &call));
        }
        Ok(())
    }

    async fn create_repo(&self, name: &str) -> ClientResult<()> {
        let call = format!("create_repo:{name}");
        if self.record(call.clone()) {
            return Err(Self::rejected("git", &call));
        }
        Ok(())
    }

    async fn delete_repo(&self, name: &str) -> ClientResult<()> {
        let call = format!("delete_repo:{name}");
        if self.record(call.clone()) {
            return Err(Self::rejected("git", &call));
        }
        Ok(())
    }

    async fn add_collaborator(&self, git_user: &str, repo: &str) -> ClientResult<()> {
        let call = format!("add_collaborator:{git_user}:{repo}");
        if self.record(call.clone()) {
            return Err(Self::rejected("git", &call));
        }
        Ok(())
    }
}

#[async_trait]
impl WorkbenchProvisioner for MockClients {
    async fn manage(&self, request: &WorkbenchRequest) -> ClientResult<JobOutcome> {
        let action = match request.action {
            WorkbenchAction::Create => "create",
            WorkbenchAction::Delete => "delete",
        };
        let call = format!("workbench.manage:{action}:{}", request.workspace_id);
        if self.record(call.clone()) {
            return Ok(JobOutcome::failed(format!("injected failure for {call}")));
        }
        Ok(JobOutcome::ok())
    }
}

#[async_trait]
impl DeploymentJob for MockClients {
    async fn dispatch(&self, request: &DeploymentRequest) -> ClientResult<JobOutcome> {
        let action = match request.action {
            crate::clients::DeployAction::Deploy => "deploy",
            crate::clients::DeployAction::Undeploy => "undeploy",
        };
        let call = format!("deployment.dispatch:{action}:{}", request.environment);
        if self.record(call.clone()) {
            return Ok(JobOutcome::failed(format!("injected failure for {call}")));
        }
        Ok(JobOutcome::ok())
    }
}

#[async_trait]
impl GatewayRegistrar for MockClients {
    async fn delete_route(&self, name: &str) -> ClientResult<()> {
        let call = format!("gateway.delete_route:{name}");
        if self.record(call.clone()) {
            return Err(Self::rejected("gateway", &call));
        }
        Ok(())
    }

    async fn delete_service(&self, name: &str) -> ClientResult<()> {
        let call = format!("gateway.delete_service:{name}");
        if self.record(call.clone()) {
            return Err(Self::rejected("gateway", &call));
        }
        Ok(())
    }

    async fn register_for_deployment(
        &self,
        service_name: &str,
        environment: DeployTarget,
        is_api_recipe: bool,
    ) -> ClientResult<()> {
        let call = format!("gateway.register:{service_name}:{environment}:{is_api_recipe}");
        if self.record(call.clone()) {
            return Err(Self::rejected("gateway", &call));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationPublisher for MockClients {
    async fn publish(&self, event: &NotificationEvent) -> ClientResult<()> {
        let call = format!("notifications.publish:{}", event.event_type);
        if self.record(call.clone()) {
            return Err(Self::rejected("notifications", &call));
        }
        self.state.lock().unwrap().notifications.push(event.clone());
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MockClients {
    async fn list_by_role(&self, role: &str) -> ClientResult<Vec<DirectoryUser>> {
        let call = format!("directory.list_by_role:{role}");
        if self.record(call.clone()) {
            return Err(Self::rejected("directory", &call));
        }
        Ok(self.state.lock().unwrap().directory_users.clone())
    }
}
