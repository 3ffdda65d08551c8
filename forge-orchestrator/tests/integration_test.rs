use forge_orchestrator::mock::MockClients;
use forge_orchestrator::test_utils::{
    admin_user, create_test_db, create_test_orchestrator, provision_request, user,
};
use forge_orchestrator::{
    DeployTarget, DeploymentStatus, OrchestratorConfig, RecipeId, SecurityConfig,
    SecurityConfigStatus, StatusEvent, WorkspaceOrchestrator, WorkspaceStatus, WorkspaceStore,
};

#[tokio::test]
async fn provision_creates_owner_workspace_row() {
    let (orchestrator, mocks) = create_test_orchestrator().await;

    let result = orchestrator
        .provision_project(provision_request("demo", RecipeId::Default, "u1"))
        .await
        .expect("provisioning failed");

    assert!(result.outcome.is_success());
    let workspace = result.workspace.expect("no workspace returned");
    assert!(workspace.id.starts_with("WS-"));
    assert_eq!(workspace.status, WorkspaceStatus::CreateRequested);
    assert!(workspace.workspace_url.is_empty());
    assert!(workspace.initiated_on.is_some());

    let rows = orchestrator
        .store()
        .workspaces_for_project("demo")
        .await
        .expect("query failed");
    assert_eq!(rows.len(), 1);

    let project = orchestrator.get_project("demo").await.expect("no project");
    assert!(project.int_deployment.deployment_url.is_none());
    assert!(project.prod_deployment.deployment_url.is_none());

    let calls = mocks.calls();
    assert!(calls.contains(&"validate_pat:git-u1".to_string()));
    assert!(calls.contains(&"add_collaborator:git-u1:demo".to_string()));
    assert_eq!(mocks.calls_matching("workbench.manage:create").len(), 1);
    // The bare default recipe reuses an existing repository.
    assert!(mocks.calls_matching("create_repo").is_empty());
}

#[tokio::test]
async fn duplicate_project_name_is_rejected() {
    let (orchestrator, _mocks) = create_test_orchestrator().await;

    orchestrator
        .provision_project(provision_request("demo", RecipeId::Default, "u1"))
        .await
        .expect("provisioning failed");

    let result = orchestrator
        .provision_project(provision_request("demo", RecipeId::Default, "u2"))
        .await
        .expect("provisioning failed");

    assert!(!result.outcome.is_success());
    assert!(result.outcome.errors[0].contains("already exists"));
}

#[tokio::test]
async fn workbench_failure_rolls_back_created_repo() {
    let (orchestrator, mocks) = create_test_orchestrator().await;
    mocks.fail_on("workbench.manage");

    let result = orchestrator
        .provision_project(provision_request("demo", RecipeId::Quarkus, "u1"))
        .await
        .expect("provisioning failed");

    assert!(!result.outcome.is_success());
    assert!(result.workspace.is_none());
    assert_eq!(result.outcome.errors.len(), 3);
    assert!(mocks.calls().contains(&"create_repo:demo".to_string()));
    assert!(result.outcome.errors[0].contains("Failed to initialize workbench"));
    assert!(result.outcome.errors[2].contains("has been deleted again"));
    assert!(mocks.calls().contains(&"delete_repo:demo".to_string()));

    // Nothing was persisted.
    assert!(orchestrator.get_project("demo").await.is_err());
    let count = orchestrator
        .total_workspace_count()
        .await
        .expect("count failed");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn store_failure_in_duplicate_check_aborts_before_any_git_call() {
    let pool = create_test_db().await;
    let mocks = MockClients::new();
    let orchestrator = WorkspaceOrchestrator::new(
        WorkspaceStore::new(pool.clone()),
        mocks.clients(),
        OrchestratorConfig::default(),
    );
    pool.close().await;

    let result = orchestrator
        .provision_project(provision_request("demo", RecipeId::Quarkus, "u1"))
        .await;

    // The store error propagates instead of reading as "project
    // absent", and no external system was touched.
    assert!(result.is_err());
    assert!(mocks.calls().is_empty());
}

#[tokio::test]
async fn store_failure_after_repo_creation_deletes_the_repo() {
    let pool = create_test_db().await;
    sqlx::query("DROP TABLE workspace_seq")
        .execute(&pool)
        .await
        .expect("drop failed");
    let mocks = MockClients::new();
    let orchestrator = WorkspaceOrchestrator::new(
        WorkspaceStore::new(pool),
        mocks.clients(),
        OrchestratorConfig::default(),
    );

    let result = orchestrator
        .provision_project(provision_request("demo", RecipeId::Quarkus, "u1"))
        .await;

    assert!(result.is_err());
    let calls = mocks.calls();
    assert!(calls.contains(&"create_repo:demo".to_string()));
    assert!(calls.contains(&"delete_repo:demo".to_string()));
    // Id allocation failed before the workbench request went out.
    assert!(mocks.calls_matching("workbench.manage").is_empty());
}

#[tokio::test]
async fn invalid_pat_aborts_without_side_effects() {
    let (orchestrator, mocks) = create_test_orchestrator().await;
    mocks.fail_on("validate_pat");

    let result = orchestrator
        .provision_project(provision_request("demo", RecipeId::Default, "u1"))
        .await
        .expect("provisioning failed");

    assert!(!result.outcome.is_success());
    assert!(result.outcome.errors[0].contains("Invalid personal access token"));
    assert!(mocks.calls_matching("create_repo").is_empty());
    assert!(mocks.calls_matching("workbench.manage").is_empty());
}

#[tokio::test]
async fn collaborator_acl_failure_downgrades_to_warning() {
    let (orchestrator, mocks) = create_test_orchestrator().await;
    mocks.fail_on("add_collaborator:git-u2");

    let mut request = provision_request("demo", RecipeId::Default, "u1");
    request.collaborators = vec![user("u2")];
    let result = orchestrator
        .provision_project(request)
        .await
        .expect("provisioning failed");

    assert!(result.outcome.is_success());
    assert!(result.outcome.warnings.iter().any(|w| w.contains("git-u2")));

    let rows = orchestrator
        .store()
        .workspaces_for_project("demo")
        .await
        .expect("query failed");
    assert_eq!(rows.len(), 2);
    assert!(rows
        .iter()
        .any(|w| w.status == WorkspaceStatus::CollabRequested && w.owner.id == "u2"));
}

#[tokio::test]
async fn imported_recipes_reject_deploy_and_ownership_transfer() {
    let (orchestrator, mocks) = create_test_orchestrator().await;

    let mut request = provision_request("imported", RecipeId::PublicImported, "u1");
    request.repo_reference = Some("https://github.example.com/other/repo".to_string());
    let result = orchestrator
        .provision_project(request)
        .await
        .expect("provisioning failed");
    assert!(result.outcome.is_success());
    let workspace = result.workspace.expect("no workspace");

    // No repository is managed for imported recipes.
    assert!(mocks.calls_matching("create_repo").is_empty());

    let deploy = orchestrator
        .deploy_workspace("u1", &workspace.id, DeployTarget::Int, "main", false, None)
        .await
        .expect("deploy failed");
    assert!(!deploy.is_success());

    let undeploy = orchestrator
        .undeploy_workspace("u1", &workspace.id, DeployTarget::Int, "main")
        .await
        .expect("undeploy failed");
    assert!(!undeploy.is_success());

    let reassign = orchestrator
        .reassign_owner("u1", &workspace.id, user("u2"))
        .await
        .expect("reassign failed");
    assert!(!reassign.is_success());

    // Policy rejections never reach the job system.
    assert!(mocks.calls_matching("deployment.dispatch").is_empty());
}

#[tokio::test]
async fn created_callback_sets_url_and_is_idempotent() {
    let (orchestrator, _mocks) = create_test_orchestrator().await;

    let result = orchestrator
        .provision_project(provision_request("demo", RecipeId::Quarkus, "u1"))
        .await
        .expect("provisioning failed");
    let workspace = result.workspace.expect("no workspace");

    let outcome = orchestrator
        .apply_status_update(
            "u1",
            &workspace.id,
            None,
            None,
            StatusEvent::Workspace(WorkspaceStatus::Created),
        )
        .await
        .expect("callback failed");
    assert!(outcome.is_success());

    let saved = orchestrator
        .get_workspace("u1", &workspace.id)
        .await
        .expect("lookup failed");
    assert_eq!(saved.status, WorkspaceStatus::Created);
    assert_eq!(
        saved.workspace_url,
        format!(
            "https://forge.example.com/{}/?folder=/home/coder/app",
            workspace.id
        )
    );

    // Replayed event is accepted without change.
    let replay = orchestrator
        .apply_status_update(
            "u1",
            &workspace.id,
            None,
            None,
            StatusEvent::Workspace(WorkspaceStatus::Created),
        )
        .await
        .expect("callback failed");
    assert!(replay.is_success());

    // A regression to an earlier state is refused.
    let invalid = orchestrator
        .apply_status_update(
            "u1",
            &workspace.id,
            None,
            None,
            StatusEvent::Workspace(WorkspaceStatus::CreateRequested),
        )
        .await
        .expect("callback failed");
    assert!(!invalid.is_success());
    assert!(invalid.errors[0].contains("Invalid status transition"));
}

#[tokio::test]
async fn deployed_callback_sets_url_once_and_registers_gateway() {
    let (orchestrator, mocks) = create_test_orchestrator().await;

    let result = orchestrator
        .provision_project(provision_request("demo", RecipeId::PyFastapi, "u1"))
        .await
        .expect("provisioning failed");
    let workspace = result.workspace.expect("no workspace");

    let dispatch = orchestrator
        .deploy_workspace("u1", &workspace.id, DeployTarget::Int, "main", false, None)
        .await
        .expect("deploy failed");
    assert!(dispatch.is_success());

    let project = orchestrator.get_project("demo").await.expect("no project");
    assert_eq!(
        project.int_deployment.last_deployment_status,
        Some(DeploymentStatus::DeployRequested)
    );

    let outcome = orchestrator
        .apply_status_update(
            "u1",
            &workspace.id,
            Some(DeployTarget::Int),
            Some("main".to_string()),
            StatusEvent::Deployment(DeploymentStatus::Deployed),
        )
        .await
        .expect("callback failed");
    assert!(outcome.is_success());

    let project = orchestrator.get_project("demo").await.expect("no project");
    let expected_url = format!("https://forge.example.com/{}/int/api/docs", workspace.id);
    assert_eq!(
        project.int_deployment.deployment_url.as_deref(),
        Some(expected_url.as_str())
    );
    assert_eq!(
        project.int_deployment.last_deployed_branch.as_deref(),
        Some("main")
    );
    assert_eq!(
        mocks.calls_matching("gateway.register").len(),
        1,
        "gateway registration expected exactly once"
    );

    // Replayed callback leaves the URL untouched.
    orchestrator
        .apply_status_update(
            "u1",
            &workspace.id,
            Some(DeployTarget::Int),
            Some("other".to_string()),
            StatusEvent::Deployment(DeploymentStatus::Deployed),
        )
        .await
        .expect("callback failed");
    let project = orchestrator.get_project("demo").await.expect("no project");
    assert_eq!(
        project.int_deployment.deployment_url.as_deref(),
        Some(expected_url.as_str())
    );
}

#[tokio::test]
async fn undeployed_callback_clears_url() {
    let (orchestrator, _mocks) = create_test_orchestrator().await;

    let result = orchestrator
        .provision_project(provision_request("demo", RecipeId::Default, "u1"))
        .await
        .expect("provisioning failed");
    let workspace = result.workspace.expect("no workspace");

    orchestrator
        .apply_status_update(
            "u1",
            &workspace.id,
            Some(DeployTarget::Prod),
            Some("main".to_string()),
            StatusEvent::Deployment(DeploymentStatus::Deployed),
        )
        .await
        .expect("callback failed");
    orchestrator
        .apply_status_update(
            "u1",
            &workspace.id,
            Some(DeployTarget::Prod),
            None,
            StatusEvent::Deployment(DeploymentStatus::Undeployed),
        )
        .await
        .expect("callback failed");

    let project = orchestrator.get_project("demo").await.expect("no project");
    assert!(project.prod_deployment.deployment_url.is_none());
    assert_eq!(
        project.prod_deployment.last_deployment_status,
        Some(DeploymentStatus::Undeployed)
    );
}

#[tokio::test]
async fn add_collaborator_creates_pending_row() {
    let (orchestrator, mocks) = create_test_orchestrator().await;

    let result = orchestrator
        .provision_project(provision_request("demo", RecipeId::Default, "u1"))
        .await
        .expect("provisioning failed");
    let workspace = result.workspace.expect("no workspace");

    let outcome = orchestrator
        .add_collaborator("u1", &workspace.id, user("u2"))
        .await
        .expect("add failed");
    assert!(outcome.is_success());
    assert!(mocks
        .calls()
        .contains(&"add_collaborator:git-u2:demo".to_string()));

    let project = orchestrator.get_project("demo").await.expect("no project");
    assert_eq!(project.collaborators.len(), 1);

    let rows = orchestrator
        .store()
        .workspaces_for_project("demo")
        .await
        .expect("query failed");
    let collab_row = rows
        .iter()
        .find(|w| w.owner.id == "u2")
        .expect("collaborator row missing");
    assert_eq!(collab_row.status, WorkspaceStatus::CollabRequested);
    assert!(collab_row.initiated_on.is_none());

    // The collaborator then requests their own workbench.
    let initiated = orchestrator
        .initiate_workspace("u2", &collab_row.id, "token", "medium")
        .await
        .expect("initiate failed");
    assert!(initiated.is_success());
    let saved = orchestrator
        .get_workspace("u2", &collab_row.id)
        .await
        .expect("lookup failed");
    assert_eq!(saved.status, WorkspaceStatus::CreateRequested);
    assert!(saved.initiated_on.is_some());
}

#[tokio::test]
async fn add_collaborator_rejected_for_imported_recipe() {
    let (orchestrator, mocks) = create_test_orchestrator().await;

    let mut request = provision_request("imported", RecipeId::PublicImported, "u1");
    request.repo_reference = Some("https://github.example.com/other/repo".to_string());
    let result = orchestrator
        .provision_project(request)
        .await
        .expect("provisioning failed");
    let workspace = result.workspace.expect("no workspace");

    let outcome = orchestrator
        .add_collaborator("u1", &workspace.id, user("u2"))
        .await
        .expect("add failed");
    assert!(!outcome.is_success());

    assert!(mocks.calls_matching("add_collaborator").is_empty());
    let rows = orchestrator
        .store()
        .workspaces_for_project("imported")
        .await
        .expect("query failed");
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn ownership_transfer_requires_existing_collaborator() {
    let (orchestrator, _mocks) = create_test_orchestrator().await;

    let result = orchestrator
        .provision_project(provision_request("demo", RecipeId::Default, "u1"))
        .await
        .expect("provisioning failed");
    let workspace = result.workspace.expect("no workspace");

    let outcome = orchestrator
        .reassign_owner("u1", &workspace.id, user("u2"))
        .await
        .expect("reassign failed");
    assert!(!outcome.is_success());
    assert!(outcome.errors[0].contains("Failed to update project owner details"));

    // The owner is unchanged after the failed transfer.
    let project = orchestrator.get_project("demo").await.expect("no project");
    assert_eq!(project.owner.id, "u1");
}

#[tokio::test]
async fn ownership_transfer_swaps_owner_and_collaborator() {
    let (orchestrator, _mocks) = create_test_orchestrator().await;

    let mut request = provision_request("demo", RecipeId::Default, "u1");
    request.collaborators = vec![user("u2")];
    let result = orchestrator
        .provision_project(request)
        .await
        .expect("provisioning failed");
    let workspace = result.workspace.expect("no workspace");

    let outcome = orchestrator
        .reassign_owner("u1", &workspace.id, user("u2"))
        .await
        .expect("reassign failed");
    assert!(outcome.is_success());

    let project = orchestrator.get_project("demo").await.expect("no project");
    assert_eq!(project.owner.id, "u2");
    assert_eq!(project.collaborators.len(), 1);
    assert_eq!(project.collaborators[0].id, "u1");
}

#[tokio::test]
async fn deletion_undeploys_active_environments_first() {
    let (orchestrator, mocks) = create_test_orchestrator().await;

    let result = orchestrator
        .provision_project(provision_request("demo", RecipeId::Default, "u1"))
        .await
        .expect("provisioning failed");
    let workspace = result.workspace.expect("no workspace");

    orchestrator
        .apply_status_update(
            "u1",
            &workspace.id,
            Some(DeployTarget::Prod),
            Some("main".to_string()),
            StatusEvent::Deployment(DeploymentStatus::Deployed),
        )
        .await
        .expect("callback failed");

    let outcome = orchestrator
        .delete_workspace("u1", &workspace.id)
        .await
        .expect("delete failed");
    assert!(outcome.is_success());

    let calls = mocks.calls();
    let undeploy_pos = calls
        .iter()
        .position(|c| c == "deployment.dispatch:undeploy:prod")
        .expect("no undeploy dispatched");
    let teardown_pos = calls
        .iter()
        .position(|c| c.starts_with("workbench.manage:delete"))
        .expect("no workbench teardown");
    assert!(undeploy_pos < teardown_pos);
    assert_eq!(mocks.calls_matching("deployment.dispatch:undeploy").len(), 1);

    // Gateway cleanup covers the editor route and the deployed api.
    assert!(calls.contains(&format!("gateway.delete_route:{}", workspace.id)));
    assert!(calls.contains(&format!("gateway.delete_route:{}-api", workspace.id)));

    // Soft delete: the row survives with status Deleted.
    let rows = orchestrator
        .store()
        .workspaces_for_project("demo")
        .await
        .expect("query failed");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, WorkspaceStatus::Deleted);
    assert!(orchestrator.list_workspaces("u1").await.expect("list").is_empty());
}

#[tokio::test]
async fn deletion_aborts_when_undeploy_dispatch_fails() {
    let (orchestrator, mocks) = create_test_orchestrator().await;

    let result = orchestrator
        .provision_project(provision_request("demo", RecipeId::Default, "u1"))
        .await
        .expect("provisioning failed");
    let workspace = result.workspace.expect("no workspace");

    orchestrator
        .apply_status_update(
            "u1",
            &workspace.id,
            Some(DeployTarget::Prod),
            Some("main".to_string()),
            StatusEvent::Deployment(DeploymentStatus::Deployed),
        )
        .await
        .expect("callback failed");

    mocks.fail_on("deployment.dispatch:undeploy");
    let outcome = orchestrator
        .delete_workspace("u1", &workspace.id)
        .await
        .expect("delete failed");
    assert!(!outcome.is_success());
    assert!(outcome.errors[0].contains("Please retry deleting the workspace"));

    // Nothing was torn down or mutated.
    assert!(mocks.calls_matching("workbench.manage:delete").is_empty());
    assert!(mocks.calls_matching("gateway.delete_route").is_empty());
    let saved = orchestrator
        .get_workspace("u1", &workspace.id)
        .await
        .expect("lookup failed");
    assert_eq!(saved.status, WorkspaceStatus::CreateRequested);
}

#[tokio::test]
async fn remove_collaborator_deletes_their_workspace() {
    let (orchestrator, _mocks) = create_test_orchestrator().await;

    let mut request = provision_request("demo", RecipeId::Default, "u1");
    request.collaborators = vec![user("u2")];
    let result = orchestrator
        .provision_project(request)
        .await
        .expect("provisioning failed");
    let workspace = result.workspace.expect("no workspace");

    let outcome = orchestrator
        .remove_collaborator("u1", &workspace.id, "u2")
        .await
        .expect("remove failed");
    assert!(outcome.is_success());

    let project = orchestrator.get_project("demo").await.expect("no project");
    assert!(project.collaborators.is_empty());
    assert!(orchestrator.list_workspaces("u2").await.expect("list").is_empty());
}

#[tokio::test]
async fn security_review_request_notifies_admins() {
    let (orchestrator, mocks) = create_test_orchestrator().await;
    mocks.set_directory_users(vec![admin_user("admin1"), admin_user("admin2")]);

    let result = orchestrator
        .provision_project(provision_request("demo", RecipeId::Default, "u1"))
        .await
        .expect("provisioning failed");
    let workspace = result.workspace.expect("no workspace");

    let config = SecurityConfig {
        status: SecurityConfigStatus::Requested,
        entries: serde_json::json!([{"rule": "open-api"}]),
    };
    let outcome = orchestrator
        .save_security_config("u1", &workspace.id, config, false)
        .await
        .expect("save failed");
    assert!(outcome.is_success());

    assert!(mocks
        .calls()
        .contains(&"directory.list_by_role:WorkspaceAdmin".to_string()));
    let events = mocks.notifications();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].recipient_ids, ["admin1", "admin2"]);
}

#[tokio::test]
async fn accepting_security_config_notifies_members() {
    let (orchestrator, mocks) = create_test_orchestrator().await;

    let mut request = provision_request("demo", RecipeId::Default, "u1");
    request.collaborators = vec![user("u2")];
    let result = orchestrator
        .provision_project(request)
        .await
        .expect("provisioning failed");
    let workspace = result.workspace.expect("no workspace");

    let config = SecurityConfig {
        status: SecurityConfigStatus::Draft,
        entries: serde_json::json!([]),
    };
    orchestrator
        .save_security_config("u1", &workspace.id, config, false)
        .await
        .expect("save failed");

    let outcome = orchestrator
        .update_security_config_status("admin1", "demo", SecurityConfigStatus::Accepted)
        .await
        .expect("status update failed");
    assert!(outcome.is_success());

    let project = orchestrator.get_project("demo").await.expect("no project");
    assert_eq!(
        project.security_config.expect("no config").status,
        SecurityConfigStatus::Accepted
    );
    let events = mocks.notifications();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].recipient_ids, ["u1", "u2"]);
}

#[tokio::test]
async fn publishing_snapshots_the_published_config() {
    let (orchestrator, _mocks) = create_test_orchestrator().await;

    let result = orchestrator
        .provision_project(provision_request("demo", RecipeId::Default, "u1"))
        .await
        .expect("provisioning failed");
    let workspace = result.workspace.expect("no workspace");

    let config = SecurityConfig {
        status: SecurityConfigStatus::Accepted,
        entries: serde_json::json!([{"rule": "restrict"}]),
    };
    orchestrator
        .save_security_config("u1", &workspace.id, config, true)
        .await
        .expect("save failed");

    let project = orchestrator.get_project("demo").await.expect("no project");
    assert_eq!(
        project.security_config.expect("no config").status,
        SecurityConfigStatus::Published
    );
    assert_eq!(
        project
            .published_security_config
            .expect("no published config")
            .status,
        SecurityConfigStatus::Published
    );
}

#[tokio::test]
async fn governance_update_is_owner_only() {
    let (orchestrator, _mocks) = create_test_orchestrator().await;

    let mut request = provision_request("demo", RecipeId::Default, "u1");
    request.collaborators = vec![user("u2")];
    let result = orchestrator
        .provision_project(request)
        .await
        .expect("provisioning failed");
    let workspace = result.workspace.expect("no workspace");

    let governance = forge_orchestrator::GovernanceDetails {
        description: Some("internal tooling".to_string()),
        pii_data: true,
        ..Default::default()
    };
    let outcome = orchestrator
        .update_governance("u1", &workspace.id, governance.clone())
        .await
        .expect("update failed");
    assert!(outcome.is_success());

    let project = orchestrator.get_project("demo").await.expect("no project");
    assert!(project.governance.expect("no governance").pii_data);

    // A collaborator editing through their own workspace is refused.
    let rows = orchestrator
        .store()
        .workspaces_for_project("demo")
        .await
        .expect("query failed");
    let collab_row = rows.iter().find(|w| w.owner.id == "u2").expect("no row");
    let refused = orchestrator
        .update_governance("u2", &collab_row.id, governance)
        .await
        .expect("update failed");
    assert!(!refused.is_success());
}
