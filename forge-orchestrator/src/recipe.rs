use serde::{Deserialize, Serialize};

/// Template selection for a project. The recipe decides how the
/// workspace is provisioned: whether a repository is created or an
/// external one is reused, whether deploy/undeploy is permitted, and
/// which URL paths the workbench and the deployed service get.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum RecipeId {
    Default,
    PyFastapi,
    React,
    Angular,
    Quarkus,
    Micronaut,
    PublicImported,
    PrivateImported,
}

/// Capabilities of a recipe, looked up once per identifier instead of
/// string-prefix matching on recipe names.
#[derive(Debug, Clone, Copy)]
pub struct RecipeProfile {
    /// The orchestrator creates (and compensates by deleting) the git
    /// repository for this recipe.
    pub managed_repo: bool,
    /// The repository reference is supplied by the caller and used
    /// as-is; PAT validation runs against that repository.
    pub external_repo: bool,
    pub deployable: bool,
    /// Collaborator rows, add-collaborator, and ownership transfer
    /// are permitted. Imported recipes are single-tenant.
    pub collaborative: bool,
    /// Suffix appended to the browsable workspace URL once the
    /// workbench reports `CREATED`.
    pub workspace_path: Option<&'static str>,
    /// Path appended to the computed deployment URL.
    pub deploy_path: &'static str,
    /// The deployed service exposes a UI route; the gateway entry is
    /// registered as a UI route instead of an API route.
    pub exposes_ui: bool,
}

impl RecipeId {
    pub fn profile(&self) -> &'static RecipeProfile {
        match self {
            RecipeId::Default => &RecipeProfile {
                managed_repo: false,
                external_repo: false,
                deployable: true,
                collaborative: true,
                workspace_path: None,
                deploy_path: "api/swagger-ui.html",
                exposes_ui: false,
            },
            RecipeId::PyFastapi => &RecipeProfile {
                managed_repo: true,
                external_repo: false,
                deployable: true,
                collaborative: true,
                workspace_path: Some("app"),
                deploy_path: "api/docs",
                exposes_ui: false,
            },
            RecipeId::React => &RecipeProfile {
                managed_repo: true,
                external_repo: false,
                deployable: true,
                collaborative: true,
                workspace_path: Some("app"),
                deploy_path: "",
                exposes_ui: true,
            },
            RecipeId::Angular => &RecipeProfile {
                managed_repo: true,
                external_repo: false,
                deployable: true,
                collaborative: true,
                workspace_path: Some("app"),
                deploy_path: "",
                exposes_ui: true,
            },
            RecipeId::Quarkus => &RecipeProfile {
                managed_repo: true,
                external_repo: false,
                deployable: true,
                collaborative: true,
                workspace_path: Some("app"),
                deploy_path: "q/swagger-ui",
                exposes_ui: false,
            },
            RecipeId::Micronaut => &RecipeProfile {
                managed_repo: true,
                external_repo: false,
                deployable: true,
                collaborative: true,
                workspace_path: Some("app"),
                deploy_path: "swagger-ui/index.html",
                exposes_ui: false,
            },
            RecipeId::PublicImported | RecipeId::PrivateImported => &RecipeProfile {
                managed_repo: false,
                external_repo: true,
                deployable: false,
                collaborative: false,
                workspace_path: Some("app"),
                deploy_path: "",
                exposes_ui: false,
            },
        }
    }

    /// Job-system type discriminator for workbench/deployment dispatch.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeId::Default => "default",
            RecipeId::PyFastapi => "py-fastapi",
            RecipeId::React => "react",
            RecipeId::Angular => "angular",
            RecipeId::Quarkus => "quarkus",
            RecipeId::Micronaut => "micronaut",
            RecipeId::PublicImported => "public-imported",
            RecipeId::PrivateImported => "private-imported",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imported_recipes_are_locked_down() {
        for recipe in [RecipeId::PublicImported, RecipeId::PrivateImported] {
            let profile = recipe.profile();
            assert!(profile.external_repo);
            assert!(!profile.managed_repo);
            assert!(!profile.deployable);
            assert!(!profile.collaborative);
        }
    }

    #[test]
    fn framework_recipes_manage_their_repository() {
        for recipe in [
            RecipeId::PyFastapi,
            RecipeId::React,
            RecipeId::Angular,
            RecipeId::Quarkus,
            RecipeId::Micronaut,
        ] {
            assert!(recipe.profile().managed_repo);
            assert!(recipe.profile().deployable);
        }
    }

    #[test]
    fn default_recipe_reuses_repository() {
        let profile = RecipeId::Default.profile();
        assert!(!profile.managed_repo);
        assert!(profile.deployable);
        assert!(profile.workspace_path.is_none());
    }

    #[test]
    fn only_ui_recipes_register_ui_routes() {
        assert!(RecipeId::React.profile().exposes_ui);
        assert!(RecipeId::Angular.profile().exposes_ui);
        assert!(!RecipeId::Quarkus.profile().exposes_ui);
    }
}
