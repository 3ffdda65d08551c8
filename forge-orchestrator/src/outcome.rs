use serde::{Deserialize, Serialize};

/// Tri-state operation result. Callers need to distinguish "completed
/// with caveats" from "did not happen", so errors and warnings travel
/// separately and success is explicit rather than implied by an empty
/// error list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub success: OutcomeState,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeState {
    Success,
    Failed,
}

impl Outcome {
    pub fn success() -> Self {
        Self {
            success: OutcomeState::Success,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn success_with_warnings(warnings: Vec<String>) -> Self {
        Self {
            success: OutcomeState::Success,
            errors: Vec::new(),
            warnings,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: OutcomeState::Failed,
            errors: vec![message.into()],
            warnings: Vec::new(),
        }
    }

    pub fn push_error(&mut self, message: impl Into<String>) {
        self.success = OutcomeState::Failed;
        self.errors.push(message.into());
    }

    pub fn push_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn is_success(&self) -> bool {
        self.success == OutcomeState::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_do_not_flip_success() {
        let mut outcome = Outcome::success();
        outcome.push_warning("collaborator ACL failed");
        assert!(outcome.is_success());
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn push_error_marks_failed() {
        let mut outcome = Outcome::success();
        outcome.push_error("repository creation failed");
        assert!(!outcome.is_success());
    }
}
