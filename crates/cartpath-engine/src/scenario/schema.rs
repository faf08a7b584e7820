use super::definition::{ScenarioDefinition, Stage};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Scenario name cannot be empty")]
    EmptyName,
    #[error("Scenario must have at least one stage")]
    NoStages,
    #[error("Stage {0} interacts with the page before any navigate stage")]
    InteractionBeforeNavigate(usize),
    #[error("Stage {0} scopes role '{1}' within itself")]
    SelfScoped(usize, String),
    #[error("Scenario must end with a click, found '{0}'")]
    NoTerminalClick(&'static str),
}

pub trait Validatable {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validatable for ScenarioDefinition {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let Some(last) = self.stages.last() else {
            return Err(ValidationError::NoStages);
        };

        let mut navigated = false;
        for (idx, stage) in self.stages.iter().enumerate() {
            match stage {
                Stage::Navigate { .. } => navigated = true,
                Stage::PickAndClick {
                    role,
                    within: Some(scope),
                } if role == scope => {
                    return Err(ValidationError::SelfScoped(idx, role.to_string()));
                }
                _ => {}
            }
            if !navigated && !stage.roles().is_empty() {
                return Err(ValidationError::InteractionBeforeNavigate(idx));
            }
        }

        if !last.is_interaction() {
            return Err(ValidationError::NoTerminalClick(last.kind()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::definition::ScenarioTier;
    use cartpath_common::protocol::Role;

    fn def(stages: Vec<Stage>) -> ScenarioDefinition {
        ScenarioDefinition {
            name: "test".into(),
            description: None,
            tier: ScenarioTier::Loaded,
            stages,
        }
    }

    fn navigate() -> Stage {
        Stage::Navigate { url: "/".into() }
    }

    #[test]
    fn test_valid_definition() {
        let d = def(vec![
            navigate(),
            Stage::Click {
                role: Role::CartButton,
            },
        ]);
        assert_eq!(d.validate(), Ok(()));
    }

    #[test]
    fn test_empty_name() {
        let mut d = def(vec![navigate()]);
        d.name = "  ".into();
        assert_eq!(d.validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_no_stages() {
        assert_eq!(def(vec![]).validate(), Err(ValidationError::NoStages));
    }

    #[test]
    fn test_interaction_before_navigate() {
        let d = def(vec![
            Stage::Click {
                role: Role::CartButton,
            },
            navigate(),
        ]);
        assert_eq!(
            d.validate(),
            Err(ValidationError::InteractionBeforeNavigate(0))
        );
    }

    #[test]
    fn test_plain_wait_before_navigate_is_fine() {
        let d = def(vec![
            Stage::Wait {
                delay_ms: 5,
                role: None,
            },
            navigate(),
            Stage::Click {
                role: Role::CartButton,
            },
        ]);
        assert_eq!(d.validate(), Ok(()));
    }

    #[test]
    fn test_self_scoped_pick() {
        let d = def(vec![
            navigate(),
            Stage::PickAndClick {
                role: Role::ProductSummary,
                within: Some(Role::ProductSummary),
            },
        ]);
        assert!(matches!(d.validate(), Err(ValidationError::SelfScoped(1, _))));
    }

    #[test]
    fn test_must_end_with_click() {
        let d = def(vec![
            navigate(),
            Stage::Wait {
                delay_ms: 500,
                role: None,
            },
        ]);
        assert_eq!(d.validate(), Err(ValidationError::NoTerminalClick("wait")));
    }
}
