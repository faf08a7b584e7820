use cartpath_common::protocol::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where a scenario definition came from; loaded definitions shadow built-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioTier {
    BuiltIn,
    Loaded,
}

fn default_tier() -> ScenarioTier {
    ScenarioTier::Loaded
}

/// A shopper journey as an ordered list of stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    /// Also the name of the fixture the run resolves.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_tier")]
    pub tier: ScenarioTier,
    pub stages: Vec<Stage>,
}

/// One step of a journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    /// Load a page. Relative URLs are joined onto the configured base URL.
    Navigate { url: String },

    /// Let the page settle after the previous action.
    ///
    /// In fixed settle mode this sleeps `delay_ms`. In poll mode, when `role`
    /// is set, it polls until that role matches instead.
    Wait {
        delay_ms: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role: Option<Role>,
    },

    /// Poll until `role` matches, whatever the settle mode.
    WaitFor {
        role: Role,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },

    /// Resolve `role` (inside every `within` element when given), pick one
    /// uniformly and click it.
    PickAndClick {
        role: Role,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        within: Option<Role>,
    },

    /// Resolve a SKU axis, drop the already-selected options and click one of
    /// the rest. Skipped when nothing is selectable.
    PickVariant { role: Role },

    /// Click the first element matching `role`.
    Click { role: Role },
}

impl Stage {
    /// Roles this stage resolves against the live page.
    pub fn roles(&self) -> Vec<Role> {
        match self {
            Stage::Navigate { .. } => vec![],
            Stage::Wait { role, .. } => role.iter().copied().collect(),
            Stage::WaitFor { role, .. } => vec![*role],
            Stage::PickAndClick { role, within } => {
                let mut roles = vec![*role];
                roles.extend(within.iter().copied());
                roles
            }
            Stage::PickVariant { role } | Stage::Click { role } => vec![*role],
        }
    }

    /// Whether this stage ends in a click.
    pub fn is_interaction(&self) -> bool {
        matches!(
            self,
            Stage::PickAndClick { .. } | Stage::PickVariant { .. } | Stage::Click { .. }
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Stage::Navigate { .. } => "navigate",
            Stage::Wait { .. } => "wait",
            Stage::WaitFor { .. } => "wait_for",
            Stage::PickAndClick { .. } => "pick_and_click",
            Stage::PickVariant { .. } => "pick_variant",
            Stage::Click { .. } => "click",
        }
    }
}

impl ScenarioDefinition {
    /// Every role any stage resolves, deduplicated.
    pub fn required_roles(&self) -> BTreeSet<Role> {
        self.stages.iter().flat_map(Stage::roles).collect()
    }
}
