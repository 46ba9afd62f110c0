//! Execution plans and the live/dry-run mode switch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether mutating actions are executed or only described
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Invoke the backend for every action
    Live,
    /// Record and describe every action, never invoke the backend
    DryRun,
}

impl ExecutionMode {
    /// True in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        matches!(self, ExecutionMode::DryRun)
    }
}

/// One atomic mutating action against the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlannedAction {
    /// Pull images for the given services
    PullImages {
        /// Services whose images are refreshed
        services: Vec<String>,
    },
    /// Recreate the given services in place
    RecreateServices {
        /// Services to recreate
        services: Vec<String>,
        /// Replace containers even when their configuration is unchanged
        force_recreate: bool,
    },
    /// Stop the entire stack
    StopStack,
    /// Start services back up; empty list means the whole stack
    StartStack {
        /// Services to start, empty for all
        services: Vec<String>,
        /// Replace containers even when their configuration is unchanged
        force_recreate: bool,
    },
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannedAction::PullImages { services } => {
                write!(f, "pull images for {}", services.join(", "))
            }
            PlannedAction::RecreateServices {
                services,
                force_recreate,
            } => {
                write!(f, "recreate {}", services.join(", "))?;
                if *force_recreate {
                    write!(f, " (forced)")?;
                }
                Ok(())
            }
            PlannedAction::StopStack => write!(f, "stop the entire stack"),
            PlannedAction::StartStack {
                services,
                force_recreate,
            } => {
                if services.is_empty() {
                    write!(f, "start the entire stack")?;
                } else {
                    write!(f, "start {}", services.join(", "))?;
                }
                if *force_recreate {
                    write!(f, " (forced recreate)")?;
                }
                Ok(())
            }
        }
    }
}

/// Ordered record of the actions a run decided on.
///
/// The plan is recorded identically in live and dry-run mode; only whether
/// each action was dispatched to the backend differs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    actions: Vec<PlannedAction>,
}

impl ExecutionPlan {
    /// Append an action to the plan
    pub fn push(&mut self, action: PlannedAction) {
        self.actions.push(action);
    }

    /// The recorded actions, in decision order
    pub fn actions(&self) -> &[PlannedAction] {
        &self.actions
    }

    /// Number of recorded actions
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// True when no actions were recorded
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_targets() {
        let action = PlannedAction::RecreateServices {
            services: vec!["api".to_string(), "db".to_string()],
            force_recreate: true,
        };
        assert_eq!(action.to_string(), "recreate api, db (forced)");
    }

    #[test]
    fn display_start_all() {
        let action = PlannedAction::StartStack {
            services: vec![],
            force_recreate: false,
        };
        assert_eq!(action.to_string(), "start the entire stack");
    }
}
