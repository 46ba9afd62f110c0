//! Restart strategy execution.
//!
//! Turns a target set and a strategy into an ordered sequence of atomic
//! backend actions, then dispatches them one at a time. A failure aborts
//! the remaining actions; the backend is the source of truth for container
//! state, so no rollback is attempted.

use crate::backend::StackBackend;
use crate::plan::{ExecutionMode, ExecutionPlan, PlannedAction};
use crate::{Error, Result};
use std::fmt;
use tracing::info;

/// How the targeted services are restarted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartStrategy {
    /// Recreate only the targeted services, leaving the rest of the stack running
    Rolling,
    /// Stop the entire stack, then start it back up
    Full,
}

/// Optional behavior modifiers applying to either strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestartModifiers {
    /// Replace containers even when their configuration is unchanged
    pub force_recreate: bool,
    /// Pull the targets' images before restarting
    pub refresh_images: bool,
}

/// The strategy state reached when a failure occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPhase {
    /// Pulling images for the target set
    Pulling,
    /// Recreating targeted services in place
    Recreating,
    /// Stopping the entire stack
    StoppingAll,
    /// Starting the stack back up
    StartingAll,
}

impl fmt::Display for RestartPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RestartPhase::Pulling => "pulling images",
            RestartPhase::Recreating => "recreating services",
            RestartPhase::StoppingAll => "stopping the stack",
            RestartPhase::StartingAll => "starting the stack",
        };
        f.write_str(name)
    }
}

impl PlannedAction {
    /// The strategy phase this action belongs to
    pub fn phase(&self) -> RestartPhase {
        match self {
            PlannedAction::PullImages { .. } => RestartPhase::Pulling,
            PlannedAction::RecreateServices { .. } => RestartPhase::Recreating,
            PlannedAction::StopStack => RestartPhase::StoppingAll,
            PlannedAction::StartStack { .. } => RestartPhase::StartingAll,
        }
    }
}

/// Lay out the actions for one run, in dispatch order
fn plan_actions(
    targets: &[String],
    strategy: RestartStrategy,
    modifiers: RestartModifiers,
) -> Vec<PlannedAction> {
    let mut actions = Vec::new();

    if modifiers.refresh_images {
        actions.push(PlannedAction::PullImages {
            services: targets.to_vec(),
        });
    }

    match strategy {
        RestartStrategy::Rolling => actions.push(PlannedAction::RecreateServices {
            services: targets.to_vec(),
            force_recreate: modifiers.force_recreate,
        }),
        RestartStrategy::Full => {
            // Stopping a subset while dependents keep running is unsafe, so
            // the full strategy always cycles the whole stack.
            actions.push(PlannedAction::StopStack);
            actions.push(PlannedAction::StartStack {
                services: Vec::new(),
                force_recreate: modifiers.force_recreate,
            });
        }
    }

    actions
}

async fn dispatch(backend: &dyn StackBackend, action: &PlannedAction) -> Result<()> {
    match action {
        PlannedAction::PullImages { services } => backend.pull_images(services).await,
        PlannedAction::RecreateServices {
            services,
            force_recreate,
        } => backend.recreate_services(services, *force_recreate).await,
        PlannedAction::StopStack => backend.stop_all().await,
        PlannedAction::StartStack {
            services,
            force_recreate,
        } => backend.start_all(services, *force_recreate).await,
    }
}

/// Execute the restart strategy for the target set.
///
/// Every action is recorded into the returned [`ExecutionPlan`] before
/// dispatch, so the decision trace is identical in live and dry-run mode.
/// In dry-run mode the backend is never invoked and the call always
/// succeeds. In live mode the first backend failure aborts the run with
/// the phase it occurred in.
pub async fn execute_strategy(
    backend: &dyn StackBackend,
    targets: &[String],
    strategy: RestartStrategy,
    modifiers: RestartModifiers,
    mode: ExecutionMode,
) -> Result<ExecutionPlan> {
    let mut plan = ExecutionPlan::default();

    for action in plan_actions(targets, strategy, modifiers) {
        plan.push(action.clone());

        if mode.is_dry_run() {
            info!(%action, "dry-run: skipping backend call");
            continue;
        }

        info!(%action, "applying");
        dispatch(backend, &action)
            .await
            .map_err(|e| Error::Execution {
                phase: action.phase(),
                reason: e.to_string(),
            })?;
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rolling_plan_is_a_single_recreate() {
        let actions = plan_actions(
            &targets(&["a"]),
            RestartStrategy::Rolling,
            RestartModifiers::default(),
        );
        assert_eq!(
            actions,
            vec![PlannedAction::RecreateServices {
                services: targets(&["a"]),
                force_recreate: false,
            }]
        );
    }

    #[test]
    fn refresh_images_prepends_a_pull() {
        let actions = plan_actions(
            &targets(&["a", "b"]),
            RestartStrategy::Rolling,
            RestartModifiers {
                refresh_images: true,
                force_recreate: true,
            },
        );
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].phase(), RestartPhase::Pulling);
        assert_eq!(actions[1].phase(), RestartPhase::Recreating);
    }

    #[test]
    fn full_plan_stops_then_starts_everything() {
        let actions = plan_actions(
            &targets(&["a"]),
            RestartStrategy::Full,
            RestartModifiers::default(),
        );
        assert_eq!(
            actions,
            vec![
                PlannedAction::StopStack,
                PlannedAction::StartStack {
                    services: Vec::new(),
                    force_recreate: false,
                },
            ]
        );
    }

    #[test]
    fn force_recreate_reaches_the_start_action() {
        let actions = plan_actions(
            &targets(&["a"]),
            RestartStrategy::Full,
            RestartModifiers {
                force_recreate: true,
                refresh_images: false,
            },
        );
        match &actions[1] {
            PlannedAction::StartStack { force_recreate, .. } => assert!(*force_recreate),
            other => panic!("unexpected action: {other}"),
        }
    }
}
