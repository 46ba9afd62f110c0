//! # Stack orchestration
//!
//! Core pipeline for restarting services of a compose-managed stack:
//! precondition guard, catalog resolution, service selection, restart
//! strategy execution and readiness waiting. The container engine is
//! reached only through the narrow [`StackBackend`] trait, so the whole
//! pipeline can be exercised against a fake backend.
//!
//! ## Example
//!
//! ```rust,no_run
//! use stack_orchestration::{
//!     ComposeStack, ExecutionMode, FilterSpec, RestartModifiers, RestartStrategy,
//!     execute_strategy, select_targets,
//! };
//!
//! # async fn example() -> stack_orchestration::Result<()> {
//! let backend = ComposeStack::new(None, Some("mystack".to_string()));
//! let targets = select_targets(&backend, &FilterSpec::default()).await?;
//! execute_strategy(
//!     &backend,
//!     &targets,
//!     RestartStrategy::Rolling,
//!     RestartModifiers::default(),
//!     ExecutionMode::DryRun,
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod compose;
mod guard;
mod plan;
mod readiness;
mod selector;
mod strategy;

pub use backend::{Health, ServiceState, StackBackend};
pub use compose::ComposeStack;
pub use guard::check_required_mount;
pub use plan::{ExecutionMode, ExecutionPlan, PlannedAction};
pub use readiness::{
    CancelToken, Canceller, ReadinessRecord, ReadyState, WaitOptions, WaitOutcome, wait_ready,
};
pub use selector::{FilterSpec, select, select_targets};
pub use strategy::{RestartModifiers, RestartPhase, RestartStrategy, execute_strategy};

use std::path::PathBuf;

/// Error types for stack orchestration operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Required storage mount is not mounted
    #[error("required mount '{path}' is not present; aborting before any change")]
    MountNotPresent {
        /// Path that was expected to be a mountpoint
        path: PathBuf,
    },

    /// The mount probe itself could not run
    #[error("could not check mount '{path}': {reason}")]
    MountCheckFailed {
        /// Path that was being probed
        path: PathBuf,
        /// Why the probe failed
        reason: String,
    },

    /// Stack descriptor could not be read or listed
    #[error("could not resolve service catalog: {reason}")]
    CatalogUnavailable {
        /// Backend-reported reason
        reason: String,
    },

    /// Filters produced an empty target set
    #[error("no services selected; declared services are: {}", catalog.join(", "))]
    NoServicesSelected {
        /// Full catalog, surfaced so the operator can correct the filters
        catalog: Vec<String>,
    },

    /// A backend query or mutation failed
    #[error("backend {op} failed: {reason}")]
    Backend {
        /// The backend operation that failed
        op: String,
        /// Backend-reported reason
        reason: String,
    },

    /// A restart strategy action failed; no rollback is attempted
    #[error("restart failed while {phase}: {reason}")]
    Execution {
        /// The strategy phase reached when the failure occurred
        phase: RestartPhase,
        /// Backend-reported reason
        reason: String,
    },

    /// One or more services never reached a ready state within the deadline
    #[error("timed out waiting for services to become ready: {}", services.join(", "))]
    ReadinessTimeout {
        /// Services still pending when the deadline passed
        services: Vec<String>,
    },

    /// The readiness wait was cancelled by the operator
    #[error("readiness wait interrupted before all services were ready")]
    WaitInterrupted,

    /// Command runner errors
    #[error("command execution error: {0}")]
    Runner(#[from] command_runner::Error),
}

/// Result type alias for orchestration operations
pub type Result<T> = std::result::Result<T, Error>;
