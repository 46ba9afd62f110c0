//! Service selection: narrowing the declared catalog to a target set.
//!
//! Filters are set algebra over service names, applied in a fixed order so
//! that exclusion always wins over inclusion.

use crate::backend::StackBackend;
use crate::{Error, Result};
use std::collections::HashSet;
use tracing::debug;

/// Filter chain narrowing the catalog to the services to restart
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    /// Services to keep; empty means the whole catalog
    pub include: HashSet<String>,
    /// Services to drop, regardless of the include list
    pub exclude: HashSet<String>,
    /// Restrict further to services with a running container
    pub running_only: bool,
}

/// Apply the filter chain to the catalog.
///
/// Steps, in order: include-restrict (empty include keeps everything),
/// exclude-subtract, running-only intersect. Filter tokens naming no
/// catalog member are ignored; this is set intersection, not an existence
/// assertion. Catalog order is preserved in the result. An empty result is
/// an error carrying the full catalog.
///
/// `running` is only consulted when `spec.running_only` is set.
pub fn select(
    catalog: &[String],
    spec: &FilterSpec,
    running: Option<&HashSet<String>>,
) -> Result<Vec<String>> {
    let mut targets: Vec<String> = catalog
        .iter()
        .filter(|name| spec.include.is_empty() || spec.include.contains(*name))
        .filter(|name| !spec.exclude.contains(*name))
        .cloned()
        .collect();

    if spec.running_only {
        match running {
            Some(running) => targets.retain(|name| running.contains(name)),
            None => targets.clear(),
        }
    }

    if targets.is_empty() {
        return Err(Error::NoServicesSelected {
            catalog: catalog.to_vec(),
        });
    }

    debug!(?targets, "selected target services");
    Ok(targets)
}

/// Resolve the catalog from the backend and apply the filter chain.
///
/// The running set is queried only when the filter asks for it.
pub async fn select_targets(
    backend: &dyn StackBackend,
    spec: &FilterSpec,
) -> Result<Vec<String>> {
    let catalog = backend.list_services().await?;

    let running = if spec.running_only {
        Some(backend.list_running().await?.into_iter().collect())
    } else {
        None
    };

    select(&catalog, spec, running.as_ref())
}
