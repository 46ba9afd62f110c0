//! The narrow interface to the container-orchestration engine.
//!
//! Everything the pipeline needs from the engine is expressed here as typed
//! operations; the fragile command construction and output parsing live
//! behind this trait, not in the decision logic.

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Health classification reported by the engine for one service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    /// Health check is passing
    Healthy,
    /// Health check is failing
    Unhealthy,
    /// Health check has not delivered a verdict yet
    Starting,
}

/// Point-in-time state of one service's container
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceState {
    /// Whether a container for the service is currently running
    pub running: bool,
    /// Health status, when the service has a health check configured
    pub health: Option<Health>,
}

impl ServiceState {
    /// A service with no container running
    pub fn stopped() -> Self {
        Self {
            running: false,
            health: None,
        }
    }
}

/// Operations the pipeline needs from the stack's container engine
///
/// Implemented by [`crate::ComposeStack`] for real stacks and by scripted
/// fakes in tests.
#[async_trait]
pub trait StackBackend: Send + Sync {
    /// List every service declared by the stack descriptor, in declaration order
    async fn list_services(&self) -> Result<Vec<String>>;

    /// List the services that currently have a running container
    async fn list_running(&self) -> Result<Vec<String>>;

    /// Pull the images for the given services
    async fn pull_images(&self, services: &[String]) -> Result<()>;

    /// Recreate the given services in place, leaving the rest of the stack untouched
    async fn recreate_services(&self, services: &[String], force_recreate: bool) -> Result<()>;

    /// Stop every service of the stack
    async fn stop_all(&self) -> Result<()>;

    /// Start services back up; an empty slice means the whole stack
    async fn start_all(&self, services: &[String], force_recreate: bool) -> Result<()>;

    /// Query the current container state of one service
    async fn service_state(&self, service: &str) -> Result<ServiceState>;
}
