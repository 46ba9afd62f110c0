//! Compose CLI implementation of the stack backend.
//!
//! All `docker compose` invocation and output parsing is contained here;
//! callers only see the typed [`StackBackend`] operations.

use crate::backend::{Health, ServiceState, StackBackend};
use crate::{Error, Result};
use async_trait::async_trait;
use command_runner::{Command, ExitResult, LocalRunner};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

/// Stack backend driving the `docker compose` CLI
pub struct ComposeStack {
    runner: LocalRunner,
    compose_file: Option<PathBuf>,
    project: Option<String>,
}

/// One row of `docker compose ps --format json` output
#[derive(Debug, Deserialize)]
struct PsEntry {
    #[serde(rename = "Service", default)]
    service: String,
    #[serde(rename = "State", default)]
    state: String,
    #[serde(rename = "Health", default)]
    health: String,
}

impl ComposeStack {
    /// Create a backend for the given compose file and project name
    ///
    /// `None` values defer to the compose CLI's own defaults (compose file
    /// discovery, directory-derived project name).
    pub fn new(compose_file: Option<PathBuf>, project: Option<String>) -> Self {
        Self {
            runner: LocalRunner::new("compose-stack"),
            compose_file,
            project,
        }
    }

    /// Base `docker compose` command with file and project flags applied
    fn base_command(&self) -> Command {
        let mut cmd = Command::new("docker");
        cmd.arg("compose");
        if let Some(file) = &self.compose_file {
            cmd.arg("-f").arg(file);
        }
        if let Some(project) = &self.project {
            cmd.arg("-p").arg(project);
        }
        cmd
    }

    /// Run a compose command, mapping any failure to a backend error for `op`
    async fn run_checked(&self, cmd: &Command, op: &str) -> Result<ExitResult> {
        let result = self.runner.run(cmd).await.map_err(|e| Error::Backend {
            op: op.to_string(),
            reason: e.to_string(),
        })?;

        if !result.success() {
            return Err(Error::Backend {
                op: op.to_string(),
                reason: format!(
                    "exit code {:?}: {}",
                    result.status.code,
                    result.stderr_trimmed()
                ),
            });
        }

        Ok(result)
    }

    /// Parse one-name-per-line output into a service list, order preserved
    fn parse_service_lines(output: &str) -> Vec<String> {
        output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl StackBackend for ComposeStack {
    async fn list_services(&self) -> Result<Vec<String>> {
        let mut cmd = self.base_command();
        cmd.args(["config", "--services"]);

        // A failure here means the descriptor is unreadable; distinct from
        // ordinary backend errors so the caller aborts before filtering.
        let result = self
            .run_checked(&cmd, "config --services")
            .await
            .map_err(|e| Error::CatalogUnavailable {
                reason: e.to_string(),
            })?;

        Ok(Self::parse_service_lines(&result.stdout))
    }

    async fn list_running(&self) -> Result<Vec<String>> {
        let mut cmd = self.base_command();
        cmd.args(["ps", "--services", "--status", "running"]);

        let result = self.run_checked(&cmd, "ps --services").await?;
        Ok(Self::parse_service_lines(&result.stdout))
    }

    async fn pull_images(&self, services: &[String]) -> Result<()> {
        let mut cmd = self.base_command();
        cmd.arg("pull").args(services);

        self.run_checked(&cmd, "pull").await?;
        Ok(())
    }

    async fn recreate_services(&self, services: &[String], force_recreate: bool) -> Result<()> {
        let mut cmd = self.base_command();
        // --no-deps keeps the recreate scoped to the targets; dependencies
        // that are already running must not be restarted along with them.
        cmd.args(["up", "-d", "--no-deps"]);
        if force_recreate {
            cmd.arg("--force-recreate");
        }
        cmd.args(services);

        self.run_checked(&cmd, "up (recreate)").await?;
        Ok(())
    }

    async fn stop_all(&self) -> Result<()> {
        let mut cmd = self.base_command();
        cmd.arg("stop");

        self.run_checked(&cmd, "stop").await?;
        Ok(())
    }

    async fn start_all(&self, services: &[String], force_recreate: bool) -> Result<()> {
        let mut cmd = self.base_command();
        cmd.args(["up", "-d"]);
        if force_recreate {
            cmd.arg("--force-recreate");
        }
        cmd.args(services);

        self.run_checked(&cmd, "up").await?;
        Ok(())
    }

    async fn service_state(&self, service: &str) -> Result<ServiceState> {
        let mut cmd = self.base_command();
        // -a so exited containers show up as a row instead of no output.
        cmd.args(["ps", "-a", "--format", "json"]).arg(service);

        let result = self.run_checked(&cmd, "ps").await?;
        let state = parse_ps_output(&result.stdout, service)?;
        debug!(service, ?state, "queried service state");
        Ok(state)
    }
}

/// Parse `docker compose ps --format json` output for one service.
///
/// Newer compose releases emit one JSON object per line; older ones emit a
/// single JSON array. A service with no container at all produces no row,
/// which reads as stopped.
fn parse_ps_output(output: &str, service: &str) -> Result<ServiceState> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Ok(ServiceState::stopped());
    }

    let entries: Vec<PsEntry> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).map_err(|e| Error::Backend {
            op: "ps".to_string(),
            reason: format!("unparseable ps output: {}", e),
        })?
    } else {
        trimmed
            .lines()
            .map(|line| {
                serde_json::from_str(line).map_err(|e| Error::Backend {
                    op: "ps".to_string(),
                    reason: format!("unparseable ps line: {}", e),
                })
            })
            .collect::<Result<Vec<PsEntry>>>()?
    };

    let entry = entries
        .iter()
        .find(|e| e.service == service)
        .or_else(|| entries.first());

    let Some(entry) = entry else {
        return Ok(ServiceState::stopped());
    };

    Ok(ServiceState {
        running: entry.state == "running",
        health: parse_health(&entry.health),
    })
}

fn parse_health(health: &str) -> Option<Health> {
    match health {
        "healthy" => Some(Health::Healthy),
        "unhealthy" => Some(Health::Unhealthy),
        "starting" => Some(Health::Starting),
        _ => None,
    }
}
