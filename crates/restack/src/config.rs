//! Layered runtime settings.
//!
//! Built once at startup from defaults, then environment, then flags; no
//! other component reads ambient state directly.

use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

const ENV_COMPOSE_FILE: &str = "RESTACK_COMPOSE_FILE";
const ENV_PROJECT: &str = "RESTACK_PROJECT";
const ENV_REQUIRED_MOUNT: &str = "RESTACK_REQUIRED_MOUNT";
const ENV_WAIT_TIMEOUT: &str = "RESTACK_WAIT_TIMEOUT";
const ENV_POLL_INTERVAL: &str = "RESTACK_POLL_INTERVAL";

/// Resolved settings for one invocation
#[derive(Debug, Clone)]
pub struct Settings {
    /// Compose file path, if pinned
    pub compose_file: Option<PathBuf>,
    /// Compose project name, if pinned
    pub project: Option<String>,
    /// Storage mount that must be present before mutating anything
    pub required_mount: Option<PathBuf>,
    /// Default deadline for the readiness wait
    pub wait_timeout: Duration,
    /// Default sleep between readiness polling passes
    pub poll_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            compose_file: None,
            project: None,
            required_mount: None,
            wait_timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(5),
        }
    }
}

impl Settings {
    /// Build settings from the process environment and global CLI flags
    pub fn load(file_flag: Option<PathBuf>, project_flag: Option<String>) -> Self {
        let env: Vec<(String, String)> = std::env::vars().collect();
        Self::layered(Self::default(), &env, file_flag, project_flag)
    }

    /// Pure layering: `base` overridden by `env`, overridden by flags
    fn layered(
        base: Self,
        env: &[(String, String)],
        file_flag: Option<PathBuf>,
        project_flag: Option<String>,
    ) -> Self {
        let mut settings = base;

        for (key, value) in env {
            match key.as_str() {
                ENV_COMPOSE_FILE => settings.compose_file = Some(PathBuf::from(value)),
                ENV_PROJECT => settings.project = Some(value.clone()),
                ENV_REQUIRED_MOUNT => settings.required_mount = Some(PathBuf::from(value)),
                ENV_WAIT_TIMEOUT => {
                    settings.wait_timeout = parse_seconds(key, value, settings.wait_timeout);
                }
                ENV_POLL_INTERVAL => {
                    settings.poll_interval = parse_seconds(key, value, settings.poll_interval);
                }
                _ => {}
            }
        }

        if file_flag.is_some() {
            settings.compose_file = file_flag;
        }
        if project_flag.is_some() {
            settings.project = project_flag;
        }

        settings
    }
}

fn parse_seconds(key: &str, value: &str, fallback: Duration) -> Duration {
    match value.parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs),
        Err(_) => {
            warn!(key, value, "ignoring unparseable duration, keeping default");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_are_safe() {
        let settings = Settings::default();
        assert_eq!(settings.wait_timeout, Duration::from_secs(300));
        assert_eq!(settings.poll_interval, Duration::from_secs(5));
        assert!(settings.required_mount.is_none());
    }

    #[test]
    fn env_overrides_defaults() {
        let settings = Settings::layered(
            Settings::default(),
            &env(&[
                ("RESTACK_PROJECT", "mystack"),
                ("RESTACK_REQUIRED_MOUNT", "/mnt/data"),
                ("RESTACK_WAIT_TIMEOUT", "60"),
            ]),
            None,
            None,
        );

        assert_eq!(settings.project.as_deref(), Some("mystack"));
        assert_eq!(
            settings.required_mount,
            Some(PathBuf::from("/mnt/data"))
        );
        assert_eq!(settings.wait_timeout, Duration::from_secs(60));
    }

    #[test]
    fn flags_override_env() {
        let settings = Settings::layered(
            Settings::default(),
            &env(&[
                ("RESTACK_COMPOSE_FILE", "/env/compose.yaml"),
                ("RESTACK_PROJECT", "envproj"),
            ]),
            Some(PathBuf::from("/flag/compose.yaml")),
            Some("flagproj".to_string()),
        );

        assert_eq!(
            settings.compose_file,
            Some(PathBuf::from("/flag/compose.yaml"))
        );
        assert_eq!(settings.project.as_deref(), Some("flagproj"));
    }

    #[test]
    fn bad_duration_keeps_default() {
        let settings = Settings::layered(
            Settings::default(),
            &env(&[("RESTACK_WAIT_TIMEOUT", "soon")]),
            None,
            None,
        );
        assert_eq!(settings.wait_timeout, Duration::from_secs(300));
    }

    #[test]
    fn unrelated_env_is_ignored() {
        let settings = Settings::layered(
            Settings::default(),
            &env(&[("PATH", "/usr/bin"), ("RESTACKX", "nope")]),
            None,
            None,
        );
        assert!(settings.compose_file.is_none());
        assert!(settings.project.is_none());
    }
}
