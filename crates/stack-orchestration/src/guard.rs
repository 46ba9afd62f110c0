//! Precondition guard for the required storage mount.
//!
//! Restarting a stack whose data directory is an unmounted local fallback
//! would let services come up against an empty tree, so the mount is
//! verified before anything else runs.

use crate::{Error, Result};
use command_runner::{Command, LocalRunner};
use std::path::Path;
use tracing::{debug, info};

/// Verify that `path` is currently a mounted filesystem.
///
/// `None` skips the check entirely; that is an explicit operator opt-out,
/// not a default. An absent mount is a hard stop with no retry, since a
/// transient mount race is something the operator has to resolve.
pub async fn check_required_mount(path: Option<&Path>, runner: &LocalRunner) -> Result<()> {
    let Some(path) = path else {
        debug!("mount check disabled, skipping");
        return Ok(());
    };

    let mut cmd = Command::new("mountpoint");
    cmd.arg("-q").arg(path);

    let result = runner.run(&cmd).await.map_err(|e| Error::MountCheckFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    if !result.success() {
        return Err(Error::MountNotPresent {
            path: path.to_path_buf(),
        });
    }

    info!(path = %path.display(), "required mount present");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_when_no_path_configured() {
        smol::block_on(async {
            let runner = LocalRunner::new("guard-test");
            check_required_mount(None, &runner).await.unwrap();
        });
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn accepts_the_root_filesystem() {
        smol::block_on(async {
            let runner = LocalRunner::new("guard-test");
            check_required_mount(Some(Path::new("/")), &runner)
                .await
                .unwrap();
        });
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn rejects_a_plain_directory() {
        smol::block_on(async {
            let dir = tempfile::tempdir().unwrap();
            let runner = LocalRunner::new("guard-test");
            let err = check_required_mount(Some(dir.path()), &runner)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::MountNotPresent { .. }));
        });
    }
}
