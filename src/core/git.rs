//! Git probes backing the publish guard.

use std::path::Path;
use std::process::Command;

use crate::error::Result;
use crate::utils::command;

/// Check if a git working directory has no uncommitted changes.
///
/// Uses direct Command execution to properly handle empty output (clean
/// tree). A captured-output helper that treats empty stdout as failure
/// would report a clean repo as dirty.
pub fn is_workdir_clean(path: &Path) -> bool {
    let output = Command::new("git")
        .args(["status", "--porcelain"])
        .current_dir(path)
        .output();

    match output {
        Ok(o) if o.status.success() => o.stdout.is_empty(),
        _ => false, // Command failed = assume not clean (conservative)
    }
}

/// Name of the currently checked-out branch.
pub fn current_branch(path: &Path) -> Result<String> {
    command::run_captured(path, "git", &["rev-parse", "--abbrev-ref", "HEAD"], "git rev-parse")
}

pub(crate) fn is_git_repo(path: &Path) -> bool {
    command::succeeded_in(path, "git", &["rev-parse", "--git-dir"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_repo_directory_is_not_clean() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(!is_git_repo(tmp.path()));
        assert!(!is_workdir_clean(tmp.path()));
    }
}
