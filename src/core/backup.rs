//! Source snapshots via an external tar invocation.
//!
//! The pipeline only consumes the pass/fail signal; archiving mechanics
//! live entirely in the child process.

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{Error, Result};
use crate::toolchain::StepOutcome;
use crate::utils::command;

/// Archive path for a snapshot of `project_dir` taken at `timestamp`.
/// The archive lands next to the project directory, never inside it.
pub fn destination(project_dir: &Path, timestamp: &str) -> PathBuf {
    parent_of(project_dir).join(format!("{}-backup-{}.tar.gz", dir_name(project_dir), timestamp))
}

/// Snapshot the source tree, asking for confirmation first unless
/// `no_confirm` is set.
///
/// A declined prompt reports `Failed` without touching the filesystem;
/// callers decide whether that gates anything. Build artifacts and git
/// metadata are excluded from the archive.
pub fn snapshot(project_dir: &Path, no_confirm: bool) -> Result<StepOutcome> {
    let timestamp = Utc::now().format("%Y%m%d-%H%M%S").to_string();
    let dest = destination(project_dir, &timestamp);

    if !no_confirm && !confirm(&dest)? {
        crate::log_status!("backup", "Backup declined");
        return Ok(StepOutcome::Failed);
    }

    crate::log_status!("backup", "Archiving source tree to {}", dest.display());

    let dest = dest.to_string_lossy().into_owned();
    let parent = parent_of(project_dir).to_string_lossy().into_owned();
    let name = dir_name(project_dir);
    let args = [
        "--exclude",
        "target",
        "--exclude",
        ".git",
        "-czf",
        dest.as_str(),
        "-C",
        parent.as_str(),
        name.as_str(),
    ];

    let success = command::run_status(Path::new("tar"), &args, project_dir, &[])?;
    Ok(StepOutcome::from_success(success))
}

fn confirm(dest: &Path) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        return Err(Error::Other(
            "backup needs interactive confirmation; pass --noconfirm for unattended runs"
                .to_string(),
        ));
    }

    eprint!("Back up source tree to {}? [y/N] ", dest.display());
    std::io::stderr().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES"))
}

fn dir_name(project_dir: &Path) -> String {
    project_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "source".to_string())
}

fn parent_of(project_dir: &Path) -> &Path {
    project_dir.parent().unwrap_or_else(|| Path::new("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_is_a_sibling_archive() {
        let dest = destination(Path::new("/srv/engine"), "20260830-120000");
        assert_eq!(
            dest,
            PathBuf::from("/srv/engine-backup-20260830-120000.tar.gz")
        );
    }

    #[test]
    fn destination_for_bare_directory_name() {
        let dest = destination(Path::new("engine"), "ts");
        assert_eq!(dest, PathBuf::from("engine-backup-ts.tar.gz"));
    }
}
