//! Process-invocation primitives with consistent error handling.

use std::path::Path;
use std::process::{Command, Output, Stdio};

use crate::error::{Error, Result};

/// Run a command with inherited stdio, blocking until it exits.
///
/// Returns whether the command exited successfully. Failure to spawn at
/// all (binary missing, permission denied) is an error, not a `false`.
pub fn run_status(
    program: &Path,
    args: &[&str],
    dir: &Path,
    envs: &[(&str, &str)],
) -> Result<bool> {
    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(dir);
    for (key, value) in envs {
        cmd.env(key, value);
    }

    let status = cmd.status().map_err(|e| {
        Error::CommandFailed(format!("failed to run {}: {}", program.display(), e))
    })?;

    Ok(status.success())
}

/// Run a command in a directory, capturing output.
///
/// Returns trimmed stdout if the command succeeds.
/// Returns an error with stderr (or stdout fallback) if it fails.
pub fn run_captured(dir: &Path, program: &str, args: &[&str], context: &str) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::CommandFailed(format!("failed to run {}: {}", context, e)))?;

    if !output.status.success() {
        return Err(Error::CommandFailed(format!(
            "{} failed: {}",
            context,
            error_text(&output)
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Check if a command succeeds in a directory, discarding all output.
pub fn succeeded_in(dir: &Path, program: &str, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Extract error text from command output.
///
/// Prefers stderr, falls back to stdout if stderr is empty.
fn error_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        stderr.trim().to_string()
    } else {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_status_reports_success_and_failure() {
        let dir = std::env::temp_dir();
        assert!(run_status(Path::new("true"), &[], &dir, &[]).unwrap());
        assert!(!run_status(Path::new("false"), &[], &dir, &[]).unwrap());
    }

    #[test]
    fn run_status_fails_for_missing_binary() {
        let dir = std::env::temp_dir();
        let result = run_status(Path::new("nonexistent_command_xyz"), &[], &dir, &[]);
        assert!(result.is_err());
    }

    #[test]
    fn run_captured_returns_trimmed_stdout() {
        let dir = std::env::temp_dir();
        let result = run_captured(&dir, "echo", &["hello"], "echo test");
        assert_eq!(result.unwrap(), "hello");
    }

    #[test]
    fn run_captured_fails_with_invalid_command() {
        let dir = std::env::temp_dir();
        let result = run_captured(&dir, "nonexistent_command_xyz", &[], "test");
        assert!(result.is_err());
    }

    #[test]
    fn succeeded_in_reflects_exit_status() {
        let dir = std::env::temp_dir();
        assert!(succeeded_in(&dir, "true", &[]));
        assert!(!succeeded_in(&dir, "false", &[]));
    }
}
