//! The external toolchain seam.
//!
//! Everything the pipeline does happens through [`ToolchainRunner`]: one
//! blocking child process per call, observed only through its exit status.
//! [`CargoToolchain`] is the production implementation.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::backup;
use crate::error::{Error, Result};
use crate::git;
use crate::matrix::FeatureCombination;
use crate::utils::command;

/// Compiler flags applied to release builds. Fixed by design; the release
/// artifact always targets the build host.
pub const RELEASE_RUSTFLAGS: &str = "-C target-cpu=native";

const CARGO_BINARY: &str = if cfg!(windows) { "cargo.exe" } else { "cargo" };

/// Outcome of one external invocation.
///
/// `Failed` covers any non-zero or abnormal termination. Errors are
/// reserved for invocations that could not be performed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Passed,
    Failed,
}

impl StepOutcome {
    pub fn passed(self) -> bool {
        matches!(self, StepOutcome::Passed)
    }

    pub(crate) fn from_success(success: bool) -> Self {
        if success {
            StepOutcome::Passed
        } else {
            StepOutcome::Failed
        }
    }
}

/// The external-process interface the orchestrator and the matrix
/// validator depend on. Every call blocks until the child terminates;
/// diagnostic output is the child's side effect, never state held here.
pub trait ToolchainRunner {
    /// Check one feature combination in isolation.
    fn check(&self, combination: &FeatureCombination) -> Result<StepOutcome>;

    /// Run the test suite, optionally against the release profile.
    fn test(&self, release: bool) -> Result<StepOutcome>;

    /// Produce the release build.
    fn build(&self) -> Result<StepOutcome>;

    /// Run the resulting binary, forwarding `binary_args` verbatim.
    fn run(&self, binary_args: &[String]) -> Result<StepOutcome>;

    /// Snapshot the source tree.
    fn backup(&self, no_confirm: bool) -> Result<StepOutcome>;

    /// Publish guard. `Err` means "not allowed" and aborts the caller.
    fn assert_publish_allowed(&self) -> Result<()>;

    /// Publish the package.
    fn publish(&self) -> Result<StepOutcome>;
}

/// Cargo-backed [`ToolchainRunner`] bound to one project directory.
pub struct CargoToolchain {
    cargo: PathBuf,
    project_dir: PathBuf,
}

impl CargoToolchain {
    pub fn new(cargo: PathBuf, project_dir: PathBuf) -> Self {
        CargoToolchain { cargo, project_dir }
    }

    /// Locate cargo and bind the runner to the caller's working directory.
    /// Fails before any pipeline step when the toolchain is absent.
    pub fn discover(project_dir: PathBuf) -> Result<Self> {
        let cargo = find_cargo().ok_or(Error::ToolchainNotFound)?;
        Ok(CargoToolchain::new(cargo, project_dir))
    }

    fn cargo_status(&self, args: &[&str], envs: &[(&str, &str)]) -> Result<StepOutcome> {
        let success = command::run_status(&self.cargo, args, &self.project_dir, envs)?;
        Ok(StepOutcome::from_success(success))
    }
}

impl ToolchainRunner for CargoToolchain {
    fn check(&self, combination: &FeatureCombination) -> Result<StepOutcome> {
        let args = combination.cargo_args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.cargo_status(&args, &[])
    }

    fn test(&self, release: bool) -> Result<StepOutcome> {
        if release {
            self.cargo_status(&["test", "--release"], &[])
        } else {
            self.cargo_status(&["test"], &[])
        }
    }

    fn build(&self) -> Result<StepOutcome> {
        self.cargo_status(&["build", "--release"], &[("RUSTFLAGS", RELEASE_RUSTFLAGS)])
    }

    fn run(&self, binary_args: &[String]) -> Result<StepOutcome> {
        let mut args = vec!["run", "--release"];
        if !binary_args.is_empty() {
            args.push("--");
            args.extend(binary_args.iter().map(String::as_str));
        }
        self.cargo_status(&args, &[])
    }

    fn backup(&self, no_confirm: bool) -> Result<StepOutcome> {
        backup::snapshot(&self.project_dir, no_confirm)
    }

    fn assert_publish_allowed(&self) -> Result<()> {
        if !git::is_git_repo(&self.project_dir) {
            return Err(Error::PublishBlocked("not a git repository".to_string()));
        }
        if !git::is_workdir_clean(&self.project_dir) {
            return Err(Error::PublishBlocked(
                "working tree has uncommitted changes".to_string(),
            ));
        }

        let branch = git::current_branch(&self.project_dir)?;
        if branch != "main" && branch != "master" {
            return Err(Error::PublishBlocked(format!(
                "releases are cut from main or master, not '{}'",
                branch
            )));
        }

        Ok(())
    }

    fn publish(&self) -> Result<StepOutcome> {
        self.cargo_status(&["publish"], &[])
    }
}

// === Toolchain discovery ===

/// Directories to search for a toolchain binary: every entry of the given
/// `PATH` value, in order. Pure; callers append well-known locations
/// themselves instead of mutating the process environment.
pub fn candidate_dirs(path_var: Option<&OsStr>) -> Vec<PathBuf> {
    path_var
        .map(|raw| env::split_paths(raw).collect())
        .unwrap_or_default()
}

/// Find a binary in the given directories. First hit wins.
pub fn locate(binary: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter().map(|dir| dir.join(binary)).find(|p| p.is_file())
}

/// Find cargo on `PATH`, also trying the conventional rustup install
/// location for shells that do not have it on their search path.
pub fn find_cargo() -> Option<PathBuf> {
    let path_var = env::var_os("PATH");
    let mut dirs = candidate_dirs(path_var.as_deref());
    dirs.push(PathBuf::from(shellexpand::tilde("~/.cargo/bin").into_owned()));
    locate(CARGO_BINARY, &dirs)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Invocation {
        Check(Vec<String>),
        Test { release: bool },
        Build,
        Run(Vec<String>),
        Backup { no_confirm: bool },
        Guard,
        Publish,
    }

    /// Scripted stand-in for the cargo toolchain. Records every invocation
    /// and fails exactly the steps it was told to fail.
    #[derive(Default)]
    pub struct ScriptedRunner {
        pub log: RefCell<Vec<Invocation>>,
        /// Fail the nth check invocation (0-based) of this runner's lifetime.
        pub fail_check_at: Option<usize>,
        pub fail_test: bool,
        pub fail_build: bool,
        pub fail_run: bool,
        pub fail_backup: bool,
        pub fail_publish: bool,
        pub block_publish: bool,
    }

    impl ScriptedRunner {
        pub fn invocations(&self) -> Vec<Invocation> {
            self.log.borrow().clone()
        }

        pub fn checks_attempted(&self) -> usize {
            self.log
                .borrow()
                .iter()
                .filter(|call| matches!(call, Invocation::Check(_)))
                .count()
        }

        fn record(&self, invocation: Invocation, failed: bool) -> Result<StepOutcome> {
            self.log.borrow_mut().push(invocation);
            Ok(StepOutcome::from_success(!failed))
        }
    }

    impl ToolchainRunner for ScriptedRunner {
        fn check(&self, combination: &FeatureCombination) -> Result<StepOutcome> {
            let nth = self.checks_attempted();
            self.record(
                Invocation::Check(combination.features().to_vec()),
                self.fail_check_at == Some(nth),
            )
        }

        fn test(&self, release: bool) -> Result<StepOutcome> {
            self.record(Invocation::Test { release }, self.fail_test)
        }

        fn build(&self) -> Result<StepOutcome> {
            self.record(Invocation::Build, self.fail_build)
        }

        fn run(&self, binary_args: &[String]) -> Result<StepOutcome> {
            self.record(Invocation::Run(binary_args.to_vec()), self.fail_run)
        }

        fn backup(&self, no_confirm: bool) -> Result<StepOutcome> {
            self.record(Invocation::Backup { no_confirm }, self.fail_backup)
        }

        fn assert_publish_allowed(&self) -> Result<()> {
            self.log.borrow_mut().push(Invocation::Guard);
            if self.block_publish {
                Err(Error::PublishBlocked("scripted refusal".to_string()))
            } else {
                Ok(())
            }
        }

        fn publish(&self) -> Result<StepOutcome> {
            self.record(Invocation::Publish, self.fail_publish)
        }
    }
}
