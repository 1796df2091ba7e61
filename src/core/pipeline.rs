//! The fixed-order release pipeline.
//!
//! Actions run in the order check -> test -> build -> run -> backup ->
//! publish. An action runs only when requested; absence is a no-op. A
//! failing gated action ends the run immediately. `run` and standalone
//! `backup` are the only non-gating steps: their failures are recorded
//! and the pipeline moves on.

use serde::Serialize;

use crate::error::Result;
use crate::matrix::{self, FeatureCombination, MatrixOutcome};
use crate::request::{Action, ActionRequest};
use crate::toolchain::{StepOutcome, ToolchainRunner};

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub action: Action,
    pub outcome: StepOutcome,
}

/// Record of one pipeline evaluation.
///
/// `halted` is set when a gated step failed and later requested actions
/// were abandoned. There is no partial-success recovery: completed
/// external side effects (a finished build, a written backup) stay as
/// they are.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineRun {
    pub steps: Vec<StepReport>,
    pub halted: bool,
}

impl PipelineRun {
    fn record(&mut self, action: Action, outcome: StepOutcome) -> StepOutcome {
        self.steps.push(StepReport { action, outcome });
        outcome
    }

    fn halt(mut self) -> Self {
        self.halted = true;
        self
    }

    pub fn exit_code(&self) -> i32 {
        if self.halted {
            1
        } else {
            0
        }
    }
}

/// Evaluate one request against the fixed action sequence.
///
/// The toolchain must already be discovered: `runner` is handed in, never
/// looked up here. Errors (guard refusal, impossible invocations)
/// propagate immediately; step failures come back as a halted
/// [`PipelineRun`].
pub fn run(
    request: &ActionRequest,
    combinations: &[FeatureCombination],
    runner: &dyn ToolchainRunner,
) -> Result<PipelineRun> {
    let mut report = PipelineRun::default();

    if request.wants(Action::Check) {
        let outcome = check_matrix(runner, combinations)?;
        if !report.record(Action::Check, outcome).passed() {
            return Ok(report.halt());
        }
    }

    if request.wants(Action::Test) {
        crate::log_status!(
            "test",
            "Running test suite{}",
            if request.release { " (release)" } else { "" }
        );
        let outcome = runner.test(request.release)?;
        if !report.record(Action::Test, outcome).passed() {
            return Ok(report.halt());
        }
    }

    if request.wants(Action::Build) {
        crate::log_status!("build", "Building release binary");
        let outcome = runner.build()?;
        if !report.record(Action::Build, outcome).passed() {
            return Ok(report.halt());
        }
    }

    if request.wants(Action::Run) {
        crate::log_status!("run", "Running release binary");
        let outcome = runner.run(&request.binary_args)?;
        report.record(Action::Run, outcome);
    }

    if request.wants(Action::Backup) {
        let outcome = runner.backup(request.no_confirm)?;
        report.record(Action::Backup, outcome);
    }

    if request.wants(Action::Publish) {
        let outcome = publish(runner, combinations, request.no_confirm)?;
        if !report.record(Action::Publish, outcome).passed() {
            return Ok(report.halt());
        }
    }

    Ok(report)
}

/// Full publish preflight followed by the publish itself.
///
/// The preflight is unconditional: reaching publish re-validates the
/// matrix, re-runs the tests and takes a backup whether or not those
/// actions were requested on their own. Each preflight step is a hard
/// gate, and the preflight test run never uses the release profile.
fn publish(
    runner: &dyn ToolchainRunner,
    combinations: &[FeatureCombination],
    no_confirm: bool,
) -> Result<StepOutcome> {
    runner.assert_publish_allowed()?;

    if !check_matrix(runner, combinations)?.passed() {
        return Ok(StepOutcome::Failed);
    }

    crate::log_status!("test", "Running test suite");
    if !runner.test(false)?.passed() {
        return Ok(StepOutcome::Failed);
    }

    if !runner.backup(no_confirm)?.passed() {
        return Ok(StepOutcome::Failed);
    }

    crate::log_status!("publish", "Publishing package");
    runner.publish()
}

fn check_matrix(
    runner: &dyn ToolchainRunner,
    combinations: &[FeatureCombination],
) -> Result<StepOutcome> {
    crate::log_status!(
        "check",
        "Validating {} feature combinations",
        combinations.len()
    );

    match matrix::validate(runner, combinations)? {
        MatrixOutcome::Clean => Ok(StepOutcome::Passed),
        MatrixOutcome::Failed { combination, .. } => {
            crate::log_status!("check", "Feature combination failed: {}", combination.label());
            Ok(StepOutcome::Failed)
        }
    }
}
