//! Feature matrix validation.
//!
//! Every release must build under each supported feature configuration in
//! isolation. Combinations are checked in a fixed order and the first
//! failure ends the pass; later combinations are not attempted.

use serde::Serialize;

use crate::error::Result;
use crate::toolchain::ToolchainRunner;

/// One build configuration to validate in isolation.
///
/// An empty feature list means "defaults": a plain check with no feature
/// flags at all. Any non-empty list disables default features so the
/// combination is exactly what it names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureCombination {
    features: Vec<String>,
}

impl FeatureCombination {
    pub fn new<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FeatureCombination {
            features: features.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Argument list for the check invocation of this combination.
    pub fn cargo_args(&self) -> Vec<String> {
        if self.is_default() {
            return vec!["check".to_string()];
        }

        vec![
            "check".to_string(),
            "--no-default-features".to_string(),
            "--features".to_string(),
            self.features.join(","),
        ]
    }

    pub fn label(&self) -> String {
        if self.is_default() {
            "default features".to_string()
        } else {
            self.features.join(", ")
        }
    }
}

/// The combinations every release is validated against, in the order they
/// are tried. The matrix is authored here, not configured.
pub fn default_matrix() -> Vec<FeatureCombination> {
    const MATRIX: &[&[&str]] = &[
        &[],
        &["default"],
        &["nnue_reader"],
        &["nnue_reader", "speed"],
        &["inbuilt_nnue"],
        &["inbuilt_nnue", "speed"],
        &["binary"],
        &["binary", "speed"],
        &["binary", "serde"],
        &["binary", "speed", "serde"],
    ];

    MATRIX
        .iter()
        .map(|features| FeatureCombination::new(features.iter().copied()))
        .collect()
}

/// Result of one matrix pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixOutcome {
    Clean,
    Failed {
        index: usize,
        combination: FeatureCombination,
    },
}

impl MatrixOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, MatrixOutcome::Failed { .. })
    }
}

/// Check every combination in input order, stopping at the first failure.
///
/// Each combination is attempted exactly once; combinations after a failed
/// one are never attempted. Errors from the runner (invocation impossible)
/// propagate and also end the pass.
pub fn validate(
    runner: &dyn ToolchainRunner,
    combinations: &[FeatureCombination],
) -> Result<MatrixOutcome> {
    for (index, combination) in combinations.iter().enumerate() {
        crate::log_status!("check", "Checking {}", combination.label());

        if !runner.check(combination)?.passed() {
            return Ok(MatrixOutcome::Failed {
                index,
                combination: combination.clone(),
            });
        }
    }

    Ok(MatrixOutcome::Clean)
}
