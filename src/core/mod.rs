// Public modules
pub mod backup;
pub mod error;
pub mod git;
pub mod matrix;
pub mod pipeline;
pub mod request;
pub mod toolchain;

// Re-export common types for convenience
pub use error::{Error, Result};
pub use matrix::{FeatureCombination, MatrixOutcome};
pub use pipeline::{PipelineRun, StepReport};
pub use request::{Action, ActionRequest};
pub use toolchain::{CargoToolchain, StepOutcome, ToolchainRunner};
