use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Cargo not found. Install Rust from https://www.rust-lang.org/tools/install")]
    ToolchainNotFound,

    #[error("Publish blocked: {0}")]
    PublishBlocked(String),

    #[error("Unrecognized action: {0}")]
    InvalidAction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    CommandFailed(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::ToolchainNotFound => "toolchain.not_found",
            Error::PublishBlocked(_) => "publish.blocked",
            Error::InvalidAction(_) => "request.invalid_action",
            Error::Io(_) => "internal.io_error",
            Error::CommandFailed(_) => "command.failed",
            Error::Other(_) => "error",
        }
    }

    /// Process exit code for a fatal error. Precondition failures exit
    /// with 2, everything else with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ToolchainNotFound | Error::PublishBlocked(_) | Error::InvalidAction(_) => 2,
            Error::Io(_) | Error::CommandFailed(_) | Error::Other(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_errors_exit_with_2() {
        assert_eq!(Error::ToolchainNotFound.exit_code(), 2);
        assert_eq!(Error::PublishBlocked("dirty tree".to_string()).exit_code(), 2);
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(Error::ToolchainNotFound.code(), "toolchain.not_found");
        assert_eq!(
            Error::InvalidAction("deploy".to_string()).code(),
            "request.invalid_action"
        );
    }
}
