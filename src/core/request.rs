use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// One named pipeline phase.
///
/// The set of recognized actions is closed. Requesting an action says
/// nothing about order: the orchestrator always executes in the fixed
/// declaration order below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Check,
    Test,
    Build,
    Run,
    Backup,
    Publish,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Check,
        Action::Test,
        Action::Build,
        Action::Run,
        Action::Backup,
        Action::Publish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Check => "check",
            Action::Test => "test",
            Action::Build => "build",
            Action::Run => "run",
            Action::Backup => "backup",
            Action::Publish => "publish",
        }
    }

    /// Parse an action token. Used as the clap value parser so unknown
    /// tokens are rejected at the CLI boundary.
    pub fn parse(token: &str) -> Result<Action> {
        match token {
            "check" => Ok(Action::Check),
            "test" => Ok(Action::Test),
            "build" => Ok(Action::Build),
            "run" => Ok(Action::Run),
            "backup" => Ok(Action::Backup),
            "publish" => Ok(Action::Publish),
            other => Err(Error::InvalidAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which actions were requested for one pipeline evaluation, plus the
/// modifiers and pass-through arguments that travel with them.
///
/// Membership is the only semantics of `actions`; duplicates collapse.
/// `binary_args` is built exclusively from tokens after the `--`
/// separator and is forwarded verbatim to the `run` action.
#[derive(Debug, Clone, Default)]
pub struct ActionRequest {
    pub actions: BTreeSet<Action>,
    pub release: bool,
    pub no_confirm: bool,
    pub binary_args: Vec<String>,
}

impl ActionRequest {
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        ActionRequest {
            actions: actions.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn wants(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_recognizes_every_action() {
        for action in Action::ALL {
            assert_eq!(Action::parse(action.as_str()).unwrap(), action);
        }
    }

    #[test]
    fn parse_rejects_unknown_tokens() {
        let err = Action::parse("deploy").unwrap_err();
        assert_eq!(err.code(), "request.invalid_action");
    }

    #[test]
    fn duplicate_actions_collapse() {
        let request = ActionRequest::new([Action::Test, Action::Test, Action::Check]);
        assert_eq!(request.actions.len(), 2);
        assert!(request.wants(Action::Check));
        assert!(request.wants(Action::Test));
        assert!(!request.wants(Action::Publish));
    }

    #[test]
    fn empty_request() {
        let request = ActionRequest::default();
        assert!(request.is_empty());
        assert!(!request.wants(Action::Run));
    }
}
