//! Result value returned by every lifecycle operation.

use std::path::PathBuf;

use serde::Serialize;

/// Which lifecycle operation produced the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Remove,
    Setup,
    Checkout,
}

/// Where `checkout` found the branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutSource {
    Local,
    Remote,
}

/// Immutable summary of a completed lifecycle mutation.
///
/// `created` is set only by `create` and reflects whether the *branch* was
/// newly made, not whether the directory is new (a pre-existing directory is
/// a hard failure earlier). `source` is set only by `checkout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleOutcome {
    pub action: Action,
    pub path: PathBuf,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<CheckoutSource>,
}

impl LifecycleOutcome {
    pub fn new(action: Action, path: PathBuf, branch: impl Into<String>) -> Self {
        Self {
            action,
            path,
            branch: branch.into(),
            created: None,
            source: None,
        }
    }

    pub fn with_created(mut self, created: bool) -> Self {
        self.created = Some(created);
        self
    }

    pub fn with_source(mut self, source: CheckoutSource) -> Self {
        self.source = Some(source);
        self
    }
}
