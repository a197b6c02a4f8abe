// Hook invocation contract.
//
// Mercurial runs external hooks with the changeset in `HG_NODE` and
// everything else it knows about the event in further `HG_*` variables
// (`HG_PARENT1`, `HG_PARENT2`, `HG_HOOKNAME`, `HG_HOOKTYPE`, ...).

use std::collections::BTreeMap;

use thiserror::Error;

const ENV_PREFIX: &str = "HG_";
const NODE_VAR: &str = "HG_NODE";
const HOOKNAME_EXTRA: &str = "hookname";
const COMMIT_HOOK_PREFIX: &str = "commit.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HookError {
    #[error("no changeset id: HG_NODE is not set (is this running as a commit hook?)")]
    MissingNode,

    #[error("changeset id must not be blank")]
    BlankNode,
}

/// One commit event as delivered to the hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEvent {
    pub node: String,
    /// Remaining hook arguments, keyed without the `HG_` prefix and
    /// lower-cased. Carried for diagnostics only; the notifier ignores them.
    pub extras: BTreeMap<String, String>,
}

impl CommitEvent {
    pub fn new(node: impl Into<String>) -> Self {
        Self { node: node.into(), extras: BTreeMap::new() }
    }

    pub fn from_env() -> Result<Self, HookError> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, HookError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut node = None;
        let mut extras = BTreeMap::new();

        for (key, value) in vars {
            let key = key.as_ref();
            if key == NODE_VAR {
                node = Some(value.into());
            } else if let Some(name) = key.strip_prefix(ENV_PREFIX) {
                extras.insert(name.to_ascii_lowercase(), value.into());
            }
        }

        let node = node
            .filter(|node: &String| !node.trim().is_empty())
            .ok_or(HookError::MissingNode)?;
        Ok(Self { node, extras })
    }

    /// Event for an explicitly named changeset, e.g. from `--node`.
    pub fn for_node(node: impl Into<String>) -> Result<Self, HookError> {
        Self::new(String::new()).with_node(node)
    }

    /// Replace the node, keeping the extras.
    pub fn with_node(mut self, node: impl Into<String>) -> Result<Self, HookError> {
        let node = node.into();
        if node.trim().is_empty() {
            return Err(HookError::BlankNode);
        }
        self.node = node;
        Ok(self)
    }

    /// Name the hook was registered under, from `HG_HOOKNAME`
    /// (`commit.jenkins` gives `jenkins`). A bare `commit` hook has none.
    pub fn hook_name(&self) -> Option<&str> {
        self.extras
            .get(HOOKNAME_EXTRA)
            .and_then(|name| name.strip_prefix(COMMIT_HOOK_PREFIX))
            .filter(|name| !name.is_empty())
    }
}
