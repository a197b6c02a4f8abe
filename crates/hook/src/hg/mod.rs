// Mercurial access: an `hg` command runner and the branch lookup the notifier needs.

pub mod worker;

pub use worker::{CommandExecutor, CommandResult, HgError, HgWorker, ProcessCommandExecutor};

/// Anything that can name the branch a changeset was committed on.
pub trait BranchLookup {
    fn branch(&self, node: &str) -> Result<String, HgError>;
}
