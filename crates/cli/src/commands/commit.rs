// `hgnotify commit` — the hook itself.
//
// Register as an external hook:
//
//   [hooks]
//   commit.hgnotify = /path/to/hgnotify commit
//
// hg runs it in the repository root with HG_NODE set. HG_HOOKNAME
// (`commit.hgnotify`) selects the `[hooks.hgnotify]` settings table.

use anyhow::Context;
use clap::Args;
use tracing::info;

use hgnotify_hook::hook::{CommitEvent, HookError};
use hgnotify_hook::notifier::CommitNotifier;

use super::TargetArgs;

#[derive(Debug, Args)]
pub struct CommitArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Changeset to announce (defaults to HG_NODE from the hook environment)
    #[arg(long)]
    node: Option<String>,
}

pub fn run(args: CommitArgs) -> anyhow::Result<()> {
    let event = commit_event(CommitEvent::from_env(), args.node)?;
    let (worker, settings) = args.target.resolve(event.hook_name())?;

    let notifier = CommitNotifier::new(&settings.base_url, settings.repo_url)?;
    notifier
        .notify(&worker, &event)
        .with_context(|| format!("failed to notify {}", notifier.endpoint()))?;

    info!(node = %event.node, endpoint = %notifier.endpoint(), "commit notification sent");
    Ok(())
}

fn commit_event(
    from_env: Result<CommitEvent, HookError>,
    node: Option<String>,
) -> anyhow::Result<CommitEvent> {
    let event = match (from_env, node) {
        (Ok(event), Some(node)) => event.with_node(node)?,
        (Ok(event), None) => event,
        (Err(_), Some(node)) => CommitEvent::for_node(node)?,
        (Err(error), None) => return Err(error.into()),
    };
    Ok(event)
}
