// CLI subcommand dispatch.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};

use hgnotify_hook::config::{repo_config_path, GlobalConfig, NotifySettings, Overrides, RepoConfig};
use hgnotify_hook::hg::HgWorker;

use crate::output::OutputFormat;

pub mod commit;
pub mod install;
pub mod payload;

/// Hook name used by `install` and for settings lookup when none is given.
pub const DEFAULT_HOOK_NAME: &str = "hgnotify";

#[derive(Subcommand)]
pub enum Command {
    /// Notify the build server about a commit (run by hg as a `commit` hook)
    Commit(commit::CommitArgs),
    /// Show the notification a revision would produce, without sending it
    Payload(payload::PayloadArgs),
    /// Register (or remove) the commit hook in a repository's .hg/hgrc
    Install(install::InstallArgs),
}

impl Command {
    /// Format used to report a failure of this command.
    pub fn output_format(&self) -> OutputFormat {
        match self {
            Command::Payload(args) => args.output_format(),
            Command::Commit(_) | Command::Install(_) => OutputFormat::Human,
        }
    }
}

pub fn run(cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Commit(args) => commit::run(args),
        Command::Payload(args) => payload::run(args),
        Command::Install(args) => install::run(args),
    }
}

/// Repository selection plus the two deployment values, shared by the
/// commands that talk to the build server.
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Repository root or any directory inside it
    #[arg(short = 'R', long = "repository", default_value = ".")]
    pub repository: PathBuf,

    /// Build server root URL; notifications go to `{base-url}mercurial/notifyCommit`
    #[arg(long, env = "HGNOTIFY_BASE_URL")]
    pub base_url: Option<String>,

    /// Repository URL reported to the build server (defaults to the file:// URL of the root)
    #[arg(long, env = "HGNOTIFY_REPO_URL")]
    pub repo_url: Option<String>,

    /// Use the `[hooks.<name>]` settings from .hg/hgnotify.toml
    #[arg(long = "hook", value_name = "NAME")]
    pub hook_name: Option<String>,
}

impl TargetArgs {
    fn overrides(&self) -> Overrides {
        Overrides { base_url: self.base_url.clone(), repo_url: self.repo_url.clone() }
    }

    /// Locate the repository root and resolve settings against its config
    /// files. The hook table is picked by `--hook`, then `fallback_hook`,
    /// then [`DEFAULT_HOOK_NAME`]. The returned worker runs in the root.
    pub fn resolve(
        &self,
        fallback_hook: Option<&str>,
    ) -> anyhow::Result<(HgWorker, NotifySettings)> {
        let root = HgWorker::new(&self.repository)
            .root()
            .with_context(|| format!("no hg repository at {}", self.repository.display()))?;
        let hook = self.hook_name.as_deref().or(fallback_hook).unwrap_or(DEFAULT_HOOK_NAME);
        let settings = load_settings(&self.overrides(), &root, hook)?;
        Ok((HgWorker::new(root), settings))
    }
}

fn load_settings(
    overrides: &Overrides,
    root: &Path,
    hook: &str,
) -> anyhow::Result<NotifySettings> {
    let repo_config = RepoConfig::load(root)
        .with_context(|| format!("failed to read {}", repo_config_path(root).display()))?;
    let global_config = GlobalConfig::load().context("failed to read global hgnotify config")?;
    let scoped = repo_config.for_hook(Some(hook));
    Ok(NotifySettings::resolve(overrides, &scoped, &global_config, root)?)
}
