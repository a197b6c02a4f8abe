// `hgnotify install` — register the commit hook in `.hg/hgrc` and record
// its build server in `.hg/hgnotify.toml` under `[hooks.<name>]`, so hooks
// with different names keep separate settings.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::info;

use hgnotify_common::endpoint::notify_commit_url;
use hgnotify_hook::config::{repo_config_path, HookConfig, RepoConfig};
use hgnotify_hook::hg::HgWorker;

use super::DEFAULT_HOOK_NAME;
use crate::hgrc;

#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Repository root or any directory inside it
    #[arg(short = 'R', long = "repository", default_value = ".")]
    repository: PathBuf,

    /// Build server root URL
    #[arg(long, env = "HGNOTIFY_BASE_URL", required_unless_present = "remove")]
    base_url: Option<String>,

    /// Repository URL reported to the build server (defaults to the file:// URL of the root)
    #[arg(long, env = "HGNOTIFY_REPO_URL")]
    repo_url: Option<String>,

    /// Hook name; the hgrc key is `commit.<name>`
    #[arg(long, default_value = DEFAULT_HOOK_NAME)]
    name: String,

    /// Command hg should run (defaults to this executable followed by `commit`)
    #[arg(long)]
    command: Option<String>,

    /// Remove a previously installed hook
    #[arg(long)]
    remove: bool,
}

pub fn run(args: InstallArgs) -> anyhow::Result<()> {
    let root = HgWorker::new(&args.repository)
        .root()
        .with_context(|| format!("no hg repository at {}", args.repository.display()))?;

    if args.remove {
        return remove_hook(&root, &args.name);
    }

    let base_url = args.base_url.unwrap_or_default();
    notify_commit_url(&base_url)?;

    let command = match args.command {
        Some(command) => command,
        None => default_hook_command()?,
    };
    let settings = HookConfig { base_url: Some(base_url), repo_url: args.repo_url };
    install_hook(&root, &args.name, &command, &settings)
}

// ── Public API (for testing) ────────────────────────────────────────

pub fn install_hook(
    repo_root: &Path,
    name: &str,
    command: &str,
    settings: &HookConfig,
) -> anyhow::Result<()> {
    let config_path = repo_config_path(repo_root);
    let mut config = load_repo_config(repo_root)?;
    if let Some(previous) = config.hooks.get(name).filter(|previous| *previous != settings) {
        eprintln!(
            "Replacing settings for `{name}` (base_url was {})",
            previous.base_url.as_deref().unwrap_or("unset")
        );
    }
    config.hooks.insert(name.to_string(), settings.clone());
    config.save(repo_root).with_context(|| format!("failed to write {}", config_path.display()))?;

    let hgrc_path = hgrc_path(repo_root);
    let key = hgrc::commit_hook_key(name);
    let content = read_hgrc(&hgrc_path)?;
    if let Some(previous) = hgrc::get_hook(&content, &key).filter(|previous| previous != command) {
        eprintln!("Replacing `{key}` (was: {previous})");
    }
    fs::write(&hgrc_path, hgrc::set_hook(&content, &key, command))
        .with_context(|| format!("failed to write {}", hgrc_path.display()))?;

    info!(hook = %key, %command, "installed commit hook");
    eprintln!("Hook `{key}` installed into {}", hgrc_path.display());
    eprintln!("Build server settings written to {}", config_path.display());
    Ok(())
}

/// Remove the hgrc entry and the `[hooks.<name>]` table of one hook. The
/// config file goes away only once nothing is left in it.
pub fn remove_hook(repo_root: &Path, name: &str) -> anyhow::Result<()> {
    let hgrc_path = hgrc_path(repo_root);
    let key = hgrc::commit_hook_key(name);

    if hgrc_path.exists() {
        let (content, removed) = hgrc::remove_hook(&read_hgrc(&hgrc_path)?, &key);
        if removed {
            fs::write(&hgrc_path, content)
                .with_context(|| format!("failed to write {}", hgrc_path.display()))?;
            eprintln!("Removed hook `{key}` from {}", hgrc_path.display());
        }
    }

    let config_path = repo_config_path(repo_root);
    let mut config = load_repo_config(repo_root)?;
    if config.hooks.remove(name).is_some() {
        if config.is_empty() {
            fs::remove_file(&config_path)
                .with_context(|| format!("failed to remove {}", config_path.display()))?;
            eprintln!("Removed {}", config_path.display());
        } else {
            config
                .save(repo_root)
                .with_context(|| format!("failed to write {}", config_path.display()))?;
            eprintln!("Removed `{name}` settings from {}", config_path.display());
        }
    }

    info!(hook = %key, "removed commit hook");
    Ok(())
}

fn load_repo_config(repo_root: &Path) -> anyhow::Result<RepoConfig> {
    RepoConfig::load(repo_root)
        .with_context(|| format!("failed to read {}", repo_config_path(repo_root).display()))
}

fn hgrc_path(repo_root: &Path) -> PathBuf {
    repo_root.join(".hg").join("hgrc")
}

fn read_hgrc(path: &Path) -> anyhow::Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(error) => Err(error).with_context(|| format!("failed to read {}", path.display())),
    }
}

fn default_hook_command() -> anyhow::Result<String> {
    let exe = std::env::current_exe().context("cannot locate the hgnotify executable")?;
    Ok(format!("{} commit", shell_quote(&exe.to_string_lossy())))
}

/// hg runs hooks through the shell; quote paths that need it.
fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word.chars().all(|c| c.is_ascii_alphanumeric() || "/._-+:=@,%".contains(c));
    if plain {
        return word.to_string();
    }
    if cfg!(windows) {
        return format!("\"{word}\"");
    }
    format!("'{}'", word.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_repo() -> TempDir {
        let dir = tempfile::tempdir().expect("should create temp dir");
        fs::create_dir_all(dir.path().join(".hg")).unwrap();
        dir
    }

    fn settings(base_url: &str) -> HookConfig {
        HookConfig {
            base_url: Some(base_url.into()),
            repo_url: Some("http://hg.example.com/repo".into()),
        }
    }

    fn config() -> HookConfig {
        settings("http://ci.example.com/")
    }

    #[test]
    fn install_writes_hgrc_and_config() {
        let repo = temp_repo();
        install_hook(repo.path(), "hgnotify", "/usr/local/bin/hgnotify commit", &config()).unwrap();

        let hgrc = fs::read_to_string(repo.path().join(".hg/hgrc")).unwrap();
        assert_eq!(hgrc, "[hooks]\ncommit.hgnotify = /usr/local/bin/hgnotify commit\n");
        assert_eq!(RepoConfig::load(repo.path()).unwrap().hooks["hgnotify"], config());
    }

    #[test]
    fn install_preserves_existing_hgrc() {
        let repo = temp_repo();
        let existing = "[paths]\ndefault = ssh://hg@example.com/repo\n\n[hooks]\nprecommit = check\n";
        fs::write(repo.path().join(".hg/hgrc"), existing).unwrap();

        install_hook(repo.path(), "jenkins", "hgnotify commit", &config()).unwrap();

        let hgrc = fs::read_to_string(repo.path().join(".hg/hgrc")).unwrap();
        assert!(hgrc.starts_with(existing));
        assert_eq!(hgrc::get_hook(&hgrc, "commit.jenkins").as_deref(), Some("hgnotify commit"));
    }

    #[test]
    fn reinstall_replaces_command() {
        let repo = temp_repo();
        install_hook(repo.path(), "hgnotify", "old commit", &config()).unwrap();
        install_hook(repo.path(), "hgnotify", "new commit", &config()).unwrap();

        let hgrc = fs::read_to_string(repo.path().join(".hg/hgrc")).unwrap();
        assert_eq!(hgrc.matches("commit.hgnotify").count(), 1);
        assert_eq!(hgrc::get_hook(&hgrc, "commit.hgnotify").as_deref(), Some("new commit"));
    }

    #[test]
    fn remove_strips_hook_and_config() {
        let repo = temp_repo();
        fs::write(repo.path().join(".hg/hgrc"), "[hooks]\nprecommit = check\n").unwrap();
        install_hook(repo.path(), "hgnotify", "hgnotify commit", &config()).unwrap();

        remove_hook(repo.path(), "hgnotify").unwrap();

        let hgrc = fs::read_to_string(repo.path().join(".hg/hgrc")).unwrap();
        assert_eq!(hgrc, "[hooks]\nprecommit = check\n");
        assert!(!repo_config_path(repo.path()).exists());
    }

    #[test]
    fn hooks_with_different_names_keep_their_own_settings() {
        let repo = temp_repo();
        install_hook(repo.path(), "a", "hgnotify commit", &settings("http://ci-a/")).unwrap();
        install_hook(repo.path(), "b", "hgnotify commit", &settings("http://ci-b/")).unwrap();

        let config = RepoConfig::load(repo.path()).unwrap();
        assert_eq!(config.for_hook(Some("a")).base_url.as_deref(), Some("http://ci-a/"));
        assert_eq!(config.for_hook(Some("b")).base_url.as_deref(), Some("http://ci-b/"));

        remove_hook(repo.path(), "a").unwrap();

        let hgrc = fs::read_to_string(repo.path().join(".hg/hgrc")).unwrap();
        assert_eq!(hgrc, "[hooks]\ncommit.b = hgnotify commit\n");
        let config = RepoConfig::load(repo.path()).unwrap();
        assert!(!config.hooks.contains_key("a"));
        assert_eq!(config.for_hook(Some("b")).base_url.as_deref(), Some("http://ci-b/"));

        remove_hook(repo.path(), "b").unwrap();
        assert!(!repo_config_path(repo.path()).exists());
    }

    #[test]
    fn remove_keeps_shared_top_level_settings() {
        let repo = temp_repo();
        let shared = RepoConfig { base_url: Some("http://ci/".into()), ..RepoConfig::default() };
        shared.save(repo.path()).unwrap();
        install_hook(repo.path(), "a", "hgnotify commit", &settings("http://ci-a/")).unwrap();

        remove_hook(repo.path(), "a").unwrap();

        assert_eq!(RepoConfig::load(repo.path()).unwrap(), shared);
    }

    #[test]
    fn remove_without_install_is_noop() {
        let repo = temp_repo();
        remove_hook(repo.path(), "hgnotify").unwrap();
        assert!(!repo.path().join(".hg/hgrc").exists());
    }

    #[test]
    fn shell_quote_leaves_plain_paths() {
        assert_eq!(shell_quote("/usr/local/bin/hgnotify"), "/usr/local/bin/hgnotify");
    }

    #[cfg(unix)]
    #[test]
    fn shell_quote_wraps_spaces_and_quotes() {
        assert_eq!(shell_quote("/opt/my tools/hgnotify"), "'/opt/my tools/hgnotify'");
        assert_eq!(shell_quote("/opt/it's/hgnotify"), r"'/opt/it'\''s/hgnotify'");
    }
}
