// Configuration files for the commit hook.
//
// Global config: `~/.hgnotify/config.toml`
// Repository config: `<root>/.hg/hgnotify.toml`
//
// Precedence: explicit overrides (flags / env) > repository > global > defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Root directory for hgnotify global state: `~/.hgnotify/`.
pub fn global_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".hgnotify"))
}

/// Path to the global config file: `~/.hgnotify/config.toml`.
pub fn global_config_path() -> Option<PathBuf> {
    global_dir().map(|d| d.join("config.toml"))
}

/// Path to the repository config file: `<root>/.hg/hgnotify.toml`.
pub fn repo_config_path(repo_root: &Path) -> PathBuf {
    repo_root.join(".hg").join("hgnotify.toml")
}

// ── Global config ──────────────────────────────────────────────────

/// Global configuration at `~/.hgnotify/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Build server root URL used when a repository does not set one.
    pub base_url: Option<String>,
}

impl GlobalConfig {
    /// Load from `~/.hgnotify/config.toml`. A missing file (or no home
    /// directory) yields defaults; a malformed file is an error.
    pub fn load() -> Result<Self, ConfigError> {
        match global_config_path() {
            Some(path) => load_or_default(&path),
            None => Ok(Self::default()),
        }
    }
}

// ── Repository config ──────────────────────────────────────────────

/// Per-repository configuration at `<root>/.hg/hgnotify.toml`.
///
/// Top-level values apply to every hook in the repository. A
/// `[hooks.<name>]` table overrides them for the hook registered as
/// `commit.<name>`:
///
/// ```toml
/// base_url = "http://ci.example.com/"
///
/// [hooks.staging]
/// base_url = "http://ci-staging.example.com/"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Build server root URL; the hook posts to `{base_url}mercurial/notifyCommit`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Repository URL reported to the build server.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub hooks: BTreeMap<String, HookConfig>,
}

/// Settings for one named hook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct HookConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
}

impl RepoConfig {
    /// Load from `<root>/.hg/hgnotify.toml`. Returns defaults if the file
    /// doesn't exist.
    pub fn load(repo_root: &Path) -> Result<Self, ConfigError> {
        load_or_default(&repo_config_path(repo_root))
    }

    /// Save to `<root>/.hg/hgnotify.toml`.
    pub fn save(&self, repo_root: &Path) -> Result<(), ConfigError> {
        save_toml(self, &repo_config_path(repo_root))
    }

    /// Values in effect for the hook `name`: its own table first, then the
    /// top level. Blank values count as unset.
    pub fn for_hook(&self, name: Option<&str>) -> HookConfig {
        let scoped = name.and_then(|name| self.hooks.get(name));
        HookConfig {
            base_url: first_non_blank([
                scoped.and_then(|hook| hook.base_url.as_deref()),
                self.base_url.as_deref(),
            ]),
            repo_url: first_non_blank([
                scoped.and_then(|hook| hook.repo_url.as_deref()),
                self.repo_url.as_deref(),
            ]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.base_url.is_none() && self.repo_url.is_none() && self.hooks.is_empty()
    }
}

fn load_or_default<T>(path: &Path) -> Result<T, ConfigError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).map_err(ConfigError::Parse),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(error) => Err(ConfigError::Io(error)),
    }
}

fn save_toml<T: Serialize>(value: &T, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
    }
    let contents = toml::to_string_pretty(value).map_err(ConfigError::Serialize)?;
    std::fs::write(path, contents).map_err(ConfigError::Io)
}

// ── Resolved settings ──────────────────────────────────────────────

/// Values given explicitly for this invocation (command-line flags or
/// their environment variables).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub repo_url: Option<String>,
}

/// Everything the notifier needs, after applying precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifySettings {
    pub base_url: String,
    pub repo_url: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error(
        "no build server URL configured; pass --base-url, set HGNOTIFY_BASE_URL, \
         or add base_url to .hg/hgnotify.toml"
    )]
    MissingBaseUrl,

    #[error("cannot derive a file URL from repository root `{}`", .0.display())]
    InvalidRepoRoot(PathBuf),
}

impl NotifySettings {
    /// Apply precedence, with `repo` already narrowed to one hook by
    /// [`RepoConfig::for_hook`]. Blank values count as unset. Without a configured
    /// repository URL the `file://` URL of `repo_root` is reported.
    pub fn resolve(
        overrides: &Overrides,
        repo: &HookConfig,
        global: &GlobalConfig,
        repo_root: &Path,
    ) -> Result<Self, SettingsError> {
        let base_url = first_non_blank([
            overrides.base_url.as_deref(),
            repo.base_url.as_deref(),
            global.base_url.as_deref(),
        ])
        .ok_or(SettingsError::MissingBaseUrl)?;

        let repo_url = match first_non_blank([
            overrides.repo_url.as_deref(),
            repo.repo_url.as_deref(),
        ]) {
            Some(url) => url,
            None => repo_file_url(repo_root)?,
        };

        Ok(Self { base_url, repo_url })
    }
}

/// `file://` URL of a repository root, with a trailing slash.
pub fn repo_file_url(repo_root: &Path) -> Result<String, SettingsError> {
    Url::from_directory_path(repo_root)
        .map(String::from)
        .map_err(|()| SettingsError::InvalidRepoRoot(repo_root.to_path_buf()))
}

fn first_non_blank<const N: usize>(candidates: [Option<&str>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

// ── Errors ─────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config I/O error: {e}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::Serialize(e) => write!(f, "config serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
