use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::BranchLookup;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HgError {
    EmptyRevision,
    SpawnFailed { command: String, message: String },
    CommandFailed { command: String, code: Option<i32>, stderr: String },
    EmptyOutput { command: String },
}

impl Display for HgError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HgError::EmptyRevision => write!(f, "hg revision must not be empty"),
            HgError::SpawnFailed { command, message } => {
                write!(f, "failed to run `{command}`: {message}")
            }
            HgError::CommandFailed { command, code, stderr } => {
                write!(f, "`{command}` failed with code {:?}: {}", code, stderr.trim())
            }
            HgError::EmptyOutput { command } => write!(f, "`{command}` printed nothing"),
        }
    }
}

impl Error for HgError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

pub trait CommandExecutor: Send + Sync {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CommandResult, std::io::Error>;
}

/// Runs real `hg` processes. `HGPLAIN` keeps user aliases, defaults and
/// localization from changing the output we parse.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandExecutor;

impl CommandExecutor for ProcessCommandExecutor {
    fn execute(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
    ) -> Result<CommandResult, std::io::Error> {
        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .env("HGPLAIN", "1")
            .env("HGENCODING", "utf-8")
            .output()?;
        Ok(CommandResult {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct HgWorker<E = ProcessCommandExecutor> {
    repo_path: PathBuf,
    executor: E,
}

impl HgWorker<ProcessCommandExecutor> {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self { repo_path: repo_path.into(), executor: ProcessCommandExecutor }
    }
}

impl<E: CommandExecutor> HgWorker<E> {
    pub fn with_executor(repo_path: impl Into<PathBuf>, executor: E) -> Self {
        Self { repo_path: repo_path.into(), executor }
    }

    /// Absolute path of the repository root containing `repo_path`.
    pub fn root(&self) -> Result<PathBuf, HgError> {
        let line = self.single_line(vec!["root".to_string()])?;
        Ok(PathBuf::from(line))
    }

    /// Full changeset hash for a revision (`.`, `tip`, a short hash, ...).
    pub fn resolve_node(&self, rev: &str) -> Result<String, HgError> {
        self.template(rev, "{node}")
    }

    fn template(&self, rev: &str, template: &str) -> Result<String, HgError> {
        let rev = rev.trim();
        if rev.is_empty() {
            return Err(HgError::EmptyRevision);
        }

        self.single_line(vec![
            "log".to_string(),
            "-r".to_string(),
            rev.to_string(),
            "--limit".to_string(),
            "1".to_string(),
            "--template".to_string(),
            template.to_string(),
        ])
    }

    fn single_line(&self, args: Vec<String>) -> Result<String, HgError> {
        let command = format!("hg {}", args.join(" "));
        let stdout = self.run(args)?;
        let line = stdout.trim();
        if line.is_empty() {
            return Err(HgError::EmptyOutput { command });
        }
        Ok(line.to_string())
    }

    /// Run hg and return its stdout; a non-zero exit becomes `CommandFailed`.
    fn run(&self, args: Vec<String>) -> Result<String, HgError> {
        let command = format!("hg {}", args.join(" "));
        debug!(%command, cwd = %self.repo_path.display(), "running hg");
        let result = self.executor.execute("hg", &args, &self.repo_path).map_err(|error| {
            HgError::SpawnFailed { command: command.clone(), message: error.to_string() }
        })?;

        if result.success {
            return Ok(result.stdout);
        }

        let stderr = if result.stderr.trim().is_empty() { result.stdout } else { result.stderr };

        Err(HgError::CommandFailed { command, code: result.code, stderr })
    }
}

impl<E: CommandExecutor> BranchLookup for HgWorker<E> {
    /// Branch name recorded on `node`.
    fn branch(&self, node: &str) -> Result<String, HgError> {
        self.template(node, "{branch}")
    }
}
