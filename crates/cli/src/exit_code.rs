// Consistent exit codes for the hgnotify CLI.
//
//   0  = success
//   1  = general error
//   2  = usage/argument error (including a missing HG_NODE)
//   10 = an hg command failed
//   11 = configuration error
//   13 = network or HTTP error
//
// Mercurial reports a non-zero `commit` hook status as a warning; the
// commit itself is already recorded.

use std::process;

use hgnotify_common::endpoint::EndpointError;
use hgnotify_hook::config::{ConfigError, SettingsError};
use hgnotify_hook::hg::HgError;
use hgnotify_hook::hook::HookError;
use hgnotify_hook::notifier::NotifyError;

/// Named exit codes for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    Error = 1,
    Usage = 2,
    Hg = 10,
    Config = 11,
    Network = 13,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Stable machine-readable label, used as the error code in output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::Error => "ERROR",
            Self::Usage => "USAGE",
            Self::Hg => "HG_FAILED",
            Self::Config => "CONFIG_ERROR",
            Self::Network => "NETWORK_ERROR",
        }
    }

    /// Map an anyhow error to an exit code by inspecting the error chain.
    pub fn from_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(notify_err) = cause.downcast_ref::<NotifyError>() {
                return match notify_err {
                    NotifyError::Endpoint(_) => Self::Config,
                    NotifyError::Payload(_) => Self::Error,
                    NotifyError::Hg(_) => Self::Hg,
                    NotifyError::Http(_) => Self::Network,
                };
            }
            if cause.is::<HgError>() {
                return Self::Hg;
            }
            if cause.is::<HookError>() {
                return Self::Usage;
            }
            if cause.is::<SettingsError>()
                || cause.is::<ConfigError>()
                || cause.is::<EndpointError>()
            {
                return Self::Config;
            }
            if cause.is::<reqwest::Error>() {
                return Self::Network;
            }
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>() {
                return match io_err.kind() {
                    std::io::ErrorKind::ConnectionRefused | std::io::ErrorKind::TimedOut => {
                        Self::Network
                    }
                    _ => Self::Error,
                };
            }
        }

        Self::Error
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code.code() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn exit_code_values() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::Error.code(), 1);
        assert_eq!(ExitCode::Usage.code(), 2);
        assert_eq!(ExitCode::Hg.code(), 10);
        assert_eq!(ExitCode::Config.code(), 11);
        assert_eq!(ExitCode::Network.code(), 13);
    }

    #[test]
    fn missing_node_is_usage() {
        let err = anyhow::Error::new(HookError::MissingNode);
        assert_eq!(ExitCode::from_error(&err), ExitCode::Usage);
    }

    #[test]
    fn hg_failure_behind_context_is_hg() {
        let err: anyhow::Result<()> = Err(HgError::EmptyRevision).context("reading branch");
        assert_eq!(ExitCode::from_error(&err.unwrap_err()), ExitCode::Hg);
    }

    #[test]
    fn notify_errors_map_by_variant() {
        let hg = anyhow::Error::new(NotifyError::Hg(HgError::EmptyRevision));
        assert_eq!(ExitCode::from_error(&hg), ExitCode::Hg);

        let endpoint = anyhow::Error::new(NotifyError::Endpoint(
            EndpointError::UnsupportedScheme("ftp".into()),
        ));
        assert_eq!(ExitCode::from_error(&endpoint), ExitCode::Config);
    }

    #[test]
    fn missing_base_url_is_config() {
        let err = anyhow::Error::new(SettingsError::MissingBaseUrl);
        assert_eq!(ExitCode::from_error(&err), ExitCode::Config);
    }

    #[test]
    fn connection_refused_io_is_network() {
        let err = anyhow::Error::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        assert_eq!(ExitCode::from_error(&err), ExitCode::Network);
    }

    #[test]
    fn generic_error_is_error() {
        let err = anyhow::anyhow!("something went wrong");
        assert_eq!(ExitCode::from_error(&err), ExitCode::Error);
    }

    #[test]
    fn labels_are_distinct() {
        let labels = [
            ExitCode::Success,
            ExitCode::Error,
            ExitCode::Usage,
            ExitCode::Hg,
            ExitCode::Config,
            ExitCode::Network,
        ]
        .map(ExitCode::label);
        let unique: std::collections::BTreeSet<_> = labels.iter().collect();
        assert_eq!(unique.len(), labels.len());
    }
}
