// Commit notifier: one blocking form POST to the build server per commit.
//
// The sequence is linear: look up the branch, build the payload, encode,
// send, drop the response. Every failure propagates to the hook caller;
// nothing is retried.

use std::time::Duration;

use hgnotify_common::endpoint::{notify_commit_url, EndpointError};
use hgnotify_common::payload::{NotificationPayload, PayloadError, FORM_CONTENT_TYPE};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::hg::{BranchLookup, HgError};
use crate::hook::CommitEvent;

const USER_AGENT: &str = concat!("hgnotify/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("branch lookup failed: {0}")]
    Hg(#[from] HgError),

    #[error("commit notification failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct CommitNotifier {
    endpoint: Url,
    repo_url: String,
    client: Client,
}

impl CommitNotifier {
    pub fn new(base_url: &str, repo_url: impl Into<String>) -> Result<Self, NotifyError> {
        let endpoint = notify_commit_url(base_url)?;
        let client = Client::builder().timeout(None::<Duration>).user_agent(USER_AGENT).build()?;
        Ok(Self { endpoint, repo_url: repo_url.into(), client })
    }

    /// `{base_url}mercurial/notifyCommit`
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    /// Build the payload for `node` without sending it.
    pub fn payload<R>(&self, repo: &R, node: &str) -> Result<NotificationPayload, NotifyError>
    where
        R: BranchLookup + ?Sized,
    {
        let branch = repo.branch(node)?;
        Ok(NotificationPayload::new(self.repo_url.as_str(), branch, node)?)
    }

    /// POST the payload. HTTP error statuses are failures. The response body
    /// is read to completion and dropped without being decoded.
    pub fn send(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        let body = payload.to_form_body();
        debug!(endpoint = %self.endpoint, %body, "posting commit notification");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()?
            .error_for_status()?;

        let status = response.status();
        let discarded = response.bytes()?;
        debug!(status = status.as_u16(), bytes = discarded.len(), "notify response discarded");
        Ok(())
    }

    pub fn notify<R>(&self, repo: &R, event: &CommitEvent) -> Result<(), NotifyError>
    where
        R: BranchLookup + ?Sized,
    {
        if !event.extras.is_empty() {
            debug!(extras = ?event.extras.keys().collect::<Vec<_>>(), "ignoring extra hook arguments");
        }

        let payload = self.payload(repo, &event.node)?;
        self.send(&payload)
    }
}
