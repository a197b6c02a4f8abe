// Notification payload: the three fields posted to the build server on commit.

mod form;

use serde::Serialize;
use thiserror::Error;

pub use form::FORM_CONTENT_TYPE;

/// Form field carrying the repository URL.
pub const FIELD_URL: &str = "url";
/// Form field carrying the branch name.
pub const FIELD_BRANCH: &str = "branch";
/// Form field carrying the changeset id.
pub const FIELD_CHANGESET_ID: &str = "changesetId";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("notification field `{0}` is empty")]
    EmptyField(&'static str),
}

/// A commit notification, built fresh for one hook invocation.
///
/// Every field is guaranteed non-blank once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    url: String,
    branch: String,
    changeset_id: String,
}

impl NotificationPayload {
    pub fn new(
        url: impl Into<String>,
        branch: impl Into<String>,
        changeset_id: impl Into<String>,
    ) -> Result<Self, PayloadError> {
        let url = require_non_blank(FIELD_URL, url.into())?;
        let branch = require_non_blank(FIELD_BRANCH, branch.into())?;
        let changeset_id = require_non_blank(FIELD_CHANGESET_ID, changeset_id.into())?;
        Ok(Self { url, branch, changeset_id })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn changeset_id(&self) -> &str {
        &self.changeset_id
    }

    /// Field name/value pairs in wire order.
    pub fn fields(&self) -> [(&'static str, &str); 3] {
        [
            (FIELD_URL, self.url.as_str()),
            (FIELD_BRANCH, self.branch.as_str()),
            (FIELD_CHANGESET_ID, self.changeset_id.as_str()),
        ]
    }

    /// Encode as an `application/x-www-form-urlencoded` body.
    pub fn to_form_body(&self) -> String {
        form::encode_pairs(self.fields())
    }
}

fn require_non_blank(field: &'static str, value: String) -> Result<String, PayloadError> {
    if value.trim().is_empty() {
        return Err(PayloadError::EmptyField(field));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NotificationPayload {
        NotificationPayload::new("http://hg.example.com/repo", "default", "abc123")
            .expect("sample payload should be valid")
    }

    #[test]
    fn encodes_reference_example() {
        assert_eq!(
            sample().to_form_body(),
            "url=http%3A%2F%2Fhg.example.com%2Frepo&branch=default&changesetId=abc123"
        );
    }

    #[test]
    fn fields_keep_wire_order() {
        let names: Vec<&str> = sample().fields().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["url", "branch", "changesetId"]);
    }

    #[test]
    fn rejects_empty_url() {
        let err = NotificationPayload::new("", "default", "abc123").unwrap_err();
        assert_eq!(err, PayloadError::EmptyField("url"));
    }

    #[test]
    fn rejects_whitespace_branch() {
        let err = NotificationPayload::new("file:///repo", "  \n", "abc123").unwrap_err();
        assert_eq!(err, PayloadError::EmptyField("branch"));
    }

    #[test]
    fn rejects_empty_changeset_id() {
        let err = NotificationPayload::new("file:///repo", "default", "").unwrap_err();
        assert_eq!(err, PayloadError::EmptyField("changesetId"));
        assert_eq!(err.to_string(), "notification field `changesetId` is empty");
    }

    #[test]
    fn keeps_values_verbatim() {
        let payload = NotificationPayload::new(" file:///repo", "stable", "abc123").unwrap();
        assert_eq!(payload.url(), " file:///repo");
        assert_eq!(payload.branch(), "stable");
        assert_eq!(payload.changeset_id(), "abc123");
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["url"], "http://hg.example.com/repo");
        assert_eq!(json["branch"], "default");
        assert_eq!(json["changesetId"], "abc123");
        assert!(json.get("changeset_id").is_none());
    }
}
