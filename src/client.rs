//! GitLab-compatible issue service client.
//!
//! Two calls are wrapped: issue creation and time-estimate attachment.
//! Neither is idempotent — re-sending a create request makes a duplicate
//! ticket, so callers must not retry blindly.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::errors::ServiceError;

/// Label unconditionally prepended to every created issue.
pub const IMPROVEMENT_LABEL: &str = "Improvement";

/// A created issue. The service-assigned `iid` is the join key every
/// downstream step (folder, renames, notification) is driven by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedIssue {
    pub iid: i64,
}

/// Response from the issue creation endpoint (subset of fields we care about).
#[derive(Debug, Deserialize)]
struct IssueResponse {
    iid: i64,
}

/// The remote issue service, abstracted for testing.
#[async_trait]
pub trait IssueService {
    /// Create an issue and return its service-assigned id.
    async fn create_issue(
        &self,
        title: &str,
        labels: &[String],
    ) -> Result<CreatedIssue, ServiceError>;

    /// Attach a time estimate. A zero `hours` value makes no request.
    async fn set_time_estimate(&self, iid: i64, hours: u32) -> Result<(), ServiceError>;
}

/// Join labels into the service's comma-separated list format, with
/// `Improvement` always first.
pub fn join_labels(labels: &[String]) -> String {
    std::iter::once(IMPROVEMENT_LABEL)
        .chain(labels.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(",")
}

/// Format an hour count as the service's duration syntax, e.g. `10h`.
pub fn format_duration(hours: u32) -> String {
    format!("{hours}h")
}

/// Client for the GitLab v4 issues API.
pub struct GitLabClient {
    http: reqwest::Client,
    base_url: String,
    project_id: i64,
    token: String,
    description: String,
}

impl GitLabClient {
    /// `description` is the shared issue body, read once from the configured
    /// markdown file and reused verbatim for every created issue.
    pub fn new(base_url: &str, project_id: i64, token: &str, description: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id,
            token: token.to_string(),
            description,
        }
    }

    fn issues_url(&self) -> String {
        format!(
            "{}/api/v4/projects/{}/issues",
            self.base_url, self.project_id
        )
    }
}

/// Keep error bodies readable — services can return whole HTML pages.
fn body_snippet(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        body.chars().take(MAX).collect()
    }
}

#[async_trait]
impl IssueService for GitLabClient {
    async fn create_issue(
        &self,
        title: &str,
        labels: &[String],
    ) -> Result<CreatedIssue, ServiceError> {
        let url = self.issues_url();
        debug!(%url, title, "creating issue");

        let body = serde_json::json!({
            "title": title,
            "description": self.description,
            "labels": join_labels(labels),
        });

        let resp = self
            .http
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&body)
            .send()
            .await
            .map_err(ServiceError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status,
                body: body_snippet(&body),
            });
        }

        let parsed: IssueResponse = resp.json().await.map_err(ServiceError::MalformedResponse)?;
        debug!(iid = parsed.iid, "issue created");
        Ok(CreatedIssue { iid: parsed.iid })
    }

    async fn set_time_estimate(&self, iid: i64, hours: u32) -> Result<(), ServiceError> {
        if hours == 0 {
            return Ok(());
        }

        let url = format!("{}/{}/time_estimate", self.issues_url(), iid);
        debug!(%url, hours, "setting time estimate");

        let resp = self
            .http
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .query(&[("duration", format_duration(hours))])
            .send()
            .await
            .map_err(ServiceError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status,
                body: body_snippet(&body),
            });
        }

        Ok(())
    }
}
