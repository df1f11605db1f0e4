//! Project-scoped GitLab endpoint addresses.

use urlencoding::encode;

use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resources {
    address: String,
}

impl Resources {
    pub fn new(config: &Config) -> Self {
        Self::from_parts(&config.host, &config.api_version, &config.project_id)
    }

    /// The project id may be numeric or a `group/project` path.
    pub fn from_parts(host: &str, api_version: &str, project_id: &str) -> Self {
        Self {
            address: format!(
                "{}/api/{}/projects/{}",
                host.trim_end_matches('/'),
                api_version,
                encode(project_id)
            ),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Open issues carrying every label in `labels`.
    pub fn issues_with_labels(&self, labels: &[&str]) -> String {
        format!(
            "{}/issues?labels={}&state=opened",
            self.address,
            join_encoded(labels)
        )
    }

    pub fn issue(&self, iid: &str) -> String {
        format!("{}/issues/{}", self.address, encode(iid))
    }

    pub fn issue_notes(&self, iid: &str) -> String {
        format!("{}/issues/{}/notes?sort=asc", self.address, encode(iid))
    }

    /// Replaces the issue's labels with `labels`.
    pub fn issue_labels<S: AsRef<str>>(&self, iid: &str, labels: &[S]) -> String {
        let labels: Vec<&str> = labels.iter().map(AsRef::as_ref).collect();
        format!(
            "{}/issues/{}?labels={}",
            self.address,
            encode(iid),
            join_encoded(&labels)
        )
    }

    /// A user id of `0` removes all assignees.
    pub fn assign_issue(&self, iid: &str, user_id: u64) -> String {
        format!(
            "{}/issues/{}?assignee_ids={}",
            self.address,
            encode(iid),
            user_id
        )
    }

    pub fn users_by_name(&self, username: &str) -> String {
        format!("{}/users?username={}", self.address, encode(username))
    }

    /// Newest first. `query` is an already-encoded query string, possibly empty.
    pub fn pipelines(&self, query: &str) -> String {
        if query.is_empty() {
            format!("{}/pipelines?sort=desc", self.address)
        } else {
            format!("{}/pipelines?sort=desc&{}", self.address, query)
        }
    }

    /// `query` is an already-encoded query string, possibly empty.
    pub fn branches(&self, query: &str) -> String {
        if query.is_empty() {
            format!("{}/repository/branches", self.address)
        } else {
            format!("{}/repository/branches?{}", self.address, query)
        }
    }

    pub fn boards(&self) -> String {
        format!("{}/boards", self.address)
    }

    pub fn open_merge_requests(&self) -> String {
        format!("{}/merge_requests?state=opened", self.address)
    }

    pub fn merge_request(&self, iid: &str) -> String {
        format!("{}/merge_requests/{}", self.address, encode(iid))
    }

    pub fn merge_request_notes(&self, iid: &str) -> String {
        format!(
            "{}/merge_requests/{}/notes?sort=asc&order_by=updated_at",
            self.address,
            encode(iid)
        )
    }

    pub fn merge_request_discussions(&self, iid: &str) -> String {
        format!(
            "{}/merge_requests/{}/discussions",
            self.address,
            encode(iid)
        )
    }

    pub fn discussion_notes(&self, iid: &str, discussion_id: &str) -> String {
        format!(
            "{}/merge_requests/{}/discussions/{}/notes",
            self.address,
            encode(iid),
            encode(discussion_id)
        )
    }
}

fn join_encoded(values: &[&str]) -> String {
    values
        .iter()
        .map(|value| encode(value).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}
