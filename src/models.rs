//! Subsets of the GitLab REST resources the commands read.
//!
//! Only fields that are displayed or acted upon are declared; everything else in
//! the payload is ignored.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Issue {
    pub iid: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `opened` or `closed`.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignee: Option<User>,
    #[serde(default)]
    pub web_url: Option<String>,
}

impl Issue {
    pub fn assignee_username(&self) -> Option<&str> {
        self.assignee.as_ref().map(|user| user.username.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MergeRequest {
    pub iid: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub author: User,
    #[serde(default)]
    pub source_branch: String,
    #[serde(default)]
    pub merge_status: String,
    #[serde(default)]
    pub draft: Option<bool>,
    /// Reported by GitLab versions before `draft` existed.
    #[serde(default)]
    pub work_in_progress: Option<bool>,
    #[serde(default)]
    pub upvotes: u64,
    #[serde(default)]
    pub user_notes_count: u64,
    #[serde(default)]
    pub web_url: String,
}

impl MergeRequest {
    pub fn is_draft(&self) -> bool {
        self.draft.or(self.work_in_progress).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pipeline {
    pub id: u64,
    pub status: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    #[serde(default)]
    pub web_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Commit {
    pub short_id: String,
    pub title: String,
    #[serde(default)]
    pub author_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Branch {
    pub name: String,
    #[serde(default)]
    pub merged: bool,
    pub commit: Commit,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Label {
    pub name: String,
}

/// A column of an issue board. Backlog and closed columns carry no label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BoardList {
    #[serde(default)]
    pub label: Option<Label>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub lists: Vec<BoardList>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Note {
    pub body: String,
    pub author: User,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Generated by GitLab (label changes, assignments, ...).
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub resolvable: bool,
    #[serde(default)]
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Discussion {
    pub id: String,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Discussion {
    pub fn is_unresolved(&self) -> bool {
        self.notes.iter().any(|note| note.resolvable && !note.resolved)
    }
}
