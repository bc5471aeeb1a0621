//! The last commit deployed to a service, as relayed from GitHub.
//!
//! These keep GitHub's snake_case field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Commit {
    pub sha: String,
    pub node_id: String,
    pub commit: Option<CommitDetails>,
    pub url: String,
    pub html_url: String,
    pub comments_url: String,
    pub author: Option<GitActor>,
    pub committer: Option<GitActor>,
    pub parents: Vec<CommitParent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitDetails {
    pub author: Option<GitActor>,
    pub committer: Option<GitActor>,
    pub message: String,
    pub tree: Option<CommitTree>,
    pub url: String,
    pub comment_count: u32,
    pub verification: Option<CommitVerification>,
}

/// Someone who authored or committed a change.
///
/// At the top level of a commit this is a GitHub account (`login`, `id`,
/// profile URLs); inside `CommitDetails` it is a git signature (`name`,
/// `email`, `date`). Both use the same record and leave the other half
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitActor {
    pub login: String,
    pub id: u64,
    pub node_id: String,
    pub avatar_url: String,
    pub gravatar_id: String,
    pub url: String,
    pub html_url: String,
    pub followers_url: String,
    pub following_url: String,
    pub gists_url: String,
    pub starred_url: String,
    pub subscriptions_url: String,
    pub organizations_url: String,
    pub repos_url: String,
    pub events_url: String,
    pub received_events_url: String,
    #[serde(rename = "type")]
    pub actor_type: String,
    pub site_admin: bool,
    pub name: String,
    pub email: String,
    #[serde(deserialize_with = "timestamp::lenient")]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitTree {
    pub sha: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitVerification {
    pub verified: bool,
    pub reason: String,
    pub signature: Option<String>,
    pub payload: Option<String>,
    #[serde(deserialize_with = "timestamp::lenient")]
    pub verified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitParent {
    pub sha: String,
    pub url: String,
    pub html_url: String,
}
