use crate::error::{PulseError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Default GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubUser {
    #[serde(default)]
    pub login: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitSignature {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: Option<GitSignature>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A commit as returned by `GET /repos/{owner}/{repo}/commits`.
///
/// Fields the pipeline does not read are kept in `extra` so an export
/// reproduces the record the API sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    #[serde(default)]
    pub author: Option<GitHubUser>,
    pub commit: CommitDetail,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Commit {
    /// GitHub login of the author, if the commit is linked to an account.
    pub fn author_login(&self) -> Option<&str> {
        self.author
            .as_ref()
            .map(|a| a.login.as_str())
            .filter(|login| !login.is_empty())
    }

    pub fn short_sha(&self) -> &str {
        self.sha.get(..7).unwrap_or(&self.sha)
    }

    pub fn summary(&self) -> &str {
        self.commit.message.lines().next().unwrap_or("")
    }

    pub fn author_name(&self) -> &str {
        self.commit
            .author
            .as_ref()
            .map(|a| a.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    pub state: ItemState,
    #[serde(default)]
    pub user: Option<GitHubUser>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    /// Present when the issues endpoint hands back a pull request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    pub fn creator(&self) -> &str {
        creator_login(&self.user)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    pub state: ItemState,
    #[serde(default)]
    pub user: Option<GitHubUser>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }

    pub fn creator(&self) -> &str {
        creator_login(&self.user)
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_merged() {
            "✓ merged"
        } else if self.state == ItemState::Closed {
            "✗ closed"
        } else {
            "◯ open"
        }
    }
}

fn creator_login(user: &Option<GitHubUser>) -> &str {
    user.as_ref()
        .map(|u| u.login.as_str())
        .filter(|login| !login.is_empty())
        .unwrap_or("ghost")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of an owner's repository listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Login → commit count, ranked by count descending.
///
/// Serializes as a JSON object whose key order is the ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributorTally(Vec<(String, u64)>);

impl ContributorTally {
    pub fn from_ranked(entries: Vec<(String, u64)>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[(String, u64)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, login: &str) -> Option<u64> {
        self.0.iter().find(|(l, _)| l == login).map(|(_, c)| *c)
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|(_, c)| c).sum()
    }

    pub fn top(&self, n: usize) -> &[(String, u64)] {
        &self.0[..self.0.len().min(n)]
    }
}

impl Serialize for ContributorTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (login, count) in &self.0 {
            map.serialize_entry(login, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ContributorTally {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct TallyVisitor;

        impl<'de> Visitor<'de> for TallyVisitor {
            type Value = ContributorTally;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of login to commit count")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((login, count)) = access.next_entry::<String, u64>()? {
                    entries.push((login, count));
                }
                Ok(ContributorTally(entries))
            }
        }

        deserializer.deserialize_map(TallyVisitor)
    }
}

/// The `[since, until)` range every record is filtered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
    pub days: u32,
}

impl Window {
    /// Fails when `days` reaches past the earliest representable timestamp.
    pub fn ending_at(until: DateTime<Utc>, days: u32) -> Result<Self> {
        let since = Duration::try_days(i64::from(days))
            .and_then(|span| until.checked_sub_signed(span))
            .ok_or_else(|| {
                PulseError::InvalidArgument(format!("a window of {days} days is out of range"))
            })?;
        Ok(Self { since, until, days })
    }

    pub fn last_days(days: u32) -> Result<Self> {
        Self::ending_at(Utc::now(), days)
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        timestamp >= &self.since && timestamp < &self.until
    }
}

/// Everything fetched for one repository and window.
#[derive(Debug, Clone)]
pub struct PulseData {
    pub owner: String,
    pub repo: String,
    pub window: Window,
    pub repository_info: RepositoryInfo,
    pub commits: Vec<Commit>,
    pub issues: Vec<Issue>,
    pub pull_requests: Vec<PullRequest>,
}

impl PulseData {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// On-disk JSON document written by the export command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseExport {
    pub repository: String,
    pub period_days: u32,
    pub since_date: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub repository_info: RepositoryInfo,
    pub commits: Vec<Commit>,
    pub issues: Vec<Issue>,
    pub pull_requests: Vec<PullRequest>,
    pub contributors: ContributorTally,
}
