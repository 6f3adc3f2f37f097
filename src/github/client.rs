use super::transport::{ApiResponse, HttpTransport, Transport};
use crate::error::{PulseError, Result};
use crate::model::{
    Commit, Issue, PullRequest, RepositoryInfo, RepositorySummary, Window, DEFAULT_API_URL,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub const PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFlow {
    Continue,
    Stop,
}

pub struct GitHubClient<T = HttpTransport> {
    transport: T,
    base_url: String,
}

impl GitHubClient<HttpTransport> {
    pub fn new(token: Option<String>) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(token)?))
    }
}

impl<T: Transport> GitHubClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            base_url: DEFAULT_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, url: &str, query: &[(String, String)]) -> Result<ApiResponse> {
        let response = self.transport.get(url, query)?;
        if !response.is_success() {
            debug!(status = response.status, url, body = %response.body, "GitHub API error");
            return Err(PulseError::from_status(response.status, url));
        }
        Ok(response)
    }

    pub fn repository(&self, owner: &str, repo: &str) -> Result<RepositoryInfo> {
        let url = self.url(&format!("/repos/{owner}/{repo}"));
        let response = self.get(&url, &[])?;
        Ok(serde_json::from_str(&response.body)?)
    }

    /// Walk `path` page by page, handing each non-empty page to `keep`.
    ///
    /// Stops on an empty page, on a response without a `rel="next"` link,
    /// or when `keep` returns [`PageFlow::Stop`].
    pub fn paginate<R, F>(
        &self,
        path: &str,
        params: &[(&str, String)],
        mut keep: F,
    ) -> Result<Vec<R>>
    where
        R: DeserializeOwned,
        F: FnMut(Vec<R>, &mut Vec<R>) -> PageFlow,
    {
        let url = self.url(path);
        let mut collected = Vec::new();
        let mut page: u32 = 1;

        loop {
            let mut query: Vec<(String, String)> =
                params.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
            query.push(("per_page".to_string(), PAGE_SIZE.to_string()));
            query.push(("page".to_string(), page.to_string()));

            let response = self.get(&url, &query)?;
            let records: Vec<R> = serde_json::from_str(&response.body)?;
            debug!(url = %url, page, records = records.len(), "fetched page");

            if records.is_empty() {
                break;
            }
            if keep(records, &mut collected) == PageFlow::Stop || !response.has_next() {
                break;
            }
            page += 1;
        }

        Ok(collected)
    }

    pub fn commits(&self, owner: &str, repo: &str, window: &Window) -> Result<Vec<Commit>> {
        self.paginate(
            &format!("/repos/{owner}/{repo}/commits"),
            &[("since", iso(&window.since))],
            |page: Vec<Commit>, out| {
                out.extend(page);
                PageFlow::Continue
            },
        )
    }

    /// Issues updated inside the window, excluding pull requests.
    pub fn issues(&self, owner: &str, repo: &str, window: &Window) -> Result<Vec<Issue>> {
        self.paginate(
            &format!("/repos/{owner}/{repo}/issues"),
            &[("since", iso(&window.since)), ("state", "all".to_string())],
            |page: Vec<Issue>, out| {
                out.extend(page.into_iter().filter(|i| !i.is_pull_request()));
                PageFlow::Continue
            },
        )
    }

    /// Pull requests by most recent update, until a page falls wholly before the window.
    pub fn pull_requests(
        &self,
        owner: &str,
        repo: &str,
        window: &Window,
    ) -> Result<Vec<PullRequest>> {
        let since = window.since;
        self.paginate(
            &format!("/repos/{owner}/{repo}/pulls"),
            &[
                ("state", "all".to_string()),
                ("sort", "updated".to_string()),
                ("direction", "desc".to_string()),
            ],
            move |page: Vec<PullRequest>, out| {
                let before = out.len();
                out.extend(page.into_iter().filter(|pr| pr.updated_at >= since));
                if out.len() == before {
                    PageFlow::Stop
                } else {
                    PageFlow::Continue
                }
            },
        )
    }

    /// Public repositories of `owner`, trying the org listing before the user one.
    pub fn owner_repositories(&self, owner: &str) -> Result<Vec<RepositorySummary>> {
        let take_all = |page: Vec<RepositorySummary>, out: &mut Vec<RepositorySummary>| {
            out.extend(page);
            PageFlow::Continue
        };
        match self.paginate(&format!("/orgs/{owner}/repos"), &[], take_all) {
            Err(e) if e.is_not_found() => {
                warn!(owner, "no organization found, falling back to user repositories");
                self.paginate(&format!("/users/{owner}/repos"), &[], take_all)
            }
            other => other,
        }
    }
}

fn iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::testing::ScriptedTransport;
    use chrono::TimeZone;
    use serde_json::json;

    const NEXT: &str = r#"<https://api.test/next>; rel="next""#;

    fn window() -> Window {
        Window::ending_at(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(), 30).unwrap()
    }

    fn client(transport: ScriptedTransport) -> GitHubClient<ScriptedTransport> {
        GitHubClient::with_transport(transport).with_base_url("https://api.test/")
    }

    fn commit(sha: &str, login: Option<&str>) -> serde_json::Value {
        json!({
            "sha": sha,
            "author": login.map(|l| json!({"login": l})),
            "commit": {
                "message": "m",
                "author": {"name": "N", "email": "n@x", "date": "2024-01-10T00:00:00Z"}
            }
        })
    }

    fn pull(number: u64, updated: &str) -> serde_json::Value {
        json!({
            "number": number, "title": "pr", "state": "open",
            "user": {"login": "amy"},
            "created_at": "2023-12-01T00:00:00Z",
            "updated_at": updated,
            "closed_at": null, "merged_at": null
        })
    }

    #[test]
    fn commits_follow_next_links_until_absent() {
        let t = ScriptedTransport::new()
            .route(
                "https://api.test/repos/o/r/commits",
                ApiResponse::ok(json!([commit("a1", Some("u1"))]).to_string()).with_link(NEXT),
            )
            .route(
                "https://api.test/repos/o/r/commits",
                ApiResponse::ok(json!([commit("b2", Some("u2"))]).to_string()),
            );
        let c = client(t);
        let commits = c.commits("o", "r", &window()).unwrap();

        assert_eq!(commits.iter().map(|c| c.sha.as_str()).collect::<Vec<_>>(), ["a1", "b2"]);
        let requests = c.transport().requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].param("page"), Some("1"));
        assert_eq!(requests[1].param("page"), Some("2"));
        assert_eq!(requests[0].param("per_page"), Some("100"));
        assert_eq!(requests[0].param("since"), Some("2024-01-02T00:00:00Z"));
    }

    #[test]
    fn empty_page_stops_even_with_next_link() {
        let t = ScriptedTransport::new().route(
            "https://api.test/repos/o/r/commits",
            ApiResponse::ok("[]").with_link(NEXT),
        );
        let c = client(t);
        assert!(c.commits("o", "r", &window()).unwrap().is_empty());
        assert_eq!(c.transport().requests().len(), 1);
    }

    #[test]
    fn issues_drop_pull_request_entries_but_keep_paging() {
        let issue = |n: u64, pr: bool| {
            let mut v = json!({
                "number": n, "title": "t", "state": "open", "user": {"login": "amy"},
                "created_at": "2024-01-05T00:00:00Z", "updated_at": "2024-01-05T00:00:00Z"
            });
            if pr {
                v["pull_request"] = json!({"url": "https://api.test/pulls/1"});
            }
            v
        };
        let t = ScriptedTransport::new()
            .route(
                "https://api.test/repos/o/r/issues",
                ApiResponse::ok(json!([issue(1, true)]).to_string()).with_link(NEXT),
            )
            .route(
                "https://api.test/repos/o/r/issues",
                ApiResponse::ok(json!([issue(2, false), issue(3, true)]).to_string()),
            );
        let c = client(t);
        let issues = c.issues("o", "r", &window()).unwrap();
        assert_eq!(issues.iter().map(|i| i.number).collect::<Vec<_>>(), [2]);
        assert_eq!(c.transport().requests()[0].param("state"), Some("all"));
        assert_eq!(c.transport().requests().len(), 2);
    }

    #[test]
    fn pulls_stop_once_a_page_is_older_than_window() {
        let t = ScriptedTransport::new()
            .route(
                "https://api.test/repos/o/r/pulls",
                ApiResponse::ok(
                    json!([pull(3, "2024-01-20T00:00:00Z"), pull(2, "2023-12-20T00:00:00Z")])
                        .to_string(),
                )
                .with_link(NEXT),
            )
            .route(
                "https://api.test/repos/o/r/pulls",
                ApiResponse::ok(json!([pull(1, "2023-11-01T00:00:00Z")]).to_string())
                    .with_link(NEXT),
            )
            .route(
                "https://api.test/repos/o/r/pulls",
                ApiResponse::ok(json!([pull(0, "2024-01-25T00:00:00Z")]).to_string()),
            );
        let c = client(t);
        let prs = c.pull_requests("o", "r", &window()).unwrap();
        assert_eq!(prs.iter().map(|p| p.number).collect::<Vec<_>>(), [3]);
        assert_eq!(c.transport().requests().len(), 2);
        assert_eq!(c.transport().requests()[0].param("sort"), Some("updated"));
        assert_eq!(c.transport().requests()[0].param("direction"), Some("desc"));
    }

    #[test]
    fn statuses_are_classified() {
        let t = ScriptedTransport::new()
            .route("https://api.test/repos/o/limited", ApiResponse::ok("{}").with_status(403))
            .route("https://api.test/repos/o/broken", ApiResponse::ok("{}").with_status(502));
        let c = client(t);
        assert!(c.repository("o", "limited").unwrap_err().is_rate_limited());
        assert!(c.repository("o", "missing").unwrap_err().is_not_found());
        match c.repository("o", "broken").unwrap_err() {
            PulseError::Status { status, .. } => assert_eq!(status, 502),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn owner_listing_falls_back_to_user_endpoint() {
        let t = ScriptedTransport::new().route(
            "https://api.test/users/someone/repos",
            ApiResponse::ok(
                json!([{"name": "alpha"}, {"name": "beta", "description": "b"}]).to_string(),
            ),
        );
        let c = client(t);
        let repos = c.owner_repositories("someone").unwrap();
        assert_eq!(repos.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), ["alpha", "beta"]);
        let urls: Vec<_> = c.transport().requests().iter().map(|r| r.url.clone()).collect();
        assert_eq!(
            urls,
            ["https://api.test/orgs/someone/repos", "https://api.test/users/someone/repos"]
        );
    }
}
