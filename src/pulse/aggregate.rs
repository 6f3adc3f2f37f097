use crate::model::{Commit, ContributorTally, Issue, ItemState, PulseData, PullRequest, Window};
use serde::Serialize;
use std::collections::HashMap;

/// Count commits per author login, ranked by count descending.
///
/// Commits without a linked GitHub account are left out entirely. Ties keep
/// the order in which logins were first seen.
pub fn analyze_contributors(commits: &[Commit]) -> ContributorTally {
    let mut counts: Vec<(String, u64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for commit in commits {
        let Some(login) = commit.author_login() else {
            continue;
        };
        match index.get(login) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(login, counts.len());
                counts.push((login.to_string(), 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    ContributorTally::from_ranked(counts)
}

fn closed_within(
    state: ItemState,
    closed_at: Option<&chrono::DateTime<chrono::Utc>>,
    window: &Window,
) -> bool {
    state == ItemState::Closed && closed_at.is_some_and(|ts| window.contains(ts))
}

/// Opened and closed issues. The two sets may overlap.
#[derive(Debug, Clone)]
pub struct IssueActivity<'a> {
    /// Newest first.
    pub opened: Vec<&'a Issue>,
    pub closed: Vec<&'a Issue>,
}

impl<'a> IssueActivity<'a> {
    pub fn from_issues(issues: &'a [Issue], window: &Window) -> Self {
        let mut opened: Vec<&Issue> =
            issues.iter().filter(|i| window.contains(&i.created_at)).collect();
        opened.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let closed = issues
            .iter()
            .filter(|i| closed_within(i.state, i.closed_at.as_ref(), window))
            .collect();
        Self { opened, closed }
    }
}

#[derive(Debug, Clone)]
pub struct PullActivity<'a> {
    /// Newest first.
    pub opened: Vec<&'a PullRequest>,
    pub closed: Vec<&'a PullRequest>,
    pub merged: Vec<&'a PullRequest>,
    pub closed_unmerged: Vec<&'a PullRequest>,
}

impl<'a> PullActivity<'a> {
    pub fn from_pulls(pulls: &'a [PullRequest], window: &Window) -> Self {
        let mut opened: Vec<&PullRequest> =
            pulls.iter().filter(|p| window.contains(&p.created_at)).collect();
        opened.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let closed: Vec<&PullRequest> = pulls
            .iter()
            .filter(|p| closed_within(p.state, p.closed_at.as_ref(), window))
            .collect();
        let (merged, closed_unmerged) = closed.iter().copied().partition(|p| p.is_merged());
        Self {
            opened,
            closed,
            merged,
            closed_unmerged,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PulseMetrics {
    pub commits_per_day: f64,
    pub issue_close_rate: f64,
    pub pr_merge_rate: f64,
    pub top_contributor_share: Option<f64>,
}

impl PulseMetrics {
    pub fn compute(
        commit_count: usize,
        period_days: u32,
        issues: &IssueActivity<'_>,
        pulls: &PullActivity<'_>,
        tally: &ContributorTally,
    ) -> Self {
        let rate = |num: usize, den: usize| num as f64 / den.max(1) as f64;
        let top_contributor_share = match (tally.entries().first(), commit_count) {
            (Some((_, top)), n) if n > 0 => Some(*top as f64 / n as f64),
            _ => None,
        };
        Self {
            commits_per_day: rate(commit_count, period_days as usize),
            issue_close_rate: rate(issues.closed.len(), issues.opened.len()),
            pr_merge_rate: rate(pulls.merged.len(), pulls.opened.len()),
            top_contributor_share,
        }
    }
}

/// Aggregated view of one [`PulseData`], shared by both renderers.
#[derive(Debug, Clone)]
pub struct PulseSummary<'a> {
    pub data: &'a PulseData,
    pub contributors: ContributorTally,
    pub issues: IssueActivity<'a>,
    pub pulls: PullActivity<'a>,
    pub metrics: PulseMetrics,
}

pub fn summarize(data: &PulseData) -> PulseSummary<'_> {
    let contributors = analyze_contributors(&data.commits);
    let issues = IssueActivity::from_issues(&data.issues, &data.window);
    let pulls = PullActivity::from_pulls(&data.pull_requests, &data.window);
    let metrics = PulseMetrics::compute(
        data.commits.len(),
        data.window.days,
        &issues,
        &pulls,
        &contributors,
    );
    PulseSummary {
        data,
        contributors,
        issues,
        pulls,
        metrics,
    }
}

/// Raw per-period totals used by the comparison table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodTotals {
    pub days: u32,
    pub commits: usize,
    pub contributors: usize,
    pub issues: usize,
    pub pull_requests: usize,
}

impl PeriodTotals {
    pub fn from_data(data: &PulseData) -> Self {
        Self {
            days: data.window.days,
            commits: data.commits.len(),
            contributors: analyze_contributors(&data.commits).len(),
            issues: data.issues.len(),
            pull_requests: data.pull_requests.len(),
        }
    }
}
