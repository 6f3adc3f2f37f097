use crate::error::Result;
use crate::github::{GitHubClient, Transport};
use crate::model::{Commit, Issue, PulseData, PullRequest, RepositoryInfo, Window};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tracing::info;

/// Fetch repository info, commits, issues and pull requests for one window.
///
/// Resources are fetched one after another; the first error aborts the session.
pub fn fetch_pulse<T: Transport>(
    client: &GitHubClient<T>,
    owner: &str,
    repo: &str,
    window: &Window,
) -> Result<PulseData> {
    fetch_pulse_with_progress(client, owner, repo, window, false)
}

pub fn fetch_pulse_with_progress<T: Transport>(
    client: &GitHubClient<T>,
    owner: &str,
    repo: &str,
    window: &Window,
    show_progress: bool,
) -> Result<PulseData> {
    let started = Instant::now();
    let pb = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    } else {
        ProgressBar::hidden()
    };

    pb.set_message(format!("Fetching {owner}/{repo}..."));
    let fetched = fetch_resources(client, owner, repo, window, &pb);
    pb.finish_and_clear();
    let (repository_info, commits, issues, pull_requests) = fetched?;

    let elapsed = Duration::from_millis(started.elapsed().as_millis() as u64);
    info!(
        repository = %repository_info.full_name,
        commits = commits.len(),
        issues = issues.len(),
        pull_requests = pull_requests.len(),
        elapsed = %humantime::format_duration(elapsed),
        "pulse fetched"
    );

    Ok(PulseData {
        owner: owner.to_string(),
        repo: repo.to_string(),
        window: *window,
        repository_info,
        commits,
        issues,
        pull_requests,
    })
}

type Resources = (RepositoryInfo, Vec<Commit>, Vec<Issue>, Vec<PullRequest>);

fn fetch_resources<T: Transport>(
    client: &GitHubClient<T>,
    owner: &str,
    repo: &str,
    window: &Window,
    pb: &ProgressBar,
) -> Result<Resources> {
    let repository_info = client.repository(owner, repo)?;
    pb.set_message("Fetching commits...");
    let commits = client.commits(owner, repo, window)?;
    pb.set_message(format!("Fetched {} commits, fetching issues...", commits.len()));
    let issues = client.issues(owner, repo, window)?;
    pb.set_message(format!("Fetched {} issues, fetching pull requests...", issues.len()));
    let pull_requests = client.pull_requests(owner, repo, window)?;
    Ok((repository_info, commits, issues, pull_requests))
}
