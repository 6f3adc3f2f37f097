use crate::error::{PulseError, Result};
use crate::github::{GitHubClient, Transport};
use crate::model::{PulseData, Window};
use crate::pulse::PulseSession;
use std::io;
use std::time::Duration;

const SECS_PER_DAY: u64 = 86_400;

/// Resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct PulseConfig {
    pub owner: String,
    pub repo: String,
    pub period_days: u32,
    pub token: Option<String>,
    pub api_url: String,
    pub prompt: bool,
    pub show_progress: bool,
}

impl PulseConfig {
    pub fn window(&self) -> Result<Window> {
        Window::last_days(self.period_days)
    }

    pub fn client(&self) -> Result<GitHubClient> {
        Ok(GitHubClient::new(self.token.clone())?.with_base_url(self.api_url.as_str()))
    }

    /// Fetch through a recovery session bound to stdin/stdout.
    pub fn fetch<T: Transport>(
        &self,
        client: &GitHubClient<T>,
        window: &Window,
    ) -> Result<PulseData> {
        let stdin = io::stdin();
        PulseSession::new(client, &self.owner, *window, stdin.lock(), io::stdout())
            .prompt(self.prompt)
            .show_progress(self.show_progress)
            .run(&self.repo)
    }
}

/// Whole days in a humantime duration such as `2weeks` or `90days`.
pub fn parse_period_days(input: &str) -> Result<u32> {
    let duration: Duration = humantime::parse_duration(input)
        .map_err(|e| PulseError::InvalidArgument(format!("invalid period '{input}': {e}")))?;
    let days = duration.as_secs() / SECS_PER_DAY;
    if days == 0 {
        return Err(PulseError::InvalidArgument(format!(
            "period '{input}' is shorter than one day"
        )));
    }
    u32::try_from(days)
        .map_err(|_| PulseError::InvalidArgument(format!("period '{input}' is too long")))
}

pub fn validate_days(days: u32) -> Result<u32> {
    if days == 0 {
        return Err(PulseError::InvalidArgument("days must be at least 1".to_string()));
    }
    Ok(days)
}
