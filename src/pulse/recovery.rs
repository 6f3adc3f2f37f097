use super::fetch::fetch_pulse_with_progress;
use crate::error::{PulseError, Result};
use crate::github::{GitHubClient, Transport};
use crate::model::{PulseData, RepositorySummary, Window};
use crate::prompt::ask;
use std::io::{BufRead, Write};
use tracing::{info, warn};

#[derive(Debug)]
pub enum SessionState {
    Fetching { repo: String },
    NotFound { repo: String },
    AwaitingUserChoice { candidates: Vec<RepositorySummary> },
    Retrying { repo: String },
    Aborted { reason: String },
    Done(Box<PulseData>),
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Aborted { .. } | SessionState::Done(_))
    }
}

/// Drives one fetch, asking for a corrected repository name on 404.
pub struct PulseSession<'a, T, R, W> {
    client: &'a GitHubClient<T>,
    owner: String,
    window: Window,
    prompt: bool,
    show_progress: bool,
    input: R,
    output: W,
}

impl<'a, T, R, W> PulseSession<'a, T, R, W>
where
    T: Transport,
    R: BufRead,
    W: Write,
{
    pub fn new(
        client: &'a GitHubClient<T>,
        owner: &str,
        window: Window,
        input: R,
        output: W,
    ) -> Self {
        Self {
            client,
            owner: owner.to_string(),
            window,
            prompt: true,
            show_progress: false,
            input,
            output,
        }
    }

    pub fn prompt(mut self, enabled: bool) -> Self {
        self.prompt = enabled;
        self
    }

    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    pub fn run(mut self, repo: &str) -> Result<PulseData> {
        let mut state = SessionState::Fetching { repo: repo.to_string() };
        loop {
            state = match self.step(state)? {
                SessionState::Done(data) => return Ok(*data),
                SessionState::Aborted { reason } => return Err(PulseError::Aborted(reason)),
                next => next,
            };
        }
    }

    /// Advance one transition. Errors other than a missing repository end the session.
    pub fn step(&mut self, state: SessionState) -> Result<SessionState> {
        match state {
            SessionState::Fetching { repo } => {
                let fetched = fetch_pulse_with_progress(
                    self.client,
                    &self.owner,
                    &repo,
                    &self.window,
                    self.show_progress,
                );
                match fetched {
                    Ok(data) => Ok(SessionState::Done(Box::new(data))),
                    Err(e) if e.is_not_found() => Ok(SessionState::NotFound { repo }),
                    Err(e) => Err(e),
                }
            }
            SessionState::NotFound { repo } => self.on_not_found(&repo),
            SessionState::AwaitingUserChoice { candidates } => self.await_choice(candidates),
            SessionState::Retrying { repo } => {
                info!(owner = %self.owner, repo = %repo, "retrying with corrected repository name");
                Ok(SessionState::Fetching { repo })
            }
            terminal => Ok(terminal),
        }
    }

    fn on_not_found(&mut self, repo: &str) -> Result<SessionState> {
        let full_name = format!("{}/{}", self.owner, repo);
        writeln!(self.output, "Repository '{full_name}' was not found.")?;
        if !self.prompt {
            return Ok(SessionState::Aborted {
                reason: format!("repository {full_name} not found"),
            });
        }

        match self.client.owner_repositories(&self.owner) {
            Ok(candidates) if candidates.is_empty() => Ok(SessionState::Aborted {
                reason: format!("{} has no public repositories", self.owner),
            }),
            Ok(candidates) => Ok(SessionState::AwaitingUserChoice { candidates }),
            Err(e) => {
                warn!(owner = %self.owner, error = %e, "could not list repositories");
                Ok(SessionState::Aborted {
                    reason: format!(
                        "repository {full_name} not found and listing {} failed: {e}",
                        self.owner
                    ),
                })
            }
        }
    }

    fn await_choice(&mut self, candidates: Vec<RepositorySummary>) -> Result<SessionState> {
        writeln!(self.output, "Public repositories of {}:", self.owner)?;
        for (i, candidate) in candidates.iter().enumerate() {
            match candidate.description.as_deref().filter(|d| !d.is_empty()) {
                Some(description) => writeln!(
                    self.output,
                    "  {:>3}. {} - {}",
                    i + 1,
                    candidate.name,
                    description
                )?,
                None => writeln!(self.output, "  {:>3}. {}", i + 1, candidate.name)?,
            }
        }

        let question = "Enter a number or name (q to quit): ";
        let answer = ask(&mut self.input, &mut self.output, question)?;
        let Some(answer) = answer else {
            return Ok(SessionState::Aborted {
                reason: "no repository selected".to_string(),
            });
        };

        match resolve_choice(&answer, &candidates) {
            Choice::Quit => Ok(SessionState::Aborted {
                reason: "cancelled by user".to_string(),
            }),
            Choice::Repo(repo) => Ok(SessionState::Retrying { repo }),
            Choice::Invalid => {
                writeln!(self.output, "Invalid choice '{answer}'.")?;
                Ok(SessionState::AwaitingUserChoice { candidates })
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Choice {
    Quit,
    Repo(String),
    Invalid,
}

/// An exact name wins over an index, and both win over a quit word.
fn resolve_choice(answer: &str, candidates: &[RepositorySummary]) -> Choice {
    if let Some(c) = candidates.iter().find(|c| c.name == answer) {
        return Choice::Repo(c.name.clone());
    }
    if let Ok(index) = answer.parse::<usize>() {
        return match index.checked_sub(1).and_then(|i| candidates.get(i)) {
            Some(c) => Choice::Repo(c.name.clone()),
            None => Choice::Invalid,
        };
    }
    if matches!(answer.to_ascii_lowercase().as_str(), "q" | "quit" | "exit") {
        return Choice::Quit;
    }
    Choice::Invalid
}
