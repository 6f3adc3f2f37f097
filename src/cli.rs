use crate::config::{parse_period_days, validate_days, PulseConfig};
use crate::error::PulseError;
use crate::model::DEFAULT_API_URL;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "ghpulse")]
#[command(about = "GitHub repository pulse: commits, issues and pull requests over a time window")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(long, help = "Repository owner (user or organization)")]
    pub owner: String,

    #[arg(long, help = "Repository name")]
    pub repo: String,

    #[arg(
        long,
        help = "Number of days to look back",
        default_value_t = 30,
        conflicts_with = "period"
    )]
    pub days: u32,

    #[arg(long, help = "Look-back period as a duration, e.g. 2weeks or 90days")]
    pub period: Option<String>,

    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, help = "GitHub API token")]
    pub token: Option<String>,

    #[arg(
        long,
        env = "GITHUB_API_URL",
        default_value = DEFAULT_API_URL,
        help = "GitHub API base URL"
    )]
    pub api_url: String,

    #[arg(long, help = "Never prompt; a missing repository aborts")]
    pub no_prompt: bool,

    #[arg(short, long, help = "Enable debug logging")]
    pub verbose: bool,
}

impl CommonArgs {
    pub fn resolve(&self) -> crate::error::Result<PulseConfig> {
        let period_days = match &self.period {
            Some(period) => parse_period_days(period)?,
            None => validate_days(self.days)?,
        };
        Ok(PulseConfig {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            period_days,
            token: self.token.clone().filter(|t| !t.trim().is_empty()),
            api_url: self.api_url.clone(),
            prompt: !self.no_prompt,
            show_progress: !self.verbose && console::user_attended_stderr(),
        })
    }

    /// Filter used when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "ghpulse=debug"
        } else {
            "warn"
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the pulse scorecard, optionally exporting the data
    Report {
        #[arg(long, help = "Export the fetched data to this JSON file")]
        export: Option<PathBuf>,
    },
    /// Fetch and write the JSON document without printing a report
    Export {
        #[arg(long, short, help = "Path of the JSON file to write")]
        output: PathBuf,
    },
    /// Compare activity totals across several window lengths
    Compare {
        #[arg(
            long,
            value_delimiter = ',',
            help = "Comma-separated window lengths in days [default: 7,14,30,90]"
        )]
        periods: Vec<u32>,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Run the command. A failure is reported on stderr here and nowhere else.
    pub fn execute(self) -> Result<()> {
        let result = match self.command {
            Commands::Report { export } => crate::report::exec(self.common, export),
            Commands::Export { output } => crate::export::exec(self.common, output),
            Commands::Compare { periods } => crate::compare::exec(self.common, periods),
        };
        if let Err(e) = &result {
            debug!(error = ?e, "command failed");
            eprintln!("{}", failure_message(e));
        }
        result
    }
}

pub fn failure_message(e: &anyhow::Error) -> String {
    match e.downcast_ref::<PulseError>() {
        Some(PulseError::RateLimited { .. }) => format!(
            "{} set GITHUB_TOKEN or pass --token to raise the limit.",
            style("Rate limit exceeded:").red().bold()
        ),
        _ => format!("{} {e:#}", style("Error:").red().bold()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use console::strip_ansi_codes;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        let prefix = ["ghpulse", "--owner", "acme", "--repo", "widgets"];
        Cli::try_parse_from(prefix.iter().chain(args.iter()).copied())
    }

    #[test]
    fn defaults_to_thirty_days() {
        let cli = parse(&["report"]).unwrap();
        let config = cli.common.resolve().unwrap();
        assert_eq!(config.period_days, 30);
        assert!(config.prompt);
        assert!(matches!(cli.command, Commands::Report { export: None }));
    }

    #[test]
    fn period_and_days_conflict() {
        assert!(parse(&["--days", "7", "--period", "2weeks", "report"]).is_err());
        let cli = parse(&["--period", "2weeks", "report"]).unwrap();
        assert_eq!(cli.common.resolve().unwrap().period_days, 14);
    }

    #[test]
    fn zero_days_is_rejected() {
        let cli = parse(&["--days", "0", "report"]).unwrap();
        assert!(matches!(cli.common.resolve(), Err(PulseError::InvalidArgument(_))));
    }

    #[test]
    fn huge_windows_are_rejected_without_panicking() {
        let cli = parse(&["--days", "100000000", "report"]).unwrap();
        let config = cli.common.resolve().unwrap();
        assert!(matches!(config.window(), Err(PulseError::InvalidArgument(_))));

        let cli = parse(&["--period", "1000000years", "report"]).unwrap();
        let outcome = cli.common.resolve().and_then(|config| config.window());
        assert!(matches!(outcome, Err(PulseError::InvalidArgument(_))));
    }

    #[test]
    fn compare_periods_split_on_commas() {
        let cli = parse(&["compare", "--periods", "7,30"]).unwrap();
        match cli.command {
            Commands::Compare { periods } => assert_eq!(periods, vec![7, 30]),
            _ => panic!("expected compare"),
        }
    }

    #[test]
    fn blank_token_is_ignored() {
        let cli = parse(&["--token", " ", "--no-prompt", "export", "-o", "x.json"]).unwrap();
        let config = cli.common.resolve().unwrap();
        assert_eq!(config.token, None);
        assert!(!config.prompt);
    }

    #[test]
    fn failures_render_as_one_message() {
        let limited: anyhow::Error = Err::<(), _>(PulseError::RateLimited { url: "u".into() })
            .context("Failed to fetch pulse data")
            .unwrap_err();
        let text = strip_ansi_codes(&failure_message(&limited)).into_owned();
        assert!(text.starts_with("Rate limit exceeded:"));
        assert!(text.contains("GITHUB_TOKEN"));

        let aborted: anyhow::Error = Err::<(), _>(PulseError::Aborted("cancelled by user".into()))
            .context("Failed to fetch pulse data")
            .unwrap_err();
        let text = strip_ansi_codes(&failure_message(&aborted)).into_owned();
        assert_eq!(text, "Error: Failed to fetch pulse data: Aborted: cancelled by user");
    }
}
