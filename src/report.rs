use crate::cli::CommonArgs;
use crate::export::export_json;
use crate::prompt::{ask, confirm};
use crate::pulse::summarize;
use crate::scorecard;
use anyhow::{Context, Result};
use console::style;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_EXPORT_FILE: &str = "pulse_report.json";

pub fn exec(common: CommonArgs, export: Option<PathBuf>) -> Result<()> {
    let config = common.resolve().context("Invalid arguments")?;
    let client = config.client().context("Failed to build GitHub client")?;
    let window = config.window().context("Invalid arguments")?;
    let data = config
        .fetch(&client, &window)
        .context("Failed to fetch pulse data")?;

    print!("{}", scorecard::render(&summarize(&data)));
    io::stdout().flush()?;

    let target = match export {
        Some(path) => Some(path),
        None if config.prompt => {
            let stdin = io::stdin();
            ask_export_path(&mut stdin.lock(), &mut io::stdout())?
        }
        None => None,
    };

    if let Some(path) = target {
        if export_json(&data, &path) {
            println!("Data exported to {}", style(path.display()).green());
        } else {
            warn!(path = %path.display(), "report shown but export failed");
            eprintln!("{} could not write {}", style("Export failed:").red(), path.display());
        }
    }
    Ok(())
}

/// Offer an export after the report. `None` when declined or input ends.
pub fn ask_export_path<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<PathBuf>> {
    if !confirm(&mut *input, &mut *output, "Export data to JSON? (y/n): ")? {
        return Ok(None);
    }
    let question = format!("Enter filename (default: {DEFAULT_EXPORT_FILE}): ");
    let name = ask(&mut *input, &mut *output, &question)?
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_EXPORT_FILE.to_string());
    Ok(Some(PathBuf::from(name)))
}
