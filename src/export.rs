use crate::cli::CommonArgs;
use crate::error::Result;
use crate::model::{PulseData, PulseExport};
use crate::pulse::analyze_contributors;
use anyhow::Context;
use chrono::{DateTime, Utc};
use console::style;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{error, info};

pub fn exec(common: CommonArgs, output: PathBuf) -> anyhow::Result<()> {
    let config = common.resolve().context("Invalid arguments")?;
    let client = config.client().context("Failed to build GitHub client")?;
    let window = config.window().context("Invalid arguments")?;
    let data = config
        .fetch(&client, &window)
        .context("Failed to fetch pulse data")?;

    if !export_json(&data, &output) {
        anyhow::bail!("Failed to export data to {}", output.display());
    }
    println!("Data exported to {}", style(output.display()).green());
    Ok(())
}

pub fn build_export(data: &PulseData, generated_at: DateTime<Utc>) -> PulseExport {
    PulseExport {
        repository: data.full_name(),
        period_days: data.window.days,
        since_date: data.window.since,
        generated_at,
        repository_info: data.repository_info.clone(),
        commits: data.commits.clone(),
        issues: data.issues.clone(),
        pull_requests: data.pull_requests.clone(),
        contributors: analyze_contributors(&data.commits),
    }
}

/// Write `document` next to `path` in a temp file, then move it into place.
pub fn write_export(document: &PulseExport, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, document)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn read_export(path: &Path) -> Result<PulseExport> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Export `data` to `path`. Failures are logged and reported as `false`.
pub fn export_json(data: &PulseData, path: &Path) -> bool {
    let document = build_export(data, Utc::now());
    match write_export(&document, path) {
        Ok(()) => {
            info!(path = %path.display(), "data exported");
            true
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "error exporting data to JSON");
            false
        }
    }
}
