use crate::cli::CommonArgs;
use crate::model::Window;
use crate::pulse::{fetch_pulse_with_progress, PeriodTotals};
use crate::scorecard::render_comparison;
use anyhow::{Context, Result};
use chrono::Utc;

pub const DEFAULT_PERIODS: [u32; 4] = [7, 14, 30, 90];

pub fn exec(common: CommonArgs, periods: Vec<u32>) -> Result<()> {
    let config = common.resolve().context("Invalid arguments")?;
    let periods = normalize_periods(periods)?;
    let client = config.client().context("Failed to build GitHub client")?;
    let until = Utc::now();

    let mut totals = Vec::with_capacity(periods.len());
    let mut repo = config.repo.clone();
    for (i, days) in periods.iter().enumerate() {
        let window = Window::ending_at(until, *days).context("Invalid arguments")?;
        // Only the first fetch may recover a missing repository; later ones reuse its answer.
        let data = if i == 0 {
            config.fetch(&client, &window)
        } else {
            fetch_pulse_with_progress(&client, &config.owner, &repo, &window, config.show_progress)
        }
        .with_context(|| format!("Failed to fetch the last {days} days"))?;
        repo = data.repo.clone();
        totals.push(PeriodTotals::from_data(&data));
    }

    print!("{}", render_comparison(&format!("{}/{}", config.owner, repo), &totals));
    Ok(())
}

/// Sorted, deduplicated window lengths; the defaults when none are given.
pub fn normalize_periods(mut periods: Vec<u32>) -> Result<Vec<u32>> {
    if periods.is_empty() {
        return Ok(DEFAULT_PERIODS.to_vec());
    }
    if periods.contains(&0) {
        anyhow::bail!("periods must be at least one day");
    }
    periods.sort_unstable();
    periods.dedup();
    Ok(periods)
}
