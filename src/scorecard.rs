use crate::pulse::{PeriodTotals, PulseSummary};
use crate::util::{bar_len, day, fit, fit_right, percent, spread, ELLIPSIS};
use console::{style, truncate_str};

pub const WIDTH: usize = 80;
const INNER: usize = WIDTH - 4;
const TOP_CONTRIBUTORS: usize = 5;
const RECENT_ITEMS: usize = 3;
const RECENT_COMMITS: usize = 5;
const BAR_WIDTH: usize = 40;

struct Canvas {
    lines: Vec<String>,
}

impl Canvas {
    fn new() -> Self {
        Self { lines: Vec::new() }
    }

    fn banner(&mut self, rows: &[String]) {
        self.lines.push(format!("╔{}╗", "═".repeat(WIDTH - 2)));
        for row in rows {
            self.lines.push(format!("║ {} ║", fit(row, INNER)));
        }
        self.lines.push(format!("╚{}╝", "═".repeat(WIDTH - 2)));
    }

    fn panel(&mut self, title: &str, rows: &[String]) {
        let title = truncate_str(title, WIDTH - 6, ELLIPSIS);
        let title = format!(" {} ", style(title).bold());
        let used = 2 + console::measure_text_width(&title);
        self.lines
            .push(format!("┌─{}{}┐", title, "─".repeat(WIDTH.saturating_sub(used + 1))));
        for row in rows {
            self.lines.push(format!("│ {} │", fit(row, INNER)));
        }
        self.lines.push(format!("└{}┘", "─".repeat(WIDTH - 2)));
    }

    fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

fn cell(label: &str, value: impl ToString) -> String {
    format!("{}{}", fit(label, 28), fit_right(&value.to_string(), 9))
}

fn cells(left: String, right: String) -> String {
    format!("{left}  {right}")
}

/// Render the 80-column pulse scorecard.
pub fn render(summary: &PulseSummary<'_>) -> String {
    let data = summary.data;
    let info = &data.repository_info;
    let mut canvas = Canvas::new();

    let period = format!(
        "last {} days · since {}",
        data.window.days,
        day(&data.window.since)
    );
    canvas.banner(&[
        spread(&format!("PULSE  {}", style(&info.full_name).cyan().bold()), &period, INNER),
        info.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or("No description")
            .to_string(),
        format!(
            "★ {} stars · {} forks · {} open issues",
            info.stargazers_count, info.forks_count, info.open_issues_count
        ),
    ]);

    canvas.panel(
        "Summary",
        &[
            cells(
                cell("Commits", data.commits.len()),
                cell("Contributors", summary.contributors.len()),
            ),
            cells(
                cell("Issues opened", summary.issues.opened.len()),
                cell("Issues closed", summary.issues.closed.len()),
            ),
            cells(
                cell("PRs opened", summary.pulls.opened.len()),
                cell("PRs merged", summary.pulls.merged.len()),
            ),
            cells(
                cell("PRs closed (unmerged)", summary.pulls.closed_unmerged.len()),
                String::new(),
            ),
        ],
    );

    canvas.panel("Top contributors", &contributor_rows(summary));
    canvas.panel("Recent commits", &commit_rows(summary));
    canvas.panel("Recent issues", &issue_rows(summary));
    canvas.panel("Recent pull requests", &pull_rows(summary));

    let m = &summary.metrics;
    canvas.panel(
        "Health",
        &[
            cells(
                cell("Commits per day", format!("{:.1}", m.commits_per_day)),
                cell("Issue close rate", percent(m.issue_close_rate)),
            ),
            cells(
                cell("PR merge rate", percent(m.pr_merge_rate)),
                cell(
                    "Top contributor share",
                    m.top_contributor_share.map(percent).unwrap_or_else(|| "n/a".to_string()),
                ),
            ),
        ],
    );

    canvas.finish()
}

fn contributor_rows(summary: &PulseSummary<'_>) -> Vec<String> {
    let shown = summary.contributors.top(TOP_CONTRIBUTORS);
    let Some(max) = shown.iter().map(|(_, c)| *c).max() else {
        return vec!["No attributed commits in this window.".to_string()];
    };
    shown
        .iter()
        .enumerate()
        .map(|(i, (login, count))| {
            let bar = "█".repeat(bar_len(*count, max, BAR_WIDTH));
            format!(
                "{:>2}. {} {} {}",
                i + 1,
                fit(login, 22),
                fit(&style(bar).green().to_string(), BAR_WIDTH),
                fit_right(&count.to_string(), 8)
            )
        })
        .collect()
}

fn commit_rows(summary: &PulseSummary<'_>) -> Vec<String> {
    let commits = &summary.data.commits;
    if commits.is_empty() {
        return vec!["No commits in this window.".to_string()];
    }
    commits
        .iter()
        .take(RECENT_COMMITS)
        .map(|c| {
            format!(
                "{}  {} {}",
                style(fit(c.short_sha(), 7)).yellow(),
                fit(c.summary(), 48),
                fit_right(c.author_name(), 18)
            )
        })
        .collect()
}

fn issue_rows(summary: &PulseSummary<'_>) -> Vec<String> {
    let opened = &summary.issues.opened;
    if opened.is_empty() {
        return vec!["No issues opened in this window.".to_string()];
    }
    opened
        .iter()
        .take(RECENT_ITEMS)
        .map(|i| {
            format!(
                "{} {} {} {}",
                fit(&format!("#{}", i.number), 7),
                fit(&i.title, 44),
                fit(i.creator(), 12),
                day(&i.created_at)
            )
        })
        .collect()
}

fn pull_rows(summary: &PulseSummary<'_>) -> Vec<String> {
    let opened = &summary.pulls.opened;
    if opened.is_empty() {
        return vec!["No pull requests opened in this window.".to_string()];
    }
    opened
        .iter()
        .take(RECENT_ITEMS)
        .map(|p| {
            format!(
                "{} {} {} {} {}",
                fit(&format!("#{}", p.number), 7),
                fit(&p.title, 33),
                fit(p.status_label(), 10),
                fit(p.creator(), 12),
                day(&p.created_at)
            )
        })
        .collect()
}

/// Side-by-side totals for several window lengths.
pub fn render_comparison(full_name: &str, periods: &[PeriodTotals]) -> String {
    let mut canvas = Canvas::new();
    let mut rows = vec![format!(
        "{}{}{}{}{}",
        fit("Period", 16),
        fit_right("Commits", 15),
        fit_right("Contributors", 15),
        fit_right("Issues", 15),
        fit_right("Pull requests", 15)
    )];
    rows.push("─".repeat(INNER));
    for p in periods {
        rows.push(format!(
            "{}{}{}{}{}",
            fit(&format!("Last {} days", p.days), 16),
            fit_right(&p.commits.to_string(), 15),
            fit_right(&p.contributors.to_string(), 15),
            fit_right(&p.issues.to_string(), 15),
            fit_right(&p.pull_requests.to_string(), 15)
        ));
    }
    canvas.panel(&format!("Activity comparison · {full_name}"), &rows);
    canvas.finish()
}
