pub mod aggregate;
pub mod fetch;
pub mod recovery;

pub use aggregate::{
    analyze_contributors, summarize, IssueActivity, PeriodTotals, PullActivity, PulseMetrics,
    PulseSummary,
};
pub use fetch::{fetch_pulse, fetch_pulse_with_progress};
pub use recovery::{PulseSession, SessionState};
