use chrono::{DateTime, Utc};
use console::{measure_text_width, pad_str, Alignment};

pub const ELLIPSIS: &str = "…";

pub fn day(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// Left-align `text` in exactly `width` columns, cutting with an ellipsis.
pub fn fit(text: &str, width: usize) -> String {
    pad_str(text, width, Alignment::Left, Some(ELLIPSIS)).into_owned()
}

pub fn fit_right(text: &str, width: usize) -> String {
    pad_str(text, width, Alignment::Right, Some(ELLIPSIS)).into_owned()
}

/// `left` and `right` on one line of `width` columns; `left` gives way first.
pub fn spread(left: &str, right: &str, width: usize) -> String {
    let right_width = measure_text_width(right).min(width);
    format!("{}{}", fit(left, width - right_width), fit(right, right_width))
}

pub fn percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Bar length for `count` scaled against `max` over `width` cells.
/// A non-zero count never yields an empty bar.
pub fn bar_len(count: u64, max: u64, width: usize) -> usize {
    if count == 0 || max == 0 {
        return 0;
    }
    let scaled = (count as f64 / max as f64 * width as f64).round() as usize;
    scaled.clamp(1, width)
}
