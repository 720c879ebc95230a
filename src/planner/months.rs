//! Month extraction from free text
//!
//! Matching is plain substring containment over a fixed, ordered table, so
//! the first entry found wins rather than the closest one. "margin" and
//! "market" therefore resolve to March.

use crate::models::{CALENDAR_MONTHS, DEFAULT_MONTH, DEFAULT_TREND_MONTHS};
use once_cell::sync::Lazy;
use regex::Regex;

/// Month names and abbreviations in scan order
const MONTH_PATTERNS: &[(&str, &str)] = &[
    ("january", "Jan 2025"),
    ("jan", "Jan 2025"),
    ("february", "Feb 2025"),
    ("feb", "Feb 2025"),
    ("march", "Mar 2025"),
    ("mar", "Mar 2025"),
    ("april", "Apr 2025"),
    ("apr", "Apr 2025"),
    ("may", "May 2025"),
    ("june", "Jun 2025"),
    ("jun", "Jun 2025"),
    ("july", "Jul 2025"),
    ("jul", "Jul 2025"),
    ("august", "Aug 2025"),
    ("aug", "Aug 2025"),
    ("september", "Sep 2025"),
    ("sep", "Sep 2025"),
    ("october", "Oct 2025"),
    ("oct", "Oct 2025"),
    ("november", "Nov 2025"),
    ("nov", "Nov 2025"),
    ("december", "Dec 2025"),
    ("dec", "Dec 2025"),
];

static LAST_N_MONTHS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"last\s+(\d+)\s+months?").expect("month range pattern is valid"));

/// First month mentioned in `text`, if any
pub fn find_month(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();

    MONTH_PATTERNS
        .iter()
        .find(|(pattern, _)| lowered.contains(pattern))
        .map(|(_, label)| *label)
}

pub fn extract_month(text: &str) -> String {
    find_month(text).unwrap_or(DEFAULT_MONTH).to_string()
}

/// The `n` calendar months ending at the default month, clamped to January.
pub fn last_n_months(n: usize) -> Vec<String> {
    let end = CALENDAR_MONTHS
        .iter()
        .position(|m| *m == DEFAULT_MONTH)
        .map(|i| i + 1)
        .unwrap_or(CALENDAR_MONTHS.len());
    let start = end - n.min(end);

    CALENDAR_MONTHS[start..end]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

pub fn extract_months_range(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();

    if let Some(caps) = LAST_N_MONTHS.captures(&lowered) {
        // Digits that overflow usize still mean "as many as there are".
        let n = caps[1].parse::<usize>().unwrap_or(usize::MAX);
        return last_n_months(n);
    }

    if let Some(month) = find_month(&lowered) {
        return vec![month.to_string()];
    }

    DEFAULT_TREND_MONTHS.iter().map(|m| m.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_month() {
        assert_eq!(extract_month("What was June revenue?"), "Jun 2025");
        assert_eq!(extract_month("Show me May data"), "May 2025");
        assert_eq!(extract_month("February results"), "Feb 2025");
        assert_eq!(extract_month("DEC close"), "Dec 2025");
        assert_eq!(extract_month("Show revenue"), "Jun 2025");
    }

    #[test]
    fn test_first_table_entry_wins() {
        // "margin" contains "mar", which is scanned before "june".
        assert_eq!(extract_month("gross margin for june"), "Mar 2025");
        assert_eq!(find_month("nothing here"), None);
    }

    #[test]
    fn test_last_n_months_ends_at_default() {
        let range = extract_months_range("last 3 months");
        assert_eq!(range, vec!["Apr 2025", "May 2025", "Jun 2025"]);

        let single = extract_months_range("over the last 1 month");
        assert_eq!(single, vec!["Jun 2025"]);
    }

    #[test]
    fn test_last_n_months_clamps_to_january() {
        let range = extract_months_range("last 12 months");
        assert_eq!(range.len(), 6);
        assert_eq!(range.first().map(String::as_str), Some("Jan 2025"));
        assert_eq!(range.last().map(String::as_str), Some("Jun 2025"));

        let huge = extract_months_range("last 99999999999999999999999 months");
        assert_eq!(huge.len(), 6);

        assert!(extract_months_range("last 0 months").is_empty());
    }

    #[test]
    fn test_range_single_and_default() {
        assert_eq!(extract_months_range("show april"), vec!["Apr 2025"]);
        assert_eq!(
            extract_months_range("show the trend"),
            vec!["Apr 2025", "May 2025", "Jun 2025"]
        );
    }
}
