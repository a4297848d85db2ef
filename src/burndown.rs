//! Burndown computation.
//!
//! Turns a sprint window and a set of issues into the day-by-day remaining
//! work curve, the ideal linear burn, and completion statistics. Pure: no
//! I/O, no shared state, identical inputs give identical results.

use chrono::NaiveDate;
use log::{debug, warn};
use serde::Serialize;

use crate::error::Result;
use crate::types::{Issue, SprintWindow};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BurndownResult {
    pub window: SprintWindow,
    pub dates: Vec<NaiveDate>,
    pub ideal_remaining: Vec<f64>,
    pub actual_remaining: Vec<f64>,
    pub total_points: f64,
    /// Points of every closed issue, regardless of when it was closed.
    pub completed_points: f64,
    /// Remaining work on the last day of the window.
    pub remaining_points: f64,
    pub completion_percentage: f64,
    pub completed_issues: Vec<Issue>,
    pub carryover_issues: Vec<Issue>,
}

impl BurndownResult {
    pub fn duration_days(&self) -> usize {
        self.dates.len()
    }

    /// `(date, ideal, actual)` for each day of the window.
    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, f64, f64)> + '_ {
        self.dates
            .iter()
            .zip(&self.ideal_remaining)
            .zip(&self.actual_remaining)
            .map(|((date, ideal), actual)| (*date, *ideal, *actual))
    }
}

pub fn compute(window: &SprintWindow, issues: &[Issue]) -> Result<BurndownResult> {
    let duration = window.duration_days()?;
    for issue in issues {
        issue.validate()?;
    }

    let total_points: f64 = issues.iter().map(|i| i.story_points).sum();
    let dates: Vec<NaiveDate> = window.dates().collect();

    let ideal_remaining = dates
        .iter()
        .enumerate()
        .map(|(day, _)| total_points - day as f64 * total_points / duration as f64)
        .collect();

    let actual_remaining = actual_remaining(&dates, issues);

    let (completed_issues, carryover_issues): (Vec<Issue>, Vec<Issue>) =
        issues.iter().cloned().partition(Issue::is_closed);

    let completed_points: f64 = completed_issues.iter().map(|i| i.story_points).sum();

    let late: Vec<&str> = completed_issues
        .iter()
        .filter(|i| !i.is_closed_by(window.end))
        .map(|i| i.id.as_str())
        .collect();
    if !late.is_empty() {
        warn!(
            "{} issue(s) closed after {} count as completed but remain on the burndown: {}",
            late.len(),
            window.end,
            late.join(", ")
        );
    }

    let remaining_points = actual_remaining.last().copied().unwrap_or(total_points);

    debug!(
        "Burndown {window}: {duration} days, {} issues, {total_points} total, {completed_points} completed",
        issues.len()
    );

    Ok(BurndownResult {
        window: *window,
        dates,
        ideal_remaining,
        actual_remaining,
        total_points,
        completed_points,
        remaining_points,
        completion_percentage: completion_percentage(completed_points, total_points),
        completed_issues,
        carryover_issues,
    })
}

/// Remaining points per day: the sum over issues still open on that day.
///
/// Closings are sorted once; `still_open[k]` holds the points of every closing
/// from index `k` on, so a day with nothing open is exactly zero.
fn actual_remaining(dates: &[NaiveDate], issues: &[Issue]) -> Vec<f64> {
    let never_closed: f64 = issues
        .iter()
        .filter(|i| !i.is_closed())
        .map(|i| i.story_points)
        .sum();

    let mut closings: Vec<(NaiveDate, f64)> = issues
        .iter()
        .filter_map(|i| i.closed_at.map(|closed| (closed, i.story_points)))
        .collect();
    closings.sort_by_key(|(closed, _)| *closed);

    let mut still_open = vec![0.0; closings.len() + 1];
    for (k, (_, points)) in closings.iter().enumerate().rev() {
        still_open[k] = still_open[k + 1] + points;
    }

    let mut next = 0;
    dates
        .iter()
        .map(|date| {
            while closings.get(next).is_some_and(|(closed, _)| closed <= date) {
                next += 1;
            }
            never_closed + still_open[next]
        })
        .collect()
}

/// Percentage rounded to two decimals, half away from zero.
pub fn completion_percentage(completed_points: f64, total_points: f64) -> f64 {
    if total_points > 0.0 {
        round2(completed_points / total_points * 100.0)
    } else {
        0.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BurndownError;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn window(start: &str, end: &str) -> SprintWindow {
        SprintWindow {
            start: date(start),
            end: date(end),
        }
    }

    fn sample_issues() -> Vec<Issue> {
        vec![
            Issue::new("1", "Login form", 5.0).closed_on(date("2025-02-04")),
            Issue::new("2", "Session store", 8.0).closed_on(date("2025-02-07")),
            Issue::new("3", "Password reset", 13.0),
        ]
    }

    #[test]
    fn test_two_week_sprint() {
        let result = compute(&window("2025-02-01", "2025-02-14"), &sample_issues()).unwrap();

        assert_eq!(result.duration_days(), 14);
        assert_eq!(result.total_points, 26.0);
        assert_eq!(result.actual_remaining[0], 26.0);
        assert_eq!(result.actual_remaining[2], 26.0);
        assert_eq!(result.actual_remaining[3], 21.0);
        assert_eq!(result.actual_remaining[5], 21.0);
        assert_eq!(result.actual_remaining[6], 13.0);
        assert!(result.actual_remaining[6..].iter().all(|r| *r == 13.0));
        assert_eq!(result.completed_points, 13.0);
        assert_eq!(result.remaining_points, 13.0);
        assert_eq!(result.completion_percentage, 50.0);
    }

    #[test]
    fn test_partition_preserves_input_order() {
        let mut issues = sample_issues();
        issues.push(Issue::new("4", "Docs", 1.0).closed_on(date("2025-02-02")));
        issues.push(Issue::new("5", "Metrics", 2.0));

        let result = compute(&window("2025-02-01", "2025-02-14"), &issues).unwrap();

        let completed: Vec<&str> = result.completed_issues.iter().map(|i| i.id.as_str()).collect();
        let carryover: Vec<&str> = result.carryover_issues.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(completed, vec!["1", "2", "4"]);
        assert_eq!(carryover, vec!["3", "5"]);
        assert_eq!(
            result.completed_issues.len() + result.carryover_issues.len(),
            issues.len()
        );
    }

    #[test]
    fn test_empty_issue_list() {
        let result = compute(&window("2025-02-01", "2025-02-14"), &[]).unwrap();

        assert_eq!(result.total_points, 0.0);
        assert!(result.actual_remaining.iter().all(|r| *r == 0.0));
        assert!(result.ideal_remaining.iter().all(|r| *r == 0.0));
        assert_eq!(result.completion_percentage, 0.0);
    }

    #[test]
    fn test_all_zero_point_issues() {
        let issues = vec![
            Issue::new("1", "Spike", 0.0).closed_on(date("2025-02-03")),
            Issue::new("2", "Spike", 0.0),
        ];
        let result = compute(&window("2025-02-01", "2025-02-05"), &issues).unwrap();
        assert_eq!(result.completion_percentage, 0.0);
        assert_eq!(result.completed_issues.len(), 1);
    }

    #[test]
    fn test_reversed_window_fails() {
        let err = compute(&window("2025-02-14", "2025-02-01"), &sample_issues()).unwrap_err();
        assert!(matches!(err, BurndownError::InvalidWindow { .. }));
    }

    #[test]
    fn test_negative_points_fail() {
        let mut issues = sample_issues();
        issues.push(Issue::new("bad", "Corrupt row", -1.0));
        let err = compute(&window("2025-02-01", "2025-02-14"), &issues).unwrap_err();
        assert!(matches!(err, BurndownError::InvalidIssue { ref id, .. } if id == "bad"));
    }

    #[test]
    fn test_single_day_window() {
        let issues = vec![Issue::new("1", "Hotfix", 3.0).closed_on(date("2025-03-17"))];
        let result = compute(&window("2025-03-17", "2025-03-17"), &issues).unwrap();

        assert_eq!(result.duration_days(), 1);
        assert_eq!(result.ideal_remaining, vec![3.0]);
        assert_eq!(result.actual_remaining, vec![0.0]);
        assert_eq!(result.completion_percentage, 100.0);
    }

    #[test]
    fn test_ideal_curve_stops_short_of_zero() {
        let result = compute(&window("2025-02-01", "2025-02-14"), &sample_issues()).unwrap();

        assert_eq!(result.ideal_remaining.len(), 14);
        assert_eq!(result.ideal_remaining[0], 26.0);
        let last = result.ideal_remaining[13];
        assert!((last - 26.0 / 14.0).abs() < 1e-9);
        assert!(result.ideal_remaining.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_closed_before_window_counts_from_day_zero() {
        let issues = vec![
            Issue::new("1", "Carried in", 5.0).closed_on(date("2025-01-20")),
            Issue::new("2", "Open", 5.0),
        ];
        let result = compute(&window("2025-02-01", "2025-02-03"), &issues).unwrap();
        assert_eq!(result.actual_remaining, vec![5.0, 5.0, 5.0]);
        assert_eq!(result.completed_points, 5.0);
    }

    #[test]
    fn test_closed_after_window_is_completed_but_still_remaining() {
        let issues = vec![
            Issue::new("1", "Late", 8.0).closed_on(date("2025-02-20")),
            Issue::new("2", "Done", 2.0).closed_on(date("2025-02-02")),
        ];
        let result = compute(&window("2025-02-01", "2025-02-03"), &issues).unwrap();

        assert_eq!(result.actual_remaining, vec![10.0, 8.0, 8.0]);
        assert_eq!(result.remaining_points, 8.0);
        assert_eq!(result.completed_points, 10.0);
        assert_eq!(result.completion_percentage, 100.0);
        assert_eq!(result.carryover_issues.len(), 0);
    }

    #[test]
    fn test_unsorted_closings_are_monotone() {
        let issues = vec![
            Issue::new("a", "", 1.0).closed_on(date("2025-02-09")),
            Issue::new("b", "", 2.0).closed_on(date("2025-02-02")),
            Issue::new("c", "", 3.0),
            Issue::new("d", "", 4.0).closed_on(date("2025-02-05")),
            Issue::new("e", "", 5.0).closed_on(date("2025-02-02")),
        ];
        let result = compute(&window("2025-02-01", "2025-02-10"), &issues).unwrap();

        assert!(result.actual_remaining.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(result.actual_remaining[0], 15.0);
        assert_eq!(result.actual_remaining[1], 8.0);
        assert_eq!(result.actual_remaining[4], 4.0);
        assert_eq!(result.actual_remaining[9], 3.0);
    }

    #[test]
    fn test_matches_per_day_rescan() {
        let issues = vec![
            Issue::new("a", "", 3.0).closed_on(date("2025-02-06")),
            Issue::new("b", "", 1.0).closed_on(date("2025-01-30")),
            Issue::new("c", "", 2.0).closed_on(date("2025-02-12")),
            Issue::new("d", "", 5.0),
            Issue::new("e", "", 8.0).closed_on(date("2025-02-06")),
        ];
        let window = window("2025-02-01", "2025-02-10");
        let result = compute(&window, &issues).unwrap();

        for (date, _, actual) in result.days() {
            let expected: f64 = issues
                .iter()
                .filter(|i| !i.is_closed_by(date))
                .map(|i| i.story_points)
                .sum();
            assert_eq!(actual, expected, "remaining on {date}");
        }
    }

    #[test]
    fn test_fractional_points_burn_down_to_exactly_zero() {
        let issues = vec![
            Issue::new("a", "", 0.1).closed_on(date("2025-02-03")),
            Issue::new("b", "", 0.2).closed_on(date("2025-02-02")),
            Issue::new("c", "", 0.3).closed_on(date("2025-02-01")),
        ];
        let result = compute(&window("2025-02-01", "2025-02-03"), &issues).unwrap();

        for (date, _, actual) in result.days() {
            let expected: f64 = issues
                .iter()
                .filter(|i| !i.is_closed_by(date))
                .map(|i| i.story_points)
                .sum();
            assert!((actual - expected).abs() < 1e-9, "remaining on {date}");
            assert!(actual >= 0.0);
        }
        assert_eq!(result.actual_remaining[2], 0.0);
        assert_eq!(result.remaining_points, 0.0);
    }

    #[test]
    fn test_fractional_open_work_stays_exact() {
        let issues = vec![
            Issue::new("a", "", 0.7).closed_on(date("2025-02-01")),
            Issue::new("b", "", 1.5),
            Issue::new("c", "", 0.1).closed_on(date("2025-02-02")),
        ];
        let result = compute(&window("2025-02-01", "2025-02-02"), &issues).unwrap();
        assert_eq!(result.actual_remaining[1], 1.5);
        assert_eq!(result.remaining_points, 1.5);
    }

    #[test]
    fn test_percentage_rounds_to_two_decimals() {
        assert_eq!(completion_percentage(1.0, 3.0), 33.33);
        assert_eq!(completion_percentage(2.0, 3.0), 66.67);
        assert_eq!(completion_percentage(0.0, 0.0), 0.0);
        assert_eq!(completion_percentage(5.0, 5.0), 100.0);
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let issues = sample_issues();
        let window = window("2025-02-01", "2025-02-14");
        assert_eq!(compute(&window, &issues).unwrap(), compute(&window, &issues).unwrap());
    }

    #[test]
    fn test_duplicate_ids_are_distinct_work() {
        let issues = vec![
            Issue::new("1", "Same", 2.0).closed_on(date("2025-02-01")),
            Issue::new("1", "Same", 2.0),
        ];
        let result = compute(&window("2025-02-01", "2025-02-02"), &issues).unwrap();
        assert_eq!(result.total_points, 4.0);
        assert_eq!(result.actual_remaining, vec![2.0, 2.0]);
    }
}
