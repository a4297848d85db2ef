use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Issue, SprintWindow};
use crate::error::{BurndownError, Result};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Cycle {
    pub id: String,
    pub name: Option<String>,
    pub number: i32,
    #[serde(rename = "startsAt")]
    pub starts_at: String,
    #[serde(rename = "endsAt")]
    pub ends_at: String,
}

impl Cycle {
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("Cycle {}", self.number))
    }

    /// Calendar window of the cycle.
    ///
    /// Linear starts and ends cycles at midnight in the team's time zone, so
    /// `endsAt` is exclusive. The window keeps the start date and spans the
    /// cycle length in days, rounded up for partial days.
    pub fn window(&self) -> Result<SprintWindow> {
        let starts_at = parse_timestamp(&self.starts_at, &self.id)?;
        let ends_at = parse_timestamp(&self.ends_at, &self.id)?;
        let start = starts_at.date_naive();

        let seconds = (ends_at - starts_at).num_seconds();
        let days = (seconds + SECONDS_PER_DAY - 1).div_euclid(SECONDS_PER_DAY);
        if days < 1 {
            return Err(BurndownError::InvalidWindow {
                start,
                end: ends_at.date_naive(),
            });
        }

        SprintWindow::new(start, start + Days::new(days as u64 - 1))
    }
}

/// Issue node as returned by the cycle burndown query.
#[derive(Deserialize, Debug, Clone)]
pub struct CycleIssue {
    pub identifier: String,
    pub title: String,
    pub estimate: Option<f64>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "completedAt")]
    pub completed_at: Option<String>,
    #[serde(rename = "canceledAt")]
    pub canceled_at: Option<String>,
}

impl CycleIssue {
    pub fn is_canceled(&self) -> bool {
        self.canceled_at.is_some()
    }
}

impl TryFrom<CycleIssue> for Issue {
    type Error = BurndownError;

    fn try_from(node: CycleIssue) -> Result<Self> {
        let created_at = parse_date(&node.created_at, &node.identifier)?;
        let closed_at = node
            .completed_at
            .as_deref()
            .map(|ts| parse_date(ts, &node.identifier))
            .transpose()?;

        let issue = Issue {
            id: node.identifier,
            title: node.title,
            created_at: Some(created_at),
            closed_at,
            story_points: node.estimate.unwrap_or(0.0),
        };
        issue.validate()?;
        Ok(issue)
    }
}

fn parse_timestamp(ts: &str, id: &str) -> Result<DateTime<Utc>> {
    ts.parse::<DateTime<Utc>>()
        .map_err(|e| BurndownError::InvalidIssue {
            id: id.to_string(),
            reason: format!("invalid timestamp '{ts}': {e}"),
        })
}

fn parse_date(ts: &str, id: &str) -> Result<NaiveDate> {
    parse_timestamp(ts, id).map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(starts_at: &str, ends_at: &str) -> Cycle {
        Cycle {
            id: "c1".to_string(),
            name: None,
            number: 7,
            starts_at: starts_at.to_string(),
            ends_at: ends_at.to_string(),
        }
    }

    fn node(estimate: Option<f64>, completed_at: Option<&str>) -> CycleIssue {
        CycleIssue {
            identifier: "ENG-42".to_string(),
            title: "Fix login".to_string(),
            estimate,
            created_at: "2025-02-01T09:30:00.000Z".to_string(),
            completed_at: completed_at.map(String::from),
            canceled_at: None,
        }
    }

    #[test]
    fn test_midnight_end_is_exclusive() {
        let window = cycle("2025-02-01T00:00:00.000Z", "2025-02-15T00:00:00.000Z")
            .window()
            .unwrap();
        assert_eq!(window.start.to_string(), "2025-02-01");
        assert_eq!(window.end.to_string(), "2025-02-14");
    }

    #[test]
    fn test_non_utc_team_keeps_cycle_length() {
        let window = cycle("2025-02-01T08:00:00.000Z", "2025-02-15T08:00:00.000Z")
            .window()
            .unwrap();
        assert_eq!(window.start.to_string(), "2025-02-01");
        assert_eq!(window.end.to_string(), "2025-02-14");
        assert_eq!(window.duration_days().unwrap(), 14);
    }

    #[test]
    fn test_partial_last_day_counts() {
        let window = cycle("2025-02-01T08:00:00.000Z", "2025-02-14T17:00:00.000Z")
            .window()
            .unwrap();
        assert_eq!(window.end.to_string(), "2025-02-14");
    }

    #[test]
    fn test_end_before_start_is_invalid_window() {
        let err = cycle("2025-02-15T00:00:00.000Z", "2025-02-01T00:00:00.000Z")
            .window()
            .unwrap_err();
        assert!(matches!(err, BurndownError::InvalidWindow { .. }));
    }

    #[test]
    fn test_display_name_falls_back_to_number() {
        assert_eq!(cycle("2025-02-01T00:00:00Z", "2025-02-15T00:00:00Z").display_name(), "Cycle 7");
    }

    #[test]
    fn test_cycle_issue_conversion() {
        let issue = Issue::try_from(node(Some(5.0), Some("2025-02-04T16:00:00.000Z"))).unwrap();
        assert_eq!(issue.id, "ENG-42");
        assert_eq!(issue.story_points, 5.0);
        assert_eq!(issue.closed_at.unwrap().to_string(), "2025-02-04");
        assert_eq!(issue.created_at.unwrap().to_string(), "2025-02-01");
    }

    #[test]
    fn test_missing_estimate_is_zero_points() {
        let issue = Issue::try_from(node(None, None)).unwrap();
        assert_eq!(issue.story_points, 0.0);
        assert!(!issue.is_closed());
    }

    #[test]
    fn test_bad_timestamp_is_invalid_issue() {
        let err = Issue::try_from(node(Some(1.0), Some("yesterday"))).unwrap_err();
        assert!(matches!(err, BurndownError::InvalidIssue { .. }));
    }
}
