use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{BurndownError, Result};

/// A unit of sprint work as seen by the burndown engine.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub created_at: Option<NaiveDate>,
    pub closed_at: Option<NaiveDate>,
    pub story_points: f64,
}

impl Issue {
    pub fn new(id: impl Into<String>, title: impl Into<String>, story_points: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            created_at: None,
            closed_at: None,
            story_points,
        }
    }

    #[cfg(test)]
    pub fn closed_on(mut self, date: NaiveDate) -> Self {
        self.closed_at = Some(date);
        self
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// Whether the issue no longer counts as remaining work on `date`.
    pub fn is_closed_by(&self, date: NaiveDate) -> bool {
        matches!(self.closed_at, Some(closed) if closed <= date)
    }

    /// Reject point values the engine cannot sum meaningfully.
    pub fn validate(&self) -> Result<()> {
        if !self.story_points.is_finite() {
            return Err(BurndownError::InvalidIssue {
                id: self.id.clone(),
                reason: format!("story points must be a finite number, got {}", self.story_points),
            });
        }
        if self.story_points < 0.0 {
            return Err(BurndownError::InvalidIssue {
                id: self.id.clone(),
                reason: format!("story points must not be negative, got {}", self.story_points),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_is_closed_by_is_inclusive() {
        let issue = Issue::new("1", "Login", 3.0).closed_on(date("2025-02-04"));
        assert!(!issue.is_closed_by(date("2025-02-03")));
        assert!(issue.is_closed_by(date("2025-02-04")));
        assert!(issue.is_closed_by(date("2025-02-05")));
    }

    #[test]
    fn test_open_issue_is_never_closed_by() {
        let issue = Issue::new("1", "Login", 3.0);
        assert!(!issue.is_closed());
        assert!(!issue.is_closed_by(date("2099-01-01")));
    }

    #[test]
    fn test_validate_rejects_negative_points() {
        let err = Issue::new("ENG-1", "Bad", -1.0).validate().unwrap_err();
        assert!(matches!(err, BurndownError::InvalidIssue { ref id, .. } if id == "ENG-1"));
    }

    #[test]
    fn test_validate_rejects_nan() {
        assert!(Issue::new("ENG-1", "Bad", f64::NAN).validate().is_err());
    }

    #[test]
    fn test_validate_accepts_zero_points() {
        assert!(Issue::new("ENG-1", "Chore", 0.0).validate().is_ok());
    }
}
