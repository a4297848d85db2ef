//! Sprint issues from CSV exports.
//!
//! Expected header: `id,title,created_at,closed_at,story_points`. Only
//! `story_points` is required; an empty `closed_at` means the issue is open.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use log::debug;
use serde::Deserialize;

use crate::error::{BurndownError, Result};
use crate::types::Issue;

#[derive(Deserialize)]
struct IssueRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    closed_at: Option<String>,
    #[serde(default)]
    story_points: Option<String>,
}

pub fn read_issues(path: &Path) -> Result<Vec<Issue>> {
    let file = std::fs::File::open(path).map_err(|e| BurndownError::Csv {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    let issues = parse_issues(file, path)?;
    debug!("Read {} issues from {}", issues.len(), path.display());
    Ok(issues)
}

/// Parse issues from any CSV reader; `source` is only used in error messages.
pub fn parse_issues<R: Read>(reader: R, source: &Path) -> Result<Vec<Issue>> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let mut issues = Vec::new();
    for (index, record) in reader.deserialize::<IssueRow>().enumerate() {
        let row = record.map_err(|e| BurndownError::Csv {
            path: source.to_path_buf(),
            source: e,
        })?;
        issues.push(row.into_issue(index + 1)?);
    }

    Ok(issues)
}

impl IssueRow {
    fn into_issue(self, row_number: usize) -> Result<Issue> {
        let id = non_empty(self.id).unwrap_or_else(|| format!("row-{row_number}"));

        let invalid = |reason: String| BurndownError::InvalidIssue {
            id: id.clone(),
            reason,
        };

        let story_points = match non_empty(self.story_points) {
            Some(raw) => raw
                .parse::<f64>()
                .map_err(|_| invalid(format!("story_points '{raw}' is not a number")))?,
            None => return Err(invalid("story_points is missing".to_string())),
        };

        let created_at = non_empty(self.created_at)
            .map(|raw| parse_date(&raw).ok_or_else(|| invalid(format!("created_at '{raw}' is not a date"))))
            .transpose()?;
        let closed_at = non_empty(self.closed_at)
            .map(|raw| parse_date(&raw).ok_or_else(|| invalid(format!("closed_at '{raw}' is not a date"))))
            .transpose()?;

        let mut issue = Issue::new(id.clone(), self.title.unwrap_or_default(), story_points);
        issue.created_at = created_at;
        issue.closed_at = closed_at;
        issue.validate()?;
        Ok(issue)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Calendar date from a plain date, a naive timestamp, or RFC 3339.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive())
}
