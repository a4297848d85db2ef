//! Markdown sprint review, laid out for an Obsidian vault with Dataview.

use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

use log::info;

use crate::burndown::BurndownResult;
use crate::error::{BurndownError, Result};
use crate::output::{format_percentage, format_points};
use crate::types::Issue;

const DEFAULT_FOLDER: &str = "Sprint_Reports";

pub fn file_name(result: &BurndownResult) -> String {
    format!("Sprint_{}.md", result.window.start)
}

/// Name that also carries the end date, for sprints sharing a start date.
pub fn full_file_name(result: &BurndownResult) -> String {
    format!("Sprint_{}_to_{}.md", result.window.start, result.window.end)
}

/// Render the report. `folder` is the vault folder the Dataview query reads.
pub fn render_markdown(result: &BurndownResult, folder: &str) -> String {
    let mut md = String::new();
    // writing into a String cannot fail
    let _ = write_markdown(&mut md, result, folder);
    md
}

fn write_markdown(md: &mut String, result: &BurndownResult, folder: &str) -> fmt::Result {
    let start = result.window.start;
    let percentage = format_percentage(result.completion_percentage);
    let total = format_points(result.total_points);

    writeln!(md, "---")?;
    writeln!(md, "date: {start}")?;
    writeln!(md, "completion_percentage: {percentage}")?;
    writeln!(md, "total_story_points: {total}")?;
    writeln!(md, "---\n")?;

    writeln!(md, "# Sprint {start} Review\n")?;
    writeln!(md, "**Sprint Start:** {start}  ")?;
    writeln!(md, "**Sprint End:** {}  ", result.window.end)?;
    writeln!(md, "**Total Story Points:** {total}  ")?;
    writeln!(
        md,
        "**Remaining Story Points:** {}\n",
        format_points(result.remaining_points)
    )?;

    writeln!(md, "## Burndown\n")?;
    writeln!(md, "| Day | Date | Ideal | Actual |")?;
    writeln!(md, "|---:|---|---:|---:|")?;
    for (day, (date, ideal, actual)) in result.days().enumerate() {
        writeln!(
            md,
            "| {} | {date} | {ideal:.1} | {} |",
            day + 1,
            format_points(actual)
        )?;
    }
    writeln!(md)?;

    writeln!(
        md,
        "## Completed Issues ({} Story Points, {percentage})\n",
        format_points(result.completed_points)
    )?;
    write_issue_list(md, &result.completed_issues, "- [x]")?;

    writeln!(md, "---\n## Carryover Issues\n")?;
    write_issue_list(md, &result.carryover_issues, "- [ ]")?;

    writeln!(md, "---\n## Sprint Notes & Observations\n")?;
    writeln!(md, "- Key accomplishments")?;
    writeln!(md, "- Blockers faced")?;
    writeln!(md, "- Actionable improvements\n")?;

    writeln!(md, "---\n## Sprint Velocity History\n")?;
    writeln!(md, "```dataview")?;
    writeln!(md, "table date, total_story_points, completion_percentage")?;
    writeln!(md, "FROM \"{folder}\"")?;
    writeln!(md, "sort date desc")?;
    writeln!(md, "```")
}

fn write_issue_list(md: &mut String, issues: &[Issue], marker: &str) -> fmt::Result {
    if issues.is_empty() {
        return writeln!(md, "_None_\n");
    }
    for issue in issues {
        let title = if issue.title.is_empty() {
            &issue.id
        } else {
            &issue.title
        };
        writeln!(
            md,
            "{marker} {title} ({} pts)",
            format_points(issue.story_points)
        )?;
    }
    writeln!(md)
}

/// Write `Sprint_<start>.md` into `dir`, creating it if needed.
pub fn write_report(result: &BurndownResult, dir: &Path) -> Result<PathBuf> {
    write_report_as(result, dir, &file_name(result))
}

/// Write the report into `dir` under `name`.
pub fn write_report_as(result: &BurndownResult, dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    let write_error = |source: std::io::Error| BurndownError::ReportWrite {
        path: path.clone(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(write_error)?;

    let folder = dir
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_FOLDER);
    std::fs::write(&path, render_markdown(result, folder)).map_err(write_error)?;

    info!("Sprint report saved to {}", path.display());
    Ok(path)
}
