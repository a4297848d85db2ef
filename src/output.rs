use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::burndown::BurndownResult;
use crate::cli::OutputFormat;
use crate::types::Issue;

/// Global output settings, chosen once at startup
static OUTPUT_FORMAT: AtomicU8 = AtomicU8::new(0);
static QUIET: AtomicBool = AtomicBool::new(false);

const CHART_WIDTH: usize = 30;

pub fn set_format(format: OutputFormat) {
    let value = match format {
        OutputFormat::Table => 0,
        OutputFormat::Json => 1,
        OutputFormat::Compact => 2,
    };
    OUTPUT_FORMAT.store(value, Ordering::Relaxed);
}

pub fn format() -> OutputFormat {
    match OUTPUT_FORMAT.load(Ordering::Relaxed) {
        1 => OutputFormat::Json,
        2 => OutputFormat::Compact,
        _ => OutputFormat::Table,
    }
}

pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

pub fn is_json_output() -> bool {
    matches!(format(), OutputFormat::Json)
}

/// Print a table or JSON depending on output mode
pub fn print_table<T, R, F>(items: &[T], to_row: F)
where
    T: Serialize,
    R: Tabled,
    F: Fn(&T) -> R,
{
    if is_json_output() {
        println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
    } else {
        let rows: Vec<R> = items.iter().map(to_row).collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }
}

/// Print a message (skipped in quiet mode, or prints simple object in JSON mode)
pub fn print_message(message: &str) {
    if QUIET.load(Ordering::Relaxed) {
        return;
    }
    if is_json_output() {
        println!("{}", serde_json::json!({ "message": message }));
    } else {
        println!("{message}");
    }
}

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Day")]
    day: usize,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Ideal")]
    ideal: String,
    #[tabled(rename = "Actual")]
    actual: String,
    #[tabled(rename = "Δ")]
    delta: String,
    #[tabled(rename = "Remaining")]
    bar: String,
}

#[derive(Tabled)]
struct IssueRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Points")]
    points: String,
    #[tabled(rename = "Closed")]
    closed: String,
}

impl From<&Issue> for IssueRow {
    fn from(issue: &Issue) -> Self {
        Self {
            id: issue.id.clone(),
            title: truncate(&issue.title, 50),
            points: format_points(issue.story_points),
            closed: issue
                .closed_at
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Print a burndown in the selected output format
pub fn print_burndown(title: &str, result: &BurndownResult) {
    match format() {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result).unwrap_or_default());
        }
        OutputFormat::Compact => println!("{}", compact_line(title, result)),
        OutputFormat::Table => print_burndown_table(title, result),
    }
}

fn compact_line(title: &str, result: &BurndownResult) -> String {
    format!(
        "{title}\t{}\t{}/{} pts\t{}\t{} remaining\t{} carryover",
        result.window,
        format_points(result.completed_points),
        format_points(result.total_points),
        format_percentage(result.completion_percentage),
        format_points(result.remaining_points),
        result.carryover_issues.len()
    )
}

fn print_burndown_table(title: &str, result: &BurndownResult) {
    println!("{}", title.bold());
    println!("{} ({} days)", result.window, result.duration_days());
    println!();
    println!("Total:     {} pts", format_points(result.total_points));
    println!(
        "Completed: {} pts ({})",
        format_points(result.completed_points),
        percentage_colored(result.completion_percentage)
    );
    println!("Remaining: {} pts", format_points(result.remaining_points));
    println!();

    let rows: Vec<DayRow> = result
        .days()
        .enumerate()
        .map(|(index, (date, ideal, actual))| DayRow {
            day: index + 1,
            date: date.to_string(),
            ideal: format!("{ideal:.1}"),
            actual: format_points(actual),
            delta: delta_colored(actual - ideal),
            bar: bar(actual, result.total_points),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()).to_string());

    if !result.completed_issues.is_empty() {
        println!("\n{}", "Completed".green().bold());
        let rows: Vec<IssueRow> = result.completed_issues.iter().map(IssueRow::from).collect();
        println!("{}", Table::new(rows).with(Style::rounded()).to_string());
    }
    if !result.carryover_issues.is_empty() {
        println!("\n{}", "Carryover".yellow().bold());
        let rows: Vec<IssueRow> = result.carryover_issues.iter().map(IssueRow::from).collect();
        println!("{}", Table::new(rows).with(Style::rounded()).to_string());
    }
}

fn bar(remaining: f64, total: f64) -> String {
    if total <= 0.0 {
        return String::new();
    }
    let width = (remaining / total * CHART_WIDTH as f64).round() as usize;
    "█".repeat(width.min(CHART_WIDTH))
}

/// Positive deltas mean the sprint is behind the ideal line
fn delta_colored(delta: f64) -> String {
    let text = format!("{delta:+.1}");
    if delta > 0.05 {
        text.red().to_string()
    } else if delta < -0.05 {
        text.green().to_string()
    } else {
        text
    }
}

/// Format completion percentage with color
pub fn percentage_colored(percentage: f64) -> String {
    let label = format_percentage(percentage);
    if percentage >= 80.0 {
        label.green().bold().to_string()
    } else if percentage >= 50.0 {
        label.yellow().to_string()
    } else {
        label.red().to_string()
    }
}

/// Story points without a trailing `.0` for whole numbers
pub fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{points:.0}")
    } else {
        let text = format!("{points:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

pub fn format_percentage(percentage: f64) -> String {
    format!("{}%", format_points(percentage))
}

/// Truncate a string with ellipsis
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
