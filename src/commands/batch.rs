//! Batch driver: every sprint file in the data directory gets a report.
//!
//! A file that fails to parse or compute is logged and skipped; the rest of
//! the batch still runs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::BatchArgs;
use crate::commands::report::burndown_for_file;
use crate::config::Config;
use crate::error::Result;
use crate::output::{self, format_percentage, format_points};
use crate::report;
use crate::sprint_file;

#[derive(Serialize, Debug)]
pub struct ProcessedSprint {
    pub file: PathBuf,
    pub start: String,
    pub end: String,
    pub total_points: f64,
    pub completed_points: f64,
    pub completion_percentage: f64,
    pub report: PathBuf,
    pub backup: Option<PathBuf>,
}

#[derive(Serialize, Debug)]
pub struct SkippedSprint {
    pub file: PathBuf,
    pub error: String,
}

#[derive(Serialize, Debug, Default)]
pub struct BatchSummary {
    pub processed: Vec<ProcessedSprint>,
    pub skipped: Vec<SkippedSprint>,
}

#[derive(Tabled)]
struct ProcessedRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Window")]
    window: String,
    #[tabled(rename = "Points")]
    points: String,
    #[tabled(rename = "Done")]
    completion: String,
    #[tabled(rename = "Report")]
    report: String,
}

impl From<&ProcessedSprint> for ProcessedRow {
    fn from(sprint: &ProcessedSprint) -> Self {
        Self {
            file: display_name(&sprint.file),
            window: format!("{} to {}", sprint.start, sprint.end),
            points: format!(
                "{}/{}",
                format_points(sprint.completed_points),
                format_points(sprint.total_points)
            ),
            completion: format_percentage(sprint.completion_percentage),
            report: sprint.report.display().to_string(),
        }
    }
}

pub struct BatchPaths {
    pub data_dir: PathBuf,
    pub report_dir: PathBuf,
    pub backup_dir: Option<PathBuf>,
}

pub fn run(config: &Config, args: BatchArgs) -> Result<()> {
    let backup_dir = if args.no_backup {
        None
    } else {
        Some(config.resolve_backup_dir(args.backup_dir))
    };
    let paths = BatchPaths {
        data_dir: config.resolve_data_dir(args.data_dir),
        report_dir: config.resolve_report_dir(args.report_dir),
        backup_dir,
    };

    let summary = process_all(&paths)?;

    if output::is_json_output() {
        println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
        return Ok(());
    }

    if summary.processed.is_empty() && summary.skipped.is_empty() {
        output::print_message(&format!(
            "No sprint files found in {}",
            paths.data_dir.display()
        ));
        return Ok(());
    }

    if !summary.processed.is_empty() {
        output::print_table(&summary.processed, |s| ProcessedRow::from(s));
    }
    for skipped in &summary.skipped {
        eprintln!("Skipped {}: {}", display_name(&skipped.file), skipped.error);
    }
    output::print_message(&format!(
        "Processed {} sprint file(s), skipped {}",
        summary.processed.len(),
        summary.skipped.len()
    ));

    Ok(())
}

/// Process every sprint file found under `paths.data_dir`.
pub fn process_all(paths: &BatchPaths) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();
    let mut written = HashSet::new();

    for file in sprint_file::discover(&paths.data_dir)? {
        match process_file(&file, paths, &written) {
            Ok(processed) => {
                written.insert(processed.report.clone());
                summary.processed.push(processed);
            }
            Err(e) => {
                warn!("Skipping {}: {e}", file.display());
                summary.skipped.push(SkippedSprint {
                    file,
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        "Batch finished: {} processed, {} skipped",
        summary.processed.len(),
        summary.skipped.len()
    );
    Ok(summary)
}

fn process_file(
    file: &Path,
    paths: &BatchPaths,
    written: &HashSet<PathBuf>,
) -> Result<ProcessedSprint> {
    let window = sprint_file::window_from_file_name(file)?;
    let result = burndown_for_file(file, &window)?;

    let mut name = report::file_name(&result);
    if written.contains(&paths.report_dir.join(&name)) {
        warn!(
            "{name} was already written in this batch; naming the report for {} by its full window",
            display_name(file)
        );
        name = report::full_file_name(&result);
    }
    let report = report::write_report_as(&result, &paths.report_dir, &name)?;

    // the report exists at this point, so a failed move only leaves the input behind
    let backup = match &paths.backup_dir {
        Some(dir) => match sprint_file::move_to_backup(file, dir) {
            Ok(target) => Some(target),
            Err(e) => {
                warn!("{e}");
                None
            }
        },
        None => None,
    };

    Ok(ProcessedSprint {
        file: file.to_path_buf(),
        start: window.start.to_string(),
        end: window.end.to_string(),
        total_points: result.total_points,
        completed_points: result.completed_points,
        completion_percentage: result.completion_percentage,
        report,
        backup,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
