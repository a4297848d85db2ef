use std::path::Path;

use log::info;

use crate::burndown::{self, BurndownResult};
use crate::cli::ReportArgs;
use crate::config::Config;
use crate::csv_source;
use crate::error::{BurndownError, Result};
use crate::output;
use crate::report;
use crate::sprint_file;
use crate::types::SprintWindow;

pub fn run(config: &Config, args: ReportArgs) -> Result<()> {
    let window = resolve_window(&args)?;
    let result = burndown_for_file(&args.file, &window)?;

    let title = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file.display().to_string());
    output::print_burndown(&title, &result);

    if args.write {
        let path = report::write_report(&result, &config.resolve_report_dir(args.report_dir))?;
        output::print_message(&format!("Sprint report saved to {}", path.display()));
    }

    Ok(())
}

/// Explicit dates win over the dates encoded in the file name.
fn resolve_window(args: &ReportArgs) -> Result<SprintWindow> {
    match (args.start, args.end) {
        (Some(start), Some(end)) => SprintWindow::new(start, end),
        _ => sprint_file::window_from_file_name(&args.file).map_err(|e| match e {
            BurndownError::SprintFileName(_) => BurndownError::MissingWindow,
            other => other,
        }),
    }
}

pub fn burndown_for_file(path: &Path, window: &SprintWindow) -> Result<BurndownResult> {
    info!("Computing burndown for {} ({window})", path.display());
    let issues = csv_source::read_issues(path)?;
    burndown::compute(window, &issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(file: &str, start: Option<&str>, end: Option<&str>) -> ReportArgs {
        ReportArgs {
            file: PathBuf::from(file),
            start: start.map(|s| s.parse().unwrap()),
            end: end.map(|s| s.parse().unwrap()),
            write: false,
            report_dir: None,
        }
    }

    #[test]
    fn test_window_from_flags() {
        let window = resolve_window(&args(
            "sprint_2025-03-17_to_2025-03-25.csv",
            Some("2025-02-01"),
            Some("2025-02-14"),
        ))
        .unwrap();
        assert_eq!(window.start.to_string(), "2025-02-01");
    }

    #[test]
    fn test_window_from_file_name() {
        let window = resolve_window(&args("data/sprint_2025-03-17_to_2025-03-25.csv", None, None)).unwrap();
        assert_eq!(window.end.to_string(), "2025-03-25");
    }

    #[test]
    fn test_missing_window() {
        let err = resolve_window(&args("issues.csv", None, None)).unwrap_err();
        assert!(matches!(err, BurndownError::MissingWindow));
    }

    #[test]
    fn test_reversed_flags_are_invalid_window() {
        let err = resolve_window(&args("issues.csv", Some("2025-02-14"), Some("2025-02-01"))).unwrap_err();
        assert!(matches!(err, BurndownError::InvalidWindow { .. }));
    }

    #[test]
    fn test_burndown_for_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sprint_2025-02-01_to_2025-02-14.csv");
        std::fs::write(
            &path,
            "id,title,created_at,closed_at,story_points
1,Login form,2025-02-01,2025-02-04,5
2,Session store,2025-02-02,2025-02-07,8
3,Password reset,2025-02-03,,13
",
        )
        .unwrap();

        let window = sprint_file::window_from_file_name(&path).unwrap();
        let result = burndown_for_file(&path, &window).unwrap();

        assert_eq!(result.total_points, 26.0);
        assert_eq!(result.actual_remaining[3], 21.0);
        assert_eq!(result.actual_remaining[6], 13.0);
        assert_eq!(result.completion_percentage, 50.0);
    }
}
