use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Compact,
}

#[derive(Parser)]
#[command(name = "burndown")]
#[command(about = "Sprint burndown reports from CSV exports or Linear cycles", version)]
#[command(after_help = "EXAMPLES:
    burndown report data/sprint_2025-02-01_to_2025-02-14.csv
    burndown report issues.csv --start 2025-02-01 --end 2025-02-14 --write
    burndown batch --data-dir data --report-dir ~/vault/Sprint_Reports
    burndown cycles --team ENG
    burndown cycle abc123-uuid-here --write")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json, compact)
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Output as JSON (alias for --format json)
    #[arg(long, global = true, hide = true)]
    pub json: bool,

    /// Suppress success messages
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Show detailed error information and progress logs
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Get the effective output format, considering --json flag
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Burndown for a single sprint CSV file
    #[command(
        alias = "r",
        after_help = "EXAMPLES:
    burndown report data/sprint_2025-02-01_to_2025-02-14.csv
    burndown report issues.csv --start 2025-02-01 --end 2025-02-14
    burndown report data/sprint_2025-02-01_to_2025-02-14.csv --write --report-dir ./reports"
    )]
    Report(ReportArgs),
    /// Process every sprint CSV in the data directory
    #[command(after_help = "EXAMPLES:
    burndown batch
    burndown batch --data-dir data --report-dir ./reports --backup-dir data/processed
    burndown batch --no-backup")]
    Batch(BatchArgs),
    /// List Linear cycles
    #[command(after_help = "EXAMPLES:
    burndown cycles
    burndown cycles --team ENG")]
    Cycles {
        /// Filter by team key (e.g., ENG)
        #[arg(long)]
        team: Option<String>,
    },
    /// Burndown for a Linear cycle
    #[command(after_help = "EXAMPLES:
    burndown cycle abc123-uuid-here
    burndown cycle abc123-uuid-here --write --report-dir ./reports")]
    Cycle(CycleArgs),
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    burndown completions bash > ~/.bash_completion.d/burndown
    burndown completions zsh > ~/.zfunc/_burndown
    burndown completions fish > ~/.config/fish/completions/burndown.fish")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Initialize configuration file interactively
    #[command(after_help = "EXAMPLES:
    burndown init")]
    Init,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Path to the sprint CSV file
    pub file: PathBuf,

    /// Sprint start date (YYYY-MM-DD); defaults to the date in the file name
    #[arg(long, requires = "end")]
    pub start: Option<NaiveDate>,

    /// Sprint end date (YYYY-MM-DD); defaults to the date in the file name
    #[arg(long, requires = "start")]
    pub end: Option<NaiveDate>,

    /// Also write the markdown sprint report
    #[arg(long, short)]
    pub write: bool,

    /// Directory for the markdown report
    #[arg(long)]
    pub report_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Directory scanned for sprint_<start>_to_<end>.csv files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Directory for the markdown reports
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Directory processed files are moved to
    #[arg(long, conflicts_with = "no_backup")]
    pub backup_dir: Option<PathBuf>,

    /// Leave processed files in place
    #[arg(long)]
    pub no_backup: bool,
}

#[derive(Args)]
pub struct CycleArgs {
    /// Linear cycle ID
    pub id: String,

    /// Also write the markdown sprint report
    #[arg(long, short)]
    pub write: bool,

    /// Directory for the markdown report
    #[arg(long)]
    pub report_dir: Option<PathBuf>,
}
