use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::{BurndownError, Result};

pub fn run() -> Result<()> {
    let config_path = Config::config_path()?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    if config_path.exists() {
        let overwrite = prompt(
            &mut input,
            &mut out,
            &format!(
                "Config file already exists at {}. Overwrite? [y/N] ",
                config_path.display()
            ),
        )?;
        if !overwrite.eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    println!("Burndown Configuration");
    println!("======================\n");

    let config = ask_config(&mut input, &mut out)?;

    // Create config directory if it doesn't exist
    let write_error = |source: io::Error| BurndownError::ConfigWrite {
        path: config_path.clone(),
        source,
    };
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(&config_path, config.to_toml()?).map_err(write_error)?;

    println!("\nConfig saved to {}", config_path.display());
    println!("You can now run 'burndown batch' or 'burndown report <file>'.");

    Ok(())
}

/// Ask for each setting; blank answers leave the setting unset.
fn ask_config<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Config> {
    let data_dir = prompt(input, out, "Directory with sprint CSV files [data]: ")?;
    let report_dir = prompt(input, out, "Directory for sprint reports [reports]: ")?;
    let backup_dir = prompt(input, out, "Directory for processed files [data/processed]: ")?;
    let api_key = prompt(
        input,
        out,
        "Linear API key for cycle burndowns (https://linear.app/settings/api) [optional]: ",
    )?;
    let default_team = prompt(input, out, "Default Linear team key (e.g., ENG) [optional]: ")?;

    Ok(Config {
        api_key: non_empty(api_key),
        default_team: non_empty(default_team),
        data_dir: non_empty(data_dir).map(PathBuf::from),
        report_dir: non_empty(report_dir).map(PathBuf::from),
        backup_dir: non_empty(backup_dir).map(PathBuf::from),
    })
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> Result<String> {
    write!(out, "{question}")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
