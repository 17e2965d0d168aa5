use std::path::{Path, PathBuf};

use anyhow::Result;
use owo_colors::OwoColorize;
use thws_scheduler_core::config::AppConfig;
use thws_scheduler_core::export::ExportFormat;
use thws_scheduler_core::import::import_file;
use thws_scheduler_core::state::AppState;

use super::{show_result, write_exports};

/// Show an uploaded schedule file as a calendar and convert it on request.
pub fn run(config: &AppConfig, file: &Path, export: &[ExportFormat], out: Option<PathBuf>) -> Result<()> {
    let tz = config.tz()?;
    let report = import_file(file, tz)?;

    for skipped in &report.skipped {
        println!(
            "{} row {}: {}",
            "Skipped".yellow(),
            skipped.row,
            skipped.reason.dimmed()
        );
    }
    if !report.skipped.is_empty() {
        println!();
    }

    let mut state = AppState::new(None, config.failure_policy());
    state.replace_result(report.result);
    show_result(state.result(), true);

    let out = out.unwrap_or_else(|| config.output_dir());
    if !export.is_empty() {
        println!();
    }
    write_exports(state.result(), export, &out)?;

    Ok(())
}
