//! Operator-facing stdout rendering shared by the maintenance jobs.

use crate::core::config::{MaintenanceConfig, Mode};
use colored::Colorize;

pub fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Apply => "apply (changes are written)",
        Mode::DryRun => "dry-run (read only)",
    }
}

/// Lines identifying what a run targets, in print order.
pub fn run_header_lines(config: &MaintenanceConfig) -> Vec<String> {
    vec![
        format!("== database: {}", config.database),
        format!("== store collection: {}", config.store_collection),
        format!("== survey collection: {}", config.survey_collection),
        format!("== mode: {}", mode_label(config.mode)),
    ]
}

pub fn print_run_header(config: &MaintenanceConfig) {
    let lines = run_header_lines(config);
    let last = lines.len() - 1;
    for (i, line) in lines.iter().enumerate() {
        if i == last {
            match config.mode {
                Mode::Apply => println!("{}", line.bright_yellow().bold()),
                Mode::DryRun => println!("{}", line.bright_cyan()),
            }
        } else {
            println!("{}", line);
        }
    }
}

/// `label: value`, with labels padded to `width` so count blocks line up.
pub fn count_line(label: &str, value: usize, width: usize) -> String {
    format!("{:<width$}: {}", label, value, width = width)
}

pub fn print_dry_run_hint(mode: Mode) {
    if mode == Mode::DryRun {
        println!();
        println!(
            "{} {}",
            "Nothing was written.".bright_white(),
            "Re-run with --apply to persist these changes.".bright_cyan()
        );
    }
}
