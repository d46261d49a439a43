//! # Squeeze UI Utilities Module (`common::ui`)
//!
//! File: cli/src/common/ui/mod.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! ## Overview
//!
//! Everything Squeeze prints for the user (as opposed to log lines, which go
//! through `tracing` to stderr) is formatted here:
//!
//! - the summary table after a successful run,
//! - styled error and info lines,
//! - the optional "Press Enter to exit..." pause.
//!
//! The archive engine never prints; it hands a `SaveResult` to `print_report`.
//!
//! ## Architecture
//!
//! Styling uses the `console` crate, which drops the ANSI codes on its own when
//! the stream is not a terminal. Table layout is split from printing
//! (`render_table` returns a `String`) so it can be tested without a TTY.
//!
//! Example output:
//!
//! ```text
//! squeeze
//! Github: https://github.com/christimahu/squeeze
//! ┌─────────────────────────┬──────────────────────────────────┐
//! │ Count of archived files │ 3                                │
//! │ Created                 │ /home/me/out/20240307_090501.zip │
//! │ Size                    │ 0.01 Mb                          │
//! └─────────────────────────┴──────────────────────────────────┘
//! ```
//!
use crate::common::archive::SaveResult;
use console::{measure_text_width, style, Term};
use std::io;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Formats a byte count the way the summary shows it: MiB with two decimals.
pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.2} Mb", bytes as f64 / BYTES_PER_MB)
}

/// The rows of the summary table, sorted by label.
pub fn report_rows(result: &SaveResult) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Created", result.archive_path().display().to_string()),
        ("Size", format_size_mb(result.archive_size())),
        ("Count of archived files", result.archived_count().to_string()),
    ];
    rows.sort_by(|a, b| a.0.cmp(b.0));
    rows
}

/// Lays out `rows` as a two-column box-drawn table.
pub fn render_table(rows: &[(&str, String)]) -> String {
    let key_width = rows
        .iter()
        .map(|(k, _)| measure_text_width(k))
        .max()
        .unwrap_or(0);
    let value_width = rows
        .iter()
        .map(|(_, v)| measure_text_width(v))
        .max()
        .unwrap_or(0);

    let rule = |left: &str, mid: &str, right: &str| {
        format!(
            "{}{}{}{}{}",
            left,
            "─".repeat(key_width + 2),
            mid,
            "─".repeat(value_width + 2),
            right
        )
    };

    let mut out = String::new();
    out.push_str(&rule("┌", "┬", "┐"));
    out.push('\n');
    for (key, value) in rows {
        out.push_str(&format!(
            "│ {:<kw$} │ {:<vw$} │\n",
            key,
            value,
            kw = key_width,
            vw = value_width
        ));
    }
    out.push_str(&rule("└", "┴", "┘"));
    out
}

/// Prints the summary of a saved archive to stdout.
pub fn print_report(result: &SaveResult) {
    println!();
    println!("{}", style(env!("CARGO_PKG_NAME")).green().bold());
    println!(
        "{}",
        style(format!("Github: {}", env!("CARGO_PKG_REPOSITORY"))).green()
    );
    println!("{}", render_table(&report_rows(result)));
}

/// Prints `Error: <msg>` in red to stderr.
pub fn error(msg: &str) {
    eprintln!(
        "{}",
        style(format!("Error: {}", msg.trim())).red().for_stderr()
    );
}

/// Prints an informational line in green to stdout.
pub fn info(msg: &str) {
    println!("{}", style(msg.trim()).green());
}

/// Blocks until the user presses Enter.
pub fn pause_for_enter() -> io::Result<()> {
    println!("Press Enter to exit...");
    Term::stdout().read_line().map(|_| ())
}
