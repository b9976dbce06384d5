//! Output formatting: table, JSON, YAML, plain.
//!
//! Catalog listings render through `tabled`; diff and view reports are
//! already aligned text and only switch to serde for structured formats.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use devconfig_core::Report;

use crate::cli::{ColorMode, OutputFormat};

/// Determine whether color output should be enabled on stderr.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
        structured => render_structured(structured, data),
    }
}

/// Render a diff or view report.
///
/// Table and plain print the aligned text; the other formats serialize the
/// whole report, value maps included.
pub fn render_report(format: &OutputFormat, report: &Report) -> String {
    match format {
        OutputFormat::Table | OutputFormat::Plain => report.text.trim_end().to_owned(),
        structured => render_structured(structured, report),
    }
}

/// Render a single serde-serializable item in the chosen format.
pub fn render_single<T: Serialize>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
) -> String {
    match format {
        OutputFormat::Table | OutputFormat::Plain => detail_fn(data),
        structured => render_structured(structured, data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print partial-failure warnings to stderr.
pub fn print_warnings(warnings: &[String], color: &ColorMode, quiet: bool) {
    if quiet {
        return;
    }
    let color = should_color(color);
    let mut stderr = io::stderr().lock();
    for warning in warnings {
        if color {
            let _ = writeln!(stderr, "{} {warning}", "warning:".yellow().bold());
        } else {
            let _ = writeln!(stderr, "warning: {warning}");
        }
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_structured<T: Serialize + ?Sized>(format: &OutputFormat, data: &T) -> String {
    let rendered = match format {
        OutputFormat::JsonCompact => serde_json::to_string(data).map_err(|e| e.to_string()),
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(|e| e.to_string()),
        _ => serde_json::to_string_pretty(data).map_err(|e| e.to_string()),
    };
    rendered.unwrap_or_else(|e| format!("serialization failed: {e}"))
}
