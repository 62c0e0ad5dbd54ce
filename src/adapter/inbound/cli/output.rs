//! CLI output formatting.
//!
//! Human-readable output uses colored symbols; `--json` switches every
//! helper to one JSON object per line; `--quiet` suppresses everything but
//! warnings, errors and explicit JSON.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::OwoColorize;
use serde_json::json;

use crate::domain::{CycleStatus, DecisionSnapshot};

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
}

impl OutputConfig {
    /// Output mode from the global flags.
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    match config_cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn write_config(config: OutputConfig) {
    match config_cell().write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// Check if regular (non-JSON) output should be suppressed.
fn regular_output_suppressed(config: OutputConfig) -> bool {
    !config.json && config.quiet
}

/// Emit a JSON line with type and payload structure.
fn emit_json_line(kind: &str, payload: serde_json::Value) {
    println!(
        "{}",
        json!({
            "type": kind,
            "payload": payload,
        })
    );
}

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig) {
    write_config(config);
}

/// Whether `--json` is active.
#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

/// Whether `--quiet` is active.
#[must_use]
pub fn is_quiet() -> bool {
    read_config().quiet
}

/// Print the application header with name and version.
pub fn header(version: &str) {
    let config = read_config();
    if config.json {
        emit_json_line("header", json!({ "app": "kyute", "version": version }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!("{} {}", "kyute".bold(), version.dimmed());
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let config = read_config();
    let value = value.to_string();

    if config.json {
        emit_json_line("field", json!({ "label": label, "value": value }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!("  {:<16} {}", label.dimmed(), value);
}

/// Print a success line.
pub fn success(message: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("success", json!({ "message": message }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!("  {} {}", "✓".green(), message);
}

/// Print a warning line.
pub fn warning(message: &str) {
    if is_json() {
        emit_json_line("warning", json!({ "message": message }));
        return;
    }

    println!("  {} {}", "⚠".yellow(), message);
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    if is_json() {
        eprintln!(
            "{}",
            json!({
                "type": "error",
                "payload": { "message": message },
            })
        );
        return;
    }

    eprintln!("  {} {}", "×".red(), message);
}

/// Print a section heading.
pub fn section(title: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("section", json!({ "title": title }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!();
    println!("{}", title.bold());
}

/// Print a dimmed note.
pub fn note(message: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("note", json!({ "message": message }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    println!("  {}", message.dimmed());
}

/// Print multiple lines of content, each indented.
pub fn lines(content: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("lines", json!({ "content": content }));
        return;
    }
    if regular_output_suppressed(config) {
        return;
    }

    for line in content.lines() {
        println!("  {line}");
    }
}

/// Emit a JSON value directly (for commands that need custom JSON output).
pub fn json_output(value: serde_json::Value) {
    println!("{value}");
}

/// Print the outcome of one cycle.
///
/// Outcomes are the point of `run --once`, so quiet mode still prints them.
pub fn cycle(snapshot: &DecisionSnapshot) {
    if is_json() {
        let payload = serde_json::to_value(snapshot).unwrap_or_else(|e| json!({ "error": e.to_string() }));
        emit_json_line("cycle", payload);
        return;
    }

    let label = snapshot.status.label();
    let label = match &snapshot.status {
        CycleStatus::Hold { .. } => label.yellow().to_string(),
        CycleStatus::HedgeExecuted { .. } => label.green().to_string(),
        CycleStatus::Failed { .. } => label.red().to_string(),
    };
    let spread = snapshot
        .spread
        .map_or_else(|| "-".to_string(), |s| format!("{} bps", s.spread_bps));
    let score = snapshot
        .composite_score()
        .map_or_else(|| "-".to_string(), |c| c.round_dp(2).to_string());
    let risk = snapshot
        .assessment
        .as_ref()
        .map_or_else(|| "-".to_string(), |a| a.risk_score().to_string());

    println!(
        "  {:<6} {} {} {} {} {} {}",
        snapshot.asset.bold(),
        label,
        format!("fixed {}", snapshot.fixed_rate).dimmed(),
        format!("floating {}", snapshot.floating_rate).dimmed(),
        format!("spread {spread}").cyan(),
        format!("risk {risk}").dimmed(),
        format!("composite {score}").dimmed(),
    );
    match &snapshot.status {
        CycleStatus::Hold { reason } | CycleStatus::Failed { reason } => {
            println!("         {}", reason.dimmed());
        }
        CycleStatus::HedgeExecuted { tx_hash, strategy } => {
            println!("         {} via {}", tx_hash.dimmed(), strategy);
        }
    }
}

/// Format a value in green.
pub fn positive(value: impl Display) -> String {
    let value = value.to_string();
    if is_json() {
        return value;
    }
    format!("{}", value.green())
}

/// Format a value in red.
pub fn negative(value: impl Display) -> String {
    let value = value.to_string();
    if is_json() {
        return value;
    }
    format!("{}", value.red())
}
