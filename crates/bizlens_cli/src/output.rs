//! Terminal output helpers. Styled text for humans, one JSON object per
//! line for scripts.
//!
//! Uses:
//! - `console` for colors (respects NO_COLOR, auto-disables when piped)
//! - `comfy-table` for structured data
//! - `indicatif` for spinners

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::cli::OutputFormat;

// ── Global format flag ─────────────────────────────────────────────

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(format: OutputFormat) {
    if matches!(format, OutputFormat::Json) {
        JSON_MODE.store(true, Ordering::Relaxed);
    }
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

// ── JSON envelope ──────────────────────────────────────────────────

#[derive(Serialize)]
struct Msg<'a> {
    level: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a JsonValue>,
}

fn to_json_line(level: &str, message: &str, data: Option<&JsonValue>) -> String {
    let msg = Msg {
        level,
        message,
        data,
    };
    serde_json::to_string(&msg).unwrap_or_else(|_| {
        serde_json::json!({ "level": level, "message": message }).to_string()
    })
}

fn emit_json(level: &str, message: &str, data: Option<&JsonValue>) {
    println!("{}", to_json_line(level, message, data));
}

// ── Public helpers ─────────────────────────────────────────────────

pub fn header(text: &str) {
    if is_json() {
        emit_json("info", text, None);
    } else {
        println!("{}", style(text).bold().cyan());
    }
}

pub fn success(text: &str) {
    if is_json() {
        emit_json("success", text, None);
    } else {
        println!("{} {}", style("✓").green(), style(text).bright());
    }
}

pub fn error(text: &str) {
    if is_json() {
        eprintln!("{}", to_json_line("error", text, None));
    } else {
        eprintln!("{} {}", style("✗").red(), style(text).bright());
    }
}

pub fn warning(text: &str) {
    if is_json() {
        emit_json("warning", text, None);
    } else {
        println!("{} {}", style("!").yellow(), style(text).bright());
    }
}

pub fn dim(text: &str) {
    if is_json() {
        emit_json("info", text, None);
    } else {
        println!("{}", style(text).dim());
    }
}

/// A message from the analyst that is not a streamed reply (greetings).
pub fn assistant(text: &str) {
    if is_json() {
        let data = serde_json::json!({ "role": "model", "text": text });
        emit_json("message", "", Some(&data));
    } else {
        println!("{} {}", style("bizlens").magenta().bold(), text);
    }
}

/// Emit an arbitrary serializable value as structured output.
pub fn data<T: Serialize>(label: &str, value: &T) {
    if is_json() {
        let json_val = serde_json::to_value(value).unwrap_or(JsonValue::Null);
        emit_json("data", label, Some(&json_val));
    } else {
        let formatted =
            serde_json::to_string_pretty(value).unwrap_or_else(|_| format!("{label}: <?>"));
        println!("{formatted}");
    }
}

/// Print a key-value pair with styled key.
pub fn kv(key: &str, value: &str) {
    if is_json() {
        let data = serde_json::json!({ key: value });
        emit_json("info", key, Some(&data));
    } else {
        println!("  {} {}", style(key).cyan().bold(), value);
    }
}

/// Input prompt for the interactive session. Silent in JSON mode.
pub fn prompt(label: &str) {
    if !is_json() {
        print!("{} ", style(label).green().bold());
        let _ = std::io::stdout().flush();
    }
}

// ── Streaming replies ──────────────────────────────────────────────

/// Prints a cumulative reply incrementally: each update writes only the
/// part not yet on screen.
#[derive(Debug, Default)]
pub struct StreamPrinter {
    shown: String,
}

impl StreamPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `text`, the full reply so far.
    pub fn update(&mut self, text: &str) {
        if is_json() {
            self.shown = text.to_string();
            return;
        }
        let suffix = self.next_suffix(text);
        print!("{suffix}");
        let _ = std::io::stdout().flush();
    }

    /// End the reply line.
    pub fn finish(&mut self) {
        if !is_json() && !self.shown.is_empty() {
            println!();
        }
    }

    /// Text printed so far.
    pub fn shown(&self) -> &str {
        &self.shown
    }

    fn next_suffix(&mut self, text: &str) -> String {
        let suffix = match text.strip_prefix(self.shown.as_str()) {
            Some(rest) => rest.to_string(),
            // Replies only grow; anything else is redrawn on a fresh line.
            None if self.shown.is_empty() => text.to_string(),
            None => format!("\n{text}"),
        };
        self.shown = text.to_string();
        suffix
    }
}

// ── Tables ─────────────────────────────────────────────────────────

/// Create a styled table for listing items.
pub fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Add a header row to the table.
pub fn table_header(table: &mut Table, columns: &[&str]) {
    table.set_header(
        columns
            .iter()
            .map(|c| Cell::new(c).fg(Color::Cyan).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
}

/// Add a row to the table; the first column is highlighted.
pub fn table_row(table: &mut Table, columns: &[&str]) {
    table.add_row(
        columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                if i == 0 {
                    Cell::new(c).fg(Color::Green)
                } else {
                    Cell::new(c)
                }
            })
            .collect::<Vec<_>>(),
    );
}

/// Print a table (JSON mode emits the items array instead).
pub fn table_print<T: Serialize>(table: &Table, items: &[T]) {
    if is_json() {
        let data = serde_json::json!({ "items": items });
        emit_json("list", "", Some(&data));
    } else {
        println!("{table}");
    }
}

// ── Spinners ───────────────────────────────────────────────────────

/// Create a spinner for async operations. Hidden in JSON mode.
pub fn spinner(message: &str) -> ProgressBar {
    if is_json() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Finish spinner with success message.
pub fn spinner_success(spinner: &ProgressBar, message: &str) {
    spinner.finish_and_clear();
    success(message);
}

/// Finish spinner with error message.
pub fn spinner_error(spinner: &ProgressBar, message: &str) {
    spinner.finish_and_clear();
    error(message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_printer_emits_only_new_text() {
        let mut printer = StreamPrinter::new();
        assert_eq!(printer.next_suffix("Rev"), "Rev");
        assert_eq!(printer.next_suffix("Revenue is"), "enue is");
        assert_eq!(printer.next_suffix("Revenue is"), "");
        assert_eq!(printer.shown(), "Revenue is");
    }

    #[test]
    fn test_stream_printer_redraws_on_divergence() {
        let mut printer = StreamPrinter::new();
        printer.next_suffix("abc");
        assert_eq!(printer.next_suffix("xyz"), "\nxyz");
    }

    #[test]
    fn test_json_line_escapes_message() {
        let line = to_json_line("error", "bad \"quote\"", None);
        let parsed: JsonValue = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["message"], "bad \"quote\"");
        assert!(parsed.get("data").is_none());
    }
}
