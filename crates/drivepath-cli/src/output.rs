//! Output formatting for human and JSON modes

use colored::Colorize;
use drivepath_core::domain::Record;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);
    /// One line per listed record; `long` adds the modification time
    fn record(&self, record: &Record, long: bool);
}

/// Renders a record path, directories highlighted with a trailing slash
pub fn render_record(record: &Record, long: bool) -> String {
    let path = if record.is_dir() && !record.is_root() {
        format!("{}/", record.path()).blue().bold().to_string()
    } else {
        record.path().to_string()
    };

    if !long {
        return path;
    }

    let modified = record
        .modified_time()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".repeat(16));
    format!("{}  {}", modified.dimmed(), path)
}

/// Human-readable output formatter with checkmarks and colors
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("{} {}", "\u{2713}".green(), message);
    }
    fn error(&self, message: &str) {
        eprintln!("{} {}", "\u{2717} Error:".red(), message);
    }
    fn warn(&self, message: &str) {
        eprintln!("{} {}", "\u{26a0} Warning:".yellow(), message);
    }
    fn info(&self, message: &str) {
        println!("  {}", message);
    }
    fn print_json(&self, _value: &serde_json::Value) {}
    fn record(&self, record: &Record, long: bool) {
        println!("{}", render_record(record, long));
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn warn(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"level": "warning", "message": message})
        );
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
    fn record(&self, _record: &Record, _long: bool) {}
}

pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter)
    }
}
