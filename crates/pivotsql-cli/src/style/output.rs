//! One-line status messages printed around the summary table.

use super::colors::SemanticStyle;

pub fn print_success(msg: &str) {
    println!("{} {msg}", "✓".success());
}

/// Findings and failed workers. Printed to stdout with the rest of the report.
pub fn print_error(msg: &str) {
    println!("{} {msg}", "✗".error());
}

pub fn print_warn(msg: &str) {
    println!("{} {msg}", "⚠".warning());
}

/// Follow-up advice, dimmed.
pub fn print_hint(msg: &str) {
    println!("{} {}", "→".muted(), msg.muted());
}

/// `  key: value`, key dimmed.
pub fn print_labeled(key: &str, value: &str) {
    println!("  {}: {value}", key.muted());
}

pub fn print_section(title: &str) {
    println!("{}", title.header());
}

pub fn print_spacer() {
    println!();
}
