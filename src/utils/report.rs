// src/utils/report.rs

//! Console report formatting for CLI output.
//!
//! Diagnostics go through the `log` facade; this module prints the
//! human-facing result blocks (headers, summaries, prospect lines).

use chrono::Local;

/// Format a line with timestamp
fn format_line(message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] {}", timestamp, message)
}

/// Print a plain line
pub fn info(message: &str) {
    println!("{}", format_line(message));
}

/// Print a header
pub fn header(title: &str) {
    let border = "═".repeat(60);
    println!("{}", format_line(&border));
    println!("{}", format_line(&format!("  {}", title)));
    println!("{}", format_line(&border));
}

/// Print a sub-item (indented)
pub fn sub_item(message: &str) {
    println!("{}", format_line(&format!("    {}", message)));
}

/// Render summary items as indented `key: value` lines.
fn summary_lines(title: &str, items: &[(&str, String)]) -> Vec<String> {
    std::iter::once(format!("[SUMMARY] {}", title))
        .chain(items.iter().map(|(key, value)| format!("    {}: {}", key, value)))
        .collect()
}

/// Print a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    println!();
    for line in summary_lines(title, items) {
        println!("{}", format_line(&line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line_keeps_message() {
        let line = format_line("quota low");
        assert!(line.starts_with('['));
        assert!(line.ends_with("] quota low"));
    }

    #[test]
    fn test_summary_lines() {
        let lines = summary_lines(
            "Search",
            &[("Found", "2".to_string()), ("Quota", "3/100".to_string())],
        );
        assert_eq!(
            lines,
            vec!["[SUMMARY] Search", "    Found: 2", "    Quota: 3/100"]
        );
    }
}
