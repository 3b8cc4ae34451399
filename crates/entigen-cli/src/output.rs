// Output formatting and styling

use colored::{ColoredString, Colorize};

use crate::logging::VerbosityLevel;

/// Output styling configuration
pub struct OutputStyle {
    pub use_colors: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl OutputStyle {
    fn marked(&self, marker: &str, paint: fn(&str) -> ColoredString, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", paint(marker), msg)
        } else {
            format!("{} {}", marker, msg)
        }
    }

    fn paint(&self, text: &str, paint: fn(&str) -> ColoredString) -> String {
        if self.use_colors {
            paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Format success message
    pub fn success(&self, msg: &str) -> String {
        self.marked("✓", |m| m.green().bold(), msg)
    }

    /// Format error message
    pub fn error(&self, msg: &str) -> String {
        self.marked("✗", |m| m.red().bold(), msg)
    }

    /// Format warning message
    pub fn warning(&self, msg: &str) -> String {
        self.marked("⚠", |m| m.yellow(), msg)
    }

    /// Format info message
    pub fn info(&self, msg: &str) -> String {
        self.marked("ℹ", |m| m.blue(), msg)
    }

    /// Paths, type names and other literal text
    pub fn code(&self, code: &str) -> String {
        self.paint(code, |c| c.cyan())
    }

    /// Format header
    pub fn header(&self, title: &str) -> String {
        self.paint(title, |t| t.bold())
    }

    /// Title followed by a rule as wide as the title
    pub fn section(&self, title: &str) -> String {
        let rule = "─".repeat(title.chars().count());
        format!("\n{}\n{}", self.paint(title, |t| t.bold().underline()), rule)
    }

    /// Format a list item
    pub fn list_item(&self, item: &str) -> String {
        format!("  • {}", item)
    }

    /// Format a key-value pair
    pub fn key_value(&self, key: &str, value: &str) -> String {
        format!("  {}: {}", self.paint(key, |k| k.bold()), value)
    }
}

/// Print a success line; suppressed in quiet mode
pub fn print_success(msg: &str) {
    if VerbosityLevel::Normal.should_output() {
        println!("{}", OutputStyle::default().success(msg));
    }
}

/// Print an error to stderr
pub fn print_error(msg: &str) {
    eprintln!("{}", OutputStyle::default().error(msg));
}

/// Print a warning to stderr
pub fn print_warning(msg: &str) {
    eprintln!("{}", OutputStyle::default().warning(msg));
}

/// Print an informational line; suppressed in quiet mode
pub fn print_info(msg: &str) {
    if VerbosityLevel::Normal.should_output() {
        println!("{}", OutputStyle::default().info(msg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> OutputStyle {
        OutputStyle { use_colors: false }
    }

    #[test]
    fn test_markers_without_colors() {
        let style = plain();
        assert_eq!(style.success("wrote 9 files"), "✓ wrote 9 files");
        assert_eq!(style.error("conflict"), "✗ conflict");
        assert_eq!(style.warning("stray template"), "⚠ stray template");
        assert_eq!(style.info("dry run"), "ℹ dry run");
    }

    #[test]
    fn test_plain_text_is_untouched() {
        let style = plain();
        assert_eq!(style.code("internal/invoice/model.go"), "internal/invoice/model.go");
        assert_eq!(style.header("Plan"), "Plan");
        assert_eq!(style.key_value("Artifacts", "9"), "  Artifacts: 9");
        assert_eq!(style.list_item("docs/invoice.md"), "  • docs/invoice.md");
    }

    #[test]
    fn test_section_rule_matches_title_width() {
        let section = plain().section("Type mapping: mysql");
        let lines: Vec<&str> = section.lines().collect();
        assert_eq!(lines, vec!["", "Type mapping: mysql", &"─".repeat(19)]);
    }

    #[test]
    fn test_colors_wrap_marker_only() {
        colored::control::set_override(true);
        let style = OutputStyle { use_colors: true };
        let line = style.success("done");
        colored::control::unset_override();
        assert!(line.ends_with(" done"));
        assert!(line.contains('✓'));
    }
}
