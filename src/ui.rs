//! Styled terminal output helpers.
//!
//! Styling goes through the `console` crate so colors degrade
//! gracefully when stdout is not a terminal.

use console::style;

/// Print an error message in red to stderr.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Print a success message with a green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Print a flow step progress line.
pub fn display_step(message: &str) {
    println!("{} {}", style(">>").green(), message);
}

/// Print the version change applied by a bump.
pub fn display_version_change(previous: &str, current: &str) {
    println!(
        "{} version bumped: {} -> {}",
        style(">>").green(),
        style(previous).red(),
        style(current).green()
    );
}
