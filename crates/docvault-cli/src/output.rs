//! Console output helpers.

use docvault_core::warning::Warning;

/// Print a success line.
pub fn print_success(message: &str) {
    println!("✓ {message}");
}

/// Print a warning line.
pub fn print_warning(warning: &Warning) {
    println!("⚠ {warning}");
}

/// Print a key/value detail line.
pub fn print_field(key: &str, value: &str) {
    println!("  {key:<18} {value}");
}
