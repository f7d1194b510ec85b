//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use mirrorfs_core::types::Envelope;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON envelope output
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Table
    }
}

/// Print a list of items in table form
pub fn print_list<T: Serialize + Tabled>(items: &[T]) {
    if items.is_empty() {
        println!("No results found.");
    } else {
        let table = Table::new(items).to_string();
        println!("{}", table);
    }
}

/// Print a success payload wrapped in the uniform envelope
pub fn print_envelope<T: Serialize>(payload: T) {
    let envelope = Envelope::success(payload);
    let json = serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| "{}".to_string());
    println!("{}", json);
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}
