//! Rendering of command results as tables or JSON.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// How command results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned rows for a terminal
    #[default]
    Table,
    /// Pretty-printed JSON for scripts
    Json,
}

fn json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\":\"unserializable output: {e}\"}}"))
}

/// Print rows as a table, or as a JSON array.
pub fn print_list<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", json(rows)),
        OutputFormat::Table if rows.is_empty() => println!("(none)"),
        OutputFormat::Table => println!("{}", Table::new(rows).with(Style::sharp())),
    }
}

/// Print one value: debug layout for terminals, JSON otherwise.
pub fn print_item<T: Serialize + std::fmt::Debug>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", json(value)),
        OutputFormat::Table => println!("{value:#?}"),
    }
}

/// Report a completed action on stdout.
pub fn print_success(msg: &str) {
    println!("ok: {msg}");
}

/// Report a failure on stderr.
pub fn print_error(msg: &str) {
    eprintln!("error: {msg}");
}

/// Print an indented `label: value` line.
pub fn print_kv(label: &str, value: &str) {
    let label = format!("{label}:");
    println!("    {label:<16}{value}");
}
