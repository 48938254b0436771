//! Output formatting utilities for CLI commands

use chrono::{DateTime, Local};
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};

/// Format a record timestamp; `0.0` means the asset was never processed.
pub fn format_timestamp(secs: f64) -> String {
    if secs <= 0.0 {
        return "never".to_string();
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1_000_000_000.0) as u32;
    match DateTime::from_timestamp(whole as i64, nanos) {
        Some(utc) => utc.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => format!("{secs:.3}"),
    }
}

/// Build a compact table with cyan headers; the caller prints it.
pub fn build_table<R>(headers: &[&str], rows: R) -> Table
where
    R: IntoIterator<Item = Vec<Cell>>,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|title| Cell::new(title).fg(Color::Cyan)));
    for row in rows {
        table.add_row(row);
    }
    table
}

/// `yes` in `color` when set, plain `no` otherwise.
pub fn flag_cell(set: bool, color: Color) -> Cell {
    if set {
        Cell::new("yes").fg(color)
    } else {
        Cell::new("no")
    }
}

/// Print lines meant for the operator.
pub fn print_messages<'a>(lines: impl IntoIterator<Item = &'a String>) {
    for line in lines {
        println!("{line}");
    }
}
