//! Table formatting using comfy-table.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::campaign::{CampaignReport, Tally};

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: &str) -> Cell {
    if super::no_color() {
        Cell::new(text)
    } else {
        Cell::new(text).add_attribute(Attribute::Bold).fg(Color::Cyan)
    }
}

fn count_cell(count: u64, alert: Option<Color>) -> Cell {
    let cell = Cell::new(count).set_alignment(CellAlignment::Right);
    match alert {
        Some(color) if count > 0 && !super::no_color() => cell.fg(color),
        _ => cell,
    }
}

fn tally_cells(tally: &Tally) -> Vec<Cell> {
    vec![
        count_cell(tally.passed, None),
        count_cell(tally.skipped, None),
        count_cell(tally.unexpected, Some(Color::Yellow)),
        count_cell(tally.findings, Some(Color::Red)),
    ]
}

/// One row per worker plus a total row.
pub fn summary_table(report: &CampaignReport) -> Table {
    let mut table = base_table();
    table.set_header(
        ["Worker", "Seed", "Passed", "Skipped", "Unexpected", "Findings"]
            .into_iter()
            .map(header_cell)
            .collect::<Vec<_>>(),
    );

    let mut workers: Vec<_> = report.workers.iter().collect();
    workers.sort_by_key(|w| w.index);
    for worker in workers {
        let mut row = vec![Cell::new(worker.index), Cell::new(worker.seed)];
        row.extend(tally_cells(&worker.tally));
        table.add_row(row);
    }
    for failure in &report.failures {
        let failed = if super::no_color() {
            Cell::new("failed")
        } else {
            Cell::new("failed").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(failure.index),
            Cell::new(failure.seed),
            failed,
        ]);
    }

    let mut total = vec![header_cell("total"), Cell::new("")];
    total.extend(tally_cells(&report.tally));
    table.add_row(total);
    table
}

/// Creates a key-value info table (two columns: key and value).
pub fn info_table(entries: &[(&str, String)]) -> Table {
    let mut table = base_table();
    for (key, value) in entries {
        let key_cell = if super::no_color() {
            Cell::new(key)
        } else {
            Cell::new(key).fg(Color::DarkGrey)
        };
        table.add_row(vec![key_cell, Cell::new(value)]);
    }
    table
}
