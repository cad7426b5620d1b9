//! Human-readable run summaries.

use std::path::PathBuf;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use rowkey_core::{ProcessingResult, UserRecord};

/// Default number of duplicate rows listed.
pub const DEFAULT_DUPLICATE_LIMIT: usize = 5;

/// A finished `generate` run.
#[derive(Debug)]
pub struct GenerateReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: ProcessingResult,
}

pub fn print_summary(report: &GenerateReport, duplicate_limit: usize) {
    println!("{}", summary_table(report));
    if let Some(table) = duplicate_table(&report.result, duplicate_limit) {
        let duplicates = report.result.duplicates().len();
        println!();
        println!("Warning: {duplicates} duplicate IDs found:");
        println!("{table}");
        if duplicates > duplicate_limit {
            println!("... and {} more", duplicates - duplicate_limit);
        }
        println!("Consider using a different ID generation method.");
    }
}

pub fn summary_table(report: &GenerateReport) -> Table {
    let result = &report.result;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Run"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Left);
    table.add_row(vec![
        label_cell("Input"),
        Cell::new(report.input.display()),
    ]);
    table.add_row(vec![
        label_cell("Output"),
        Cell::new(report.output.display()),
    ]);
    table.add_row(vec![label_cell("Method"), Cell::new(result.method())]);
    table.add_row(vec![
        label_cell("Rows processed"),
        Cell::new(result.total_rows()).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        label_cell("Unique IDs"),
        Cell::new(result.distinct_count()).add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        label_cell("Duplicates"),
        count_cell(result.duplicates().len(), Color::Yellow),
    ]);
    table
}

/// Lists the first `limit` duplicates, or `None` when there are none.
pub fn duplicate_table(result: &ProcessingResult, limit: usize) -> Option<Table> {
    if !result.has_duplicates() {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("USER_ID"),
        header_cell("Scheda"),
        header_cell("Cliente"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for duplicate in result.duplicates().iter().take(limit) {
        table.add_row(vec![
            Cell::new(duplicate.row),
            Cell::new(&duplicate.id).fg(Color::Yellow),
            Cell::new(&duplicate.record_number),
            Cell::new(&duplicate.client_code),
        ]);
    }
    Some(table)
}

pub fn user_table(user: &UserRecord) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Value")]);
    apply_table_style(&mut table);
    table.add_row(vec![label_cell("USER_ID"), Cell::new(&user.user_id)]);
    table.add_row(vec![
        label_cell("Scheda numero"),
        Cell::new(&user.record_number),
    ]);
    table.add_row(vec![
        label_cell("Codice cliente"),
        Cell::new(&user.client_code),
    ]);
    table.add_row(vec![
        label_cell("Email"),
        match &user.email {
            Some(email) => Cell::new(email),
            None => dim_cell("-"),
        },
    ]);
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn label_cell(label: &str) -> Cell {
    Cell::new(label).fg(Color::Blue)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
