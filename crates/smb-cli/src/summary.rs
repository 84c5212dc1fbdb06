use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use smb_cli::types::RunReport;
use smb_load::LoadReport;

pub fn print_summary(report: &RunReport) {
    if report.dry_run {
        println!("Dry run: no files or database were written");
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Step"),
        header_cell("Files"),
        header_cell("Rewritten"),
        header_cell("Nulls"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=3 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut total_examined = 0usize;
    let mut total_nulls = 0usize;
    for step in &report.steps {
        total_examined += step.examined;
        total_nulls += step.nulls;
        table.add_row(vec![
            Cell::new(&step.step),
            Cell::new(step.examined),
            count_cell(step.rewritten, Color::Green),
            count_cell(step.nulls, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_examined).add_attribute(Attribute::Bold),
        Cell::new(report.rewritten()).add_attribute(Attribute::Bold),
        Cell::new(total_nulls).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    if let Some(load) = report.load() {
        print_load_summary(load);
    }
}

fn print_load_summary(load: &LoadReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Columns"),
        header_cell("Rows"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for loaded in &load.tables {
        table.add_row(vec![
            Cell::new(&loaded.name),
            Cell::new(loaded.columns),
            Cell::new(loaded.rows),
        ]);
    }
    for name in &load.declared {
        table.add_row(vec![Cell::new(name), dim_cell("relationship"), dim_cell("-")]);
    }
    println!("{table}");
    if !load.shadowed.is_empty() {
        println!(
            "Relationship tables not declared (a loaded table has the same name): {}",
            load.shadowed.join(", ")
        );
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
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

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
