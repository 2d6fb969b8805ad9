// Output rendering: human-aligned table or CSV, fixed column order.

use std::io::Write;

use anyhow::{Context, Result};

use crate::model::KpiRecord;

const COLUMNS: [&str; 7] = ["Name", "Team", "Position", "GP", "PTS", "Salary", "PricePerPoint"];

/// How many leading columns are text (left-aligned); the rest are numeric
/// (right-aligned).
const TEXT_COLUMNS: usize = 3;

fn row_cells(record: &KpiRecord) -> [String; 7] {
    [
        record.name.clone(),
        record.team.clone(),
        record.position.clone(),
        record.gp.to_string(),
        format_number(record.pts),
        format_number(record.salary),
        format!("{:.4}", record.price_per_point),
    ]
}

/// Whole numbers print without a fraction, everything else with two places.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

/// Render the ranked rows as a space-aligned table, header included.
pub fn render_table(records: &[KpiRecord]) -> String {
    let rows: Vec<[String; 7]> = records.iter().map(row_cells).collect();

    let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.len()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    render_row(&mut out, &COLUMNS.map(String::from), &widths);
    for row in &rows {
        render_row(&mut out, row, &widths);
    }
    out
}

fn render_row(out: &mut String, cells: &[String; 7], widths: &[usize]) {
    for (i, (cell, &width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        if i < TEXT_COLUMNS {
            out.push_str(&format!("{cell:<width$}"));
        } else {
            out.push_str(&format!("{cell:>width$}"));
        }
    }
    // No trailing pad before the newline.
    while out.ends_with(' ') {
        out.pop();
    }
    out.push('\n');
}

/// Write the ranked rows as CSV, header included.
pub fn write_csv<W: Write>(writer: W, records: &[KpiRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(COLUMNS)
        .context("failed to write CSV header")?;
    for record in records {
        csv_writer
            .write_record([
                record.name.as_str(),
                record.team.as_str(),
                record.position.as_str(),
                &record.gp.to_string(),
                &record.pts.to_string(),
                &record.salary.to_string(),
                &record.price_per_point.to_string(),
            ])
            .context("failed to write CSV row")?;
    }
    csv_writer.flush().context("failed to flush CSV output")?;
    Ok(())
}
