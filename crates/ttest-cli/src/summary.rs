//! Console rendering with `comfy-table`.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};
use ttest_core::{MemoryResultStore, RunSummary};
use ttest_model::Variable;
use ttest_report::{Cell as ReportCell, ColumnHeader, OutputData, ROW_HEADER_KEY};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS);
}

fn apply_result_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS);
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}

/// The variable roster of a dataset.
pub fn roster_table(variables: &[Variable]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Name"),
        header_cell("Label"),
        header_cell("Type"),
        header_cell("Measure"),
        header_cell("Decimals"),
    ]);
    apply_table_style(&mut table);
    for variable in variables {
        table.add_row(vec![
            Cell::new(variable.column_index).set_alignment(CellAlignment::Right),
            Cell::new(&variable.name),
            match &variable.label {
                Some(label) => Cell::new(label),
                None => dim_cell("-"),
            },
            Cell::new(variable.var_type.as_str()),
            Cell::new(variable.measure.as_str()),
            Cell::new(variable.decimals).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Header label of a leaf column, prefixed by its group headers.
fn leaf_labels(header: &ColumnHeader, prefix: &str, out: &mut Vec<(String, String)>) {
    let label = if prefix.is_empty() {
        header.header.clone()
    } else {
        format!("{prefix} / {}", header.header)
    };
    match &header.key {
        Some(key) if header.children.is_empty() => out.push((key.clone(), label)),
        _ => {
            for child in &header.children {
                leaf_labels(child, &label, out);
            }
        }
    }
}

/// One result table for the console. Nested headers are flattened into
/// `Group / Leaf` labels.
pub fn result_table(table: &ttest_report::Table) -> Table {
    let mut leaves = Vec::new();
    for header in &table.column_headers {
        leaf_labels(header, "", &mut leaves);
    }
    let header_depth = table
        .rows
        .iter()
        .map(|row| row.row_header.len())
        .max()
        .unwrap_or(1);

    let mut rendered = Table::new();
    let mut headers = Vec::new();
    for (key, label) in &leaves {
        if key == ROW_HEADER_KEY {
            headers.extend((0..header_depth).map(|_| header_cell("")));
        } else {
            headers.push(header_cell(label));
        }
    }
    rendered.set_header(headers);
    apply_result_table_style(&mut rendered);

    for row in &table.rows {
        let mut cells = Vec::new();
        for (key, _) in &leaves {
            if key == ROW_HEADER_KEY {
                cells.extend(
                    (0..header_depth)
                        .map(|i| Cell::new(row.row_header.get(i).map_or("", String::as_str))),
                );
            } else {
                cells.push(match row.get(key) {
                    Some(ReportCell::Integer(v)) => {
                        Cell::new(v).set_alignment(CellAlignment::Right)
                    }
                    Some(ReportCell::Text(s)) => Cell::new(s).set_alignment(CellAlignment::Right),
                    Some(ReportCell::Empty) | None => dim_cell("."),
                });
            }
        }
        rendered.add_row(cells);
    }
    rendered
}

/// Every persisted statistic, grouped under its analytic.
pub fn print_results(store: &MemoryResultStore) -> anyhow::Result<()> {
    for log in &store.logs {
        println!("{}", log.log);
    }
    for analytic in &store.analytics {
        println!();
        println!("{}", analytic.title);
        for statistic in store.statistics_for(analytic.id) {
            for table in OutputData::parse_tables(&statistic.output_data)? {
                println!("{}", table.title);
                println!("{}", result_table(&table));
            }
        }
        if let Some(note) = &analytic.note {
            println!("Note:");
            for line in note.lines() {
                println!("  {line}");
            }
        }
    }
    Ok(())
}

pub fn print_run_summary(summary: &RunSummary) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Units"),
        header_cell("Succeeded"),
        header_cell("Failed"),
        header_cell("Tables"),
    ]);
    apply_table_style(&mut table);
    let failed = if summary.failed > 0 {
        Cell::new(summary.failed).fg(Color::Red)
    } else {
        Cell::new(summary.failed)
    };
    table.add_row(vec![
        Cell::new(summary.dispatched),
        Cell::new(summary.succeeded).fg(Color::Green),
        failed,
        Cell::new(summary.statistics.len()),
    ]);
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use ttest_report::Row;

    use super::*;

    #[test]
    fn nested_headers_flatten() {
        let mut table = ttest_report::Table::new(
            "Paired Samples Test",
            vec![
                ColumnHeader::row_header(),
                ColumnHeader::group(
                    "Paired Differences",
                    vec![
                        ColumnHeader::leaf("Mean", "Mean"),
                        ColumnHeader::group(
                            "95% Confidence Interval of the Difference",
                            vec![ColumnHeader::leaf("Lower", "Lower")],
                        ),
                    ],
                ),
                ColumnHeader::leaf("df", "df"),
            ],
        );
        table.push(
            Row::new(["Pair 1", "pre - post"])
                .cell("Mean", "-1.7500")
                .cell("Lower", ReportCell::Empty)
                .cell("df", 9usize),
        );

        let rendered = result_table(&table).to_string();
        assert!(rendered.contains("Paired Differences / Mean"));
        assert!(rendered.contains("Paired Differences / 95% Confidence Interval of the Difference / Lower"));
        assert!(rendered.contains("pre - post"));
        assert!(rendered.contains("-1.7500"));
        assert_eq!(result_table(&table).column_iter().count(), 5);
    }

    #[test]
    fn roster_lists_every_variable() {
        let table = roster_table(&[
            Variable::new("group", 0).with_label("Treatment group"),
            Variable::new("score", 1),
        ]);
        let rendered = table.to_string();
        assert!(rendered.contains("Treatment group"));
        assert!(rendered.contains("score"));
    }
}
