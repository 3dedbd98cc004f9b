//! Result rows returned by the scoring backend and the sinks that display them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::Write;

/// One scored alternative: column name to value, in the order the backend sent them.
pub type ResultRow = Map<String, Value>;

/// Successful response payload kept by the controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub rows: Vec<ResultRow>,
    /// Backend-relative link to the CSV export of these rows, when offered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download: Option<String>,
}

impl ResultTable {
    pub fn new(rows: Vec<ResultRow>) -> Self {
        Self {
            rows,
            download: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> Vec<String> {
        columns_of(&self.rows)
    }
}

/// Union of column names across rows in first-seen order.
pub fn columns_of(rows: &[ResultRow]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.iter().any(|existing| existing == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// Renders a cell the way a table shows it: strings bare, null empty.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Passive receiver of a successful result.
pub trait ResultSink {
    type Error;

    fn display(&mut self, rows: Vec<ResultRow>) -> Result<(), Self::Error>;
}

/// Aligned plain-text table for terminals.
#[derive(Debug)]
pub struct TextTableSink<W: Write> {
    out: W,
}

impl<W: Write> TextTableSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for TextTableSink<W> {
    type Error = std::io::Error;

    fn display(&mut self, rows: Vec<ResultRow>) -> Result<(), Self::Error> {
        if rows.is_empty() {
            return writeln!(self.out, "(no rows)");
        }

        let columns = columns_of(&rows);
        let cells: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| cell_text(row.get(column)))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                cells
                    .iter()
                    .map(|line| line[idx].chars().count())
                    .chain(std::iter::once(column.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write_line(&mut self.out, &columns, &widths)?;
        let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        write_line(&mut self.out, &rule, &widths)?;
        for line in &cells {
            write_line(&mut self.out, line, &widths)?;
        }
        self.out.flush()
    }
}

fn write_line<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> std::io::Result<()> {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    writeln!(out, "{}", padded.join(" | ").trim_end())
}

/// Writes the rows as CSV with a header line.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(out),
        }
    }

    pub fn into_inner(self) -> Result<W, csv::Error> {
        self.writer
            .into_inner()
            .map_err(|err| csv::Error::from(err.into_error()))
    }
}

impl<W: Write> ResultSink for CsvSink<W> {
    type Error = csv::Error;

    fn display(&mut self, rows: Vec<ResultRow>) -> Result<(), Self::Error> {
        let columns = columns_of(&rows);
        if columns.is_empty() {
            return Ok(());
        }

        self.writer.write_record(&columns)?;
        for row in &rows {
            self.writer.write_record(
                columns
                    .iter()
                    .map(|column| cell_text(row.get(column))),
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Sink that keeps what it was handed; used where a caller wants the rows back.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    pub received: Vec<Vec<ResultRow>>,
}

impl ResultSink for CollectingSink {
    type Error = std::convert::Infallible;

    fn display(&mut self, rows: Vec<ResultRow>) -> Result<(), Self::Error> {
        self.received.push(rows);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> ResultRow {
        value.as_object().cloned().expect("object row")
    }

    fn sample_rows() -> Vec<ResultRow> {
        vec![
            row(json!({"Fund": "M1", "P1": 0.84, "Topsis Score": 0.53, "Rank": 2})),
            row(json!({"Fund": "M2", "P1": 0.91, "Topsis Score": 0.61, "Rank": 1})),
        ]
    }

    #[test]
    fn columns_keep_backend_order_and_union_late_keys() {
        let mut rows = sample_rows();
        rows[1].insert("Note".to_string(), json!("late"));
        assert_eq!(
            columns_of(&rows),
            vec!["Fund", "P1", "Topsis Score", "Rank", "Note"]
        );
    }

    #[test]
    fn text_sink_aligns_columns() {
        let mut sink = TextTableSink::new(Vec::new());
        sink.display(sample_rows()).expect("render");
        let text = String::from_utf8(sink.into_inner()).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Fund | P1   | Topsis Score | Rank");
        assert!(lines[1].starts_with("---- | ----"));
        assert_eq!(lines[2], "M1   | 0.84 | 0.53         | 2");
    }

    #[test]
    fn text_sink_reports_empty_table() {
        let mut sink = TextTableSink::new(Vec::new());
        sink.display(Vec::new()).expect("render");
        assert_eq!(
            String::from_utf8(sink.into_inner()).expect("utf8"),
            "(no rows)\n"
        );
    }

    #[test]
    fn csv_sink_writes_header_and_missing_cells_empty() {
        let mut rows = sample_rows();
        rows[0] = row(json!({"Fund": "M1", "Topsis Score": 0.53, "Rank": 2}));
        let mut sink = CsvSink::new(Vec::new());
        sink.display(rows).expect("csv");
        let text = String::from_utf8(sink.into_inner().expect("flush")).expect("utf8");
        assert_eq!(
            text,
            "Fund,Topsis Score,Rank,P1\nM1,0.53,2,\nM2,0.61,1,0.91\n"
        );
    }
}
