//! Render projection results as CSV, JSON, or a console table

use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::projection::{ProjectionResult, ProjectionSummary, YearRecord};

/// Write one CSV row per year, headed by the ledger column names
pub fn write_csv<W: Write>(result: &ProjectionResult, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in &result.records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the long-format (Year, Metric, Amount) chart series as CSV
pub fn write_chart_csv<W: Write>(result: &ProjectionResult, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for point in result.chart_series() {
        wtr.serialize(point)?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    title: &'a str,
    summary: ProjectionSummary,
    records: &'a [YearRecord],
}

/// Write records plus summary as pretty-printed JSON
pub fn write_json<W: Write>(title: &str, result: &ProjectionResult, writer: W) -> Result<()> {
    let report = JsonReport {
        title,
        summary: result.summary(),
        records: &result.records,
    };
    serde_json::to_writer_pretty(writer, &report)?;
    Ok(())
}

/// Fixed-width table with one row per ledger column and one column per year
pub fn format_table(title: &str, result: &ProjectionResult) -> String {
    let label_width = YearRecord::COLUMNS
        .iter()
        .map(|c| c.len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    out.push_str(&"=".repeat(title.len()));
    out.push_str("\n\n");

    out.push_str(&format!("{:<width$}", "", width = label_width));
    for record in &result.records {
        out.push_str(&format!(" {:>14}", format!("Year {}", record.year)));
    }
    out.push('\n');
    out.push_str(&"-".repeat(label_width + 15 * result.records.len()));
    out.push('\n');

    let rows: Vec<[f64; 22]> = result.records.iter().map(|r| r.values()).collect();
    // Skip the Year column, it is already the header
    for (idx, column) in YearRecord::COLUMNS.iter().enumerate().skip(1) {
        out.push_str(&format!("{:<width$}", column, width = label_width));
        for values in &rows {
            out.push_str(&format!(" {:>14.2}", values[idx]));
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParameterBundle;
    use crate::projection::compute;

    fn default_result() -> ProjectionResult {
        compute(&ParameterBundle::default_inputs()).unwrap()
    }

    #[test]
    fn test_csv_header_and_rows() {
        let mut buf = Vec::new();
        write_csv(&default_result(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], YearRecord::COLUMNS.join(","));
        assert!(lines[1].starts_with("1,10.0,4.0,0.0,4.0,6.0,0.0,6.0,10.0,156000.0,168000.0,100000.0,424000.0"));
    }

    #[test]
    fn test_csv_roundtrip_records() {
        let result = default_result();
        let mut buf = Vec::new();
        write_csv(&result, &mut buf).unwrap();

        let mut rdr = csv::Reader::from_reader(buf.as_slice());
        let records = rdr
            .deserialize::<YearRecord>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(records.len(), 7);
        assert_eq!(records[6].year, 7);
    }

    #[test]
    fn test_chart_csv() {
        let mut buf = Vec::new();
        write_chart_csv(&default_result(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Year,Metric,Amount");
        assert_eq!(lines.len(), 1 + 7 * 3);
        assert_eq!(lines[1], "1,Total Revenue,424000.0");
    }

    #[test]
    fn test_json_report() {
        let mut buf = Vec::new();
        write_json("Financial Simulator", &default_result(), &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["title"], "Financial Simulator");
        assert_eq!(value["records"].as_array().unwrap().len(), 7);
        assert_eq!(value["records"][0]["Cumulative Cash"], 1_321_250.0);
        assert_eq!(value["summary"]["total_years"], 7);
    }

    #[test]
    fn test_table_layout() {
        let table = format_table("Financial Simulator", &default_result());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "Financial Simulator");
        assert!(lines[3].contains("Year 1") && lines[3].contains("Year 7"));
        // title, underline, blank, header, rule, 21 metric rows
        assert_eq!(lines.len(), 5 + 21);
        assert!(table.contains("Cumulative Cash"));
        assert!(table.contains("1321250.00"));
    }
}
