use owo_colors::{OwoColorize, Stream, Style};
use serde::Serialize;

use crate::types::TimingRow;

pub const CSV_HEADER: &str = "image,request_seconds,model_duration_ms,backend,parse_warnings";

/// Absent values print as the literal `None`.
fn optional_field(value: Option<String>) -> String {
    value.unwrap_or_else(|| "None".to_string())
}

/// CSV report: fixed header, then one line per row in input order.
///
/// Fields are not quoted. A value containing a comma shifts the columns of
/// its row.
pub fn format_csv(rows: &[TimingRow]) -> String {
    let mut out = String::new();
    out.push_str(CSV_HEADER);
    out.push('\n');

    for row in rows {
        out.push_str(&format!(
            "{},{:.3},{},{},{}\n",
            row.image,
            row.request_seconds,
            optional_field(row.model_duration_ms.as_ref().map(|n| n.to_string())),
            optional_field(row.backend.clone()),
            row.parse_warnings
        ));
    }

    out
}

#[derive(Serialize)]
struct JsonRow<'a> {
    index: usize,
    image: &'a str,
    started_at: String,
    request_seconds: f64,
    model_duration_ms: Option<&'a serde_json::Number>,
    backend: Option<&'a str>,
    parse_warnings: &'a str,
}

pub fn format_json(rows: &[TimingRow]) -> String {
    let json_rows: Vec<JsonRow> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| JsonRow {
            index: i,
            image: &row.image,
            started_at: row.started_at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            request_seconds: row.request_seconds,
            model_duration_ms: row.model_duration_ms.as_ref(),
            backend: row.backend.as_deref(),
            parse_warnings: &row.parse_warnings,
        })
        .collect();

    serde_json::to_string_pretty(&json_rows).unwrap_or_else(|_| "[]".to_string())
}

/// Aggregate request latency over a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min_seconds: f64,
    pub mean_seconds: f64,
    pub max_seconds: f64,
}

/// `None` for an empty run.
pub fn summarize(rows: &[TimingRow]) -> Option<Summary> {
    if rows.is_empty() {
        return None;
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut total = 0.0;
    for row in rows {
        min = min.min(row.request_seconds);
        max = max.max(row.request_seconds);
        total += row.request_seconds;
    }

    Some(Summary {
        count: rows.len(),
        min_seconds: min,
        mean_seconds: total / rows.len() as f64,
        max_seconds: max,
    })
}

fn style_seconds() -> Style {
    Style::new().yellow().bold()
}

/// Aligned table for reading in a terminal, with a latency footer.
pub fn format_table(rows: &[TimingRow]) -> String {
    let mut out = String::new();

    let image_width = rows
        .iter()
        .map(|r| r.image.chars().count())
        .chain(std::iter::once("image".len()))
        .max()
        .unwrap_or(0);
    let backend_width = rows
        .iter()
        .map(|r| r.backend.as_deref().map_or(1, |b| b.chars().count()))
        .chain(std::iter::once("backend".len()))
        .max()
        .unwrap_or(0);

    let header = format!(
        "{:<iw$}  {:>9}  {:>10}  {:<bw$}  {}",
        "image",
        "request_s",
        "model_ms",
        "backend",
        "parse_warnings",
        iw = image_width,
        bw = backend_width
    );
    out.push_str(
        &header
            .if_supports_color(Stream::Stdout, |s| s.dimmed())
            .to_string(),
    );
    out.push('\n');

    let secs_style = style_seconds();

    for row in rows {
        let image_padded = format!("{:<width$}", row.image, width = image_width);
        let image_colored = image_padded
            .if_supports_color(Stream::Stdout, |s| s.green())
            .to_string();

        let secs_padded = format!("{:>9.3}", row.request_seconds);
        let secs_colored = secs_padded
            .if_supports_color(Stream::Stdout, |s| s.style(secs_style))
            .to_string();

        let model_ms = row
            .model_duration_ms
            .as_ref()
            .map_or_else(|| "-".to_string(), |n| n.to_string());
        let backend = row.backend.as_deref().unwrap_or("-");

        out.push_str(&format!(
            "{}  {}  {:>10}  {:<bw$}  {}\n",
            image_colored,
            secs_colored,
            model_ms,
            backend,
            row.parse_warnings,
            bw = backend_width
        ));
    }

    if let Some(summary) = summarize(rows) {
        let footer = format!(
            "{} request(s): min {:.3}s  mean {:.3}s  max {:.3}s",
            summary.count, summary.min_seconds, summary.mean_seconds, summary.max_seconds
        );
        out.push('\n');
        out.push_str(
            &footer
                .if_supports_color(Stream::Stdout, |s| s.dimmed())
                .to_string(),
        );
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use serde_json::Number;

    fn fixed_start() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-02-18T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn make_row(
        image: &str,
        seconds: f64,
        duration_ms: Option<u64>,
        backend: Option<&str>,
        warnings: &str,
    ) -> TimingRow {
        TimingRow {
            image: image.to_string(),
            started_at: fixed_start(),
            request_seconds: seconds,
            model_duration_ms: duration_ms.map(Number::from),
            backend: backend.map(|s| s.to_string()),
            parse_warnings: warnings.to_string(),
        }
    }

    // --- format_csv ---

    #[test]
    fn csv_empty_is_header_only() {
        assert_eq!(format_csv(&[]), format!("{}\n", CSV_HEADER));
    }

    #[test]
    fn csv_full_row() {
        let rows = vec![make_row("a.png", 2.5, Some(1234), Some("metal"), "a; b")];
        let out = format_csv(&rows);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "a.png,2.500,1234,metal,a; b");
    }

    #[test]
    fn csv_missing_values_print_none() {
        let rows = vec![make_row("b.png", 0.042, None, None, "\u{2014}")];
        let out = format_csv(&rows);
        assert_eq!(out.lines().nth(1).unwrap(), "b.png,0.042,None,None,\u{2014}");
    }

    #[test]
    fn csv_seconds_always_three_decimals() {
        let rows = vec![
            make_row("a.png", 0.0, None, None, "-"),
            make_row("b.png", 12.0, None, None, "-"),
            make_row("c.png", 1.1, None, None, "-"),
        ];
        let out = format_csv(&rows);
        let secs: Vec<&str> = out
            .lines()
            .skip(1)
            .map(|l| l.split(',').nth(1).unwrap())
            .collect();
        assert_eq!(secs, vec!["0.000", "12.000", "1.100"]);
    }

    #[test]
    fn csv_preserves_row_order() {
        let rows = vec![
            make_row("z.png", 1.0, None, None, "-"),
            make_row("a.png", 1.0, None, None, "-"),
            make_row("z.png", 1.0, None, None, "-"),
        ];
        let out = format_csv(&rows);
        let images: Vec<&str> = out
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap())
            .collect();
        assert_eq!(images, vec!["z.png", "a.png", "z.png"]);
    }

    #[test]
    fn csv_comma_in_value_is_not_escaped() {
        let rows = vec![make_row("a.png", 1.0, Some(5), Some("cpu"), "x, y")];
        let out = format_csv(&rows);
        let line = out.lines().nth(1).unwrap();
        assert_eq!(line, "a.png,1.000,5,cpu,x, y");
        // Known limitation: the row now has one extra column.
        assert_eq!(line.split(',').count(), 6);
    }

    // --- format_json ---

    #[test]
    fn json_empty() {
        assert_eq!(format_json(&[]), "[]");
    }

    #[test]
    fn json_row_schema() {
        let rows = vec![make_row("a.png", 1.234, Some(900), Some("cuda"), "a; b")];
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&format_json(&rows)).unwrap();
        let entry = &parsed[0];
        assert_eq!(entry["index"], 0);
        assert_eq!(entry["image"], "a.png");
        assert_eq!(entry["request_seconds"], 1.234);
        assert_eq!(entry["model_duration_ms"], 900);
        assert_eq!(entry["backend"], "cuda");
        assert_eq!(entry["parse_warnings"], "a; b");
        let ts = entry["started_at"].as_str().unwrap();
        assert!(ts.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn json_nullable_fields() {
        let rows = vec![make_row("a.png", 1.0, None, None, "\u{2014}")];
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&format_json(&rows)).unwrap();
        assert!(parsed[0]["model_duration_ms"].is_null());
        assert!(parsed[0]["backend"].is_null());
    }

    // --- summarize ---

    #[test]
    fn summarize_empty() {
        assert_eq!(summarize(&[]), None);
    }

    #[test]
    fn summarize_values() {
        let rows = vec![
            make_row("a.png", 1.0, None, None, "-"),
            make_row("b.png", 3.0, None, None, "-"),
            make_row("c.png", 2.0, None, None, "-"),
        ];
        let summary = summarize(&rows).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.min_seconds, 1.0);
        assert_eq!(summary.mean_seconds, 2.0);
        assert_eq!(summary.max_seconds, 3.0);
    }

    // --- format_table ---

    #[test]
    fn table_contains_rows_and_footer() {
        let rows = vec![
            make_row("assets/a.png", 1.5, Some(1200), Some("metal"), "\u{2014}"),
            make_row("b.png", 0.5, None, None, "warn"),
        ];
        let out = format_table(&rows);
        assert!(out.contains("assets/a.png"));
        assert!(out.contains("1.500"));
        assert!(out.contains("metal"));
        assert!(out.contains("warn"));
        assert!(out.contains("2 request(s): min 0.500s  mean 1.000s  max 1.500s"));
    }

    #[test]
    fn table_empty_has_no_footer() {
        let out = format_table(&[]);
        assert!(out.contains("parse_warnings"));
        assert!(!out.contains("request(s)"));
    }
}
