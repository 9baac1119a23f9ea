use anyhow::Result;
use oakfinance_lib::pipeline::BuildReport;
use oakfinance_lib::summary::TotalRow;
use oakfinance_lib::FetchSummary;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    /// Unknown names fall back to a table.
    pub fn parse(name: &str) -> Self {
        match name {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            "markdown" | "md" => OutputFormat::Markdown,
            _ => OutputFormat::Table,
        }
    }
}

#[derive(Tabled, Serialize)]
pub struct TotalDisplayRow {
    #[tabled(rename = "Dataset")]
    #[serde(rename = "Dataset")]
    dataset: String,
    #[tabled(rename = "Year")]
    #[serde(rename = "Year")]
    year: String,
    #[tabled(rename = "Filer")]
    #[serde(rename = "Filer")]
    filer: String,
    #[tabled(rename = "Records")]
    #[serde(rename = "Records")]
    records: u64,
    #[tabled(rename = "Total")]
    #[serde(rename = "Total")]
    total: String,
}

#[derive(Tabled, Serialize)]
pub struct MetricRow {
    #[tabled(rename = "Metric")]
    #[serde(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    #[serde(rename = "Value")]
    value: String,
}

fn metric(name: &str, value: impl ToString) -> MetricRow {
    MetricRow {
        metric: name.to_string(),
        value: value.to_string(),
    }
}

// -- Row builders --

pub fn total_rows(dataset: &str, totals: &[TotalRow]) -> Vec<TotalDisplayRow> {
    totals
        .iter()
        .map(|t| TotalDisplayRow {
            dataset: dataset.to_string(),
            year: t.election_year.map(|y| y.to_string()).unwrap_or_default(),
            filer: t.filer_name.clone(),
            records: t.count,
            total: format_dollars(t.total),
        })
        .collect()
}

pub fn diagnostic_rows(report: &BuildReport) -> Vec<MetricRow> {
    let d = &report.diagnostics;
    let s = &report.output.stats;
    vec![
        metric("Filings", report.filings),
        metric("Filers", report.filers),
        metric("Transactions", report.transactions),
        metric("Contributions", report.output.contributions.len()),
        metric("Expenditures", report.output.expenditures.len()),
        metric("Superseded elements", d.superseded),
        metric("Ignored elements", d.ignored_classification),
        metric("Unparseable records", d.unparseable_count()),
        metric("Mapping rows without filer", s.mapping_without_filer),
        metric("Filers without filings", s.filers_without_filings),
        metric("Filings without transactions", s.filings_without_transactions),
        metric("Unjoined transactions", s.transactions_without_candidacy),
    ]
}

pub fn fetch_summary_rows(summary: &FetchSummary) -> Vec<MetricRow> {
    vec![
        metric("Requests", summary.requests_made),
        metric("Succeeded", summary.requests_succeeded),
        metric("Retried", summary.requests_retried),
        metric("Failed", summary.requests_failed),
        metric("Downgraded queries", summary.queries_downgraded),
        metric("Skipped parents", summary.parents_skipped),
        metric("Backoff", format!("{:.1}s", summary.total_backoff_secs)),
    ]
}

// -- Rendering --

pub fn print_rows<T: Tabled + Serialize>(rows: Vec<T>, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", Table::new(rows)),
        OutputFormat::Markdown => println!("{}", render_markdown(rows)),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Json => print_json(&rows),
    }
    Ok(())
}

fn render_markdown<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::markdown());
    table.to_string()
}

pub fn print_json<T: Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

/// `2575.5` -> `$2,575.50`.
pub fn format_dollars(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_format_names() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("md"), OutputFormat::Markdown);
        assert_eq!(OutputFormat::parse("csv"), OutputFormat::Csv);
        assert_eq!(OutputFormat::parse("xml"), OutputFormat::Table);
    }

    #[test]
    fn dollars_are_grouped() {
        assert_eq!(format_dollars(0.0), "$0.00");
        assert_eq!(format_dollars(75.0), "$75.00");
        assert_eq!(format_dollars(2575.5), "$2,575.50");
        assert_eq!(format_dollars(1234567.891), "$1,234,567.89");
        assert_eq!(format_dollars(-120.5), "-$120.50");
    }

    #[test]
    fn totals_rows_blank_missing_year() {
        let totals = vec![TotalRow {
            election_year: None,
            filer_name: "Parks Yes".into(),
            count: 2,
            total: 40.0,
        }];
        let rows = total_rows("Contributions", &totals);
        assert_eq!(rows[0].year, "");
        assert_eq!(rows[0].total, "$40.00");
    }

    #[test]
    fn markdown_has_header_and_separator() {
        let rows = vec![metric("Filings", 4)];
        let md = render_markdown(rows);
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Metric"));
        assert!(lines[1].starts_with("|-"));
    }

    #[test]
    fn csv_uses_display_headers() {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for row in total_rows(
            "Expenditures",
            &[TotalRow {
                election_year: Some(2022),
                filer_name: "Jane Doe".into(),
                count: 1,
                total: 120.5,
            }],
        ) {
            wtr.serialize(row).unwrap();
        }
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(
            out,
            "Dataset,Year,Filer,Records,Total\nExpenditures,2022,Jane Doe,1,$120.50\n"
        );
    }
}
