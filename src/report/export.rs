use crate::report::AnalysisReport;
use crate::utils::{format_currency, format_optional, format_plain, to_kebab_case};
use chrono::{DateTime, Local};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CSV_HEADER: [&str; 21] = [
    "StartYear",
    "StartQuarter",
    "EndYear",
    "EndQuarter",
    "County",
    "Year",
    "Quarter",
    "Price",
    "StartPrice",
    "EndPrice",
    "PercentChange",
    "Mean",
    "StdDev",
    "Min",
    "Max",
    "Range",
    "Q1",
    "Median",
    "Q3",
    "IQR",
    "SummaryMessage",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ExportPaths {
    pub text: PathBuf,
    pub csv: PathBuf,
}

/// Writes the text report and the CSV table into `dir`, creating it if needed.
pub fn export_report(report: &AnalysisReport, dir: &Path) -> io::Result<ExportPaths> {
    fs::create_dir_all(dir)?;
    let now = Local::now();
    let stem = format!(
        "{}_{}Q{}_{}Q{}_{}",
        to_kebab_case(report.category.label()),
        report.start.year,
        report.start.quarter,
        report.end.year,
        report.end.quarter,
        now.format("%Y%m%d-%H%M%S")
    );

    let paths = ExportPaths {
        text: dir.join(format!("{}.txt", stem)),
        csv: dir.join(format!("{}.csv", stem)),
    };
    fs::write(&paths.text, render_text_report(report, now))?;
    fs::write(&paths.csv, render_csv(report))?;
    info!(
        "Exported report to {} and {}",
        paths.text.display(),
        paths.csv.display()
    );
    Ok(paths)
}

pub fn render_text_report(report: &AnalysisReport, generated_at: DateTime<Local>) -> String {
    let mut lines = vec![
        "Property Price Report".to_string(),
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        format!("County: {}", report.category),
        format!("Period: {} to {}", report.start, report.end),
        String::new(),
        report.summary.clone(),
        String::new(),
        format!("Start price: {}", euro(report.series.start_price)),
        format!("End price: {}", euro(report.series.end_price)),
        String::new(),
        "Statistics".to_string(),
    ];
    for (label, value) in report.statistics.fields() {
        lines.push(format!("  {:<8} {}", label, euro(value)));
    }

    lines.push(String::new());
    lines.push("Quarterly prices".to_string());
    if report.series.is_empty() {
        lines.push("  (none)".to_string());
    }
    for point in &report.series.points {
        lines.push(format!("  {}: €{}", point.period, format_currency(point.price)));
    }
    if report.series.skipped > 0 {
        lines.push(format!("Skipped rows: {}", report.series.skipped));
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn euro(value: Option<f64>) -> String {
    match value {
        Some(_) => format!("€{}", format_optional(value)),
        None => format_optional(value),
    }
}

/// One line per matched period with the summary columns repeated. Without
/// matches a single line carries the summary with empty period fields.
pub fn render_csv(report: &AnalysisReport) -> String {
    let stats = &report.statistics;
    let summary: Vec<String> = vec![
        format_plain(report.series.start_price),
        format_plain(report.series.end_price),
        format_plain(report.change.map(|c| c.percent)),
        format_plain(stats.average),
        format_plain(stats.std_dev),
        format_plain(stats.min),
        format_plain(stats.max),
        format_plain(stats.range),
        format_plain(stats.q1),
        format_plain(stats.median),
        format_plain(stats.q3),
        format_plain(stats.iqr),
        report.summary.clone(),
    ];
    let prefix: Vec<String> = vec![
        report.start.year.to_string(),
        report.start.quarter.to_string(),
        report.end.year.to_string(),
        report.end.quarter.to_string(),
        report.category.field_name().to_string(),
    ];

    let period_cells: Vec<[String; 3]> = if report.series.is_empty() {
        vec![[String::new(), String::new(), String::new()]]
    } else {
        report
            .series
            .points
            .iter()
            .map(|p| {
                [
                    p.period.year.to_string(),
                    p.period.quarter.to_string(),
                    format_plain(Some(p.price)),
                ]
            })
            .collect()
    };

    let mut out = csv_line(CSV_HEADER.iter().copied());
    for cells in &period_cells {
        let fields = prefix
            .iter()
            .chain(cells.iter())
            .chain(summary.iter())
            .map(String::as_str);
        out.push_str(&csv_line(fields));
    }
    out
}

fn csv_line<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut line = fields
        .into_iter()
        .map(escape_csv)
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
