// Analysis results: summary message, console tables and file export.

pub mod export;

pub use export::export_report;

use crate::analyzer::{PriceChange, PriceStatistics, Series};
use crate::model::{Category, Period};
use crate::utils::{format_currency, format_optional};
use comfy_table::{presets::UTF8_FULL, Table};

/// Everything produced by one range analysis.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub category: Category,
    pub start: Period,
    pub end: Period,
    pub series: Series,
    pub statistics: PriceStatistics,
    pub change: Option<PriceChange>,
    pub summary: String,
}

impl AnalysisReport {
    pub fn build(category: Category, start: Period, end: Period, series: Series) -> Self {
        let statistics = PriceStatistics::from_values(&series.values());
        let change = PriceChange::between(series.start_price, series.end_price);
        let summary = summary_message(
            category,
            start,
            end,
            series.start_price,
            series.end_price,
            change,
        );
        Self {
            category,
            start,
            end,
            series,
            statistics,
            change,
            summary,
        }
    }
}

pub fn summary_message(
    category: Category,
    start: Period,
    end: Period,
    start_price: Option<f64>,
    end_price: Option<f64>,
    change: Option<PriceChange>,
) -> String {
    match (change, start_price, end_price) {
        (Some(change), Some(from), Some(to)) => format!(
            "Between {} and {}, the average property price in {} {} (from €{} to €{}).",
            start,
            end,
            category,
            change,
            format_currency(from),
            format_currency(to)
        ),
        _ => format!(
            "Percent change for {} between {} and {} is not applicable (start or end price missing, or start price is zero).",
            category, start, end
        ),
    }
}

/// Console rendering: summary, statistics table and per-period prices.
pub fn render_console(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\n{} prices from {} to {}\n",
        report.category, report.start, report.end
    ));
    out.push_str(&report.summary);
    out.push('\n');

    let mut stats = Table::new();
    stats.load_preset(UTF8_FULL).set_header(vec!["Statistic", "Value (€)"]);
    for (label, value) in report.statistics.fields() {
        stats.add_row(vec![label.to_string(), format_optional(value)]);
    }
    out.push_str(&format!("{}\n", stats));

    if report.series.is_empty() {
        out.push_str("No prices recorded in this range.\n");
    } else {
        let mut prices = Table::new();
        prices
            .load_preset(UTF8_FULL)
            .set_header(vec!["Year", "Quarter", "Price (€)"]);
        for point in &report.series.points {
            prices.add_row(vec![
                point.period.year.to_string(),
                point.period.quarter.to_string(),
                format_currency(point.price),
            ]);
        }
        out.push_str(&format!("{}\n", prices));
    }

    if report.series.skipped > 0 {
        out.push_str(&format!(
            "Note: {} row(s) were skipped because their period or price could not be read.\n",
            report.series.skipped
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::series::SeriesPoint;

    fn period(year: i32, quarter: u8) -> Period {
        Period::new(year, quarter).unwrap()
    }

    fn series(prices: &[(i32, u8, f64)]) -> Series {
        let points: Vec<SeriesPoint> = prices
            .iter()
            .map(|(y, q, p)| SeriesPoint { period: period(*y, *q), price: *p })
            .collect();
        Series {
            field: Some("Dublin".into()),
            start_price: points.first().map(|p| p.price),
            end_price: points.last().map(|p| p.price),
            points,
            skipped: 0,
        }
    }

    #[test]
    fn summary_reports_increase() {
        let report = AnalysisReport::build(
            Category::Dublin,
            period(2020, 1),
            period(2020, 3),
            series(&[(2020, 1, 100000.0), (2020, 2, 120000.0), (2020, 3, 150000.0)]),
        );
        assert_eq!(
            report.summary,
            "Between 2020 Q1 and 2020 Q3, the average property price in Dublin increased by 50.00% (from €100,000.00 to €150,000.00)."
        );
        assert_eq!(report.statistics.average, Some(370000.0 / 3.0));
    }

    #[test]
    fn summary_without_start_price_is_not_applicable() {
        let mut s = series(&[(2020, 2, 120000.0)]);
        s.start_price = None;
        let report = AnalysisReport::build(Category::Cork, period(2020, 1), period(2020, 2), s);
        assert!(report.change.is_none());
        assert!(report.summary.contains("not applicable"));
    }

    #[test]
    fn console_output_lists_statistics_and_skips() {
        let mut s = series(&[(2021, 1, 42.0)]);
        s.skipped = 2;
        let report = AnalysisReport::build(Category::Galway, period(2021, 1), period(2021, 1), s);
        let text = render_console(&report);
        assert!(text.contains("Galway prices from 2021 Q1 to 2021 Q1"));
        assert!(text.contains("Median"));
        assert!(text.contains("42.00"));
        assert!(text.contains("N/A"));
        assert!(text.contains("2 row(s) were skipped"));
    }
}
