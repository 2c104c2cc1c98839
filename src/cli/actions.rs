// The two menu workflows: appending the next quarter and analysing a range.

use crate::analyzer::{dataset_bounds, extract_series, next_period_from_cells};
use crate::cli::prompt::{prompt_confirm, prompt_price, prompt_validated_integer};
use crate::model::{Category, NewRecord, Period, TrackerError};
use crate::report::{export_report, render_console, AnalysisReport};
use crate::storage::RecordStore;
use crate::utils::format_currency;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::info;

/// Prompts one price per category for the quarter after the last stored
/// row, confirms, then appends it.
pub fn add_record<S, R, W>(store: &S, input: &mut R, output: &mut W) -> Result<(), TrackerError>
where
    S: RecordStore + ?Sized,
    R: BufRead,
    W: Write,
{
    let last = store.fetch_raw_last_row()?.ok_or_else(|| {
        TrackerError::DataUnavailable(
            "the record store is empty, so the next period cannot be determined".into(),
        )
    })?;
    let period = next_period_from_cells(&last)?;
    writeln!(output, "\nAdding average prices for {}", period)?;

    let mut prices = [0.0; 7];
    for (price, category) in prices.iter_mut().zip(Category::ALL) {
        *price = prompt_price(input, output, &format!("{} price (€)", category))?;
    }
    let record = NewRecord { period, prices };

    writeln!(output, "\nNew record for {}:", period)?;
    for category in Category::ALL {
        writeln!(
            output,
            "  {:<15} €{}",
            category.label(),
            format_currency(record.price(category))
        )?;
    }

    if !prompt_confirm(input, output, "Save this record?")? {
        writeln!(output, "Record discarded.")?;
        return Ok(());
    }
    store.append_row(&record)?;
    info!("Stored new record for {}", period);
    writeln!(output, "Record for {} saved.", period)?;
    Ok(())
}

/// Prompts a period range within the dataset bounds and a category, then
/// prints the summary and statistics and offers to export them.
pub fn analyze_range<S, R, W>(
    store: &S,
    export_dir: &Path,
    input: &mut R,
    output: &mut W,
) -> Result<(), TrackerError>
where
    S: RecordStore + ?Sized,
    R: BufRead,
    W: Write,
{
    let rows = store.fetch_all_rows()?;
    let bounds = dataset_bounds(&rows)
        .ok_or_else(|| TrackerError::DataUnavailable("the record store has no valid rows".into()))?;
    writeln!(
        output,
        "\nData is available from {} to {}.",
        bounds.earliest, bounds.latest
    )?;

    let (earliest, latest) = (bounds.earliest, bounds.latest);
    let start = prompt_period(input, output, "Start", earliest, latest)?;
    let end = prompt_period(input, output, "End", start, latest)?;

    writeln!(output, "\nCategories:")?;
    for (idx, category) in Category::ALL.iter().enumerate() {
        writeln!(output, "  {}. {}", idx + 1, category)?;
    }
    let choice = prompt_validated_integer(input, output, "Select a category", 1, Category::ALL.len() as i64)?;
    let category = Category::from_menu_index(choice as usize)
        .ok_or_else(|| TrackerError::InvalidNumericInput(format!("no category {}", choice)))?;

    let series = extract_series(&rows, start, end, category.field_name())?;
    let report = AnalysisReport::build(category, start, end, series);
    info!(
        "Analysed {} from {} to {}: {} value(s), {} skipped",
        category,
        start,
        end,
        report.series.points.len(),
        report.series.skipped
    );
    write!(output, "{}", render_console(&report))?;

    if prompt_confirm(input, output, "Export the results to files?")? {
        let paths = export_report(&report, export_dir).map_err(TrackerError::Export)?;
        writeln!(output, "Report written to {}", paths.text.display())?;
        writeln!(output, "Table written to {}", paths.csv.display())?;
    }
    Ok(())
}

/// Prompts a year and quarter constrained to `[from, to]`.
fn prompt_period<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
    from: Period,
    to: Period,
) -> Result<Period, TrackerError> {
    let year = prompt_validated_integer(
        input,
        output,
        &format!("{} year", label),
        from.year as i64,
        to.year as i64,
    )? as i32;
    let first_quarter = if year == from.year { from.quarter } else { 1 };
    let last_quarter = if year == to.year { to.quarter } else { 4 };
    let quarter = prompt_validated_integer(
        input,
        output,
        &format!("{} quarter", label),
        first_quarter as i64,
        last_quarter as i64,
    )? as u8;
    Period::new(year, quarter)
}
