//! Turns the typed survey export into the analysis table.
//!
//! Stages, in order:
//! 1. derive a representative date per row (midpoint of the survey period),
//! 2. stable-sort ascending by that date and rename it to `date`,
//! 3. derive the calendar `year` as text,
//! 4. keep only the configured product and years,
//! 5. project down to `state`, `date`, `year`, `resale_value`.

use fuelprice_parser::{RawPriceTable, SourceColumn};
use polars::prelude::*;
use tracing::{debug, info};

use crate::config::AnalysisScope;
use crate::error::{PipelineError, Result};
use crate::table::{PreparedTable, DATE, RESALE_VALUE, STATE, YEAR};

const REPRESENTATIVE_DATE: &str = "representative_date";

/// Midpoint of a period in epoch microseconds. Odd spans round toward `start`.
///
/// The span is taken in `i128`; the midpoint itself always lies between the two
/// bounds, so it fits back into `i64`.
pub fn midpoint_micros(start: i64, end: i64) -> i64 {
    let span = i128::from(end) - i128::from(start);
    (i128::from(start) + span.div_euclid(2)) as i64
}

pub fn prepare(raw: &RawPriceTable, scope: &AnalysisScope) -> Result<PreparedTable> {
    scope.validate()?;

    let with_dates = derive_representative_dates(&raw.df)?;
    let sorted = sort_chronologically(with_dates)?;
    let input_rows = sorted.height();

    let product_col = SourceColumn::Product.canonical_name();
    let resale_col = SourceColumn::ResalePriceMean.canonical_name();

    let df = sorted
        .lazy()
        .filter(scope_predicate(Some(product_col), scope))
        .select([
            col(SourceColumn::State.canonical_name()).alias(STATE),
            col(DATE),
            col(YEAR),
            col(resale_col).alias(RESALE_VALUE),
        ])
        .collect()?;

    info!(
        input_rows,
        prepared_rows = df.height(),
        product = %scope.product,
        years = ?scope.years,
        "prepared price table"
    );

    Ok(PreparedTable::new_unchecked(df))
}

/// Appends `representative_date` as the midpoint of each row's survey period.
pub fn derive_representative_dates(df: &DataFrame) -> Result<DataFrame> {
    let start_name = SourceColumn::PeriodStart.canonical_name();
    let end_name = SourceColumn::PeriodEnd.canonical_name();
    let starts = df.column(start_name)?.datetime()?;
    let ends = df.column(end_name)?.datetime()?;

    let mut midpoints = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let (Some(start), Some(end)) = (starts.get(idx), ends.get(idx)) else {
            return Err(PipelineError::Validation(format!(
                "row {idx} is missing '{start_name}' or '{end_name}'"
            )));
        };
        midpoints.push(midpoint_micros(start, end));
    }

    let series = Series::new(REPRESENTATIVE_DATE.into(), midpoints)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;

    let mut output = df.clone();
    output.with_column(series)?;
    Ok(output)
}

/// Stable ascending sort on the representative date, which then becomes `date`
/// and gains a text `year` column.
fn sort_chronologically(df: DataFrame) -> Result<DataFrame> {
    let sorted = df
        .lazy()
        .sort(
            [REPRESENTATIVE_DATE],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .rename([REPRESENTATIVE_DATE], [DATE], true)
        .with_column(col(DATE).dt().year().cast(DataType::String).alias(YEAR))
        .collect()?;
    debug!(rows = sorted.height(), "sorted by representative date");
    Ok(sorted)
}

/// Product (when the column is still present) and year membership.
pub(crate) fn scope_predicate(product_col: Option<&str>, scope: &AnalysisScope) -> Expr {
    let year_match = scope
        .years
        .iter()
        .fold(lit(false), |acc, year| acc.or(col(YEAR).eq(lit(year.as_str()))));
    match product_col {
        Some(name) => col(name).eq(lit(scope.product.as_str())).and(year_match),
        None => year_match,
    }
}

#[cfg(test)]
mod tests {
    use polars::df;

    use super::*;

    const DAY: i64 = 86_400_000_000;

    #[test]
    fn midpoint_of_a_week_is_half_a_week_later() {
        let start = 10 * DAY;
        let end = start + 6 * DAY;
        assert_eq!(midpoint_micros(start, end), start + 3 * DAY);
    }

    #[test]
    fn odd_spans_round_toward_start() {
        assert_eq!(midpoint_micros(0, 1), 0);
        assert_eq!(midpoint_micros(100, 103), 101);
        assert_eq!(midpoint_micros(-3, 0), -2);
    }

    #[test]
    fn midpoint_stays_inside_the_period() {
        let spans = [(0, 0), (5, 5), (0, 7), (-DAY, DAY), (DAY, 3 * DAY + 1)];
        for (start, end) in spans {
            let mid = midpoint_micros(start, end);
            assert!(start <= mid && mid <= end, "{mid} outside [{start}, {end}]");
        }
    }

    #[test]
    fn midpoint_of_extreme_bounds_does_not_overflow() {
        assert_eq!(midpoint_micros(i64::MIN, i64::MAX), -1);
        assert_eq!(midpoint_micros(i64::MAX, i64::MAX), i64::MAX);
        let (start, end) = (i64::MIN + 1, i64::MAX - 2);
        let mid = midpoint_micros(start, end);
        assert!(start <= mid && mid <= end);
    }

    #[test]
    fn predicate_agrees_with_includes_year() {
        let years = ["2018", "2019", "2020", "2021", "2022"];
        let df = df!(YEAR => years).expect("frame");
        let scope = AnalysisScope::default();
        let out = df
            .lazy()
            .filter(scope_predicate(None, &scope))
            .collect()
            .expect("filter");

        let kept: Vec<Option<&str>> = out
            .column(YEAR)
            .expect("year column")
            .str()
            .expect("string dtype")
            .into_iter()
            .collect();
        let expected: Vec<Option<&str>> = years
            .iter()
            .copied()
            .filter(|year| scope.includes_year(year))
            .map(Some)
            .collect();
        assert_eq!(kept, expected);
        assert!(!scope.includes_year("2022"));
    }

    #[test]
    fn empty_year_set_matches_nothing() {
        let df = df!(YEAR => ["2019", "2020"]).expect("frame");
        let scope = AnalysisScope {
            product: "GASOLINA COMUM".into(),
            years: Vec::new(),
        };
        let out = df
            .lazy()
            .filter(scope_predicate(None, &scope))
            .collect()
            .expect("filter");
        assert_eq!(out.height(), 0);
    }
}
