use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::table::{datetime_from_micros, PreparedTable, DATE, RESALE_VALUE, STATE};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDateTime,
    /// `None` leaves a gap in the line rather than dropping the period.
    pub resale_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSeries {
    pub state: String,
    pub points: Vec<SeriesPoint>,
}

/// Rows whose state is in `states`, in table order. An empty selection gives an
/// empty table with the same columns.
pub fn filter_states<S: AsRef<str>>(table: &PreparedTable, states: &[S]) -> Result<PreparedTable> {
    if states.is_empty() {
        debug!("empty state selection");
        return Ok(table.with_frame(table.dataframe().head(Some(0))));
    }

    let predicate = states.iter().fold(lit(false), |acc, state| {
        let name: &str = state.as_ref();
        acc.or(col(STATE).eq(lit(name)))
    });
    let df = table.dataframe().clone().lazy().filter(predicate).collect()?;
    Ok(table.with_frame(df))
}

/// One line per state, states in first-appearance order.
pub fn state_series(table: &PreparedTable) -> Result<Vec<StateSeries>> {
    let df = table.dataframe();
    let states = df.column(STATE)?.str()?;
    let dates = df.column(DATE)?.datetime()?;
    let values = df.column(RESALE_VALUE)?.f64()?;

    let mut series: Vec<StateSeries> = Vec::new();
    for idx in 0..df.height() {
        let Some(state) = states.get(idx) else {
            continue;
        };
        let micros = dates.get(idx).ok_or_else(|| {
            PipelineError::Validation(format!("row {idx} has no '{DATE}' value"))
        })?;
        let date = datetime_from_micros(micros).ok_or_else(|| {
            PipelineError::Validation(format!("row {idx} has an out of range date"))
        })?;
        let point = SeriesPoint {
            date,
            resale_value: values.get(idx).filter(|v| !v.is_nan()),
        };

        match series.iter_mut().find(|s| s.state == state) {
            Some(existing) => existing.points.push(point),
            None => series.push(StateSeries {
                state: state.to_string(),
                points: vec![point],
            }),
        }
    }
    Ok(series)
}

pub fn series_to_json(series: &[StateSeries]) -> Result<String> {
    Ok(serde_json::to_string_pretty(series)?)
}
