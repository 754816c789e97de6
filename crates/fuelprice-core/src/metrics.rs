use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::table::{datetime_from_micros, PreparedTable, DATE, RESALE_VALUE, STATE};

pub const PERCENT_CHANGE_FORMULA: &str = "\
The change is measured between the first and the latest observed resale price \
of the analysed window:

    (latest price - earliest price) / earliest price * 100

A positive value means the price rose over the window; a negative value means it fell.";

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("no records for state '{state}'")]
    EmptyGroup { state: String },
    #[error("state '{state}' has records but no resale values")]
    NoResaleValues { state: String },
    #[error("earliest resale value for state '{state}' is zero; percent change is undefined")]
    ZeroBaseline { state: String },
    #[error("percent change for state '{state}' is not a finite number")]
    NonFiniteChange { state: String },
    #[error("invalid timestamp micros {0}")]
    InvalidTimestamp(i64),
    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateMetrics {
    pub state: String,
    pub earliest_value: f64,
    pub latest_value: f64,
    /// Signed, in percent.
    pub percent_change: f64,
    pub earliest_date: NaiveDateTime,
    pub latest_date: NaiveDateTime,
    /// Rows with a resale value; rows without one are skipped.
    pub observations: usize,
}

/// Outcome of a metric query as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricCard {
    Available(StateMetrics),
    Unavailable { state: String, reason: String },
}

impl MetricCard {
    pub fn state(&self) -> &str {
        match self {
            MetricCard::Available(metrics) => &metrics.state,
            MetricCard::Unavailable { state, .. } => state,
        }
    }

    pub fn metrics(&self) -> Option<&StateMetrics> {
        match self {
            MetricCard::Available(metrics) => Some(metrics),
            MetricCard::Unavailable { .. } => None,
        }
    }
}

struct Observation {
    date_micros: i64,
    value: f64,
}

/// Resale observations for `state` in table order, skipping missing and NaN
/// values. Errors when the state has no rows at all.
fn observations(table: &PreparedTable, state: &str) -> Result<Vec<Observation>, MetricsError> {
    let rows = table
        .dataframe()
        .clone()
        .lazy()
        .filter(col(STATE).eq(lit(state)))
        .collect()?;

    if rows.height() == 0 {
        return Err(MetricsError::EmptyGroup {
            state: state.to_string(),
        });
    }

    let dates = rows.column(DATE)?.datetime()?;
    let values = rows.column(RESALE_VALUE)?.f64()?;

    let mut observed = Vec::with_capacity(rows.height());
    for idx in 0..rows.height() {
        if let (Some(date_micros), Some(value)) = (dates.get(idx), values.get(idx)) {
            if !value.is_nan() {
                observed.push(Observation { date_micros, value });
            }
        }
    }
    Ok(observed)
}

pub fn compute_metrics(table: &PreparedTable, state: &str) -> Result<StateMetrics, MetricsError> {
    let observed = observations(table, state)?;
    let (Some(first), Some(last)) = (observed.first(), observed.last()) else {
        return Err(MetricsError::NoResaleValues {
            state: state.to_string(),
        });
    };

    if first.value == 0.0 {
        return Err(MetricsError::ZeroBaseline {
            state: state.to_string(),
        });
    }

    let percent_change = (last.value - first.value) / first.value * 100.0;
    if !percent_change.is_finite() {
        return Err(MetricsError::NonFiniteChange {
            state: state.to_string(),
        });
    }

    Ok(StateMetrics {
        state: state.to_string(),
        earliest_value: first.value,
        latest_value: last.value,
        percent_change,
        earliest_date: naive_from_micros(first.date_micros)?,
        latest_date: naive_from_micros(last.date_micros)?,
        observations: observed.len(),
    })
}

/// Most recent non-missing resale value for `state`.
pub fn latest_value(table: &PreparedTable, state: &str) -> Result<f64, MetricsError> {
    observations(table, state)?
        .last()
        .map(|obs| obs.value)
        .ok_or_else(|| MetricsError::NoResaleValues {
            state: state.to_string(),
        })
}

/// Never fails: any metric error becomes an `Unavailable` card.
pub fn metric_card(table: &PreparedTable, state: &str) -> MetricCard {
    match compute_metrics(table, state) {
        Ok(metrics) => MetricCard::Available(metrics),
        Err(err) => {
            warn!(state, error = %err, "metrics unavailable");
            MetricCard::Unavailable {
                state: state.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

fn naive_from_micros(value: i64) -> Result<NaiveDateTime, MetricsError> {
    datetime_from_micros(value).ok_or(MetricsError::InvalidTimestamp(value))
}
