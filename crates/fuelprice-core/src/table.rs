use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use polars::prelude::*;

use crate::config::AnalysisScope;
use crate::error::{PipelineError, Result};
use crate::pipeline::scope_predicate;

pub const STATE: &str = "state";
pub const DATE: &str = "date";
pub const YEAR: &str = "year";
pub const RESALE_VALUE: &str = "resale_value";

pub const COLUMNS: [&str; 4] = [STATE, DATE, YEAR, RESALE_VALUE];

/// The analysis table: one row per (state, survey period) for the configured
/// product and years, ascending by representative date. Built once and shared
/// by reference; every query returns a new value.
#[derive(Debug, Clone)]
pub struct PreparedTable {
    df: DataFrame,
}

impl PreparedTable {
    pub(crate) fn new_unchecked(df: DataFrame) -> Self {
        Self { df }
    }

    /// Wraps an existing frame after checking it carries the canonical columns.
    /// The caller is responsible for the chronological ordering.
    pub fn from_dataframe(df: DataFrame) -> Result<Self> {
        for name in COLUMNS {
            if df.column(name).is_err() {
                return Err(PipelineError::Validation(format!(
                    "prepared table is missing column '{name}'"
                )));
            }
        }
        let df = df.select(COLUMNS)?;
        Ok(Self { df })
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Distinct states in order of first appearance.
    pub fn states(&self) -> Result<Vec<String>> {
        let states = self.df.column(STATE)?.str()?;
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        for state in states.into_iter().flatten() {
            if seen.insert(state) {
                ordered.push(state.to_string());
            }
        }
        Ok(ordered)
    }

    pub fn rows_for_state(&self, state: &str) -> Result<DataFrame> {
        let rows = self
            .df
            .clone()
            .lazy()
            .filter(col(STATE).eq(lit(state)))
            .collect()?;
        Ok(rows)
    }

    /// Re-applies the year restriction of `scope`. The product column is gone
    /// by now, so only the year half of the predicate applies.
    pub fn restrict_to_scope(&self, scope: &AnalysisScope) -> Result<Self> {
        scope.validate()?;
        let df = self
            .df
            .clone()
            .lazy()
            .filter(scope_predicate(None, scope))
            .collect()?;
        Ok(Self { df })
    }

    pub(crate) fn with_frame(&self, df: DataFrame) -> Self {
        Self { df }
    }
}

impl PartialEq for PreparedTable {
    fn eq(&self, other: &Self) -> bool {
        self.df.equals_missing(&other.df)
    }
}

pub(crate) fn datetime_from_micros(value: i64) -> Option<NaiveDateTime> {
    let secs = value.div_euclid(1_000_000);
    let micros = value.rem_euclid(1_000_000) as u32;
    DateTime::<Utc>::from_timestamp(secs, micros * 1_000).map(|dt| dt.naive_utc())
}
