use polars::prelude::*;

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct ReadOptions {
    pub delimiter: u8,
    /// chrono format string shared by both period columns.
    pub date_format: String,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl ReadOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }
}

/// The survey export after header normalization and typing. Row order matches
/// the source file; period columns are `Datetime(Microseconds)`.
#[derive(Debug, Clone)]
pub struct RawPriceTable {
    pub df: DataFrame,
    pub ignored_columns: Vec<String>,
}

impl RawPriceTable {
    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }
}
