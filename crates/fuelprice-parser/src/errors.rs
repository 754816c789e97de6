use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("required column '{column}' is missing from the header row")]
    MissingColumn { column: &'static str },

    #[error("header '{header}' maps to column '{column}', which was already seen")]
    DuplicateColumn {
        header: String,
        column: &'static str,
    },

    #[error("CSV error: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },

    #[error("data row {line_index} invalid: {message}")]
    DataRow { line_index: usize, message: String },

    #[error(
        "data row {line_index} has period end {end} before period start {start}"
    )]
    InvertedPeriod {
        line_index: usize,
        start: String,
        end: String,
    },

    #[error("validation error: {message}")]
    Validation { message: String },
}

impl From<csv::Error> for ParserError {
    fn from(source: csv::Error) -> Self {
        ParserError::Csv { source }
    }
}
