use std::collections::HashMap;
use std::io::Read;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, StringRecord};
use polars::prelude::*;

use crate::columns::{ColumnKind, SourceColumn};
use crate::errors::ParserError;
use crate::model::{RawPriceTable, ReadOptions};

enum ColumnValues {
    Date(Vec<i64>),
    Text(Vec<Option<String>>),
    Integer(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
}

impl ColumnValues {
    fn for_kind(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Date => ColumnValues::Date(Vec::new()),
            ColumnKind::Text => ColumnValues::Text(Vec::new()),
            ColumnKind::Integer => ColumnValues::Integer(Vec::new()),
            ColumnKind::Float => ColumnValues::Float(Vec::new()),
        }
    }

    fn into_column(self, name: &'static str) -> Result<Column, ParserError> {
        let series = match self {
            ColumnValues::Date(values) => Series::new(name.into(), values)
                .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
                .map_err(|err| ParserError::Validation {
                    message: format!("failed to cast column '{name}' to datetime: {err}"),
                })?,
            ColumnValues::Text(values) => Series::new(name.into(), values),
            ColumnValues::Integer(values) => Series::new(name.into(), values),
            ColumnValues::Float(values) => Series::new(name.into(), values),
        };
        Ok(series.into())
    }
}

struct HeaderLayout {
    /// (field index in the CSV record, column) in source order.
    positions: Vec<(usize, SourceColumn)>,
    ignored: Vec<String>,
}

fn classify_header(header: &StringRecord) -> Result<HeaderLayout, ParserError> {
    let mut positions = Vec::new();
    let mut ignored = Vec::new();

    for (idx, raw) in header.iter().enumerate() {
        match SourceColumn::classify(raw) {
            Some(column) => {
                if positions.iter().any(|(_, seen)| *seen == column) {
                    return Err(ParserError::DuplicateColumn {
                        header: raw.to_string(),
                        column: column.canonical_name(),
                    });
                }
                positions.push((idx, column));
            }
            None => ignored.push(raw.to_string()),
        }
    }

    for column in SourceColumn::ALL.iter().filter(|c| c.is_required()) {
        if !positions.iter().any(|(_, seen)| seen == column) {
            return Err(ParserError::MissingColumn {
                column: column.source_header(),
            });
        }
    }

    Ok(HeaderLayout { positions, ignored })
}

/// Reads the survey export from any reader. The whole load fails on the first
/// malformed row; there is no per-row recovery.
pub fn read_price_table<R: Read>(
    reader: R,
    options: &ReadOptions,
) -> Result<RawPriceTable, ParserError> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let layout = classify_header(csv_reader.headers()?)?;

    let mut values: HashMap<SourceColumn, ColumnValues> = layout
        .positions
        .iter()
        .map(|(_, column)| (*column, ColumnValues::for_kind(column.kind())))
        .collect();

    let start_idx = field_index(&layout, SourceColumn::PeriodStart)?;
    let end_idx = field_index(&layout, SourceColumn::PeriodEnd)?;

    for (row_idx, record) in csv_reader.records().enumerate() {
        let record = record?;
        // header occupies line 1
        let line_index = row_idx + 2;

        let start = parse_datetime(
            record.get(start_idx).unwrap_or_default(),
            &options.date_format,
            line_index,
            SourceColumn::PeriodStart,
        )?;
        let end = parse_datetime(
            record.get(end_idx).unwrap_or_default(),
            &options.date_format,
            line_index,
            SourceColumn::PeriodEnd,
        )?;
        if end < start {
            return Err(ParserError::InvertedPeriod {
                line_index,
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        for (field_idx, column) in &layout.positions {
            let raw = record.get(*field_idx).unwrap_or_default();
            let Some(slot) = values.get_mut(column) else {
                continue;
            };
            match slot {
                ColumnValues::Date(data) => {
                    let parsed = match column {
                        SourceColumn::PeriodStart => start,
                        SourceColumn::PeriodEnd => end,
                        other => parse_datetime(raw, &options.date_format, line_index, *other)?,
                    };
                    data.push(parsed.and_utc().timestamp_micros());
                }
                ColumnValues::Text(data) => data.push(clean_optional(raw)),
                ColumnValues::Integer(data) => {
                    data.push(parse_optional_i64(raw, line_index, *column)?)
                }
                ColumnValues::Float(data) => {
                    data.push(parse_optional_f64(raw, line_index, *column)?)
                }
            }
        }
    }

    let mut columns = Vec::with_capacity(layout.positions.len());
    for (_, column) in &layout.positions {
        let data = values
            .remove(column)
            .ok_or_else(|| ParserError::Validation {
                message: format!("no values collected for column '{column}'"),
            })?;
        columns.push(data.into_column(column.canonical_name())?);
    }

    let df = DataFrame::new(columns).map_err(|err| ParserError::Validation {
        message: format!("failed to build price dataframe: {err}"),
    })?;

    Ok(RawPriceTable {
        df,
        ignored_columns: layout.ignored,
    })
}

pub fn read_price_str(content: &str, options: &ReadOptions) -> Result<RawPriceTable, ParserError> {
    read_price_table(content.as_bytes(), options)
}

fn field_index(layout: &HeaderLayout, column: SourceColumn) -> Result<usize, ParserError> {
    layout
        .positions
        .iter()
        .find(|(_, seen)| *seen == column)
        .map(|(idx, _)| *idx)
        .ok_or(ParserError::MissingColumn {
            column: column.source_header(),
        })
}

fn clean_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn is_missing_marker(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed == "-" || trimmed.eq_ignore_ascii_case("nan")
}

pub(crate) fn parse_datetime(
    value: &str,
    format: &str,
    line_index: usize,
    column: SourceColumn,
) -> Result<NaiveDateTime, ParserError> {
    let trimmed = value.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
        return Ok(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    Err(ParserError::DataRow {
        line_index,
        message: format!(
            "invalid date '{trimmed}' in column '{}' (expected format '{format}')",
            column.source_header()
        ),
    })
}

pub(crate) fn parse_optional_i64(
    value: &str,
    line_index: usize,
    column: SourceColumn,
) -> Result<Option<i64>, ParserError> {
    let trimmed = value.trim();
    if is_missing_marker(trimmed) {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|err| ParserError::DataRow {
            line_index,
            message: format!(
                "failed to parse column '{}' as integer: {err}",
                column.source_header()
            ),
        })
}

pub(crate) fn parse_optional_f64(
    value: &str,
    line_index: usize,
    column: SourceColumn,
) -> Result<Option<f64>, ParserError> {
    let trimmed = value.trim();
    if is_missing_marker(trimmed) {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.is_nan() => Ok(None),
        Ok(parsed) if parsed.is_infinite() => Err(ParserError::DataRow {
            line_index,
            message: format!(
                "column '{}' holds a non-finite value '{trimmed}'",
                column.source_header()
            ),
        }),
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => Err(ParserError::DataRow {
            line_index,
            message: format!(
                "failed to parse column '{}' as float: {err}",
                column.source_header()
            ),
        }),
    }
}
