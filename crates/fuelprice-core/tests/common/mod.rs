#![allow(dead_code)]

use chrono::NaiveDateTime;
use fuelprice_core::{prepare, AnalysisScope, PreparedTable};
use fuelprice_parser::{read_price_str, ReadOptions};

pub const HEADER: &str = "DATA INICIAL,DATA FINAL,ESTADO,PRODUTO,PREÇO MÉDIO REVENDA";

/// Builds a prepared table from `start,end,state,product,price` lines using the
/// default gasoline 2019-2021 scope.
pub fn prepared(rows: &[&str]) -> PreparedTable {
    prepare_with(rows, &AnalysisScope::default())
}

pub fn prepare_with(rows: &[&str], scope: &AnalysisScope) -> PreparedTable {
    let mut content = String::from(HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    let raw = read_price_str(&content, &ReadOptions::default()).expect("test csv parses");
    prepare(&raw, scope).expect("prepare succeeds")
}

pub fn micros(value: &str) -> i64 {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .expect("valid test datetime")
        .and_utc()
        .timestamp_micros()
}

pub fn dates(table: &PreparedTable) -> Vec<i64> {
    let column = table
        .dataframe()
        .column("date")
        .expect("date column")
        .datetime()
        .expect("datetime dtype");
    (0..table.height())
        .map(|idx| column.get(idx).expect("non-null date"))
        .collect()
}

pub fn resale_values(table: &PreparedTable) -> Vec<Option<f64>> {
    table
        .dataframe()
        .column("resale_value")
        .expect("resale_value column")
        .f64()
        .expect("f64 dtype")
        .into_iter()
        .collect()
}

pub fn states(table: &PreparedTable) -> Vec<String> {
    table
        .dataframe()
        .column("state")
        .expect("state column")
        .str()
        .expect("string dtype")
        .into_iter()
        .map(|s| s.unwrap_or_default().to_string())
        .collect()
}
