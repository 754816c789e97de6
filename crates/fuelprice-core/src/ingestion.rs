use std::fs::File;
use std::io::BufReader;
use std::time::Instant;

use fuelprice_parser::{read_price_table, RawPriceTable};
use tracing::{info, warn};

use crate::config::{DashboardConfig, DatasetConfig};
use crate::error::{PipelineError, Result};
use crate::pipeline::prepare;
use crate::table::PreparedTable;

pub fn load_dataset(config: &DatasetConfig) -> Result<RawPriceTable> {
    let options = config.read_options()?;
    let file = File::open(&config.path).map_err(|source| PipelineError::Io {
        path: config.path.clone(),
        source,
    })?;

    let started = Instant::now();
    let raw = read_price_table(BufReader::new(file), &options)?;
    if !raw.ignored_columns.is_empty() {
        warn!(columns = ?raw.ignored_columns, "ignoring unrecognized dataset columns");
    }
    info!(
        path = %config.path.display(),
        rows = raw.height(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "loaded dataset"
    );
    Ok(raw)
}

/// Startup path: read the dataset once and prepare the analysis table.
pub fn load_prepared(config: &DashboardConfig) -> Result<PreparedTable> {
    let raw = load_dataset(&config.dataset)?;
    let table = prepare(&raw, &config.scope)?;
    if table.is_empty() {
        warn!(
            product = %config.scope.product,
            years = ?config.scope.years,
            "no rows left after applying the analysis scope"
        );
    }
    Ok(table)
}
