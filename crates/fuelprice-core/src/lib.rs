pub mod comparison;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod metrics;
pub mod pipeline;
pub mod table;

pub use comparison::{filter_states, series_to_json, state_series, SeriesPoint, StateSeries};
pub use config::{AnalysisScope, DashboardConfig, DatasetConfig};
pub use error::{PipelineError, Result};
pub use ingestion::{load_dataset, load_prepared};
pub use metrics::{
    compute_metrics, latest_value, metric_card, MetricCard, MetricsError, StateMetrics,
    PERCENT_CHANGE_FORMULA,
};
pub use pipeline::{midpoint_micros, prepare};
pub use table::PreparedTable;
