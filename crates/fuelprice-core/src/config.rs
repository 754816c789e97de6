use std::env;
use std::path::{Path, PathBuf};

use fuelprice_parser::{ReadOptions, DEFAULT_DATE_FORMAT};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, Result};

pub const DEFAULT_DATASET_PATH: &str = "2004-2021.csv";
pub const DEFAULT_PRODUCT: &str = "GASOLINA COMUM";
pub const DEFAULT_YEARS: [&str; 3] = ["2019", "2020", "2021"];
pub const DEFAULT_HEADLINE_STATES: [&str; 2] = ["SAO PAULO", "RIO DE JANEIRO"];
pub const DEFAULT_COMPARISON_STATES: [&str; 2] = ["RIO DE JANEIRO", "SAO PAULO"];

pub const ENV_DATASET: &str = "FUELPRICE_DATASET";
pub const ENV_PRODUCT: &str = "FUELPRICE_PRODUCT";
pub const ENV_YEARS: &str = "FUELPRICE_YEARS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: PathBuf,
    pub delimiter: char,
    pub date_format: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATASET_PATH),
            delimiter: ',',
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl DatasetConfig {
    pub fn read_options(&self) -> Result<ReadOptions> {
        let delimiter = u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                PipelineError::Config(format!(
                    "delimiter '{}' must be a single ASCII character",
                    self.delimiter
                ))
            })?;
        Ok(ReadOptions::default()
            .with_delimiter(delimiter)
            .with_date_format(self.date_format.clone()))
    }
}

/// The product and calendar years a prepared table is restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisScope {
    pub product: String,
    pub years: Vec<String>,
}

impl Default for AnalysisScope {
    fn default() -> Self {
        Self {
            product: DEFAULT_PRODUCT.to_string(),
            years: DEFAULT_YEARS.iter().map(|y| y.to_string()).collect(),
        }
    }
}

impl AnalysisScope {
    pub fn new(product: impl Into<String>, years: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            product: product.into(),
            years: years.into_iter().map(Into::into).collect(),
        }
    }

    pub fn includes_year(&self, year: &str) -> bool {
        self.years.iter().any(|y| y == year)
    }

    pub fn validate(&self) -> Result<()> {
        if self.product.trim().is_empty() {
            return Err(PipelineError::Config("product must not be empty".into()));
        }
        if self.years.is_empty() {
            return Err(PipelineError::Config(
                "at least one analysis year is required".into(),
            ));
        }
        if let Some(bad) = self
            .years
            .iter()
            .find(|y| y.len() != 4 || !y.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(PipelineError::Config(format!(
                "year '{bad}' must be a four digit calendar year"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub dataset: DatasetConfig,
    pub scope: AnalysisScope,
    /// States shown as fixed cards at the top of the summary.
    pub headline_states: Vec<String>,
    /// Selection used by `compare` when none is given.
    pub comparison_states: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetConfig::default(),
            scope: AnalysisScope::default(),
            headline_states: DEFAULT_HEADLINE_STATES.iter().map(|s| s.to_string()).collect(),
            comparison_states: DEFAULT_COMPARISON_STATES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DashboardConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Layers `FUELPRICE_*` environment variables on top of the file values.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    pub(crate) fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATASET) {
            debug!(%path, "dataset path overridden from environment");
            self.dataset.path = PathBuf::from(path);
        }
        if let Some(product) = lookup(ENV_PRODUCT) {
            self.scope.product = product;
        }
        if let Some(years) = lookup(ENV_YEARS) {
            self.scope.years = years
                .split(',')
                .map(str::trim)
                .filter(|y| !y.is_empty())
                .map(str::to_string)
                .collect();
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        self.scope.validate()?;
        self.dataset.read_options()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_match_the_gasoline_window() {
        let config = DashboardConfig::default();
        assert_eq!(config.scope.product, "GASOLINA COMUM");
        assert_eq!(config.scope.years, vec!["2019", "2020", "2021"]);
        assert_eq!(config.dataset.path, PathBuf::from("2004-2021.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = DashboardConfig::from_toml_str(
            r#"
            headline_states = ["BAHIA"]

            [dataset]
            path = "data/precos.tsv"
            delimiter = "\t"
            "#,
        )
        .expect("parse config");

        assert_eq!(config.dataset.delimiter, '\t');
        assert_eq!(config.dataset.date_format, "%Y-%m-%d");
        assert_eq!(config.headline_states, vec!["BAHIA"]);
        assert_eq!(config.scope, AnalysisScope::default());
    }

    #[test]
    fn rejects_malformed_years_and_delimiters() {
        let err = DashboardConfig::from_toml_str("[scope]\nyears = [\"19\"]\n")
            .expect_err("short year");
        assert!(matches!(err, PipelineError::Config(_)));

        let err = DashboardConfig::from_toml_str("[dataset]\ndelimiter = \"§\"\n")
            .expect_err("non-ascii delimiter");
        assert!(matches!(err, PipelineError::Config(_)));

        let err = DashboardConfig::from_toml_str("[scope]\nyears = []\n").expect_err("no years");
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn overrides_replace_scope() {
        let vars: HashMap<&str, &str> = [
            (ENV_DATASET, "/srv/anp.csv"),
            (ENV_PRODUCT, "ETANOL HIDRATADO"),
            (ENV_YEARS, "2020, 2021,"),
        ]
        .into_iter()
        .collect();

        let mut config = DashboardConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .expect("overrides apply");

        assert_eq!(config.dataset.path, PathBuf::from("/srv/anp.csv"));
        assert_eq!(config.scope.product, "ETANOL HIDRATADO");
        assert_eq!(config.scope.years, vec!["2020", "2021"]);
    }
}
