use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapters::http_source::DEFAULT_TIMEOUT_SECONDS;
use crate::adapters::{ConfiguredSource, CsvListingSource, HttpListingSource};
use crate::core::histogram::{bucket_count, HistogramSettings, DEFAULT_BUCKET_WIDTH};
use crate::domain::catalog::RegionCatalog;
use crate::domain::model::{CityDefinition, SanityBounds};
use crate::utils::error::{Result, StatsError};
use crate::utils::validation::{
    validate_coordinates, validate_non_empty_string, validate_path, validate_positive_number,
    validate_positive_real, validate_required_field, validate_url, Validate,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub bounds: SanityBounds,
    #[serde(default)]
    pub histogram: Option<HistogramConfig>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    /// JSON array of city definitions, resolved relative to the working
    /// directory.
    #[serde(default)]
    pub cities_file: Option<String>,
    #[serde(default)]
    pub cities: Vec<CityDefinition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Csv,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub r#type: SourceKind,
    pub path: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// `[histogram]` table; every key is optional and `cap` falls back to
/// `bounds.max_total_rent`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HistogramConfig {
    pub bucket_width: Option<f64>,
    pub floor: Option<f64>,
    pub cap: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

fn default_cache_dir() -> String {
    "./cache/cities".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    2
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content)?;
        toml::from_str(&processed).map_err(|e| StatsError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are
    /// left untouched.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| StatsError::ConfigError {
            message: e.to_string(),
        })?;
        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });
        Ok(result.into_owned())
    }

    /// Histogram over `[floor, cap)`; the cap follows the rent bound unless
    /// configured.
    pub fn histogram_settings(&self) -> HistogramSettings {
        let histogram = self.histogram.unwrap_or_default();
        HistogramSettings {
            bucket_width: histogram.bucket_width.unwrap_or(DEFAULT_BUCKET_WIDTH),
            floor: histogram.floor.unwrap_or(0.0),
            cap: histogram.cap.unwrap_or(self.bounds.max_total_rent),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.batch.concurrency
    }

    pub fn build_source(&self) -> Result<ConfiguredSource> {
        match self.source.r#type {
            SourceKind::Csv => {
                let path = validate_required_field("source.path", &self.source.path)?;
                Ok(ConfiguredSource::Csv(CsvListingSource::new(path, self.bounds)))
            }
            SourceKind::Http => {
                let endpoint = validate_required_field("source.endpoint", &self.source.endpoint)?;
                let timeout = Duration::from_secs(
                    self.source.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
                );
                Ok(ConfiguredSource::Http(HttpListingSource::new(
                    endpoint.clone(),
                    self.bounds,
                    timeout,
                )?))
            }
        }
    }

    /// Inline cities first, then the ones from `cities_file`.
    pub fn load_catalog(&self) -> Result<RegionCatalog> {
        let mut definitions = self.cities.clone();
        if let Some(file) = &self.cities_file {
            definitions.extend(load_cities_file(file)?);
        }
        for (i, city) in definitions.iter().enumerate() {
            validate_city(&format!("cities[{}]", i), city)?;
        }
        Ok(RegionCatalog::new(definitions))
    }

    pub fn validate_config(&self) -> Result<()> {
        match self.source.r#type {
            SourceKind::Csv => {
                let path = validate_required_field("source.path", &self.source.path)?;
                validate_path("source.path", path)?;
            }
            SourceKind::Http => {
                let endpoint = validate_required_field("source.endpoint", &self.source.endpoint)?;
                validate_url("source.endpoint", endpoint)?;
                if let Some(timeout) = self.source.timeout_seconds {
                    validate_positive_number("source.timeout_seconds", timeout as usize, 1)?;
                }
            }
        }

        validate_positive_real("bounds.max_total_rent", self.bounds.max_total_rent)?;
        validate_positive_real("bounds.max_living_space", self.bounds.max_living_space)?;

        let histogram = self.histogram_settings();
        validate_positive_real("histogram.bucket_width", histogram.bucket_width)?;
        if !(histogram.floor.is_finite() && histogram.floor < histogram.cap) {
            return Err(StatsError::InvalidConfigValueError {
                field: "histogram.floor".to_string(),
                value: histogram.floor.to_string(),
                reason: format!("Floor must be below the cap ({})", histogram.cap),
            });
        }
        if let Err(e) = bucket_count(histogram.bucket_width, histogram.floor, histogram.cap) {
            return Err(StatsError::InvalidConfigValueError {
                field: "histogram.bucket_width".to_string(),
                value: histogram.bucket_width.to_string(),
                reason: e.to_string(),
            });
        }

        validate_path("output.cache_dir", &self.output.cache_dir)?;
        validate_positive_number("batch.concurrency", self.batch.concurrency, 1)?;

        if let Some(file) = &self.cities_file {
            validate_path("cities_file", file)?;
        }
        for (i, city) in self.cities.iter().enumerate() {
            validate_city(&format!("cities[{}]", i), city)?;
        }
        Ok(())
    }
}

fn load_cities_file(file: &str) -> Result<Vec<CityDefinition>> {
    let content = std::fs::read_to_string(PathBuf::from(file))?;
    Ok(serde_json::from_str(&content)?)
}

fn validate_city(field: &str, city: &CityDefinition) -> Result<()> {
    validate_non_empty_string(&format!("{}.name", field), &city.name)?;
    validate_coordinates(field, city.latitude, city.longitude)?;
    if let Some(radius) = city.radius {
        validate_positive_real(&format!("{}.radius", field), radius)?;
    }
    for (j, neighborhood) in city.neighborhoods.iter().enumerate() {
        let field = format!("{}.neighborhoods[{}]", field, j);
        validate_non_empty_string(&format!("{}.name", field), &neighborhood.name)?;
        validate_coordinates(&field, neighborhood.latitude, neighborhood.longitude)?;
        if let Some(radius) = neighborhood.radius {
            validate_positive_real(&format!("{}.radius", field), radius)?;
        }
    }
    Ok(())
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
