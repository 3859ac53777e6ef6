use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::core::histogram::{bucket_count, HistogramSettings};
use crate::core::stats::StatsOptions;
use crate::domain::model::{Region, SanityBounds, MAX_LIVING_SPACE, MAX_TOTAL_RENT};
use crate::utils::error::{Result, StatsError};
use crate::utils::validation::{
    validate_coordinates, validate_path, validate_positive_real, validate_required_field,
    Validate,
};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "rent-stats")]
#[command(about = "Rent statistics for the listings around a location")]
pub struct CliConfig {
    /// CSV export with total_rent,living_space,latitude,longitude,created_at
    #[arg(long)]
    pub listings: String,

    #[arg(long, allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub longitude: Option<f64>,

    /// Radius in kilometers (defaults to 5)
    #[arg(long)]
    pub radius: Option<f64>,

    /// Use the whole dataset instead of a region
    #[arg(long, conflicts_with_all = ["latitude", "longitude", "radius"])]
    pub all: bool,

    #[arg(long, help = "Include the monthly breakdown")]
    pub monthly: bool,

    #[arg(long, help = "Include the spatial inequality index")]
    pub inequality: bool,

    #[arg(long, help = "Include the rent histogram")]
    pub histogram: bool,

    #[arg(long, default_value = "10")]
    pub bucket_width: f64,

    #[arg(long, default_value_t = MAX_TOTAL_RENT)]
    pub max_total_rent: f64,

    #[arg(long, default_value_t = MAX_LIVING_SPACE)]
    pub max_living_space: f64,

    /// Write the JSON bundle to this file instead of stdout
    #[arg(long)]
    pub output: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn region(&self) -> Region {
        match (self.all, self.latitude, self.longitude) {
            (false, Some(lat), Some(lon)) => Region::around(lat, lon, self.radius),
            _ => Region::all(),
        }
    }

    pub fn bounds(&self) -> SanityBounds {
        SanityBounds {
            max_total_rent: self.max_total_rent,
            max_living_space: self.max_living_space,
        }
    }

    pub fn histogram_settings(&self) -> HistogramSettings {
        HistogramSettings {
            bucket_width: self.bucket_width,
            floor: 0.0,
            cap: self.max_total_rent,
        }
    }

    pub fn stats_options(&self) -> StatsOptions {
        StatsOptions::new(self.monthly, self.inequality).with_histogram(self.histogram)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("listings", &self.listings)?;
        if !self.all {
            let lat = validate_required_field("latitude", &self.latitude)?;
            let lon = validate_required_field("longitude", &self.longitude)?;
            validate_coordinates("region", *lat, *lon)?;
            if let Some(radius) = self.radius {
                validate_positive_real("radius", radius)?;
            }
        }
        validate_positive_real("bucket_width", self.bucket_width)?;
        validate_positive_real("max_total_rent", self.max_total_rent)?;
        validate_positive_real("max_living_space", self.max_living_space)?;
        if self.histogram {
            let settings = self.histogram_settings();
            bucket_count(settings.bucket_width, settings.floor, settings.cap).map_err(|e| {
                StatsError::InvalidConfigValueError {
                    field: "bucket_width".to_string(),
                    value: self.bucket_width.to_string(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(output) = &self.output {
            validate_path("output", output)?;
        }
        Ok(())
    }
}
