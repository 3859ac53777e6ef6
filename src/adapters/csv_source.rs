use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use crate::adapters::prefilter;
use crate::domain::model::{parse_timestamp, Listing, Region, SanityBounds};
use crate::domain::ports::ListingSource;
use crate::utils::error::{Result, StatsError};

/// One row of a listing export. Rent may be missing in raw exports;
/// malformed coordinates are read as absent.
#[derive(Debug, Deserialize)]
struct CsvRow {
    total_rent: Option<f64>,
    living_space: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    latitude: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    longitude: Option<f64>,
    #[serde(default)]
    created_at: Option<String>,
}

impl CsvRow {
    fn into_listing(self) -> Option<Listing> {
        Some(Listing {
            total_rent: self.total_rent?,
            living_space: self.living_space?,
            latitude: self.latitude,
            longitude: self.longitude,
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
        })
    }
}

/// Reads listings from a CSV export with a
/// `total_rent,living_space,latitude,longitude,created_at` header.
#[derive(Debug, Clone)]
pub struct CsvListingSource {
    path: PathBuf,
    bounds: SanityBounds,
}

impl CsvListingSource {
    pub fn new(path: impl Into<PathBuf>, bounds: SanityBounds) -> Self {
        Self {
            path: path.into(),
            bounds,
        }
    }

    pub fn parse(data: &[u8]) -> std::result::Result<Vec<Listing>, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(data);
        let mut listings = Vec::new();
        let mut skipped = 0usize;
        for row in reader.deserialize::<CsvRow>() {
            match row?.into_listing() {
                Some(listing) => listings.push(listing),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::debug!("Skipped {} rows without rent or living space", skipped);
        }
        Ok(listings)
    }
}

#[async_trait]
impl ListingSource for CsvListingSource {
    fn name(&self) -> &str {
        "csv"
    }

    async fn fetch(&self, region: &Region) -> Result<Vec<Listing>> {
        let data = tokio::fs::read(&self.path).await.map_err(|e| {
            StatsError::fetch(self.name(), format!("{}: {}", self.path.display(), e))
        })?;
        let listings = Self::parse(&data).map_err(|e| StatsError::fetch(self.name(), e))?;
        let total = listings.len();
        let narrowed = prefilter(listings, region, &self.bounds);
        tracing::debug!(
            "Read {} listings from {}, {} kept after bounds",
            total,
            self.path.display(),
            narrowed.len()
        );
        Ok(narrowed)
    }
}
