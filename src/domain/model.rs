use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::error::{Result, StatsError};

/// Radius used when a caller asks for statistics around a point without
/// giving a distance.
pub const DEFAULT_CENTER_DISTANCE_KM: f64 = 5.0;
pub const MAX_TOTAL_RENT: f64 = 3000.0;
pub const MAX_LIVING_SPACE: f64 = 200.0;

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD`. Timestamps
/// without an offset are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Unparseable timestamps become `None` instead of failing the listing.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// A single rental offer.
///
/// Coordinates and timestamp come from scraped data and may be missing;
/// the statistics tolerate that rather than rejecting the listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub total_rent: f64,
    pub living_space: f64,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Listing {
    pub fn new(total_rent: f64, living_space: f64) -> Self {
        Self {
            total_rent,
            living_space,
            latitude: None,
            longitude: None,
            created_at: None,
        }
    }

    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn created(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Both coordinates present and finite.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Circular area of interest. A missing radius stands for the whole dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_km: Option<f64>,
}

impl Region {
    pub fn all() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            radius_km: None,
        }
    }

    pub fn circle(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius_km: Some(radius_km),
        }
    }

    pub fn around(latitude: f64, longitude: f64, radius_km: Option<f64>) -> Self {
        Self::circle(
            latitude,
            longitude,
            radius_km.unwrap_or(DEFAULT_CENTER_DISTANCE_KM),
        )
    }

    pub fn is_all(&self) -> bool {
        self.radius_km.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        let Some(radius) = self.radius_km else {
            return Ok(());
        };
        if !radius.is_finite() || radius < 0.0 {
            return Err(StatsError::computation(format!(
                "radius must be a non-negative number of kilometers, got {}",
                radius
            )));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(StatsError::computation(format!(
                "latitude {} is outside [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(StatsError::computation(format!(
                "longitude {} is outside [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// Caps applied by listing sources to drop implausible offers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SanityBounds {
    #[serde(default = "default_max_total_rent")]
    pub max_total_rent: f64,
    #[serde(default = "default_max_living_space")]
    pub max_living_space: f64,
}

fn default_max_total_rent() -> f64 {
    MAX_TOTAL_RENT
}

fn default_max_living_space() -> f64 {
    MAX_LIVING_SPACE
}

impl Default for SanityBounds {
    fn default() -> Self {
        Self {
            max_total_rent: MAX_TOTAL_RENT,
            max_living_space: MAX_LIVING_SPACE,
        }
    }
}

impl SanityBounds {
    pub fn admits(&self, listing: &Listing) -> bool {
        listing.total_rent > 0.0
            && listing.total_rent < self.max_total_rent
            && listing.living_space > 0.0
            && listing.living_space < self.max_living_space
    }
}

/// One `[lower_bound, upper_bound)` rent range and its listing count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBucket {
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub count: usize,
}

/// Statistics for one set of listings.
///
/// The optional arrays are only present on top-level bundles; monthly and
/// neighborhood entries are leaves and omit them entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsBundle {
    pub count: usize,
    pub price_per_area: Option<f64>,
    pub standard_error: Option<f64>,
    pub inequality_index: Option<f64>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_breakdown: Option<Vec<MonthlyStats>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub histogram: Option<Vec<HistogramBucket>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhoods: Option<Vec<NeighborhoodStats>>,
}

impl StatsBundle {
    pub fn empty(generated_at: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            price_per_area: None,
            standard_error: None,
            inequality_index: None,
            generated_at,
            monthly_breakdown: None,
            histogram: None,
            neighborhoods: None,
        }
    }

    /// Leaf bundles carry no nested data.
    pub fn is_leaf(&self) -> bool {
        self.monthly_breakdown.is_none() && self.histogram.is_none() && self.neighborhoods.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub month: String,
    #[serde(flatten)]
    pub stats: StatsBundle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodStats {
    pub name: String,
    pub slug: String,
    pub region: Region,
    #[serde(flatten)]
    pub stats: StatsBundle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodDefinition {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub radius: Option<f64>,
}

impl NeighborhoodDefinition {
    pub fn region(&self) -> Region {
        Region::around(self.latitude, self.longitude, self.radius)
    }
}

/// A monitored city as declared in the catalog file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityDefinition {
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub radius: Option<f64>,
    #[serde(default)]
    pub neighborhoods: Vec<NeighborhoodDefinition>,
}

impl CityDefinition {
    pub fn region(&self) -> Region {
        Region::around(self.latitude, self.longitude, self.radius)
    }
}

/// Cached statistics for one catalog city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityReport {
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    #[serde(flatten)]
    pub stats: StatsBundle,
}

impl CityReport {
    /// Index view of a city: headline figures without the monthly and
    /// neighborhood arrays.
    pub fn summary(&self) -> CityReport {
        let mut summary = self.clone();
        summary.stats.monthly_breakdown = None;
        summary.stats.neighborhoods = None;
        summary
    }
}
