use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::adapters::prefilter;
use crate::core::geo::BoundingBox;
use crate::domain::model::{Listing, Region, SanityBounds};
use crate::domain::ports::ListingSource;
use crate::utils::error::{Result, StatsError};

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Fetches listings as a JSON array from a listings API.
///
/// The sanity caps and the region's bounding box are sent as query
/// parameters so the server can narrow the result; the response is still
/// filtered locally because the server is not trusted to do so exactly.
pub struct HttpListingSource {
    client: Client,
    endpoint: String,
    bounds: SanityBounds,
}

impl HttpListingSource {
    pub fn new(endpoint: impl Into<String>, bounds: SanityBounds, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StatsError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            bounds,
        })
    }

    fn query(&self, region: &Region) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("max_total_rent", self.bounds.max_total_rent.to_string()),
            ("max_living_space", self.bounds.max_living_space.to_string()),
        ];
        if let Some(radius) = region.radius_km {
            let bbox = BoundingBox::around(region.latitude, region.longitude, radius);
            query.push(("north", format!("{:.9}", bbox.north)));
            query.push(("south", format!("{:.9}", bbox.south)));
            query.push(("west", format!("{:.9}", bbox.west)));
            query.push(("east", format!("{:.9}", bbox.east)));
        }
        query
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, region: &Region) -> Result<Vec<Listing>> {
        tracing::debug!("Requesting listings from {}", self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query(region))
            .send()
            .await
            .map_err(|e| StatsError::fetch(self.name(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsError::fetch(
                self.name(),
                format!("{} responded with {}", self.endpoint, status),
            ));
        }

        let listings: Vec<Listing> = response
            .json()
            .await
            .map_err(|e| StatsError::fetch(self.name(), e))?;
        tracing::debug!("Received {} listings", listings.len());
        Ok(prefilter(listings, region, &self.bounds))
    }
}
