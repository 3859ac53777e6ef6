// Adapters layer: concrete implementations for external systems
// (listing sources, report storage).

pub mod csv_source;
pub mod http_source;
pub mod memory_source;
pub mod storage;

use async_trait::async_trait;

use crate::core::geo::BoundingBox;
use crate::domain::model::{Listing, Region, SanityBounds};
use crate::domain::ports::ListingSource;
use crate::utils::error::Result;

pub use csv_source::CsvListingSource;
pub use http_source::HttpListingSource;
pub use memory_source::MemoryListingSource;
pub use storage::{LocalStorage, ReportCache};

/// Drops listings outside the sanity bounds and, for regions with a radius,
/// outside the region's bounding box. The exact distance test is left to
/// the core.
pub(crate) fn prefilter<I>(listings: I, region: &Region, bounds: &SanityBounds) -> Vec<Listing>
where
    I: IntoIterator<Item = Listing>,
{
    let bbox = region
        .radius_km
        .map(|radius| BoundingBox::around(region.latitude, region.longitude, radius));
    listings
        .into_iter()
        .filter(|listing| bounds.admits(listing))
        .filter(|listing| match bbox {
            Some(bbox) => listing
                .coordinates()
                .is_some_and(|(lat, lon)| bbox.contains(lat, lon)),
            None => true,
        })
        .collect()
}

/// Listing source selected by configuration.
pub enum ConfiguredSource {
    Csv(CsvListingSource),
    Http(HttpListingSource),
}

#[async_trait]
impl ListingSource for ConfiguredSource {
    fn name(&self) -> &str {
        match self {
            ConfiguredSource::Csv(source) => source.name(),
            ConfiguredSource::Http(source) => source.name(),
        }
    }

    async fn fetch(&self, region: &Region) -> Result<Vec<Listing>> {
        match self {
            ConfiguredSource::Csv(source) => source.fetch(region).await,
            ConfiguredSource::Http(source) => source.fetch(region).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefilter_applies_bounds_and_bbox() {
        let listings = vec![
            Listing::new(800.0, 60.0).at(52.50, 13.40),
            Listing::new(3100.0, 60.0).at(52.50, 13.40),
            Listing::new(800.0, 60.0).at(53.50, 13.40),
            Listing::new(800.0, 60.0),
        ];

        let narrowed = prefilter(listings.clone(), &Region::circle(52.5, 13.4, 5.0), &SanityBounds::default());
        assert_eq!(narrowed.len(), 1);

        let everything = prefilter(listings, &Region::all(), &SanityBounds::default());
        assert_eq!(everything.len(), 3);
    }
}
