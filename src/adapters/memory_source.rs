use async_trait::async_trait;

use crate::adapters::prefilter;
use crate::domain::model::{Listing, Region, SanityBounds};
use crate::domain::ports::ListingSource;
use crate::utils::error::Result;

/// Listings already held in memory, filtered like any other source.
#[derive(Debug, Clone, Default)]
pub struct MemoryListingSource {
    listings: Vec<Listing>,
    bounds: SanityBounds,
}

impl MemoryListingSource {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            listings,
            bounds: SanityBounds::default(),
        }
    }

    pub fn with_bounds(mut self, bounds: SanityBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[async_trait]
impl ListingSource for MemoryListingSource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(&self, region: &Region) -> Result<Vec<Listing>> {
        Ok(prefilter(self.listings.iter().cloned(), region, &self.bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_bounds() {
        let source = MemoryListingSource::new(vec![
            Listing::new(1500.0, 80.0),
            Listing::new(2500.0, 80.0),
        ])
        .with_bounds(SanityBounds {
            max_total_rent: 2000.0,
            max_living_space: 200.0,
        });

        let listings = tokio_test::block_on(source.fetch(&Region::all())).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(source.len(), 2);
    }
}
