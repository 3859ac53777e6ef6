use chrono::Utc;

use crate::core::geo::filter_region;
use crate::core::histogram::HistogramSettings;
use crate::core::stats::{StatsEngine, StatsOptions};
use crate::domain::catalog::{CatalogCity, CatalogNeighborhood};
use crate::domain::model::{CityReport, NeighborhoodStats, Region, StatsBundle};
use crate::domain::ports::ListingSource;
use crate::utils::error::Result;

/// Fetches listings once per region and turns them into statistics.
pub struct StatsOrchestrator<S: ListingSource> {
    source: S,
    engine: StatsEngine,
}

impl<S: ListingSource> StatsOrchestrator<S> {
    pub fn new(source: S, histogram: HistogramSettings) -> Self {
        Self {
            source,
            engine: StatsEngine::new(histogram),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn engine(&self) -> &StatsEngine {
        &self.engine
    }

    /// A fetch failure is returned as-is and no bundle is produced.
    pub async fn compute_stats(&self, region: &Region, options: StatsOptions) -> Result<StatsBundle> {
        self.compute_with_neighborhoods(region, &[], options).await
    }

    /// Neighborhoods are filtered from the listings already fetched for
    /// `region`; each gets a leaf bundle.
    pub async fn compute_with_neighborhoods(
        &self,
        region: &Region,
        neighborhoods: &[CatalogNeighborhood],
        options: StatsOptions,
    ) -> Result<StatsBundle> {
        region.validate()?;
        for neighborhood in neighborhoods {
            neighborhood.region.validate()?;
        }

        let listings = self.source.fetch(region).await?;
        tracing::debug!(
            "Fetched {} listings from '{}'",
            listings.len(),
            self.source.name()
        );

        let generated_at = Utc::now();
        let mut bundle = self.engine.compute(&listings, region, options, generated_at)?;

        if !neighborhoods.is_empty() {
            let mut stats = Vec::with_capacity(neighborhoods.len());
            for neighborhood in neighborhoods {
                let inside = filter_region(&listings, &neighborhood.region);
                let leaf = self
                    .engine
                    .compute_leaf(&inside, &neighborhood.region, generated_at)?;
                stats.push(NeighborhoodStats {
                    name: neighborhood.name.clone(),
                    slug: neighborhood.slug.clone(),
                    region: neighborhood.region,
                    stats: leaf,
                });
            }
            bundle.neighborhoods = Some(stats);
        }

        Ok(bundle)
    }

    /// Full report for a catalog city: monthly breakdown, inequality index,
    /// histogram and neighborhoods.
    pub async fn compute_city(&self, city: &CatalogCity) -> Result<CityReport> {
        let region = city.region();
        tracing::info!("Computing statistics for {}", city.city.name);
        let stats = self
            .compute_with_neighborhoods(&region, &city.neighborhoods, StatsOptions::full())
            .await?;

        Ok(CityReport {
            slug: city.slug.clone(),
            name: city.city.name.clone(),
            country: city.city.country.clone(),
            latitude: region.latitude,
            longitude: region.longitude,
            radius: region.radius_km.unwrap_or_default(),
            stats,
        })
    }
}
