use chrono::{DateTime, Utc};

use crate::core::geo::filter_region;
use crate::core::histogram::HistogramSettings;
use crate::core::inequality::inequality_index;
use crate::core::regression;
use crate::core::temporal::monthly_breakdown;
use crate::domain::model::{Listing, Region, StatsBundle};
use crate::utils::error::Result;

/// Regions at least this wide are too coarse for the grid index.
pub const MAX_INEQUALITY_RADIUS_KM: f64 = 100.0;

/// How deep a bundle goes. Sub-bundles (months, neighborhoods) are always
/// computed at [`StatsDepth::Leaf`], which is where recursion stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsDepth {
    Full,
    Leaf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsOptions {
    pub depth: StatsDepth,
    pub include_monthly: bool,
    pub include_inequality: bool,
    pub include_histogram: bool,
}

impl StatsOptions {
    pub fn new(include_monthly: bool, include_inequality: bool) -> Self {
        Self {
            depth: StatsDepth::Full,
            include_monthly,
            include_inequality,
            include_histogram: false,
        }
    }

    pub fn full() -> Self {
        Self::new(true, true).with_histogram(true)
    }

    /// Regression and standard error only.
    pub fn leaf() -> Self {
        Self {
            depth: StatsDepth::Leaf,
            include_monthly: false,
            include_inequality: false,
            include_histogram: false,
        }
    }

    pub fn with_histogram(mut self, include_histogram: bool) -> Self {
        self.include_histogram = include_histogram;
        self
    }

    fn monthly(&self) -> bool {
        self.depth == StatsDepth::Full && self.include_monthly
    }

    fn inequality(&self, region: &Region) -> bool {
        self.depth == StatsDepth::Full
            && self.include_inequality
            && region.radius_km.map_or(true, |r| r < MAX_INEQUALITY_RADIUS_KM)
    }

    fn histogram(&self) -> bool {
        self.depth == StatsDepth::Full && self.include_histogram
    }
}

/// Pure statistics over an in-memory listing set.
#[derive(Debug, Clone, Default)]
pub struct StatsEngine {
    histogram: HistogramSettings,
}

impl StatsEngine {
    pub fn new(histogram: HistogramSettings) -> Self {
        Self { histogram }
    }

    pub fn histogram_settings(&self) -> &HistogramSettings {
        &self.histogram
    }

    /// Narrows `listings` to `region` with the exact distance test, then
    /// computes the bundle.
    pub fn compute(
        &self,
        listings: &[Listing],
        region: &Region,
        options: StatsOptions,
        generated_at: DateTime<Utc>,
    ) -> Result<StatsBundle> {
        region.validate()?;
        let inside = filter_region(listings, region);
        tracing::debug!(
            fetched = listings.len(),
            inside = inside.len(),
            "listings narrowed to region"
        );
        self.compute_bundle(&inside, region, options, generated_at)
    }

    /// Bundle for listings already known to lie inside `region`.
    pub fn compute_bundle(
        &self,
        listings: &[&Listing],
        region: &Region,
        options: StatsOptions,
        generated_at: DateTime<Utc>,
    ) -> Result<StatsBundle> {
        let summary = regression::summarize(listings);
        let mut bundle = StatsBundle {
            count: summary.count,
            price_per_area: summary.price_per_area,
            standard_error: summary.standard_error,
            ..StatsBundle::empty(generated_at)
        };

        if options.inequality(region) {
            bundle.inequality_index = summary
                .slope
                .and_then(|slope| inequality_index(listings, slope));
        }

        if options.monthly() {
            let months = monthly_breakdown(listings, |group| {
                self.compute_leaf(group, region, generated_at)
            })?;
            bundle.monthly_breakdown = Some(months);
        }

        if options.histogram() {
            bundle.histogram = Some(self.histogram.build(listings)?);
        }

        Ok(bundle)
    }

    pub fn compute_leaf(
        &self,
        listings: &[&Listing],
        region: &Region,
        generated_at: DateTime<Utc>,
    ) -> Result<StatsBundle> {
        self.compute_bundle(listings, region, StatsOptions::leaf(), generated_at)
    }
}
