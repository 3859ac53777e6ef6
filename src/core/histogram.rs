use crate::domain::model::{HistogramBucket, Listing, MAX_TOTAL_RENT};
use crate::utils::error::{Result, StatsError};

/// Upper limit on the number of buckets one histogram may hold.
pub const MAX_HISTOGRAM_BUCKETS: usize = 10_000;

pub const DEFAULT_BUCKET_WIDTH: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramSettings {
    pub bucket_width: f64,
    pub floor: f64,
    pub cap: f64,
}

impl Default for HistogramSettings {
    fn default() -> Self {
        Self {
            bucket_width: DEFAULT_BUCKET_WIDTH,
            floor: 0.0,
            cap: MAX_TOTAL_RENT,
        }
    }
}

/// Number of buckets needed to cover `[floor, cap)`, or an error when the
/// settings are unusable.
pub fn bucket_count(bucket_width: f64, floor: f64, cap: f64) -> Result<usize> {
    if !bucket_width.is_finite() || bucket_width <= 0.0 {
        return Err(StatsError::computation(format!(
            "histogram bucket width must be positive, got {}",
            bucket_width
        )));
    }
    if !floor.is_finite() || !cap.is_finite() {
        return Err(StatsError::computation("histogram range must be finite"));
    }
    if cap <= floor {
        return Ok(0);
    }
    let steps = ((cap - floor) / bucket_width).ceil();
    if steps > MAX_HISTOGRAM_BUCKETS as f64 {
        return Err(StatsError::computation(format!(
            "histogram over [{}, {}) with width {} needs {} buckets, at most {} allowed",
            floor, cap, bucket_width, steps, MAX_HISTOGRAM_BUCKETS
        )));
    }
    Ok(steps as usize)
}

/// Dense fixed-width histogram of total rents over `[floor, cap)`.
///
/// Every bucket is emitted, empty ones included. The last bucket is
/// clipped at `cap` when the range is not a multiple of the width.
pub fn compute_histogram(
    listings: &[&Listing],
    bucket_width: f64,
    floor: f64,
    cap: f64,
) -> Result<Vec<HistogramBucket>> {
    let total = bucket_count(bucket_width, floor, cap)?;
    if total == 0 {
        return Ok(Vec::new());
    }

    let mut buckets: Vec<HistogramBucket> = (0..total)
        .map(|i| HistogramBucket {
            lower_bound: floor + i as f64 * bucket_width,
            upper_bound: (floor + (i + 1) as f64 * bucket_width).min(cap),
            count: 0,
        })
        .collect();

    for listing in listings {
        let rent = listing.total_rent;
        if !(rent >= floor && rent < cap) {
            continue;
        }
        let index = (((rent - floor) / bucket_width).floor() as usize).min(total - 1);
        buckets[index].count += 1;
    }
    Ok(buckets)
}

impl HistogramSettings {
    pub fn build(&self, listings: &[&Listing]) -> Result<Vec<HistogramBucket>> {
        compute_histogram(listings, self.bucket_width, self.floor, self.cap)
    }
}
