//! Price-per-area regression.
//!
//! Living space is regressed on total rent with the line forced through
//! the origin, so `slope` is square meters per currency unit and the
//! headline price per area is its reciprocal. The standard error is built
//! from perpendicular distances to that line rather than from classical
//! OLS residuals; the formula is kept as-is so published figures stay
//! comparable over time.

use crate::domain::model::Listing;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionFit {
    pub slope: f64,
    pub count: usize,
}

impl RegressionFit {
    /// `1 / slope`, undefined when the slope is zero or not finite.
    pub fn price_per_area(&self) -> Option<f64> {
        finite(1.0 / self.slope)
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// `Σ(rent·area) / Σ(rent²)`. `None` when `Σ(rent²)` is zero.
pub fn fit_slope<'a, I>(listings: I) -> Option<RegressionFit>
where
    I: IntoIterator<Item = &'a Listing>,
{
    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    let mut count = 0;
    for listing in listings {
        sum_xy += listing.total_rent * listing.living_space;
        sum_xx += listing.total_rent * listing.total_rent;
        count += 1;
    }
    if sum_xx == 0.0 {
        return None;
    }
    finite(sum_xy / sum_xx).map(|slope| RegressionFit { slope, count })
}

/// Needs at least two listings.
pub fn standard_error<'a, I>(listings: I, slope: f64) -> Option<f64>
where
    I: IntoIterator<Item = &'a Listing>,
{
    let norm = (slope * slope + 1.0).sqrt();
    let mut residuals = 0.0;
    let mut n = 0usize;
    for listing in listings {
        residuals += (listing.total_rent * slope - listing.living_space).abs() / norm;
        n += 1;
    }
    if n < 2 {
        return None;
    }
    let n = n as f64;
    let std = 1.0 / (residuals / (n - 1.0)).sqrt();
    finite(1.0 / std / n.sqrt())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionSummary {
    pub count: usize,
    pub slope: Option<f64>,
    pub price_per_area: Option<f64>,
    pub standard_error: Option<f64>,
}

pub fn summarize(listings: &[&Listing]) -> RegressionSummary {
    let fit = fit_slope(listings.iter().copied());
    RegressionSummary {
        count: listings.len(),
        slope: fit.map(|f| f.slope),
        price_per_area: fit.and_then(|f| f.price_per_area()),
        standard_error: fit.and_then(|f| standard_error(listings.iter().copied(), f.slope)),
    }
}

/// Display policy: consumers only trust a price per area backed by more
/// than three listings. The computation itself never applies it.
pub fn is_presentable(summary: &RegressionSummary) -> bool {
    summary.count > 3 && summary.price_per_area.is_some()
}
