//! Spatial inequality index.
//!
//! The bounding box of the geolocated listings is tiled into cells of
//! roughly one square kilometer. Rows are `1/110.574` degrees tall; the
//! column width is recomputed for every row from the latitude of its
//! southern edge. Each cell holding at least [`MIN_LISTINGS_PER_CELL`]
//! listings contributes its own price per area, and the index is the
//! sample standard deviation of those local prices scaled by the slope
//! of the whole region.

use std::collections::BTreeMap;

use crate::core::geo::{longitude_degrees_per_km, KM_PER_DEGREE_LATITUDE};
use crate::core::regression::fit_slope;
use crate::domain::model::Listing;

pub const MIN_LISTINGS_PER_CELL: usize = 5;

/// Grid cell position as (row, column) from the south-west corner.
type Cell = (usize, usize);

fn bin_by_cell<'a>(listings: &[&'a Listing]) -> BTreeMap<Cell, Vec<&'a Listing>> {
    let located: Vec<(&Listing, f64, f64)> = listings
        .iter()
        .filter_map(|l| l.coordinates().map(|(lat, lon)| (*l, lat, lon)))
        .collect();

    let mut cells: BTreeMap<Cell, Vec<&Listing>> = BTreeMap::new();
    let Some(south) = located.iter().map(|(_, lat, _)| *lat).reduce(f64::min) else {
        return cells;
    };
    let west = located
        .iter()
        .map(|(_, _, lon)| *lon)
        .fold(f64::INFINITY, f64::min);

    let row_height = 1.0 / KM_PER_DEGREE_LATITUDE;
    for (listing, lat, lon) in located {
        let row = ((lat - south) / row_height).floor() as usize;
        let row_south = south + row as f64 * row_height;
        let column_width = longitude_degrees_per_km(row_south);
        let column = ((lon - west) / column_width).floor() as usize;
        cells.entry((row, column)).or_default().push(listing);
    }
    cells
}

/// Price per area of every cell dense enough to fit on its own.
pub fn cell_prices(listings: &[&Listing]) -> Vec<f64> {
    bin_by_cell(listings)
        .into_values()
        .filter(|cell| cell.len() >= MIN_LISTINGS_PER_CELL)
        .filter_map(|cell| fit_slope(cell).and_then(|fit| fit.price_per_area()))
        .collect()
}

/// Sample standard deviation (n - 1). A single value has no spread.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    match values.len() {
        0 => None,
        1 => Some(0.0),
        n => {
            let mean = values.iter().sum::<f64>() / n as f64;
            let variance =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
            Some(variance.sqrt())
        }
    }
}

/// `None` when no cell reaches the density threshold.
pub fn inequality_index(listings: &[&Listing], global_slope: f64) -> Option<f64> {
    let prices = cell_prices(listings);
    tracing::trace!(dense_cells = prices.len(), "inequality grid binned");
    sample_std_dev(&prices)
        .map(|std| std * global_slope)
        .filter(|index| index.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `per_cluster` listings stacked on one point, all at `price` per m².
    fn cluster(lat: f64, lon: f64, price: f64, per_cluster: usize) -> Vec<Listing> {
        (0..per_cluster)
            .map(|i| {
                let area = 30.0 + 10.0 * i as f64;
                Listing::new(area * price, area).at(lat, lon)
            })
            .collect()
    }

    #[test]
    fn test_uniform_prices_give_zero_index() {
        let mut listings = Vec::new();
        for i in 0..4 {
            for j in 0..4 {
                listings.extend(cluster(52.40 + i as f64 * 0.05, 13.30 + j as f64 * 0.08, 11.0, 6));
            }
        }
        let refs: Vec<&Listing> = listings.iter().collect();
        let slope = fit_slope(refs.iter().copied()).unwrap().slope;

        assert_eq!(cell_prices(&refs).len(), 16);
        let index = inequality_index(&refs, slope).unwrap();
        assert!(index.abs() < 1e-9, "index {}", index);
    }

    #[test]
    fn test_two_price_levels() {
        let mut listings = cluster(48.10, 11.50, 10.0, 5);
        listings.extend(cluster(48.20, 11.60, 20.0, 5));
        let refs: Vec<&Listing> = listings.iter().collect();
        let slope = fit_slope(refs.iter().copied()).unwrap().slope;

        let mut prices = cell_prices(&refs);
        prices.sort_by(f64::total_cmp);
        assert_eq!(prices.len(), 2);
        assert!((prices[0] - 10.0).abs() < 1e-9);
        assert!((prices[1] - 20.0).abs() < 1e-9);

        let expected = 50f64.sqrt() * slope;
        let index = inequality_index(&refs, slope).unwrap();
        assert!((index - expected).abs() < 1e-9);
    }

    #[test]
    fn test_sparse_cells_are_ignored() {
        let mut listings = cluster(48.10, 11.50, 10.0, 4);
        listings.extend(cluster(48.20, 11.60, 20.0, 4));
        listings.push(Listing::new(900.0, 70.0));
        let refs: Vec<&Listing> = listings.iter().collect();

        assert!(cell_prices(&refs).is_empty());
        assert!(inequality_index(&refs, 0.1).is_none());
    }

    #[test]
    fn test_single_dense_cell_has_no_spread() {
        let listings = cluster(45.76, 4.83, 14.0, 7);
        let refs: Vec<&Listing> = listings.iter().collect();
        assert_eq!(inequality_index(&refs, 0.07), Some(0.0));
    }

    #[test]
    fn test_sample_std_dev() {
        assert_eq!(sample_std_dev(&[]), None);
        let std = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }
}
