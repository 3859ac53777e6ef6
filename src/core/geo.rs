//! Region membership: a degree-based bounding box as a cheap pre-filter,
//! then the great-circle distance as the authoritative test.
//!
//! The longitude extent uses `111.320 * cos(lat)` km per degree, which
//! degenerates close to the poles. Regions there are not supported.

use crate::domain::model::{Listing, Region};

pub const KM_PER_DEGREE_LATITUDE: f64 = 110.574;
pub const KM_PER_DEGREE_LONGITUDE_AT_EQUATOR: f64 = 111.320;
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Width in degrees of one kilometer of longitude at the given latitude.
pub fn longitude_degrees_per_km(latitude: f64) -> f64 {
    1.0 / (KM_PER_DEGREE_LONGITUDE_AT_EQUATOR * latitude.to_radians().cos())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub west: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn around(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        let lat_extent = radius_km / KM_PER_DEGREE_LATITUDE;
        let lon_extent = radius_km * longitude_degrees_per_km(latitude);
        Self {
            north: latitude + lat_extent,
            south: latitude - lat_extent,
            west: longitude - lon_extent,
            east: longitude + lon_extent,
        }
    }

    /// Inclusive on every edge; the exact distance check decides the rest.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.south
            && latitude <= self.north
            && longitude >= self.west
            && longitude <= self.east
    }
}

/// Haversine distance in meters.
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c * 1000.0
}

#[derive(Debug, Clone, Copy)]
pub struct GeoFilter {
    latitude: f64,
    longitude: f64,
    radius_m: f64,
    bbox: BoundingBox,
}

impl GeoFilter {
    pub fn new(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius_m: radius_km * 1000.0,
            bbox: BoundingBox::around(latitude, longitude, radius_km),
        }
    }

    /// `None` for regions without a radius, which admit everything.
    pub fn for_region(region: &Region) -> Option<Self> {
        region
            .radius_km
            .map(|radius| Self::new(region.latitude, region.longitude, radius))
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    pub fn contains_point(&self, latitude: f64, longitude: f64) -> bool {
        if !self.bbox.contains(latitude, longitude) {
            return false;
        }
        let distance = haversine_meters(latitude, longitude, self.latitude, self.longitude);
        if self.radius_m == 0.0 {
            return distance <= f64::EPSILON;
        }
        distance < self.radius_m
    }

    pub fn contains(&self, listing: &Listing) -> bool {
        listing
            .coordinates()
            .is_some_and(|(lat, lon)| self.contains_point(lat, lon))
    }
}

/// Listings inside `region`. Whole-dataset regions return every listing.
pub fn filter_region<'a>(listings: &'a [Listing], region: &Region) -> Vec<&'a Listing> {
    match GeoFilter::for_region(region) {
        Some(filter) => listings.iter().filter(|l| filter.contains(l)).collect(),
        None => listings.iter().collect(),
    }
}
