//! Haversine deadhead estimator (fallback when no relation record exists).
//!
//! Uses great-circle distance and an assumed average speed. Ignores roads,
//! so it under-estimates real driving distance.

use crate::model::Location;
use crate::traits::{Leg, TravelEstimator};

/// Average driving speed assumption for time estimation.
pub const DEFAULT_SPEED_KMH: f64 = 60.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone)]
pub struct HaversineEstimator {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineEstimator {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineEstimator {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Great-circle distance between two (lat, lng) points in kilometers.
    pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
        let (lat1, lng1) = from;
        let (lat2, lng2) = to;

        let lat1_rad = lat1.to_radians();
        let lat2_rad = lat2.to_radians();
        let delta_lat = (lat2 - lat1).to_radians();
        let delta_lng = (lng2 - lng1).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    fn km_to_hours(&self, km: f64) -> f64 {
        km / self.speed_kmh
    }
}

impl TravelEstimator for HaversineEstimator {
    fn estimate(&self, from: &Location, to: &Location) -> Option<Leg> {
        let km = Self::haversine_km(from.coords()?, to.coords()?);
        Some(Leg::new(km, self.km_to_hours(km)))
    }
}
