//! Seams between the planning engine and its travel-time sources.

use crate::model::Location;

/// A single repositioning leg: distance and travel time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Leg {
    pub distance_km: f64,
    pub hours: f64,
}

impl Leg {
    pub const ZERO: Leg = Leg {
        distance_km: 0.0,
        hours: 0.0,
    };

    pub fn new(distance_km: f64, hours: f64) -> Self {
        Self { distance_km, hours }
    }
}

/// Estimates a deadhead leg between two locations when no relation record exists.
///
/// Returning `None` means no estimate is possible and the vehicle cannot be
/// repositioned for the route.
pub trait TravelEstimator {
    fn estimate(&self, from: &Location, to: &Location) -> Option<Leg>;
}

/// Never produces an estimate; only relation records count.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEstimate;

impl TravelEstimator for NoEstimate {
    fn estimate(&self, _from: &Location, _to: &Location) -> Option<Leg> {
        None
    }
}
