//! Location relation normalization and the symmetric relation index.

use std::collections::HashMap;

use crate::model::{LocationId, LocationRelation};
use crate::traits::Leg;

/// Times above this (with implausible speed) are taken to be minutes.
const MINUTES_SUSPECT_TIME: f64 = 60.0;
/// km/h above which a time value cannot be hours.
const IMPLAUSIBLE_SPEED_KMH: f64 = 200.0;
const MAX_SHORT_LEG_HOURS: f64 = 48.0;
const SHORT_LEG_KM: f64 = 200.0;

/// Clean a raw distance/time pair into kilometers and hours.
pub fn normalize(dist: f64, time: f64) -> Leg {
    let distance_km = non_negative(dist);
    let mut hours = non_negative(time);

    if hours > MINUTES_SUSPECT_TIME && distance_km / hours > IMPLAUSIBLE_SPEED_KMH {
        hours /= 60.0;
    }
    if hours > MAX_SHORT_LEG_HOURS && distance_km < SHORT_LEG_KM {
        hours = MAX_SHORT_LEG_HOURS;
    }

    Leg { distance_km, hours }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

/// Normalized relations, reachable in both directions.
#[derive(Debug, Clone, Default)]
pub struct RelationIndex {
    legs: HashMap<(LocationId, LocationId), Leg>,
}

impl RelationIndex {
    pub fn new(relations: &[LocationRelation]) -> Self {
        let mut legs = HashMap::with_capacity(relations.len() * 2);
        for relation in relations {
            let leg = normalize(relation.dist, relation.time);
            legs.insert((relation.id_loc_1, relation.id_loc_2), leg);
            legs.insert((relation.id_loc_2, relation.id_loc_1), leg);
        }
        Self { legs }
    }

    pub fn get(&self, from: LocationId, to: LocationId) -> Option<Leg> {
        self.legs.get(&(from, to)).copied()
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }
}
