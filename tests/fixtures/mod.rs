//! Test fixtures for fleet-planner.
//!
//! Provides:
//! - Polish depot locations with real coordinates
//! - Builders for vehicles and single-segment routes

#![allow(dead_code)]

pub mod polish_locations;

pub use polish_locations::*;

use fleet_planner::model::{
    Dataset, Location, LocationId, LocationRelation, Route, RouteId, Segment, Vehicle,
};

/// Builder for test vehicles with a generous contract and service interval.
#[derive(Clone, Debug)]
pub struct TestVehicle {
    vehicle: Vehicle,
}

impl TestVehicle {
    pub fn new(id: u32) -> Self {
        Self {
            vehicle: Vehicle {
                id,
                registration_number: format!("WA {id:05}"),
                brand: "Scania".to_string(),
                service_interval_km: 100_000.0,
                leasing_start_km: 0.0,
                leasing_limit_km: 150_000.0,
                leasing_start_date: "2024-01-01".to_string(),
                leasing_end_date: "2026-12-31".to_string(),
                current_odometer_km: 0.0,
                current_location_id: None,
            },
        }
    }

    pub fn at(mut self, location: LocationId) -> Self {
        self.vehicle.current_location_id = Some(location);
        self
    }

    pub fn odometer(mut self, km: f64) -> Self {
        self.vehicle.current_odometer_km = km;
        self
    }

    pub fn leasing(mut self, start_km: f64, limit_km: f64) -> Self {
        self.vehicle.leasing_start_km = start_km;
        self.vehicle.leasing_limit_km = limit_km;
        self
    }

    pub fn service_interval(mut self, km: f64) -> Self {
        self.vehicle.service_interval_km = km;
        self
    }

    pub fn build(self) -> Vehicle {
        self.vehicle
    }
}

/// Assembles a [`Dataset`]; route ids are handed out from 1 in call order.
#[derive(Clone, Debug, Default)]
pub struct ScenarioBuilder {
    dataset: Dataset,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every depot in [`DEPOTS`] as locations 1..=10.
    pub fn with_depots(mut self) -> Self {
        for (index, place) in DEPOTS.iter().enumerate() {
            self = self.place(index as LocationId + 1, place);
        }
        self
    }

    pub fn place(mut self, id: LocationId, place: &Place) -> Self {
        self.dataset.locations.push(Location {
            id,
            name: place.name.to_string(),
            lat: Some(place.lat),
            lng: Some(place.lng),
            is_hub: false,
        });
        self
    }

    /// A location without coordinates.
    pub fn bare_location(mut self, id: LocationId) -> Self {
        self.dataset.locations.push(Location {
            id,
            name: format!("yard {id}"),
            lat: None,
            lng: None,
            is_hub: false,
        });
        self
    }

    pub fn relation(mut self, a: LocationId, b: LocationId, dist: f64, time: f64) -> Self {
        let id = self.dataset.relations.len() as u32 + 1;
        self.dataset.relations.push(LocationRelation {
            id,
            id_loc_1: a,
            id_loc_2: b,
            dist,
            time,
        });
        self
    }

    pub fn vehicle(mut self, vehicle: TestVehicle) -> Self {
        self.dataset.vehicles.push(vehicle.build());
        self
    }

    /// A single-segment route; times are RFC 3339 or `YYYY-MM-DD HH:MM:SS`.
    pub fn route(mut self, from: LocationId, to: LocationId, start: &str, end: &str, km: f64) -> Self {
        let id = self.next_route_id();
        self.dataset.routes.push(Route {
            id,
            start_datetime: Some(start.to_string()),
            end_datetime: Some(end.to_string()),
        });
        let segment_id = self.dataset.segments.len() as u32 + 1;
        self.dataset.segments.push(Segment {
            id: segment_id,
            route_id: id,
            seq: 1,
            start_loc_id: Some(from),
            end_loc_id: Some(to),
            start_datetime: Some(start.to_string()),
            end_datetime: Some(end.to_string()),
            distance_travelled_km: km,
            relation_id: None,
        });
        self
    }

    /// A route header with no segments at all.
    pub fn empty_route(mut self, start: &str, end: &str) -> Self {
        let id = self.next_route_id();
        self.dataset.routes.push(Route {
            id,
            start_datetime: Some(start.to_string()),
            end_datetime: Some(end.to_string()),
        });
        self
    }

    pub fn build(self) -> Dataset {
        self.dataset
    }

    fn next_route_id(&self) -> RouteId {
        self.dataset.routes.len() as RouteId + 1
    }
}
