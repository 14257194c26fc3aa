//! Typed planning records.
//!
//! These are the already-normalized inputs and outputs of the engine. Field
//! names on the input side follow the CSV/JSON column names; the output side
//! uses camelCase keys.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::params::PlannerParams;

pub type VehicleId = u32;
pub type LocationId = u32;
pub type RouteId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    #[serde(default)]
    pub registration_number: String,
    #[serde(default)]
    pub brand: String,
    pub service_interval_km: f64,
    #[serde(default)]
    pub leasing_start_km: f64,
    pub leasing_limit_km: f64,
    #[serde(default)]
    pub leasing_start_date: String,
    #[serde(default)]
    pub leasing_end_date: String,
    pub current_odometer_km: f64,
    #[serde(default)]
    pub current_location_id: Option<LocationId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default, rename = "long", alias = "lng")]
    pub lng: Option<f64>,
    #[serde(default)]
    pub is_hub: bool,
}

impl Location {
    /// Coordinates as (lat, lng), only when both are present and finite.
    pub fn coords(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some((lat, lng)),
            _ => None,
        }
    }
}

/// Undirected distance/time record between two locations, as delivered.
///
/// `dist` and `time` may carry garbage (negative, NaN, minutes instead of
/// hours); see [`crate::relation::normalize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRelation {
    #[serde(default)]
    pub id: u32,
    pub id_loc_1: LocationId,
    pub id_loc_2: LocationId,
    pub dist: f64,
    pub time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    #[serde(default)]
    pub start_datetime: Option<String>,
    #[serde(default)]
    pub end_datetime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub id: u32,
    pub route_id: RouteId,
    pub seq: i64,
    #[serde(default)]
    pub start_loc_id: Option<LocationId>,
    #[serde(default)]
    pub end_loc_id: Option<LocationId>,
    #[serde(default)]
    pub start_datetime: Option<String>,
    #[serde(default)]
    pub end_datetime: Option<String>,
    #[serde(default)]
    pub distance_travelled_km: f64,
    #[serde(default)]
    pub relation_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResult {
    pub route_id: RouteId,
    pub vehicle_id: VehicleId,
    pub deadhead_km: f64,
    pub deadhead_hours: f64,
    pub deadhead_cost: f64,
    pub overage_km: f64,
    pub overage_cost: f64,
    pub service_scheduled: bool,
    pub route_start: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub pct_vehicles_without_overage: f64,
    pub pct_contract_utilization: f64,
    pub estimated_km_to_contract_limit_avg: f64,
}

/// Final service and contract position of one vehicle after a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSummary {
    pub vehicle_id: VehicleId,
    pub registration_number: String,
    pub brand: String,
    pub odometer_km: f64,
    pub last_service_odometer_km: f64,
    /// Negative when the vehicle is overdue.
    pub km_until_service: f64,
    pub contract_used_km: f64,
    pub contract_remaining_km: f64,
    pub swaps: usize,
    pub location_id: Option<LocationId>,
    pub available_from: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerOutput {
    pub assignments: Vec<AssignmentResult>,
    pub total_deadhead_cost: f64,
    pub total_overage_cost: f64,
    pub num_swaps: usize,
    pub kpis: Kpis,
    pub vehicles: Vec<VehicleSummary>,
    pub alerts: Vec<String>,
}

/// All records of one planning run, loaded fully before planning starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub vehicles: Vec<Vehicle>,
    pub locations: Vec<Location>,
    pub relations: Vec<LocationRelation>,
    pub routes: Vec<Route>,
    pub segments: Vec<Segment>,
}

/// JSON request body: the dataset plus an optional parameter block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    #[serde(flatten)]
    pub dataset: Dataset,
    #[serde(default)]
    pub params: PlannerParams,
}
