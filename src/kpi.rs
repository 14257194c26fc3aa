//! Fleet-level summary of a finished run.

use crate::model::{Kpis, VehicleSummary};
use crate::timestamp;
use crate::vehicle_state::VehicleState;

pub fn compute_kpis(states: &[VehicleState<'_>]) -> Kpis {
    if states.is_empty() {
        return Kpis::default();
    }
    let n = states.len() as f64;

    let within_limit = states
        .iter()
        .filter(|s| s.contract_used_km <= s.vehicle.leasing_limit_km)
        .count() as f64;

    // capped at 1.0 per vehicle
    let utilization: f64 = states
        .iter()
        .map(|s| (s.contract_used_km / s.vehicle.leasing_limit_km.max(1.0)).min(1.0))
        .sum();

    let km_to_limit: f64 = states
        .iter()
        .map(|s| (s.vehicle.leasing_limit_km - s.contract_used_km).max(0.0))
        .sum();

    Kpis {
        pct_vehicles_without_overage: within_limit / n * 100.0,
        pct_contract_utilization: utilization / n * 100.0,
        estimated_km_to_contract_limit_avg: km_to_limit / n,
    }
}

pub fn summarize_vehicles(states: &[VehicleState<'_>]) -> Vec<VehicleSummary> {
    states
        .iter()
        .map(|s| VehicleSummary {
            vehicle_id: s.vehicle.id,
            registration_number: s.vehicle.registration_number.clone(),
            brand: s.vehicle.brand.clone(),
            odometer_km: s.current_odo,
            last_service_odometer_km: s.last_service_odo,
            km_until_service: s.vehicle.service_interval_km - s.km_since_service(),
            contract_used_km: s.contract_used_km,
            contract_remaining_km: s.headroom_km().max(0.0),
            swaps: s.swap_timestamps.len(),
            location_id: s.current_loc,
            available_from: timestamp::from_millis(s.available_from),
        })
        .collect()
}
