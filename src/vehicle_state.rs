//! Mutable per-vehicle planning state.

use crate::model::{LocationId, Vehicle};
use crate::timestamp::{EpochMillis, MILLIS_PER_DAY};

/// Running state of one vehicle during a single planning run.
///
/// `current_loc == None` means the vehicle has not been placed yet; its first
/// assignment is free of deadhead.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleState<'a> {
    pub vehicle: &'a Vehicle,
    pub available_from: EpochMillis,
    pub current_loc: Option<LocationId>,
    pub current_odo: f64,
    pub last_service_odo: f64,
    pub contract_used_km: f64,
    pub swap_timestamps: Vec<EpochMillis>,
    pub last_swap_day: Option<String>,
}

impl<'a> VehicleState<'a> {
    pub fn new(vehicle: &'a Vehicle) -> Self {
        Self {
            vehicle,
            available_from: 0,
            current_loc: vehicle.current_location_id,
            current_odo: vehicle.current_odometer_km,
            last_service_odo: vehicle.current_odometer_km,
            contract_used_km: (vehicle.current_odometer_km - vehicle.leasing_start_km).max(0.0),
            swap_timestamps: Vec::new(),
            last_swap_day: None,
        }
    }

    /// Contract cap used for overage; a non-positive limit means uncapped.
    pub fn overage_limit(&self) -> f64 {
        let limit = self.vehicle.leasing_limit_km;
        if limit.is_finite() && limit > 0.0 { limit } else { f64::INFINITY }
    }

    /// Remaining km to the declared contract limit (may be negative).
    pub fn headroom_km(&self) -> f64 {
        self.vehicle.leasing_limit_km - self.contract_used_km
    }

    /// Whether a swap at `at` is allowed by the rolling window and the one-per-day rule.
    pub fn can_swap(&self, at: EpochMillis, day: &str, window_days: u32) -> bool {
        if self.last_swap_day.as_deref() == Some(day) {
            return false;
        }
        let window_start = at - i64::from(window_days) * MILLIS_PER_DAY;
        !self
            .swap_timestamps
            .iter()
            .any(|&t| t >= window_start && t <= at)
    }

    pub fn record_swap(&mut self, at: EpochMillis, day: &str) {
        self.swap_timestamps.push(at);
        self.last_swap_day = Some(day.to_string());
    }

    /// Add driven km to both the odometer and the contract counter.
    pub fn drive(&mut self, km: f64) {
        self.current_odo += km;
        self.contract_used_km += km;
    }

    pub fn km_since_service(&self) -> f64 {
        self.current_odo - self.last_service_odo
    }

    pub fn service_due(&self) -> bool {
        self.km_since_service() >= self.vehicle.service_interval_km
    }

    pub fn mark_serviced(&mut self) {
        self.last_service_odo = self.current_odo;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle() -> Vehicle {
        Vehicle {
            id: 1,
            registration_number: "WX 12345".to_string(),
            brand: "DAF".to_string(),
            service_interval_km: 1000.0,
            leasing_start_km: 200.0,
            leasing_limit_km: 5000.0,
            leasing_start_date: String::new(),
            leasing_end_date: String::new(),
            current_odometer_km: 1200.0,
            current_location_id: None,
        }
    }

    #[test]
    fn initial_state_counts_contract_from_leasing_start() {
        let v = vehicle();
        let state = VehicleState::new(&v);
        assert_eq!(state.contract_used_km, 1000.0);
        assert_eq!(state.last_service_odo, 1200.0);
        assert_eq!(state.current_loc, None);
        assert_eq!(state.headroom_km(), 4000.0);
    }

    #[test]
    fn swap_window_and_same_day() {
        let v = vehicle();
        let mut state = VehicleState::new(&v);
        let day0 = 10 * MILLIS_PER_DAY;
        state.record_swap(day0, "1970-01-11");

        assert!(!state.can_swap(day0 + 1000, "1970-01-11", 0), "same day");
        assert!(!state.can_swap(day0 + 2 * MILLIS_PER_DAY, "1970-01-13", 3), "inside window");
        assert!(state.can_swap(day0 + 4 * MILLIS_PER_DAY, "1970-01-15", 3), "after window");
    }

    #[test]
    fn uncapped_when_limit_missing() {
        let mut v = vehicle();
        v.leasing_limit_km = 0.0;
        assert_eq!(VehicleState::new(&v).overage_limit(), f64::INFINITY);
    }
}
