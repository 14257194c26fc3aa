//! Planner parameter block.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ParamsError;

/// Longest accepted service block: one year.
pub const MAX_SERVICE_BLOCK_HOURS: f64 = 24.0 * 366.0;
/// Longest accepted planning horizon: ten years.
pub const MAX_HORIZON_DAYS: u32 = 3_660;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlannerParams {
    /// Rolling window length (days) inside which a vehicle may swap once.
    pub max_swaps_per_vehicle_per_days: u32,
    pub deadhead_fixed_cost: f64,
    pub deadhead_cost_per_km: f64,
    pub deadhead_cost_per_hour: f64,
    pub overage_cost_per_km: f64,
    pub service_block_hours: f64,
    /// Assumed average speed for haversine-estimated deadheads.
    pub fallback_speed_kmh: f64,
    /// Only plan routes starting within this many days of the earliest route.
    pub horizon_days: Option<u32>,
}

impl Default for PlannerParams {
    fn default() -> Self {
        Self {
            max_swaps_per_vehicle_per_days: 90,
            deadhead_fixed_cost: 1000.0,
            deadhead_cost_per_km: 1.0,
            deadhead_cost_per_hour: 150.0,
            overage_cost_per_km: 0.92,
            service_block_hours: 48.0,
            fallback_speed_kmh: 60.0,
            horizon_days: None,
        }
    }
}

impl PlannerParams {
    /// Read a (possibly partial) JSON parameter object; missing keys take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let text = fs::read_to_string(path)?;
        let params = serde_json::from_str(&text)?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        let non_negative = [
            ("deadheadFixedCost", self.deadhead_fixed_cost),
            ("deadheadCostPerKm", self.deadhead_cost_per_km),
            ("deadheadCostPerHour", self.deadhead_cost_per_hour),
            ("overageCostPerKm", self.overage_cost_per_km),
            ("serviceBlockHours", self.service_block_hours),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ParamsError::OutOfRange { name, value });
            }
        }
        if !self.fallback_speed_kmh.is_finite() || self.fallback_speed_kmh <= 0.0 {
            return Err(ParamsError::OutOfRange {
                name: "fallbackSpeedKmh",
                value: self.fallback_speed_kmh,
            });
        }
        if self.service_block_hours > MAX_SERVICE_BLOCK_HOURS {
            return Err(ParamsError::OutOfRange {
                name: "serviceBlockHours",
                value: self.service_block_hours,
            });
        }
        if let Some(days) = self.horizon_days.filter(|&days| days > MAX_HORIZON_DAYS) {
            return Err(ParamsError::OutOfRange {
                name: "horizonDays",
                value: f64::from(days),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_is_completed_with_defaults() {
        let params: PlannerParams =
            serde_json::from_str(r#"{"maxSwapsPerVehiclePerDays": 30, "overageCostPerKm": 1.5}"#)
                .unwrap();
        assert_eq!(params.max_swaps_per_vehicle_per_days, 30);
        assert_eq!(params.overage_cost_per_km, 1.5);
        assert_eq!(params.deadhead_fixed_cost, 1000.0);
        assert_eq!(params.service_block_hours, 48.0);
        assert_eq!(params.horizon_days, None);
    }

    #[test]
    fn rejects_negative_cost_and_zero_speed() {
        let params = PlannerParams {
            deadhead_cost_per_km: -1.0,
            ..PlannerParams::default()
        };
        assert!(params.validate().is_err());

        let params = PlannerParams {
            fallback_speed_kmh: 0.0,
            ..PlannerParams::default()
        };
        assert!(params.validate().is_err());

        assert!(PlannerParams::default().validate().is_ok());
    }

    #[test]
    fn rejects_unbounded_service_block_and_horizon() {
        let params: PlannerParams = serde_json::from_str(r#"{"serviceBlockHours": 1e300}"#).unwrap();
        assert!(matches!(
            params.validate(),
            Err(ParamsError::OutOfRange { name: "serviceBlockHours", .. })
        ));

        let params = PlannerParams {
            horizon_days: Some(u32::MAX),
            ..PlannerParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ParamsError::OutOfRange { name: "horizonDays", .. })
        ));

        let params = PlannerParams {
            service_block_hours: MAX_SERVICE_BLOCK_HOURS,
            horizon_days: Some(MAX_HORIZON_DAYS),
            ..PlannerParams::default()
        };
        assert!(params.validate().is_ok());
    }
}
