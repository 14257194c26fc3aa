//! fleet-planner core
//!
//! Greedy, chronological assignment of leased vehicles to transport routes,
//! minimizing deadhead and contract overage costs.

pub mod error;
pub mod external;
pub mod haversine;
pub mod ingest;
pub mod kpi;
pub mod model;
pub mod params;
pub mod relation;
pub mod remote;
pub mod route;
pub mod schedule;
pub mod solver;
pub mod subprocess;
pub mod timestamp;
pub mod traits;
pub mod vehicle_state;
