//! Greedy chronological assignment engine.
//!
//! Routes are consumed day by day in start order. For each route every vehicle
//! is checked for feasibility and costed; the cheapest feasible vehicle takes
//! the route and its state advances. There is no backtracking.

use std::cmp::Ordering;
use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::haversine::HaversineEstimator;
use crate::kpi;
use crate::model::{AssignmentResult, Dataset, Location, LocationId, PlannerOutput};
use crate::params::PlannerParams;
use crate::relation::RelationIndex;
use crate::route::{self, PlannedRoute};
use crate::schedule;
use crate::timestamp;
use crate::traits::{Leg, TravelEstimator};
use crate::vehicle_state::VehicleState;

/// Upper bound on any single deadhead distance.
pub const MAX_DEADHEAD_KM: f64 = 800.0;
/// Upper bound on any single deadhead duration.
pub const MAX_DEADHEAD_HOURS: f64 = 14.0;
/// Deadheads longer than this count as a swap.
pub const SWAP_THRESHOLD_KM: f64 = 0.1;

/// A feasible, costed pairing of one vehicle with one route.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub vehicle_index: usize,
    pub deadhead_km: f64,
    pub deadhead_hours: f64,
    pub deadhead_cost: f64,
    pub overage_km: f64,
    pub overage_cost: f64,
    /// Contract km left before this route.
    pub headroom_km: f64,
}

impl Candidate {
    pub fn total_cost(&self) -> f64 {
        self.deadhead_cost + self.overage_cost
    }

    pub fn requires_swap(&self) -> bool {
        self.deadhead_km > SWAP_THRESHOLD_KM
    }
}

/// Best-first ordering: total cost, deadhead km, overage km, then more headroom.
pub fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    a.total_cost()
        .total_cmp(&b.total_cost())
        .then_with(|| a.deadhead_km.total_cmp(&b.deadhead_km))
        .then_with(|| a.overage_km.total_cmp(&b.overage_km))
        .then_with(|| b.headroom_km.total_cmp(&a.headroom_km))
}

/// The best candidate; on a full tie the earliest vehicle wins.
pub fn select_best(candidates: &[Candidate]) -> Option<&Candidate> {
    candidates.iter().min_by(|a, b| compare_candidates(a, b))
}

/// Relation and coordinate lookups for deadhead legs.
struct TravelLookup<'a, E> {
    relations: RelationIndex,
    locations: HashMap<LocationId, &'a Location>,
    fallback: &'a E,
}

impl<'a, E: TravelEstimator> TravelLookup<'a, E> {
    fn new(dataset: &'a Dataset, fallback: &'a E) -> Self {
        Self {
            relations: RelationIndex::new(&dataset.relations),
            locations: dataset.locations.iter().map(|l| (l.id, l)).collect(),
            fallback,
        }
    }

    /// Leg from the vehicle's position to `to`; `None` when it cannot be estimated.
    fn deadhead(&self, from: Option<LocationId>, to: LocationId) -> Option<Leg> {
        // unplaced vehicles are positioned for free
        let Some(from) = from else {
            return Some(Leg::ZERO);
        };
        if from == to {
            return Some(Leg::ZERO);
        }

        let leg = match self.relations.get(from, to) {
            Some(leg) => leg,
            None => {
                let a = self.locations.get(&from)?;
                let b = self.locations.get(&to)?;
                self.fallback.estimate(a, b)?
            }
        };

        Some(Leg::new(
            leg.distance_km.clamp(0.0, MAX_DEADHEAD_KM),
            leg.hours.clamp(0.0, MAX_DEADHEAD_HOURS),
        ))
    }
}

fn evaluate<E: TravelEstimator>(
    vehicle_index: usize,
    state: &VehicleState<'_>,
    route: &PlannedRoute,
    lookup: &TravelLookup<'_, E>,
    params: &PlannerParams,
) -> Option<Candidate> {
    let leg = lookup.deadhead(state.current_loc, route.start_loc)?;
    let requires_swap = leg.distance_km > SWAP_THRESHOLD_KM;

    let travel_start = route.start - timestamp::hours_to_millis_ceil(leg.hours);
    if state.available_from > travel_start {
        return None;
    }
    if requires_swap
        && !state.can_swap(route.start, &route.day, params.max_swaps_per_vehicle_per_days)
    {
        return None;
    }

    let deadhead_cost = if requires_swap {
        params.deadhead_fixed_cost
            + params.deadhead_cost_per_km * leg.distance_km
            + params.deadhead_cost_per_hour * leg.hours
    } else {
        0.0
    };

    // only the growth of the excess is charged
    let limit = state.overage_limit();
    let prior_excess = (state.contract_used_km - limit).max(0.0);
    let after_excess = (state.contract_used_km + leg.distance_km + route.km - limit).max(0.0);
    let overage_km = (after_excess - prior_excess).max(0.0);

    Some(Candidate {
        vehicle_index,
        deadhead_km: leg.distance_km,
        deadhead_hours: leg.hours,
        deadhead_cost,
        overage_km,
        overage_cost: overage_km * params.overage_cost_per_km,
        headroom_km: state.headroom_km(),
    })
}

/// Apply the chosen candidate to its vehicle. Returns whether a service was scheduled.
fn commit(
    state: &mut VehicleState<'_>,
    route: &PlannedRoute,
    candidate: &Candidate,
    params: &PlannerParams,
) -> bool {
    if candidate.requires_swap() {
        state.record_swap(route.start, &route.day);
    }
    state.drive(candidate.deadhead_km + route.km);
    state.current_loc = Some(route.end_loc);
    state.available_from = state.available_from.max(route.end);

    if !state.service_due() {
        return false;
    }
    state.mark_serviced();
    let service_end = route.end.saturating_add(timestamp::hours_to_millis(params.service_block_hours));
    state.available_from = state.available_from.max(service_end);
    true
}

/// Plan with the haversine fallback at the configured speed.
pub fn plan(dataset: &Dataset, params: &PlannerParams) -> PlannerOutput {
    let fallback = HaversineEstimator::new(params.fallback_speed_kmh);
    plan_with_estimator(dataset, params, &fallback)
}

pub fn plan_with_estimator<E: TravelEstimator>(
    dataset: &Dataset,
    params: &PlannerParams,
    fallback: &E,
) -> PlannerOutput {
    let lookup = TravelLookup::new(dataset, fallback);

    let mut routes = route::aggregate_routes(&dataset.routes, &dataset.segments, &lookup.relations);
    if let Some(days) = params.horizon_days {
        routes = schedule::apply_horizon(routes, days);
    }
    let by_day = schedule::group_by_day(routes);

    let mut states: Vec<VehicleState<'_>> = dataset.vehicles.iter().map(VehicleState::new).collect();

    info!(
        vehicles = states.len(),
        days = by_day.len(),
        routes_in = dataset.routes.len(),
        relation_legs = lookup.relations.len(),
        "planning started"
    );
    if lookup.relations.is_empty() {
        debug!("no relation records, every deadhead is estimated");
    }

    let mut output = PlannerOutput::default();
    let mut candidates: Vec<Candidate> = Vec::with_capacity(states.len());

    for route in schedule::event_sequence(&by_day) {
        candidates.clear();
        candidates.extend(
            states
                .iter()
                .enumerate()
                .filter_map(|(index, state)| evaluate(index, state, route, &lookup, params)),
        );

        let Some(best) = select_best(&candidates).cloned() else {
            warn!(route_id = route.id, day = %route.day, "no feasible vehicle");
            output.alerts.push(format!("No feasible vehicle for route {}", route.id));
            continue;
        };

        let state = &mut states[best.vehicle_index];
        let service_scheduled = commit(state, route, &best, params);
        if best.requires_swap() {
            output.num_swaps += 1;
        }

        debug!(
            route_id = route.id,
            vehicle_id = state.vehicle.id,
            deadhead_km = best.deadhead_km,
            overage_km = best.overage_km,
            service_scheduled,
            "route assigned"
        );

        output.total_deadhead_cost += best.deadhead_cost;
        output.total_overage_cost += best.overage_cost;
        output.assignments.push(AssignmentResult {
            route_id: route.id,
            vehicle_id: state.vehicle.id,
            deadhead_km: best.deadhead_km,
            deadhead_hours: best.deadhead_hours,
            deadhead_cost: best.deadhead_cost,
            overage_km: best.overage_km,
            overage_cost: best.overage_cost,
            service_scheduled,
            route_start: route.start_at,
        });
    }

    output.kpis = kpi::compute_kpis(&states);
    output.vehicles = kpi::summarize_vehicles(&states);

    info!(
        assigned = output.assignments.len(),
        unassigned = output.alerts.len(),
        swaps = output.num_swaps,
        deadhead_cost = output.total_deadhead_cost,
        overage_cost = output.total_overage_cost,
        "planning finished"
    );

    output
}

/// Independent runs over the same data, one per parameter set, in parallel.
///
/// Results are in the order of `scenarios`.
pub fn plan_scenarios(dataset: &Dataset, scenarios: &[PlannerParams]) -> Vec<PlannerOutput> {
    scenarios.par_iter().map(|params| plan(dataset, params)).collect()
}
