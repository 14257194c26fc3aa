//! Day grouping: the order in which the engine consumes routes.

use std::collections::BTreeMap;

use crate::route::PlannedRoute;
use crate::timestamp::{EpochMillis, MILLIS_PER_DAY};

/// Routes bucketed by calendar day, days ascending, each day ordered by start.
///
/// Ties on start time keep input order.
pub fn group_by_day(routes: Vec<PlannedRoute>) -> BTreeMap<String, Vec<PlannedRoute>> {
    let mut by_day: BTreeMap<String, Vec<PlannedRoute>> = BTreeMap::new();
    for route in routes {
        by_day.entry(route.day.clone()).or_default().push(route);
    }
    for list in by_day.values_mut() {
        list.sort_by_key(|route| route.start);
    }
    by_day
}

/// Drop routes starting more than `days` days after the earliest route.
pub fn apply_horizon(routes: Vec<PlannedRoute>, days: u32) -> Vec<PlannedRoute> {
    let Some(first) = routes.iter().map(|route| route.start).min() else {
        return routes;
    };
    let cutoff: EpochMillis = first + i64::from(days) * MILLIS_PER_DAY;
    routes.into_iter().filter(|route| route.start <= cutoff).collect()
}

/// Flatten the day buckets into the global processing sequence.
pub fn event_sequence(by_day: &BTreeMap<String, Vec<PlannedRoute>>) -> impl Iterator<Item = &PlannedRoute> {
    by_day.values().flatten()
}
