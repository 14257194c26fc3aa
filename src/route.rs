//! Route aggregation: endpoints, distance and time span from ordered segments.

use std::collections::HashMap;

use jiff::Timestamp;
use tracing::debug;

use crate::model::{LocationId, Route, RouteId, Segment};
use crate::relation::RelationIndex;
use crate::timestamp::{self, EpochMillis};

/// A route with everything the engine needs resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRoute {
    pub id: RouteId,
    pub start_loc: LocationId,
    pub end_loc: LocationId,
    pub start_at: Timestamp,
    pub start: EpochMillis,
    pub end: EpochMillis,
    pub km: f64,
    /// Calendar day (`YYYY-MM-DD`) the route belongs to.
    pub day: String,
}

/// Segments per route, ordered by sequence index.
pub fn segments_by_route(segments: &[Segment]) -> HashMap<RouteId, Vec<&Segment>> {
    let mut grouped: HashMap<RouteId, Vec<&Segment>> = HashMap::new();
    for segment in segments {
        grouped.entry(segment.route_id).or_default().push(segment);
    }
    for list in grouped.values_mut() {
        list.sort_by_key(|segment| segment.seq);
    }
    grouped
}

/// Resolve every route; routes missing an endpoint or a time are left out.
pub fn aggregate_routes(
    routes: &[Route],
    segments: &[Segment],
    relations: &RelationIndex,
) -> Vec<PlannedRoute> {
    let grouped = segments_by_route(segments);
    let empty = Vec::new();

    routes
        .iter()
        .filter_map(|route| {
            let segs = grouped.get(&route.id).unwrap_or(&empty);
            let planned = aggregate_route(route, segs, relations);
            if planned.is_none() {
                debug!(route_id = route.id, "route excluded: unresolved endpoints or times");
            }
            planned
        })
        .collect()
}

pub fn aggregate_route(
    route: &Route,
    segs: &[&Segment],
    relations: &RelationIndex,
) -> Option<PlannedRoute> {
    let first = segs.first();
    let last = segs.last();

    let start_loc = first.and_then(|s| s.start_loc_id)?;
    let end_loc = last.and_then(|s| s.end_loc_id)?;

    let (start_raw, start_at) = resolve_time(
        route.start_datetime.as_deref(),
        first.and_then(|s| s.start_datetime.as_deref()),
    )?;
    let (_, end_at) = resolve_time(
        route.end_datetime.as_deref(),
        last.and_then(|s| s.end_datetime.as_deref()),
    )?;

    Some(PlannedRoute {
        id: route.id,
        start_loc,
        end_loc,
        start_at,
        start: timestamp::to_millis(start_at),
        end: timestamp::to_millis(end_at),
        km: route_km(segs, relations),
        day: timestamp::day_key(start_raw, start_at),
    })
}

/// The route's own time when it parses, otherwise the segment's.
fn resolve_time<'a>(own: Option<&'a str>, fallback: Option<&'a str>) -> Option<(&'a str, Timestamp)> {
    own.into_iter()
        .chain(fallback)
        .find_map(|raw| timestamp::parse_timestamp(raw).map(|ts| (raw, ts)))
}

fn route_km(segs: &[&Segment], relations: &RelationIndex) -> f64 {
    let declared: f64 = segs
        .iter()
        .map(|s| s.distance_travelled_km)
        .filter(|km| km.is_finite() && *km > 0.0)
        .sum();
    if declared > 0.0 || segs.is_empty() {
        return declared;
    }

    segs.iter()
        .filter_map(|s| relations.get(s.start_loc_id?, s.end_loc_id?))
        .map(|leg| leg.distance_km)
        .sum()
}
