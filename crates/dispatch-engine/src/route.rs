//! Waypoint ordering for field routes.
//!
//! Orders a set of geographic stops into an efficient visiting sequence by
//! simulated annealing over 2-opt moves, scored with great-circle
//! (haversine) distance. The result is an approximation: road geometry and
//! true travel times come from an external directions provider *after*
//! ordering, so the optimizer only needs a metric that ranks candidate
//! orders sensibly.
//!
//! The annealing loop is bounded by fixed iteration counts, never by wall
//! clock, and tracks the best route seen regardless of acceptance, so a
//! caller imposing an external deadline still holds a usable best-known
//! order when it cuts the loop short.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::{Result, ScheduleError};
use crate::model::Waypoint;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Cooling schedule for [`optimize_waypoint_order_with`].
#[derive(Debug, Clone, Copy)]
pub struct AnnealingConfig {
    pub initial_temperature: f64,
    /// Geometric cooling factor applied per outer step.
    pub cooling_factor: f64,
    /// Outer loop stops once temperature falls to this level.
    pub minimum_temperature: f64,
    /// Neighbor evaluations per temperature level.
    pub inner_iterations: usize,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 10_000.0,
            cooling_factor: 0.995,
            minimum_temperature: 0.1,
            inner_iterations: 100,
        }
    }
}

// ── Distance primitives ─────────────────────────────────────────────────────

/// Great-circle distance between two `(lat, lng)` points in kilometers.
///
/// Identical coordinates yield exactly 0.
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Total path length of consecutive waypoint pairs in kilometers.
pub fn total_route_km(waypoints: &[Waypoint]) -> f64 {
    waypoints
        .windows(2)
        .map(|pair| haversine_km(pair[0].coords(), pair[1].coords()))
        .sum()
}

fn order_km(order: &[usize], waypoints: &[Waypoint]) -> f64 {
    order
        .windows(2)
        .map(|pair| haversine_km(waypoints[pair[0]].coords(), waypoints[pair[1]].coords()))
        .sum()
}

// ── Optimizer ───────────────────────────────────────────────────────────────

/// Order waypoints into an efficient visiting sequence.
///
/// `fixed_start` pins a waypoint to the first position (defaults to index
/// 0); `fixed_end` optionally pins one to the last. Seeds its generator
/// from the OS; use [`optimize_waypoint_order_with`] for a deterministic
/// run.
///
/// # Errors
///
/// [`ScheduleError::RouteInputInvalid`] for fewer than two waypoints,
/// non-finite coordinates, or out-of-range/colliding fixed indices.
pub fn optimize_waypoint_order(
    waypoints: &[Waypoint],
    fixed_start: Option<usize>,
    fixed_end: Option<usize>,
) -> Result<Vec<Waypoint>> {
    let mut rng = StdRng::from_os_rng();
    optimize_waypoint_order_with(
        waypoints,
        fixed_start,
        fixed_end,
        &AnnealingConfig::default(),
        &mut rng,
    )
}

/// [`optimize_waypoint_order`] with an explicit cooling schedule and random
/// source, so property tests can run against fixed seeds.
pub fn optimize_waypoint_order_with<R: Rng>(
    waypoints: &[Waypoint],
    fixed_start: Option<usize>,
    fixed_end: Option<usize>,
    config: &AnnealingConfig,
    rng: &mut R,
) -> Result<Vec<Waypoint>> {
    let start = validate(waypoints, fixed_start, fixed_end)?;

    // With fewer than 3 waypoints there is nothing to reorder.
    if waypoints.len() < 3 {
        return Ok(materialize(
            &pinned_order(waypoints.len(), start, fixed_end),
            waypoints,
        ));
    }

    // Initial candidate: fixed endpoints pinned, everything between them
    // randomly shuffled.
    let mut route = pinned_order(waypoints.len(), start, fixed_end);
    let movable_end = if fixed_end.is_some() {
        route.len() - 1
    } else {
        route.len()
    };
    if movable_end - 1 < 2 {
        // A single movable stop admits no 2-opt move.
        return Ok(materialize(&route, waypoints));
    }
    route[1..movable_end].shuffle(rng);

    let mut current_km = order_km(&route, waypoints);
    let mut current = route;
    let mut best = current.clone();
    let mut best_km = current_km;

    let mut temperature = config.initial_temperature;
    while temperature > config.minimum_temperature {
        for _ in 0..config.inner_iterations {
            // Classic 2-opt: reverse a random contiguous span strictly
            // between the fixed endpoints.
            let i = rng.random_range(1..movable_end - 1);
            let j = rng.random_range(i + 1..movable_end);

            let mut candidate = current.clone();
            candidate[i..=j].reverse();
            let candidate_km = order_km(&candidate, waypoints);

            let delta = candidate_km - current_km;
            let accept = delta < 0.0 || rng.random::<f64>() < (-delta / temperature).exp();
            if accept {
                current = candidate;
                current_km = candidate_km;
                if current_km < best_km {
                    best = current.clone();
                    best_km = current_km;
                }
            }
        }
        temperature *= config.cooling_factor;
    }

    Ok(materialize(&best, waypoints))
}

/// Index order with the fixed start first, the fixed end (if any) last, and
/// the remaining waypoints between them in input order.
fn pinned_order(len: usize, start: usize, fixed_end: Option<usize>) -> Vec<usize> {
    let mut order = Vec::with_capacity(len);
    order.push(start);
    order.extend((0..len).filter(|&i| i != start && Some(i) != fixed_end));
    if let Some(end) = fixed_end {
        order.push(end);
    }
    order
}

fn materialize(order: &[usize], waypoints: &[Waypoint]) -> Vec<Waypoint> {
    order.iter().map(|&i| waypoints[i].clone()).collect()
}

/// Validate the request and return the effective start index.
fn validate(
    waypoints: &[Waypoint],
    fixed_start: Option<usize>,
    fixed_end: Option<usize>,
) -> Result<usize> {
    if waypoints.len() < 2 {
        return Err(ScheduleError::RouteInputInvalid(format!(
            "at least two waypoints required, got {}",
            waypoints.len()
        )));
    }
    for waypoint in waypoints {
        if !waypoint.latitude.is_finite() || !waypoint.longitude.is_finite() {
            return Err(ScheduleError::RouteInputInvalid(format!(
                "waypoint '{}' has non-finite coordinates",
                waypoint.id
            )));
        }
    }

    let start = fixed_start.unwrap_or(0);
    if start >= waypoints.len() {
        return Err(ScheduleError::RouteInputInvalid(format!(
            "fixed start index {start} out of range for {} waypoints",
            waypoints.len()
        )));
    }
    if let Some(end) = fixed_end {
        if end >= waypoints.len() {
            return Err(ScheduleError::RouteInputInvalid(format!(
                "fixed end index {end} out of range for {} waypoints",
                waypoints.len()
            )));
        }
        if end == start {
            return Err(ScheduleError::RouteInputInvalid(
                "fixed start and fixed end name the same waypoint".to_string(),
            ));
        }
    }
    Ok(start)
}
