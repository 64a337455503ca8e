//! Route mode selection
//!
//! Without a preferred mode the cascade is walking, then cycling, then driving, escalating
//! on the routed (not straight-line) distance. Each mode is fetched at most once, and an
//! attempt that exceeds its timeout counts as a failed mode.

use crate::infrastructure::geo::{RouteMode, RouteProvider, RouteResult};
use log::{debug, warn};
use mapchat_core_types::LngLat;
use std::time::Duration;

/// Longest walking route, inclusive.
pub const WALKING_MAX_DISTANCE_METERS: f64 = 3000.0;
/// Longest cycling route, inclusive.
pub const CYCLING_MAX_DISTANCE_METERS: f64 = 15000.0;
/// Most provider requests a single resolution can make.
pub const MAX_ROUTE_ATTEMPTS: u32 = 3;

pub async fn resolve_route(
    provider: &dyn RouteProvider,
    start: LngLat,
    end: LngLat,
    preferred: Option<RouteMode>,
    attempt_timeout: Duration,
) -> Option<RouteResult> {
    let fetch = |mode: RouteMode| attempt(provider, start, end, mode, attempt_timeout);

    if let Some(mode) = preferred {
        debug!("Route with preferred mode: mode={}", mode);
        return fetch(mode).await;
    }

    let Some(walking) = fetch(RouteMode::Walking).await else {
        debug!("Walking route unavailable, falling back to driving");
        return fetch(RouteMode::Driving).await;
    };
    if walking.distance_meters <= WALKING_MAX_DISTANCE_METERS {
        return Some(walking);
    }

    let Some(cycling) = fetch(RouteMode::Cycling).await else {
        debug!("Cycling route unavailable, falling back to driving");
        return fetch(RouteMode::Driving).await;
    };
    if cycling.distance_meters <= CYCLING_MAX_DISTANCE_METERS {
        return Some(cycling);
    }

    match fetch(RouteMode::Driving).await {
        Some(driving) => Some(driving),
        None => {
            debug!("Driving route unavailable, keeping cycling route");
            Some(cycling)
        }
    }
}

async fn attempt(
    provider: &dyn RouteProvider,
    start: LngLat,
    end: LngLat,
    mode: RouteMode,
    timeout: Duration,
) -> Option<RouteResult> {
    match tokio::time::timeout(timeout, provider.fetch_route(start, end, mode)).await {
        Ok(route) => route,
        Err(_) => {
            warn!(
                "Route request timed out: mode={}, timeout_secs={}",
                mode,
                timeout.as_secs()
            );
            None
        }
    }
}
