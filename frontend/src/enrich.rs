//! Distance/duration enrichment for spot lists.
//!
//! Every spot gets an independent routing-matrix lookup; a failed lookup
//! degrades that one spot to "distance unknown" instead of failing the
//! batch. The sorted result is the only ordering callers may rely on.

use std::cmp::Ordering;
use std::future::Future;

use futures::future::join_all;
use seed::browser::fetch::{Method, Request};
use serde::{Deserialize, Serialize};
use shared::{Coordinate, ParkingSpotClient};

/// Sorting sentinel for spots whose lookup failed: they keep their relative
/// order after every spot with a known distance.
pub const UNKNOWN_DISTANCE_KM: f64 = 999.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteMetrics {
    pub distance_km: f64,
    pub duration_sec: f64,
}

/// Attach road distance and travel time to every spot, then sort ascending
/// by distance.
///
/// The lookup runs concurrently for all spots. A non-finite origin returns
/// the input unchanged, and the output always has the same cardinality as
/// the input.
pub async fn enrich_spots<F, Fut>(
    spots: Vec<ParkingSpotClient>,
    origin: Coordinate,
    lookup: F,
) -> Vec<ParkingSpotClient>
where
    F: Fn(Coordinate, Coordinate) -> Fut,
    Fut: Future<Output = Result<RouteMetrics, String>>,
{
    if spots.is_empty() || !origin.is_finite() {
        return spots;
    }

    let lookups = spots.into_iter().map(|mut spot| {
        let pending = lookup(origin, spot.location());
        async move {
            if let Ok(metrics) = pending.await {
                spot.distance_km = Some(metrics.distance_km);
                spot.duration_sec = Some(metrics.duration_sec);
            }
            spot
        }
    });

    let mut enriched = join_all(lookups).await;
    enriched.sort_by(|a, b| {
        sort_distance(a)
            .partial_cmp(&sort_distance(b))
            .unwrap_or(Ordering::Equal)
    });
    enriched
}

fn sort_distance(spot: &ParkingSpotClient) -> f64 {
    spot.distance_km.unwrap_or(UNKNOWN_DISTANCE_KM)
}

fn matrix_endpoint() -> String {
    let key = option_env!("ROUTE_MATRIX_KEY").unwrap_or("demo");
    format!("https://www.mapquestapi.com/directions/v2/routematrix?key={key}")
}

#[derive(Serialize)]
struct MatrixRequest {
    locations: [String; 2],
    options: MatrixOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MatrixOptions {
    all_to_all: bool,
    unit: String,
}

#[derive(Deserialize)]
struct MatrixResponse {
    distance: Vec<f64>,
    time: Vec<f64>,
}

/// Road distance and travel time between two coordinates, from the external
/// routing-matrix service. No retry; the enrichment loop absorbs failures.
pub async fn route_matrix(
    origin: Coordinate,
    destination: Coordinate,
) -> Result<RouteMetrics, String> {
    let payload = MatrixRequest {
        locations: [
            format!("{},{}", origin.lat, origin.lng),
            format!("{},{}", destination.lat, destination.lng),
        ],
        options: MatrixOptions {
            all_to_all: false,
            unit: "k".to_string(),
        },
    };

    let request = Request::new(matrix_endpoint())
        .method(Method::Post)
        .json(&payload)
        .map_err(|err| format!("{err:?}"))?;
    let response = request
        .fetch()
        .await
        .map_err(|err| format!("{err:?}"))?
        .check_status()
        .map_err(|err| format!("{err:?}"))?;
    let matrix: MatrixResponse = response.json().await.map_err(|err| format!("{err:?}"))?;

    // index 0 is origin-to-origin; index 1 carries the requested pair
    match (matrix.distance.get(1), matrix.time.get(1)) {
        (Some(&distance_km), Some(&duration_sec)) => Ok(RouteMetrics {
            distance_km,
            duration_sec,
        }),
        _ => Err("route matrix payload missing pair entry".to_string()),
    }
}
