use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::AppState;
use crate::error::{bad_request, not_found};
use crate::models::NewUser;
use shared::{ApiError, Coordinate, ParkingSpotClient};

const DEFAULT_SEARCH_RADIUS_KM: f64 = 5.0;

/// GET /api/users/uid/:uid - Look up the backend user for an external identity
pub async fn get_user_by_uid(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<shared::User>, (StatusCode, Json<ApiError>)> {
    if uid.trim().is_empty() {
        return Err(bad_request("Missing identity uid"));
    }

    state
        .store
        .get_user_by_uid(&uid)
        .map(|user| Json(user.to_client()))
        .ok_or_else(|| not_found("User not found"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest {
    uid: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// POST /api/users - Create the backend user after external sign-in
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<shared::User>), (StatusCode, Json<ApiError>)> {
    let Ok(req) = serde_json::from_value::<CreateUserRequest>(body) else {
        return Err(bad_request("Invalid user data"));
    };
    if req.uid.trim().is_empty() || !req.email.contains('@') {
        return Err(bad_request("Invalid user data"));
    }

    let user = state.store.create_user(NewUser {
        uid: Some(req.uid),
        email: req.email,
        display_name: req.display_name,
        photo_url: None,
        provider: None,
    });
    tracing::debug!("user {} registered (id {})", user.email, user.id);

    Ok((StatusCode::CREATED, Json(user.to_client())))
}

/// GET /api/parking-spots - List every spot in the client shape
pub async fn list_spots(State(state): State<AppState>) -> Json<Vec<ParkingSpotClient>> {
    let spots = state
        .store
        .all_spots()
        .iter()
        .map(|spot| spot.to_client())
        .collect();
    Json(spots)
}

/// GET /api/parking-spots/:id - Fetch a single spot
pub async fn get_spot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ParkingSpotClient>, (StatusCode, Json<ApiError>)> {
    let Ok(id) = id.parse::<i32>() else {
        return Err(bad_request("Invalid parking spot ID"));
    };

    state
        .store
        .get_spot(id)
        .map(|spot| Json(spot.to_client()))
        .ok_or_else(|| not_found("Parking spot not found"))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    lat: Option<String>,
    lng: Option<String>,
    radius: Option<String>,
}

/// GET /api/parking-spots/search?lat=..&lng=..&radius=.. - Radius query
///
/// Parameters are parsed and checked for finite values before the store is
/// consulted; the radius defaults to 5 km.
pub async fn search_spots(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<ParkingSpotClient>>, (StatusCode, Json<ApiError>)> {
    let origin = Coordinate {
        lat: parse_finite(params.lat.as_deref()).ok_or_else(invalid_search)?,
        lng: parse_finite(params.lng.as_deref()).ok_or_else(invalid_search)?,
    };
    let radius_km = match params.radius.as_deref() {
        None => DEFAULT_SEARCH_RADIUS_KM,
        Some(raw) => parse_finite(Some(raw)).ok_or_else(invalid_search)?,
    };

    let spots = state
        .store
        .spots_within_radius(origin, radius_km)
        .iter()
        .map(|spot| spot.to_client())
        .collect();
    Ok(Json(spots))
}

fn parse_finite(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

fn invalid_search() -> (StatusCode, Json<ApiError>) {
    bad_request("Invalid search parameters")
}

/// GET /api/favorites/:userId - Spots the user has bookmarked
pub async fn list_favorites(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ParkingSpotClient>>, (StatusCode, Json<ApiError>)> {
    let Ok(user_id) = user_id.parse::<i32>() else {
        return Err(bad_request("Invalid user ID"));
    };

    let favorites = state
        .store
        .user_favorites(user_id)
        .iter()
        .map(|spot| spot.to_client())
        .collect();
    Ok(Json(favorites))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddFavoriteRequest {
    user_id: i32,
    parking_spot_id: i32,
}

/// POST /api/favorites - Bookmark a spot (idempotent per user/spot pair)
pub async fn add_favorite(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<shared::Favorite>), (StatusCode, Json<ApiError>)> {
    let Ok(req) = serde_json::from_value::<AddFavoriteRequest>(body) else {
        return Err(bad_request("Invalid favorite data"));
    };

    let favorite = state.store.add_favorite(req.user_id, req.parking_spot_id);
    Ok((StatusCode::CREATED, Json(favorite.to_client())))
}

/// DELETE /api/favorites/:id - Remove a bookmark (no-op for unknown ids)
pub async fn remove_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    let Ok(id) = id.parse::<i32>() else {
        return Err(bad_request("Invalid favorite ID"));
    };

    state.store.remove_favorite(id);
    Ok(StatusCode::NO_CONTENT)
}
