pub mod enrich;
pub mod location;
pub mod recent;

use std::collections::HashMap;
use std::rc::Rc;

use seed::browser::web_storage::{LocalStorage, WebStorage};
use seed::{prelude::*, virtual_dom::AtValue, *};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen::to_value;
use shared::{Coordinate, Favorite, ParkingSpotClient, User};
use wasm_bindgen::{
    JsCast,
    prelude::{JsValue, wasm_bindgen},
};

use crate::enrich::{enrich_spots, route_matrix};
use crate::location::{GeoLocator, LocatedCoordinate, LocationError};
use crate::recent::{HISTORY_CAPACITY, RecentList};

#[wasm_bindgen(module = "/map_interop.js")]
extern "C" {
    #[wasm_bindgen(js_name = initMap)]
    fn init_map();
    #[wasm_bindgen(js_name = updateSpotMarkers)]
    fn update_spot_markers(spots: JsValue);
    #[wasm_bindgen(js_name = updateUserMarker)]
    fn update_user_marker(coord: JsValue, accuracy: f64);
    #[wasm_bindgen(js_name = centerMap)]
    fn center_map(coord: JsValue, zoom: f64);
    #[wasm_bindgen(js_name = showDirections)]
    fn show_directions(origin: JsValue, destination: JsValue);
}

#[wasm_bindgen(module = "/auth_provider.js")]
extern "C" {
    #[wasm_bindgen(js_name = requestIdentity)]
    fn request_identity(email: &str, display_name: &str) -> JsValue;
}

fn api_root() -> String {
    if let Some(url) = option_env!("FRONTEND_API_ROOT") {
        return url.trim_end_matches('/').to_string();
    }
    "http://localhost:8080".to_string()
}

/// Metro Manila, shown before any fix is acquired.
const DEFAULT_CENTER: Coordinate = Coordinate {
    lat: 14.5995,
    lng: 120.9842,
};
const DEFAULT_ZOOM: f64 = 12.0;
const LOCATED_ZOOM: f64 = 14.0;
const FOCUS_ZOOM: f64 = 15.0;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Page {
    Login,
    Map,
    Favorites,
    History,
}

#[derive(Default, Clone)]
struct LoginForm {
    email: String,
    display_name: String,
}

impl LoginForm {
    fn validate(&self) -> Result<(String, String), String> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err("Enter a valid email address".to_string());
        }
        Ok((email.to_string(), self.display_name.trim().to_string()))
    }
}

/// Identity issued by the external provider on sign-in.
#[derive(Debug, Clone, Deserialize)]
struct Identity {
    uid: String,
    email: String,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

struct Session {
    user: User,
    /// Key suffix for client-local storage; falls back to the backend id
    /// when the identity carries no uid.
    storage_uid: String,
}

pub struct Model {
    page: Page,
    login_form: LoginForm,
    login_error: Option<String>,
    session: Option<Session>,
    locator: Rc<GeoLocator>,
    locating: bool,
    location_error: Option<LocationError>,
    user_location: Option<LocatedCoordinate>,
    spots: Vec<ParkingSpotClient>,
    spots_pending: bool,
    spots_error: Option<String>,
    selected_spot: Option<ParkingSpotClient>,
    favorites: Vec<ParkingSpotClient>,
    favorites_error: Option<String>,
    /// Favorite row ids learned from POST responses this session, keyed by
    /// spot id; removal is only offered for these.
    favorite_ids: HashMap<i32, i32>,
    history: Vec<ParkingSpotClient>,
}

pub enum Msg {
    EmailChanged(String),
    DisplayNameChanged(String),
    SubmitLogin,
    SignedIn(Result<User, String>),
    SignOut,
    ShowPage(Page),
    LocateRequested,
    Located(Result<LocatedCoordinate, LocationError>),
    SpotsFetched(Result<Vec<ParkingSpotClient>, String>),
    RetrySpots,
    SpotsEnriched(Vec<ParkingSpotClient>),
    SpotSelected(i32),
    CloseSpotDetail,
    DirectionsRequested(i32),
    ToggleFavorite(i32),
    FavoriteAdded(Result<Favorite, String>),
    FavoriteRemoved(Result<i32, String>),
    FavoritesFetched(Result<Vec<ParkingSpotClient>, String>),
}

#[derive(Deserialize)]
struct SpotClickPayload {
    id: i32,
}

pub fn init(_: Url, orders: &mut impl Orders<Msg>) -> Model {
    orders.stream(streams::window_event(Ev::from("spot-click"), |event| {
        let event = event
            .dyn_into::<web_sys::CustomEvent>()
            .expect("spot-click event must be CustomEvent");
        let payload: SpotClickPayload =
            serde_wasm_bindgen::from_value(event.detail()).unwrap_or(SpotClickPayload { id: 0 });
        Msg::SpotSelected(payload.id)
    }));

    Model {
        page: Page::Login,
        login_form: LoginForm::default(),
        login_error: None,
        session: None,
        locator: GeoLocator::new(),
        locating: false,
        location_error: None,
        user_location: None,
        spots: Vec::new(),
        spots_pending: false,
        spots_error: None,
        selected_spot: None,
        favorites: Vec::new(),
        favorites_error: None,
        favorite_ids: HashMap::new(),
        history: Vec::new(),
    }
}

pub fn update(msg: Msg, model: &mut Model, orders: &mut impl Orders<Msg>) {
    match msg {
        Msg::EmailChanged(value) => model.login_form.email = value,
        Msg::DisplayNameChanged(value) => model.login_form.display_name = value,
        Msg::SubmitLogin => match model.login_form.validate() {
            Ok((email, display_name)) => {
                model.login_error = None;
                let raw = request_identity(&email, &display_name);
                match serde_wasm_bindgen::from_value::<Identity>(raw) {
                    Ok(identity) => {
                        orders.perform_cmd(resolve_backend_user(identity));
                    }
                    Err(err) => model.login_error = Some(format!("Sign-in failed: {err}")),
                }
            }
            Err(err) => model.login_error = Some(err),
        },
        Msg::SignedIn(Ok(user)) => {
            let storage_uid = user
                .uid
                .clone()
                .unwrap_or_else(|| user.id.to_string());
            model.history = load_history(&storage_uid);
            model.session = Some(Session { user, storage_uid });
            model.login_error = None;
            model.page = Page::Map;
            model.spots_pending = true;
            if let Ok(center) = to_value(&DEFAULT_CENTER) {
                center_map(center, DEFAULT_ZOOM);
            }
            orders.perform_cmd(fetch_spots());
        }
        Msg::SignedIn(Err(err)) => model.login_error = Some(err),
        Msg::SignOut => {
            model.session = None;
            model.page = Page::Login;
            model.favorites.clear();
            model.favorite_ids.clear();
            model.history.clear();
            model.selected_spot = None;
            model.user_location = None;
        }
        Msg::ShowPage(page) => {
            model.page = page;
            model.selected_spot = None;
            match page {
                Page::Favorites => {
                    if let Some(session) = &model.session {
                        orders.perform_cmd(fetch_favorites(session.user.id));
                    }
                }
                Page::History => {
                    if let Some(session) = &model.session {
                        model.history = load_history(&session.storage_uid);
                    }
                }
                Page::Login | Page::Map => {}
            }
        }
        Msg::LocateRequested => {
            model.location_error = None;
            model.locating = true;
            let locator = Rc::clone(&model.locator);
            orders.perform_cmd(async move { Msg::Located(locator.acquire().await) });
        }
        // the guard rejected this call; the original acquisition still runs
        Msg::Located(Err(LocationError::Busy)) => {}
        Msg::Located(Err(err)) => {
            model.locating = false;
            model.location_error = Some(err);
        }
        Msg::Located(Ok(located)) => {
            model.locating = false;
            model.user_location = Some(located);
            if let Ok(coord) = to_value(&located.coord) {
                update_user_marker(coord, located.accuracy);
            }
            if let Ok(coord) = to_value(&located.coord) {
                center_map(coord, LOCATED_ZOOM);
            }
            if !model.spots.is_empty() {
                let spots = model.spots.clone();
                let origin = located.coord;
                orders.perform_cmd(async move {
                    Msg::SpotsEnriched(enrich_spots(spots, origin, route_matrix).await)
                });
            }
        }
        Msg::SpotsFetched(Ok(spots)) => {
            model.spots_pending = false;
            model.spots_error = None;
            model.spots = spots;
            sync_spot_markers(&model.spots);
            if let Some(located) = model.user_location {
                let spots = model.spots.clone();
                orders.perform_cmd(async move {
                    Msg::SpotsEnriched(enrich_spots(spots, located.coord, route_matrix).await)
                });
            }
        }
        Msg::SpotsFetched(Err(err)) => {
            model.spots_pending = false;
            model.spots_error = Some(err);
        }
        Msg::RetrySpots => {
            model.spots_pending = true;
            model.spots_error = None;
            orders.perform_cmd(fetch_spots());
        }
        Msg::SpotsEnriched(spots) => {
            model.spots = spots;
            sync_spot_markers(&model.spots);
        }
        Msg::SpotSelected(id) => {
            let spot = model
                .spots
                .iter()
                .chain(model.favorites.iter())
                .chain(model.history.iter())
                .find(|spot| spot.id == id)
                .cloned();
            if let Some(spot) = spot {
                if let Ok(coord) = to_value(&spot.location()) {
                    center_map(coord, FOCUS_ZOOM);
                }
                if let Some(session) = &model.session {
                    record_history(&session.storage_uid, &mut model.history, spot.clone());
                }
                model.selected_spot = Some(spot);
            }
        }
        Msg::CloseSpotDetail => model.selected_spot = None,
        Msg::DirectionsRequested(id) => {
            let origin = model.user_location.map(|located| located.coord);
            let destination = model
                .spots
                .iter()
                .chain(model.favorites.iter())
                .chain(model.history.iter())
                .find(|spot| spot.id == id)
                .map(|spot| spot.location());
            match (origin, destination) {
                (Some(origin), Some(destination)) => {
                    if let (Ok(origin), Ok(destination)) =
                        (to_value(&origin), to_value(&destination))
                    {
                        show_directions(origin, destination);
                    }
                }
                // directions need a fix first
                (None, _) => model.location_error = Some(LocationError::PositionUnavailable),
                _ => {}
            }
        }
        Msg::ToggleFavorite(spot_id) => {
            let Some(session) = &model.session else {
                return;
            };
            match model.favorite_ids.get(&spot_id) {
                Some(&favorite_id) => {
                    orders.perform_cmd(delete_favorite(favorite_id, spot_id));
                }
                None => {
                    orders.perform_cmd(push_favorite(session.user.id, spot_id));
                }
            }
        }
        Msg::FavoriteAdded(Ok(favorite)) => {
            model
                .favorite_ids
                .insert(favorite.parking_spot_id, favorite.id);
            model.favorites_error = None;
            if let Some(session) = &model.session {
                orders.perform_cmd(fetch_favorites(session.user.id));
            }
        }
        Msg::FavoriteAdded(Err(err)) => model.favorites_error = Some(err),
        Msg::FavoriteRemoved(Ok(spot_id)) => {
            model.favorite_ids.remove(&spot_id);
            model.favorites.retain(|spot| spot.id != spot_id);
            model.favorites_error = None;
        }
        Msg::FavoriteRemoved(Err(err)) => model.favorites_error = Some(err),
        Msg::FavoritesFetched(Ok(favorites)) => {
            model.favorites = favorites;
            model.favorites_error = None;
        }
        Msg::FavoritesFetched(Err(err)) => model.favorites_error = Some(err),
    }
}

async fn resolve_backend_user(identity: Identity) -> Msg {
    let lookup_url = format!("{}/api/users/uid/{}", api_root(), identity.uid);
    let result = match Request::new(lookup_url).fetch().await {
        Err(err) => Err(format!("{err:?}")),
        Ok(response) if response.status().code == 404 => create_backend_user(identity).await,
        Ok(response) => match response.check_status() {
            Err(err) => Err(format!("{err:?}")),
            Ok(response) => response
                .json::<User>()
                .await
                .map_err(|err| format!("{err:?}")),
        },
    };
    Msg::SignedIn(result)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserPayload {
    uid: String,
    email: String,
    display_name: Option<String>,
}

async fn create_backend_user(identity: Identity) -> Result<User, String> {
    let payload = CreateUserPayload {
        uid: identity.uid,
        email: identity.email,
        display_name: identity.display_name,
    };
    let request = Request::new(format!("{}/api/users", api_root()))
        .method(Method::Post)
        .json(&payload)
        .map_err(|err| format!("{err:?}"))?;
    let response = request
        .fetch()
        .await
        .map_err(|err| format!("{err:?}"))?
        .check_status()
        .map_err(|err| format!("{err:?}"))?;
    response
        .json::<User>()
        .await
        .map_err(|err| format!("{err:?}"))
}

async fn fetch_spots() -> Msg {
    let url = format!("{}/api/parking-spots", api_root());
    let result = match Request::new(url).fetch().await {
        Err(err) => Err(format!("{err:?}")),
        Ok(response) => match response.check_status() {
            Err(err) => Err(format!("{err:?}")),
            Ok(response) => response
                .json::<Vec<ParkingSpotClient>>()
                .await
                .map_err(|err| format!("{err:?}")),
        },
    };
    Msg::SpotsFetched(result)
}

async fn fetch_favorites(user_id: i32) -> Msg {
    let url = format!("{}/api/favorites/{user_id}", api_root());
    let result = match Request::new(url).fetch().await {
        Err(err) => Err(format!("{err:?}")),
        Ok(response) => match response.check_status() {
            Err(err) => Err(format!("{err:?}")),
            Ok(response) => response
                .json::<Vec<ParkingSpotClient>>()
                .await
                .map_err(|err| format!("{err:?}")),
        },
    };
    Msg::FavoritesFetched(result)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddFavoritePayload {
    user_id: i32,
    parking_spot_id: i32,
}

async fn push_favorite(user_id: i32, parking_spot_id: i32) -> Msg {
    let payload = AddFavoritePayload {
        user_id,
        parking_spot_id,
    };
    let result = match Request::new(format!("{}/api/favorites", api_root()))
        .method(Method::Post)
        .json(&payload)
    {
        Err(err) => Err(format!("{err:?}")),
        Ok(request) => match request.fetch().await {
            Err(err) => Err(format!("{err:?}")),
            Ok(response) => match response.check_status() {
                Err(err) => Err(format!("{err:?}")),
                Ok(response) => response
                    .json::<Favorite>()
                    .await
                    .map_err(|err| format!("{err:?}")),
            },
        },
    };
    Msg::FavoriteAdded(result)
}

async fn delete_favorite(favorite_id: i32, spot_id: i32) -> Msg {
    let url = format!("{}/api/favorites/{favorite_id}", api_root());
    let result = match Request::new(url).method(Method::Delete).fetch().await {
        Err(err) => Err(format!("{err:?}")),
        Ok(response) => response
            .check_status()
            .map(|_| spot_id)
            .map_err(|err| format!("{err:?}")),
    };
    Msg::FavoriteRemoved(result)
}

fn history_key(uid: &str) -> String {
    format!("history_{uid}")
}

fn load_history(uid: &str) -> Vec<ParkingSpotClient> {
    LocalStorage::get(history_key(uid)).unwrap_or_default()
}

fn record_history(uid: &str, history: &mut Vec<ParkingSpotClient>, spot: ParkingSpotClient) {
    let mut list = RecentList::from_items(HISTORY_CAPACITY, std::mem::take(history));
    list.push_front_dedup(spot, |spot| spot.id);
    *history = list.into_items();
    // best effort: blocked storage only costs the next session its history
    let _ = LocalStorage::insert(history_key(uid), &*history);
}

fn sync_spot_markers(spots: &[ParkingSpotClient]) {
    if let Ok(value) = to_value(spots) {
        update_spot_markers(value);
    }
}

pub fn view(model: &Model) -> Node<Msg> {
    div![
        C!["app-container"],
        header![
            h1!["EZ Park"],
            model.session.as_ref().map(|session| {
                span![
                    C!["user-name"],
                    session
                        .user
                        .display_name
                        .clone()
                        .unwrap_or_else(|| session.user.email.clone())
                ]
            }),
        ],
        match model.page {
            Page::Login => view_login(model),
            Page::Map => view_map(model),
            Page::Favorites => view_favorites(model),
            Page::History => view_history(model),
        },
        if model.session.is_some() {
            view_nav(model.page)
        } else {
            empty![]
        },
        model
            .selected_spot
            .as_ref()
            .map(|spot| view_spot_detail(model, spot))
            .unwrap_or_else(|| empty![]),
    ]
}

fn view_login(model: &Model) -> Node<Msg> {
    form![
        C!["login"],
        fieldset![
            legend!["Sign in"],
            div![
                C!["input-field"],
                label!["Email"],
                input![
                    attrs! {
                        At::Value => model.login_form.email,
                        At::Type => "email",
                        At::AutoComplete => "off",
                    },
                    input_ev(Ev::Input, Msg::EmailChanged),
                ]
            ],
            div![
                C!["input-field"],
                label!["Display name"],
                input![
                    attrs! { At::Value => model.login_form.display_name },
                    input_ev(Ev::Input, Msg::DisplayNameChanged),
                ]
            ],
        ],
        button![
            "Sign in",
            ev(Ev::Click, |event| {
                event.prevent_default();
                Msg::SubmitLogin
            }),
        ],
        if let Some(error) = &model.login_error {
            p![C!["error"], error]
        } else {
            empty![]
        }
    ]
}

fn view_map(model: &Model) -> Node<Msg> {
    section![
        C!["map-page"],
        div![C!["map"], attrs! { At::Id => "map" }],
        div![
            C!["map-controls"],
            button![
                if model.locating {
                    "Locating..."
                } else {
                    "Find spots near me"
                },
                attrs! { At::Disabled => bool_attr(model.locating) },
                ev(Ev::Click, |_| Msg::LocateRequested),
            ],
        ],
        if let Some(error) = &model.location_error {
            div![
                C!["location-error"],
                p![error.message()],
                button!["Try again", ev(Ev::Click, |_| Msg::LocateRequested)],
            ]
        } else {
            empty![]
        },
        if let Some(error) = &model.spots_error {
            div![
                C!["spots-error"],
                p![format!("Could not load parking spots: {error}")],
                button!["Retry", ev(Ev::Click, |_| Msg::RetrySpots)],
            ]
        } else {
            empty![]
        },
        if model.spots_pending {
            p![C!["loading"], "Loading parking spots..."]
        } else {
            view_spot_list(&model.spots, "No parking spots loaded yet.")
        },
    ]
}

fn view_favorites(model: &Model) -> Node<Msg> {
    section![
        C!["favorites-page"],
        h2!["Your favorite spots"],
        if let Some(error) = &model.favorites_error {
            p![C!["error"], error]
        } else {
            empty![]
        },
        view_spot_list(&model.favorites, "No favorite spots yet."),
    ]
}

fn view_history(model: &Model) -> Node<Msg> {
    section![
        C!["history-page"],
        h2!["Your parking history"],
        view_spot_list(&model.history, "You have no parking history yet."),
    ]
}

fn view_spot_list(spots: &[ParkingSpotClient], empty_message: &str) -> Node<Msg> {
    if spots.is_empty() {
        return p![C!["empty-list"], empty_message];
    }

    ul![
        C!["spot-list"],
        spots.iter().map(|spot| {
            let id = spot.id;
            li![
                C![if spot.available_spots > 0 {
                    "spot-card available"
                } else {
                    "spot-card full"
                }],
                strong![&spot.name],
                p![C!["address"], &spot.address],
                p![
                    C!["availability"],
                    format!("{} / {} spots", spot.available_spots, spot.total_spots)
                ],
                p![C!["price"], format_price(spot)],
                p![C!["hours"], format_hours(spot)],
                spot.distance_km.map(|_| {
                    p![
                        C!["distance"],
                        format!(
                            "{} · {}",
                            format_distance(spot.distance_km),
                            format_duration(spot.duration_sec)
                        )
                    ]
                }),
                ev(Ev::Click, move |_| Msg::SpotSelected(id)),
            ]
        })
    ]
}

fn view_spot_detail(model: &Model, spot: &ParkingSpotClient) -> Node<Msg> {
    let id = spot.id;
    let is_favorite = model.favorite_ids.contains_key(&id);

    div![
        C!["spot-detail"],
        h2![&spot.name],
        p![&spot.address],
        p![format!(
            "{} of {} spots available",
            spot.available_spots, spot.total_spots
        )],
        p![format_price(spot)],
        p![format_hours(spot)],
        p![format!(
            "{} · {}",
            format_distance(spot.distance_km),
            format_duration(spot.duration_sec)
        )],
        ul![
            C!["features"],
            feature_item(spot.features.has_security_guard, "Security guard"),
            feature_item(spot.features.has_card_payment, "Card payment"),
            feature_item(spot.features.has_accessible_parking, "Accessible parking"),
            feature_item(spot.features.has_ev_charging, "EV charging"),
        ],
        div![
            C!["actions"],
            button![
                "Directions",
                ev(Ev::Click, move |_| Msg::DirectionsRequested(id)),
            ],
            if model.session.is_some() {
                button![
                    if is_favorite {
                        "Remove favorite"
                    } else {
                        "Add to favorites"
                    },
                    ev(Ev::Click, move |_| Msg::ToggleFavorite(id)),
                ]
            } else {
                empty![]
            },
            button!["Close", ev(Ev::Click, |_| Msg::CloseSpotDetail)],
        ],
    ]
}

fn feature_item(enabled: bool, label: &str) -> Node<Msg> {
    li![
        C![if enabled { "feature on" } else { "feature off" }],
        label
    ]
}

fn view_nav(current: Page) -> Node<Msg> {
    let nav_button = |label: &str, page: Page| {
        button![
            C![if current == page { "nav active" } else { "nav" }],
            label,
            ev(Ev::Click, move |_| Msg::ShowPage(page)),
        ]
    };

    nav![
        C!["bottom-nav"],
        nav_button("Map", Page::Map),
        nav_button("Favorites", Page::Favorites),
        nav_button("History", Page::History),
        button![C!["nav"], "Sign out", ev(Ev::Click, |_| Msg::SignOut)],
    ]
}

fn format_price(spot: &ParkingSpotClient) -> String {
    match spot.price_per_hour {
        Some(price) => format!("{}{price}/hour", spot.currency),
        None => "Free".to_string(),
    }
}

fn format_hours(spot: &ParkingSpotClient) -> String {
    if spot.is_open_24_hours {
        return "Open 24 hours".to_string();
    }
    match (&spot.opening_time, &spot.closing_time) {
        (Some(open), Some(close)) => format!("{open} to {close}"),
        _ => "Hours not listed".to_string(),
    }
}

fn format_distance(distance_km: Option<f64>) -> String {
    match distance_km {
        Some(distance) => format!("{distance:.1} km"),
        None => "distance unknown".to_string(),
    }
}

fn format_duration(duration_sec: Option<f64>) -> String {
    match duration_sec {
        Some(seconds) => format!("{} min", (seconds / 60.0).ceil() as i64),
        None => String::new(),
    }
}

fn bool_attr(value: bool) -> AtValue {
    if value {
        AtValue::Some("true".into())
    } else {
        AtValue::Ignored
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    init_map();
    App::start("app", init, update, view);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_form_requires_email() {
        let form = LoginForm {
            email: "".to_string(),
            display_name: "Driver".to_string(),
        };
        assert!(form.validate().is_err());

        let form = LoginForm {
            email: "not-an-email".to_string(),
            display_name: String::new(),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_login_form_trims_fields() {
        let form = LoginForm {
            email: "  driver@example.com ".to_string(),
            display_name: " Driver ".to_string(),
        };
        let (email, display_name) = form.validate().unwrap();
        assert_eq!(email, "driver@example.com");
        assert_eq!(display_name, "Driver");
    }

    #[test]
    fn test_history_key_is_scoped_by_uid() {
        assert_eq!(history_key("ext-42"), "history_ext-42");
    }

    #[test]
    fn test_format_price_handles_free_spots() {
        let mut spot: ParkingSpotClient = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Lot",
            "address": "Somewhere",
            "latitude": 14.5,
            "longitude": 121.0,
            "availableSpots": 1,
            "totalSpots": 2,
            "pricePerHour": 50.0,
            "currency": "₱",
            "isOpen24Hours": true,
            "openingTime": null,
            "closingTime": null,
            "features": {
                "hasSecurityGuard": false,
                "hasCardPayment": false,
                "hasAccessibleParking": false,
                "hasEvCharging": false
            }
        }))
        .unwrap();

        assert_eq!(format_price(&spot), "₱50/hour");
        spot.price_per_hour = None;
        assert_eq!(format_price(&spot), "Free");
    }

    #[test]
    fn test_format_hours_prefers_24h_flag() {
        let mut spot: ParkingSpotClient = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Lot",
            "address": "Somewhere",
            "latitude": 14.5,
            "longitude": 121.0,
            "availableSpots": 1,
            "totalSpots": 2,
            "pricePerHour": null,
            "currency": "₱",
            "isOpen24Hours": true,
            "openingTime": null,
            "closingTime": null,
            "features": {
                "hasSecurityGuard": false,
                "hasCardPayment": false,
                "hasAccessibleParking": false,
                "hasEvCharging": false
            }
        }))
        .unwrap();

        assert_eq!(format_hours(&spot), "Open 24 hours");
        spot.is_open_24_hours = false;
        spot.opening_time = Some("6 AM".to_string());
        spot.closing_time = Some("10 PM".to_string());
        assert_eq!(format_hours(&spot), "6 AM to 10 PM");
        spot.closing_time = None;
        assert_eq!(format_hours(&spot), "Hours not listed");
    }

    #[test]
    fn test_format_duration_rounds_up_to_minutes() {
        assert_eq!(format_duration(Some(61.0)), "2 min");
        assert_eq!(format_duration(Some(60.0)), "1 min");
        assert_eq!(format_duration(None), "");
    }
}
