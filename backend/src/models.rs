use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::{Coordinate, ParkingSpotClient, SpotFeatures};

/// Storage-side parking spot record. Never serialized directly; API
/// responses go through [`ParkingSpot::to_client`].
#[derive(Debug, Clone)]
pub struct ParkingSpot {
    pub id: i32,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub total_spots: u32,
    pub available_spots: u32,
    pub price_per_hour: Option<f64>,
    pub currency: String,
    pub is_open_24_hours: bool,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
    pub has_security_guard: bool,
    pub has_card_payment: bool,
    pub has_accessible_parking: bool,
    pub has_ev_charging: bool,
}

impl ParkingSpot {
    pub fn location(&self) -> Coordinate {
        Coordinate {
            lat: self.latitude,
            lng: self.longitude,
        }
    }

    /// Reshape into the wire format: flattened fields plus the nested
    /// `features` object, distance/duration left for the client to fill.
    pub fn to_client(&self) -> ParkingSpotClient {
        ParkingSpotClient {
            id: self.id,
            name: self.name.clone(),
            address: self.address.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            available_spots: self.available_spots,
            total_spots: self.total_spots,
            price_per_hour: self.price_per_hour,
            currency: self.currency.clone(),
            is_open_24_hours: self.is_open_24_hours,
            opening_time: self.opening_time.clone(),
            closing_time: self.closing_time.clone(),
            distance_km: None,
            duration_sec: None,
            features: SpotFeatures {
                has_security_guard: self.has_security_guard,
                has_card_payment: self.has_card_payment,
                has_accessible_parking: self.has_accessible_parking,
                has_ev_charging: self.has_ev_charging,
            },
        }
    }
}

/// Insert shape for spots; also the schema of `data/sample_spots.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewParkingSpot {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub total_spots: u32,
    pub available_spots: u32,
    #[serde(default)]
    pub price_per_hour: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub is_open_24_hours: bool,
    #[serde(default)]
    pub opening_time: Option<String>,
    #[serde(default)]
    pub closing_time: Option<String>,
    #[serde(default)]
    pub has_security_guard: bool,
    #[serde(default)]
    pub has_card_payment: bool,
    #[serde(default)]
    pub has_accessible_parking: bool,
    #[serde(default)]
    pub has_ev_charging: bool,
}

fn default_currency() -> String {
    "₱".to_string()
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub uid: Option<String>,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub provider: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn to_client(&self) -> shared::User {
        shared::User {
            id: self.id,
            uid: self.uid.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            photo_url: self.photo_url.clone(),
            provider: self.provider.clone(),
            created_at: self.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub uid: Option<String>,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub provider: Option<String>,
}

/// User-to-spot bookmark. At most one row per `(user_id, parking_spot_id)`.
#[derive(Debug, Clone)]
pub struct Favorite {
    pub id: i32,
    pub user_id: i32,
    pub parking_spot_id: i32,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    pub fn to_client(&self) -> shared::Favorite {
        shared::Favorite {
            id: self.id,
            user_id: self.user_id,
            parking_spot_id: self.parking_spot_id,
            created_at: self.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_spot() -> ParkingSpot {
        ParkingSpot {
            id: 7,
            name: "SM Mall Parking".to_string(),
            address: "123 Ayala Avenue, Makati City".to_string(),
            latitude: 14.5547,
            longitude: 121.0244,
            total_spots: 100,
            available_spots: 45,
            price_per_hour: Some(50.0),
            currency: "₱".to_string(),
            is_open_24_hours: true,
            opening_time: None,
            closing_time: None,
            has_security_guard: true,
            has_card_payment: true,
            has_accessible_parking: true,
            has_ev_charging: false,
        }
    }

    #[test]
    fn client_shape_nests_features() {
        let client = sample_spot().to_client();
        let value = serde_json::to_value(&client).unwrap();

        assert_eq!(value["availableSpots"], 45);
        assert_eq!(value["features"]["hasSecurityGuard"], true);
        assert_eq!(value["features"]["hasEvCharging"], false);
        // flat flags must not leak next to the nested object
        assert!(value.get("hasSecurityGuard").is_none());
    }

    #[test]
    fn client_shape_omits_unknown_distance() {
        let value = serde_json::to_value(sample_spot().to_client()).unwrap();
        assert!(value.get("distanceKm").is_none());
        assert!(value.get("durationSec").is_none());
    }

    #[test]
    fn new_spot_defaults_apply() {
        let spot: NewParkingSpot = serde_json::from_str(
            r#"{
                "name": "Lot",
                "address": "Somewhere",
                "latitude": 14.5,
                "longitude": 121.0,
                "totalSpots": 10,
                "availableSpots": 3
            }"#,
        )
        .unwrap();

        assert_eq!(spot.currency, "₱");
        assert!(spot.price_per_hour.is_none());
        assert!(!spot.is_open_24_hours);
        assert!(!spot.has_card_payment);
    }
}
