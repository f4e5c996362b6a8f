use std::{
    collections::HashMap,
    fs::File,
    io::{self, Read},
    path::Path,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::Utc;
use shared::Coordinate;

use crate::geo::haversine_km;
use crate::models::{Favorite, NewParkingSpot, NewUser, ParkingSpot, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read spot data file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid spot data: {0}")]
    Parse(#[from] serde_json::Error),
}

struct Tables {
    users: HashMap<i32, User>,
    spots: HashMap<i32, ParkingSpot>,
    favorites: HashMap<i32, Favorite>,
    next_user_id: i32,
    next_spot_id: i32,
    next_favorite_id: i32,
}

impl Tables {
    fn new() -> Self {
        Self {
            users: HashMap::new(),
            spots: HashMap::new(),
            favorites: HashMap::new(),
            next_user_id: 1,
            next_spot_id: 1,
            next_favorite_id: 1,
        }
    }
}

/// Process-wide user/spot/favorite tables.
///
/// Every read-modify-write sequence (id assignment, availability update,
/// favorite idempotency check) runs under a single write guard, which keeps
/// the uniqueness and id-monotonicity invariants on the multi-threaded
/// runtime.
pub struct SpotStore {
    tables: RwLock<Tables>,
}

impl SpotStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::new()),
        }
    }

    /// Load sample spots from a JSON file (an array of insert-shaped spots).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, StoreError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        let seed: Vec<NewParkingSpot> = serde_json::from_str(&raw)?;

        let store = Self::new();
        for spot in seed {
            store.create_spot(spot);
        }
        Ok(store)
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().expect("store lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().expect("store lock poisoned")
    }

    // Users

    pub fn get_user(&self, id: i32) -> Option<User> {
        self.read().users.get(&id).cloned()
    }

    pub fn get_user_by_uid(&self, uid: &str) -> Option<User> {
        self.read()
            .users
            .values()
            .find(|user| user.uid.as_deref() == Some(uid))
            .cloned()
    }

    pub fn get_user_by_email(&self, email: &str) -> Option<User> {
        self.read()
            .users
            .values()
            .find(|user| user.email == email)
            .cloned()
    }

    /// Create a user for an external identity. Creation is lazy and
    /// idempotent: posting an already-known uid returns the existing row,
    /// which keeps the uid/email uniqueness invariant.
    pub fn create_user(&self, new: NewUser) -> User {
        let mut tables = self.write();

        if let Some(uid) = new.uid.as_deref() {
            if let Some(existing) = tables
                .users
                .values()
                .find(|user| user.uid.as_deref() == Some(uid))
            {
                return existing.clone();
            }
        }

        let id = tables.next_user_id;
        tables.next_user_id += 1;
        let user = User {
            id,
            uid: new.uid,
            email: new.email,
            display_name: new.display_name,
            photo_url: new.photo_url,
            provider: new.provider,
            created_at: Utc::now(),
        };
        tables.users.insert(id, user.clone());
        user
    }

    // Parking spots

    pub fn get_spot(&self, id: i32) -> Option<ParkingSpot> {
        self.read().spots.get(&id).cloned()
    }

    pub fn all_spots(&self) -> Vec<ParkingSpot> {
        let mut spots: Vec<ParkingSpot> = self.read().spots.values().cloned().collect();
        spots.sort_by_key(|spot| spot.id);
        spots
    }

    pub fn spot_count(&self) -> usize {
        self.read().spots.len()
    }

    /// All spots whose great-circle distance to `origin` is within
    /// `radius_km`. Linear scan; fine at the tens-of-spots scale this store
    /// is seeded with, a spatial index would be needed well before that
    /// assumption breaks.
    pub fn spots_within_radius(&self, origin: Coordinate, radius_km: f64) -> Vec<ParkingSpot> {
        let mut spots: Vec<ParkingSpot> = self
            .read()
            .spots
            .values()
            .filter(|spot| haversine_km(origin, spot.location()) <= radius_km)
            .cloned()
            .collect();
        spots.sort_by_key(|spot| spot.id);
        spots
    }

    pub fn create_spot(&self, new: NewParkingSpot) -> ParkingSpot {
        let mut tables = self.write();
        let id = tables.next_spot_id;
        tables.next_spot_id += 1;
        let spot = ParkingSpot {
            id,
            name: new.name,
            address: new.address,
            latitude: new.latitude,
            longitude: new.longitude,
            total_spots: new.total_spots,
            available_spots: new.available_spots.min(new.total_spots),
            price_per_hour: new.price_per_hour,
            currency: new.currency,
            is_open_24_hours: new.is_open_24_hours,
            opening_time: new.opening_time,
            closing_time: new.closing_time,
            has_security_guard: new.has_security_guard,
            has_card_payment: new.has_card_payment,
            has_accessible_parking: new.has_accessible_parking,
            has_ev_charging: new.has_ev_charging,
        };
        tables.spots.insert(id, spot.clone());
        spot
    }

    /// Update a spot's availability, clamped to its capacity. Returns `None`
    /// for an unknown id; the caller decides whether that is an error.
    pub fn update_availability(&self, id: i32, available_spots: u32) -> Option<ParkingSpot> {
        let mut tables = self.write();
        let spot = tables.spots.get_mut(&id)?;
        spot.available_spots = available_spots.min(spot.total_spots);
        Some(spot.clone())
    }

    // Favorites

    /// Spots the user has bookmarked. Favorite rows whose spot no longer
    /// exists are skipped; there is no cascading delete to rely on.
    pub fn user_favorites(&self, user_id: i32) -> Vec<ParkingSpot> {
        let tables = self.read();
        let mut rows: Vec<&Favorite> = tables
            .favorites
            .values()
            .filter(|favorite| favorite.user_id == user_id)
            .collect();
        rows.sort_by_key(|favorite| favorite.id);
        rows.iter()
            .filter_map(|favorite| tables.spots.get(&favorite.parking_spot_id).cloned())
            .collect()
    }

    /// Idempotent: at most one favorite per `(user_id, parking_spot_id)`;
    /// adding an existing pair returns the stored row.
    pub fn add_favorite(&self, user_id: i32, parking_spot_id: i32) -> Favorite {
        let mut tables = self.write();

        if let Some(existing) = tables
            .favorites
            .values()
            .find(|favorite| {
                favorite.user_id == user_id && favorite.parking_spot_id == parking_spot_id
            })
        {
            return existing.clone();
        }

        let id = tables.next_favorite_id;
        tables.next_favorite_id += 1;
        let favorite = Favorite {
            id,
            user_id,
            parking_spot_id,
            created_at: Utc::now(),
        };
        tables.favorites.insert(id, favorite.clone());
        favorite
    }

    /// Removing an unknown id is a no-op.
    pub fn remove_favorite(&self, id: i32) {
        self.write().favorites.remove(&id);
    }

    #[cfg(test)]
    fn favorite_count(&self) -> usize {
        self.read().favorites.len()
    }
}

impl Default for SpotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_SPOTS: &str = include_str!("../data/sample_spots.json");

    fn seeded_store() -> SpotStore {
        SpotStore::from_reader(SAMPLE_SPOTS.as_bytes()).expect("sample spots")
    }

    fn new_spot(name: &str, lat: f64, lng: f64) -> NewParkingSpot {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "address": "Test Address",
            "latitude": lat,
            "longitude": lng,
            "totalSpots": 10,
            "availableSpots": 5
        }))
        .expect("valid spot")
    }

    #[test]
    fn create_spot_assigns_sequential_ids() {
        let store = SpotStore::new();
        let first = store.create_spot(new_spot("A", 14.5, 121.0));
        let second = store.create_spot(new_spot("B", 14.6, 121.1));
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[test]
    fn seeded_store_keeps_source_order() {
        let store = seeded_store();
        let spots = store.all_spots();
        assert_eq!(spots.len(), 18);
        assert_eq!(spots[0].id, 1);
        assert_eq!(spots[0].name, "SM Mall Parking");
    }

    #[test]
    fn radius_query_includes_spot_at_origin() {
        let store = seeded_store();
        let origin = Coordinate {
            lat: 14.5547,
            lng: 121.0244,
        };
        let nearby = store.spots_within_radius(origin, 1.0);
        assert!(nearby.iter().any(|spot| spot.id == 1));
    }

    #[test]
    fn zero_radius_excludes_distant_spots() {
        let store = seeded_store();
        // ~60 km south-west of the seeded cluster
        let origin = Coordinate {
            lat: 14.0,
            lng: 120.5,
        };
        assert!(store.spots_within_radius(origin, 0.0).is_empty());
    }

    #[test]
    fn radius_query_returns_only_spots_within_radius() {
        let store = seeded_store();
        let origin = Coordinate {
            lat: 14.5547,
            lng: 121.0244,
        };
        for radius_km in [0.5, 2.0, 5.0, 25.0] {
            for spot in store.spots_within_radius(origin, radius_km) {
                assert!(haversine_km(origin, spot.location()) <= radius_km);
            }
        }
    }

    #[test]
    fn update_availability_clamps_to_capacity() {
        let store = SpotStore::new();
        let spot = store.create_spot(new_spot("A", 14.5, 121.0));
        let updated = store.update_availability(spot.id, 99).expect("known id");
        assert_eq!(updated.available_spots, updated.total_spots);
    }

    #[test]
    fn update_availability_unknown_id_returns_none() {
        let store = SpotStore::new();
        assert!(store.update_availability(42, 1).is_none());
    }

    #[test]
    fn add_favorite_is_idempotent() {
        let store = seeded_store();
        let first = store.add_favorite(1, 1);
        let second = store.add_favorite(1, 1);
        assert_eq!(first.id, second.id);
        assert_eq!(store.favorite_count(), 1);
        assert_eq!(store.user_favorites(1).len(), 1);
    }

    #[test]
    fn remove_favorite_unknown_id_is_noop() {
        let store = seeded_store();
        store.add_favorite(1, 1);
        store.remove_favorite(999);
        assert_eq!(store.favorite_count(), 1);
    }

    #[test]
    fn user_favorites_skips_dangling_spot_references() {
        let store = seeded_store();
        store.add_favorite(1, 1);
        store.add_favorite(1, 10_000);
        assert_eq!(store.user_favorites(1).len(), 1);
    }

    #[test]
    fn create_user_reuses_existing_uid() {
        let store = SpotStore::new();
        let new_user = |uid: &str| NewUser {
            uid: Some(uid.to_string()),
            email: "driver@example.com".to_string(),
            display_name: None,
            photo_url: None,
            provider: Some("password".to_string()),
        };
        let first = store.create_user(new_user("ext-1"));
        let second = store.create_user(new_user("ext-1"));
        assert_eq!(first.id, second.id);
        assert!(store.get_user_by_email("driver@example.com").is_some());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_radius_filter_is_sound(
                lat in 13.5..15.5f64,
                lng in 120.0..122.0f64,
                radius_km in 0.0..100.0f64
            ) {
                let store = seeded_store();
                let origin = Coordinate { lat, lng };
                for spot in store.spots_within_radius(origin, radius_km) {
                    prop_assert!(haversine_km(origin, spot.location()) <= radius_km);
                }
            }
        }
    }
}
