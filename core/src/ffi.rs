//! Surface exported to the Kotlin and Swift shells.
//!
//! The platform owns sensors, permissions and drawing. It forwards location
//! and heading callbacks into a [`Navigator`] and reads back markers and list
//! rows to render. Calls may come from any thread; the session sits behind a
//! mutex so callbacks are applied one at a time.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::NavigatorConfig;
use crate::error::StoreError;
use crate::models::{
    CardinalLabel, DialSize, GeoPoint, Marker, ScreenPoint, SelectionInfo, Waypoint, WaypointId,
    WaypointRow,
};
use crate::sensors::{self, LocationRequest, RotationRequest, SensorHub};
use crate::session::Session;
use crate::storage::{FileStore, MemoryStore, WaypointStore};

#[derive(Debug)]
enum NavigatorStore {
    File(FileStore),
    Memory(MemoryStore),
}

impl WaypointStore for NavigatorStore {
    fn load(&self) -> Result<Vec<Waypoint>, StoreError> {
        match self {
            NavigatorStore::File(store) => store.load(),
            NavigatorStore::Memory(store) => store.load(),
        }
    }

    fn save(&mut self, waypoints: &[Waypoint]) -> Result<(), StoreError> {
        match self {
            NavigatorStore::File(store) => store.save(waypoints),
            NavigatorStore::Memory(store) => store.save(waypoints),
        }
    }
}

#[derive(uniffi::Object)]
pub struct Navigator {
    session: Mutex<Session<NavigatorStore>>,
}

impl Navigator {
    fn with_store(store: NavigatorStore, config: NavigatorConfig) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(Session::open(store, config)),
        })
    }

    fn session(&self) -> MutexGuard<'_, Session<NavigatorStore>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[uniffi::export]
impl Navigator {
    /// Open the waypoint file inside `files_dir`, the app's private storage.
    /// Without a usable directory the waypoints only live for this run.
    #[uniffi::constructor]
    pub fn new(files_dir: String, config: Option<NavigatorConfig>) -> Arc<Self> {
        let config = config.unwrap_or_default();
        let store = match FileStore::in_dir(&files_dir, &config.file_name) {
            Ok(store) => NavigatorStore::File(store),
            Err(err) => {
                log::warn!("{err}, keeping waypoints in memory");
                NavigatorStore::Memory(MemoryStore::new())
            }
        };
        Self::with_store(store, config)
    }

    #[uniffi::constructor]
    pub fn in_memory(config: Option<NavigatorConfig>) -> Arc<Self> {
        Self::with_store(
            NavigatorStore::Memory(MemoryStore::new()),
            config.unwrap_or_default(),
        )
    }

    pub fn config(&self) -> NavigatorConfig {
        self.session().config().clone()
    }

    pub fn location_requests(&self) -> Vec<LocationRequest> {
        sensors::location_requests()
    }

    pub fn rotation_request(&self) -> RotationRequest {
        RotationRequest::default()
    }

    /// Register the platform's sensors. Location and rotation updates are
    /// then requested and removed as tracking is toggled.
    pub fn attach_sensors(&self, hub: Arc<dyn SensorHub>) {
        self.session().attach_sensors(hub);
    }

    pub fn toggle_tracking(&self) -> bool {
        self.session().toggle_tracking()
    }

    pub fn is_tracking(&self) -> bool {
        self.session().is_tracking()
    }

    pub fn on_location(&self, latitude: f64, longitude: f64) {
        self.session().on_location(GeoPoint::new(latitude, longitude));
    }

    pub fn on_heading(&self, heading_deg: f64) {
        self.session().on_heading(heading_deg);
    }

    /// Rotation-vector sample straight from the sensor callback.
    pub fn on_rotation_vector(&self, values: Vec<f64>) {
        let heading = sensors::heading_from_rotation_vector(&values);
        self.session().on_heading(heading);
    }

    pub fn location(&self) -> Option<GeoPoint> {
        self.session().location()
    }

    pub fn heading(&self) -> f64 {
        self.session().heading()
    }

    pub fn face_rotation(&self) -> f64 {
        self.session().face_rotation()
    }

    pub fn scale(&self) -> f64 {
        self.session().scale()
    }

    pub fn set_scale(&self, scale_m: f64) -> f64 {
        self.session().set_scale(scale_m)
    }

    pub fn zoom(&self, factor: f64) -> f64 {
        self.session().zoom(factor)
    }

    pub fn waypoints(&self) -> Vec<Waypoint> {
        self.session().waypoints().to_vec()
    }

    pub fn selected_id(&self) -> Option<WaypointId> {
        self.session().selected_id()
    }

    pub fn can_add_waypoint(&self) -> bool {
        self.session().can_add_waypoint()
    }

    pub fn add_waypoint(&self) -> Option<Waypoint> {
        self.session().add_waypoint()
    }

    pub fn can_clear(&self) -> bool {
        self.session().can_clear()
    }

    pub fn request_clear(&self) -> bool {
        self.session().request_clear()
    }

    pub fn cancel_clear(&self) {
        self.session().cancel_clear();
    }

    pub fn confirm_clear(&self) -> bool {
        self.session().confirm_clear()
    }

    pub fn select(&self, id: WaypointId) -> bool {
        self.session().select(id)
    }

    pub fn tap(&self, size: DialSize, x: f64, y: f64) -> Option<WaypointId> {
        self.session().tap(size, ScreenPoint::new(x, y))
    }

    pub fn markers(&self, size: DialSize) -> Vec<Marker> {
        self.session().markers(size)
    }

    pub fn cardinal_labels(&self, size: DialSize, inset_px: f64) -> Vec<CardinalLabel> {
        self.session().cardinal_labels(size, inset_px)
    }

    pub fn selection_info(&self) -> Option<SelectionInfo> {
        self.session().selection_info()
    }

    pub fn waypoint_rows(&self) -> Vec<WaypointRow> {
        self.session().waypoint_rows()
    }

    pub fn reload(&self) {
        self.session().reload();
    }
}

#[uniffi::export]
pub fn distance_between(from: GeoPoint, to: GeoPoint) -> f64 {
    crate::geo::distance_meters(from, to)
}

#[uniffi::export]
pub fn bearing_between(from: GeoPoint, to: GeoPoint) -> f64 {
    crate::geo::bearing_degrees(from, to)
}

#[uniffi::export]
pub fn rotation_vector_heading(values: Vec<f64>) -> f64 {
    sensors::heading_from_rotation_vector(&values)
}
