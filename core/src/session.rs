use std::sync::Arc;

use crate::compass::{self, Dial};
use crate::config::NavigatorConfig;
use crate::geo::{bearing_degrees, distance_meters, normalize_degrees};
use crate::models::{
    CardinalLabel, DialSize, GeoPoint, Marker, ScreenPoint, SelectionInfo, Waypoint, WaypointId,
    WaypointRow,
};
use crate::sensors::{SensorHub, Tracker};
use crate::storage::WaypointStore;
use crate::waypoints::WaypointList;

/// Application state driven by sensor callbacks and user actions.
///
/// Every change to the waypoint list is written back through the store right
/// away. Storage failures are logged and otherwise ignored; the in-memory
/// list stays authoritative for the rest of the run.
#[derive(Debug)]
pub struct Session<S: WaypointStore> {
    config: NavigatorConfig,
    store: S,
    waypoints: WaypointList,
    location: Option<GeoPoint>,
    heading_deg: f64,
    scale_m: f64,
    tracking: bool,
    tracker: Option<Tracker>,
    clear_pending: bool,
}

impl<S: WaypointStore> Session<S> {
    /// Start a session with whatever the store holds.
    pub fn open(store: S, config: NavigatorConfig) -> Self {
        let config = config.normalized();
        let waypoints = match store.load() {
            Ok(waypoints) => waypoints,
            Err(err) => {
                log::warn!("could not load waypoints, starting empty: {err}");
                Vec::new()
            }
        };
        let scale_m = config.clamp_scale(config.initial_scale_m);
        Self {
            config,
            store,
            waypoints: WaypointList::from_waypoints(waypoints),
            location: None,
            heading_deg: 0.0,
            scale_m,
            tracking: false,
            tracker: None,
            clear_pending: false,
        }
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        self.waypoints.waypoints()
    }

    pub fn selected_id(&self) -> Option<WaypointId> {
        self.waypoints.selected_id()
    }

    pub fn location(&self) -> Option<GeoPoint> {
        self.location
    }

    pub fn heading(&self) -> f64 {
        self.heading_deg
    }

    pub fn scale(&self) -> f64 {
        self.scale_m
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Hand the session the platform's sensors. Registrations follow the
    /// tracking flag from here on; a previously attached hub is released.
    pub fn attach_sensors(&mut self, hub: Arc<dyn SensorHub>) {
        if let Some(mut old) = self.tracker.take() {
            old.stop();
        }
        let mut tracker = Tracker::new(hub);
        tracker.sync(self.tracking);
        self.tracker = Some(tracker);
    }

    pub fn has_sensors(&self) -> bool {
        self.tracker.is_some()
    }

    pub fn toggle_tracking(&mut self) -> bool {
        self.tracking = !self.tracking;
        log::info!("tracking {}", if self.tracking { "started" } else { "stopped" });
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.sync(self.tracking);
        }
        self.tracking
    }

    /// Location fix from the platform. Ignored while not tracking.
    pub fn on_location(&mut self, fix: GeoPoint) {
        if !self.tracking {
            return;
        }
        self.location = Some(fix);
        self.waypoints.auto_advance(fix, self.config.arrival_radius_m);
    }

    pub fn on_heading(&mut self, heading_deg: f64) {
        if heading_deg.is_finite() {
            self.heading_deg = normalize_degrees(heading_deg);
        }
    }

    pub fn can_add_waypoint(&self) -> bool {
        self.tracking && self.location.is_some()
    }

    /// Drop a waypoint at the current location and select it.
    pub fn add_waypoint(&mut self) -> Option<Waypoint> {
        let Some(at) = self.location else {
            log::debug!("no location fix, waypoint not added");
            return None;
        };
        let waypoint = self.waypoints.add(at);
        self.waypoints_changed();
        Some(waypoint)
    }

    pub fn can_clear(&self) -> bool {
        !self.waypoints.is_empty()
    }

    /// First half of clearing: the host asks the user to confirm.
    pub fn request_clear(&mut self) -> bool {
        self.clear_pending = self.can_clear();
        self.clear_pending
    }

    pub fn is_clear_pending(&self) -> bool {
        self.clear_pending
    }

    pub fn cancel_clear(&mut self) {
        self.clear_pending = false;
    }

    /// Clear all waypoints if a clear was requested. Returns whether it happened.
    pub fn confirm_clear(&mut self) -> bool {
        if !self.clear_pending {
            return false;
        }
        self.clear_pending = false;
        self.waypoints.clear();
        self.waypoints_changed();
        true
    }

    pub fn select(&mut self, id: WaypointId) -> bool {
        self.waypoints.select(id)
    }

    /// Re-read the store, e.g. after the host restored a backup.
    pub fn reload(&mut self) {
        match self.store.load() {
            Ok(waypoints) => self.waypoints.replace(waypoints),
            Err(err) => log::warn!("could not reload waypoints: {err}"),
        }
    }

    pub fn set_scale(&mut self, scale_m: f64) -> f64 {
        if scale_m.is_finite() {
            self.scale_m = self.config.clamp_scale(scale_m);
        }
        self.scale_m
    }

    pub fn zoom(&mut self, factor: f64) -> f64 {
        self.scale_m = compass::zoomed_scale(
            self.scale_m,
            factor,
            self.config.min_scale_m,
            self.config.max_scale_m,
        );
        self.scale_m
    }

    pub fn dial(&self, size: DialSize) -> Dial {
        Dial::new(size, self.config.dial_fill)
    }

    /// Select whatever waypoint lies under `tap`. A tap on empty dial leaves
    /// the selection alone.
    pub fn tap(&mut self, size: DialSize, tap: ScreenPoint) -> Option<WaypointId> {
        let origin = self.location?;
        let hit = compass::hit_test(
            &self.dial(size),
            tap,
            self.heading_deg,
            origin,
            self.waypoints.waypoints(),
            self.scale_m,
            self.config.hit_radius_px,
        )?;
        self.waypoints.select(hit);
        Some(hit)
    }

    pub fn markers(&self, size: DialSize) -> Vec<Marker> {
        let Some(origin) = self.location else {
            return Vec::new();
        };
        compass::markers(
            &self.dial(size),
            origin,
            self.waypoints.waypoints(),
            self.waypoints.selected_id(),
            self.scale_m,
            self.heading_deg,
        )
    }

    pub fn cardinal_labels(&self, size: DialSize, inset_px: f64) -> Vec<CardinalLabel> {
        compass::cardinal_labels(&self.dial(size), inset_px)
    }

    pub fn face_rotation(&self) -> f64 {
        compass::face_rotation(self.heading_deg)
    }

    pub fn selection_info(&self) -> Option<SelectionInfo> {
        let waypoint = self.waypoints.selected()?.clone();
        let (distance_m, bearing_deg) = match self.location {
            Some(here) => (
                Some(distance_meters(here, waypoint.position())),
                Some(bearing_degrees(here, waypoint.position())),
            ),
            None => (None, None),
        };
        Some(SelectionInfo {
            waypoint,
            distance_m,
            bearing_deg,
        })
    }

    pub fn waypoint_rows(&self) -> Vec<WaypointRow> {
        let selected = self.waypoints.selected_id();
        self.waypoints
            .waypoints()
            .iter()
            .map(|wp| WaypointRow {
                waypoint: wp.clone(),
                distance_m: self.location.map(|here| distance_meters(here, wp.position())),
                selected: selected == Some(wp.id),
            })
            .collect()
    }

    fn waypoints_changed(&mut self) {
        self.waypoints.reconcile_selection();
        if let Err(err) = self.store.save(self.waypoints.waypoints()) {
            log::warn!("could not save waypoints: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::sensors_mock::MockSensorHub;
    use crate::storage::MemoryStore;

    const CANVAS: DialSize = DialSize {
        width: 250.0,
        height: 250.0,
    };

    fn session() -> Session<MemoryStore> {
        Session::open(MemoryStore::new(), NavigatorConfig::default())
    }

    fn tracking_at(lat: f64, lon: f64) -> Session<MemoryStore> {
        let mut s = session();
        s.toggle_tracking();
        s.on_location(GeoPoint::new(lat, lon));
        s
    }

    struct BrokenStore;

    impl WaypointStore for BrokenStore {
        fn load(&self) -> Result<Vec<Waypoint>, StoreError> {
            Err(StoreError::NotConfigured)
        }

        fn save(&mut self, _waypoints: &[Waypoint]) -> Result<(), StoreError> {
            Err(StoreError::NotConfigured)
        }
    }

    #[test]
    fn test_open_loads_store() {
        let store = MemoryStore::with_contents("1,47.0,8.0,Car\n2,47.001,8.0,Summit\n");
        let s = Session::open(store, NavigatorConfig::default());
        assert_eq!(s.waypoints().len(), 2);
        assert_eq!(s.selected_id(), None);
        assert_eq!(s.scale(), 500.0);
        assert!(!s.is_tracking());
    }

    #[test]
    fn test_location_ignored_until_tracking() {
        let mut s = session();
        s.on_location(GeoPoint::new(1.0, 1.0));
        assert_eq!(s.location(), None);
        assert!(s.toggle_tracking());
        s.on_location(GeoPoint::new(1.0, 1.0));
        assert_eq!(s.location(), Some(GeoPoint::new(1.0, 1.0)));
        assert!(!s.toggle_tracking());
    }

    #[test]
    fn test_toggle_tracking_drives_sensors() {
        let hub = Arc::new(MockSensorHub::new());
        let mut s = session();
        s.attach_sensors(hub.clone());
        assert!(s.has_sensors());
        assert!(hub.snapshot().location_requests.is_empty());

        s.toggle_tracking();
        let state = hub.snapshot();
        assert_eq!(state.location_requests.len(), 2);
        assert!(state.rotation_registered);

        s.toggle_tracking();
        let state = hub.snapshot();
        assert!(state.location_requests.is_empty());
        assert!(!state.rotation_registered);
        assert_eq!(state.removals, 1);
    }

    #[test]
    fn test_attach_sensors_while_tracking() {
        let mut s = session();
        s.toggle_tracking();

        let first = Arc::new(MockSensorHub::new());
        s.attach_sensors(first.clone());
        assert!(first.snapshot().rotation_registered);

        let second = Arc::new(MockSensorHub::degraded());
        s.attach_sensors(second.clone());
        assert!(!first.snapshot().rotation_registered);
        assert_eq!(first.snapshot().removals, 1);
        assert_eq!(second.snapshot().location_requests.len(), 1);
        assert!(s.is_tracking());
    }

    #[test]
    fn test_add_requires_location() {
        let mut s = session();
        assert!(!s.can_add_waypoint());
        assert!(s.add_waypoint().is_none());
        assert_eq!(s.store().save_count(), 0);
    }

    #[test]
    fn test_add_persists_and_selects() {
        let mut s = tracking_at(47.0, 8.0);
        assert!(s.can_add_waypoint());
        let first = s.add_waypoint().unwrap();
        let second = s.add_waypoint().unwrap();
        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(s.selected_id(), Some(2));
        assert_eq!(s.store().save_count(), 2);
        assert_eq!(s.store().contents(), "1,47,8,WP 1\n2,47,8,WP 2\n");
    }

    #[test]
    fn test_clear_needs_confirmation() {
        let mut s = tracking_at(47.0, 8.0);
        assert!(!s.request_clear());
        s.add_waypoint();

        assert!(!s.confirm_clear());
        assert_eq!(s.waypoints().len(), 1);

        assert!(s.request_clear());
        s.cancel_clear();
        assert!(!s.confirm_clear());
        assert_eq!(s.waypoints().len(), 1);

        assert!(s.request_clear());
        assert!(s.is_clear_pending());
        assert!(s.confirm_clear());
        assert!(s.waypoints().is_empty());
        assert_eq!(s.selected_id(), None);
        assert_eq!(s.store().contents(), "");
        assert!(!s.can_clear());
    }

    #[test]
    fn test_heading_normalised() {
        let mut s = session();
        s.on_heading(-90.0);
        assert_eq!(s.heading(), 270.0);
        s.on_heading(f64::NAN);
        assert_eq!(s.heading(), 270.0);
        assert_eq!(s.face_rotation(), -270.0);
    }

    #[test]
    fn test_scale_bounds() {
        let mut s = session();
        assert_eq!(s.set_scale(100.0), 500.0);
        assert_eq!(s.set_scale(1500.0), 1500.0);
        assert_eq!(s.zoom(0.5), 2000.0);
        assert_eq!(s.zoom(2.0), 1000.0);
        assert_eq!(s.zoom(1.0), 1000.0);
    }

    #[test]
    fn test_open_with_inverted_scale_bounds() {
        let config = NavigatorConfig {
            min_scale_m: 2000.0,
            max_scale_m: 500.0,
            initial_scale_m: f64::NAN,
            ..NavigatorConfig::default()
        };
        let mut s = Session::open(MemoryStore::new(), config);
        assert_eq!(s.scale(), 500.0);
        assert_eq!(s.config().min_scale_m, 500.0);
        assert_eq!(s.zoom(0.1), 2000.0);
        assert_eq!(s.set_scale(100.0), 500.0);
    }

    #[test]
    fn test_add_after_max_id() {
        let store = MemoryStore::with_contents("2147483647,47.0,8.0,Far\n");
        let mut s = Session::open(store, NavigatorConfig::default());
        s.toggle_tracking();
        s.on_location(GeoPoint::new(47.1, 8.1));
        let added = s.add_waypoint().unwrap();
        assert_eq!(added.id, i32::MIN);
        assert_eq!(s.waypoints().len(), 2);
    }

    #[test]
    fn test_auto_advance_on_location() {
        let mut s = tracking_at(47.0, 8.0);
        s.add_waypoint();
        s.on_location(GeoPoint::new(47.001, 8.0));
        s.add_waypoint();
        assert_eq!(s.selected_id(), Some(2));

        // Standing on WP 2 steps the selection back to WP 1.
        s.on_location(GeoPoint::new(47.00103, 8.0));
        assert_eq!(s.selected_id(), Some(1));

        // WP 1 is first: nothing left to advance to.
        s.on_location(GeoPoint::new(47.0, 8.0));
        assert_eq!(s.selected_id(), Some(1));
    }

    #[test]
    fn test_tap_selects_marker() {
        let mut s = tracking_at(0.0, 0.0);
        s.add_waypoint();
        s.on_location(GeoPoint::new(-0.002261, 0.0));
        s.add_waypoint();
        assert_eq!(s.selected_id(), Some(2));

        // WP 1 is ~250 m north: half way to the rim on a 500 m scale.
        assert_eq!(s.tap(CANVAS, ScreenPoint::new(125.0, 78.0)), Some(1));
        assert_eq!(s.selected_id(), Some(1));

        // Empty dial area: nothing selected, selection kept.
        assert_eq!(s.tap(CANVAS, ScreenPoint::new(20.0, 230.0)), None);
        assert_eq!(s.selected_id(), Some(1));

        let markers = s.markers(CANVAS);
        assert_eq!(markers.len(), 2);
        assert!(markers[0].selected);
    }

    #[test]
    fn test_tap_without_location() {
        let store = MemoryStore::with_contents("1,0.0,0.0,A\n");
        let mut s = Session::open(store, NavigatorConfig::default());
        assert_eq!(s.tap(CANVAS, ScreenPoint::new(125.0, 125.0)), None);
        assert!(s.markers(CANVAS).is_empty());
    }

    #[test]
    fn test_selection_info_and_rows() {
        let store = MemoryStore::with_contents("1,47.0,8.0,Car\n2,47.001,8.0,Summit\n");
        let mut s = Session::open(store, NavigatorConfig::default());
        assert!(s.selection_info().is_none());

        assert!(s.select(2));
        let info = s.selection_info().unwrap();
        assert_eq!(info.waypoint.name, "Summit");
        assert_eq!(info.distance_m, None);

        s.toggle_tracking();
        s.on_location(GeoPoint::new(47.0, 8.0));
        let info = s.selection_info().unwrap();
        let distance = info.distance_m.unwrap();
        assert!((distance - 111.2).abs() < 0.5, "got {distance}");
        assert!(info.bearing_deg.unwrap() < 1e-6);

        let rows = s.waypoint_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].distance_m, Some(0.0));
        assert!(!rows[0].selected);
        assert!(rows[1].selected);
    }

    #[test]
    fn test_reload_reconciles_selection() {
        let mut s = Session::open(
            MemoryStore::with_contents("1,0,0,A\n2,0,0,B\n"),
            NavigatorConfig::default(),
        );
        s.select(2);
        s.reload();
        assert_eq!(s.selected_id(), Some(2));
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let mut s = Session::open(BrokenStore, NavigatorConfig::default());
        assert!(s.waypoints().is_empty());
        s.toggle_tracking();
        s.on_location(GeoPoint::new(10.0, 10.0));
        let added = s.add_waypoint().unwrap();
        assert_eq!(added.id, 1);
        assert_eq!(s.waypoints().len(), 1);
        s.reload();
        assert_eq!(s.waypoints().len(), 1);
    }
}
