pub mod compass;
pub mod config;
pub mod error;
pub mod ffi;
pub mod geo;
pub mod models;
pub mod sensors;
pub mod sensors_mock;
pub mod session;
pub mod storage;
pub mod waypoints;

uniffi::setup_scaffolding!();

pub use config::NavigatorConfig;
pub use error::{LineError, SensorError, StoreError};
pub use ffi::Navigator;
pub use models::{
    Cardinal, CardinalLabel, DialSize, GeoPoint, Marker, ScreenPoint, SelectionInfo, Waypoint,
    WaypointId, WaypointRow,
};
pub use sensors::{
    LocationProvider, LocationRequest, RotationRequest, SensorDelay, SensorHub, Tracker,
};
pub use session::Session;
pub use storage::{FileStore, MemoryStore, WaypointStore};
pub use waypoints::WaypointList;
