use std::fmt;
use std::sync::Arc;

use crate::error::SensorError;
use crate::geo::normalize_degrees;

pub const LOCATION_INTERVAL_MS: u64 = 5_000;
pub const LOCATION_MIN_DISTANCE_M: f64 = 0.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum LocationProvider {
    Gps,
    Network,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum SensorDelay {
    Normal,
    Ui,
    Game,
    Fastest,
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct LocationRequest {
    pub provider: LocationProvider,
    pub interval_ms: u64,
    pub min_distance_m: f64,
}

impl LocationRequest {
    pub fn for_provider(provider: LocationProvider) -> Self {
        Self {
            provider,
            interval_ms: LOCATION_INTERVAL_MS,
            min_distance_m: LOCATION_MIN_DISTANCE_M,
        }
    }
}

/// Location registrations issued while tracking: GPS first, then network.
pub fn location_requests() -> Vec<LocationRequest> {
    vec![
        LocationRequest::for_provider(LocationProvider::Gps),
        LocationRequest::for_provider(LocationProvider::Network),
    ]
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct RotationRequest {
    pub delay: SensorDelay,
}

impl Default for RotationRequest {
    fn default() -> Self {
        Self {
            delay: SensorDelay::Game,
        }
    }
}

/// Platform side of sensor acquisition. The core only says what it needs;
/// readings come back through the session callbacks.
///
/// Kotlin and Swift shells implement this and hand it to
/// [`Navigator::attach_sensors`](crate::ffi::Navigator::attach_sensors).
#[uniffi::export(with_foreign)]
pub trait SensorHub: Send + Sync {
    fn request_location_updates(&self, request: LocationRequest) -> Result<(), SensorError>;
    fn remove_location_updates(&self) -> Result<(), SensorError>;

    fn register_rotation_vector(&self, request: RotationRequest) -> Result<(), SensorError>;
    fn unregister_rotation_vector(&self) -> Result<(), SensorError>;
}

/// Owns the sensor registrations for one tracking run.
///
/// Registration failures never stop tracking: they are logged and the
/// session simply sees fewer (or no) updates.
pub struct Tracker {
    hub: Arc<dyn SensorHub>,
    active: bool,
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl Tracker {
    pub fn new(hub: Arc<dyn SensorHub>) -> Self {
        Self { hub, active: false }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&mut self) {
        if self.active {
            return;
        }
        for request in location_requests() {
            let provider = request.provider;
            if let Err(err) = self.hub.request_location_updates(request) {
                log::warn!("location updates from {provider:?} unavailable: {err}");
            }
        }
        if let Err(err) = self.hub.register_rotation_vector(RotationRequest::default()) {
            log::warn!("rotation vector unavailable: {err}");
        }
        self.active = true;
    }

    pub fn stop(&mut self) {
        if !self.active {
            return;
        }
        if let Err(err) = self.hub.remove_location_updates() {
            log::debug!("removing location updates failed: {err}");
        }
        if let Err(err) = self.hub.unregister_rotation_vector() {
            log::debug!("unregistering rotation vector failed: {err}");
        }
        self.active = false;
    }

    /// Start or stop to match the session's tracking flag.
    pub fn sync(&mut self, tracking: bool) {
        if tracking {
            self.start();
        } else {
            self.stop();
        }
    }
}

/// Device azimuth in degrees `[0, 360)` from a rotation-vector reading.
///
/// `values` holds `x, y, z` and optionally the scalar `w` component. When `w`
/// is missing it is reconstructed from the unit-quaternion constraint.
pub fn heading_from_rotation_vector(values: &[f64]) -> f64 {
    let q1 = values.first().copied().unwrap_or(0.0);
    let q2 = values.get(1).copied().unwrap_or(0.0);
    let q3 = values.get(2).copied().unwrap_or(0.0);
    let q0 = match values.get(3) {
        Some(w) => *w,
        None => {
            let rest = 1.0 - q1 * q1 - q2 * q2 - q3 * q3;
            if rest > 0.0 {
                rest.sqrt()
            } else {
                0.0
            }
        }
    };

    // Row-major rotation matrix entries needed for the azimuth.
    let r1 = 2.0 * q1 * q2 - 2.0 * q3 * q0;
    let r4 = 1.0 - 2.0 * q1 * q1 - 2.0 * q3 * q3;

    normalize_degrees(r1.atan2(r4).to_degrees())
}
