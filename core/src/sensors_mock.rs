use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::SensorError;
use crate::sensors::{LocationProvider, LocationRequest, RotationRequest, SensorHub};

/// Registrations currently held by a [`MockSensorHub`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MockSensorState {
    pub location_requests: Vec<LocationRequest>,
    pub rotation_registered: bool,
    pub removals: u32,
}

/// In-process [`SensorHub`] that records registrations instead of touching
/// platform sensors.
#[derive(Debug, Default)]
pub struct MockSensorHub {
    state: Mutex<MockSensorState>,
    pub fail_network: bool,
    pub fail_rotation: bool,
}

impl MockSensorHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// A hub on a device without network location or rotation sensor.
    pub fn degraded() -> Self {
        Self {
            fail_network: true,
            fail_rotation: true,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> MockSensorState {
        self.state().clone()
    }

    fn state(&self) -> MutexGuard<'_, MockSensorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SensorHub for MockSensorHub {
    fn request_location_updates(&self, request: LocationRequest) -> Result<(), SensorError> {
        if self.fail_network && request.provider == LocationProvider::Network {
            return Err(SensorError::ProviderUnavailable {
                provider: "network".to_string(),
            });
        }
        self.state().location_requests.push(request);
        Ok(())
    }

    fn remove_location_updates(&self) -> Result<(), SensorError> {
        let mut state = self.state();
        state.location_requests.clear();
        state.removals += 1;
        Ok(())
    }

    fn register_rotation_vector(&self, _request: RotationRequest) -> Result<(), SensorError> {
        if self.fail_rotation {
            return Err(SensorError::SensorMissing);
        }
        self.state().rotation_registered = true;
        Ok(())
    }

    fn unregister_rotation_vector(&self) -> Result<(), SensorError> {
        self.state().rotation_registered = false;
        Ok(())
    }
}
