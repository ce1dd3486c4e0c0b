//! Tunables for the navigation session.
//!
//! Hosts usually take [`NavigatorConfig::default`]; every field is exported so
//! a shell can override scale bounds or tap tolerance for larger screens.

pub const DEFAULT_FILE_NAME: &str = "waypoints.txt";

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct NavigatorConfig {
    /// Smallest distance mapped to the dial edge, metres.
    pub min_scale_m: f64,
    /// Largest distance mapped to the dial edge, metres.
    pub max_scale_m: f64,
    pub initial_scale_m: f64,
    /// Tap tolerance around a marker, pixels.
    pub hit_radius_px: f64,
    /// Distance at which the selection steps back to the previous waypoint.
    pub arrival_radius_m: f64,
    /// Fraction of the half canvas covered by the dial.
    pub dial_fill: f64,
    pub file_name: String,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            min_scale_m: 500.0,
            max_scale_m: 2000.0,
            initial_scale_m: 500.0,
            hit_radius_px: 24.0,
            arrival_radius_m: 10.0,
            dial_fill: 0.8,
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

impl NavigatorConfig {
    /// Repair host-supplied values the session cannot work with.
    ///
    /// Non-positive or non-finite fields fall back to their defaults and
    /// scale bounds given in the wrong order are swapped.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let mut min_scale_m = positive_or(self.min_scale_m, defaults.min_scale_m);
        let mut max_scale_m = positive_or(self.max_scale_m, defaults.max_scale_m);
        if min_scale_m > max_scale_m {
            log::warn!("scale bounds {min_scale_m} > {max_scale_m}, swapping");
            std::mem::swap(&mut min_scale_m, &mut max_scale_m);
        }
        let file_name = if self.file_name.is_empty() {
            defaults.file_name
        } else {
            self.file_name
        };
        Self {
            min_scale_m,
            max_scale_m,
            initial_scale_m: positive_or(self.initial_scale_m, defaults.initial_scale_m),
            hit_radius_px: positive_or(self.hit_radius_px, defaults.hit_radius_px),
            arrival_radius_m: positive_or(self.arrival_radius_m, defaults.arrival_radius_m),
            dial_fill: positive_or(self.dial_fill, defaults.dial_fill),
            file_name,
        }
    }

    /// Clamp into the scale bounds. Never panics, even on unnormalized bounds.
    pub fn clamp_scale(&self, scale_m: f64) -> f64 {
        let low = self.min_scale_m.min(self.max_scale_m);
        let high = self.min_scale_m.max(self.max_scale_m);
        if scale_m.is_nan() || low.is_nan() || high.is_nan() {
            return low;
        }
        scale_m.clamp(low, high)
    }
}
