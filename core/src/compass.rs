//! Radar dial geometry.
//!
//! Waypoints are laid out on a north-up dial face: the angle is the bearing
//! from the current location, the radius is the distance scaled so that
//! `max_distance_m` lands on the rim. The host then rotates the whole face by
//! `-heading` so the top of the dial points where the device points. Taps are
//! mapped back onto the north-up face before matching.

use crate::geo::{bearing_degrees, distance_meters};
use crate::models::{
    Cardinal, CardinalLabel, DialSize, GeoPoint, Marker, ScreenPoint, Waypoint, WaypointId,
};

/// Centre and rim radius of the dial on its canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dial {
    pub center: ScreenPoint,
    pub radius: f64,
}

impl Dial {
    /// A dial centred on the canvas covering `fill` of its half extent.
    pub fn new(size: DialSize, fill: f64) -> Self {
        Self {
            center: ScreenPoint::new(size.width / 2.0, size.height / 2.0),
            radius: size.width.min(size.height) / 2.0 * fill,
        }
    }

    /// Point at `bearing_deg` and `fraction` of the radius, on the north-up face.
    pub fn polar(&self, bearing_deg: f64, fraction: f64) -> ScreenPoint {
        let angle = bearing_deg.to_radians();
        let r = self.radius * fraction;
        ScreenPoint::new(
            self.center.x + r * angle.sin(),
            self.center.y - r * angle.cos(),
        )
    }
}

/// Rotation applied to the dial face, degrees, screen convention.
pub fn face_rotation(heading_deg: f64) -> f64 {
    -heading_deg
}

/// Rotate `point` about `center` by `degrees` (clockwise on screen, y down).
pub fn rotate_point(point: ScreenPoint, center: ScreenPoint, degrees: f64) -> ScreenPoint {
    let (sin_a, cos_a) = degrees.to_radians().sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    ScreenPoint::new(
        center.x + dx * cos_a - dy * sin_a,
        center.y + dx * sin_a + dy * cos_a,
    )
}

/// Where `target` sits on the north-up face, or `None` past `max_distance_m`.
pub fn project(
    dial: &Dial,
    origin: GeoPoint,
    target: GeoPoint,
    max_distance_m: f64,
) -> Option<ScreenPoint> {
    let distance = distance_meters(origin, target);
    if distance > max_distance_m {
        return None;
    }
    let fraction = (distance / max_distance_m).clamp(0.0, 1.0);
    Some(dial.polar(bearing_degrees(origin, target), fraction))
}

pub fn markers(
    dial: &Dial,
    origin: GeoPoint,
    waypoints: &[Waypoint],
    selected: Option<WaypointId>,
    max_distance_m: f64,
    heading_deg: f64,
) -> Vec<Marker> {
    let rotation = face_rotation(heading_deg);
    waypoints
        .iter()
        .filter_map(|wp| {
            let dial_point = project(dial, origin, wp.position(), max_distance_m)?;
            Some(Marker {
                id: wp.id,
                dial_point,
                screen_point: rotate_point(dial_point, dial.center, rotation),
                selected: selected == Some(wp.id),
            })
        })
        .collect()
}

/// First waypoint (list order) whose marker lies within `tolerance_px` of `tap`.
pub fn hit_test(
    dial: &Dial,
    tap: ScreenPoint,
    heading_deg: f64,
    origin: GeoPoint,
    waypoints: &[Waypoint],
    max_distance_m: f64,
    tolerance_px: f64,
) -> Option<WaypointId> {
    let tap = rotate_point(tap, dial.center, heading_deg);
    waypoints
        .iter()
        .find(|wp| {
            project(dial, origin, wp.position(), max_distance_m)
                .is_some_and(|point| point.distance_to(tap) <= tolerance_px)
        })
        .map(|wp| wp.id)
}

/// Anchors for the N/E/S/W labels on the north-up face, inset from the rim.
pub fn cardinal_labels(dial: &Dial, inset_px: f64) -> Vec<CardinalLabel> {
    let fraction = if dial.radius > 0.0 {
        ((dial.radius - inset_px) / dial.radius).max(0.0)
    } else {
        0.0
    };
    [
        (Cardinal::North, 0.0),
        (Cardinal::East, 90.0),
        (Cardinal::South, 180.0),
        (Cardinal::West, 270.0),
    ]
    .into_iter()
    .map(|(cardinal, bearing)| CardinalLabel {
        cardinal,
        text: cardinal.label().to_string(),
        anchor: dial.polar(bearing, fraction),
    })
    .collect()
}

/// Scale after a pinch with `zoom` factor; spreading fingers (zoom > 1) shows less ground.
///
/// Bounds given in the wrong order are swapped. A NaN bound leaves the
/// scale unchanged.
pub fn zoomed_scale(scale_m: f64, zoom: f64, min_m: f64, max_m: f64) -> f64 {
    if zoom == 1.0 || zoom <= 0.0 || !zoom.is_finite() {
        return scale_m;
    }
    if min_m.is_nan() || max_m.is_nan() {
        return scale_m;
    }
    (scale_m / zoom).clamp(min_m.min(max_m), min_m.max(max_m))
}
