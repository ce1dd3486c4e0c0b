pub type WaypointId = i32;

/// A WGS-84 coordinate in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, uniffi::Record)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct Waypoint {
    pub id: WaypointId,
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

impl Waypoint {
    /// A waypoint at `at` carrying the default `WP <id>` name.
    pub fn at(id: WaypointId, at: GeoPoint) -> Self {
        Self {
            id,
            latitude: at.latitude,
            longitude: at.longitude,
            name: format!("WP {id}"),
        }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Pixel coordinates on the dial canvas, y pointing down.
#[derive(Clone, Copy, Debug, PartialEq, uniffi::Record)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: ScreenPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, uniffi::Record)]
pub struct DialSize {
    pub width: f64,
    pub height: f64,
}

/// A waypoint as drawn on the dial.
#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct Marker {
    pub id: WaypointId,
    /// Position on the north-up dial face.
    pub dial_point: ScreenPoint,
    /// Position after the face is rotated by `-heading`.
    pub screen_point: ScreenPoint,
    pub selected: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum Cardinal {
    North,
    East,
    South,
    West,
}

impl Cardinal {
    pub fn label(&self) -> &'static str {
        match self {
            Cardinal::North => "N",
            Cardinal::East => "E",
            Cardinal::South => "S",
            Cardinal::West => "W",
        }
    }
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct CardinalLabel {
    pub cardinal: Cardinal,
    pub text: String,
    pub anchor: ScreenPoint,
}

/// Details about the selected waypoint. Distance and bearing are only known
/// once there is a location fix.
#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct SelectionInfo {
    pub waypoint: Waypoint,
    pub distance_m: Option<f64>,
    pub bearing_deg: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct WaypointRow {
    pub waypoint: Waypoint,
    pub distance_m: Option<f64>,
    pub selected: bool,
}
