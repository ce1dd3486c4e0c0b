use crate::geo::distance_meters;
use crate::models::{GeoPoint, Waypoint, WaypointId};

/// Ordered waypoint list plus the current selection.
///
/// The selection only ever points at a waypoint in the list; callers that
/// replace the list run [`WaypointList::reconcile_selection`] afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaypointList {
    waypoints: Vec<Waypoint>,
    selected: Option<WaypointId>,
}

impl WaypointList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_waypoints(waypoints: Vec<Waypoint>) -> Self {
        Self {
            waypoints,
            selected: None,
        }
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn selected_id(&self) -> Option<WaypointId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Waypoint> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: WaypointId) -> Option<&Waypoint> {
        self.waypoints.iter().find(|w| w.id == id)
    }

    /// One past the largest id. Wraps around at `i32::MAX`.
    pub fn next_id(&self) -> WaypointId {
        self.waypoints
            .iter()
            .map(|w| w.id)
            .max()
            .unwrap_or(0)
            .wrapping_add(1)
    }

    /// Append a waypoint at `at` and select it.
    pub fn add(&mut self, at: GeoPoint) -> Waypoint {
        let waypoint = Waypoint::at(self.next_id(), at);
        self.waypoints.push(waypoint.clone());
        self.selected = Some(waypoint.id);
        waypoint
    }

    pub fn replace(&mut self, waypoints: Vec<Waypoint>) {
        self.waypoints = waypoints;
        self.reconcile_selection();
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.selected = None;
    }

    /// Select `id` if it is in the list. Returns whether the selection changed to it.
    pub fn select(&mut self, id: WaypointId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.selected = Some(id);
        true
    }

    pub fn reconcile_selection(&mut self) {
        if let Some(id) = self.selected {
            if self.get(id).is_none() {
                log::debug!("selected waypoint {id} no longer exists");
                self.selected = None;
            }
        }
    }

    /// Breadcrumb following: once within `arrival_radius_m` of the selected
    /// waypoint, step the selection back to its predecessor in list order.
    /// Returns the newly selected id.
    pub fn auto_advance(
        &mut self,
        position: GeoPoint,
        arrival_radius_m: f64,
    ) -> Option<WaypointId> {
        let selected = self.selected?;
        let index = self.waypoints.iter().position(|w| w.id == selected)?;
        if index == 0 {
            return None;
        }

        let distance = distance_meters(position, self.waypoints[index].position());
        if distance > arrival_radius_m {
            return None;
        }

        let previous = self.waypoints[index - 1].id;
        log::info!("reached waypoint {selected} ({distance:.1} m), advancing to {previous}");
        self.selected = Some(previous);
        Some(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trail() -> WaypointList {
        let mut list = WaypointList::new();
        list.add(GeoPoint::new(47.0000, 8.0000));
        list.add(GeoPoint::new(47.0010, 8.0000));
        list.add(GeoPoint::new(47.0020, 8.0000));
        list
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut list = WaypointList::new();
        let first = list.add(GeoPoint::new(1.0, 2.0));
        assert_eq!(first.id, 1);
        assert_eq!(first.name, "WP 1");
        assert_eq!(list.selected_id(), Some(1));

        let second = list.add(GeoPoint::new(1.5, 2.5));
        assert_eq!(second.id, 2);
        assert_eq!(list.selected_id(), Some(2));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_add_uses_max_id_not_length() {
        let mut list = WaypointList::from_waypoints(vec![
            Waypoint::at(7, GeoPoint::new(0.0, 0.0)),
            Waypoint::at(3, GeoPoint::new(0.0, 0.0)),
        ]);
        assert_eq!(list.add(GeoPoint::new(1.0, 1.0)).id, 8);
    }

    #[test]
    fn test_next_id_wraps_at_max() {
        let last = Waypoint::at(i32::MAX, GeoPoint::new(47.0, 8.0));
        let mut list = WaypointList::from_waypoints(vec![last]);
        let added = list.add(GeoPoint::new(47.1, 8.1));
        assert_eq!(added.id, i32::MIN);
        assert_eq!(list.len(), 2);
        assert_eq!(list.selected_id(), Some(i32::MIN));
    }

    #[test]
    fn test_clear() {
        let mut list = trail();
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.selected_id(), None);
        assert_eq!(list.next_id(), 1);
    }

    #[test]
    fn test_select() {
        let mut list = trail();
        assert!(list.select(1));
        assert_eq!(list.selected().map(|w| w.name.as_str()), Some("WP 1"));
        assert!(!list.select(42));
        assert_eq!(list.selected_id(), Some(1));
    }

    #[test]
    fn test_replace_drops_dangling_selection() {
        let mut list = trail();
        list.select(2);
        list.replace(vec![Waypoint::at(1, GeoPoint::new(47.0, 8.0))]);
        assert_eq!(list.selected_id(), None);

        let mut list = trail();
        list.select(1);
        list.replace(vec![Waypoint::at(1, GeoPoint::new(47.0, 8.0))]);
        assert_eq!(list.selected_id(), Some(1));
    }

    #[test]
    fn test_auto_advance_within_radius() {
        let mut list = trail();
        assert_eq!(list.selected_id(), Some(3));

        let near_third = GeoPoint::new(47.00204, 8.0);
        assert_eq!(list.auto_advance(near_third, 10.0), Some(2));
        assert_eq!(list.selected_id(), Some(2));
    }

    #[test]
    fn test_auto_advance_radius_is_inclusive() {
        let here = GeoPoint::new(47.00215, 8.0);
        let third = GeoPoint::new(47.0020, 8.0);
        let exact = distance_meters(here, third);

        let mut list = trail();
        assert_eq!(list.auto_advance(here, exact), Some(2));

        let mut list = trail();
        assert_eq!(list.auto_advance(here, exact - 1e-6), None);
        assert_eq!(list.selected_id(), Some(3));
    }

    #[test]
    fn test_auto_advance_outside_radius() {
        let mut list = trail();
        let far = GeoPoint::new(47.0025, 8.0);
        assert_eq!(list.auto_advance(far, 10.0), None);
        assert_eq!(list.selected_id(), Some(3));
    }

    #[test]
    fn test_auto_advance_stops_at_first() {
        let mut list = trail();
        list.select(1);
        assert_eq!(list.auto_advance(GeoPoint::new(47.0, 8.0), 10.0), None);
        assert_eq!(list.selected_id(), Some(1));
    }

    #[test]
    fn test_auto_advance_without_selection() {
        let mut list = WaypointList::from_waypoints(trail().waypoints().to_vec());
        assert_eq!(list.auto_advance(GeoPoint::new(47.002, 8.0), 10.0), None);
    }
}
