//! Floor-plan data model.
//!
//! Holds the topological description of a single-story building: walls with
//! start/end points in plan units, rooms bounded by ordered wall lists,
//! window/door openings attached to a parent wall, and the ordered wall loop
//! forming the roof perimeter.
//!
//! The model is pure data plus derived queries: length and orientation are
//! never stored, they are always computed from the endpoints. Mutation happens
//! in the external 2D editor; the 3D viewer only reads the [`Plan`] resource
//! and must be told explicitly (via its unload operations) when an entity has
//! been deleted.

use bevy::prelude::*;

/// A point in plan units (the 2D editor's native coordinate space).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlanPoint {
    pub x: f32,
    pub y: f32,
}

impl PlanPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A straight wall segment. Invariant: `start != end` (a degenerate wall is
/// skipped by the viewer rather than rejected here, since the editor owns
/// validation).
#[derive(Debug, Clone)]
pub struct Wall {
    pub id: u32,
    pub start: PlanPoint,
    pub end: PlanPoint,
    /// Wall height in plan units.
    pub height: f32,
}

impl Wall {
    pub fn new(id: u32, start: PlanPoint, end: PlanPoint, height: f32) -> Self {
        Self {
            id,
            start,
            end,
            height,
        }
    }

    /// Segment length in plan units.
    pub fn length(&self) -> f32 {
        (self.end.x - self.start.x).hypot(self.end.y - self.start.y)
    }

    pub fn midpoint(&self) -> PlanPoint {
        PlanPoint::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }
}

/// A room bounded by an ordered list of wall ids. The list is assumed to be
/// in connected perimeter order; the floor builder walks it as-is.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: u32,
    pub wall_ids: Vec<u32>,
}

/// A window or door instance attached to exactly one wall. Which of the two
/// it is depends on the list it lives in ([`Plan::windows`] / [`Plan::doors`]).
#[derive(Debug, Clone)]
pub struct Opening {
    pub id: u32,
    pub center: PlanPoint,
    pub parent_wall: u32,
}

/// The complete floor plan, shared with the 3D viewer as a resource.
#[derive(Resource, Debug, Clone, Default)]
pub struct Plan {
    pub walls: Vec<Wall>,
    pub rooms: Vec<Room>,
    pub windows: Vec<Opening>,
    pub doors: Vec<Opening>,
    /// Ordered wall ids forming a closed roof perimeter; empty means no roof.
    pub roof: Vec<u32>,
}

impl Plan {
    pub fn find_wall(&self, id: u32) -> Option<&Wall> {
        self.walls.iter().find(|w| w.id == id)
    }

    /// Wall length in plan units, `None` for an unknown id.
    pub fn wall_length(&self, id: u32) -> Option<f32> {
        self.find_wall(id).map(Wall::length)
    }

    pub fn wall_midpoint(&self, id: u32) -> Option<PlanPoint> {
        self.find_wall(id).map(Wall::midpoint)
    }

    /// Roof perimeter walls in stored order. Ids that no longer resolve are
    /// silently dropped, producing incomplete (never panicking) geometry.
    pub fn roof_walls(&self) -> impl Iterator<Item = &Wall> {
        self.roof.iter().filter_map(|id| self.find_wall(*id))
    }

    pub fn windows_on(&self, wall_id: u32) -> impl Iterator<Item = &Opening> {
        self.windows.iter().filter(move |o| o.parent_wall == wall_id)
    }

    pub fn doors_on(&self, wall_id: u32) -> impl Iterator<Item = &Opening> {
        self.doors.iter().filter(move |o| o.parent_wall == wall_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Plan {
        Plan {
            walls: vec![
                Wall::new(1, PlanPoint::new(0.0, 0.0), PlanPoint::new(300.0, 0.0), 120.0),
                Wall::new(
                    2,
                    PlanPoint::new(300.0, 0.0),
                    PlanPoint::new(300.0, 300.0),
                    120.0,
                ),
            ],
            rooms: vec![Room {
                id: 7,
                wall_ids: vec![1, 2],
            }],
            windows: vec![Opening {
                id: 11,
                center: PlanPoint::new(150.0, 0.0),
                parent_wall: 1,
            }],
            doors: vec![Opening {
                id: 12,
                center: PlanPoint::new(300.0, 150.0),
                parent_wall: 2,
            }],
            roof: vec![1, 2],
        }
    }

    #[test]
    fn wall_length_is_derived() {
        let plan = sample();
        assert_eq!(plan.wall_length(1), Some(300.0));
        assert_eq!(plan.wall_length(2), Some(300.0));
        assert_eq!(plan.wall_length(99), None);
    }

    #[test]
    fn wall_midpoint_is_segment_center() {
        let plan = sample();
        let mid = plan.wall_midpoint(1).unwrap();
        assert_eq!(mid, PlanPoint::new(150.0, 0.0));
    }

    #[test]
    fn openings_filter_by_parent_wall() {
        let plan = sample();
        assert_eq!(plan.windows_on(1).count(), 1);
        assert_eq!(plan.windows_on(2).count(), 0);
        assert_eq!(plan.doors_on(2).count(), 1);
    }

    #[test]
    fn roof_walls_skip_unresolvable_ids() {
        let mut plan = sample();
        plan.roof.push(42);
        assert_eq!(plan.roof_walls().count(), 2);
    }
}
