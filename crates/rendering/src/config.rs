//! Shared geometry and material constants for the 3D viewer.

/// Plan units per scene unit: every plan coordinate is divided by this.
pub const PLAN_SCALE: f32 = 30.0;

/// Wall slab thickness in scene units.
pub const WALL_THICKNESS: f32 = 0.5;

/// Walls are built slightly short of `length + thickness` so abutting
/// segments don't z-fight at corners.
pub const WALL_LENGTH_TRIM: f32 = 0.1;

/// Horizontal texture repeat is `length / WALL_REPEAT_DIVISOR`, which keeps
/// brick/plaster scale constant regardless of wall length.
pub const WALL_REPEAT_DIVISOR: f32 = 4.0;

/// Floor slabs extrude this far downward from y = 0.
pub const FLOOR_DEPTH: f32 = 0.2;

/// Floor outlines are inset by this many plan units on both axes so the slab
/// tucks under the walls.
pub const FLOOR_INSET: f32 = 0.5;

/// All floors share one repeat vector, so they tile identically regardless
/// of room size.
pub const FLOOR_REPEAT: (f32, f32) = (0.5, 0.5);

/// Apex rise above eave height, in plan units.
pub const ROOF_RISE: f32 = 120.0;

/// Roof repeat density is the perimeter bounding box divided by this, making
/// tiling independent of building footprint size.
pub const ROOF_REPEAT_DIVISOR: f32 = 16.0;

/// Window panel half-extents as fractions of scene wall height.
pub const WINDOW_HALF_WIDTH: f32 = 0.4;
pub const WINDOW_HALF_HEIGHT: f32 = 0.3;

/// Door panel half-extents as fractions of scene wall height.
pub const DOOR_HALF_WIDTH: f32 = 0.2;
pub const DOOR_HALF_HEIGHT: f32 = 0.4;

/// Window centers sit at this fraction of wall height (eye-level bias).
pub const WINDOW_CENTER_FRACTION: f32 = 0.6;

/// Frame outlines grow outward from the panel by this margin, scene units.
pub const FRAME_MARGIN: f32 = 0.1;

/// Frames use a fixed small repeat independent of opening size.
pub const FRAME_REPEAT: f32 = 0.3;

/// Opening panels extrude 1.5x the wall thickness so they poke through both
/// wall faces.
pub const PANEL_DEPTH_FACTOR: f32 = 1.5;
