//! Geometry kernel shared by every builder: plan-to-scene unit conversion,
//! wall orientation classification, and polygon extrusion.
//!
//! Plan space is 2D (x, y); scene space is Y-up with plan y mapped onto
//! scene z. Extrusions are authored in a local XY plane and placed with a
//! [`Transform`], never baked into world space.

use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

use plan::{PlanPoint, Wall};

use crate::config::PLAN_SCALE;

// ---------------------------------------------------------------------------
// Units and angles
// ---------------------------------------------------------------------------

/// Convert one plan coordinate to scene units. Pure, total.
pub fn to_scene_units(coord: f32) -> f32 {
    coord / PLAN_SCALE
}

/// Convert a plan point to a 2D scene-space point (x, plan-y).
pub fn scene_point(p: PlanPoint) -> Vec2 {
    Vec2::new(to_scene_units(p.x), to_scene_units(p.y))
}

/// Axis alignment of a wall segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
    Diagonal,
}

/// Vertical is checked before horizontal, so a degenerate wall with
/// `start == end` classifies as vertical.
pub fn classify_orientation(start: PlanPoint, end: PlanPoint) -> Orientation {
    if start.x == end.x {
        Orientation::Vertical
    } else if start.y == end.y {
        Orientation::Horizontal
    } else {
        Orientation::Diagonal
    }
}

/// Signed angle in (−π, π] between the reference axis (1, 0) and
/// `end − start`, via atan2 of the 2D cross and dot products.
pub fn signed_angle(start: PlanPoint, end: PlanPoint) -> f32 {
    let (rx, ry) = (1.0_f32, 0.0_f32);
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let cross = rx * dy - ry * dx;
    let dot = rx * dx + ry * dy;
    cross.atan2(dot)
}

/// Plan-space rotation angle for a wall. Vertical walls use a fixed π/2
/// rather than the computed angle, to match box rotation conventions.
pub fn wall_angle(wall: &Wall) -> f32 {
    match classify_orientation(wall.start, wall.end) {
        Orientation::Vertical => std::f32::consts::FRAC_PI_2,
        Orientation::Horizontal => 0.0,
        Orientation::Diagonal => signed_angle(wall.start, wall.end),
    }
}

/// Scene-space yaw for a wall. Plan y maps to scene z, which flips
/// handedness, so the yaw is the negated plan-space angle.
pub fn wall_yaw(wall: &Wall) -> Quat {
    Quat::from_rotation_y(-wall_angle(wall))
}

// ---------------------------------------------------------------------------
// Polygon extrusion
// ---------------------------------------------------------------------------

fn signed_area(ring: &[Vec2]) -> f32 {
    let mut area = 0.0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        area += a.x * b.y - b.x * a.y;
    }
    area / 2.0
}

/// Copy a ring with the requested winding (counter-clockwise or not).
fn oriented(ring: &[Vec2], ccw: bool) -> Vec<Vec2> {
    let mut out = ring.to_vec();
    if (signed_area(ring) >= 0.0) != ccw {
        out.reverse();
    }
    out
}

/// Triangulate a polygon (outer ring plus optional holes) into cap indices.
/// Rings may arrive in either winding; `None` when earcut fails.
pub fn triangulate(outline: &[Vec2], holes: &[Vec<Vec2>]) -> Option<Vec<u32>> {
    let rings = normalized_rings(outline, holes)?;
    cap_indices(&rings)
}

fn normalized_rings(outline: &[Vec2], holes: &[Vec<Vec2>]) -> Option<Vec<Vec<Vec2>>> {
    if outline.len() < 3 {
        return None;
    }
    let mut rings = Vec::with_capacity(1 + holes.len());
    rings.push(oriented(outline, true));
    for hole in holes {
        if hole.len() >= 3 {
            rings.push(oriented(hole, false));
        }
    }
    Some(rings)
}

fn cap_indices(rings: &[Vec<Vec2>]) -> Option<Vec<u32>> {
    let mut flat: Vec<f64> = Vec::new();
    let mut hole_starts: Vec<usize> = Vec::new();
    for (i, ring) in rings.iter().enumerate() {
        if i > 0 {
            hole_starts.push(flat.len() / 2);
        }
        for p in ring {
            flat.push(f64::from(p.x));
            flat.push(f64::from(p.y));
        }
    }
    let cap = earcutr::earcut(&flat, &hole_starts, 2).ok()?;
    if cap.is_empty() {
        return None;
    }
    Some(cap.into_iter().map(|i| i as u32).collect())
}

/// Extrude a polygon (with optional holes) along +Z from 0 to `depth`,
/// capping both ends and walling every ring. Cap UVs are the authored
/// coordinates; side UVs run along the perimeter. The caller orients and
/// places the result via its [`Transform`].
pub fn extrude_polygon(outline: &[Vec2], holes: &[Vec<Vec2>], depth: f32) -> Option<Mesh> {
    let rings = normalized_rings(outline, holes)?;
    let cap = cap_indices(&rings)?;
    let total: usize = rings.iter().map(Vec::len).sum();

    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(total * 6);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(total * 6);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(total * 6);
    let mut indices: Vec<u32> = Vec::with_capacity(cap.len() * 2 + total * 6);

    // Front cap (z = depth, facing +Z) then back cap (z = 0, reversed).
    for ring in &rings {
        for p in ring {
            positions.push([p.x, p.y, depth]);
            normals.push([0.0, 0.0, 1.0]);
            uvs.push([p.x, p.y]);
        }
    }
    for ring in &rings {
        for p in ring {
            positions.push([p.x, p.y, 0.0]);
            normals.push([0.0, 0.0, -1.0]);
            uvs.push([p.x, p.y]);
        }
    }
    for tri in cap.chunks_exact(3) {
        indices.extend_from_slice(tri);
        let t = total as u32;
        indices.extend_from_slice(&[tri[2] + t, tri[1] + t, tri[0] + t]);
    }

    // Side quads along every ring. Outer rings are CCW and holes CW, so the
    // same rotated edge vector yields the outward normal for both.
    for ring in &rings {
        let mut run = 0.0;
        for i in 0..ring.len() {
            let a = ring[i];
            let b = ring[(i + 1) % ring.len()];
            let edge = b - a;
            let len = edge.length();
            if len <= f32::EPSILON {
                continue;
            }
            let n = Vec2::new(edge.y, -edge.x) / len;
            let base = positions.len() as u32;
            positions.extend_from_slice(&[
                [a.x, a.y, 0.0],
                [b.x, b.y, 0.0],
                [b.x, b.y, depth],
                [a.x, a.y, depth],
            ]);
            normals.extend_from_slice(&[[n.x, n.y, 0.0]; 4]);
            uvs.extend_from_slice(&[[run, 0.0], [run + len, 0.0], [run + len, depth], [run, depth]]);
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            run += len;
        }
    }

    Some(
        Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(indices)),
    )
}
