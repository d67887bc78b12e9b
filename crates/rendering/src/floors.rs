//! Floor surface builder.

use bevy::math::Affine2;
use bevy::prelude::*;
use std::f32::consts::FRAC_PI_2;

use plan::{Plan, PlanPoint, Room};

use crate::config::{FLOOR_DEPTH, FLOOR_INSET, FLOOR_REPEAT};
use crate::geometry::{extrude_polygon, scene_point};
use crate::materials::{MaterialCategory, MaterialRegistry};
use crate::textures::TextureLibrary;

/// Build one room's floor slab: walk the room's wall list in stored order
/// (assumed to already be in connected perimeter order; nothing here sorts
/// or validates connectivity), collect each wall's inset start point, and
/// extrude the closed outline downward by a fixed depth.
///
/// Every floor shares one repeat vector, so tiling is identical across rooms
/// regardless of their size. Returns `None` when fewer than three points
/// resolve or no material does.
pub fn build_floor(
    room: &Room,
    plan: &Plan,
    registry: &mut MaterialRegistry,
    library: &TextureLibrary,
    materials: &mut Assets<StandardMaterial>,
) -> Option<(Mesh, Transform, Handle<StandardMaterial>)> {
    let mut outline: Vec<Vec2> = Vec::with_capacity(room.wall_ids.len());
    for wall_id in &room.wall_ids {
        // unknown ids silently produce incomplete geometry
        let Some(wall) = plan.find_wall(*wall_id) else {
            continue;
        };
        let point = scene_point(PlanPoint::new(
            wall.start.x - FLOOR_INSET,
            wall.start.y - FLOOR_INSET,
        ));
        if outline.last() != Some(&point) {
            outline.push(point);
        }
    }
    if outline.first() == outline.last() && outline.len() > 1 {
        outline.pop();
    }
    if outline.len() < 3 {
        return None;
    }

    let handle = registry.resolve(MaterialCategory::Floor, library, materials)?;
    if let Some(mat) = materials.get_mut(&handle) {
        mat.uv_transform = Affine2::from_scale(Vec2::new(FLOOR_REPEAT.0, FLOOR_REPEAT.1));
    }

    let mesh = extrude_polygon(&outline, &[], FLOOR_DEPTH)?;
    // authored in the XY plane; rotating +90° about X lays it into XZ with
    // the extrusion pointing down, top face at y = 0
    let transform = Transform::from_rotation(Quat::from_rotation_x(FRAC_PI_2));
    Some((mesh, transform, handle))
}
