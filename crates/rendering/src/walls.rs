//! Wall surface builder.

use bevy::math::Affine2;
use bevy::prelude::*;

use plan::Wall;

use crate::config::{WALL_LENGTH_TRIM, WALL_REPEAT_DIVISOR, WALL_THICKNESS};
use crate::geometry::{scene_point, to_scene_units, wall_yaw};
use crate::materials::{MaterialCategory, MaterialRegistry};
use crate::textures::TextureLibrary;

/// Build one wall: a rectangular prism sized to the segment, rotated about
/// the vertical axis by the orientation angle and centered at the wall's
/// midpoint at half its height. Sets the shared wall material's horizontal
/// repeat to `length / 4` so brick scale stays constant regardless of wall
/// length. Returns `None` when the length is ~zero or no material resolves.
pub fn build_wall(
    wall: &Wall,
    length: f32,
    registry: &mut MaterialRegistry,
    library: &TextureLibrary,
    materials: &mut Assets<StandardMaterial>,
) -> Option<(Mesh, Transform, Handle<StandardMaterial>)> {
    if length <= f32::EPSILON {
        return None;
    }
    let handle = registry.resolve(MaterialCategory::Wall, library, materials)?;
    if let Some(mat) = materials.get_mut(&handle) {
        mat.uv_transform = Affine2::from_scale(Vec2::new(length / WALL_REPEAT_DIVISOR, 1.0));
    }

    let height = to_scene_units(wall.height);
    let mesh = Mesh::from(Cuboid::new(
        length + WALL_THICKNESS - WALL_LENGTH_TRIM,
        height,
        WALL_THICKNESS,
    ));
    let mid = scene_point(wall.midpoint());
    let transform = Transform {
        translation: Vec3::new(mid.x, height / 2.0, mid.y),
        rotation: wall_yaw(wall),
        ..default()
    };
    Some((mesh, transform, handle))
}
