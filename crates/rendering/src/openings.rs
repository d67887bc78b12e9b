//! Window and door builders.
//!
//! Both opening kinds follow one pattern: a panel box plus a frame ring
//! (the panel outline grown by a margin, with the panel carved out as a
//! hole). Shapes are authored in a wall-local frame centered at the origin,
//! then rotated by the parent wall's yaw and translated to the opening's
//! position. Builders only emit for the wall currently being synchronized.

use bevy::math::Affine2;
use bevy::prelude::*;

use plan::{Opening, Wall};

use crate::config::{
    DOOR_HALF_HEIGHT, DOOR_HALF_WIDTH, FRAME_MARGIN, FRAME_REPEAT, PANEL_DEPTH_FACTOR,
    WALL_THICKNESS, WINDOW_CENTER_FRACTION, WINDOW_HALF_HEIGHT, WINDOW_HALF_WIDTH,
};
use crate::geometry::{extrude_polygon, scene_point, to_scene_units, wall_yaw};
use crate::materials::{MaterialCategory, MaterialRegistry};
use crate::textures::TextureLibrary;

fn opening_transform(opening: &Opening, wall: &Wall, center_height: f32) -> Transform {
    let center = scene_point(opening.center);
    Transform {
        translation: Vec3::new(center.x, center_height, center.y),
        rotation: wall_yaw(wall),
        ..default()
    }
}

fn rect_outline(half_width: f32, half_height: f32) -> Vec<Vec2> {
    vec![
        Vec2::new(-half_width, -half_height),
        Vec2::new(half_width, -half_height),
        Vec2::new(half_width, half_height),
        Vec2::new(-half_width, half_height),
    ]
}

/// Frame ring: the panel rectangle grown by [`FRAME_MARGIN`] with the panel
/// itself carved out as a hole, extruded through the wall and centered on
/// its plane.
fn frame_mesh(half_width: f32, half_height: f32) -> Option<Mesh> {
    let outer = rect_outline(half_width + FRAME_MARGIN, half_height + FRAME_MARGIN);
    let hole = rect_outline(half_width, half_height);
    let mesh = extrude_polygon(&outer, &[hole], WALL_THICKNESS)?;
    Some(mesh.translated_by(Vec3::new(0.0, 0.0, -WALL_THICKNESS / 2.0)))
}

fn set_frame_repeat(handle: &Handle<StandardMaterial>, materials: &mut Assets<StandardMaterial>) {
    if let Some(mat) = materials.get_mut(handle) {
        mat.uv_transform = Affine2::from_scale(Vec2::splat(FRAME_REPEAT));
    }
}

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

/// Glass panel for one window. The material is transmissive and built fresh
/// per call; glass is never cached or live-updated. `None` when the opening
/// belongs to another wall or no window-frame texture set resolves.
pub fn build_window(
    opening: &Opening,
    wall: &Wall,
    registry: &mut MaterialRegistry,
    library: &TextureLibrary,
    materials: &mut Assets<StandardMaterial>,
) -> Option<(Mesh, Transform, Handle<StandardMaterial>)> {
    if opening.parent_wall != wall.id {
        return None;
    }
    let height = to_scene_units(wall.height);
    let set = registry.resolve_set(MaterialCategory::WindowFrame, library)?;
    let handle = materials.add(registry.glass_material(&set));

    let mesh = Mesh::from(Cuboid::new(
        WINDOW_HALF_WIDTH * height * 2.0,
        WINDOW_HALF_HEIGHT * height * 2.0,
        WALL_THICKNESS * PANEL_DEPTH_FACTOR,
    ));
    let transform = opening_transform(opening, wall, WINDOW_CENTER_FRACTION * height);
    Some((mesh, transform, handle))
}

/// Frame ring around a window, using the shared cached window-frame
/// material.
pub fn build_window_frame(
    opening: &Opening,
    wall: &Wall,
    registry: &mut MaterialRegistry,
    library: &TextureLibrary,
    materials: &mut Assets<StandardMaterial>,
) -> Option<(Mesh, Transform, Handle<StandardMaterial>)> {
    if opening.parent_wall != wall.id {
        return None;
    }
    let height = to_scene_units(wall.height);
    let handle = registry.resolve(MaterialCategory::WindowFrame, library, materials)?;
    set_frame_repeat(&handle, materials);

    let mesh = frame_mesh(WINDOW_HALF_WIDTH * height, WINDOW_HALF_HEIGHT * height)?;
    let transform = opening_transform(opening, wall, WINDOW_CENTER_FRACTION * height);
    Some((mesh, transform, handle))
}

// ---------------------------------------------------------------------------
// Doors
// ---------------------------------------------------------------------------

/// Door slab, vertically placed so it meets the floor (center at its own
/// half-height).
pub fn build_door(
    opening: &Opening,
    wall: &Wall,
    registry: &mut MaterialRegistry,
    library: &TextureLibrary,
    materials: &mut Assets<StandardMaterial>,
) -> Option<(Mesh, Transform, Handle<StandardMaterial>)> {
    if opening.parent_wall != wall.id {
        return None;
    }
    let height = to_scene_units(wall.height);
    let handle = registry.resolve(MaterialCategory::Door, library, materials)?;

    let mesh = Mesh::from(Cuboid::new(
        DOOR_HALF_WIDTH * height * 2.0,
        DOOR_HALF_HEIGHT * height * 2.0,
        WALL_THICKNESS * PANEL_DEPTH_FACTOR,
    ));
    let transform = opening_transform(opening, wall, DOOR_HALF_HEIGHT * height);
    Some((mesh, transform, handle))
}

/// Frame ring around a door, using the shared cached door-frame material.
pub fn build_door_frame(
    opening: &Opening,
    wall: &Wall,
    registry: &mut MaterialRegistry,
    library: &TextureLibrary,
    materials: &mut Assets<StandardMaterial>,
) -> Option<(Mesh, Transform, Handle<StandardMaterial>)> {
    if opening.parent_wall != wall.id {
        return None;
    }
    let height = to_scene_units(wall.height);
    let handle = registry.resolve(MaterialCategory::DoorFrame, library, materials)?;
    set_frame_repeat(&handle, materials);

    let mesh = frame_mesh(DOOR_HALF_WIDTH * height, DOOR_HALF_HEIGHT * height)?;
    let transform = opening_transform(opening, wall, DOOR_HALF_HEIGHT * height);
    Some((mesh, transform, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::TextureSet;
    use plan::PlanPoint;

    fn weak_set() -> TextureSet {
        TextureSet {
            color: Handle::weak_from_u128(1),
            normal: Handle::weak_from_u128(2),
            height: Handle::weak_from_u128(3),
        }
    }

    fn horizontal_wall() -> Wall {
        Wall::new(1, PlanPoint::new(0.0, 0.0), PlanPoint::new(300.0, 0.0), 300.0)
    }

    fn window_on(wall_id: u32) -> Opening {
        Opening {
            id: 11,
            center: PlanPoint::new(150.0, 0.0),
            parent_wall: wall_id,
        }
    }

    #[test]
    fn foreign_wall_emits_nothing() {
        let wall = horizontal_wall();
        let mut registry = MaterialRegistry::default();
        registry.register(MaterialCategory::WindowFrame, 2734, weak_set());
        let library = TextureLibrary::default();
        let mut materials = Assets::<StandardMaterial>::default();

        let opening = window_on(99);
        assert!(build_window(&opening, &wall, &mut registry, &library, &mut materials).is_none());
        assert!(
            build_window_frame(&opening, &wall, &mut registry, &library, &mut materials).is_none()
        );
    }

    #[test]
    fn glass_panel_material_is_fresh_per_call() {
        let wall = horizontal_wall();
        let mut registry = MaterialRegistry::default();
        registry.register(MaterialCategory::WindowFrame, 2734, weak_set());
        let library = TextureLibrary::default();
        let mut materials = Assets::<StandardMaterial>::default();

        let opening = window_on(1);
        let (_, _, a) =
            build_window(&opening, &wall, &mut registry, &library, &mut materials).unwrap();
        let (_, _, b) =
            build_window(&opening, &wall, &mut registry, &library, &mut materials).unwrap();
        assert_ne!(a, b);
        assert!(materials.get(&a).unwrap().specular_transmission > 0.9);
    }

    #[test]
    fn window_sits_at_sixty_percent_of_wall_height() {
        let wall = horizontal_wall();
        let mut registry = MaterialRegistry::default();
        registry.register(MaterialCategory::WindowFrame, 2734, weak_set());
        let library = TextureLibrary::default();
        let mut materials = Assets::<StandardMaterial>::default();

        let (_, transform, _) =
            build_window(&window_on(1), &wall, &mut registry, &library, &mut materials).unwrap();
        // wall height 300 plan units → 10 scene units → center at 6.0
        assert_eq!(transform.translation, Vec3::new(5.0, 6.0, 0.0));
    }

    #[test]
    fn door_reaches_the_floor() {
        let wall = horizontal_wall();
        let mut registry = MaterialRegistry::default();
        registry.register(MaterialCategory::Door, 2734, weak_set());
        let library = TextureLibrary::default();
        let mut materials = Assets::<StandardMaterial>::default();

        let door = Opening {
            id: 12,
            center: PlanPoint::new(150.0, 0.0),
            parent_wall: 1,
        };
        let (_, transform, _) =
            build_door(&door, &wall, &mut registry, &library, &mut materials).unwrap();
        // center at half the slab height: bottom edge lands on y = 0
        assert_eq!(transform.translation.y, DOOR_HALF_HEIGHT * 10.0);
    }

    #[test]
    fn frame_repeat_is_fixed_and_small() {
        let wall = horizontal_wall();
        let mut registry = MaterialRegistry::default();
        registry.register(MaterialCategory::DoorFrame, 2734, weak_set());
        let library = TextureLibrary::default();
        let mut materials = Assets::<StandardMaterial>::default();

        let door = Opening {
            id: 12,
            center: PlanPoint::new(150.0, 0.0),
            parent_wall: 1,
        };
        let (_, _, handle) =
            build_door_frame(&door, &wall, &mut registry, &library, &mut materials).unwrap();
        assert_eq!(
            materials.get(&handle).unwrap().uv_transform,
            Affine2::from_scale(Vec2::splat(FRAME_REPEAT))
        );
    }

    #[test]
    fn vertical_wall_rotates_openings_ninety_degrees() {
        let wall = Wall::new(2, PlanPoint::new(60.0, 0.0), PlanPoint::new(60.0, 300.0), 300.0);
        let mut registry = MaterialRegistry::default();
        registry.register(MaterialCategory::Door, 2734, weak_set());
        let library = TextureLibrary::default();
        let mut materials = Assets::<StandardMaterial>::default();

        let door = Opening {
            id: 12,
            center: PlanPoint::new(60.0, 150.0),
            parent_wall: 2,
        };
        let (_, transform, _) =
            build_door(&door, &wall, &mut registry, &library, &mut materials).unwrap();
        let expected = Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2);
        assert!(transform.rotation.angle_between(expected) < 1e-6);
    }
}
