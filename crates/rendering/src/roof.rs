//! Roof surface builder: a double-sided fan ("tent") over the ordered roof
//! perimeter, which handles convex and non-convex footprints without a
//! general polygon triangulator.

use bevy::math::Affine2;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

use plan::Plan;

use crate::config::{ROOF_REPEAT_DIVISOR, ROOF_RISE};
use crate::geometry::{scene_point, to_scene_units};
use crate::materials::{MaterialCategory, MaterialRegistry};
use crate::textures::TextureLibrary;

/// Build the roof mesh from the plan's roof perimeter. Returns `None` when
/// the perimeter is empty.
///
/// Perimeter points are deduplicated by exact coordinate pair while keeping
/// wall order. Each point contributes a "base" and a "top" vertex, both
/// pinned to the first wall's height (uniform-height perimeters are
/// assumed), and the centroid apex rises a fixed amount above the
/// eave. Every consecutive point pair emits one apex triangle per side, so N
/// unique points produce exactly 2N triangles.
pub fn build_roof(
    plan: &Plan,
    registry: &mut MaterialRegistry,
    library: &TextureLibrary,
    materials: &mut Assets<StandardMaterial>,
) -> Option<(Mesh, Transform, Handle<StandardMaterial>)> {
    let mut points: Vec<Vec2> = Vec::new();
    let mut seen: Vec<(u32, u32)> = Vec::new();
    let mut eave = None;
    for wall in plan.roof_walls() {
        eave.get_or_insert(wall.height);
        for p in [wall.start, wall.end] {
            let key = (p.x.to_bits(), p.y.to_bits());
            if !seen.contains(&key) {
                seen.push(key);
                points.push(scene_point(p));
            }
        }
    }
    let eave = to_scene_units(eave?);
    let apex_height = eave + to_scene_units(ROOF_RISE);
    if points.is_empty() {
        return None;
    }

    let centroid = points.iter().sum::<Vec2>() / points.len() as f32;
    let min = points.iter().copied().reduce(Vec2::min).unwrap_or_default();
    let max = points.iter().copied().reduce(Vec2::max).unwrap_or_default();
    let extent = (max - min).max(Vec2::splat(f32::EPSILON));

    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(points.len() * 2 + 1);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(points.len() * 2 + 1);
    for p in &points {
        let uv = [(p.x - min.x) / extent.x, (p.y - min.y) / extent.y];
        // base and top slots share a position today; the pair exists so the
        // two fan sides can smooth their normals independently
        positions.push([p.x, eave, p.y]);
        uvs.push(uv);
        positions.push([p.x, eave, p.y]);
        uvs.push(uv);
    }
    let apex = (points.len() * 2) as u32;
    positions.push([centroid.x, apex_height, centroid.y]);
    uvs.push([0.5, 0.5]);

    let mut indices: Vec<u32> = Vec::with_capacity(points.len() * 6);
    for i in 0..points.len() as u32 {
        let next = (i + 1) % points.len() as u32;
        // outer face, then the reversed under-roof face
        indices.extend_from_slice(&[i * 2, next * 2, apex]);
        indices.extend_from_slice(&[next * 2 + 1, i * 2 + 1, apex]);
    }

    let handle = registry.resolve(MaterialCategory::Roof, library, materials)?;
    if let Some(mat) = materials.get_mut(&handle) {
        mat.uv_transform = Affine2::from_scale(Vec2::new(
            extent.x / ROOF_REPEAT_DIVISOR,
            extent.y / ROOF_REPEAT_DIVISOR,
        ));
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD | RenderAssetUsages::MAIN_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_indices(Indices::U32(indices));
    mesh.compute_smooth_normals();

    Some((mesh, Transform::IDENTITY, handle))
}
