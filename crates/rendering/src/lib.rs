use bevy::prelude::*;

pub mod camera;
pub mod config;
pub mod environment;
pub mod floors;
pub mod geometry;
pub mod materials;
pub mod openings;
pub mod roof;
pub mod scene_sync;
pub mod textures;
pub mod walls;

use materials::{
    apply_shading_changes, apply_texture_selection, MaterialRegistry, SelectTexture, SetMetalness,
    SetRoughness, SetTint,
};
use scene_sync::{
    handle_rebuild, handle_toggle_roof, handle_unload_floor, handle_unload_wall, load_floors,
    load_roof, load_walls, RebuildScene, SceneCache, ShowRoof, ToggleRoof, UnloadFloor, UnloadWall,
};
use textures::{queue_texture_loads, wait_for_textures, PendingAssets, TextureLibrary};

/// Viewer lifecycle. The scene is built only after every texture in the
/// manifest has loaded; one failed load parks the viewer in `Failed`.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewerState {
    #[default]
    Loading,
    Ready,
    Failed,
}

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<ViewerState>()
            .init_resource::<MaterialRegistry>()
            .init_resource::<TextureLibrary>()
            .init_resource::<PendingAssets>()
            .init_resource::<SceneCache>()
            .init_resource::<ShowRoof>()
            .add_event::<SelectTexture>()
            .add_event::<SetRoughness>()
            .add_event::<SetMetalness>()
            .add_event::<SetTint>()
            .add_event::<ToggleRoof>()
            .add_event::<RebuildScene>()
            .add_event::<UnloadWall>()
            .add_event::<UnloadFloor>()
            .add_systems(
                Startup,
                (
                    camera::setup_camera,
                    environment::setup_lights,
                    queue_texture_loads,
                ),
            )
            .add_systems(
                Update,
                wait_for_textures.run_if(in_state(ViewerState::Loading)),
            )
            .add_systems(
                OnEnter(ViewerState::Ready),
                (
                    environment::attach_skybox,
                    load_walls,
                    load_floors,
                    load_roof,
                    scene_sync::refresh_materials,
                )
                    .chain(),
            )
            // Handlers stay chained so a rebuild never interleaves with the
            // incremental paths within one frame.
            .add_systems(
                Update,
                (
                    apply_texture_selection,
                    apply_shading_changes,
                    handle_toggle_roof,
                    handle_unload_wall,
                    handle_unload_floor,
                    handle_rebuild,
                )
                    .chain()
                    .run_if(in_state(ViewerState::Ready)),
            )
            .add_systems(
                Update,
                (
                    camera::camera_orbit_drag,
                    camera::camera_pan_drag,
                    camera::camera_zoom,
                    camera::apply_orbit_camera,
                )
                    .chain(),
            );
    }
}
