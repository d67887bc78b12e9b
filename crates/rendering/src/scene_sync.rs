//! Incremental scene synchronizer.
//!
//! The plan itself carries no change detection, so the synchronizer keeps an
//! explicit cache from plan object to spawned entity. Load operations are
//! idempotent: an object already in the cache is skipped, so re-running a
//! full sync after an edit only spawns what is missing. Removals go through
//! the unload events; callers must unload explicitly.

use std::collections::HashMap;

use bevy::prelude::*;

use plan::Plan;

use crate::floors::build_floor;
use crate::geometry::to_scene_units;
use crate::materials::MaterialRegistry;
use crate::openings::{build_door, build_door_frame, build_window, build_window_frame};
use crate::roof::build_roof;
use crate::textures::TextureLibrary;
use crate::walls::build_wall;

/// Marker on every entity the synchronizer owns.
#[derive(Component)]
pub struct PlanObject;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKind {
    Wall,
    Floor,
    Window,
    WindowFrame,
    Door,
    DoorFrame,
}

/// Cache key: object kind plus the id of the plan element it came from.
/// Windows and doors are keyed by the opening's own id, so a wall and the
/// openings it hosts are unloaded independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneKey {
    pub kind: SceneKind,
    pub id: u32,
}

impl SceneKey {
    pub const fn new(kind: SceneKind, id: u32) -> Self {
        Self { kind, id }
    }
}

/// Whether the roof singleton should exist. Persists across rebuilds.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ShowRoof(pub bool);

impl Default for ShowRoof {
    fn default() -> Self {
        Self(true)
    }
}

#[derive(Resource, Debug, Default)]
pub struct SceneCache {
    entries: HashMap<SceneKey, Entity>,
    /// The roof is a singleton, not a keyed entry.
    pub roof: Option<Entity>,
}

impl SceneCache {
    pub fn contains(&self, key: SceneKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn entity(&self, key: SceneKey) -> Option<Entity> {
        self.entries.get(&key).copied()
    }

    pub fn insert(&mut self, key: SceneKey, entity: Entity) {
        self.entries.insert(key, entity);
    }

    pub fn take(&mut self, key: SceneKey) -> Option<Entity> {
        self.entries.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.roof.is_none()
    }

    fn drain(&mut self) -> Vec<Entity> {
        let mut all: Vec<Entity> = self.entries.drain().map(|(_, e)| e).collect();
        all.extend(self.roof.take());
        all
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Event, Debug, Clone, Copy)]
pub struct ToggleRoof(pub bool);

/// Tear the whole scene down and rebuild it from the current plan.
#[derive(Event, Debug, Clone, Copy)]
pub struct RebuildScene;

#[derive(Event, Debug, Clone, Copy)]
pub struct UnloadWall(pub u32);

#[derive(Event, Debug, Clone, Copy)]
pub struct UnloadFloor(pub u32);

// ---------------------------------------------------------------------------
// Sync helpers, shared by the load systems and the rebuild handler
// ---------------------------------------------------------------------------

fn spawn_object(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    mesh: Mesh,
    transform: Transform,
    material: Handle<StandardMaterial>,
) -> Entity {
    commands
        .spawn((
            Mesh3d(meshes.add(mesh)),
            MeshMaterial3d(material),
            transform,
            PlanObject,
        ))
        .id()
}

fn sync_walls(
    commands: &mut Commands,
    plan: &Plan,
    cache: &mut SceneCache,
    registry: &mut MaterialRegistry,
    library: &TextureLibrary,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    for wall in &plan.walls {
        let key = SceneKey::new(SceneKind::Wall, wall.id);
        if !cache.contains(key) {
            let length = to_scene_units(wall.length());
            if let Some((mesh, transform, material)) =
                build_wall(wall, length, registry, library, materials)
            {
                let entity = spawn_object(commands, meshes, mesh, transform, material);
                cache.insert(key, entity);
            }
        }

        // a wall that failed to build hosts nothing; skipping its openings
        // keeps them from floating in empty space
        if !cache.contains(key) {
            continue;
        }

        for window in plan.windows_on(wall.id) {
            let panel = SceneKey::new(SceneKind::Window, window.id);
            if !cache.contains(panel) {
                if let Some((mesh, transform, material)) =
                    build_window(window, wall, registry, library, materials)
                {
                    let entity = spawn_object(commands, meshes, mesh, transform, material);
                    cache.insert(panel, entity);
                }
            }
            let frame = SceneKey::new(SceneKind::WindowFrame, window.id);
            if !cache.contains(frame) {
                if let Some((mesh, transform, material)) =
                    build_window_frame(window, wall, registry, library, materials)
                {
                    let entity = spawn_object(commands, meshes, mesh, transform, material);
                    cache.insert(frame, entity);
                }
            }
        }

        for door in plan.doors_on(wall.id) {
            let panel = SceneKey::new(SceneKind::Door, door.id);
            if !cache.contains(panel) {
                if let Some((mesh, transform, material)) =
                    build_door(door, wall, registry, library, materials)
                {
                    let entity = spawn_object(commands, meshes, mesh, transform, material);
                    cache.insert(panel, entity);
                }
            }
            let frame = SceneKey::new(SceneKind::DoorFrame, door.id);
            if !cache.contains(frame) {
                if let Some((mesh, transform, material)) =
                    build_door_frame(door, wall, registry, library, materials)
                {
                    let entity = spawn_object(commands, meshes, mesh, transform, material);
                    cache.insert(frame, entity);
                }
            }
        }
    }
}

fn sync_floors(
    commands: &mut Commands,
    plan: &Plan,
    cache: &mut SceneCache,
    registry: &mut MaterialRegistry,
    library: &TextureLibrary,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    for room in &plan.rooms {
        let key = SceneKey::new(SceneKind::Floor, room.id);
        if cache.contains(key) {
            continue;
        }
        if let Some((mesh, transform, material)) =
            build_floor(room, plan, registry, library, materials)
        {
            let entity = spawn_object(commands, meshes, mesh, transform, material);
            cache.insert(key, entity);
        }
    }
}

fn sync_roof(
    commands: &mut Commands,
    plan: &Plan,
    cache: &mut SceneCache,
    show: ShowRoof,
    registry: &mut MaterialRegistry,
    library: &TextureLibrary,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    if !show.0 || cache.roof.is_some() {
        return;
    }
    if let Some((mesh, transform, material)) = build_roof(plan, registry, library, materials) {
        let entity = spawn_object(commands, meshes, mesh, transform, material);
        cache.roof = Some(entity);
    }
}

fn despawn_roof(commands: &mut Commands, cache: &mut SceneCache) {
    if let Some(entity) = cache.roof.take() {
        commands.entity(entity).despawn();
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

pub fn load_walls(
    mut commands: Commands,
    plan: Res<Plan>,
    mut cache: ResMut<SceneCache>,
    mut registry: ResMut<MaterialRegistry>,
    library: Res<TextureLibrary>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    sync_walls(
        &mut commands,
        &plan,
        &mut cache,
        &mut registry,
        &library,
        &mut meshes,
        &mut materials,
    );
}

pub fn load_floors(
    mut commands: Commands,
    plan: Res<Plan>,
    mut cache: ResMut<SceneCache>,
    mut registry: ResMut<MaterialRegistry>,
    library: Res<TextureLibrary>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    sync_floors(
        &mut commands,
        &plan,
        &mut cache,
        &mut registry,
        &library,
        &mut meshes,
        &mut materials,
    );
}

pub fn load_roof(
    mut commands: Commands,
    plan: Res<Plan>,
    mut cache: ResMut<SceneCache>,
    show: Res<ShowRoof>,
    mut registry: ResMut<MaterialRegistry>,
    library: Res<TextureLibrary>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    sync_roof(
        &mut commands,
        &plan,
        &mut cache,
        *show,
        &mut registry,
        &library,
        &mut meshes,
        &mut materials,
    );
}

/// Toggling the roof builds or destroys the singleton mesh, never hides it.
pub fn handle_toggle_roof(
    mut events: EventReader<ToggleRoof>,
    mut commands: Commands,
    plan: Res<Plan>,
    mut cache: ResMut<SceneCache>,
    mut show: ResMut<ShowRoof>,
    mut registry: ResMut<MaterialRegistry>,
    library: Res<TextureLibrary>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for ToggleRoof(on) in events.read().copied() {
        show.0 = on;
        if on {
            sync_roof(
                &mut commands,
                &plan,
                &mut cache,
                *show,
                &mut registry,
                &library,
                &mut meshes,
                &mut materials,
            );
        } else {
            despawn_roof(&mut commands, &mut cache);
        }
    }
}

pub fn handle_unload_wall(
    mut events: EventReader<UnloadWall>,
    mut commands: Commands,
    mut cache: ResMut<SceneCache>,
) {
    for UnloadWall(id) in events.read().copied() {
        if let Some(entity) = cache.take(SceneKey::new(SceneKind::Wall, id)) {
            commands.entity(entity).despawn();
        }
    }
}

pub fn handle_unload_floor(
    mut events: EventReader<UnloadFloor>,
    mut commands: Commands,
    mut cache: ResMut<SceneCache>,
) {
    for UnloadFloor(id) in events.read().copied() {
        if let Some(entity) = cache.take(SceneKey::new(SceneKind::Floor, id)) {
            commands.entity(entity).despawn();
        }
    }
}

/// Full teardown and reload. Runs after plan edits too large for the
/// incremental path, then repaints every cached material.
pub fn handle_rebuild(
    mut events: EventReader<RebuildScene>,
    mut commands: Commands,
    plan: Res<Plan>,
    mut cache: ResMut<SceneCache>,
    show: Res<ShowRoof>,
    mut registry: ResMut<MaterialRegistry>,
    library: Res<TextureLibrary>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if events.is_empty() {
        return;
    }
    events.clear();

    for entity in cache.drain() {
        commands.entity(entity).despawn();
    }
    sync_walls(
        &mut commands,
        &plan,
        &mut cache,
        &mut registry,
        &library,
        &mut meshes,
        &mut materials,
    );
    sync_floors(
        &mut commands,
        &plan,
        &mut cache,
        &mut registry,
        &library,
        &mut meshes,
        &mut materials,
    );
    sync_roof(
        &mut commands,
        &plan,
        &mut cache,
        *show,
        &mut registry,
        &library,
        &mut meshes,
        &mut materials,
    );
    registry.update_all_materials(&mut materials);
}

/// Coarse repaint fallback: reapply the shared shading parameters to every
/// material still referenced by a spawned plan object.
pub fn refresh_materials(
    query: Query<&MeshMaterial3d<StandardMaterial>, With<PlanObject>>,
    registry: Res<MaterialRegistry>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for handle in &query {
        if let Some(mat) = materials.get_mut(&handle.0) {
            registry.shading.apply(mat);
        }
    }
}
