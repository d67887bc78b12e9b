//! Texture-set store and the startup loading barrier.
//!
//! `assets/textures.json` lists the environment image and every texture set
//! (id, category, three channel paths). A startup system queues all of them
//! through the asset server with repeating samplers; a `Loading`-state system
//! then polls until every handle resolves. One failed load is fatal to the
//! barrier: the viewer parks in [`ViewerState::Failed`] and never builds a
//! partial scene.

use std::collections::HashMap;

use bevy::asset::{LoadState, UntypedHandle};
use bevy::image::{ImageAddressMode, ImageLoaderSettings, ImageSampler, ImageSamplerDescriptor};
use bevy::prelude::*;
use serde::Deserialize;

use crate::materials::{MaterialCategory, MaterialRegistry, TextureSet};
use crate::ViewerState;

/// Manifest location, relative to the working directory.
pub const MANIFEST_PATH: &str = "assets/textures.json";

/// Categories whose sets are registered eagerly once the barrier resolves;
/// window/door sets register lazily on first use.
const EAGER_CATEGORIES: [MaterialCategory; 3] = [
    MaterialCategory::Wall,
    MaterialCategory::Floor,
    MaterialCategory::Roof,
];

#[derive(Debug, Deserialize)]
pub struct TextureManifest {
    /// Stacked-cubemap environment image, also part of the loading barrier.
    pub environment: String,
    pub sets: Vec<TextureSetEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TextureSetEntry {
    pub id: u32,
    pub category: MaterialCategory,
    pub color: String,
    pub normal: String,
    pub height: String,
}

/// Pre-resolved texture sets queryable by (category, id), plus the
/// environment handle. Populated once at startup, read-only afterwards.
#[derive(Resource, Debug, Default)]
pub struct TextureLibrary {
    sets: HashMap<(MaterialCategory, u32), TextureSet>,
    pub environment: Handle<Image>,
}

impl TextureLibrary {
    pub fn insert(&mut self, category: MaterialCategory, id: u32, set: TextureSet) {
        self.sets.insert((category, id), set);
    }

    pub fn set(&self, category: MaterialCategory, id: u32) -> Option<&TextureSet> {
        self.sets.get(&(category, id))
    }

    pub fn iter_category(
        &self,
        category: MaterialCategory,
    ) -> impl Iterator<Item = (u32, &TextureSet)> {
        self.sets
            .iter()
            .filter(move |((c, _), _)| *c == category)
            .map(|((_, id), set)| (*id, set))
    }

    /// Sorted texture ids known for a category (stable ordering for UI).
    pub fn ids_for(&self, category: MaterialCategory) -> Vec<u32> {
        let mut ids: Vec<u32> = self.iter_category(category).map(|(id, _)| id).collect();
        ids.sort_unstable();
        ids
    }
}

/// Every handle the barrier waits on.
#[derive(Resource, Debug, Default)]
pub struct PendingAssets(pub Vec<UntypedHandle>);

fn load_image(
    asset_server: &AssetServer,
    path: &str,
    is_srgb: bool,
    pending: &mut PendingAssets,
) -> Handle<Image> {
    let path = path.to_owned();
    let handle = asset_server.load_with_settings(path, move |settings: &mut ImageLoaderSettings| {
        settings.is_srgb = is_srgb;
        // uv_transform tiling needs wrap-around sampling
        settings.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
            address_mode_u: ImageAddressMode::Repeat,
            address_mode_v: ImageAddressMode::Repeat,
            ..default()
        });
    });
    pending.0.push(handle.clone().untyped());
    handle
}

/// Startup: parse the manifest and queue every image load. A manifest that
/// cannot be read or parsed is as fatal as a failed texture load.
pub fn queue_texture_loads(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut next: ResMut<NextState<ViewerState>>,
) {
    let manifest = match read_manifest(MANIFEST_PATH) {
        Ok(manifest) => manifest,
        Err(err) => {
            error!("failed to read texture manifest {MANIFEST_PATH}: {err}");
            next.set(ViewerState::Failed);
            return;
        }
    };

    let mut library = TextureLibrary::default();
    let mut pending = PendingAssets::default();

    library.environment = load_image(&asset_server, &manifest.environment, true, &mut pending);
    for entry in &manifest.sets {
        let set = TextureSet {
            color: load_image(&asset_server, &entry.color, true, &mut pending),
            normal: load_image(&asset_server, &entry.normal, false, &mut pending),
            height: load_image(&asset_server, &entry.height, false, &mut pending),
        };
        library.insert(entry.category, entry.id, set);
    }

    info!(
        "queued {} texture images across {} sets",
        pending.0.len(),
        manifest.sets.len()
    );
    commands.insert_resource(library);
    commands.insert_resource(pending);
}

fn read_manifest(path: &str) -> Result<TextureManifest, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

/// Register every library set belonging to an eager category. Runs once
/// when the barrier resolves; lazy categories stay out of the registry
/// until a builder or a selection first asks for them.
pub(crate) fn register_eager_sets(registry: &mut MaterialRegistry, library: &TextureLibrary) {
    for category in EAGER_CATEGORIES {
        for (id, set) in library.iter_category(category) {
            registry.register(category, id, set.clone());
        }
    }
}

/// Join-all barrier over every queued load. All loaded → register the eager
/// categories and enter `Ready`; any failure → `Failed`, no partial scene.
pub fn wait_for_textures(
    pending: Option<Res<PendingAssets>>,
    library: Option<Res<TextureLibrary>>,
    asset_server: Res<AssetServer>,
    mut registry: ResMut<MaterialRegistry>,
    mut next: ResMut<NextState<ViewerState>>,
) {
    let (Some(pending), Some(library)) = (pending, library) else {
        return;
    };
    for handle in &pending.0 {
        match asset_server.load_state(handle.id()) {
            LoadState::Failed(err) => {
                error!("texture load failed: {err}");
                next.set(ViewerState::Failed);
                return;
            }
            LoadState::Loaded => {}
            _ => return, // still in flight; poll again next frame
        }
    }

    register_eager_sets(&mut registry, &library);
    info!("all textures resolved; entering 3D view");
    next.set(ViewerState::Ready);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_parses_categories_and_paths() {
        let json = r#"{
            "environment": "environment/sky.png",
            "sets": [
                {
                    "id": 1634,
                    "category": "wall",
                    "color": "textures/wall_1634_col.png",
                    "normal": "textures/wall_1634_nrm.png",
                    "height": "textures/wall_1634_hgt.png"
                },
                {
                    "id": 2734,
                    "category": "window_frame",
                    "color": "textures/win_2734_col.png",
                    "normal": "textures/win_2734_nrm.png",
                    "height": "textures/win_2734_hgt.png"
                }
            ]
        }"#;
        let manifest: TextureManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.environment, "environment/sky.png");
        assert_eq!(manifest.sets.len(), 2);
        assert_eq!(manifest.sets[0].category, MaterialCategory::Wall);
        assert_eq!(manifest.sets[1].category, MaterialCategory::WindowFrame);
        assert_eq!(manifest.sets[1].id, 2734);
    }

    #[test]
    fn library_lookup_is_keyed_by_category_and_id() {
        let mut library = TextureLibrary::default();
        let set = TextureSet {
            color: Handle::weak_from_u128(1),
            normal: Handle::weak_from_u128(2),
            height: Handle::weak_from_u128(3),
        };
        library.insert(MaterialCategory::Wall, 1634, set.clone());

        assert!(library.set(MaterialCategory::Wall, 1634).is_some());
        assert!(library.set(MaterialCategory::Floor, 1634).is_none());
        assert!(library.set(MaterialCategory::Wall, 9999).is_none());
        assert_eq!(library.ids_for(MaterialCategory::Wall), vec![1634]);
    }
}
