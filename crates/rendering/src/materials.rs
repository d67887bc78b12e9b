//! Per-category material registry.
//!
//! Each shading category owns a [`MaterialSlot`]: the id→texture-set
//! registrations, lazily built `StandardMaterial` handles, the currently
//! selected texture id, and the "active" material pointer that live updates
//! mutate in place. Two update paths exist and must not be confused:
//!
//! - **Selection change** swaps the three channel textures onto the existing
//!   active material, preserving its `uv_transform` so per-surface tiling
//!   survives (no texture popping, no geometry rebuild).
//! - **Shading-parameter change** overwrites roughness/metalness/tint on one
//!   or all active pointers.
//!
//! Mutating through [`Assets::get_mut`] flags the asset as changed, which is
//! what re-uploads it to the GPU.

use std::collections::HashMap;

use bevy::math::Affine2;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::textures::TextureLibrary;

/// Shading categories, used as the index of the registry's slot table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialCategory {
    Wall,
    Floor,
    Roof,
    WindowFrame,
    DoorFrame,
    Door,
}

impl MaterialCategory {
    pub const ALL: [MaterialCategory; 6] = [
        MaterialCategory::Wall,
        MaterialCategory::Floor,
        MaterialCategory::Roof,
        MaterialCategory::WindowFrame,
        MaterialCategory::DoorFrame,
        MaterialCategory::Door,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            MaterialCategory::Wall => "Walls",
            MaterialCategory::Floor => "Floors",
            MaterialCategory::Roof => "Roof",
            MaterialCategory::WindowFrame => "Window frames",
            MaterialCategory::DoorFrame => "Door frames",
            MaterialCategory::Door => "Doors",
        }
    }
}

/// Three channel textures for one material id. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct TextureSet {
    pub color: Handle<Image>,
    pub normal: Handle<Image>,
    pub height: Handle<Image>,
}

/// Shared shading parameters applied across categories (stored centrally on
/// the registry rather than as ambient global state).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingParams {
    pub roughness: f32,
    pub metalness: f32,
    pub tint: Color,
}

impl Default for ShadingParams {
    fn default() -> Self {
        Self {
            roughness: 0.5,
            metalness: 0.0,
            tint: Color::WHITE,
        }
    }
}

impl ShadingParams {
    pub fn apply(&self, mat: &mut StandardMaterial) {
        mat.perceptual_roughness = self.roughness;
        mat.metallic = self.metalness;
        mat.base_color = self.tint;
    }
}

/// One category's cache: registered texture sets, lazily built materials,
/// the selected id, and the active-material pointer. Entries are never
/// evicted; texture sets are small and loaded once at startup.
#[derive(Debug, Default)]
pub struct MaterialSlot {
    selected: u32,
    registered: HashMap<u32, TextureSet>,
    materials: HashMap<u32, Handle<StandardMaterial>>,
    active: Option<Handle<StandardMaterial>>,
}

#[derive(Resource, Debug, Default)]
pub struct MaterialRegistry {
    slots: [MaterialSlot; 6],
    pub shading: ShadingParams,
}

impl MaterialRegistry {
    fn slot(&self, category: MaterialCategory) -> &MaterialSlot {
        &self.slots[category.index()]
    }

    fn slot_mut(&mut self, category: MaterialCategory) -> &mut MaterialSlot {
        &mut self.slots[category.index()]
    }

    /// Register the channel textures for an id. The first registration in a
    /// slot also becomes its selected id, so a freshly loaded manifest needs
    /// no separate default-selection step.
    pub fn register(&mut self, category: MaterialCategory, id: u32, set: TextureSet) {
        let slot = self.slot_mut(category);
        if slot.registered.is_empty() {
            slot.selected = id;
        }
        slot.registered.insert(id, set);
    }

    pub fn selected(&self, category: MaterialCategory) -> u32 {
        self.slot(category).selected
    }

    pub fn active(&self, category: MaterialCategory) -> Option<&Handle<StandardMaterial>> {
        self.slot(category).active.as_ref()
    }

    /// A slot that was never registered (lazy categories before their first
    /// selection) has no meaningful selected id, so adopt the library's
    /// first id for the category. No-op when the slot already has
    /// registrations or the library knows nothing either.
    fn adopt_selection_if_empty(&mut self, category: MaterialCategory, library: &TextureLibrary) {
        if self.slot(category).registered.is_empty() {
            if let Some(id) = library.ids_for(category).first().copied() {
                self.slot_mut(category).selected = id;
            }
        }
    }

    /// The selected texture set for a category, registering it from the
    /// library on first use. This is the uncached path the glass panel
    /// builder takes; everything else goes through [`Self::resolve`].
    pub fn resolve_set(
        &mut self,
        category: MaterialCategory,
        library: &TextureLibrary,
    ) -> Option<TextureSet> {
        self.adopt_selection_if_empty(category, library);
        let id = self.slot(category).selected;
        self.ensure_registered(category, id, library);
        self.slot(category).registered.get(&id).cloned()
    }

    /// Resolve the material for a category's selected texture id, building it
    /// lazily on first request. An unregistered id falls back once to the
    /// texture library (lazy registration); if the library doesn't know it
    /// either, the caller skips the surface.
    pub fn resolve(
        &mut self,
        category: MaterialCategory,
        library: &TextureLibrary,
        materials: &mut Assets<StandardMaterial>,
    ) -> Option<Handle<StandardMaterial>> {
        self.adopt_selection_if_empty(category, library);
        let id = self.slot(category).selected;
        if let Some(handle) = self.slot(category).materials.get(&id).cloned() {
            self.slot_mut(category).active = Some(handle.clone());
            return Some(handle);
        }
        self.ensure_registered(category, id, library);
        let shading = self.shading;
        let slot = self.slot_mut(category);
        let set = slot.registered.get(&id)?;
        let handle = materials.add(pbr_material(set, shading));
        slot.materials.insert(id, handle.clone());
        slot.active = Some(handle.clone());
        Some(handle)
    }

    fn ensure_registered(&mut self, category: MaterialCategory, id: u32, library: &TextureLibrary) {
        if self.slot(category).registered.contains_key(&id) {
            return;
        }
        if let Some(set) = library.set(category, id) {
            self.slot_mut(category).registered.insert(id, set.clone());
        }
    }

    /// Selection change: re-point the selected id and swap the new channel
    /// textures onto the existing active material. The material's
    /// `uv_transform` is deliberately left untouched so whatever tiling the
    /// builders set survives the swap.
    pub fn select_texture(
        &mut self,
        category: MaterialCategory,
        id: u32,
        library: &TextureLibrary,
        materials: &mut Assets<StandardMaterial>,
    ) {
        self.slot_mut(category).selected = id;
        self.ensure_registered(category, id, library);
        let shading = self.shading;
        let slot = self.slot(category);
        let (Some(set), Some(active)) = (slot.registered.get(&id), slot.active.as_ref()) else {
            return;
        };
        let Some(mat) = materials.get_mut(active) else {
            return;
        };
        mat.base_color_texture = Some(set.color.clone());
        mat.normal_map_texture = Some(set.normal.clone());
        mat.depth_map = Some(set.height.clone());
        shading.apply(mat);
    }

    /// Re-apply the shared shading parameters to one category's active
    /// material (used while the user edits a single category).
    pub fn update_material(
        &self,
        category: MaterialCategory,
        materials: &mut Assets<StandardMaterial>,
    ) {
        if let Some(handle) = self.slot(category).active.as_ref() {
            if let Some(mat) = materials.get_mut(handle) {
                self.shading.apply(mat);
            }
        }
    }

    /// Re-apply the shared shading parameters to every active slot (bulk
    /// path after a load or rebuild).
    pub fn update_all_materials(&self, materials: &mut Assets<StandardMaterial>) {
        for category in MaterialCategory::ALL {
            self.update_material(category, materials);
        }
    }

    /// The transmissive window-panel material, built fresh per call (never
    /// cached) from a texture set's channels.
    pub fn glass_material(&self, set: &TextureSet) -> StandardMaterial {
        StandardMaterial {
            base_color_texture: Some(set.color.clone()),
            normal_map_texture: Some(set.normal.clone()),
            depth_map: Some(set.height.clone()),
            parallax_depth_scale: 0.0,
            uv_transform: Affine2::from_scale(Vec2::new(
                crate::config::FRAME_REPEAT,
                crate::config::FRAME_REPEAT,
            )),
            base_color: self.shading.tint,
            perceptual_roughness: 0.05,
            metallic: 0.0,
            specular_transmission: 0.95,
            clearcoat: 1.0,
            clearcoat_perceptual_roughness: 0.05,
            alpha_mode: AlphaMode::Blend,
            ..default()
        }
    }
}

fn pbr_material(set: &TextureSet, shading: ShadingParams) -> StandardMaterial {
    StandardMaterial {
        base_color_texture: Some(set.color.clone()),
        normal_map_texture: Some(set.normal.clone()),
        // height channel is bound but flat, mirroring a zero displacement scale
        depth_map: Some(set.height.clone()),
        parallax_depth_scale: 0.0,
        perceptual_roughness: shading.roughness,
        metallic: shading.metalness,
        base_color: shading.tint,
        ..default()
    }
}

// ---------------------------------------------------------------------------
// Entry-point events and handlers
// ---------------------------------------------------------------------------

/// User picked a different texture id for a category.
#[derive(Event, Debug, Clone, Copy)]
pub struct SelectTexture {
    pub category: MaterialCategory,
    pub id: u32,
}

/// Shading-parameter entry points. `category: None` refreshes every active
/// slot (bulk path); `Some` refreshes only the category being edited.
#[derive(Event, Debug, Clone, Copy)]
pub struct SetRoughness {
    pub value: f32,
    pub category: Option<MaterialCategory>,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SetMetalness {
    pub value: f32,
    pub category: Option<MaterialCategory>,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SetTint {
    pub color: Color,
    pub category: Option<MaterialCategory>,
}

pub fn apply_texture_selection(
    mut events: EventReader<SelectTexture>,
    mut registry: ResMut<MaterialRegistry>,
    library: Res<TextureLibrary>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for ev in events.read() {
        registry.select_texture(ev.category, ev.id, &library, &mut materials);
    }
}

pub fn apply_shading_changes(
    mut roughness: EventReader<SetRoughness>,
    mut metalness: EventReader<SetMetalness>,
    mut tint: EventReader<SetTint>,
    mut registry: ResMut<MaterialRegistry>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for ev in roughness.read() {
        registry.shading.roughness = ev.value;
        propagate(&registry, ev.category, &mut materials);
    }
    for ev in metalness.read() {
        registry.shading.metalness = ev.value;
        propagate(&registry, ev.category, &mut materials);
    }
    for ev in tint.read() {
        registry.shading.tint = ev.color;
        propagate(&registry, ev.category, &mut materials);
    }
}

fn propagate(
    registry: &MaterialRegistry,
    category: Option<MaterialCategory>,
    materials: &mut Assets<StandardMaterial>,
) {
    match category {
        Some(category) => registry.update_material(category, materials),
        None => registry.update_all_materials(materials),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weak_set(seed: u128) -> TextureSet {
        TextureSet {
            color: Handle::weak_from_u128(seed),
            normal: Handle::weak_from_u128(seed + 1),
            height: Handle::weak_from_u128(seed + 2),
        }
    }

    #[test]
    fn first_registration_selects_itself() {
        let mut registry = MaterialRegistry::default();
        registry.register(MaterialCategory::Wall, 1634, weak_set(100));
        registry.register(MaterialCategory::Wall, 2201, weak_set(200));
        assert_eq!(registry.selected(MaterialCategory::Wall), 1634);
    }

    #[test]
    fn resolve_is_lazy_and_cached() {
        let mut registry = MaterialRegistry::default();
        let library = TextureLibrary::default();
        let mut materials = Assets::<StandardMaterial>::default();
        registry.register(MaterialCategory::Floor, 8696, weak_set(100));

        let a = registry
            .resolve(MaterialCategory::Floor, &library, &mut materials)
            .unwrap();
        let b = registry
            .resolve(MaterialCategory::Floor, &library, &mut materials)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(materials.len(), 1);
        assert_eq!(registry.active(MaterialCategory::Floor), Some(&a));
    }

    #[test]
    fn unregistered_slot_adopts_the_library_default() {
        let mut registry = MaterialRegistry::default();
        let mut library = TextureLibrary::default();
        let mut materials = Assets::<StandardMaterial>::default();
        library.insert(MaterialCategory::Door, 2734, weak_set(300));

        // a slot that was never registered adopts the library's first id,
        // so lazy categories resolve on first use
        let handle = registry
            .resolve(MaterialCategory::Door, &library, &mut materials)
            .unwrap();
        assert_eq!(registry.selected(MaterialCategory::Door), 2734);
        assert_eq!(registry.active(MaterialCategory::Door), Some(&handle));
        assert_eq!(materials.len(), 1);

        // a category the library doesn't know either still skips
        assert!(registry
            .resolve(MaterialCategory::WindowFrame, &library, &mut materials)
            .is_none());
    }

    #[test]
    fn resolve_falls_back_to_library_once() {
        let mut registry = MaterialRegistry::default();
        let mut library = TextureLibrary::default();
        let mut materials = Assets::<StandardMaterial>::default();
        library.insert(MaterialCategory::Door, 2734, weak_set(300));
        registry.register(MaterialCategory::Door, 5, weak_set(400));

        // an id only the library knows lazily registers on selection
        registry.select_texture(MaterialCategory::Door, 2734, &library, &mut materials);
        assert!(registry
            .resolve(MaterialCategory::Door, &library, &mut materials)
            .is_some());

        // an id known nowhere skips the surface
        registry.select_texture(MaterialCategory::Door, 9, &library, &mut materials);
        assert!(registry
            .resolve(MaterialCategory::Door, &library, &mut materials)
            .is_none());
    }

    #[test]
    fn glass_set_resolves_for_a_lazy_category() {
        let mut registry = MaterialRegistry::default();
        let mut library = TextureLibrary::default();
        library.insert(MaterialCategory::WindowFrame, 2734, weak_set(500));

        let set = registry
            .resolve_set(MaterialCategory::WindowFrame, &library)
            .unwrap();
        assert_eq!(set.color, Handle::weak_from_u128(500));
        assert_eq!(registry.selected(MaterialCategory::WindowFrame), 2734);
    }

    #[test]
    fn selection_swap_preserves_uv_transform() {
        let mut registry = MaterialRegistry::default();
        let library = TextureLibrary::default();
        let mut materials = Assets::<StandardMaterial>::default();
        registry.register(MaterialCategory::Wall, 1634, weak_set(100));
        registry.register(MaterialCategory::Wall, 2201, weak_set(200));

        let handle = registry
            .resolve(MaterialCategory::Wall, &library, &mut materials)
            .unwrap();
        let repeat = Affine2::from_scale(Vec2::new(3.0, 1.0));
        materials.get_mut(&handle).unwrap().uv_transform = repeat;

        registry.select_texture(MaterialCategory::Wall, 2201, &library, &mut materials);

        let mat = materials.get(&handle).unwrap();
        assert_eq!(mat.uv_transform, repeat);
        assert_eq!(mat.base_color_texture, Some(Handle::weak_from_u128(200)));
    }

    #[test]
    fn selection_swap_with_unknown_id_is_a_no_op() {
        let mut registry = MaterialRegistry::default();
        let library = TextureLibrary::default();
        let mut materials = Assets::<StandardMaterial>::default();
        registry.register(MaterialCategory::Roof, 4683, weak_set(100));
        let handle = registry
            .resolve(MaterialCategory::Roof, &library, &mut materials)
            .unwrap();

        registry.select_texture(MaterialCategory::Roof, 9999, &library, &mut materials);

        // selection moved, but the active material kept its old textures
        assert_eq!(registry.selected(MaterialCategory::Roof), 9999);
        let mat = materials.get(&handle).unwrap();
        assert_eq!(mat.base_color_texture, Some(Handle::weak_from_u128(100)));
    }

    #[test]
    fn shading_update_touches_only_requested_category() {
        let mut registry = MaterialRegistry::default();
        let library = TextureLibrary::default();
        let mut materials = Assets::<StandardMaterial>::default();
        registry.register(MaterialCategory::Wall, 1, weak_set(100));
        registry.register(MaterialCategory::Floor, 2, weak_set(200));
        let wall = registry
            .resolve(MaterialCategory::Wall, &library, &mut materials)
            .unwrap();
        let floor = registry
            .resolve(MaterialCategory::Floor, &library, &mut materials)
            .unwrap();

        registry.shading.roughness = 0.9;
        registry.update_material(MaterialCategory::Wall, &mut materials);

        assert_eq!(materials.get(&wall).unwrap().perceptual_roughness, 0.9);
        assert_eq!(materials.get(&floor).unwrap().perceptual_roughness, 0.5);

        registry.update_all_materials(&mut materials);
        assert_eq!(materials.get(&floor).unwrap().perceptual_roughness, 0.9);
    }

    #[test]
    fn glass_material_is_transmissive_and_uncached() {
        let registry = MaterialRegistry::default();
        let glass = registry.glass_material(&weak_set(100));
        assert!(glass.specular_transmission > 0.9);
        assert_eq!(glass.clearcoat, 1.0);
        assert!(matches!(glass.alpha_mode, AlphaMode::Blend));
    }
}
