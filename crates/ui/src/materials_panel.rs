//! Material and scene controls panel.
//!
//! One egui window with a category picker, the texture-set selector for that
//! category, shading sliders, a tint picker, and the roof/rebuild/unload
//! scene controls. The panel never touches the registry or cache directly:
//! every interaction is an event the rendering crate consumes.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use rendering::materials::{
    MaterialCategory, MaterialRegistry, SelectTexture, SetMetalness, SetRoughness, SetTint,
};
use rendering::scene_sync::{RebuildScene, ShowRoof, ToggleRoof, UnloadFloor, UnloadWall};
use rendering::textures::TextureLibrary;

/// Panel-local widget state. Slider values live here between frames; the
/// registry is only told about them through events when they change.
#[derive(Resource)]
pub struct PanelState {
    pub category: MaterialCategory,
    pub roughness: f32,
    pub metalness: f32,
    pub tint: [f32; 3],
    /// When false, shading edits apply to the picked category only.
    pub apply_to_all: bool,
    pub unload_wall_id: String,
    pub unload_floor_id: String,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            category: MaterialCategory::Wall,
            roughness: 0.5,
            metalness: 0.0,
            tint: [1.0, 1.0, 1.0],
            apply_to_all: true,
            unload_wall_id: String::new(),
            unload_floor_id: String::new(),
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn materials_panel_ui(
    mut contexts: EguiContexts,
    mut state: ResMut<PanelState>,
    registry: Res<MaterialRegistry>,
    library: Res<TextureLibrary>,
    show_roof: Res<ShowRoof>,
    mut select_texture: EventWriter<SelectTexture>,
    mut set_roughness: EventWriter<SetRoughness>,
    mut set_metalness: EventWriter<SetMetalness>,
    mut set_tint: EventWriter<SetTint>,
    mut toggle_roof: EventWriter<ToggleRoof>,
    mut rebuild: EventWriter<RebuildScene>,
    mut unload_wall: EventWriter<UnloadWall>,
    mut unload_floor: EventWriter<UnloadFloor>,
) {
    egui::Window::new("Materials")
        .resizable(false)
        .default_width(280.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.spacing_mut().item_spacing.y = 8.0;

            // --- Category picker ---
            egui::ComboBox::from_label("Category")
                .selected_text(state.category.label())
                .show_ui(ui, |ui| {
                    for category in MaterialCategory::ALL {
                        ui.selectable_value(&mut state.category, category, category.label());
                    }
                });

            // --- Texture set selector ---
            let selected = registry.selected(state.category);
            for id in library.ids_for(state.category) {
                if ui
                    .selectable_label(id == selected, format!("Set {id}"))
                    .clicked()
                {
                    select_texture.send(SelectTexture {
                        category: state.category,
                        id,
                    });
                }
            }

            ui.separator();

            // --- Shading ---
            ui.checkbox(&mut state.apply_to_all, "Apply shading to all categories");
            let target = (!state.apply_to_all).then_some(state.category);

            if ui
                .add(egui::Slider::new(&mut state.roughness, 0.0..=1.0).text("Roughness"))
                .changed()
            {
                set_roughness.send(SetRoughness {
                    value: state.roughness,
                    category: target,
                });
            }
            if ui
                .add(egui::Slider::new(&mut state.metalness, 0.0..=1.0).text("Metalness"))
                .changed()
            {
                set_metalness.send(SetMetalness {
                    value: state.metalness,
                    category: target,
                });
            }

            ui.horizontal(|ui| {
                ui.label("Tint:");
                if ui.color_edit_button_rgb(&mut state.tint).changed() {
                    set_tint.send(SetTint {
                        color: Color::srgb(state.tint[0], state.tint[1], state.tint[2]),
                        category: target,
                    });
                }
            });

            ui.separator();

            // --- Scene ---
            let mut roof_on = show_roof.0;
            if ui.checkbox(&mut roof_on, "Show roof").changed() {
                toggle_roof.send(ToggleRoof(roof_on));
            }
            if ui.button("Rebuild scene").clicked() {
                rebuild.send(RebuildScene);
            }

            ui.horizontal(|ui| {
                ui.label("Unload wall:");
                ui.text_edit_singleline(&mut state.unload_wall_id);
                if ui.button("Remove").clicked() {
                    if let Ok(id) = state.unload_wall_id.trim().parse() {
                        unload_wall.send(UnloadWall(id));
                    }
                    state.unload_wall_id.clear();
                }
            });
            ui.horizontal(|ui| {
                ui.label("Unload floor:");
                ui.text_edit_singleline(&mut state.unload_floor_id);
                if ui.button("Remove").clicked() {
                    if let Ok(id) = state.unload_floor_id.trim().parse() {
                        unload_floor.send(UnloadFloor(id));
                    }
                    state.unload_floor_id.clear();
                }
            });
        });
}

/// Shown instead of the scene when the texture barrier failed.
pub fn load_failed_ui(mut contexts: EguiContexts) {
    egui::Window::new("Load failed")
        .resizable(false)
        .show(contexts.ctx_mut(), |ui| {
            ui.label("One or more textures failed to load. Check assets/textures.json.");
        });
}
