use bevy::prelude::*;
use bevy_egui::EguiPlugin;

pub mod materials_panel;

use rendering::ViewerState;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .init_resource::<materials_panel::PanelState>()
            .add_systems(
                Update,
                materials_panel::materials_panel_ui.run_if(in_state(ViewerState::Ready)),
            )
            .add_systems(
                Update,
                materials_panel::load_failed_ui.run_if(in_state(ViewerState::Failed)),
            );
    }
}
