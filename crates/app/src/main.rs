use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use plan::{Opening, Plan, PlanPoint, Room, Wall};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "HomePlan".to_string(),
                resolution: (1280.0, 720.0).into(),
                present_mode: PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(WinitSettings {
            focused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(16)),
            unfocused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(100)),
        })
        .insert_resource(sample_plan())
        .add_plugins((rendering::RenderingPlugin, ui::UiPlugin))
        .run();
}

/// A small two-room house in plan units (30 per scene unit): a 600x450
/// envelope split by one interior wall, with a front door and two windows.
fn sample_plan() -> Plan {
    const H: f32 = 300.0;
    let p = PlanPoint::new;

    Plan {
        // envelope walls run counter-clockwise; room wall order doubles as
        // the floor outline, so each room lists walls whose start points
        // trace its own perimeter
        walls: vec![
            Wall::new(1, p(0.0, 0.0), p(360.0, 0.0), H),
            Wall::new(2, p(360.0, 0.0), p(600.0, 0.0), H),
            Wall::new(3, p(600.0, 0.0), p(600.0, 450.0), H),
            Wall::new(4, p(600.0, 450.0), p(360.0, 450.0), H),
            Wall::new(5, p(360.0, 450.0), p(0.0, 450.0), H),
            Wall::new(6, p(0.0, 450.0), p(0.0, 0.0), H),
            // interior partition
            Wall::new(7, p(360.0, 0.0), p(360.0, 450.0), H),
        ],
        rooms: vec![
            Room {
                id: 1,
                wall_ids: vec![1, 7, 5, 6],
            },
            Room {
                id: 2,
                wall_ids: vec![2, 3, 4, 5],
            },
        ],
        windows: vec![
            Opening {
                id: 10,
                center: p(150.0, 0.0),
                parent_wall: 1,
            },
            Opening {
                id: 11,
                center: p(600.0, 225.0),
                parent_wall: 3,
            },
        ],
        doors: vec![
            Opening {
                id: 20,
                center: p(480.0, 0.0),
                parent_wall: 2,
            },
            Opening {
                id: 21,
                center: p(360.0, 225.0),
                parent_wall: 7,
            },
        ],
        roof: vec![1, 2, 3, 4, 5, 6],
    }
}
