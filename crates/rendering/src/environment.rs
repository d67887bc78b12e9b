//! Scene environment: skybox and base lighting.
//!
//! The environment image ships as a single PNG with the six cube faces
//! stacked vertically. Once the loading barrier has confirmed it, the image
//! is reinterpreted as a 6-layer array texture viewed as a cube and attached
//! to the camera.

use bevy::core_pipeline::Skybox;
use bevy::prelude::*;
use bevy::render::render_resource::{TextureViewDescriptor, TextureViewDimension};

use crate::textures::TextureLibrary;

const SKYBOX_BRIGHTNESS: f32 = 1000.0;

pub fn attach_skybox(
    mut commands: Commands,
    library: Res<TextureLibrary>,
    mut images: ResMut<Assets<Image>>,
    cameras: Query<Entity, With<Camera3d>>,
) {
    let Some(image) = images.get_mut(&library.environment) else {
        warn!("environment image missing, skipping skybox");
        return;
    };
    if image.texture_descriptor.array_layer_count() == 1 {
        // a stacked cubemap is N square faces tall; anything else would
        // reinterpret into zero or ragged layers
        let layers = image.height() / image.width();
        if layers == 0 || image.height() % image.width() != 0 {
            warn!(
                "environment image is {}x{}, not a vertical face stack; skipping skybox",
                image.width(),
                image.height()
            );
            return;
        }
        image.reinterpret_stacked_2d_as_array(layers);
        image.texture_view_descriptor = Some(TextureViewDescriptor {
            dimension: Some(TextureViewDimension::Cube),
            ..default()
        });
    }

    for camera in &cameras {
        commands.entity(camera).insert(Skybox {
            image: library.environment.clone(),
            brightness: SKYBOX_BRIGHTNESS,
            rotation: Quat::IDENTITY,
        });
    }
}

pub fn setup_lights(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(20.0, 40.0, 10.0).looking_at(Vec3::new(5.0, 0.0, 5.0), Vec3::Y),
    ));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::app::App;
    use bevy::ecs::system::RunSystemOnce;
    use bevy::render::render_asset::RenderAssetUsages;
    use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

    fn stub_image(width: u32, height: u32) -> Image {
        Image::new_fill(
            Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            &[0, 0, 0, 255],
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::all(),
        )
    }

    fn app_with_environment(width: u32, height: u32) -> (App, Entity) {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.init_resource::<Assets<Image>>();

        let handle = app
            .world_mut()
            .resource_mut::<Assets<Image>>()
            .add(stub_image(width, height));
        let mut library = TextureLibrary::default();
        library.environment = handle;
        app.insert_resource(library);
        let camera = app.world_mut().spawn(Camera3d::default()).id();
        (app, camera)
    }

    #[test]
    fn stacked_environment_becomes_a_six_layer_cube() {
        let (mut app, camera) = app_with_environment(16, 96);
        app.world_mut().run_system_once(attach_skybox).unwrap();

        assert!(app.world().get::<Skybox>(camera).is_some());
        let library = app.world().resource::<TextureLibrary>();
        let images = app.world().resource::<Assets<Image>>();
        let image = images.get(&library.environment).unwrap();
        assert_eq!(image.texture_descriptor.array_layer_count(), 6);
    }

    #[test]
    fn wide_environment_image_is_rejected() {
        // height / width would truncate to zero layers
        let (mut app, camera) = app_with_environment(32, 16);
        app.world_mut().run_system_once(attach_skybox).unwrap();
        assert!(app.world().get::<Skybox>(camera).is_none());
    }

    #[test]
    fn ragged_environment_stack_is_rejected() {
        // taller than wide but not a whole number of square faces
        let (mut app, camera) = app_with_environment(16, 100);
        app.world_mut().run_system_once(attach_skybox).unwrap();
        assert!(app.world().get::<Skybox>(camera).is_none());
    }
}
