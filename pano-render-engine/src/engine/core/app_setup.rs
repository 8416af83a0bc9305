use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

// Crate engine modules
use crate::engine::assets::pano_assets::PanoAssets;
use crate::engine::assets::scene_assets::{
    DETECTION_SET_EXTENSION, DetectionSet, PANO_MANIFEST_EXTENSION, PanoManifest,
    SCENE_INDEX_EXTENSION, SceneIndex,
};
use crate::engine::camera::{PanoCamera, pano_camera_controller};
use crate::engine::core::app_state::{AppState, transition_to_running};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::face_texture_loader::apply_loaded_face_textures;
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::loading::scene_loader::{
    activate_manifest, cycle_panorama, select_active_manifest, start_scene_loading,
};
use crate::engine::scene::skybox::{SkyboxFaces, spawn_skybox};
// Crate overlay modules
use crate::constants::DEFAULT_FOV_DEG;
use crate::overlay::detection_overlay::{
    OverlaySettings, overlay_settings_input, rebuild_detection_overlay,
};
use crate::overlay::labels::position_detection_labels;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        // Register the exported scene documents as loadable JSON assets.
        .add_plugins(JsonAssetPlugin::<SceneIndex>::new(&[SCENE_INDEX_EXTENSION]))
        .add_plugins(JsonAssetPlugin::<PanoManifest>::new(&[
            PANO_MANIFEST_EXTENSION,
        ]))
        .add_plugins(JsonAssetPlugin::<DetectionSet>::new(&[
            DETECTION_SET_EXTENSION,
        ]));

    app.init_resource::<PanoAssets>()
        .init_resource::<SkyboxFaces>()
        .init_resource::<PanoCamera>()
        .init_resource::<OverlaySettings>()
        .init_resource::<LoadingProgress>();

    app.add_systems(Startup, (setup, spawn_skybox, start_scene_loading).chain())
        .add_systems(
            Update,
            // Manifest loading also runs while Running so N/P panorama
            // switches reuse the same activation path.
            (select_active_manifest, activate_manifest, apply_loaded_face_textures).chain(),
        )
        .add_systems(
            Update,
            transition_to_running.run_if(in_state(AppState::Loading)),
        );

    // Runtime systems: input first, then overlay rebuild, then label layout.
    let runtime_systems = (
        pano_camera_controller,
        cycle_panorama,
        overlay_settings_input,
        rebuild_detection_overlay,
        position_detection_labels,
        exit_on_escape,
    )
        .chain();
    app.add_systems(Update, runtime_systems.run_if(in_state(AppState::Running)));

    app
}

// Startup system that only handles the camera; the skybox spawns beside it
fn setup(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: DEFAULT_FOV_DEG.to_radians(),
            near: 0.1,
            far: 2000.0,
            ..default()
        }),
        Transform::default(),
    ));
}

fn exit_on_escape(keyboard: Res<ButtonInput<KeyCode>>, mut exit: EventWriter<AppExit>) {
    if keyboard.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
