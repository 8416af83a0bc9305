//! Scene index and panorama manifest loading, plus panorama switching.

use bevy::prelude::*;

use crate::constants::SCENE_INDEX_PATH;
use crate::engine::assets::pano_assets::{FaceSlot, PanoAssets};
use crate::engine::assets::scene_assets::{PanoManifest, SceneIndex};
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::scene::skybox::{SkyboxFaces, reset_faces_to_placeholder};
use pano_review_core::Face;

// Start the loading process
pub fn start_scene_loading(mut pano_assets: ResMut<PanoAssets>, asset_server: Res<AssetServer>) {
    pano_assets.index = Some(asset_server.load(SCENE_INDEX_PATH));
}

/// Once the index is available, request the manifest for the current slot.
pub fn select_active_manifest(
    mut pano_assets: ResMut<PanoAssets>,
    mut progress: ResMut<LoadingProgress>,
    indexes: Res<Assets<SceneIndex>>,
    asset_server: Res<AssetServer>,
) {
    if pano_assets.manifest.is_some() {
        return;
    }
    let Some(index_handle) = pano_assets.index.clone() else {
        return;
    };
    let Some(index) = indexes.get(&index_handle) else {
        return;
    };
    if !progress.index_loaded {
        info!("✓ Scene index loaded ({} panoramas)", index.0.panos.len());
        progress.index_loaded = true;
    }
    if index.0.panos.is_empty() {
        return;
    }
    let slot = pano_assets.slot.min(index.0.panos.len() - 1);
    let path = index.0.panos[slot].clone();
    pano_assets.slot = slot;
    pano_assets.manifest = Some(asset_server.load(path));
}

/// Apply a freshly loaded manifest: record the new active panorama, request
/// its detection set, and restart the six face texture loads. Dropping the
/// previous face slots here is the stale-response guard — results for the
/// old panorama have nothing left to match against.
pub fn activate_manifest(
    mut pano_assets: ResMut<PanoAssets>,
    mut progress: ResMut<LoadingProgress>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    skybox: Res<SkyboxFaces>,
    manifests: Res<Assets<PanoManifest>>,
    asset_server: Res<AssetServer>,
) {
    let Some(manifest_handle) = pano_assets.manifest.clone() else {
        return;
    };
    let Some(manifest) = manifests.get(&manifest_handle) else {
        return;
    };
    if pano_assets.active_pano == Some(manifest.0.pano_id) {
        return;
    }

    info!(
        "→ Activating panorama {} ({} faces)",
        manifest.0.pano_id,
        manifest.0.faces.len()
    );
    pano_assets.active_pano = Some(manifest.0.pano_id);
    pano_assets.detections = Some(asset_server.load(manifest.0.detections.clone()));

    reset_faces_to_placeholder(&skybox, &mut materials);
    pano_assets.faces.clear();
    for (face_name, path) in &manifest.0.faces {
        let face = Face::parse(face_name);
        let handle = asset_server.load(path.clone());
        pano_assets.faces.insert(
            face,
            FaceSlot {
                handle,
                applied: false,
            },
        );
    }
    progress.manifest_loaded = true;
}

/// N/P cycle through the panoramas of the scene index.
pub fn cycle_panorama(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut pano_assets: ResMut<PanoAssets>,
    indexes: Res<Assets<SceneIndex>>,
    asset_server: Res<AssetServer>,
) {
    let step: i64 = if keyboard.just_pressed(KeyCode::KeyN) {
        1
    } else if keyboard.just_pressed(KeyCode::KeyP) {
        -1
    } else {
        return;
    };
    let Some(index_handle) = pano_assets.index.clone() else {
        return;
    };
    let Some(index) = indexes.get(&index_handle) else {
        return;
    };
    let count = index.0.panos.len();
    if count < 2 {
        return;
    }
    let slot = (pano_assets.slot as i64 + step).rem_euclid(count as i64) as usize;
    pano_assets.slot = slot;
    pano_assets.manifest = Some(asset_server.load(index.0.panos[slot].clone()));
}
