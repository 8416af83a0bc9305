//! Swaps face textures into the skybox materials as their loads resolve.

use bevy::asset::LoadState;
use bevy::prelude::*;
use pano_review_core::Face;

use crate::engine::assets::pano_assets::PanoAssets;
use crate::engine::scene::skybox::SkyboxFaces;

/// Check the in-flight face loads and apply any that resolved. A failed
/// load keeps the placeholder instead of aborting the render loop. The scan
/// runs read-only and only takes the mutable borrow when something actually
/// resolved, so the resource's change tick stays quiet on idle frames.
pub fn apply_loaded_face_textures(
    asset_server: Res<AssetServer>,
    mut pano_assets: ResMut<PanoAssets>,
    skybox: Res<SkyboxFaces>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mut resolved: Vec<(Face, bool)> = Vec::new();
    for (face, slot) in pano_assets.faces.iter() {
        if slot.applied {
            continue;
        }
        match asset_server.get_load_state(&slot.handle) {
            Some(LoadState::Loaded) => resolved.push((*face, true)),
            Some(LoadState::Failed(_)) => resolved.push((*face, false)),
            _ => {}
        }
    }
    if resolved.is_empty() {
        return;
    }

    for (face, loaded) in resolved {
        let Some(slot) = pano_assets.faces.get_mut(&face) else {
            continue;
        };
        slot.applied = true;
        if !loaded {
            warn!("{face} face texture failed to load; keeping placeholder");
            continue;
        }
        let texture = slot.handle.clone();
        if let Some(material_handle) = skybox.materials.get(&face) {
            if let Some(material) = materials.get_mut(material_handle) {
                material.base_color_texture = Some(texture);
                material.base_color = Color::WHITE;
            }
        }
        info!("✓ {face} face texture swapped in");
    }
}
