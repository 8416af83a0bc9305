//! Bevy asset wrappers around the exported scene documents.
//!
//! The JSON shapes live in the core crate; these newtypes only add the asset
//! machinery so `bevy_common_assets` can load them. Each type gets its own
//! compound extension so the JSON loaders do not collide.

use bevy::prelude::*;
use pano_review_core::scene::{DetectionSetDoc, PanoManifestDoc, SceneIndexDoc};
use serde::Deserialize;

pub const SCENE_INDEX_EXTENSION: &str = "index.json";
pub const PANO_MANIFEST_EXTENSION: &str = "pano.json";
pub const DETECTION_SET_EXTENSION: &str = "detections.json";

/// `scene.index.json` — the list of exported panorama manifests.
#[derive(Asset, Debug, Clone, Deserialize, TypePath)]
pub struct SceneIndex(pub SceneIndexDoc);

/// `pano_<id>.pano.json` — one panorama's faces, coordinates, and the path
/// of its detection set.
#[derive(Asset, Debug, Clone, Deserialize, TypePath)]
pub struct PanoManifest(pub PanoManifestDoc);

/// `pano_<id>.detections.json` — detections with folded review state.
#[derive(Asset, Debug, Clone, Deserialize, TypePath)]
pub struct DetectionSet(pub DetectionSetDoc);
