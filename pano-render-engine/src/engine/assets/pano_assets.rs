//! Handles for everything the active panorama owns.

use bevy::prelude::*;
use pano_review_core::Face;
use std::collections::HashMap;

use super::scene_assets::{DetectionSet, PanoManifest, SceneIndex};

/// One in-flight or applied face texture. Slots are rebuilt wholesale on a
/// panorama swap, which is what makes late results for a previous panorama
/// unreachable: their handles are simply no longer in the map.
pub struct FaceSlot {
    pub handle: Handle<Image>,
    pub applied: bool,
}

#[derive(Resource, Default)]
pub struct PanoAssets {
    pub index: Option<Handle<SceneIndex>>,
    pub manifest: Option<Handle<PanoManifest>>,
    pub detections: Option<Handle<DetectionSet>>,
    /// Position in the scene index the viewer is currently showing.
    pub slot: usize,
    /// Stale-response guard: texture and detection results only apply while
    /// this still names the panorama they were requested for.
    pub active_pano: Option<i64>,
    pub faces: HashMap<Face, FaceSlot>,
}
