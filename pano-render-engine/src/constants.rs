//! Tuning constants for the viewer.

/// Scene index the viewer loads on startup, relative to the asset root.
pub const SCENE_INDEX_PATH: &str = "scenes/scene.index.json";

/// Half-extent of the skybox cube; shared with the coordinate mapper so
/// overlay quads land exactly on the face quads.
pub const SKYBOX_HALF_EXTENT: f32 = pano_review_core::cube::DEFAULT_HALF_EXTENT;

/// Radians of camera rotation per pixel of pointer drag.
pub const DRAG_SENSITIVITY: f32 = 0.0025;

/// Keeps pitch strictly inside +/- PI/2 so the camera never flips.
pub const PITCH_LIMIT_EPSILON: f32 = 0.01;

pub const DEFAULT_FOV_DEG: f32 = 75.0;
pub const FOV_STEP_DEG: f32 = 2.0;
pub const FOV_MIN_DEG: f32 = 30.0;
pub const FOV_MAX_DEG: f32 = 100.0;

/// Detections below this confidence are not drawn at all.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.05;
pub const CONFIDENCE_STEP: f32 = 0.05;

/// World units a label anchor is pulled inward off its face plane.
pub const LABEL_NUDGE: f32 = 3.0;
pub const LABEL_FONT_SIZE: f32 = 14.0;
