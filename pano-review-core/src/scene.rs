//! JSON documents exchanged between the ingest tool and the render engine.
//!
//! The ingest tool writes these next to the exported face images; the viewer
//! loads them as assets. Keeping the shapes here means both sides serialize
//! through the same definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{BboxXywh, ReviewedDetection};

/// Top-level index of exported panoramas, one manifest file per entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneIndexDoc {
    pub panos: Vec<String>,
}

/// One panorama's manifest: which face images exist, where their files live,
/// where the detection set lives, and the capture coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanoManifestDoc {
    pub pano_id: i64,
    /// face name -> image path, only for faces that were uploaded.
    pub faces: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,
    /// Path of the detection set document.
    pub detections: String,
}

/// Detection list for one panorama, review state already folded in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionSetDoc {
    pub detections: Vec<DetectionRecordDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionRecordDoc {
    pub id: i64,
    pub face: String,
    pub ifc_class: String,
    pub confidence: f32,
    pub bbox_xywh: BboxXywh,
    pub model_version: String,
    /// Latest review action (`confirm`/`reject`), absent while pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_action: Option<String>,
}

impl From<&ReviewedDetection> for DetectionRecordDoc {
    fn from(entry: &ReviewedDetection) -> Self {
        let d = &entry.detection;
        DetectionRecordDoc {
            id: d.id,
            face: d.face.name().to_string(),
            ifc_class: d.ifc_class.clone(),
            confidence: d.confidence,
            bbox_xywh: d.bbox,
            model_version: d.model_version.clone(),
            review_action: entry.review_action.map(|a| a.name().to_string()),
        }
    }
}
