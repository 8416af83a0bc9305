//! Domain types shared by the store, the conversion engine, and the viewer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One of the six named sides of a panorama's cube representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    Top,
    Bottom,
    Front,
    Back,
    Left,
    Right,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Top,
        Face::Bottom,
        Face::Front,
        Face::Back,
        Face::Left,
        Face::Right,
    ];

    /// Canonical lowercase name used in storage and on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Face::Top => "top",
            Face::Bottom => "bottom",
            Face::Front => "front",
            Face::Back => "back",
            Face::Left => "left",
            Face::Right => "right",
        }
    }

    /// Parse a face name. Anything outside the six canonical names resolves
    /// to `Front`; upstream detectors have been observed emitting `up`/`down`.
    pub fn parse(s: &str) -> Face {
        match s {
            "top" => Face::Top,
            "bottom" => Face::Bottom,
            "front" => Face::Front,
            "back" => Face::Back,
            "left" => Face::Left,
            "right" => Face::Right,
            _ => Face::Front,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Deserialization shares the fallback with `parse` so unknown names never
// fail a whole document.
impl<'de> Deserialize<'de> for Face {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Face::parse(&raw))
    }
}

/// Normalized bounding box `(center_x, center_y, width, height)`, serialized
/// as the 4-element array `[cx, cy, w, h]`.
///
/// Components are nominally in `[0, 1]` with (0, 0) at the top-left of the
/// face image and y growing downward. Out-of-range values are accepted at
/// ingest and clamped before any geometric use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BboxXywh(pub [f32; 4]);

impl BboxXywh {
    pub fn new(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self([cx, cy, w, h])
    }

    pub fn cx(&self) -> f32 {
        self.0[0]
    }

    pub fn cy(&self) -> f32 {
        self.0[1]
    }

    pub fn w(&self) -> f32 {
        self.0[2]
    }

    pub fn h(&self) -> f32 {
        self.0[3]
    }

    /// Every component clamped into `[0, 1]`. Non-finite values collapse to
    /// zero so downstream geometry and JSON encoding stay total.
    pub fn clamped(&self) -> Self {
        Self(self.0.map(|n| if n.is_finite() { n.clamp(0.0, 1.0) } else { 0.0 }))
    }
}

/// A single geographic point `(lon, lat, alt)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
    pub alt: f64,
}

/// One stored face image of a panorama (bytes live in the store).
#[derive(Debug, Clone)]
pub struct PanoFace {
    pub face: Face,
    pub content_type: String,
    pub byte_len: i64,
}

/// A six-sided panoramic capture. Immutable once created; faces that were
/// never uploaded are permanently absent.
#[derive(Debug, Clone)]
pub struct Panorama {
    pub id: i64,
    pub property_id: Option<i64>,
    pub level: Option<String>,
    pub area: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub alt: Option<f64>,
    pub captured_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub faces: Vec<PanoFace>,
}

impl Panorama {
    pub fn has_face(&self, face: Face) -> bool {
        self.faces.iter().any(|f| f.face == face)
    }

    /// Point geometry for assets derived from this panorama: present only
    /// when both lon and lat exist, with altitude defaulting to zero.
    pub fn geometry(&self) -> Option<GeoPoint> {
        match (self.lon, self.lat) {
            (Some(lon), Some(lat)) => Some(GeoPoint {
                lon,
                lat,
                alt: self.alt.unwrap_or(0.0),
            }),
            _ => None,
        }
    }
}

/// Metadata for a panorama being created.
#[derive(Debug, Clone, Default)]
pub struct NewPanorama {
    pub property_id: Option<i64>,
    pub level: Option<String>,
    pub area: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub alt: Option<f64>,
    pub captured_at: Option<DateTime<Utc>>,
}

/// One face image payload accompanying a panorama creation.
#[derive(Debug, Clone)]
pub struct NewFaceImage {
    pub face: Face,
    pub bytes: Vec<u8>,
}

/// Raw face image bytes as retrieved from the store.
#[derive(Debug, Clone)]
pub struct FaceImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A machine-generated candidate detection on one face of a panorama.
/// Created only by the detector seeding path; never mutated.
#[derive(Debug, Clone)]
pub struct Detection {
    pub id: i64,
    pub pano_id: i64,
    pub face: Face,
    pub ifc_class: String,
    pub confidence: f32,
    pub bbox: BboxXywh,
    pub model_version: String,
    pub created_at: DateTime<Utc>,
}

/// Detector output ready for seeding into a panorama.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDetection {
    pub face: Face,
    pub ifc_class: String,
    pub confidence: f32,
    #[serde(rename = "bbox_xywh")]
    pub bbox: BboxXywh,
    pub model_version: String,
}

/// A detector output document, one file per panorama.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionSeed {
    pub detections: Vec<NewDetection>,
}

/// A reviewer's verdict on a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Confirm,
    Reject,
}

impl ReviewAction {
    pub fn name(self) -> &'static str {
        match self {
            ReviewAction::Confirm => "confirm",
            ReviewAction::Reject => "reject",
        }
    }

    /// Strict parse: review actions, unlike face names, have no fallback.
    pub fn parse(s: &str) -> Option<ReviewAction> {
        match s {
            "confirm" => Some(ReviewAction::Confirm),
            "reject" => Some(ReviewAction::Reject),
            _ => None,
        }
    }
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One append-only entry in a detection's review history.
#[derive(Debug, Clone)]
pub struct Review {
    pub id: i64,
    pub detection_id: i64,
    pub action: ReviewAction,
    pub reviewer: String,
    pub new_class: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Derived confirm/reject/pending state of a detection. Never stored; always
/// recomputed from the time-ordered review history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Confirmed,
    Rejected,
}

/// A detection joined with its derived review state for listing and
/// conversion.
#[derive(Debug, Clone)]
pub struct ReviewedDetection {
    pub detection: Detection,
    pub status: ReviewStatus,
    pub review_action: Option<ReviewAction>,
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Replacement class from the latest review row, when one was supplied.
    pub new_class: Option<String>,
}

/// The attribute bag copied from a source detection onto its asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetAttributes {
    pub confidence: f32,
    pub face: Face,
    pub bbox_xywh: BboxXywh,
    pub model_version: String,
}

/// A confirmed detection promoted to a durable record with point geometry.
#[derive(Debug, Clone)]
pub struct Asset {
    pub id: i64,
    pub property_id: Option<i64>,
    pub ifc_class: String,
    pub status: String,
    pub source_detection_ids: Vec<i64>,
    pub attributes: AssetAttributes,
    pub geometry: Option<GeoPoint>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_parse_round_trips_canonical_names() {
        for face in Face::ALL {
            assert_eq!(Face::parse(face.name()), face);
        }
    }

    #[test]
    fn unknown_face_names_fall_back_to_front() {
        assert_eq!(Face::parse("up"), Face::Front);
        assert_eq!(Face::parse("down"), Face::Front);
        assert_eq!(Face::parse(""), Face::Front);
        assert_eq!(Face::parse("FRONT"), Face::Front);
    }

    #[test]
    fn face_deserialize_uses_fallback() {
        let face: Face = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(face, Face::Left);
        let face: Face = serde_json::from_str("\"sideways\"").unwrap();
        assert_eq!(face, Face::Front);
    }

    #[test]
    fn bbox_serializes_as_array() {
        let bbox = BboxXywh::new(0.5, 0.25, 0.1, 0.2);
        assert_eq!(serde_json::to_string(&bbox).unwrap(), "[0.5,0.25,0.1,0.2]");
    }

    #[test]
    fn bbox_clamp_handles_out_of_range_and_non_finite() {
        let bbox = BboxXywh::new(-0.5, 1.5, f32::NAN, f32::INFINITY).clamped();
        assert_eq!(bbox.0, [0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn review_action_parse_is_strict() {
        assert_eq!(ReviewAction::parse("confirm"), Some(ReviewAction::Confirm));
        assert_eq!(ReviewAction::parse("reject"), Some(ReviewAction::Reject));
        assert_eq!(ReviewAction::parse("approve"), None);
    }

    #[test]
    fn geometry_requires_lon_and_lat() {
        let mut pano = Panorama {
            id: 1,
            property_id: None,
            level: None,
            area: None,
            lat: Some(41.8),
            lon: None,
            alt: None,
            captured_at: None,
            created_at: Utc::now(),
            faces: Vec::new(),
        };
        assert!(pano.geometry().is_none());
        pano.lon = Some(-87.6);
        let point = pano.geometry().unwrap();
        assert_eq!(point.lon, -87.6);
        assert_eq!(point.lat, 41.8);
        assert_eq!(point.alt, 0.0);
    }
}
