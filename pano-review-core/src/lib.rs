//! Core of the panorama detection review pipeline: the domain model, the
//! SQLite-backed store, the cube-face coordinate mapper shared with the
//! render engine, the append-only review state machine, and the asset
//! conversion engine.

pub mod convert;
pub mod cube;
pub mod error;
pub mod model;
pub mod review;
pub mod scene;
pub mod store;

pub use error::{CoreError, ValidationError};
pub use model::{
    Asset, AssetAttributes, BboxXywh, Detection, DetectionSeed, Face, FaceImage, GeoPoint,
    NewDetection, NewFaceImage, NewPanorama, PanoFace, Panorama, Review, ReviewAction,
    ReviewStatus, ReviewedDetection,
};
pub use store::Store;
