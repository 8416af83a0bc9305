pub mod pano_assets;
pub mod scene_assets;
