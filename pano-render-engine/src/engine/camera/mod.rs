pub mod pano_camera;

pub use pano_camera::{PanoCamera, pano_camera_controller};
