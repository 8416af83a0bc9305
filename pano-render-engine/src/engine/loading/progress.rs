use bevy::prelude::*;

#[derive(Resource, Default)]
pub struct LoadingProgress {
    pub index_loaded: bool,
    pub manifest_loaded: bool,
}
