use bevy::prelude::*;

use crate::engine::loading::progress::LoadingProgress;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}

/// The viewer starts running as soon as the first manifest is active; face
/// textures keep streaming in behind the placeholders.
pub fn transition_to_running(
    progress: Res<LoadingProgress>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if progress.manifest_loaded {
        info!("→ Panorama active, transitioning to Running state");
        next_state.set(AppState::Running);
    }
}
