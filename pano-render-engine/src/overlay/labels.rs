//! Keeps label UI nodes glued to their world-space anchors.

use bevy::prelude::*;

use super::detection_overlay::DetectionLabel;

/// Project each label anchor through the camera every frame. Anchors behind
/// the camera fail the projection and hide their label.
pub fn position_detection_labels(
    camera_query: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut labels: Query<(&DetectionLabel, &mut Node, &mut Visibility)>,
) {
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    for (label, mut node, mut visibility) in &mut labels {
        match camera.world_to_viewport(camera_transform, label.anchor) {
            Ok(position) => {
                node.left = Val::Px(position.x);
                node.top = Val::Px(position.y);
                *visibility = Visibility::Visible;
            }
            Err(_) => {
                *visibility = Visibility::Hidden;
            }
        }
    }
}
