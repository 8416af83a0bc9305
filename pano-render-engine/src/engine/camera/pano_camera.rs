//! Look-around camera for the inside of the panorama cube.

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use std::f32::consts::FRAC_PI_2;

use crate::constants::{
    DEFAULT_FOV_DEG, DRAG_SENSITIVITY, FOV_MAX_DEG, FOV_MIN_DEG, FOV_STEP_DEG,
    PITCH_LIMIT_EPSILON,
};

#[derive(Resource)]
pub struct PanoCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub fov_deg: f32,
    pub dragging: bool,
}

impl Default for PanoCamera {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            fov_deg: DEFAULT_FOV_DEG,
            dragging: false,
        }
    }
}

/// Drag to look around, wheel to zoom. Input deltas are applied to the
/// shared camera state first, then written into the transform, so a frame
/// always renders the orientation that includes this frame's input.
pub fn pano_camera_controller(
    mut camera_query: Query<(&mut Transform, &mut Projection), With<Camera3d>>,
    mut cam: ResMut<PanoCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
) {
    if mouse_button.just_pressed(MouseButton::Left) {
        cam.dragging = true;
    }
    if mouse_button.just_released(MouseButton::Left) {
        cam.dragging = false;
    }

    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    if cam.dragging && mouse_delta != Vec2::ZERO {
        cam.yaw -= mouse_delta.x * DRAG_SENSITIVITY;
        cam.pitch -= mouse_delta.y * DRAG_SENSITIVITY;
        let clamp = FRAC_PI_2 - PITCH_LIMIT_EPSILON;
        cam.pitch = cam.pitch.clamp(-clamp, clamp);
    }

    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }
    if scroll_accum.abs() > f32::EPSILON {
        // Scroll up narrows the field of view (zoom in).
        cam.fov_deg = (cam.fov_deg - scroll_accum * FOV_STEP_DEG).clamp(FOV_MIN_DEG, FOV_MAX_DEG);
    }

    if let Ok((mut transform, mut projection)) = camera_query.single_mut() {
        transform.rotation = Quat::from_euler(EulerRot::YXZ, cam.yaw, cam.pitch, 0.0);
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.fov = cam.fov_deg.to_radians();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_clamp_stays_inside_vertical() {
        let clamp = FRAC_PI_2 - PITCH_LIMIT_EPSILON;
        let pitch = (-10.0f32).clamp(-clamp, clamp);
        assert!(pitch > -FRAC_PI_2);
        let pitch = (10.0f32).clamp(-clamp, clamp);
        assert!(pitch < FRAC_PI_2);
    }

    #[test]
    fn fov_steps_stay_in_range() {
        let mut fov = DEFAULT_FOV_DEG;
        for _ in 0..100 {
            fov = (fov - FOV_STEP_DEG).clamp(FOV_MIN_DEG, FOV_MAX_DEG);
        }
        assert_eq!(fov, FOV_MIN_DEG);
        for _ in 0..100 {
            fov = (fov + FOV_STEP_DEG).clamp(FOV_MIN_DEG, FOV_MAX_DEG);
        }
        assert_eq!(fov, FOV_MAX_DEG);
    }
}
