//! The six interior face quads of the panorama cube.
//!
//! Faces render an unlit black placeholder until their texture arrives, so
//! the loop never blocks on a fetch and never-uploaded faces just stay dark.

use bevy::prelude::*;
use pano_review_core::Face;
use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, PI};

use crate::constants::SKYBOX_HALF_EXTENT;

#[derive(Component)]
pub struct FaceQuad(pub Face);

/// Material handle per face so texture swaps can reach them directly.
#[derive(Resource, Default)]
pub struct SkyboxFaces {
    pub materials: HashMap<Face, Handle<StandardMaterial>>,
}

fn placeholder_material() -> StandardMaterial {
    StandardMaterial {
        base_color: Color::BLACK,
        unlit: true,
        cull_mode: None,
        ..default()
    }
}

/// Each quad sits on its face plane with the mesh normal pointing back at
/// the viewer in the cube center.
fn face_transform(face: Face, half: f32) -> Transform {
    match face {
        Face::Front => {
            Transform::from_xyz(0.0, 0.0, half).with_rotation(Quat::from_rotation_y(PI))
        }
        Face::Back => Transform::from_xyz(0.0, 0.0, -half),
        Face::Left => {
            Transform::from_xyz(-half, 0.0, 0.0).with_rotation(Quat::from_rotation_y(FRAC_PI_2))
        }
        Face::Right => {
            Transform::from_xyz(half, 0.0, 0.0).with_rotation(Quat::from_rotation_y(-FRAC_PI_2))
        }
        Face::Top => {
            Transform::from_xyz(0.0, half, 0.0).with_rotation(Quat::from_rotation_x(FRAC_PI_2))
        }
        Face::Bottom => {
            Transform::from_xyz(0.0, -half, 0.0).with_rotation(Quat::from_rotation_x(-FRAC_PI_2))
        }
    }
}

pub fn spawn_skybox(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut skybox: ResMut<SkyboxFaces>,
) {
    let size = SKYBOX_HALF_EXTENT * 2.0;
    let quad = meshes.add(Rectangle::new(size, size));
    for face in Face::ALL {
        let material = materials.add(placeholder_material());
        skybox.materials.insert(face, material.clone());
        commands.spawn((
            Mesh3d(quad.clone()),
            MeshMaterial3d(material),
            face_transform(face, SKYBOX_HALF_EXTENT),
            FaceQuad(face),
        ));
    }
}

/// Drop every face back to the black placeholder, releasing any texture the
/// material was holding. Used when the active panorama changes.
pub fn reset_faces_to_placeholder(
    skybox: &SkyboxFaces,
    materials: &mut Assets<StandardMaterial>,
) {
    for handle in skybox.materials.values() {
        if let Some(material) = materials.get_mut(handle) {
            material.base_color_texture = None;
            material.base_color = Color::BLACK;
        }
    }
}
