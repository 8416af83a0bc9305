//! Detection overlay: one outline box plus one label per surviving
//! detection, rebuilt from scratch whenever the inputs change.
//!
//! The rebuild always despawns the previous set first; dropping the old
//! entities' mesh and material handles is what releases their GPU resources,
//! so nothing accumulates across rebuilds — including when the detection
//! count drops to zero.

use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;

use pano_review_core::cube;
use pano_review_core::scene::DetectionRecordDoc;
use pano_review_core::{Face, ReviewAction, ReviewStatus};

use crate::constants::{
    CONFIDENCE_STEP, DEFAULT_MIN_CONFIDENCE, LABEL_FONT_SIZE, LABEL_NUDGE, SKYBOX_HALF_EXTENT,
};
use crate::engine::assets::pano_assets::PanoAssets;
use crate::engine::assets::scene_assets::DetectionSet;

/// Reviewed-confirmed boxes are always this green, rejected ones this red;
/// pending boxes get a per-class hash color.
pub const CONFIRMED_COLOR: Color = Color::Srgba(Srgba {
    red: 0.4,
    green: 0.733,
    blue: 0.416,
    alpha: 1.0,
});
pub const REJECTED_COLOR: Color = Color::Srgba(Srgba {
    red: 0.937,
    green: 0.325,
    blue: 0.314,
    alpha: 1.0,
});

#[derive(Resource)]
pub struct OverlaySettings {
    pub min_confidence: f32,
    pub show_labels: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            show_labels: true,
        }
    }
}

#[derive(Component)]
pub struct DetectionBox;

/// Label UI node following a fixed world-space anchor.
#[derive(Component)]
pub struct DetectionLabel {
    pub anchor: Vec3,
}

/// Derived review state of one exported detection record.
pub fn record_status(record: &DetectionRecordDoc) -> ReviewStatus {
    match record.review_action.as_deref().and_then(ReviewAction::parse) {
        Some(ReviewAction::Confirm) => ReviewStatus::Confirmed,
        Some(ReviewAction::Reject) => ReviewStatus::Rejected,
        None => ReviewStatus::Pending,
    }
}

/// Deterministic color from the class name: same class, same color for the
/// whole session. Mirrors the polynomial string hash the review UI uses.
pub fn class_color(class: &str) -> Color {
    let hash = class
        .chars()
        .fold(0u32, |h, c| h.wrapping_mul(31).wrapping_add(c as u32));
    Color::srgb(
        (hash & 0xff) as f32 / 255.0,
        ((hash >> 8) & 0xff) as f32 / 255.0,
        ((hash >> 16) & 0xff) as f32 / 255.0,
    )
}

pub fn status_color(status: ReviewStatus, class: &str) -> Color {
    match status {
        ReviewStatus::Confirmed => CONFIRMED_COLOR,
        ReviewStatus::Rejected => REJECTED_COLOR,
        ReviewStatus::Pending => class_color(class),
    }
}

pub fn label_text(record: &DetectionRecordDoc) -> String {
    let suffix = match record_status(record) {
        ReviewStatus::Confirmed => " \u{2713}",
        ReviewStatus::Rejected => " \u{2717}",
        ReviewStatus::Pending => "",
    };
    format!("{} {:.2}{}", record.ifc_class, record.confidence, suffix)
}

/// Outline mesh for one quad: four corners, four edges.
pub fn box_mesh(quad: &[Vec3; 4]) -> Mesh {
    let vertices: Vec<[f32; 3]> = quad.iter().map(|p| [p.x, p.y, p.z]).collect();
    let mut mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, vertices);
    mesh.insert_indices(Indices::U32(vec![0, 1, 1, 2, 2, 3, 3, 0]));
    mesh
}

/// Label anchor: the quad's first corner pulled inward off the face plane,
/// nudged upward on the side faces.
pub fn label_anchor(face: Face, corner: Vec3) -> Vec3 {
    let mut anchor = corner - cube::face_normal(face) * LABEL_NUDGE;
    if !matches!(face, Face::Top | Face::Bottom) {
        anchor.y += LABEL_NUDGE;
    }
    anchor
}

/// Threshold and label-visibility input: L toggles labels, -/= step the
/// confidence threshold.
pub fn overlay_settings_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut settings: ResMut<OverlaySettings>,
) {
    if keyboard.just_pressed(KeyCode::KeyL) {
        settings.show_labels = !settings.show_labels;
        info!("labels {}", if settings.show_labels { "on" } else { "off" });
    }
    if keyboard.just_pressed(KeyCode::Minus) {
        settings.min_confidence = (settings.min_confidence - CONFIDENCE_STEP).max(0.0);
        info!("confidence threshold {:.2}", settings.min_confidence);
    }
    if keyboard.just_pressed(KeyCode::Equal) {
        settings.min_confidence = (settings.min_confidence + CONFIDENCE_STEP).min(1.0);
        info!("confidence threshold {:.2}", settings.min_confidence);
    }
}

/// Tear down and rebuild the whole overlay when the detection set, the
/// active panorama, or the settings change.
pub fn rebuild_detection_overlay(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<OverlaySettings>,
    pano_assets: Res<PanoAssets>,
    detection_sets: Res<Assets<DetectionSet>>,
    mut set_events: EventReader<AssetEvent<DetectionSet>>,
    existing_boxes: Query<Entity, With<DetectionBox>>,
    existing_labels: Query<Entity, With<DetectionLabel>>,
) {
    let mut dirty = settings.is_changed() || pano_assets.is_changed();
    for event in set_events.read() {
        if matches!(
            event,
            AssetEvent::Added { .. } | AssetEvent::Modified { .. }
        ) {
            dirty = true;
        }
    }
    if !dirty {
        return;
    }

    // Release the previous generation before building the new one.
    for entity in existing_boxes.iter().chain(existing_labels.iter()) {
        commands.entity(entity).despawn();
    }

    let Some(set) = pano_assets
        .detections
        .as_ref()
        .and_then(|handle| detection_sets.get(handle))
    else {
        return;
    };

    let mut drawn = 0;
    for record in &set.0.detections {
        if record.confidence < settings.min_confidence {
            continue;
        }
        let face = Face::parse(&record.face);
        let quad = cube::face_quad(face, record.bbox_xywh, SKYBOX_HALF_EXTENT);
        let color = status_color(record_status(record), &record.ifc_class);

        commands.spawn((
            Mesh3d(meshes.add(box_mesh(&quad))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color,
                unlit: true,
                ..default()
            })),
            DetectionBox,
        ));

        if settings.show_labels {
            commands.spawn((
                Text::new(label_text(record)),
                TextFont {
                    font_size: LABEL_FONT_SIZE,
                    ..default()
                },
                TextColor(Color::WHITE),
                BackgroundColor(color.with_alpha(0.85)),
                Node {
                    position_type: PositionType::Absolute,
                    padding: UiRect::axes(Val::Px(4.0), Val::Px(1.0)),
                    ..default()
                },
                DetectionLabel {
                    anchor: label_anchor(face, quad[0]),
                },
            ));
        }
        drawn += 1;
    }
    debug!("overlay rebuilt: {drawn}/{} detections", set.0.detections.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pano_review_core::BboxXywh;

    fn record(review_action: Option<&str>) -> DetectionRecordDoc {
        DetectionRecordDoc {
            id: 1,
            face: "front".into(),
            ifc_class: "IfcDoor".into(),
            confidence: 0.87,
            bbox_xywh: BboxXywh::new(0.5, 0.5, 0.2, 0.2),
            model_version: "mock-v0".into(),
            review_action: review_action.map(str::to_string),
        }
    }

    #[test]
    fn class_colors_are_deterministic_and_distinct_per_class() {
        assert_eq!(class_color("IfcDoor"), class_color("IfcDoor"));
        assert_ne!(class_color("IfcDoor"), class_color("IfcWindow"));
    }

    #[test]
    fn reviewed_detections_use_the_fixed_colors() {
        assert_eq!(
            status_color(ReviewStatus::Confirmed, "IfcDoor"),
            CONFIRMED_COLOR
        );
        assert_eq!(
            status_color(ReviewStatus::Rejected, "IfcDoor"),
            REJECTED_COLOR
        );
        assert_eq!(
            status_color(ReviewStatus::Pending, "IfcDoor"),
            class_color("IfcDoor")
        );
    }

    #[test]
    fn record_status_follows_latest_action() {
        assert_eq!(record_status(&record(None)), ReviewStatus::Pending);
        assert_eq!(record_status(&record(Some("confirm"))), ReviewStatus::Confirmed);
        assert_eq!(record_status(&record(Some("reject"))), ReviewStatus::Rejected);
        // An unknown action string degrades to pending rather than panicking.
        assert_eq!(record_status(&record(Some("approve"))), ReviewStatus::Pending);
    }

    #[test]
    fn label_text_carries_class_confidence_and_verdict() {
        assert_eq!(label_text(&record(None)), "IfcDoor 0.87");
        assert_eq!(label_text(&record(Some("confirm"))), "IfcDoor 0.87 \u{2713}");
        assert_eq!(label_text(&record(Some("reject"))), "IfcDoor 0.87 \u{2717}");
    }

    #[test]
    fn box_mesh_has_four_corners_and_eight_edge_indices() {
        let quad = cube::face_quad(
            Face::Front,
            BboxXywh::new(0.5, 0.5, 0.2, 0.2),
            SKYBOX_HALF_EXTENT,
        );
        let mesh = box_mesh(&quad);
        assert_eq!(mesh.count_vertices(), 4);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(8));
    }

    #[test]
    fn label_anchor_is_pulled_off_the_face_plane() {
        let quad = cube::face_quad(
            Face::Front,
            BboxXywh::new(0.5, 0.5, 0.2, 0.2),
            SKYBOX_HALF_EXTENT,
        );
        let anchor = label_anchor(Face::Front, quad[0]);
        assert!(anchor.z < quad[0].z);
        assert!(anchor.y > quad[0].y);

        let quad = cube::face_quad(
            Face::Top,
            BboxXywh::new(0.5, 0.5, 0.2, 0.2),
            SKYBOX_HALF_EXTENT,
        );
        let anchor = label_anchor(Face::Top, quad[0]);
        assert!(anchor.y < quad[0].y);
    }
}
