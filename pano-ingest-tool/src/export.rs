//! Scene export: write face images, detection sets, and manifests in the
//! shape the render engine loads from its asset directory.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

use pano_review_core::review;
use pano_review_core::scene::{DetectionRecordDoc, DetectionSetDoc, PanoManifestDoc, SceneIndexDoc};
use pano_review_core::Store;

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/tiff" => "tif",
        "image/bmp" => "bmp",
        _ => "img",
    }
}

/// Export every panorama in the store. `prefix` is the path the engine will
/// see the files under, relative to its asset root.
pub fn export_scene(store: &Store, out_dir: &Path, prefix: &str) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating export directory {}", out_dir.display()))?;

    let panos = store.list_panoramas()?;
    let mut index = SceneIndexDoc::default();
    for pano in &panos {
        let mut faces = BTreeMap::new();
        for face_info in &pano.faces {
            let image = store
                .get_face_image(pano.id, face_info.face)?
                .with_context(|| format!("face {} listed but missing", face_info.face))?;
            let file_name = format!(
                "pano_{}_{}.{}",
                pano.id,
                face_info.face,
                extension_for(&image.content_type)
            );
            fs::write(out_dir.join(&file_name), &image.bytes)?;
            faces.insert(
                face_info.face.name().to_string(),
                format!("{prefix}/{file_name}"),
            );
        }

        let reviewed = review::list_with_status(store, pano.id)?;
        let set = DetectionSetDoc {
            detections: reviewed.iter().map(DetectionRecordDoc::from).collect(),
        };
        let detections_file = format!("pano_{}.detections.json", pano.id);
        fs::write(
            out_dir.join(&detections_file),
            serde_json::to_string_pretty(&set)?,
        )?;

        let manifest = PanoManifestDoc {
            pano_id: pano.id,
            faces,
            lat: pano.lat,
            lon: pano.lon,
            alt: pano.alt,
            detections: format!("{prefix}/{detections_file}"),
        };
        let manifest_file = format!("pano_{}.pano.json", pano.id);
        fs::write(
            out_dir.join(&manifest_file),
            serde_json::to_string_pretty(&manifest)?,
        )?;
        index.panos.push(format!("{prefix}/{manifest_file}"));
    }

    fs::write(
        out_dir.join("scene.index.json"),
        serde_json::to_string_pretty(&index)?,
    )?;
    info!(
        panoramas = panos.len(),
        out = %out_dir.display(),
        "scene exported"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pano_review_core::{Face, NewFaceImage, NewPanorama};

    const PNG_STUB: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
        0x44, 0x52,
    ];

    #[test]
    fn export_writes_index_manifest_detections_and_images() {
        let mut store = Store::open_in_memory().unwrap();
        store.initialize().unwrap();
        let pano_id = store
            .insert_panorama(
                &NewPanorama {
                    lat: Some(41.8),
                    lon: Some(-87.6),
                    ..Default::default()
                },
                &[NewFaceImage {
                    face: Face::Front,
                    bytes: PNG_STUB.to_vec(),
                }],
            )
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        export_scene(&store, dir.path(), "scenes").unwrap();

        let index: SceneIndexDoc = serde_json::from_str(
            &fs::read_to_string(dir.path().join("scene.index.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(index.panos, vec![format!("scenes/pano_{pano_id}.pano.json")]);

        let manifest: PanoManifestDoc = serde_json::from_str(
            &fs::read_to_string(dir.path().join(format!("pano_{pano_id}.pano.json"))).unwrap(),
        )
        .unwrap();
        assert_eq!(manifest.pano_id, pano_id);
        assert_eq!(
            manifest.faces.get("front").unwrap(),
            &format!("scenes/pano_{pano_id}_front.png")
        );

        let exported = fs::read(dir.path().join(format!("pano_{pano_id}_front.png"))).unwrap();
        assert_eq!(exported, PNG_STUB);

        let set: DetectionSetDoc = serde_json::from_str(
            &fs::read_to_string(dir.path().join(format!("pano_{pano_id}.detections.json")))
                .unwrap(),
        )
        .unwrap();
        assert!(set.detections.is_empty());
    }
}
