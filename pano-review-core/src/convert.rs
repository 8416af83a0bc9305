//! Promotion of confirmed detections into durable asset records.
//!
//! Conversion is idempotent: a detection that already appears in some
//! asset's source set is skipped, and the UNIQUE constraint on
//! `asset_sources.detection_id` backstops the check when two conversions
//! race — the loser surfaces [`CoreError::ConversionConflict`] and may retry.

use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::{AssetAttributes, ReviewStatus};
use crate::review;
use crate::store::assets::{NewAsset, detection_converted_tx, insert_asset_tx};
use crate::store::Store;

/// Status every asset is created with.
pub const ASSET_STATUS_CONFIRMED: &str = "confirmed";

fn map_insert_error(pano_id: i64, e: rusqlite::Error) -> CoreError {
    match &e {
        rusqlite::Error::SqliteFailure(f, _)
            if f.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            CoreError::ConversionConflict(pano_id)
        }
        _ => CoreError::Storage(e),
    }
}

/// Convert every currently-confirmed detection of a panorama into an asset.
///
/// Returns the ids of the assets created by this call; a re-run over an
/// unchanged confirmed set returns an empty list and writes nothing. All
/// inserts of one call share a transaction, so the per-detection dedupe
/// checks are mutually consistent and a failure leaves no partial batch.
pub fn convert_panorama(store: &mut Store, pano_id: i64) -> Result<Vec<i64>, CoreError> {
    let pano = store
        .get_panorama(pano_id)?
        .ok_or(CoreError::PanoramaNotFound(pano_id))?;

    let reviewed = review::list_with_status(store, pano_id)?;
    let confirmed: Vec<_> = reviewed
        .into_iter()
        .filter(|d| d.status == ReviewStatus::Confirmed)
        .collect();
    if confirmed.is_empty() {
        return Err(CoreError::NoConfirmedDetections(pano_id));
    }

    let geometry = pano.geometry();
    let tx = store.conn.transaction()?;
    let mut created = Vec::new();
    for entry in &confirmed {
        let detection = &entry.detection;
        if detection_converted_tx(&tx, detection.id)? {
            debug!(detection_id = detection.id, "already converted, skipping");
            continue;
        }
        let attributes = AssetAttributes {
            confidence: detection.confidence,
            face: detection.face,
            bbox_xywh: detection.bbox,
            model_version: detection.model_version.clone(),
        };
        let ifc_class = entry.new_class.as_deref().unwrap_or(&detection.ifc_class);
        let asset_id = insert_asset_tx(
            &tx,
            &NewAsset {
                property_id: pano.property_id,
                ifc_class,
                status: ASSET_STATUS_CONFIRMED,
                attributes: &attributes,
                geometry,
                source_detection_id: detection.id,
            },
        )
        .map_err(|e| map_insert_error(pano_id, e))?;
        created.push(asset_id);
    }
    tx.commit()?;

    info!(
        pano_id,
        confirmed = confirmed.len(),
        created = created.len(),
        "conversion finished"
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BboxXywh, Face, NewDetection};
    use crate::review::{ReviewRequest, submit_review};
    use crate::testutil::{door_detection, seeded_pano, seeded_pano_without_geo};

    fn confirm(store: &Store, detection_id: i64) {
        submit_review(
            store,
            &ReviewRequest {
                detection_id,
                action: "confirm".into(),
                reviewer: "alex".into(),
                new_class: None,
                note: None,
            },
        )
        .unwrap();
    }

    fn reject(store: &Store, detection_id: i64) {
        submit_review(
            store,
            &ReviewRequest {
                detection_id,
                action: "reject".into(),
                reviewer: "alex".into(),
                new_class: None,
                note: None,
            },
        )
        .unwrap();
    }

    #[test]
    fn missing_panorama_fails() {
        let (mut store, _pano_id) = seeded_pano();
        assert!(matches!(
            convert_panorama(&mut store, 999).unwrap_err(),
            CoreError::PanoramaNotFound(999)
        ));
    }

    #[test]
    fn no_confirmed_detections_writes_nothing() {
        let (mut store, pano_id) = seeded_pano();
        let det = store
            .insert_detection(pano_id, &door_detection(Face::Front))
            .unwrap();
        // Pending only.
        assert!(matches!(
            convert_panorama(&mut store, pano_id).unwrap_err(),
            CoreError::NoConfirmedDetections(_)
        ));
        // A rejected detection does not count either.
        reject(&store, det);
        assert!(matches!(
            convert_panorama(&mut store, pano_id).unwrap_err(),
            CoreError::NoConfirmedDetections(_)
        ));
        assert!(store.list_assets(None).unwrap().is_empty());
    }

    #[test]
    fn confirmed_detection_becomes_an_asset_with_copied_attributes() {
        let (mut store, pano_id) = seeded_pano();
        let new = NewDetection {
            face: Face::Left,
            ifc_class: "IfcDoor".into(),
            confidence: 0.91,
            bbox: BboxXywh::new(0.4, 0.6, 0.2, 0.3),
            model_version: "yolo-v8.2".into(),
        };
        let det = store.insert_detection(pano_id, &new).unwrap();
        confirm(&store, det);

        let created = convert_panorama(&mut store, pano_id).unwrap();
        assert_eq!(created.len(), 1);

        let asset = store.get_asset(created[0]).unwrap().unwrap();
        assert_eq!(asset.ifc_class, "IfcDoor");
        assert_eq!(asset.status, ASSET_STATUS_CONFIRMED);
        assert_eq!(asset.source_detection_ids, vec![det]);
        assert_eq!(asset.attributes.face, Face::Left);
        assert_eq!(asset.attributes.confidence, 0.91);
        assert_eq!(asset.attributes.bbox_xywh, new.bbox);
        assert_eq!(asset.attributes.model_version, "yolo-v8.2");
        let geom = asset.geometry.unwrap();
        assert_eq!(geom.lon, -87.6);
        assert_eq!(geom.lat, 41.8);
        assert_eq!(geom.alt, 0.0);
    }

    #[test]
    fn rerun_creates_no_duplicates() {
        let (mut store, pano_id) = seeded_pano();
        let det = store
            .insert_detection(pano_id, &door_detection(Face::Front))
            .unwrap();
        confirm(&store, det);

        let first = convert_panorama(&mut store, pano_id).unwrap();
        assert_eq!(first.len(), 1);
        let second = convert_panorama(&mut store, pano_id).unwrap();
        assert!(second.is_empty());
        assert_eq!(store.list_assets(None).unwrap().len(), 1);
    }

    #[test]
    fn new_confirmations_convert_while_converted_ones_are_skipped() {
        let (mut store, pano_id) = seeded_pano();
        let first = store
            .insert_detection(pano_id, &door_detection(Face::Front))
            .unwrap();
        confirm(&store, first);
        convert_panorama(&mut store, pano_id).unwrap();

        let second = store
            .insert_detection(pano_id, &door_detection(Face::Back))
            .unwrap();
        confirm(&store, second);
        let created = convert_panorama(&mut store, pano_id).unwrap();
        assert_eq!(created.len(), 1);

        let assets = store.list_assets(None).unwrap();
        assert_eq!(assets.len(), 2);
        let mut sources: Vec<i64> = assets
            .iter()
            .flat_map(|a| a.source_detection_ids.clone())
            .collect();
        sources.sort();
        assert_eq!(sources, vec![first, second]);
    }

    #[test]
    fn geometry_is_absent_without_coordinates() {
        let (mut store, pano_id) = seeded_pano_without_geo();
        let det = store
            .insert_detection(pano_id, &door_detection(Face::Front))
            .unwrap();
        confirm(&store, det);
        let created = convert_panorama(&mut store, pano_id).unwrap();
        let asset = store.get_asset(created[0]).unwrap().unwrap();
        assert!(asset.geometry.is_none());
    }

    #[test]
    fn review_class_override_lands_on_the_asset() {
        let (mut store, pano_id) = seeded_pano();
        let det = store
            .insert_detection(pano_id, &door_detection(Face::Front))
            .unwrap();
        submit_review(
            &store,
            &ReviewRequest {
                detection_id: det,
                action: "confirm".into(),
                reviewer: "alex".into(),
                new_class: Some("IfcWindow".into()),
                note: None,
            },
        )
        .unwrap();

        let created = convert_panorama(&mut store, pano_id).unwrap();
        let asset = store.get_asset(created[0]).unwrap().unwrap();
        assert_eq!(asset.ifc_class, "IfcWindow");
        // The attribute bag still records what the detector reported.
        assert_eq!(asset.attributes.model_version, "mock-v0");
    }
}
