//! Detection rows. Detections are written once by the seeding path and read
//! many times; nothing here mutates an existing row.

use rusqlite::{Row, params};
use tracing::debug;

use super::{Store, now_ts, ts_from_sql};
use crate::error::CoreError;
use crate::model::{BboxXywh, Detection, Face, NewDetection};

fn detection_from_row(row: &Row<'_>) -> rusqlite::Result<Detection> {
    let bbox_raw: String = row.get(5)?;
    let bbox: BboxXywh = serde_json::from_str(&bbox_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Detection {
        id: row.get(0)?,
        pano_id: row.get(1)?,
        face: Face::parse(&row.get::<_, String>(2)?),
        ifc_class: row.get(3)?,
        confidence: row.get(4)?,
        bbox,
        model_version: row.get(6)?,
        created_at: ts_from_sql(7, row.get(7)?)?,
    })
}

const DETECTION_COLUMNS: &str =
    "id, pano_id, face, ifc_class, confidence, bbox_xywh, model_version, created_at";

impl Store {
    /// Insert one detector-produced candidate. Confidence is clamped into
    /// [0, 1]; the bbox is stored as received and clamped at geometric use.
    pub fn insert_detection(&self, pano_id: i64, new: &NewDetection) -> Result<i64, CoreError> {
        if self.get_panorama(pano_id)?.is_none() {
            return Err(CoreError::PanoramaNotFound(pano_id));
        }
        let confidence = if new.confidence.is_finite() {
            new.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let bbox_json = serde_json::to_string(&new.bbox)?;
        self.conn.execute(
            r#"
            INSERT INTO detections (pano_id, face, ifc_class, confidence, bbox_xywh, model_version, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                pano_id,
                new.face.name(),
                new.ifc_class,
                confidence,
                bbox_json,
                new.model_version,
                now_ts(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(detection_id = id, pano_id, class = %new.ifc_class, "detection seeded");
        Ok(id)
    }

    pub fn get_detection(&self, id: i64) -> Result<Option<Detection>, CoreError> {
        let result = self.conn.query_row(
            &format!("SELECT {DETECTION_COLUMNS} FROM detections WHERE id = ?"),
            [id],
            detection_from_row,
        );
        match result {
            Ok(detection) => Ok(Some(detection)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All detections for a panorama in creation order. The panorama itself
    /// must exist; an empty list is a valid result.
    pub fn list_detections(&self, pano_id: i64) -> Result<Vec<Detection>, CoreError> {
        if self.get_panorama(pano_id)?.is_none() {
            return Err(CoreError::PanoramaNotFound(pano_id));
        }
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {DETECTION_COLUMNS} FROM detections WHERE pano_id = ? ORDER BY id"
        ))?;
        let detections = stmt
            .query_map([pano_id], detection_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(detections)
    }
}
