//! Panorama rows and their face image BLOBs.

use rusqlite::params;
use tracing::info;

use super::{Store, now_ts, opt_ts_from_sql, ts_from_sql};
use crate::error::{CoreError, ValidationError};
use crate::model::{Face, FaceImage, NewFaceImage, NewPanorama, PanoFace, Panorama};

/// Sniff the payload format and return its MIME type, rejecting anything the
/// image crate does not recognize.
fn sniff_content_type(face: Face, bytes: &[u8]) -> Result<&'static str, CoreError> {
    let format = image::guess_format(bytes)
        .map_err(|_| ValidationError::NotAnImage(face.name().to_string()))?;
    Ok(format.to_mime_type())
}

impl Store {
    /// Create a panorama with its face images in one transaction. At least
    /// one face image is required; all validation runs before any write.
    pub fn insert_panorama(
        &mut self,
        meta: &NewPanorama,
        faces: &[NewFaceImage],
    ) -> Result<i64, CoreError> {
        if faces.is_empty() {
            return Err(ValidationError::NoFaces.into());
        }
        let mut sniffed = Vec::with_capacity(faces.len());
        for upload in faces {
            sniffed.push((upload, sniff_content_type(upload.face, &upload.bytes)?));
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO panoramas (property_id, level, area, lat, lon, alt, captured_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                meta.property_id,
                meta.level,
                meta.area,
                meta.lat,
                meta.lon,
                meta.alt,
                meta.captured_at.map(|t| t.to_rfc3339()),
                now_ts(),
            ],
        )?;
        let pano_id = tx.last_insert_rowid();

        for (upload, content_type) in sniffed {
            tx.execute(
                r#"
                INSERT OR REPLACE INTO pano_faces (pano_id, face, content_type, byte_len, data)
                VALUES (?, ?, ?, ?, ?)
                "#,
                params![
                    pano_id,
                    upload.face.name(),
                    content_type,
                    upload.bytes.len() as i64,
                    upload.bytes,
                ],
            )?;
        }
        tx.commit()?;

        info!(pano_id, faces = faces.len(), "panorama created");
        Ok(pano_id)
    }

    pub fn get_panorama(&self, id: i64) -> Result<Option<Panorama>, CoreError> {
        let result = self.conn.query_row(
            r#"
            SELECT id, property_id, level, area, lat, lon, alt, captured_at, created_at
            FROM panoramas
            WHERE id = ?
            "#,
            [id],
            |row| {
                Ok(Panorama {
                    id: row.get(0)?,
                    property_id: row.get(1)?,
                    level: row.get(2)?,
                    area: row.get(3)?,
                    lat: row.get(4)?,
                    lon: row.get(5)?,
                    alt: row.get(6)?,
                    captured_at: opt_ts_from_sql(7, row.get(7)?)?,
                    created_at: ts_from_sql(8, row.get(8)?)?,
                    faces: Vec::new(),
                })
            },
        );
        let mut pano = match result {
            Ok(pano) => pano,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        pano.faces = self.list_pano_faces(id)?;
        Ok(Some(pano))
    }

    pub fn list_panoramas(&self) -> Result<Vec<Panorama>, CoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, property_id, level, area, lat, lon, alt, captured_at, created_at
            FROM panoramas
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Panorama {
                id: row.get(0)?,
                property_id: row.get(1)?,
                level: row.get(2)?,
                area: row.get(3)?,
                lat: row.get(4)?,
                lon: row.get(5)?,
                alt: row.get(6)?,
                captured_at: opt_ts_from_sql(7, row.get(7)?)?,
                created_at: ts_from_sql(8, row.get(8)?)?,
                faces: Vec::new(),
            })
        })?;
        let mut panos = Vec::new();
        for row in rows {
            let mut pano = row?;
            pano.faces = self.list_pano_faces(pano.id)?;
            panos.push(pano);
        }
        Ok(panos)
    }

    fn list_pano_faces(&self, pano_id: i64) -> Result<Vec<PanoFace>, CoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT face, content_type, byte_len FROM pano_faces WHERE pano_id = ? ORDER BY face",
        )?;
        let faces = stmt
            .query_map([pano_id], |row| {
                Ok(PanoFace {
                    face: Face::parse(&row.get::<_, String>(0)?),
                    content_type: row.get(1)?,
                    byte_len: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(faces)
    }

    /// Raw bytes for one face image, `None` when that face was never uploaded.
    pub fn get_face_image(&self, pano_id: i64, face: Face) -> Result<Option<FaceImage>, CoreError> {
        let result = self.conn.query_row(
            "SELECT content_type, data FROM pano_faces WHERE pano_id = ? AND face = ?",
            params![pano_id, face.name()],
            |row| {
                Ok(FaceImage {
                    content_type: row.get(0)?,
                    bytes: row.get(1)?,
                })
            },
        );
        match result {
            Ok(img) => Ok(Some(img)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
