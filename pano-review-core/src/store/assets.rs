//! Asset rows and their source-detection links.

use rusqlite::{Row, Transaction, params};

use super::{Store, now_ts, ts_from_sql};
use crate::error::CoreError;
use crate::model::{Asset, AssetAttributes, GeoPoint};

/// Everything needed to write one asset row inside a conversion transaction.
pub(crate) struct NewAsset<'a> {
    pub property_id: Option<i64>,
    pub ifc_class: &'a str,
    pub status: &'a str,
    pub attributes: &'a AssetAttributes,
    pub geometry: Option<GeoPoint>,
    pub source_detection_id: i64,
}

/// True when some asset already records this detection as a source.
pub(crate) fn detection_converted_tx(
    tx: &Transaction<'_>,
    detection_id: i64,
) -> Result<bool, CoreError> {
    let count: i64 = tx.query_row(
        "SELECT COUNT(*) FROM asset_sources WHERE detection_id = ?",
        [detection_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Insert one asset and its source link. Surfaces the raw rusqlite error so
/// the conversion engine can map constraint violations to conflicts.
pub(crate) fn insert_asset_tx(
    tx: &Transaction<'_>,
    new: &NewAsset<'_>,
) -> Result<i64, rusqlite::Error> {
    let attributes_json = serde_json::to_string(new.attributes).map_err(|e| {
        rusqlite::Error::ToSqlConversionFailure(Box::new(e))
    })?;
    tx.execute(
        r#"
        INSERT INTO assets (property_id, ifc_class, status, attributes, geom_lon, geom_lat, geom_alt, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            new.property_id,
            new.ifc_class,
            new.status,
            attributes_json,
            new.geometry.map(|g| g.lon),
            new.geometry.map(|g| g.lat),
            new.geometry.map(|g| g.alt),
            now_ts(),
        ],
    )?;
    let asset_id = tx.last_insert_rowid();
    tx.execute(
        "INSERT INTO asset_sources (asset_id, detection_id) VALUES (?, ?)",
        params![asset_id, new.source_detection_id],
    )?;
    Ok(asset_id)
}

fn asset_from_row(row: &Row<'_>) -> rusqlite::Result<Asset> {
    let attributes_raw: String = row.get(4)?;
    let attributes: AssetAttributes = serde_json::from_str(&attributes_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let geometry = match (
        row.get::<_, Option<f64>>(5)?,
        row.get::<_, Option<f64>>(6)?,
        row.get::<_, Option<f64>>(7)?,
    ) {
        (Some(lon), Some(lat), alt) => Some(GeoPoint {
            lon,
            lat,
            alt: alt.unwrap_or(0.0),
        }),
        _ => None,
    };
    Ok(Asset {
        id: row.get(0)?,
        property_id: row.get(1)?,
        ifc_class: row.get(2)?,
        status: row.get(3)?,
        source_detection_ids: Vec::new(),
        attributes,
        geometry,
        created_at: ts_from_sql(8, row.get(8)?)?,
    })
}

const ASSET_COLUMNS: &str =
    "id, property_id, ifc_class, status, attributes, geom_lon, geom_lat, geom_alt, created_at";

impl Store {
    pub fn get_asset(&self, id: i64) -> Result<Option<Asset>, CoreError> {
        let result = self.conn.query_row(
            &format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = ?"),
            [id],
            asset_from_row,
        );
        let mut asset = match result {
            Ok(asset) => asset,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        asset.source_detection_ids = self.asset_source_ids(id)?;
        Ok(Some(asset))
    }

    /// All assets, optionally filtered to one property.
    pub fn list_assets(&self, property_id: Option<i64>) -> Result<Vec<Asset>, CoreError> {
        let mut assets = match property_id {
            Some(pid) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {ASSET_COLUMNS} FROM assets WHERE property_id = ? ORDER BY id"
                ))?;
                let rows = stmt.query_map([pid], asset_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare(&format!("SELECT {ASSET_COLUMNS} FROM assets ORDER BY id"))?;
                let rows = stmt.query_map([], asset_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };
        for asset in &mut assets {
            asset.source_detection_ids = self.asset_source_ids(asset.id)?;
        }
        Ok(assets)
    }

    fn asset_source_ids(&self, asset_id: i64) -> Result<Vec<i64>, CoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT detection_id FROM asset_sources WHERE asset_id = ? ORDER BY detection_id")?;
        let ids = stmt
            .query_map([asset_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }
}
