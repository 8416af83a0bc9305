pub const SCHEMA: &str = r#"
-- Panoramas: one six-sided capture. Immutable once created.
CREATE TABLE IF NOT EXISTS panoramas (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    property_id INTEGER,
    level TEXT,
    area TEXT,
    lat REAL,
    lon REAL,
    alt REAL,
    captured_at TEXT,
    created_at TEXT NOT NULL
);

-- Face images, at most one per canonical face name.
CREATE TABLE IF NOT EXISTS pano_faces (
    pano_id INTEGER NOT NULL,
    face TEXT NOT NULL,
    content_type TEXT NOT NULL,
    byte_len INTEGER NOT NULL,
    data BLOB NOT NULL,
    PRIMARY KEY (pano_id, face),
    FOREIGN KEY (pano_id) REFERENCES panoramas(id) ON DELETE CASCADE
);

-- Machine-generated candidate detections. Written by the detector seeding
-- path only; never updated.
CREATE TABLE IF NOT EXISTS detections (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    pano_id INTEGER NOT NULL,
    face TEXT NOT NULL,
    ifc_class TEXT NOT NULL,
    confidence REAL NOT NULL,
    bbox_xywh TEXT NOT NULL,  -- JSON array [cx, cy, w, h]
    model_version TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (pano_id) REFERENCES panoramas(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_detections_pano ON detections(pano_id);

-- Append-only review history. No update or delete path exists.
CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    detection_id INTEGER NOT NULL,
    action TEXT NOT NULL,  -- 'confirm' or 'reject'
    reviewer TEXT NOT NULL,
    new_class TEXT,
    note TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY (detection_id) REFERENCES detections(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_reviews_detection ON reviews(detection_id, created_at);

-- Promoted assets.
CREATE TABLE IF NOT EXISTS assets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    property_id INTEGER,
    ifc_class TEXT NOT NULL,
    status TEXT NOT NULL,
    attributes TEXT NOT NULL,  -- JSON bag copied from the source detection
    geom_lon REAL,
    geom_lat REAL,
    geom_alt REAL,
    created_at TEXT NOT NULL
);

-- Which detections produced which asset. The UNIQUE constraint on
-- detection_id is what makes conversion idempotent under races: a detection
-- can only ever be recorded as the source of one asset.
CREATE TABLE IF NOT EXISTS asset_sources (
    asset_id INTEGER NOT NULL,
    detection_id INTEGER NOT NULL UNIQUE,
    PRIMARY KEY (asset_id, detection_id),
    FOREIGN KEY (asset_id) REFERENCES assets(id) ON DELETE CASCADE,
    FOREIGN KEY (detection_id) REFERENCES detections(id)
);
"#;

// Additive migrations for databases created before a column existed. Each
// statement is attempted and failures (column already present) are ignored.
pub const MIGRATIONS: &[&str] = &["ALTER TABLE panoramas ADD COLUMN area TEXT"];
