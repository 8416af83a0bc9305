//! Command-line glue over the review core: ingest panoramas, seed detector
//! output, append reviews, convert confirmed detections to assets, and
//! export scenes for the render engine.

mod export;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pano_review_core::convert::convert_panorama;
use pano_review_core::review::{self, ReviewRequest};
use pano_review_core::{DetectionSeed, Face, NewFaceImage, NewPanorama, Store};

const DEFAULT_DB: &str = "pano-review.sqlite";

fn print_usage() {
    println!(
        r#"pano-ingest-tool — panorama detection review pipeline

Usage:
  pano-ingest-tool <command> [args] [--db <path>]

Commands:
  ingest <face>=<image> ... [--lat N] [--lon N] [--alt N] [--area S]
                            [--property N] [--level S] [--captured-at RFC3339]
      Create a panorama from up to six face images (face names:
      top bottom front back left right). At least one face is required.
  seed-detections <pano_id> <detections.json>
      Load detector output into a panorama.
  detections <pano_id>
      List a panorama's detections with their derived review status.
  review <detection_id> <confirm|reject> [--reviewer S] [--class S] [--note S]
      Append one review to a detection's history.
  convert <pano_id>
      Promote confirmed detections to assets (idempotent).
  assets [--property N]
      List assets, optionally filtered by property.
  export-scene <out_dir> [--prefix scenes]
      Write manifests, detection sets, and face images for the viewer.

The database path defaults to ./{DEFAULT_DB}; set PANO_LOG to control log
verbosity."#
    );
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("PANO_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

/// Pull `--db <path>` out of the argument list, leaving the rest in place.
fn take_db_path(args: &mut Vec<String>) -> PathBuf {
    if let Some(pos) = args.iter().position(|a| a == "--db") {
        if pos + 1 < args.len() {
            let path = args.remove(pos + 1);
            args.remove(pos);
            return PathBuf::from(path);
        }
    }
    PathBuf::from(DEFAULT_DB)
}

fn take_flag(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    if pos + 1 >= args.len() {
        return None;
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Some(value)
}

fn run() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args[0] == "--help" || args[0] == "-h" {
        print_usage();
        return Ok(());
    }
    let command = args.remove(0);
    let db_path = take_db_path(&mut args);
    let mut store = Store::open(&db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;
    store.initialize()?;

    match command.as_str() {
        "ingest" => cmd_ingest(&mut store, args),
        "seed-detections" => cmd_seed_detections(&store, args),
        "detections" => cmd_detections(&store, args),
        "review" => cmd_review(&store, args),
        "convert" => cmd_convert(&mut store, args),
        "assets" => cmd_assets(&store, args),
        "export-scene" => cmd_export_scene(&store, args),
        _ => {
            print_usage();
            bail!("unknown command `{command}`");
        }
    }
}

fn parse_face_name(name: &str) -> Result<Face> {
    Face::ALL
        .into_iter()
        .find(|f| f.name() == name)
        .with_context(|| format!("unknown face `{name}` (expected one of top bottom front back left right)"))
}

fn cmd_ingest(store: &mut Store, mut args: Vec<String>) -> Result<()> {
    let mut meta = NewPanorama {
        lat: take_flag(&mut args, "--lat").map(|v| v.parse()).transpose()?,
        lon: take_flag(&mut args, "--lon").map(|v| v.parse()).transpose()?,
        alt: take_flag(&mut args, "--alt").map(|v| v.parse()).transpose()?,
        area: take_flag(&mut args, "--area"),
        property_id: take_flag(&mut args, "--property")
            .map(|v| v.parse())
            .transpose()?,
        level: take_flag(&mut args, "--level"),
        captured_at: None,
    };
    if let Some(raw) = take_flag(&mut args, "--captured-at") {
        let parsed: DateTime<Utc> = DateTime::parse_from_rfc3339(&raw)
            .with_context(|| format!("invalid --captured-at `{raw}`"))?
            .with_timezone(&Utc);
        meta.captured_at = Some(parsed);
    }

    let mut faces = Vec::new();
    for arg in &args {
        let Some((name, path)) = arg.split_once('=') else {
            bail!("expected <face>=<image>, got `{arg}`");
        };
        let face = parse_face_name(name)?;
        let bytes = fs::read(path).with_context(|| format!("reading {path}"))?;
        faces.push(NewFaceImage { face, bytes });
    }

    let pano_id = store.insert_panorama(&meta, &faces)?;
    println!("created panorama {pano_id} with {} faces", faces.len());
    Ok(())
}

fn cmd_seed_detections(store: &Store, args: Vec<String>) -> Result<()> {
    let [pano_id, path] = args.as_slice() else {
        bail!("usage: seed-detections <pano_id> <detections.json>");
    };
    let pano_id: i64 = pano_id.parse().context("invalid pano id")?;
    let raw = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let seed: DetectionSeed = serde_json::from_str(&raw).context("parsing detection seed")?;
    let mut ids = Vec::new();
    for detection in &seed.detections {
        ids.push(store.insert_detection(pano_id, detection)?);
    }
    println!("seeded {} detections into panorama {pano_id}", ids.len());
    Ok(())
}

fn cmd_detections(store: &Store, args: Vec<String>) -> Result<()> {
    let [pano_id] = args.as_slice() else {
        bail!("usage: detections <pano_id>");
    };
    let pano_id: i64 = pano_id.parse().context("invalid pano id")?;
    let reviewed = review::list_with_status(store, pano_id)?;
    if reviewed.is_empty() {
        println!("no detections for panorama {pano_id}");
        return Ok(());
    }
    for entry in &reviewed {
        let d = &entry.detection;
        println!(
            "#{:<5} {:<20} {:>5.2}  {:<7} {:?}  {:?}",
            d.id, d.ifc_class, d.confidence, d.face, d.bbox.0, entry.status
        );
    }
    Ok(())
}

fn cmd_review(store: &Store, mut args: Vec<String>) -> Result<()> {
    let reviewer = take_flag(&mut args, "--reviewer").unwrap_or_else(|| "cli".to_string());
    let new_class = take_flag(&mut args, "--class");
    let note = take_flag(&mut args, "--note");
    let [detection_id, action] = args.as_slice() else {
        bail!("usage: review <detection_id> <confirm|reject>");
    };
    let detection_id: i64 = detection_id.parse().context("invalid detection id")?;

    review::submit_review(
        store,
        &ReviewRequest {
            detection_id,
            action: action.clone(),
            reviewer,
            new_class,
            note,
        },
    )?;
    let status = review::current_status(store, detection_id)?;
    println!("detection {detection_id} is now {status:?}");
    Ok(())
}

fn cmd_convert(store: &mut Store, args: Vec<String>) -> Result<()> {
    let [pano_id] = args.as_slice() else {
        bail!("usage: convert <pano_id>");
    };
    let pano_id: i64 = pano_id.parse().context("invalid pano id")?;
    let created = convert_panorama(store, pano_id)?;
    if created.is_empty() {
        println!("nothing to do: confirmed detections were already converted");
    } else {
        let ids: Vec<String> = created.iter().map(|id| id.to_string()).collect();
        println!("created {} assets: {}", created.len(), ids.join(", "));
    }
    Ok(())
}

fn cmd_assets(store: &Store, mut args: Vec<String>) -> Result<()> {
    let property_id = take_flag(&mut args, "--property")
        .map(|v| v.parse())
        .transpose()
        .context("invalid property id")?;
    let assets = store.list_assets(property_id)?;
    if assets.is_empty() {
        println!("no assets");
        return Ok(());
    }
    for asset in &assets {
        let geom = asset
            .geometry
            .map(|g| format!("({}, {}, {})", g.lon, g.lat, g.alt))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "#{:<5} {:<20} {:<10} sources={:?} geom={}",
            asset.id, asset.ifc_class, asset.status, asset.source_detection_ids, geom
        );
    }
    Ok(())
}

fn cmd_export_scene(store: &Store, mut args: Vec<String>) -> Result<()> {
    let prefix = take_flag(&mut args, "--prefix").unwrap_or_else(|| "scenes".to_string());
    let [out_dir] = args.as_slice() else {
        bail!("usage: export-scene <out_dir>");
    };
    export::export_scene(store, PathBuf::from(out_dir).as_path(), &prefix)?;
    println!("scene exported to {out_dir}");
    Ok(())
}
