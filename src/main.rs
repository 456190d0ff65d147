use std::ffi::OsStr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde_json::{json, Value as JsonValue};

use loci_layers::{
    Classification, LociReader, NpyVolumeReader, PointsLayer, ReaderConfig, VolumeReader,
};

/// Print the layers of one field of view folder as JSON.
///
/// Usage: `loci-layers <folder> [config.json]`
fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let Some(folder) = args.next().map(PathBuf::from) else {
        bail!("usage: loci-layers <folder> [config.json]");
    };
    let config = match args.next() {
        Some(path) => ReaderConfig::from_json_file(PathBuf::from(path))
            .context("loading configuration")?,
        None => ReaderConfig::default(),
    };

    let reader = LociReader::new(&config)?;
    let fov = match reader.classify(&folder)? {
        Classification::Accepted(fov) => fov,
        Classification::Rejected(why) => bail!("{}: {why}", folder.display()),
    };
    let (failures, successes) = reader
        .read_points_layers(&fov)
        .with_context(|| format!("reading points tables for {}", fov.key))?;

    let volume_path = fov.volume_path.display().to_string();
    // Only .npy volumes can be decoded here; anything else is reported by path.
    let volume = if fov.volume_path.extension() == Some(OsStr::new("npy")) {
        let data = NpyVolumeReader
            .read_volume(&fov.volume_path)
            .context("reading volume")?;
        json!({ "path": volume_path, "shape": data.shape() })
    } else {
        json!({ "path": volume_path })
    };

    let doc = json!({
        "key": fov.key,
        "layers": [
            { "type": "image", "data": volume, "params": {} },
            points_json(&failures),
            points_json(&successes),
        ],
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn points_json(layer: &PointsLayer) -> JsonValue {
    json!({
        "type": layer.kind(),
        "data": layer.data,
        "params": layer.params_map(),
    })
}
