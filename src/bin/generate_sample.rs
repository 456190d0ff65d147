use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::json;

// Volume geometry (t, c, z, y, x) of the synthetic field of view.
const SHAPE: [usize; 5] = [1, 1, 12, 64, 64];
const FOV_KEY: &str = "P0001";
const FAIL_CODES: [&str; 6] = ["R", "S", "xy", "z", "R;S", "R;S;xy;z"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

/// One spot: (trace, timepoint, z, y, x).
type Spot = (u32, u32, f64, f64, f64);

fn random_spot(rng: &mut SimpleRng, trace: u32) -> Spot {
    let timepoint = rng.below(80) as u32;
    let z = rng.uniform(0.0, (SHAPE[2] - 1) as f64);
    let y = rng.uniform(0.0, SHAPE[3] as f64);
    let x = rng.uniform(0.0, SHAPE[4] as f64);
    (trace, timepoint, z, y, x)
}

fn write_pass_table(path: &Path, spots: &[Spot]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating QC-pass table")?;
    writer.write_record(["traceIndex", "timeIndex", "z", "y", "x"])?;
    for &(trace, timepoint, z, y, x) in spots {
        writer.write_record(&[
            trace.to_string(),
            timepoint.to_string(),
            z.to_string(),
            y.to_string(),
            x.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_fail_table(path: &Path, spots: &[(Spot, &str)]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating QC-fail table")?;
    writer.write_record(["traceIndex", "timeIndex", "z", "y", "x", "failCode"])?;
    for &((trace, timepoint, z, y, x), codes) in spots {
        writer.write_record(&[
            trace.to_string(),
            timepoint.to_string(),
            z.to_string(),
            y.to_string(),
            x.to_string(),
            codes.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Zarr v2 array metadata only; with no chunks every pixel is the fill value.
fn write_volume_metadata(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).context("creating volume folder")?;
    let zarray = json!({
        "zarr_format": 2,
        "shape": SHAPE,
        "chunks": SHAPE,
        "dtype": "<u2",
        "compressor": null,
        "fill_value": 0,
        "order": "C",
        "filters": null,
    });
    fs::write(dir.join(".zarray"), serde_json::to_string_pretty(&zarray)?)
        .context("writing .zarray")?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_fov"));
    fs::create_dir_all(&out_dir).context("creating output folder")?;

    let mut rng = SimpleRng::new(42);

    let mut passed: Vec<Spot> = Vec::new();
    let mut failed: Vec<(Spot, &str)> = Vec::new();
    for trace in 0..20u32 {
        for _ in 0..5 {
            let spot = random_spot(&mut rng, trace);
            if rng.next_f64() < 0.7 {
                passed.push(spot);
            } else {
                failed.push((spot, FAIL_CODES[rng.below(FAIL_CODES.len())]));
            }
        }
    }

    write_pass_table(&out_dir.join(format!("{FOV_KEY}.qcpass.csv")), &passed)?;
    write_fail_table(&out_dir.join(format!("{FOV_KEY}.qcfail.csv")), &failed)?;
    write_volume_metadata(&out_dir.join(format!("{FOV_KEY}.zarr")))?;

    println!(
        "Wrote {} QC-pass and {} QC-fail spots for {FOV_KEY} to {}",
        passed.len(),
        failed.len(),
        out_dir.display()
    );
    Ok(())
}
