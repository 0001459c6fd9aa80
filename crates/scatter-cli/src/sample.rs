//! Random sample files for trying out an upload.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const REGIONS: &[&str] = &["north", "south", "east", "west"];
const PRODUCTS: &[&str] = &["widget", "gadget", "gizmo", "doohickey", "sprocket"];

/// Write `count` files into `dir`, alternating CSV and JSON lines. Returns
/// the paths written. The same seed always produces the same files.
pub fn generate(dir: &Path, count: usize, rows: usize, seed: Option<u64>) -> eyre::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .map_err(|e| eyre::eyre!("failed to create {}: {e}", dir.display()))?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut written = Vec::with_capacity(count);
    for i in 1..=count {
        let (name, body) = if i % 2 == 1 {
            (format!("sales_{i:04}.csv"), csv_body(&mut rng, rows))
        } else {
            (format!("events_{i:04}.jsonl"), jsonl_body(&mut rng, rows))
        };
        let path = dir.join(name);
        std::fs::write(&path, body)?;
        written.push(path);
    }

    tracing::info!(dir = %dir.display(), count, "sample files written");
    Ok(written)
}

fn csv_body(rng: &mut StdRng, rows: usize) -> String {
    let mut out = String::from("order_id,region,product,quantity,amount\n");
    for _ in 0..rows {
        let quantity: u32 = rng.random_range(1..=20);
        let cents: u32 = rng.random_range(100..=50_000);
        out.push_str(&format!(
            "{},{},{},{},{}.{:02}\n",
            rng.random_range(100_000..1_000_000u32),
            pick(rng, REGIONS),
            pick(rng, PRODUCTS),
            quantity,
            cents / 100,
            cents % 100
        ));
    }
    out
}

fn jsonl_body(rng: &mut StdRng, rows: usize) -> String {
    let mut out = String::new();
    for _ in 0..rows {
        let event = serde_json::json!({
            "session": format!("{:016x}", rng.random::<u64>()),
            "region": pick(rng, REGIONS),
            "product": pick(rng, PRODUCTS),
            "clicks": rng.random_range(0..100u32),
        });
        out.push_str(&event.to_string());
        out.push('\n');
    }
    out
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}
