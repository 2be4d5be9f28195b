//! Writes a demo CSV so the explorer can be tried without hunting for data:
//! `cargo run --bin generate_sample [path]` (default `sample_data.csv`).

use anyhow::{Context, Result};

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

    fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, n: usize) -> usize {
        (self.uniform() * n as f64) as usize % n
    }
}

const REGIONS: [&str; 5] = ["North", "South", "East", "West", "Central"];
const PRODUCTS: [&str; 6] = ["Widget", "Gadget", "Sprocket", "Gear", "Flange", "Bolt"];
const ROWS: usize = 500;

fn main() -> Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_data.csv".to_string());

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {path}"))?;
    writer.write_record(["region", "product", "order_date", "units", "unit_price", "returned"])?;

    let mut rng = SimpleRng::new(42);
    for _ in 0..ROWS {
        let region = REGIONS[rng.range(REGIONS.len())];
        let product = PRODUCTS[rng.range(PRODUCTS.len())];
        let month = 1 + rng.range(12);
        let day = 1 + rng.range(28);
        let date = format!("2024-{month:02}-{day:02}");
        let units = (1 + rng.range(50)).to_string();
        let price = format!("{:.2}", 5.0 + rng.uniform() * 95.0);
        let returned = (rng.uniform() < 0.07).to_string();

        writer.write_record([
            region,
            product,
            date.as_str(),
            units.as_str(),
            price.as_str(),
            returned.as_str(),
        ])?;
    }

    writer.flush().context("flushing CSV")?;
    log::info!("Wrote {ROWS} rows to {path}");
    println!("Wrote {ROWS} rows to {path}");
    Ok(())
}
