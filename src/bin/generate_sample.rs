use std::fs::File;
use std::io::BufWriter;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// One generated record. `None` fields are written as empty CSV cells and
/// JSON `null`.
#[derive(Serialize)]
struct Record {
    id: i64,
    age: Option<i64>,
    income: Option<f64>,
    score: f64,
    city: String,
    segment: Option<String>,
    member: bool,
}

const ROWS: i64 = 250;
const CITIES: [&str; 6] = ["Lisbon", "Oslo", "Madrid", "Berlin", "Vienna", "Prague"];
const SEGMENTS: [&str; 3] = ["retail", "wholesale", "online"];

fn generate(rng: &mut SimpleRng) -> Vec<Record> {
    (0..ROWS)
        .map(|id| {
            let age = rng.gauss(41.0, 12.0).clamp(18.0, 90.0).round();
            // income grows with age so the correlation heatmap has structure
            let income = 18_000.0 + age * 850.0 + rng.gauss(0.0, 9_000.0);
            let score = (income / 1_000.0 + rng.gauss(0.0, 8.0)).max(0.0);
            Record {
                id,
                age: (!rng.chance(0.05)).then_some(age as i64),
                income: (!rng.chance(0.08)).then_some((income * 100.0).round() / 100.0),
                score: (score * 10.0).round() / 10.0,
                city: rng.pick(&CITIES).to_string(),
                segment: (!rng.chance(0.1)).then(|| rng.pick(&SEGMENTS).to_string()),
                member: rng.chance(0.4),
            }
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);
    let records = generate(&mut rng);

    let csv_path = "sample_data.csv";
    let mut writer =
        csv::Writer::from_path(csv_path).with_context(|| format!("creating {csv_path}"))?;
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    let json_path = "sample_data.json";
    let file = File::create(json_path).with_context(|| format!("creating {json_path}"))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &records)?;

    info!("Generated {} rows", records.len());
    println!("Wrote {} records to {csv_path} and {json_path}", records.len());
    Ok(())
}
