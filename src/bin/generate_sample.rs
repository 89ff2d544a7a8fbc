use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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
}

struct SalesRecord {
    region: &'static str,
    quarter: &'static str,
    product: &'static str,
    units: i64,
    sales: f64,
}

fn generate(rng: &mut SimpleRng) -> Vec<SalesRecord> {
    let regions = [("North", 1.0), ("South", 0.8), ("East", 1.2), ("West", 0.9)];
    let quarters = ["Q1", "Q2", "Q3", "Q4"];
    let products = [("Widget", 12.5), ("Gadget", 40.0), ("Gizmo", 7.25)];

    let mut records = Vec::new();
    for &(region, demand) in &regions {
        for (q, &quarter) in quarters.iter().enumerate() {
            let season = 1.0 + 0.1 * q as f64;
            for &(product, price) in &products {
                for _ in 0..3 {
                    let units = rng.gauss(50.0 * demand * season, 8.0).round().max(1.0) as i64;
                    let sales = (units as f64 * price * rng.gauss(1.0, 0.05) * 100.0).round() / 100.0;
                    records.push(SalesRecord {
                        region,
                        quarter,
                        product,
                        units,
                        sales,
                    });
                }
            }
        }
    }

    // A couple of bulk orders so the outlier analyses have something to find.
    for idx in [17, 101] {
        if let Some(r) = records.get_mut(idx) {
            r.units *= 12;
            r.sales *= 12.0;
        }
    }
    records
}

fn write_csv(path: &Path, records: &[SalesRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    writer.write_record(["region", "quarter", "product", "units", "sales"])?;
    for r in records {
        writer.write_record([
            r.region.to_string(),
            r.quarter.to_string(),
            r.product.to_string(),
            r.units.to_string(),
            format!("{:.2}", r.sales),
        ])?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(path: &Path, records: &[SalesRecord]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("region", DataType::Utf8, false),
        Field::new("quarter", DataType::Utf8, false),
        Field::new("product", DataType::Utf8, false),
        Field::new("units", DataType::Int64, false),
        Field::new("sales", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(records.iter().map(|r| r.region).collect::<Vec<_>>())),
            Arc::new(StringArray::from(records.iter().map(|r| r.quarter).collect::<Vec<_>>())),
            Arc::new(StringArray::from(records.iter().map(|r| r.product).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(records.iter().map(|r| r.units).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(records.iter().map(|r| r.sales).collect::<Vec<_>>())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_data.csv".to_string());
    let path = Path::new(&output);

    let mut rng = SimpleRng::new(42);
    let records = generate(&mut rng);

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "parquet" | "pq" => write_parquet(path, &records)?,
        _ => write_csv(path, &records)?,
    }

    println!("Wrote {} sales records to {output}", records.len());
    Ok(())
}
