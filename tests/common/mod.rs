//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use tabstat::Table;

/// Small sales table: region, product, quarter, sales, units.
pub struct SalesFixture;

impl SalesFixture {
    pub fn headers() -> [&'static str; 5] {
        ["region", "product", "quarter", "sales", "units"]
    }

    pub fn data() -> Vec<(&'static str, &'static str, &'static str, f64, f64)> {
        vec![
            ("North", "Widget", "Q1", 100.0, 10.0),
            ("North", "Widget", "Q2", 150.0, 15.0),
            ("North", "Gadget", "Q1", 200.0, 8.0),
            ("South", "Widget", "Q1", 80.0, 8.0),
            ("South", "Gadget", "Q2", 250.0, 10.0),
            ("South", "Gadget", "Q2", 50.0, 2.0),
            ("East", "Widget", "Q1", 120.0, 12.0),
            ("East", "Gadget", "Q2", 300.0, 12.0),
        ]
    }

    pub fn table() -> Table {
        let rows = Self::data()
            .into_iter()
            .map(|(r, p, q, s, u)| vec![r.to_string(), p.to_string(), q.to_string(), s.to_string(), u.to_string()])
            .collect();
        Table::new(Self::headers().iter().map(|h| h.to_string()).collect(), rows)
    }

    pub fn csv() -> String {
        let mut out = Self::headers().join(",");
        out.push('\n');
        for (r, p, q, s, u) in Self::data() {
            out.push_str(&format!("{r},{p},{q},{s},{u}\n"));
        }
        out
    }

    pub fn sales() -> Vec<f64> {
        Self::data().into_iter().map(|row| row.3).collect()
    }
}

/// Write `contents` to `name` inside a fresh temp dir.
pub fn write_temp(name: &str, contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}
