use std::path::Path;

use anyhow::{bail, Context, Result};

use tabstat::data::loader::load_file;
use tabstat::report;
use tabstat::request::load_request;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [data_path, request_path] = args.as_slice() else {
        bail!("usage: tabstat <data-file> <request.json>");
    };

    let table = load_file(Path::new(data_path))?;
    let request = load_request(Path::new(request_path))?;

    let report = report::run(&table, &request);
    let out = serde_json::to_string_pretty(&report).context("serializing report")?;
    println!("{out}");
    Ok(())
}
