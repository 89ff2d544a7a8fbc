use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray,
    StringArray,
};
use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Row, Table};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table of text cells from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – first record is the header; ragged rows are accepted
/// * `.json`    – `{ "header": [...], "rows": [[...]] }` or `[{ "col": value, ... }, ...]`
/// * `.parquet` – any flat schema; every cell is rendered as text
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} rows × {} columns from {}",
        table.len(),
        table.header.len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Every field is kept verbatim, no trimming. Short or long records are kept;
/// the engine reports short rows per operation.
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let header: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    Ok(Table::new(header, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Two accepted shapes.
///
/// Table-oriented, the serialized form of [`Table`]:
///
/// ```json
/// { "header": ["region", "sales"], "rows": [["North", "10"], ["South", "7"]] }
/// ```
///
/// Records-oriented (`df.to_json(orient='records')`):
///
/// ```json
/// [ { "region": "North", "sales": 10 }, { "region": "South", "sales": 7.5 } ]
/// ```
///
/// For records the header is the key set of the first record. Strings are kept
/// verbatim, numbers and booleans rendered as text, null or missing keys
/// become empty cells.
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    match root {
        JsonValue::Array(records) => records_to_table(&records),
        obj @ JsonValue::Object(_) => serde_json::from_value(obj)
            .context("Expected an object with 'header' and 'rows'"),
        _ => bail!("Expected a top-level JSON object or array"),
    }
}

fn records_to_table(records: &[JsonValue]) -> Result<Table> {
    let header: Vec<String> = match records.first() {
        Some(first) => first
            .as_object()
            .context("Row 0 is not a JSON object")?
            .keys()
            .cloned()
            .collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let row: Row = header
            .iter()
            .map(|key| obj.get(key).map(json_to_cell).unwrap_or_default())
            .collect();
        rows.push(row);
    }

    Ok(Table::new(header, rows))
}

fn json_to_cell(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file as text cells.
///
/// The header comes from the schema. Strings, integers, floats and booleans
/// are rendered directly; other types go through Arrow's display formatter.
/// Nulls become empty cells.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let header: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;
    let rows = batch_rows(reader, &header)?;
    Ok(Table::new(header, rows))
}

/// Flatten record batches into rows. Row numbers in errors count across batches.
fn batch_rows<I>(batches: I, header: &[String]) -> Result<Vec<Row>>
where
    I: IntoIterator<Item = std::result::Result<RecordBatch, ArrowError>>,
{
    let mut rows = Vec::new();
    for batch_result in batches {
        let offset = rows.len();
        let batch = batch_result
            .with_context(|| format!("reading parquet record batch at row {offset}"))?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .enumerate()
                .map(|(c, col)| {
                    cell_text(col, row)
                        .with_context(|| format!("Row {}, column '{}'", offset + row, header[c]))
                })
                .collect::<Result<Row>>()?;
            rows.push(cells);
        }
    }
    Ok(rows)
}

// -- Arrow helpers --

/// Render one Arrow cell as text.
fn cell_text(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        return Ok(String::new());
    }
    let text = match col.data_type() {
        DataType::Utf8 => downcast::<StringArray>(col)?.value(row).to_string(),
        DataType::LargeUtf8 => downcast::<LargeStringArray>(col)?.value(row).to_string(),
        DataType::Int32 => downcast::<Int32Array>(col)?.value(row).to_string(),
        DataType::Int64 => downcast::<Int64Array>(col)?.value(row).to_string(),
        DataType::Float32 => downcast::<Float32Array>(col)?.value(row).to_string(),
        DataType::Float64 => downcast::<Float64Array>(col)?.value(row).to_string(),
        DataType::Boolean => downcast::<BooleanArray>(col)?.value(row).to_string(),
        _ => array_value_to_string(col.as_ref(), row)
            .with_context(|| format!("formatting {:?} value", col.data_type()))?,
    };
    Ok(text)
}

fn downcast<T: Array + 'static>(col: &Arc<dyn Array>) -> Result<&T> {
    col.as_any()
        .downcast_ref::<T>()
        .with_context(|| format!("unexpected array layout for {:?}", col.data_type()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    fn write_temp(name: &str, contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn csv_keeps_text_and_ragged_rows() {
        let (_dir, path) = write_temp("t.csv", "name,age\nBob,25\nAlice\n Eve ,41\n");
        let t = load_file(&path).unwrap();
        assert_eq!(t.header, vec!["name", "age"]);
        assert_eq!(t.rows[0], vec!["Bob", "25"]);
        assert_eq!(t.rows[1], vec!["Alice"]);
        assert_eq!(t.rows[2][0], " Eve ");
    }

    #[test]
    fn json_table_shape() {
        let (_dir, path) = write_temp("t.json", r#"{"header":["k","v"],"rows":[["A","1"],["B"]]}"#);
        let t = load_file(&path).unwrap();
        assert_eq!(t, Table::from_strs(&["k", "v"], &[&["A", "1"], &["B"]]));
    }

    #[test]
    fn json_records_shape() {
        let (_dir, path) = write_temp(
            "t.JSON",
            r#"[{"region":"North","sales":10,"ok":true},{"region":"South","sales":7.5,"ok":null},{"region":"East"}]"#,
        );
        let t = load_file(&path).unwrap();
        // serde_json maps iterate keys in sorted order.
        assert_eq!(t.header, vec!["ok", "region", "sales"]);
        assert_eq!(t.rows[0], vec!["true", "North", "10"]);
        assert_eq!(t.rows[1], vec!["", "South", "7.5"]);
        assert_eq!(t.rows[2], vec!["", "East", ""]);
    }

    #[test]
    fn json_rejects_scalars_and_bad_records() {
        let (_dir, path) = write_temp("t.json", "42");
        assert!(load_file(&path).is_err());
        let (_dir2, path2) = write_temp("u.json", r#"[{"a":1}, 3]"#);
        assert!(load_file(&path2).is_err());
    }

    #[test]
    fn unsupported_extension() {
        let (_dir, path) = write_temp("t.xlsx", "");
        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension: .xlsx"));
    }

    #[test]
    fn parquet_cells_rendered_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("region", DataType::Utf8, true),
            Field::new("units", DataType::Int64, false),
            Field::new("sales", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("North"), None])),
                Arc::new(Int64Array::from(vec![3, 4])),
                Arc::new(Float64Array::from(vec![1.5, 2.0])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let t = load_file(&path).unwrap();
        assert_eq!(t.header, vec!["region", "units", "sales"]);
        assert_eq!(t.rows, vec![
            vec!["North".to_string(), "3".to_string(), "1.5".to_string()],
            vec!["".to_string(), "4".to_string(), "2".to_string()],
        ]);
    }

    #[test]
    fn parquet_rows_count_across_batches() {
        let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int64, false)]));
        let batch = |vals: Vec<i64>| {
            RecordBatch::try_new(schema.clone(), vec![Arc::new(Int64Array::from(vals))]).unwrap()
        };
        let header = vec!["v".to_string()];

        let rows = batch_rows(vec![Ok(batch(vec![1, 2])), Ok(batch(vec![3]))], &header).unwrap();
        assert_eq!(rows, vec![vec!["1"], vec!["2"], vec!["3"]]);

        let err = batch_rows(
            vec![
                Ok(batch(vec![1, 2])),
                Ok(batch(vec![3, 4, 5])),
                Err(ArrowError::ParseError("truncated page".into())),
            ],
            &header,
        )
        .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("at row 5"), "{msg}");
        assert!(msg.contains("truncated page"), "{msg}");
    }
}
