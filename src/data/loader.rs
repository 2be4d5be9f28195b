use std::path::Path;

use anyhow::{Context, Result};

use super::model::{CellValue, Column, ColumnType, Dataset};
use crate::error::ExploreError;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a CSV file on disk.
pub fn load_file(path: &Path) -> Result<Dataset, ExploreError> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading {}", path.display()))
        .map_err(ExploreError::load)?;
    load_bytes(&bytes)
}

/// Parse raw uploaded bytes as headed CSV.
///
/// Fails with [`ExploreError::LoadFailure`] when the bytes are not valid
/// delimited text (binary input, invalid UTF-8, ragged rows) or when the
/// parse yields no columns or no data rows.
pub fn load_bytes(bytes: &[u8]) -> Result<Dataset, ExploreError> {
    parse_csv(bytes).map_err(ExploreError::load)
}

fn parse_csv(bytes: &[u8]) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        anyhow::bail!("empty after parsing: no columns found");
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            anyhow::bail!(
                "CSV row {row_no}: expected {} fields, found {}",
                headers.len(),
                record.len()
            );
        }
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }

    if rows.is_empty() {
        anyhow::bail!("empty after parsing: no data rows");
    }

    let columns = headers
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let raw: Vec<&str> = rows.iter().map(|r| r[idx].as_str()).collect();
            build_column(name, &raw)
        })
        .collect();

    Ok(Dataset::from_columns(columns))
}

// ---------------------------------------------------------------------------
// Type inference
// ---------------------------------------------------------------------------

/// Infer one type for the whole column, then materialise every cell as that
/// type (empty fields become `Null`). Mixed integer/float unifies to Float;
/// any other mixture falls back to Text over the raw strings.
fn build_column(name: String, raw: &[&str]) -> Column {
    let ty = infer_column_type(raw);
    let values = raw.iter().map(|s| parse_cell(s.trim(), ty)).collect();
    Column { name, ty, values }
}

fn infer_column_type(raw: &[&str]) -> ColumnType {
    let mut seen_any = false;
    let mut all_integer = true;
    let mut all_numeric = true;
    let mut all_bool = true;
    let mut all_date = true;

    for s in raw {
        let s = s.trim();
        if s.is_empty() {
            continue;
        }
        seen_any = true;
        all_integer &= s.parse::<i64>().is_ok();
        all_numeric &= s.parse::<f64>().is_ok();
        all_bool &= s == "true" || s == "false";
        all_date &= looks_like_iso_date(s);
    }

    // All-null columns carry no type evidence; treat as text.
    if !seen_any {
        return ColumnType::Text;
    }
    if all_bool {
        ColumnType::Bool
    } else if all_integer {
        ColumnType::Integer
    } else if all_numeric {
        ColumnType::Float
    } else if all_date {
        ColumnType::Date
    } else {
        ColumnType::Text
    }
}

fn parse_cell(s: &str, ty: ColumnType) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    match ty {
        ColumnType::Integer => s
            .parse::<i64>()
            .map(CellValue::Integer)
            .unwrap_or(CellValue::Null),
        ColumnType::Float => s
            .parse::<f64>()
            .map(CellValue::Float)
            .unwrap_or(CellValue::Null),
        ColumnType::Bool => CellValue::Bool(s == "true"),
        ColumnType::Date => CellValue::Date(s.to_string()),
        ColumnType::Text => CellValue::Text(s.to_string()),
    }
}

/// `YYYY-MM-DD`, digits only. Kept deliberately narrow: anything fancier is
/// treated as plain text.
fn looks_like_iso_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_headed_csv_and_infers_column_types() {
        let csv = b"name,age,score,active,joined\nalice,34,1.5,true,2021-04-01\nbob,28,2.0,false,2022-11-30\n";
        let ds = load_bytes(csv).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column_names(), ["name", "age", "score", "active", "joined"]);
        assert_eq!(ds.column("name").unwrap().ty, ColumnType::Text);
        assert_eq!(ds.column("age").unwrap().ty, ColumnType::Integer);
        assert_eq!(ds.column("score").unwrap().ty, ColumnType::Float);
        assert_eq!(ds.column("active").unwrap().ty, ColumnType::Bool);
        assert_eq!(ds.column("joined").unwrap().ty, ColumnType::Date);
    }

    #[test]
    fn mixed_integer_and_float_unifies_to_float() {
        let ds = load_bytes(b"v\n1\n2.5\n").unwrap();
        let col = ds.column("v").unwrap();
        assert_eq!(col.ty, ColumnType::Float);
        assert_eq!(col.values[0], CellValue::Float(1.0));
    }

    #[test]
    fn mixed_number_and_text_falls_back_to_text() {
        let ds = load_bytes(b"v\n1\nhello\n").unwrap();
        let col = ds.column("v").unwrap();
        assert_eq!(col.ty, ColumnType::Text);
        assert_eq!(col.values[0], CellValue::Text("1".into()));
    }

    #[test]
    fn empty_fields_become_null() {
        let ds = load_bytes(b"a,b\n1,\n2,x\n").unwrap();
        assert_eq!(ds.column("b").unwrap().values[0], CellValue::Null);
    }

    #[test]
    fn binary_bytes_are_a_load_failure() {
        let garbage = [0u8, 159, 146, 150, 255, 0, 13, 10, 200];
        match load_bytes(&garbage) {
            Err(ExploreError::LoadFailure(_)) => {}
            other => panic!("expected LoadFailure, got {other:?}"),
        }
    }

    #[test]
    fn header_only_input_is_a_load_failure() {
        match load_bytes(b"a,b,c\n") {
            Err(ExploreError::LoadFailure(msg)) => {
                assert!(msg.contains("no data rows"), "{msg}");
            }
            other => panic!("expected LoadFailure, got {other:?}"),
        }
    }

    #[test]
    fn ragged_rows_are_a_load_failure() {
        assert!(matches!(
            load_bytes(b"a,b\n1\n"),
            Err(ExploreError::LoadFailure(_))
        ));
    }

    #[test]
    fn inference_is_deterministic() {
        let csv = b"x,y\n1,a\n2,b\n";
        let a = load_bytes(csv).unwrap();
        let b = load_bytes(csv).unwrap();
        for (ca, cb) in a.columns.iter().zip(&b.columns) {
            assert_eq!(ca.ty, cb.ty);
            assert_eq!(ca.values, cb.values);
        }
    }
}
