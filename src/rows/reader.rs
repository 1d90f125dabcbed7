//! CSV and JSON row readers.

use crate::rows::{Columns, Row, RowError, RowFormat};
use serde_json::Value;
use tracing::debug;

/// Reads all rows from `text` in the given format.
///
/// # Arguments
/// * `text` - Raw dataset text
/// * `format` - [RowFormat] of the text, see [RowFormat::detect]
/// * `columns` - Which columns hold path and weight
///
/// # Errors
/// [RowError] if the text cannot be read in the given format, or if a CSV
/// header lacks the path column.
///
/// # Example
/// ```
/// use rowtree::rows::{parse_rows, Columns, Row, RowFormat};
///
/// let text = "id,value\nflare.animate.Easing,17010\n";
/// let rows = parse_rows(text, RowFormat::Csv, &Columns::flare())?;
/// assert_eq!(rows, vec![Row::new("flare.animate.Easing", "17010")]);
/// # Ok::<(), rowtree::rows::RowError>(())
/// ```
pub fn parse_rows(text: &str, format: RowFormat, columns: &Columns) -> Result<Vec<Row>, RowError> {
    let rows = match format {
        RowFormat::Csv => parse_csv(text, columns)?,
        RowFormat::Json => parse_json(text, columns)?,
    };
    debug!(rows = rows.len(), ?format, "read rows");
    Ok(rows)
}

// ============================================================================
// CSV
// ============================================================================
fn parse_csv(text: &str, columns: &Columns) -> Result<Vec<Row>, RowError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let path_pos = headers
        .iter()
        .position(|h| h == columns.path)
        .ok_or_else(|| RowError::MissingColumn(columns.path.clone()))?;
    let weight_pos = headers.iter().position(|h| h == columns.weight);
    if weight_pos.is_none() {
        debug!(column = %columns.weight, "weight column not in header");
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        // Short records read as empty cells, absent columns as absent fields
        let cell = |pos: usize| record.get(pos).unwrap_or_default().to_string();
        rows.push(Row {
            path: Some(cell(path_pos)),
            weight: weight_pos.map(cell),
        });
    }
    Ok(rows)
}

// ============================================================================
// JSON
// ============================================================================
fn parse_json(text: &str, columns: &Columns) -> Result<Vec<Row>, RowError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(items) = value else {
        return Err(RowError::NotAnArray);
    };

    Ok(items
        .iter()
        .map(|item| Row {
            path: item.get(&columns.path).and_then(cell_text),
            weight: item.get(&columns.weight).and_then(cell_text),
        })
        .collect())
}

/// Returns the text of a JSON cell; `null` counts as absent.
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_short_record_reads_empty_cell() {
        let rows = parse_csv("id,value\na.b\n", &Columns::flare()).unwrap();
        assert_eq!(rows, vec![Row::new("a.b", "")]);
    }

    #[test]
    fn test_json_non_object_items_have_no_fields() {
        let rows = parse_json(r#"[1, {"id": "a", "value": 2}]"#, &Columns::flare()).unwrap();
        assert_eq!(rows[0], Row::default());
        assert_eq!(rows[1], Row::new("a", "2"));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Value::Null), None);
        assert_eq!(cell_text(&serde_json::json!(12.5)), Some("12.5".to_string()));
        assert_eq!(cell_text(&serde_json::json!(true)), Some("true".to_string()));
    }
}
