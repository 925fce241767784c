//! Rendering of projected rows: aligned text tables and JSON.

use comfy_table::{Cell, Table, presets::NOTHING};

use crate::projection::Projection;

/// Build a plain aligned table, headers uppercased.
pub fn render_table(projection: &Projection) -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(
        projection
            .columns
            .iter()
            .map(|column| Cell::new(column.to_uppercase())),
    );
    for row in &projection.rows {
        table.add_row(row.iter().map(Cell::new));
    }
    table
}

/// Render rows as a JSON array of objects, keys in column order.
pub fn render_json(projection: &Projection) -> serde_json::Result<String> {
    let rows: Vec<serde_json::Value> = projection
        .rows
        .iter()
        .map(|row| {
            let mut object = serde_json::Map::new();
            for (column, value) in projection.columns.iter().zip(row) {
                object.insert(column.clone(), serde_json::Value::String(value.clone()));
            }
            serde_json::Value::Object(object)
        })
        .collect();
    serde_json::to_string_pretty(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projection() -> Projection {
        Projection {
            columns: vec!["unit".to_string(), "machine".to_string()],
            rows: vec![
                vec!["ubuntu/0".to_string(), "0".to_string()],
                vec!["ntp/0".to_string(), "0".to_string()],
            ],
        }
    }

    #[test]
    fn test_table_has_uppercase_headers_and_all_rows() {
        let text = render_table(&projection()).to_string();
        assert!(text.contains("UNIT"));
        assert!(text.contains("MACHINE"));
        assert!(text.contains("ubuntu/0"));
        assert!(text.contains("ntp/0"));
    }

    #[test]
    fn test_json_keeps_column_order() {
        let json = render_json(&projection()).unwrap();
        let unit_pos = json.find("\"unit\"").unwrap();
        let machine_pos = json.find("\"machine\"").unwrap();
        assert!(unit_pos < machine_pos);

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[0]["unit"], "ubuntu/0");
    }
}
