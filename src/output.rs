use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<P: AsRef<Path>, T: Serialize>(path: P, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown table of the first `max_rows` rows.
pub fn render_table_rows<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    match render_table_rows(rows, max_rows) {
        Some(table_str) => println!("{}\n", table_str),
        None => println!("(no rows)\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BuildingStockRow;

    #[test]
    fn renders_markdown_preview() {
        let rows = vec![
            BuildingStockRow {
                group: "Energielabel".into(),
                column: "Label_A".into(),
                total: "12".into(),
            },
            BuildingStockRow {
                group: "Energielabel".into(),
                column: "Label_B".into(),
                total: "7".into(),
            },
        ];
        let table = render_table_rows(&rows, 1).unwrap();
        assert!(table.contains("Label_A"));
        assert!(!table.contains("Label_B"));
        assert!(table.contains("| Group"));
        assert!(render_table_rows::<BuildingStockRow>(&[], 3).is_none());
    }
}
