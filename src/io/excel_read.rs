use std::io::Cursor;

use calamine::{DataType, Reader, Xlsx};

use crate::error::{DashboardError, Result};

/// Reads the first worksheet of an xlsx workbook into rows of text cells.
///
/// Numbers stored as numbers come back without a fractional part when they
/// are whole, so `1234.0` reads as `"1234"`, as the delimited reader would.
pub fn read_grid(bytes: Vec<u8>) -> Result<Vec<Vec<String>>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DashboardError::unreadable("xlsx", "workbook has no worksheets"))??;

    let grid: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(|cell| cell_to_string(Some(cell))).collect())
        .collect();
    if grid.is_empty() {
        return Err(DashboardError::unreadable("xlsx", "first worksheet is empty"));
    }
    Ok(grid)
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
