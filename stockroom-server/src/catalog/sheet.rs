//! Workbook decoding
//!
//! Turns an uploaded spreadsheet into the plain string grid the row mapper
//! works on. Only the first worksheet is read; suppliers send single-sheet
//! catalog and order files.

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use std::io::Cursor;

use crate::core::error::{AppError, AppResult};

/// Rows returned by [`preview_grid`]
pub const PREVIEW_ROWS: usize = 15;

/// Decode the first worksheet of an xlsx payload into a string grid
pub fn decode_grid(bytes: &[u8]) -> AppResult<Vec<Vec<String>>> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor).map_err(|e: calamine::XlsxError| {
        AppError::validation(format!("Unreadable workbook: {e}"))
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().clone();
    let Some(first) = sheet_names.first().cloned() else {
        return Ok(Vec::new());
    };

    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| AppError::validation(format!("Unreadable worksheet {first}: {e}")))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect())
}

/// First rows of the first worksheet, for the mapping-configuration screen
pub fn preview_grid(bytes: &[u8]) -> AppResult<Vec<Vec<String>>> {
    let mut grid = decode_grid(bytes)?;
    grid.truncate(PREVIEW_ROWS);
    Ok(grid)
}

/// Convert a cell to a trimmed string. Whole floats render as integers so
/// numeric SKU and barcode columns keep their spreadsheet appearance.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_owned(),
        Data::Float(f) => {
            if *f == f.floor() && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
        Data::Empty => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_floats_render_as_integers() {
        assert_eq!(cell_to_string(&Data::Float(450011.0)), "450011");
        assert_eq!(cell_to_string(&Data::Float(3.5)), "3.5");
        assert_eq!(cell_to_string(&Data::Int(12)), "12");
    }

    #[test]
    fn blank_cells_render_empty() {
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::String("  ".to_string())), "");
    }

    #[test]
    fn garbage_bytes_are_a_validation_error() {
        let err = decode_grid(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
