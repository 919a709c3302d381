//! Column-Mapped Row Extraction
//!
//! The generic half of both import flows: walks a decoded string grid with a
//! supplier's [`MappingConfig`] and yields one logical row per sheet row.
//! All the numeric tolerance spreadsheets force on us lives here: currency
//! symbols and thousands separators in prices, float quantities, and long
//! barcodes that Excel has collapsed into scientific notation.

use shared::MappingConfig;

/// One logical row extracted from a sheet
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRow {
    pub sku: String,
    pub title: String,
    pub barcode: String,
    pub qty: i64,
    pub price: f64,
    pub brand: String,
}

/// Walk the grid from the row below `header_row`, yielding a [`MappedRow`]
/// per data row. Rows whose SKU cell is blank after trimming are skipped
/// entirely. Cells past a short row's end read as empty, which is how
/// spreadsheets represent truncated trailing blanks.
pub fn map_rows<'a>(
    grid: &'a [Vec<String>],
    mapping: &'a MappingConfig,
) -> impl Iterator<Item = MappedRow> + 'a {
    grid.iter()
        .skip(mapping.header_row + 1)
        .filter_map(move |row| {
            let sku = cell(row, Some(mapping.col_sku));
            if sku.is_empty() {
                return None;
            }

            let title = match cell(row, mapping.col_title) {
                "" => format!("Imported {sku}"),
                mapped => mapped.to_string(),
            };

            Some(MappedRow {
                sku: sku.to_string(),
                title,
                barcode: normalize_barcode(cell(row, mapping.col_barcode)),
                qty: parse_qty(cell(row, mapping.col_qty)),
                price: parse_price(cell(row, mapping.col_price)),
                brand: cell(row, mapping.col_brand).to_string(),
            })
        })
}

/// Trimmed cell content; unmapped columns and cells past the row's end are empty
fn cell(row: &[String], col: Option<usize>) -> &str {
    col.and_then(|idx| row.get(idx))
        .map(|raw| raw.trim())
        .unwrap_or("")
}

/// Integer quantity: plain integer first, then float truncated toward zero,
/// anything else is 0
fn parse_qty(raw: &str) -> i64 {
    if raw.is_empty() {
        return 0;
    }
    if let Ok(qty) = raw.parse::<i64>() {
        return qty;
    }
    raw.parse::<f64>().map(|f| f as i64).unwrap_or(0)
}

/// Price with `$` and `,` stripped; unparsable prices default to 0
fn parse_price(raw: &str) -> f64 {
    raw.replace(['$', ','], "").trim().parse().unwrap_or(0.0)
}

/// Excel renders long numeric barcodes as scientific notation with an
/// uppercase exponent marker (`4.50012E+12`). Re-render those as the full
/// integer string; everything else passes through verbatim.
fn normalize_barcode(raw: &str) -> String {
    if raw.contains('E')
        && let Ok(value) = raw.parse::<f64>()
    {
        return format!("{value:.0}");
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn full_mapping() -> MappingConfig {
        MappingConfig {
            header_row: 0,
            col_sku: 0,
            col_title: Some(1),
            col_barcode: Some(2),
            col_qty: Some(3),
            col_price: Some(4),
            col_brand: Some(5),
        }
    }

    #[test]
    fn skips_header_and_blank_sku_rows() {
        let grid = grid(&[
            &["SKU", "Title", "Barcode", "Qty", "Price", "Brand"],
            &["A-1", "Widget", "123", "5", "9.99", "Acme"],
            &["", "No sku here", "456", "1", "1.00", "Acme"],
            &["   ", "Whitespace sku", "789", "1", "1.00", "Acme"],
            &["B-2", "Gadget", "", "2", "4.50", ""],
        ]);

        let rows: Vec<MappedRow> = map_rows(&grid, &full_mapping()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sku, "A-1");
        assert_eq!(rows[0].qty, 5);
        assert_eq!(rows[1].sku, "B-2");
        assert_eq!(rows[1].brand, "");
    }

    #[test]
    fn short_rows_read_missing_cells_as_empty() {
        let grid = grid(&[&["SKU", "Title", "Barcode", "Qty", "Price", "Brand"], &["A-1"]]);

        let rows: Vec<MappedRow> = map_rows(&grid, &full_mapping()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].barcode, "");
        assert_eq!(rows[0].qty, 0);
        assert_eq!(rows[0].price, 0.0);
    }

    #[test]
    fn title_falls_back_to_imported_sku() {
        let grid = grid(&[&["h"], &["A-1", ""], &["B-2", "Real Name"]]);

        let rows: Vec<MappedRow> = map_rows(&grid, &full_mapping()).collect();
        assert_eq!(rows[0].title, "Imported A-1");
        assert_eq!(rows[1].title, "Real Name");
    }

    #[test]
    fn unmapped_columns_read_as_empty() {
        let mapping = MappingConfig {
            header_row: 0,
            col_sku: 0,
            col_title: None,
            col_barcode: None,
            col_qty: None,
            col_price: None,
            col_brand: None,
        };
        let grid = grid(&[&["h"], &["A-1", "ignored", "ignored"]]);

        let rows: Vec<MappedRow> = map_rows(&grid, &mapping).collect();
        assert_eq!(rows[0].title, "Imported A-1");
        assert_eq!(rows[0].barcode, "");
        assert_eq!(rows[0].qty, 0);
    }

    #[test]
    fn quantity_tolerates_floats_and_garbage() {
        assert_eq!(parse_qty("3"), 3);
        assert_eq!(parse_qty("2.9"), 2);
        assert_eq!(parse_qty("-1"), -1);
        assert_eq!(parse_qty("2E3"), 2000);
        assert_eq!(parse_qty(""), 0);
        assert_eq!(parse_qty("a dozen"), 0);
    }

    #[test]
    fn price_strips_currency_and_separators() {
        assert_eq!(parse_price("$1,234.50"), 1234.5);
        assert_eq!(parse_price(" 9.99 "), 9.99);
        assert_eq!(parse_price("call us"), 0.0);
        assert_eq!(parse_price(""), 0.0);
    }

    #[test]
    fn scientific_notation_barcodes_rerender_as_integers() {
        assert_eq!(normalize_barcode("4.50012E+12"), "4500120000000");
        assert_eq!(normalize_barcode("4500120000000"), "4500120000000");
        assert_eq!(normalize_barcode("ABC-123"), "ABC-123");
        // Only Excel's uppercase exponent form is repaired
        assert_eq!(normalize_barcode("4.5e2"), "4.5e2");
        // Contains an E but is not numeric
        assert_eq!(normalize_barcode("EAN-MISSING"), "EAN-MISSING");
    }

    #[test]
    fn header_row_offsets_the_data_start() {
        let mapping = MappingConfig {
            header_row: 2,
            ..full_mapping()
        };
        let grid = grid(&[
            &["junk"],
            &["more junk"],
            &["SKU", "Title"],
            &["A-1", "Widget"],
        ]);

        let rows: Vec<MappedRow> = map_rows(&grid, &mapping).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sku, "A-1");
    }
}
