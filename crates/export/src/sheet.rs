use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::io::Write;
use std::path::{Path, PathBuf};
use struk_core::{ParseResult, SheetFormat};
use thiserror::Error;

pub const NAME_HEADER: &str = "Nama Item";
pub const PRICE_HEADER: &str = "Harga";
pub const TOTAL_LABEL: &str = "TOTAL";
pub const SHEET_NAME: &str = "Rincian Struk";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("XLSX error: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("No items were recognized; nothing to export")]
    NothingToExport,
}

/// One row of the exported sheet, in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetRow<'a> {
    Header,
    Item { name: &'a str, price: u64 },
    Blank,
    Total(u64),
}

/// Header, one row per item, a blank separator row, then the `TOTAL` row.
pub fn sheet_rows(parsed: &ParseResult) -> Result<Vec<SheetRow<'_>>, ExportError> {
    if parsed.is_empty_extraction() {
        return Err(ExportError::NothingToExport);
    }

    let mut rows = Vec::with_capacity(parsed.items.len() + 3);
    rows.push(SheetRow::Header);
    rows.extend(
        parsed
            .items
            .iter()
            .map(|i| SheetRow::Item { name: &i.name, price: i.price }),
    );
    rows.push(SheetRow::Blank);
    rows.push(SheetRow::Total(parsed.total));
    Ok(rows)
}

/// Write the sheet rows as CSV.
pub fn write_csv<W: Write>(writer: W, parsed: &ParseResult) -> Result<(), ExportError> {
    let rows = sheet_rows(parsed)?;
    let mut wtr = csv::Writer::from_writer(writer);

    for row in rows {
        match row {
            SheetRow::Header => wtr.write_record([NAME_HEADER, PRICE_HEADER])?,
            SheetRow::Item { name, price } => {
                let price = price.to_string();
                wtr.write_record([name, price.as_str()])?
            }
            SheetRow::Blank => wtr.write_record(["", ""])?,
            SheetRow::Total(total) => {
                let total = total.to_string();
                wtr.write_record([TOTAL_LABEL, total.as_str()])?
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Build an `.xlsx` workbook with a single `Rincian Struk` worksheet.
/// Prices are written as numbers; the blank row is left empty.
pub fn write_xlsx(parsed: &ParseResult) -> Result<Vec<u8>, ExportError> {
    let rows = sheet_rows(parsed)?;
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (r, row) in rows.into_iter().enumerate() {
        let r = r as u32;
        match row {
            SheetRow::Header => {
                worksheet.write_string(r, 0, NAME_HEADER)?;
                worksheet.write_string(r, 1, PRICE_HEADER)?;
            }
            SheetRow::Item { name, price } => {
                worksheet.write_string(r, 0, name)?;
                worksheet.write_number(r, 1, price as f64)?;
            }
            SheetRow::Blank => {}
            SheetRow::Total(total) => {
                worksheet.write_string(r, 0, TOTAL_LABEL)?;
                worksheet.write_number(r, 1, total as f64)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// The encoded sheet in the requested format.
pub fn render_sheet(parsed: &ParseResult, format: SheetFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        SheetFormat::Xlsx => write_xlsx(parsed),
        SheetFormat::Csv => {
            let mut buf = Vec::new();
            write_csv(&mut buf, parsed)?;
            Ok(buf)
        }
    }
}

/// `Struk_Scan_<unix millis>.<xlsx|csv>`
pub fn export_filename(generated_at: DateTime<Utc>, format: SheetFormat) -> String {
    format!(
        "Struk_Scan_{}.{}",
        generated_at.timestamp_millis(),
        format.extension()
    )
}

/// Write a sheet into `dir` and return its path.
pub fn export_to_dir(
    dir: &Path,
    parsed: &ParseResult,
    format: SheetFormat,
    generated_at: DateTime<Utc>,
) -> Result<PathBuf, ExportError> {
    // Encode first so a refused export leaves no directory or file behind.
    let bytes = render_sheet(parsed, format)?;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(generated_at, format));
    std::fs::write(&path, bytes)?;

    tracing::info!(
        path = %path.display(),
        %format,
        items = parsed.items.len(),
        "exported receipt sheet"
    );
    Ok(path)
}
