pub mod sheet;

pub use sheet::{
    export_filename, export_to_dir, render_sheet, sheet_rows, write_csv, write_xlsx, ExportError,
    SheetRow, NAME_HEADER, PRICE_HEADER, SHEET_NAME, TOTAL_LABEL,
};
