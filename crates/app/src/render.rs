//! Plain-text tables for the terminal.

use std::fmt::Write;

use chrono::Local;
use struk_core::{Amount, ParseResult};
use struk_export::{NAME_HEADER, PRICE_HEADER, TOTAL_LABEL};
use struk_storage::ScanSummary;

fn width(s: &str) -> usize {
    s.chars().count()
}

/// Item table with a trailing `TOTAL` row.
pub fn item_table(parsed: &ParseResult) -> String {
    let prices: Vec<String> = parsed.items.iter().map(|i| Amount(i.price).grouped()).collect();
    let total = parsed.total_amount().to_string();

    let name_w = parsed
        .items
        .iter()
        .map(|i| width(&i.name))
        .chain([width(NAME_HEADER), width(TOTAL_LABEL)])
        .max()
        .unwrap_or(0);
    let price_w = prices
        .iter()
        .map(|p| width(p))
        .chain([width(PRICE_HEADER), width(&total)])
        .max()
        .unwrap_or(0);
    let rule = "-".repeat(name_w + 2 + price_w);

    let mut out = String::new();
    let _ = writeln!(out, "{:<name_w$}  {:>price_w$}", NAME_HEADER, PRICE_HEADER);
    let _ = writeln!(out, "{rule}");
    for (item, price) in parsed.items.iter().zip(&prices) {
        let _ = writeln!(out, "{:<name_w$}  {price:>price_w$}", item.name);
    }
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "{:<name_w$}  {total:>price_w$}", TOTAL_LABEL);
    out
}

/// What the user sees after a scan: the table, or the raw text when no
/// items were recognized.
pub fn scan_report(raw_text: &str, parsed: &ParseResult) -> String {
    if parsed.is_blank() {
        return format!(
            "Could not separate items and total automatically. Check the raw text:\n\n{}\n",
            raw_text.trim_end()
        );
    }
    if parsed.is_empty_extraction() {
        return format!(
            "No items recognized (total {}). Raw text:\n\n{}\n",
            parsed.total_amount(),
            raw_text.trim_end()
        );
    }
    format!(
        "Recognized {} item(s).\n\n{}",
        parsed.items.len(),
        item_table(parsed)
    )
}

pub fn history_table(rows: &[ScanSummary]) -> String {
    const TIME: &str = "Waktu Pindai";
    const COUNT: &str = "Jumlah Item";
    const TOTAL: &str = "Total";

    if rows.is_empty() {
        return "Belum ada riwayat.\n".to_string();
    }

    let cells: Vec<(String, String, String, String)> = rows
        .iter()
        .map(|r| {
            (
                r.id.to_string(),
                r.scanned_at
                    .with_timezone(&Local)
                    .format("%d/%m/%Y %H:%M:%S")
                    .to_string(),
                format!("{} item", r.item_count),
                Amount(r.total).to_string(),
            )
        })
        .collect();

    let id_w = cells.iter().map(|c| width(&c.0)).chain([2]).max().unwrap_or(2);
    let time_w = cells.iter().map(|c| width(&c.1)).chain([width(TIME)]).max().unwrap_or(0);
    let count_w = cells.iter().map(|c| width(&c.2)).chain([width(COUNT)]).max().unwrap_or(0);
    let total_w = cells.iter().map(|c| width(&c.3)).chain([width(TOTAL)]).max().unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>id_w$}  {:<time_w$}  {:<count_w$}  {:>total_w$}",
        "ID", TIME, COUNT, TOTAL
    );
    for (id, time, count, total) in &cells {
        let _ = writeln!(
            out,
            "{id:>id_w$}  {time:<time_w$}  {count:<count_w$}  {total:>total_w$}"
        );
    }
    out
}
