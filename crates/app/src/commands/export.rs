//! Export command - write a stored scan as a spreadsheet.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::Args;
use struk_core::SheetFormat;

use crate::state::AppState;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Scan id, as listed by `history`
    id: i64,

    /// Output directory
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Sheet format: xlsx or csv (default from `[export] format`)
    #[arg(long)]
    format: Option<SheetFormat>,
}

pub async fn run(args: ExportArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let state = AppState::load(config_path)?;
    let pool = state.open_db().await?;
    let Some(record) = struk_storage::get_scan(&pool, args.id).await? else {
        anyhow::bail!("Scan #{} not found", args.id);
    };

    let dir = state.export_dir(args.out);
    let format = state.export_format(args.format);
    let path = struk_export::export_to_dir(&dir, &record.parsed, format, Utc::now())
        .with_context(|| format!("Failed to export scan #{}", record.id))?;
    println!("{}", path.display());
    Ok(())
}
