//! Scan and parse commands: OCR text in, items and total out.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::Args;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use struk_core::SheetFormat;
use struk_ocr::{default_backend, ScanOutcome, ScanPipeline};

use crate::render;
use crate::state::AppState;

/// Output options shared by `scan` and `parse`.
#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    /// Print the parse result as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Also write a spreadsheet of the result
    #[arg(long)]
    export: bool,

    /// Directory for the exported sheet
    #[arg(short, long, requires = "export")]
    out: Option<PathBuf>,

    /// Sheet format: xlsx or csv (default from `[export] format`)
    #[arg(long, requires = "export")]
    format: Option<SheetFormat>,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Receipt image (PNG, JPEG, ...)
    image: PathBuf,

    /// Do not record this scan in history
    #[arg(long)]
    no_save: bool,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// File containing OCR text; stdin when omitted
    input: Option<PathBuf>,

    /// Record this result in history
    #[arg(long)]
    save: bool,

    #[command(flatten)]
    output: OutputArgs,
}

pub async fn run_scan(args: ScanArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let state = AppState::load(config_path)?;

    if !args.image.exists() {
        anyhow::bail!("Input file not found: {}", args.image.display());
    }

    let pipeline = ScanPipeline::new(default_backend(&state.config.ocr), state.extractor()?)
        .with_timeout(Duration::from_secs(state.config.ocr.timeout_secs));

    let outcome = pipeline
        .process_file(&args.image)
        .await
        .with_context(|| format!("Failed to read receipt {}", args.image.display()))?;

    finish(&state, outcome, !args.no_save, args.output).await
}

pub async fn run_parse(args: ParseArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let state = AppState::load(config_path)?;

    let raw_text = match &args.input {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("Failed to read OCR text from stdin")?;
            buf
        }
    };

    let parsed = state.extractor()?.extract(&raw_text);
    finish(&state, ScanOutcome { raw_text, parsed }, args.save, args.output).await
}

/// Show the result, then hand it to history and export explicitly.
async fn finish(
    state: &AppState,
    outcome: ScanOutcome,
    save: bool,
    output: OutputArgs,
) -> anyhow::Result<()> {
    let ScanOutcome { raw_text, parsed } = outcome;

    if output.json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
    } else {
        print!("{}", render::scan_report(&raw_text, &parsed));
    }

    if save {
        let pool = state.open_db().await?;
        let id = struk_storage::insert_scan(&pool, &raw_text, &parsed, Utc::now())
            .await
            .context("Failed to save scan to history")?;
        info!(id, items = parsed.items.len(), total = parsed.total, "scan stored");
        eprintln!("Saved to history as #{id}");
    }

    if output.export {
        if parsed.is_empty_extraction() {
            warn!("no items recognized, skipping export");
            eprintln!("Nothing to export: no items were recognized.");
        } else {
            let dir = state.export_dir(output.out);
            let format = state.export_format(output.format);
            let path = struk_export::export_to_dir(&dir, &parsed, format, Utc::now())
                .with_context(|| format!("Failed to export to {}", dir.display()))?;
            eprintln!("Exported {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(dir: &Path) -> PathBuf {
        let path = dir.join("config.toml");
        let mut config = struk_core::StrukConfig::default();
        config.storage.data_dir = Some(dir.join("data"));
        config.export.output_dir = Some(dir.join("sheets"));
        config.save(&path).unwrap();
        path
    }

    #[tokio::test]
    async fn parse_saves_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        let input = dir.path().join("struk.txt");
        std::fs::write(&input, "Kopi Susu 15.000\nRoti Bakar 20.000\nTOTAL 35.000\n").unwrap();

        let args = ParseArgs {
            input: Some(input),
            save: true,
            output: OutputArgs { json: true, export: true, out: None, format: None },
        };
        run_parse(args, Some(&config)).await.unwrap();

        let state = AppState::load(Some(&config)).unwrap();
        let pool = state.open_db().await.unwrap();
        let history = struk_storage::list_history(&pool, None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].item_count, 2);
        assert_eq!(history[0].total, 35000);

        let sheets: Vec<_> = std::fs::read_dir(dir.path().join("sheets"))
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].extension().unwrap(), "xlsx");
    }

    #[tokio::test]
    async fn parse_without_save_leaves_history_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        let input = dir.path().join("noise.txt");
        std::fs::write(&input, "Terima kasih\nSelamat datang\n").unwrap();

        let args = ParseArgs {
            input: Some(input),
            save: false,
            output: OutputArgs { json: false, export: true, out: None, format: None },
        };
        run_parse(args, Some(&config)).await.unwrap();

        assert!(!dir.path().join("data").exists());
        assert!(!dir.path().join("sheets").exists());
    }

    #[tokio::test]
    async fn scan_missing_image_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        let args = ScanArgs {
            image: dir.path().join("missing.png"),
            no_save: true,
            output: OutputArgs::default(),
        };
        assert!(run_scan(args, Some(&config)).await.is_err());
    }
}
