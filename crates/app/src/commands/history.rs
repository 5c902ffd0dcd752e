//! History commands: list, show, delete.

use std::path::Path;

use chrono::Local;
use clap::Args;

use crate::render;
use crate::state::AppState;

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Show at most this many scans
    #[arg(short, long)]
    limit: Option<u32>,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Scan id, as listed by `history`
    id: i64,

    /// Print only the raw OCR text
    #[arg(long, conflicts_with = "json")]
    raw: bool,

    /// Print the parse result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Scan id, as listed by `history`
    id: i64,
}

pub async fn run_history(args: HistoryArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let state = AppState::load(config_path)?;
    let pool = state.open_db().await?;
    let rows = struk_storage::list_history(&pool, args.limit).await?;
    print!("{}", render::history_table(&rows));
    Ok(())
}

pub async fn run_show(args: ShowArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let state = AppState::load(config_path)?;
    let pool = state.open_db().await?;
    let Some(record) = struk_storage::get_scan(&pool, args.id).await? else {
        anyhow::bail!("Scan #{} not found", args.id);
    };

    if args.raw {
        println!("{}", record.raw_text.trim_end());
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&record.parsed)?);
    } else {
        println!(
            "Scan #{} ({})\n",
            record.id,
            record.scanned_at.with_timezone(&Local).format("%d/%m/%Y %H:%M:%S")
        );
        print!("{}", render::scan_report(&record.raw_text, &record.parsed));
    }
    Ok(())
}

pub async fn run_delete(args: DeleteArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let state = AppState::load(config_path)?;
    let pool = state.open_db().await?;
    if !struk_storage::delete_scan(&pool, args.id).await? {
        anyhow::bail!("Scan #{} not found", args.id);
    }
    tracing::info!(id = args.id, "scan deleted");
    println!("Deleted scan #{}", args.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use struk_core::{LineItem, ParseResult, StrukConfig};

    async fn seeded() -> (tempfile::TempDir, std::path::PathBuf, i64) {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        let mut config = StrukConfig::default();
        config.storage.data_dir = Some(dir.path().join("data"));
        config.save(&config_path).unwrap();

        let state = AppState::from_config(config);
        let pool = state.open_db().await.unwrap();
        let parsed = ParseResult { items: vec![LineItem::new("Es Teh", 5000)], total: 5000 };
        let id = struk_storage::insert_scan(&pool, "Es Teh 5.000", &parsed, Utc::now())
            .await
            .unwrap();
        pool.close().await;
        (dir, config_path, id)
    }

    #[tokio::test]
    async fn show_existing_and_missing() {
        let (_dir, config, id) = seeded().await;
        run_show(ShowArgs { id, raw: false, json: false }, Some(&config)).await.unwrap();
        let err = run_show(ShowArgs { id: id + 100, raw: false, json: true }, Some(&config))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn delete_then_delete_again_fails() {
        let (_dir, config, id) = seeded().await;
        run_delete(DeleteArgs { id }, Some(&config)).await.unwrap();
        assert!(run_delete(DeleteArgs { id }, Some(&config)).await.is_err());
    }

    #[tokio::test]
    async fn history_runs_on_seeded_db() {
        let (_dir, config, _id) = seeded().await;
        run_history(HistoryArgs { limit: Some(5) }, Some(&config)).await.unwrap();
    }
}
