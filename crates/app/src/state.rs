use std::path::{Path, PathBuf};

use anyhow::Context;
use struk_core::{SheetFormat, StrukConfig};
use struk_ocr::Extractor;
use struk_storage::DbPool;

const HISTORY_DB: &str = "history.db";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("id", "struk", "Struk")
}

/// `<config dir>/config.toml`, or `./config.toml` when no home directory exists.
pub fn default_config_path() -> PathBuf {
    project_dirs()
        .map(|d| d.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Resolved configuration and locations shared by every command.
pub struct AppState {
    pub config: StrukConfig,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load configuration. An explicit `--config` path must exist; the
    /// default location falls back to built-in defaults when absent.
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(path) => StrukConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => {
                let path = default_config_path();
                if path.exists() {
                    StrukConfig::from_file(&path)
                        .with_context(|| format!("Failed to load config from {}", path.display()))?
                } else {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    StrukConfig::default()
                }
            }
        };
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: StrukConfig) -> Self {
        let data_dir = config
            .storage
            .data_dir
            .clone()
            .or_else(|| project_dirs().map(|d| d.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        Self { config, data_dir }
    }

    pub fn extractor(&self) -> anyhow::Result<Extractor> {
        Extractor::new(&self.config.parser).context("Invalid [parser] keywords in config")
    }

    pub async fn open_db(&self) -> anyhow::Result<DbPool> {
        std::fs::create_dir_all(&self.data_dir).with_context(|| {
            format!("Failed to create data directory {}", self.data_dir.display())
        })?;
        let path = self.data_dir.join(HISTORY_DB);
        let pool = struk_storage::create_db(&path)
            .await
            .with_context(|| format!("Failed to open history database {}", path.display()))?;
        Ok(pool)
    }

    /// `--out` wins, then `[export] output_dir`, then the working directory.
    pub fn export_dir(&self, out: Option<PathBuf>) -> PathBuf {
        out.or_else(|| self.config.export.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// `--format` wins over `[export] format`.
    pub fn export_format(&self, format: Option<SheetFormat>) -> SheetFormat {
        format.unwrap_or(self.config.export.format)
    }
}
