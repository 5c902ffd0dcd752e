pub mod config;
pub mod keywords;
pub mod money;
pub mod receipt;

pub use config::{ConfigError, ExportConfig, OcrConfig, SheetFormat, StorageConfig, StrukConfig};
pub use keywords::KeywordSet;
pub use money::Amount;
pub use receipt::{LineItem, ParseResult};
