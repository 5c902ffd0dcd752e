pub mod db;

pub use db::{
    create_db, delete_scan, get_scan, insert_scan, list_history, DbPool, ScanRecord, ScanSummary,
    StorageError,
};
