//! Data models: configuration and the output table.

pub mod config;
pub mod table;

pub use config::NfxConfig;
pub use table::{Row, Table, COLUMNS};
