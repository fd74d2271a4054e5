//! Dataset loading.

pub mod loader;

pub use loader::{read_csv, ColumnMapping, LoadError};
