//! Tweet text normalization.

pub mod cleaner;

pub use cleaner::clean_text;
