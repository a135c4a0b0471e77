//! Utility functions for string formatting and manipulation.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{abbreviate_stat, format_date, slugify, truncate_string};
