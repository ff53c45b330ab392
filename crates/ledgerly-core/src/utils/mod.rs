//! Utility functions for formatting amounts, dates and labels.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{format_currency, format_date, month_label, truncate_string};
