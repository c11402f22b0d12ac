//! Utility functions for string formatting.

pub mod format;

pub use format::{format_added, percent_bar, truncate_string};
