//! Configuration module for billsplit
//!
//! This module provides configuration management including:
//! - Base directory resolution
//! - Settings persistence (split markers, acting party, column layout)

pub mod paths;
pub mod settings;

pub use paths::SplitPaths;
pub use settings::Settings;
