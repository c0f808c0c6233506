//! Configuration module for hfs-backup
//!
//! This module provides configuration management including:
//! - Settings file persistence and command-line overrides
//! - Output root path layout

pub mod paths;
pub mod settings;

pub use paths::BackupPaths;
pub use settings::{Settings, SettingsOverrides};
