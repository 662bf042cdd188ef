//! Configuration and file management for redux-demo
//!
//! This crate provides:
//! - Config and cache directory paths
//! - Configuration file lookup (TOML)
//! - Demo configuration (DemoConfig)

pub mod config_file;
pub mod demo_config;
pub mod paths;

pub use config_file::{load_config_file, CONFIG_FILE};
pub use demo_config::DemoConfig;
pub use paths::{app_config_path, cache_dir, config_dir};
