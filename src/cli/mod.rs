//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod config;
pub mod run;
pub mod status;
pub mod verify;

pub use config::{handle_config_command, handle_init_command};
pub use run::{handle_run_command, RunArgs};
pub use status::handle_status_command;
pub use verify::handle_verify_command;
