//! # Liri Common Library
//!
//! Shared code for the Liri menu tooling:
//! - Error and result types
//! - TOML configuration model and resolution
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod time;

pub use config::TomlConfig;
pub use error::{Error, Result};
