//! # Sums Common Library
//!
//! Shared code for the sums service crates:
//! - Error and result types
//! - Configuration loading (TOML bootstrap file, config path resolution)
//! - UUID helpers for record identifiers

pub mod config;
pub mod error;
pub mod uuid_utils;

pub use error::{Error, Result};
