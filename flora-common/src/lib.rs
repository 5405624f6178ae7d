//! # Flora Common Library
//!
//! Shared code for Flora services including:
//! - Error and result types
//! - Bootstrap configuration loading (TOML)
//! - Tracing subscriber initialization

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
