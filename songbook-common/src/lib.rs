//! # Songbook Common Library
//!
//! Shared code for the Songbook service:
//! - Song model and database queries
//! - Configuration loading and root folder resolution
//! - Common error type

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
