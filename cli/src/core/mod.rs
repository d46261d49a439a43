//! # Squeeze Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//! Author: Christi Mahu
//! Repository: https://github.com/christimahu/squeeze
//!
//! ## Overview
//!
//! This module aggregates the core infrastructure components shared by the
//! whole application:
//! - `config`: Config file loading, flag merging, and validation into a `RunConfig`
//! - `error`: The `SqueezeError` taxonomy and the `Result` alias
//!
//! ## Usage
//!
//! ```rust
//! use crate::core::config; // For resolving the run configuration
//! use crate::core::error::{Result, SqueezeError}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
