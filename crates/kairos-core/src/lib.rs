//! Shared building blocks for the kairos recurrence engine.
//!
//! - `config`: layered settings (defaults, `.env`, environment, `kairos.toml`)
//! - `error`: engine-agnostic error type

pub mod config;
pub mod error;
