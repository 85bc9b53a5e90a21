//! Configuration file parsing and validation

pub mod vldtr_toml;

pub use vldtr_toml::{Config, EngineConfig};
