#![forbid(unsafe_code)]

//! Blood-alcohol concentration estimation engine for Alkomat.
//!
//! This crate provides:
//! - Domain types (raw input, session, timeline, estimate)
//! - Drink preset catalog
//! - Engine stages (normalizer, dose aggregation, timeline, classifier)
//! - Configuration, logging and CSV export

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod presets;
pub mod normalizer;
pub mod dose;
pub mod timeline;
pub mod classifier;
pub mod engine;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::{Config, ModelConfig};
pub use presets::{build_default_presets, get_default_presets};
pub use normalizer::Normalizer;
pub use dose::total_grams;
pub use timeline::{simulate, Timeline};
pub use classifier::{classify, Classification};
pub use engine::{estimate, estimate_at};
pub use export::write_timeline_csv;
