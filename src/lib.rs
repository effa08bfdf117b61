//! Index Volatility
//!
//! Rolling volatility analysis for Nifty 50 and Bank Nifty constituents:
//! daily bars are fetched, cleaned, reduced to a rolling coefficient of
//! variation of the close, and shaped into a chart payload with a
//! high-volatility threshold.

pub mod catalog;
pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod pipeline;
pub mod types;
pub mod volatility;

pub use catalog::Catalog;
pub use config::Config;
pub use error::{PipelineError, PipelineResult, Severity};
pub use pipeline::{VolatilityAnalyzer, VolatilityReport};
pub use types::*;
