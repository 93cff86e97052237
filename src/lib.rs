//! Elderly care in Finland, in numbers
//!
//! Fetches population, health survey and ICT usage tables from the
//! Statistics Finland PxWeb API, reads the THL health expenditure and home
//! care workbooks, reshapes every source into a tidy [`Table`], draws the
//! charts of the analysis as SVG files and runs the statistics: Pearson
//! correlations, descriptive statistics and a Mann-Whitney U test.
//!
//! # Examples
//!
//! ```rust,no_run
//! use hoiva_analyysi::{AppError, Config, RunOptions, run_analysis};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let config = Config::load().await?;
//!     let report = run_analysis(&config, RunOptions::default()).await?;
//!
//!     println!("{}", report.home_care_correlation);
//!     println!(
//!         "U = {:.2}, p = {:.4}",
//!         report.self_care_test.u, report.self_care_test.p_value
//!     );
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod app;
pub mod charts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod data_fetcher;
pub mod datasets;
pub mod error;
pub mod logging;
pub mod table;
pub mod testing_utils;

// Re-export commonly used types for convenience
pub use analysis::{
    CorrelationMatrix, Decision, MannWhitney, Summary, correlation_matrix, describe,
    mann_whitney_u,
};
pub use app::{Report, RunOptions, Sources, analyse, load_sources, run_analysis};
pub use config::Config;
pub use error::AppError;
pub use table::{Table, Value};

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
