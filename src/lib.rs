pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{CsvListingSource, HttpListingSource, LocalStorage, MemoryListingSource, ReportCache};
pub use config::toml_config::AppConfig;
pub use core::batch::{BatchRunner, BatchSummary};
pub use core::histogram::{compute_histogram, HistogramSettings};
pub use core::orchestrator::StatsOrchestrator;
pub use core::stats::{StatsDepth, StatsEngine, StatsOptions};
pub use domain::catalog::RegionCatalog;
pub use domain::model::{CityReport, Listing, Region, SanityBounds, StatsBundle};
pub use utils::error::{Result, StatsError};
