pub mod batch;
pub mod geo;
pub mod histogram;
pub mod inequality;
pub mod orchestrator;
pub mod regression;
pub mod stats;
pub mod temporal;

pub use crate::domain::model::{Listing, Region, StatsBundle};
pub use crate::domain::ports::{ListingSource, Storage};
pub use crate::utils::error::Result;
