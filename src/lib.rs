pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, CliConfig};

pub use core::normalize::{normalize_amount, normalize_rent};
pub use core::{etl::EtlEngine, pipeline::RentRollPipeline, report_pipeline::TomlReportPipeline};
pub use utils::error::{EtlError, Result};
