pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use app::pipelines::{CrossRefPipeline, DetailPipeline, ExportPipeline};
pub use config::{cli::LocalStorage, CliConfig};
pub use core::{etl::EtlEngine, fetcher::FeatureFetcher};
pub use utils::error::{ParcelError, Result};
