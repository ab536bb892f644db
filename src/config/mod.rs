pub mod cli;
pub mod toml_config;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, Validate};
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "parcel-etl")]
#[command(about = "Query a county parcel map service and scrape parcel detail pages")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, default_value = "./output")]
    pub output_path: String,

    #[arg(long, global = true, help = "TOML service configuration file")]
    pub config: Option<String>,

    #[arg(long, global = true, default_value = "1000")]
    pub page_size: usize,

    #[arg(
        long,
        global = true,
        default_value = "1000",
        help = "Abort pagination after this many pages"
    )]
    pub max_pages: usize,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Export the schedule layer to a JSON snapshot file
    Export {
        #[arg(long, default_value = "schedule_fields_data.json")]
        output_file: String,
    },
    /// Cross-reference recently modified parcels against the schedule layer
    Crossref {
        #[arg(long, default_value = "5", help = "How many recent modifications to check")]
        result_count: usize,

        #[arg(long, help = "Scrape the detail page for each match")]
        scrape_details: bool,

        #[arg(long, help = "Write matches to this JSON file")]
        output_file: Option<String>,
    },
    /// Extract named fields from one parcel detail page
    Detail {
        #[arg(long, help = "Schedule number identifying the parcel")]
        schedule: String,

        #[arg(long, help = "Write extracted fields to this JSON file")]
        output_file: Option<String>,
    },
}

impl ConfigProvider for CliConfig {
    fn page_size(&self) -> usize {
        self.page_size
    }

    fn max_pages(&self) -> usize {
        self.max_pages
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number("page_size", self.page_size, 1)?;
        validate_positive_number("max_pages", self.max_pages, 1)?;
        match &self.command {
            Command::Crossref { result_count, .. } => {
                validate_positive_number("result_count", *result_count, 1)
            }
            Command::Detail { schedule, .. } => {
                crate::utils::validation::validate_non_empty_string("schedule", schedule)
            }
            Command::Export { output_file } => {
                crate::utils::validation::validate_non_empty_string("output_file", output_file)
            }
        }
    }
}
