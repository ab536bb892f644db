use crate::config::toml_config::ServiceConfig;
use crate::core::detail::{extract_fields, DetailScraper};
use crate::core::join::detail_url;
use crate::domain::model::DetailRecord;
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Fetches one parcel's detail page and extracts the configured labels.
pub struct DetailPipeline<S: Storage> {
    storage: S,
    service: ServiceConfig,
    scraper: DetailScraper,
    schedule: String,
    output_file: Option<String>,
}

impl<S: Storage> DetailPipeline<S> {
    pub fn new(
        storage: S,
        service: ServiceConfig,
        schedule: String,
        output_file: Option<String>,
    ) -> Self {
        Self {
            storage,
            service,
            scraper: DetailScraper::new(),
            schedule,
            output_file,
        }
    }

    pub fn page_url(&self) -> String {
        detail_url(&self.service.service.detail_url, &self.schedule)
    }
}

#[async_trait]
impl<S: Storage> Pipeline for DetailPipeline<S> {
    type Raw = String;
    type Transformed = DetailRecord;

    async fn extract(&self) -> Result<String> {
        let url = self.page_url();
        tracing::info!("Fetching detail page {}", url);
        self.scraper.fetch_document(&url).await
    }

    async fn transform(&self, html: String) -> Result<DetailRecord> {
        Ok(extract_fields(
            &html,
            &self.service.detail.table_class,
            &self.service.detail.labels,
        ))
    }

    async fn load(&self, record: DetailRecord) -> Result<String> {
        for spec in &self.service.detail.labels {
            if let Some(value) = record.get(&spec.display) {
                println!("{}: {}", spec.display, value);
            }
        }

        if let Some(output_file) = &self.output_file {
            let json = serde_json::to_vec_pretty(&record)?;
            self.storage.write_file(output_file, &json).await?;
            tracing::info!("Detail fields written to {}", output_file);
        }

        Ok(format!(
            "extracted {} of {} fields for schedule {}",
            record.fields.len(),
            self.service.detail.labels.len(),
            self.schedule
        ))
    }
}
