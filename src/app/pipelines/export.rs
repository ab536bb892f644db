use crate::config::toml_config::ServiceConfig;
use crate::core::fetcher::{FeatureFetcher, LayerQuery};
use crate::domain::model::FeatureCollection;
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Bulk export of the schedule layer to a JSON snapshot file.
pub struct ExportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    service: ServiceConfig,
    fetcher: FeatureFetcher,
    output_file: String,
}

pub struct SnapshotReport {
    pub collection: FeatureCollection,
    pub unique_ppis: usize,
}

impl<S: Storage, C: ConfigProvider> ExportPipeline<S, C> {
    pub fn new(storage: S, config: C, service: ServiceConfig, output_file: String) -> Self {
        let fetcher = FeatureFetcher::with_max_pages(config.max_pages());
        Self {
            storage,
            config,
            service,
            fetcher,
            output_file,
        }
    }
}

#[async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ExportPipeline<S, C> {
    type Raw = FeatureCollection;
    type Transformed = SnapshotReport;

    async fn extract(&self) -> Result<FeatureCollection> {
        let url = self.service.schedule_query_url();
        let query = LayerQuery {
            where_clause: self.service.schedule_layer.where_clause.clone(),
            out_fields: self.service.schedule_layer.fields.clone(),
            out_sr: self.service.service.out_sr.clone(),
            order_by: self.service.schedule_layer.order_by.clone(),
        };
        self.fetcher
            .fetch_all(&url, &query, self.config.page_size())
            .await
    }

    async fn transform(&self, data: FeatureCollection) -> Result<SnapshotReport> {
        let unique_ppis = data.unique_ppi_count();
        tracing::info!("Total unique PPIs: {}", unique_ppis);
        Ok(SnapshotReport {
            collection: data,
            unique_ppis,
        })
    }

    async fn load(&self, result: SnapshotReport) -> Result<String> {
        if result.collection.is_empty() {
            tracing::warn!("No features found in the response; nothing written");
            return Ok("no features found; nothing written".to_string());
        }

        let json = serde_json::to_vec_pretty(&result.collection)?;
        self.storage.write_file(&self.output_file, &json).await?;
        Ok(format!(
            "{} features ({} unique PPIs) saved to {}",
            result.collection.len(),
            result.unique_ppis,
            self.output_file
        ))
    }
}
