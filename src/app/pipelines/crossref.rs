use crate::config::toml_config::ServiceConfig;
use crate::core::detail::DetailScraper;
use crate::core::fetcher::{FeatureFetcher, LayerQuery};
use crate::core::join::{build_ppi_index, cross_reference, detail_url, format_moddate};
use crate::domain::model::{Feature, FeatureCollection, JoinSummary, MatchRecord, MODDATE_FIELD};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Joins the most recently modified parcels against a full schedule-layer
/// snapshot by PPI, optionally scraping the detail page for each match.
pub struct CrossRefPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    service: ServiceConfig,
    fetcher: FeatureFetcher,
    scraper: DetailScraper,
    result_count: usize,
    scrape_details: bool,
    output_file: Option<String>,
}

pub struct CrossRefInput {
    pub snapshot: FeatureCollection,
    pub candidates: Vec<Feature>,
}

pub struct CrossRefOutcome {
    pub matches: Vec<MatchRecord>,
    pub summary: JoinSummary,
}

impl<S: Storage, C: ConfigProvider> CrossRefPipeline<S, C> {
    pub fn new(
        storage: S,
        config: C,
        service: ServiceConfig,
        result_count: usize,
        scrape_details: bool,
        output_file: Option<String>,
    ) -> Self {
        let fetcher = FeatureFetcher::with_max_pages(config.max_pages());
        Self {
            storage,
            config,
            service,
            fetcher,
            scraper: DetailScraper::new(),
            result_count,
            scrape_details,
            output_file,
        }
    }

    fn print_match(&self, number: usize, record: &MatchRecord) {
        println!("\n--- Match #{} - PPI: {} ---", number, record.ppi);
        println!("Modified Date: {}", record.modified_date);

        println!("\nMODTYPE ATTRIBUTES:");
        for field in &self.service.crossref.modtype_fields {
            if let Some(value) = record.modtype_attributes.get(field) {
                if field == MODDATE_FIELD {
                    println!("  {}: {}", field, format_moddate(value.as_i64()));
                } else {
                    println!("  {}: {}", field, display_value(value));
                }
            }
        }

        println!("\nSCHEDULE ID ATTRIBUTES:");
        for field in &self.service.crossref.schedule_fields {
            if let Some(value) = record.schedule_attributes.get(field) {
                println!("  {}: {}", field, display_value(value));
            }
        }
        println!("{}", "-".repeat(50));
    }

    /// Per-page failures are logged and skipped; the join result has already
    /// been reported and written by the time scraping starts.
    async fn scrape_match_details(&self, matches: &[MatchRecord]) {
        for record in matches {
            let Some(schedule) = record.schedule() else {
                tracing::warn!("Match {} has no Schedule attribute; skipping", record.ppi);
                continue;
            };
            let url = detail_url(&self.service.service.detail_url, &schedule);
            println!("\nDetail page: {}", url);
            let detail = match self
                .scraper
                .scrape(&url, &self.service.detail.table_class, &self.service.detail.labels)
                .await
            {
                Ok(detail) => detail,
                Err(e) => {
                    tracing::warn!("Failed to scrape {}: {}", url, e);
                    continue;
                }
            };
            for spec in &self.service.detail.labels {
                if let Some(value) = detail.get(&spec.display) {
                    println!("  {}: {}", spec.display, value);
                }
            }
        }
    }
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CrossRefPipeline<S, C> {
    type Raw = CrossRefInput;
    type Transformed = CrossRefOutcome;

    async fn extract(&self) -> Result<CrossRefInput> {
        tracing::info!("Loading schedule snapshot for comparison...");
        // Full attribute set (`outFields=*`) so the allow-list projection has
        // every field to draw from; the configured filter still applies.
        let snapshot_query = LayerQuery {
            where_clause: self.service.schedule_layer.where_clause.clone(),
            out_fields: Vec::new(),
            order_by: self.service.schedule_layer.order_by.clone(),
            out_sr: self.service.service.out_sr.clone(),
        };
        let snapshot = self
            .fetcher
            .fetch_all(
                &self.service.schedule_query_url(),
                &snapshot_query,
                self.config.page_size(),
            )
            .await?;
        tracing::info!("Loaded {} features from the schedule layer", snapshot.len());

        let modified_query = LayerQuery {
            where_clause: self.service.modified_layer.where_clause.clone(),
            order_by: self.service.modified_layer.order_by.clone(),
            out_fields: self.service.modified_layer.fields.clone(),
            out_sr: None,
        };
        let candidates = self
            .fetcher
            .fetch_page(
                &self.service.modified_query_url(),
                &modified_query,
                self.result_count,
            )
            .await?
            .features;
        tracing::info!("Fetched {} recently modified parcels", candidates.len());

        Ok(CrossRefInput {
            snapshot,
            candidates,
        })
    }

    async fn transform(&self, data: CrossRefInput) -> Result<CrossRefOutcome> {
        let index = build_ppi_index(&data.snapshot);
        tracing::info!("Indexed {} unique PPIs", index.len());

        let (matches, summary) = cross_reference(
            &index,
            &data.candidates,
            &self.service.crossref.modtype_fields,
            &self.service.crossref.schedule_fields,
        );
        Ok(CrossRefOutcome { matches, summary })
    }

    async fn load(&self, result: CrossRefOutcome) -> Result<String> {
        if result.matches.is_empty() {
            return Ok(format!(
                "no matching PPIs found out of {} queried parcels",
                result.summary.candidates
            ));
        }

        println!("\nMatching PPIs from Most Recently Modified Parcels:");
        for (i, record) in result.matches.iter().enumerate() {
            self.print_match(i + 1, record);
        }

        println!("\nSUMMARY:");
        println!("Total queried parcels: {}", result.summary.candidates);
        println!("Matching PPIs found: {}", result.summary.matches);
        println!("Match percentage: {:.1}%", result.summary.percent());

        if let Some(output_file) = &self.output_file {
            let json = serde_json::to_vec_pretty(&result.matches)?;
            self.storage.write_file(output_file, &json).await?;
            tracing::info!("Matches written to {}", output_file);
        }

        if self.scrape_details {
            self.scrape_match_details(&result.matches).await;
        }

        Ok(format!(
            "{} of {} recently modified parcels matched ({:.1}%)",
            result.summary.matches,
            result.summary.candidates,
            result.summary.percent()
        ))
    }
}
