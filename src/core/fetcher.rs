use crate::domain::model::{Feature, FeatureCollection};
use crate::utils::error::{ParcelError, Result};
use reqwest::Client;

/// Matches the service's MaxRecordCount.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Safety bound on the pagination loop. A server that keeps returning full
/// pages would otherwise never terminate the offset cursor.
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Filter and projection for one feature-layer query.
#[derive(Debug, Clone)]
pub struct LayerQuery {
    pub where_clause: String,
    /// Empty means all fields (`outFields=*`).
    pub out_fields: Vec<String>,
    pub order_by: Option<String>,
    pub out_sr: Option<String>,
}

impl Default for LayerQuery {
    fn default() -> Self {
        Self {
            where_clause: "1=1".to_string(),
            out_fields: Vec::new(),
            order_by: None,
            out_sr: None,
        }
    }
}

impl LayerQuery {
    fn out_fields_param(&self) -> String {
        if self.out_fields.is_empty() {
            "*".to_string()
        } else {
            self.out_fields.join(",")
        }
    }
}

/// Pages through a feature-layer query endpoint, accumulating records until
/// the service signals exhaustion with an empty or short page.
pub struct FeatureFetcher {
    client: Client,
    max_pages: usize,
}

impl FeatureFetcher {
    pub fn new() -> Self {
        Self::with_max_pages(DEFAULT_MAX_PAGES)
    }

    pub fn with_max_pages(max_pages: usize) -> Self {
        Self {
            client: Client::new(),
            max_pages,
        }
    }

    /// Fetch every feature satisfying `query`, in server return order.
    /// Layer metadata comes from the first page. Any transport or parse
    /// failure aborts with no partial result.
    pub async fn fetch_all(
        &self,
        url: &str,
        query: &LayerQuery,
        page_size: usize,
    ) -> Result<FeatureCollection> {
        let mut collection: Option<FeatureCollection> = None;
        let mut features: Vec<Feature> = Vec::new();
        let mut offset = 0usize;
        let mut pages = 0usize;

        loop {
            if pages >= self.max_pages {
                return Err(ParcelError::PaginationLimit {
                    max_pages: self.max_pages,
                    records: features.len(),
                });
            }

            let page = self.query_page(url, query, offset, page_size).await?;
            pages += 1;
            let returned = page.features.len();
            tracing::debug!(
                "Page {} returned {} features at offset {}",
                pages,
                returned,
                offset
            );

            if collection.is_none() {
                collection = Some(FeatureCollection {
                    display_field_name: page.display_field_name.clone(),
                    field_aliases: page.field_aliases.clone(),
                    fields: page.fields.clone(),
                    features: Vec::new(),
                });
            }

            // Missing or empty `features` (including the service's in-band
            // error shape) terminates accumulation.
            if returned == 0 {
                break;
            }
            features.extend(page.features);

            // A short page is the final page.
            if returned < page_size {
                break;
            }
            offset += page_size;
        }

        let mut collection = collection.unwrap_or_default();
        collection.features = features;
        tracing::info!(
            "Fetched {} features over {} request(s)",
            collection.len(),
            pages
        );
        Ok(collection)
    }

    /// One bounded query, as used for the recently-modified layer.
    pub async fn fetch_page(
        &self,
        url: &str,
        query: &LayerQuery,
        limit: usize,
    ) -> Result<FeatureCollection> {
        self.query_page(url, query, 0, limit).await
    }

    async fn query_page(
        &self,
        url: &str,
        query: &LayerQuery,
        offset: usize,
        count: usize,
    ) -> Result<FeatureCollection> {
        let mut params: Vec<(&str, String)> = vec![
            ("where", query.where_clause.clone()),
            ("outFields", query.out_fields_param()),
            ("f", "json".to_string()),
            ("returnGeometry", "false".to_string()),
            ("resultRecordCount", count.to_string()),
            ("resultOffset", offset.to_string()),
        ];
        if let Some(out_sr) = &query.out_sr {
            params.push(("outSR", out_sr.clone()));
        }
        if let Some(order_by) = &query.order_by {
            params.push(("orderByFields", order_by.clone()));
        }

        let response = self.client.get(url).query(&params).send().await?;
        let status = response.status();
        tracing::debug!("Query response status: {}", status);
        if !status.is_success() {
            return Err(ParcelError::ServiceStatusError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let page: FeatureCollection = response.json().await?;
        Ok(page)
    }
}

impl Default for FeatureFetcher {
    fn default() -> Self {
        Self::new()
    }
}
