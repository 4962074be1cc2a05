//! GBIF occurrence-search client.

pub mod schema;

use std::sync::Arc;

use async_trait::async_trait;
use caudata_core::error::{CaudataError, Result};
use caudata_core::models::{OccurrenceRecord, OccurrenceTable, TaxonQuery};
use caudata_core::ports::OccurrenceSource;
use caudata_store::ResponseCache;

use crate::error::SourceError;
use crate::transport::{fetch_cached, HttpTransport, Transport};
use schema::{decode_record, SearchPage};

/// Public GBIF API root
pub const GBIF_API_URL: &str = "https://api.gbif.org/v1";

/// Largest page the search endpoint serves
pub const PAGE_SIZE: usize = 300;

const SOURCE_NAME: &str = "GBIF";

/// Occurrence source paging through `occurrence/search`
pub struct GbifClient {
    base_url: String,
    /// Maximum records fetched per queried name
    record_limit: usize,
    transport: Arc<dyn Transport>,
    cache: Option<Arc<dyn ResponseCache>>,
}

impl GbifClient {
    pub fn new(record_limit: usize) -> Self {
        Self::with_transport(GBIF_API_URL, record_limit, Arc::new(HttpTransport::new()))
    }

    pub fn with_transport(
        base_url: impl Into<String>,
        record_limit: usize,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            record_limit,
            transport,
            cache: None,
        }
    }

    /// Cache raw pages between runs
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn record_limit(&self) -> usize {
        self.record_limit
    }

    /// URL of one search page
    pub fn page_url(&self, name: &str, offset: usize, limit: usize) -> Result<String> {
        let endpoint = format!("{}/occurrence/search", self.base_url);
        let url = reqwest::Url::parse_with_params(
            &endpoint,
            &[
                ("scientificName", name.to_string()),
                ("hasCoordinate", "true".to_string()),
                ("hasGeospatialIssue", "false".to_string()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ],
        )
        .map_err(|e| CaudataError::ConfigInvalid {
            key: "gbif.base_url".to_string(),
            reason: format!("'{}': {}", endpoint, e),
        })?;
        Ok(url.to_string())
    }

    fn cache_key(name: &str, offset: usize, limit: usize) -> String {
        format!("gbif/{}/{}-{}.json", name.replace(' ', "_"), offset, limit)
    }

    /// Every record for one scientific name, up to the record limit
    async fn fetch_name(&self, name: &str) -> Result<Vec<OccurrenceRecord>> {
        let mut records = Vec::new();
        let mut offset = 0;

        while records.len() < self.record_limit {
            let limit = PAGE_SIZE.min(self.record_limit - records.len());
            let url = self.page_url(name, offset, limit)?;
            let query = format!("scientificName={} offset={} url={}", name, offset, url);

            let body = fetch_cached(
                self.transport.as_ref(),
                self.cache.as_deref(),
                &Self::cache_key(name, offset, limit),
                &url,
            )
            .await
            .map_err(|e| e.into_fetch_error(SOURCE_NAME, query.clone()))?;

            let page: SearchPage = serde_json::from_slice(&body).map_err(|e| {
                SourceError::Decode { url: url.clone(), reason: e.to_string() }
                    .into_fetch_error(SOURCE_NAME, query.clone())
            })?;

            let delivered = page.results.len();
            let mut skipped = 0;
            for value in &page.results {
                match decode_record(value) {
                    Some(record) => records.push(record),
                    None => skipped += 1,
                }
            }
            if skipped > 0 {
                tracing::warn!(name, offset, skipped, "Skipped non-object search results");
            }
            tracing::debug!(name, offset, delivered, total = ?page.count, "Fetched page");

            if page.end_of_records || delivered == 0 {
                break;
            }
            offset += delivered;
        }

        records.truncate(self.record_limit);
        Ok(records)
    }
}

#[async_trait]
impl OccurrenceSource for GbifClient {
    async fn fetch(&self, query: &TaxonQuery) -> Result<OccurrenceTable> {
        let mut table = OccurrenceTable::default();
        for name in query.names() {
            let records = self.fetch_name(&name).await?;
            tracing::info!(name = %name, records = records.len(), "Fetched occurrences");
            table.extend(OccurrenceTable::new(records));
        }
        Ok(table)
    }

    fn source_name(&self) -> &str {
        SOURCE_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_url_encodes_name() {
        let client = GbifClient::new(5000);
        let url = client.page_url("Taricha sierrae", 300, 300).unwrap();
        assert!(url.starts_with("https://api.gbif.org/v1/occurrence/search?"));
        assert!(url.contains("scientificName=Taricha+sierrae"));
        assert!(url.contains("hasCoordinate=true"));
        assert!(url.contains("hasGeospatialIssue=false"));
        assert!(url.contains("offset=300"));
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(
            GbifClient::cache_key("Taricha torosa sierrae", 0, 300),
            "gbif/Taricha_torosa_sierrae/0-300.json"
        );
    }
}
