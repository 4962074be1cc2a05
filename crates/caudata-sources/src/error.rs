use caudata_core::CaudataError;
use thiserror::Error;

/// Errors raised while talking to a remote source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("Could not read GeoTIFF tile {tile}: {reason}")]
    Tiff { tile: String, reason: String },

    #[error("Tile {tile} is {width}x{height} pixels, expected {expected}x{expected}")]
    TileSize { tile: String, width: usize, height: usize, expected: usize },

    #[error("Cache error: {0}")]
    Cache(#[from] CaudataError),
}

impl SourceError {
    /// Attach the query that triggered this error
    pub fn into_fetch_error(self, source_name: &str, query: impl Into<String>) -> CaudataError {
        match self {
            SourceError::Cache(inner) => inner,
            SourceError::Decode { reason, .. } => {
                CaudataError::Schema { source_name: source_name.to_string(), reason }
            }
            other => CaudataError::SourceFetch {
                source_name: source_name.to_string(),
                query: query.into(),
                reason: other.to_string(),
            },
        }
    }
}

impl From<SourceError> for CaudataError {
    fn from(err: SourceError) -> Self {
        let query = match &err {
            SourceError::Request { url, .. }
            | SourceError::Status { url, .. }
            | SourceError::Decode { url, .. } => url.clone(),
            SourceError::Tiff { tile, .. } | SourceError::TileSize { tile, .. } => tile.clone(),
            SourceError::Cache(_) => String::new(),
        };
        err.into_fetch_error("remote source", query)
    }
}

pub type Result<T> = std::result::Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_keeps_query() {
        let err = SourceError::Status { url: "https://api.gbif.org/v1/x".to_string(), status: 503 }
            .into_fetch_error("GBIF", "scientificName=Taricha sierrae offset=300");

        match err {
            CaudataError::SourceFetch { source_name, query, reason } => {
                assert_eq!(source_name, "GBIF");
                assert!(query.contains("offset=300"));
                assert!(reason.contains("503"));
            }
            other => panic!("Expected SourceFetch, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_error_is_schema_error() {
        let err: CaudataError =
            SourceError::Decode { url: "u".to_string(), reason: "not json".to_string() }.into();
        assert!(matches!(err, CaudataError::Schema { .. }));
    }
}
