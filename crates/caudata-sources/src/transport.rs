use async_trait::async_trait;

use crate::error::{Result, SourceError};

/// Port for plain HTTP GETs returning the response body
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// Transport backed by a shared reqwest client with default settings
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Request { url: url.to_string(), reason: e.to_string() })?;

        if !response.status().is_success() {
            return Err(SourceError::Status { url: url.to_string(), status: response.status().as_u16() });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SourceError::Request { url: url.to_string(), reason: e.to_string() })?;
        tracing::debug!(url, bytes = body.len(), "Downloaded");
        Ok(body.to_vec())
    }
}

/// GET through an optional cache: a hit skips the request, a miss is stored
pub(crate) async fn fetch_cached(
    transport: &dyn Transport,
    cache: Option<&dyn caudata_store::ResponseCache>,
    key: &str,
    url: &str,
) -> Result<Vec<u8>> {
    if let Some(cache) = cache {
        if let Some(bytes) = cache.get(key).await? {
            tracing::debug!(key, "Served from cache");
            return Ok(bytes);
        }
    }

    let bytes = transport.get_bytes(url).await?;
    if let Some(cache) = cache {
        cache.put(key, &bytes).await?;
    }
    Ok(bytes)
}
