//! Authenticated HTTP fetcher for newline-delimited query results

use crate::ndjson_stream::{collect_records, NdjsonStream};
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use reqwest::{Client, StatusCode};
use std::pin::Pin;
use std::time::{Duration, Instant};
use viz_house_config::{Authentication, RemoteChartConfig, RequestSettings};
use viz_house_shared::{ChartsError, ChartsResult, Record};

/// Header announcing which endpoint protocol revision the client speaks
pub const ENDPOINT_VERSION_HEADER: &str = "x-clickhouse-endpoint-version";

/// Response body as delivered by the HTTP client
type BodyStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// Anything able to produce one complete, ordered batch of query records
#[async_trait]
pub trait QuerySource: Send + Sync {
    async fn fetch_records(&self) -> ChartsResult<Vec<Record>>;

    /// Short description used in log lines
    fn describe(&self) -> String;
}

/// Issues one POST per fetch and stream-decodes the response body
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    client: Client,
    url: String,
    authentication: Authentication,
    request: RequestSettings,
}

impl RemoteFetcher {
    pub fn new(url: &str, authentication: Authentication, request: RequestSettings) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
            authentication,
            request,
        }
    }

    pub fn from_config(config: &RemoteChartConfig) -> Self {
        Self::new(
            &config.url,
            config.authentication.clone(),
            config.request.clone(),
        )
    }

    /// Reuse an existing client and its connection pool
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Perform the request and collect every record in arrival order
    pub async fn fetch(&self) -> ChartsResult<Vec<Record>> {
        let started = Instant::now();
        log::debug!("Fetching query results from {}", self.url);

        let mut request = self
            .client
            .post(&self.url)
            .header(ENDPOINT_VERSION_HEADER, &self.request.endpoint_version)
            .json(&serde_json::json!({ "format": self.request.format }));

        request = match &self.authentication {
            Authentication::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
        };

        if let Some(timeout_ms) = self.request.timeout_ms {
            request = request.timeout(Duration::from_millis(timeout_ms));
        }

        let response = request.send().await.map_err(|e| ChartsError::Network {
            message: e.to_string(),
        })?;

        let status = response.status();
        log::debug!("{} responded with {}", self.url, status);

        if !status.is_success() {
            return Err(ChartsError::Http {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            });
        }
        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return Err(ChartsError::MissingBody);
        }

        let body: BodyStream = Box::pin(response.bytes_stream());
        let stream = NdjsonStream::new(body);
        let records = collect_records(stream).await?;

        log::info!(
            "Fetched {} records from {} in {:?}",
            records.len(),
            self.url,
            started.elapsed()
        );

        Ok(records)
    }
}

#[async_trait]
impl QuerySource for RemoteFetcher {
    async fn fetch_records(&self) -> ChartsResult<Vec<Record>> {
        self.fetch().await
    }

    fn describe(&self) -> String {
        format!("POST {}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viz_house_shared::ChartConfig;

    #[test]
    fn test_from_config_copies_request_settings() {
        let mut config = RemoteChartConfig::new(
            "https://example.com/query",
            Authentication::basic("default", ""),
            ChartConfig::default(),
        );
        config.request.timeout_ms = Some(2_000);

        let fetcher = RemoteFetcher::from_config(&config);
        assert_eq!(fetcher.url(), "https://example.com/query");
        assert_eq!(fetcher.request.timeout_ms, Some(2_000));
        assert_eq!(fetcher.describe(), "POST https://example.com/query");
    }
}
