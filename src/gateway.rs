//! Typed access to the analytics backend.
//!
//! [`Gateway`] is the seam the rest of the crate depends on; [`HttpGateway`]
//! is the reqwest implementation. Each call is a single GET with its own
//! timeout. No call retries: a retry is always a new user action.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::types::{
    Address, AddressClusterWire, AnalyticsSummary, Cluster, ClusterDetail, ClusterGraph,
    ClusterQuery, DistributionBucket, PageRequest, PageResult, SearchResult, SearchWire,
    Transaction,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn fetch_address(&self, address: &str) -> ApiResult<Address>;

    async fn fetch_address_transactions(
        &self,
        address: &str,
        page: PageRequest,
    ) -> ApiResult<PageResult<Transaction>>;

    /// `NotFound` when the address has no cluster
    async fn fetch_address_cluster(&self, address: &str) -> ApiResult<Cluster>;

    async fn fetch_cluster(&self, cluster_id: &str) -> ApiResult<ClusterDetail>;

    async fn fetch_clusters(&self, query: ClusterQuery) -> ApiResult<PageResult<Cluster>>;

    async fn fetch_cluster_graph(&self, cluster_id: &str) -> ApiResult<ClusterGraph>;

    async fn search(&self, query: &str) -> ApiResult<SearchResult>;

    async fn fetch_analytics_summary(&self) -> ApiResult<AnalyticsSummary>;

    async fn fetch_cluster_distribution(&self) -> ApiResult<Vec<DistributionBucket>>;
}

#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| ApiError::transport(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(cfg: &Config) -> ApiResult<Self> {
        Self::new(cfg.api_url.clone(), Duration::from_millis(cfg.request_timeout_ms))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = self.url(path);
        log::debug!("[gateway] GET {url} {query:?}");

        let res = self
            .client
            .get(&url)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                let err = if e.is_timeout() {
                    ApiError::transport(format!(
                        "request timed out after {}ms",
                        self.timeout.as_millis()
                    ))
                } else {
                    ApiError::from(e)
                };
                log::warn!("[gateway] GET {url} failed: {err}");
                err
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let err = ApiError::from_response(status.as_u16(), &body);
            log::warn!("[gateway] GET {url} -> {status}: {}", err.message);
            return Err(err);
        }

        let bytes = res.bytes().await.map_err(ApiError::from)?;
        serde_json::from_slice::<T>(&bytes).map_err(|e| {
            log::warn!("[gateway] GET {url} returned an undecodable body: {e}");
            ApiError::transport(format!("invalid response body: {e}")).with_status(status.as_u16())
        })
    }
}

fn seg(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn fetch_address(&self, address: &str) -> ApiResult<Address> {
        self.get_json(&format!("addresses/{}", seg(address)), &[]).await
    }

    async fn fetch_address_transactions(
        &self,
        address: &str,
        page: PageRequest,
    ) -> ApiResult<PageResult<Transaction>> {
        self.get_json(
            &format!("addresses/{}/transactions", seg(address)),
            &[("limit", page.limit.to_string()), ("offset", page.offset.to_string())],
        )
        .await
    }

    async fn fetch_address_cluster(&self, address: &str) -> ApiResult<Cluster> {
        let wire: AddressClusterWire = self
            .get_json(&format!("addresses/{}/cluster", seg(address)), &[])
            .await?;
        let note = wire.message.clone();
        wire.into_cluster().ok_or_else(|| {
            let message = note.unwrap_or_else(|| format!("address {address} has no cluster"));
            ApiError::not_found(message)
        })
    }

    async fn fetch_cluster(&self, cluster_id: &str) -> ApiResult<ClusterDetail> {
        self.get_json(&format!("clusters/{}", seg(cluster_id)), &[]).await
    }

    async fn fetch_clusters(&self, query: ClusterQuery) -> ApiResult<PageResult<Cluster>> {
        let mut params = vec![
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
        ];
        if let Some(min) = query.min_size {
            params.push(("min_size", min.to_string()));
        }
        self.get_json("clusters", &params).await
    }

    async fn fetch_cluster_graph(&self, cluster_id: &str) -> ApiResult<ClusterGraph> {
        self.get_json(&format!("clusters/{}/graph", seg(cluster_id)), &[]).await
    }

    async fn search(&self, query: &str) -> ApiResult<SearchResult> {
        let wire: SearchWire = self.get_json("search", &[("q", query.to_string())]).await?;
        Ok(SearchResult::from(wire))
    }

    async fn fetch_analytics_summary(&self) -> ApiResult<AnalyticsSummary> {
        self.get_json("analytics/summary", &[]).await
    }

    async fn fetch_cluster_distribution(&self) -> ApiResult<Vec<DistributionBucket>> {
        self.get_json("analytics/cluster-distribution", &[]).await
    }
}
