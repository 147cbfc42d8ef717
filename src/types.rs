use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::util_text::deserialize_opt_timestamp;

/// Address snapshot as served by `GET /addresses/{address}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub address: String,
    #[serde(default)]
    pub cluster_id: Option<String>,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub total_received: f64,
    #[serde(default)]
    pub total_sent: f64,
    #[serde(default)]
    pub tx_count: u64,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub first_seen: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub last_seen: Option<DateTime<Utc>>,
}

impl Address {
    /// Minimal entity for search hits that only carry the identifier
    pub fn reference(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            cluster_id: None,
            balance: 0.0,
            total_received: 0.0,
            total_sent: 0.0,
            tx_count: 0,
            first_seen: None,
            last_seen: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub address_count: u64,
    #[serde(default)]
    pub total_balance: f64,
    #[serde(default)]
    pub tx_count: u64,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub first_seen: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub last_seen: Option<DateTime<Utc>>,
}

impl Cluster {
    pub fn reference(id: impl Into<String>, label: Option<String>) -> Self {
        Self {
            id: id.into(),
            label,
            address_count: 0,
            total_balance: 0.0,
            tx_count: 0,
            first_seen: None,
            last_seen: None,
        }
    }

    pub fn display_name(&self) -> String {
        crate::util_text::cluster_display_name(&self.id, self.label.as_deref())
    }
}

/// Member row embedded in a cluster detail response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMember {
    pub address: String,
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub tx_count: u64,
}

/// `GET /clusters/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterDetail {
    #[serde(flatten)]
    pub cluster: Cluster,
    #[serde(default)]
    pub total_received: f64,
    #[serde(default)]
    pub total_sent: f64,
    #[serde(default)]
    pub addresses: Vec<ClusterMember>,
}

/// `GET /addresses/{address}/cluster`; `cluster_id` is null when the
/// address was never clustered.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AddressClusterWire {
    #[serde(default)]
    pub cluster_id: Option<String>,
    #[serde(default)]
    pub cluster_label: Option<String>,
    #[serde(default)]
    pub cluster_address_count: Option<u64>,
    #[serde(default)]
    pub cluster_balance: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AddressClusterWire {
    pub(crate) fn into_cluster(self) -> Option<Cluster> {
        let id = self.cluster_id?;
        Some(Cluster {
            id,
            label: self.cluster_label,
            address_count: self.cluster_address_count.unwrap_or(0),
            total_balance: self.cluster_balance.unwrap_or(0.0),
            tx_count: 0,
            first_seen: None,
            last_seen: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub txid: String,
    /// None while unconfirmed
    #[serde(default)]
    pub block_height: Option<u64>,
    #[serde(default)]
    pub block_hash: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fee: Option<f64>,
    #[serde(default)]
    pub input_count: Option<u32>,
    #[serde(default)]
    pub output_count: Option<u32>,
    #[serde(default)]
    pub total_input: Option<f64>,
    #[serde(default)]
    pub total_output: Option<f64>,
}

impl Transaction {
    pub fn reference(txid: impl Into<String>) -> Self {
        Self {
            txid: txid.into(),
            block_height: None,
            block_hash: None,
            timestamp: None,
            fee: None,
            input_count: None,
            output_count: None,
            total_input: None,
            total_output: None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.block_height.is_some()
    }
}

/// Paginated list envelope. The four numeric fields are mandatory: the
/// cursor is driven by them, so a response missing one does not decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// `limit`/`offset` pair sent to paginated endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

impl PageRequest {
    pub fn first(limit: u64) -> Self {
        Self { limit, offset: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClusterQuery {
    pub limit: u64,
    pub offset: u64,
    pub min_size: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty() && self.clusters.is_empty() && self.transactions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.addresses.len() + self.clusters.len() + self.transactions.len()
    }
}

/// One row of the flat `/search` response: `{type, id, label, preview}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchHit {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// The backend has served both shapes over time
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum SearchWire {
    Grouped(SearchResult),
    Hits(Vec<SearchHit>),
}

impl From<SearchWire> for SearchResult {
    fn from(wire: SearchWire) -> Self {
        match wire {
            SearchWire::Grouped(r) => r,
            SearchWire::Hits(hits) => {
                let mut out = SearchResult::default();
                for hit in hits {
                    match hit.kind.as_str() {
                        "address" => out.addresses.push(Address::reference(hit.id)),
                        "cluster" => out.clusters.push(Cluster::reference(hit.id, hit.label)),
                        "transaction" | "tx" => {
                            out.transactions.push(Transaction::reference(hit.id))
                        }
                        other => log::debug!("[search] skipping hit of unknown type {other}"),
                    }
                }
                out
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LargestCluster {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub address_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    #[serde(default)]
    pub total_addresses: u64,
    #[serde(default)]
    pub total_clusters: u64,
    #[serde(default)]
    pub total_transactions: u64,
    #[serde(default)]
    pub avg_cluster_size: f64,
    #[serde(default)]
    pub total_balance: f64,
    #[serde(default)]
    pub largest_cluster: Option<LargestCluster>,
}

/// Cluster-size histogram bucket, e.g. `{"range": "2-5", "count": 14}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionBucket {
    pub range: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default)]
    pub cluster_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// `GET /clusters/{id}/graph`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterGraph {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}
