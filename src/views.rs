//! View loaders: which resources each view needs, and how critical each is.

use std::collections::BTreeSet;

use futures::TryFutureExt;
use serde::Serialize;

use crate::aggregate::Aggregation;
use crate::cursor::PageCursor;
use crate::error::{ApiError, ApiResult};
use crate::gateway::Gateway;
use crate::navigation::NavigationIntent;
use crate::types::{
    Address, AnalyticsSummary, Cluster, ClusterDetail, ClusterGraph, ClusterQuery,
    DistributionBucket, PageRequest, PageResult, SearchResult, Transaction,
};

/// Page sizes and filters the loaders need
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSettings {
    pub tx_page_size: u64,
    pub clusters_page_size: u64,
    pub min_cluster_size: Option<u64>,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            tx_page_size: 10,
            clusters_page_size: 20,
            min_cluster_size: None,
        }
    }
}

impl From<&crate::config::Config> for ViewSettings {
    fn from(cfg: &crate::config::Config) -> Self {
        Self {
            tx_page_size: cfg.tx_page_size,
            clusters_page_size: cfg.clusters_page_size,
            min_cluster_size: cfg.min_cluster_size,
        }
    }
}

/// A page of rows plus the cursor that tracks it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagedList<T> {
    pub rows: Vec<T>,
    pub cursor: PageCursor,
}

impl<T> PagedList<T> {
    pub fn from_page(page: PageResult<T>) -> Self {
        let cursor = PageCursor::from_result(&page);
        Self {
            rows: page.data,
            cursor,
        }
    }

    /// Swap in a freshly fetched page
    pub fn replace(&mut self, page: PageResult<T>) {
        self.cursor.apply(&page);
        self.rows = page.data;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressView {
    pub address: Address,
    /// Absent when the address is unclustered or the lookup failed
    pub cluster: Option<Cluster>,
    pub transactions: PagedList<Transaction>,
    pub degraded: BTreeSet<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterView {
    pub detail: ClusterDetail,
    pub graph: Option<ClusterGraph>,
    pub degraded: BTreeSet<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClustersView {
    pub clusters: PagedList<Cluster>,
    pub min_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchView {
    pub query: String,
    pub result: SearchResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsView {
    pub summary: AnalyticsSummary,
    pub distribution: Vec<DistributionBucket>,
    pub degraded: BTreeSet<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub summary: AnalyticsSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewState {
    Address(AddressView),
    Cluster(ClusterView),
    Clusters(ClustersView),
    Search(SearchView),
    Analytics(AnalyticsView),
    Dashboard(DashboardView),
}

impl ViewState {
    pub fn label(&self) -> &'static str {
        match self {
            ViewState::Address(_) => "address",
            ViewState::Cluster(_) => "cluster",
            ViewState::Clusters(_) => "clusters",
            ViewState::Search(_) => "search",
            ViewState::Analytics(_) => "analytics",
            ViewState::Dashboard(_) => "dashboard",
        }
    }

    pub fn cursor(&self) -> Option<&PageCursor> {
        match self {
            ViewState::Address(v) => Some(&v.transactions.cursor),
            ViewState::Clusters(v) => Some(&v.clusters.cursor),
            _ => None,
        }
    }
}

enum AddressLeg {
    Address(Address),
    Cluster(Cluster),
    Transactions(PageResult<Transaction>),
}

/// Address, first page of transactions (both required) and the address's
/// cluster (optional: most addresses have none).
pub async fn load_address_view(
    gw: &dyn Gateway,
    address: &str,
    page_size: u64,
) -> ApiResult<AddressView> {
    let mut agg = Aggregation::new()
        .required("address", gw.fetch_address(address).map_ok(AddressLeg::Address))
        .required(
            "transactions",
            gw.fetch_address_transactions(address, PageRequest::first(page_size))
                .map_ok(AddressLeg::Transactions),
        )
        .optional("cluster", gw.fetch_address_cluster(address).map_ok(AddressLeg::Cluster))
        .run()
        .await?;

    let address = match agg.take("address") {
        Some(AddressLeg::Address(a)) => a,
        _ => return Err(missing_leg("address")),
    };
    let transactions = match agg.take("transactions") {
        Some(AddressLeg::Transactions(p)) => PagedList::from_page(p),
        _ => return Err(missing_leg("transactions")),
    };
    let cluster = match agg.take("cluster") {
        Some(AddressLeg::Cluster(c)) => Some(c),
        _ => None,
    };

    Ok(AddressView {
        address,
        cluster,
        transactions,
        degraded: agg.degraded,
    })
}

enum ClusterLeg {
    Detail(Box<ClusterDetail>),
    Graph(ClusterGraph),
}

pub async fn load_cluster_view(gw: &dyn Gateway, cluster_id: &str) -> ApiResult<ClusterView> {
    let mut agg = Aggregation::new()
        .required(
            "cluster",
            gw.fetch_cluster(cluster_id).map_ok(|d| ClusterLeg::Detail(Box::new(d))),
        )
        .optional("graph", gw.fetch_cluster_graph(cluster_id).map_ok(ClusterLeg::Graph))
        .run()
        .await?;

    let detail = match agg.take("cluster") {
        Some(ClusterLeg::Detail(d)) => *d,
        _ => return Err(missing_leg("cluster")),
    };
    let graph = match agg.take("graph") {
        Some(ClusterLeg::Graph(g)) => Some(g),
        _ => None,
    };

    Ok(ClusterView {
        detail,
        graph,
        degraded: agg.degraded,
    })
}

/// One page of the cluster list; `page` is 1-based
pub async fn load_clusters_view(
    gw: &dyn Gateway,
    page: u64,
    settings: &ViewSettings,
) -> ApiResult<ClustersView> {
    let offset = page
        .saturating_sub(1)
        .checked_mul(settings.clusters_page_size)
        .ok_or_else(|| ApiError::validation(format!("page {page} is out of range")))?;
    let result = gw
        .fetch_clusters(ClusterQuery {
            limit: settings.clusters_page_size,
            offset,
            min_size: settings.min_cluster_size,
        })
        .await?;

    Ok(ClustersView {
        clusters: PagedList::from_page(result),
        min_size: settings.min_cluster_size,
    })
}

pub async fn load_search_view(gw: &dyn Gateway, query: &str) -> ApiResult<SearchView> {
    let result = gw.search(query).await?;
    Ok(SearchView {
        query: query.to_string(),
        result,
    })
}

enum AnalyticsLeg {
    Summary(AnalyticsSummary),
    Distribution(Vec<DistributionBucket>),
}

/// Summary is required; an unavailable distribution renders as empty
pub async fn load_analytics_view(gw: &dyn Gateway) -> ApiResult<AnalyticsView> {
    let mut agg = Aggregation::new()
        .required("summary", gw.fetch_analytics_summary().map_ok(AnalyticsLeg::Summary))
        .optional(
            "distribution",
            gw.fetch_cluster_distribution().map_ok(AnalyticsLeg::Distribution),
        )
        .run()
        .await?;

    let summary = match agg.take("summary") {
        Some(AnalyticsLeg::Summary(s)) => s,
        _ => return Err(missing_leg("summary")),
    };
    let distribution = match agg.take("distribution") {
        Some(AnalyticsLeg::Distribution(d)) => d,
        _ => Vec::new(),
    };

    Ok(AnalyticsView {
        summary,
        distribution,
        degraded: agg.degraded,
    })
}

pub async fn load_dashboard_view(gw: &dyn Gateway) -> ApiResult<DashboardView> {
    let summary = gw.fetch_analytics_summary().await?;
    Ok(DashboardView { summary })
}

/// Load whatever view an intent points at
pub async fn load(
    gw: &dyn Gateway,
    intent: &NavigationIntent,
    settings: &ViewSettings,
) -> ApiResult<ViewState> {
    Ok(match intent {
        NavigationIntent::ShowAddressDetail { address } => {
            ViewState::Address(load_address_view(gw, address, settings.tx_page_size).await?)
        }
        NavigationIntent::ShowClusterDetail { cluster_id } => {
            ViewState::Cluster(load_cluster_view(gw, cluster_id).await?)
        }
        NavigationIntent::ShowSearchResults { query } => {
            ViewState::Search(load_search_view(gw, query).await?)
        }
        NavigationIntent::ShowClustersList { page } => {
            ViewState::Clusters(load_clusters_view(gw, page.unwrap_or(1), settings).await?)
        }
        NavigationIntent::ShowAnalytics => ViewState::Analytics(load_analytics_view(gw).await?),
        NavigationIntent::ShowDashboard => ViewState::Dashboard(load_dashboard_view(gw).await?),
    })
}

// A successful aggregation always holds every required leg; reaching this
// means a leg was wired to the wrong variant.
fn missing_leg(name: &str) -> ApiError {
    ApiError::transport(format!("aggregation returned no value for {name}"))
}
