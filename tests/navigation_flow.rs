use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clusterx::app::{self, App, AppEvent, PageFetch};
use clusterx::error::{ApiError, ApiResult, ErrorKind};
use clusterx::gateway::Gateway;
use clusterx::navigation::NavigationIntent;
use clusterx::types::{
    Address, AnalyticsSummary, Cluster, ClusterDetail, ClusterGraph, ClusterQuery,
    DistributionBucket, PageRequest, PageResult, SearchResult, Transaction,
};
use clusterx::router;
use clusterx::views::{self, ViewSettings, ViewState};
use tokio::sync::mpsc::unbounded_channel;
use tokio::time::timeout;

const TEST_TIMEOUT: Duration = Duration::from_secs(3);
const ADDR: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";

/// In-memory backend: one known address with 25 transactions, in cluster
/// c-1. Transaction pages at `fail_offset` fail; the summary is slow.
#[derive(Default)]
struct MockGateway {
    searches: AtomicUsize,
    address_fetches: AtomicUsize,
    fail_offset: Option<u64>,
    summary_delay_ms: u64,
}

fn page_of<T>(data: Vec<T>, limit: u64, offset: u64, total: u64) -> PageResult<T> {
    PageResult {
        data,
        page: offset / limit + 1,
        page_size: limit,
        total,
        total_pages: total.div_ceil(limit).max(1),
    }
}

#[async_trait]
impl Gateway for MockGateway {
    async fn fetch_address(&self, address: &str) -> ApiResult<Address> {
        self.address_fetches.fetch_add(1, Ordering::SeqCst);
        if address == ADDR {
            Ok(Address::reference(address))
        } else {
            Err(ApiError::not_found("Address not found").with_status(404))
        }
    }

    async fn fetch_address_transactions(
        &self,
        address: &str,
        page: PageRequest,
    ) -> ApiResult<PageResult<Transaction>> {
        if Some(page.offset) == self.fail_offset {
            return Err(ApiError::transport("connection reset"));
        }
        let total = if address == ADDR { 25 } else { 0 };
        let rows = (page.offset..total.min(page.offset + page.limit))
            .map(|i| Transaction::reference(format!("tx{i}")))
            .collect();
        Ok(page_of(rows, page.limit, page.offset, total))
    }

    async fn fetch_address_cluster(&self, _address: &str) -> ApiResult<Cluster> {
        Ok(Cluster::reference("c-1", Some("Genesis".to_owned())))
    }

    async fn fetch_cluster(&self, cluster_id: &str) -> ApiResult<ClusterDetail> {
        Err(ApiError::not_found(format!("cluster {cluster_id}")))
    }

    async fn fetch_clusters(&self, query: ClusterQuery) -> ApiResult<PageResult<Cluster>> {
        let rows = vec![Cluster::reference(format!("c-{}", query.offset), None)];
        Ok(page_of(rows, query.limit, query.offset, 60))
    }

    async fn fetch_cluster_graph(&self, _cluster_id: &str) -> ApiResult<ClusterGraph> {
        Ok(ClusterGraph::default())
    }

    async fn search(&self, query: &str) -> ApiResult<SearchResult> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        Ok(SearchResult {
            clusters: vec![Cluster::reference("c-1", Some(query.to_owned()))],
            ..SearchResult::default()
        })
    }

    async fn fetch_analytics_summary(&self) -> ApiResult<AnalyticsSummary> {
        tokio::time::sleep(Duration::from_millis(self.summary_delay_ms)).await;
        Ok(AnalyticsSummary {
            total_addresses: 1,
            total_clusters: 1,
            total_transactions: 25,
            avg_cluster_size: 1.0,
            total_balance: 50.0,
            largest_cluster: None,
        })
    }

    async fn fetch_cluster_distribution(&self) -> ApiResult<Vec<DistributionBucket>> {
        Ok(vec![DistributionBucket { range: "1".to_owned(), count: 1 }])
    }
}

fn settings() -> ViewSettings {
    ViewSettings {
        tx_page_size: 10,
        clusters_page_size: 20,
        min_cluster_size: None,
    }
}

#[tokio::test]
async fn address_search_skips_the_search_endpoint() {
    let gw = MockGateway::default();
    let mut app = App::new(settings());

    let ticket = app.submit_search(&format!("  {ADDR} ")).unwrap();
    assert_eq!(
        ticket.intent,
        NavigationIntent::ShowAddressDetail { address: ADDR.to_owned() }
    );
    assert!(app.apply(app::execute_load(&gw, ticket, settings()).await));

    assert_eq!(gw.searches.load(Ordering::SeqCst), 0);
    let Some(ViewState::Address(v)) = app.view() else { panic!("expected address view") };
    assert_eq!(v.cluster.as_ref().map(|c| c.id.as_str()), Some("c-1"));
    assert_eq!(v.transactions.rows.len(), 10);
}

#[tokio::test]
async fn free_text_goes_through_search() {
    let gw = MockGateway::default();
    let mut app = App::new(settings());

    let ticket = app.submit_search("genesis").unwrap();
    app.apply(app::execute_load(&gw, ticket, settings()).await);

    assert_eq!(gw.searches.load(Ordering::SeqCst), 1);
    assert_eq!(gw.address_fetches.load(Ordering::SeqCst), 0);
    let Some(ViewState::Search(v)) = app.view() else { panic!("expected search view") };
    assert_eq!(v.query, "genesis");
}

#[tokio::test]
async fn blank_search_makes_no_request() {
    let gw = MockGateway::default();
    let mut app = App::new(settings());

    let err = app.submit_search(" \t ").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(gw.searches.load(Ordering::SeqCst), 0);
    assert!(app.intent().is_none());
}

#[tokio::test]
async fn unknown_address_fails_the_view() {
    let gw = MockGateway::default();
    let mut app = App::new(settings());

    let ticket = app.click_address("1NotARealAddressButShapedLikeOne");
    app.apply(app::execute_load(&gw, ticket, settings()).await);

    assert!(app.view().is_none());
    assert_eq!(app.error().map(|e| e.kind), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn transaction_paging_and_failed_page() {
    let gw = MockGateway {
        fail_offset: Some(20),
        ..MockGateway::default()
    };
    let mut app = App::new(settings());

    let ticket = app.click_address(ADDR);
    app.apply(app::execute_load(&gw, ticket, settings()).await);

    let next = app.next_page().unwrap();
    assert_eq!(
        next.fetch,
        PageFetch::Transactions {
            address: ADDR.to_owned(),
            request: PageRequest { limit: 10, offset: 10 }
        }
    );
    app.apply(app::execute_page(&gw, next).await);
    let cursor = *app.view().and_then(|v| v.cursor()).unwrap();
    assert_eq!((cursor.page(), cursor.total_pages()), (2, 3));

    let last = app.next_page().unwrap();
    app.apply(app::execute_page(&gw, last).await);
    let cursor = *app.view().and_then(|v| v.cursor()).unwrap();
    assert_eq!(cursor.page(), 2);
    assert_eq!(app.page_error().map(|e| e.message.as_str()), Some("connection reset"));

    let prev = app.prev_page().unwrap();
    app.apply(app::execute_page(&gw, prev).await);
    assert_eq!(app.view().and_then(|v| v.cursor()).map(|c| c.page()), Some(1));
    assert!(app.page_error().is_none());
}

#[tokio::test]
async fn late_response_for_an_abandoned_view_is_dropped() {
    let gw: Arc<dyn Gateway> = Arc::new(MockGateway {
        summary_delay_ms: 150,
        ..MockGateway::default()
    });
    let mut app = App::new(settings());
    let (tx, mut rx) = unbounded_channel::<AppEvent>();

    let slow = app.navigate(NavigationIntent::ShowDashboard);
    app::spawn_load(gw.clone(), slow, settings(), tx.clone());
    let fast = app.navigate(NavigationIntent::ShowClustersList { page: Some(2) });
    app::spawn_load(gw.clone(), fast, settings(), tx.clone());

    let first = timeout(TEST_TIMEOUT, rx.recv()).await.unwrap().unwrap();
    let second = timeout(TEST_TIMEOUT, rx.recv()).await.unwrap().unwrap();
    assert!(app.apply(first));
    assert!(!app.apply(second));

    let Some(ViewState::Clusters(v)) = app.view() else { panic!("expected clusters view") };
    assert_eq!(v.clusters.cursor.page(), 2);
    assert_eq!(v.clusters.rows[0].id, "c-20");
}

#[tokio::test]
async fn back_reloads_previous_view() {
    let gw = MockGateway::default();
    let mut app = App::new(settings());

    let t = app.navigate(NavigationIntent::ShowAnalytics);
    app.apply(app::execute_load(&gw, t, settings()).await);
    let t = app.click_cluster("c-1");
    app.apply(app::execute_load(&gw, t, settings()).await);
    assert!(app.error().is_some());

    let t = app.back().unwrap();
    app.apply(app::execute_load(&gw, t, settings()).await);
    assert!(app.error().is_none());
    let Some(ViewState::Analytics(v)) = app.view() else { panic!("expected analytics view") };
    assert_eq!(v.distribution.len(), 1);
    assert!(v.degraded.is_empty());
}

#[tokio::test]
async fn huge_clusters_page_is_a_validation_error() {
    let gw = MockGateway::default();
    let intent = router::parse("/clusters?page=18446744073709551615").unwrap();
    assert_eq!(intent, NavigationIntent::ShowClustersList { page: Some(u64::MAX) });

    let err = views::load(&gw, &intent, &ViewSettings::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let mut app = App::new(settings());
    let ticket = app.navigate(intent);
    app.apply(app::execute_load(&gw, ticket, settings()).await);
    assert!(app.view().is_none());
    assert_eq!(app.error().map(|e| e.kind), Some(ErrorKind::Validation));
}
