//! Navigation state for one explorer session.
//!
//! `App` never performs I/O. Every action that needs data returns a ticket;
//! the caller runs it (see [`execute_load`] / [`spawn_load`]) and feeds the
//! resulting [`AppEvent`] back through [`App::apply`]. Each navigation bumps
//! a generation counter and each page request bumps a page sequence, so a
//! response that arrives after the user has moved on is dropped.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::error::{ApiError, ApiResult};
use crate::gateway::Gateway;
use crate::navigation::{
    resolve_address_click, resolve_cluster_click, resolve_search_submit, NavigationIntent,
};
use crate::types::{Cluster, ClusterQuery, PageRequest, PageResult, Transaction};
use crate::views::{self, ViewSettings, ViewState};

/// Keep the back stack bounded
const MAX_HISTORY: usize = 50;

/// A view load the caller must run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub intent: NavigationIntent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFetch {
    Transactions { address: String, request: PageRequest },
    Clusters(ClusterQuery),
}

/// A page fetch the caller must run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket {
    pub generation: u64,
    pub seq: u64,
    pub fetch: PageFetch,
}

#[derive(Debug)]
pub enum AppEvent {
    ViewLoaded {
        generation: u64,
        result: ApiResult<ViewState>,
    },
    TransactionsPage {
        generation: u64,
        seq: u64,
        result: ApiResult<PageResult<Transaction>>,
    },
    ClustersPage {
        generation: u64,
        seq: u64,
        result: ApiResult<PageResult<Cluster>>,
    },
}

pub struct App {
    settings: ViewSettings,
    generation: u64,
    page_seq: u64,
    intent: Option<NavigationIntent>,
    view: Option<ViewState>,
    error: Option<ApiError>,
    page_error: Option<ApiError>,
    loading: bool,
    page_loading: bool,
    history: Vec<NavigationIntent>,
}

impl App {
    pub fn new(settings: ViewSettings) -> Self {
        Self {
            settings,
            generation: 0,
            page_seq: 0,
            intent: None,
            view: None,
            error: None,
            page_error: None,
            loading: false,
            page_loading: false,
            history: Vec::new(),
        }
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn intent(&self) -> Option<&NavigationIntent> {
        self.intent.as_ref()
    }

    pub fn view(&self) -> Option<&ViewState> {
        self.view.as_ref()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn page_error(&self) -> Option<&ApiError> {
        self.page_error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_page_loading(&self) -> bool {
        self.page_loading
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    // ----- navigation -----

    /// Switch to a new view. Whatever was in flight becomes stale.
    pub fn navigate(&mut self, intent: NavigationIntent) -> LoadTicket {
        if let Some(prev) = self.intent.take() {
            if prev != intent {
                self.history.push(prev);
                if self.history.len() > MAX_HISTORY {
                    self.history.remove(0);
                }
            }
        }
        self.enter(intent)
    }

    pub fn submit_search(&mut self, raw: &str) -> ApiResult<LoadTicket> {
        let intent = resolve_search_submit(raw)?;
        Ok(self.navigate(intent))
    }

    pub fn click_address(&mut self, address: &str) -> LoadTicket {
        self.navigate(resolve_address_click(address))
    }

    pub fn click_cluster(&mut self, cluster_id: &str) -> LoadTicket {
        self.navigate(resolve_cluster_click(cluster_id))
    }

    /// Reload the previous view, if any
    pub fn back(&mut self) -> Option<LoadTicket> {
        let intent = self.history.pop()?;
        Some(self.enter(intent))
    }

    fn enter(&mut self, intent: NavigationIntent) -> LoadTicket {
        self.generation += 1;
        log::debug!("[app] gen {} -> {}", self.generation, intent.label());
        self.intent = Some(intent.clone());
        self.view = None;
        self.error = None;
        self.page_error = None;
        self.loading = true;
        self.page_loading = false;
        LoadTicket {
            generation: self.generation,
            intent,
        }
    }

    // ----- paging -----

    pub fn next_page(&mut self) -> Option<PageTicket> {
        let offset = self.view.as_ref()?.cursor()?.next_offset()?;
        self.page_at(offset)
    }

    pub fn prev_page(&mut self) -> Option<PageTicket> {
        let offset = self.view.as_ref()?.cursor()?.prev_offset()?;
        self.page_at(offset)
    }

    /// 1-based; `None` when the page is out of range
    pub fn jump_to_page(&mut self, page: u64) -> Option<PageTicket> {
        let offset = self.view.as_ref()?.cursor()?.offset_for_page(page)?;
        self.page_at(offset)
    }

    fn page_at(&mut self, offset: u64) -> Option<PageTicket> {
        let fetch = match self.view.as_ref()? {
            ViewState::Address(v) => PageFetch::Transactions {
                address: v.address.address.clone(),
                request: v.transactions.cursor.request_at(offset),
            },
            ViewState::Clusters(v) => {
                let request = v.clusters.cursor.request_at(offset);
                PageFetch::Clusters(ClusterQuery {
                    limit: request.limit,
                    offset: request.offset,
                    min_size: v.min_size,
                })
            }
            _ => return None,
        };
        self.page_seq += 1;
        self.page_loading = true;
        Some(PageTicket {
            generation: self.generation,
            seq: self.page_seq,
            fetch,
        })
    }

    // ----- events -----

    /// Fold a finished fetch into the state. Returns `false` when the event
    /// was stale and ignored.
    pub fn apply(&mut self, ev: AppEvent) -> bool {
        match ev {
            AppEvent::ViewLoaded { generation, result } => {
                if generation != self.generation {
                    log::debug!(
                        "[app] dropping stale view (gen {generation}, now {})",
                        self.generation
                    );
                    return false;
                }
                self.loading = false;
                match result {
                    Ok(view) => self.view = Some(view),
                    Err(e) => {
                        log::info!("[app] view load failed: {e}");
                        self.error = Some(e);
                    }
                }
                true
            }
            AppEvent::TransactionsPage { generation, seq, result } => {
                if !self.is_current_page(generation, seq) {
                    return false;
                }
                self.page_loading = false;
                match (result, self.view.as_mut()) {
                    (Ok(page), Some(ViewState::Address(v))) => {
                        v.transactions.replace(page);
                        self.page_error = None;
                    }
                    (Ok(_), _) => return false,
                    (Err(e), _) => self.page_error = Some(e),
                }
                true
            }
            AppEvent::ClustersPage { generation, seq, result } => {
                if !self.is_current_page(generation, seq) {
                    return false;
                }
                self.page_loading = false;
                match (result, self.view.as_mut()) {
                    (Ok(page), Some(ViewState::Clusters(v))) => {
                        v.clusters.replace(page);
                        self.page_error = None;
                        self.intent = Some(NavigationIntent::ShowClustersList {
                            page: Some(v.clusters.cursor.page()),
                        });
                    }
                    (Ok(_), _) => return false,
                    (Err(e), _) => self.page_error = Some(e),
                }
                true
            }
        }
    }

    fn is_current_page(&self, generation: u64, seq: u64) -> bool {
        if generation != self.generation || seq != self.page_seq {
            log::debug!(
                "[app] dropping stale page (gen {generation}/{}, seq {seq}/{})",
                self.generation,
                self.page_seq
            );
            return false;
        }
        true
    }
}

// ----- runners -----

pub async fn execute_load(
    gw: &dyn Gateway,
    ticket: LoadTicket,
    settings: ViewSettings,
) -> AppEvent {
    let result = views::load(gw, &ticket.intent, &settings).await;
    AppEvent::ViewLoaded {
        generation: ticket.generation,
        result,
    }
}

pub async fn execute_page(gw: &dyn Gateway, ticket: PageTicket) -> AppEvent {
    let PageTicket { generation, seq, fetch } = ticket;
    match fetch {
        PageFetch::Transactions { address, request } => AppEvent::TransactionsPage {
            generation,
            seq,
            result: gw.fetch_address_transactions(&address, request).await,
        },
        PageFetch::Clusters(query) => AppEvent::ClustersPage {
            generation,
            seq,
            result: gw.fetch_clusters(query).await,
        },
    }
}

/// Run a load in the background and post the outcome to `tx`
pub fn spawn_load(
    gw: Arc<dyn Gateway>,
    ticket: LoadTicket,
    settings: ViewSettings,
    tx: UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let ev = execute_load(gw.as_ref(), ticket, settings).await;
        if tx.send(ev).is_err() {
            log::debug!("[app] receiver gone, dropping view load");
        }
    })
}

pub fn spawn_page(
    gw: Arc<dyn Gateway>,
    ticket: PageTicket,
    tx: UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let ev = execute_page(gw.as_ref(), ticket).await;
        if tx.send(ev).is_err() {
            log::debug!("[app] receiver gone, dropping page");
        }
    })
}
