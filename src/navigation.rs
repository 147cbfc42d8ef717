//! Entity navigation: clicks and search submissions become
//! [`NavigationIntent`]s. Resolution has no side effects; whoever receives
//! the intent issues the fetch.

use serde::Serialize;

use crate::classify::{classify, QueryKind};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum NavigationIntent {
    ShowAddressDetail { address: String },
    ShowClusterDetail { cluster_id: String },
    ShowSearchResults { query: String },
    /// `page` is 1-based; `None` is the first page
    ShowClustersList { page: Option<u64> },
    ShowAnalytics,
    ShowDashboard,
}

impl NavigationIntent {
    pub fn label(&self) -> &'static str {
        match self {
            NavigationIntent::ShowAddressDetail { .. } => "address",
            NavigationIntent::ShowClusterDetail { .. } => "cluster",
            NavigationIntent::ShowSearchResults { .. } => "search",
            NavigationIntent::ShowClustersList { .. } => "clusters",
            NavigationIntent::ShowAnalytics => "analytics",
            NavigationIntent::ShowDashboard => "dashboard",
        }
    }
}

pub fn resolve_address_click(address: &str) -> NavigationIntent {
    NavigationIntent::ShowAddressDetail {
        address: address.to_string(),
    }
}

pub fn resolve_cluster_click(cluster_id: &str) -> NavigationIntent {
    NavigationIntent::ShowClusterDetail {
        cluster_id: cluster_id.to_string(),
    }
}

/// Search bar submission. Address-shaped input jumps straight to the
/// address view, so no `search` round trip is made for it.
pub fn resolve_search_submit(raw_query: &str) -> ApiResult<NavigationIntent> {
    let query = raw_query.trim();
    if query.is_empty() {
        return Err(ApiError::validation("search query is empty"));
    }

    Ok(match classify(query) {
        QueryKind::LiteralAddress(address) => NavigationIntent::ShowAddressDetail { address },
        QueryKind::FreeText(query) => NavigationIntent::ShowSearchResults { query },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn literal_address_short_circuits() {
        let intent = resolve_search_submit("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa").unwrap();
        assert_eq!(
            intent,
            NavigationIntent::ShowAddressDetail {
                address: "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa".to_string()
            }
        );
    }

    #[test]
    fn free_text_goes_to_search() {
        assert_eq!(
            resolve_search_submit("satoshi").unwrap(),
            NavigationIntent::ShowSearchResults {
                query: "satoshi".to_string()
            }
        );
    }

    #[test]
    fn input_is_trimmed_before_classifying() {
        assert_eq!(
            resolve_search_submit("  1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa\n").unwrap().label(),
            "address"
        );
    }

    #[test]
    fn blank_input_is_a_validation_error() {
        for raw in ["", "   ", "\t\n"] {
            let err = resolve_search_submit(raw).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation);
            assert!(err.status.is_none());
        }
    }

    #[test]
    fn clicks_map_one_to_one() {
        assert_eq!(
            resolve_cluster_click("c-1"),
            NavigationIntent::ShowClusterDetail {
                cluster_id: "c-1".to_string()
            }
        );
        assert_eq!(resolve_address_click("1abc").label(), "address");
    }
}
