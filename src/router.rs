//! Path router for clusterx views
//!
//! Maps [`NavigationIntent`]s to the paths the web front end uses and back.
//!
//! ## Supported Routes
//!
//! - `/` - Dashboard
//! - `/address/<address>` - Address detail
//! - `/cluster/<id>` - Cluster detail
//! - `/search?q=<query>` - Search results (percent-encoded query)
//! - `/clusters` or `/clusters?page=<n>` - Cluster list
//! - `/analytics` - Analytics
//!
//! ## Robust Parsing
//!
//! - `clusterx://` scheme prefix (case-insensitive, any number of slashes)
//! - Hash routing: `#/address/...`
//! - Fragment stripping and unknown query parameters are ignored

use crate::navigation::NavigationIntent;

/// Split off `?query` and drop any `#fragment`
#[inline]
fn split_query(s: &str) -> (&str, &str) {
    let s = match s.find('#') {
        Some(i) => &s[..i],
        None => s,
    };
    match s.find('?') {
        Some(i) => (&s[..i], &s[i + 1..]),
        None => (s, ""),
    }
}

/// Strip the `clusterx:` scheme and a leading `#`, returning the path
#[inline]
fn strip_scheme(raw: &str) -> &str {
    let s = raw.trim();
    let s = match s.find(':') {
        Some(pos) if s[..pos].eq_ignore_ascii_case("clusterx") => &s[pos + 1..],
        _ => s,
    };
    s.strip_prefix('#').unwrap_or(s)
}

fn query_param(query: &str, key: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        if k != key {
            return None;
        }
        let v = v.replace('+', " ");
        urlencoding::decode(&v).ok().map(|d| d.into_owned())
    })
}

fn decode_segment(seg: &str) -> Option<String> {
    let decoded = urlencoding::decode(seg).ok()?.into_owned();
    if decoded.trim().is_empty() {
        None
    } else {
        Some(decoded)
    }
}

/// Parse a route. Returns `None` for unknown or incomplete paths.
pub fn parse(raw: &str) -> Option<NavigationIntent> {
    let (path, query) = split_query(strip_scheme(raw));
    let mut segments = path.split('/').filter(|s| !s.is_empty());

    let page = segments.next().unwrap_or("").to_ascii_lowercase();
    match page.as_str() {
        "" | "home" | "dashboard" => Some(NavigationIntent::ShowDashboard),
        "address" => {
            let address = decode_segment(segments.next()?)?;
            Some(NavigationIntent::ShowAddressDetail { address })
        }
        "cluster" => {
            let cluster_id = decode_segment(segments.next()?)?;
            Some(NavigationIntent::ShowClusterDetail { cluster_id })
        }
        "search" => {
            let q = query_param(query, "q")?;
            let q = q.trim();
            if q.is_empty() {
                None
            } else {
                Some(NavigationIntent::ShowSearchResults { query: q.to_string() })
            }
        }
        "clusters" => {
            let page = match query_param(query, "page") {
                Some(p) => Some(p.parse::<u64>().ok().filter(|n| *n >= 1)?),
                None => None,
            };
            Some(NavigationIntent::ShowClustersList { page })
        }
        "analytics" => Some(NavigationIntent::ShowAnalytics),
        _ => None,
    }
}

/// Render the canonical path for an intent
pub fn to_path(intent: &NavigationIntent) -> String {
    match intent {
        NavigationIntent::ShowDashboard => "/".to_string(),
        NavigationIntent::ShowAddressDetail { address } => {
            format!("/address/{}", urlencoding::encode(address))
        }
        NavigationIntent::ShowClusterDetail { cluster_id } => {
            format!("/cluster/{}", urlencoding::encode(cluster_id))
        }
        NavigationIntent::ShowSearchResults { query } => {
            format!("/search?q={}", urlencoding::encode(query))
        }
        NavigationIntent::ShowClustersList { page: None } => "/clusters".to_string(),
        NavigationIntent::ShowClustersList { page: Some(p) } => format!("/clusters?page={p}"),
        NavigationIntent::ShowAnalytics => "/analytics".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        let intent = parse("/address/1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa").unwrap();
        assert_eq!(
            intent,
            NavigationIntent::ShowAddressDetail {
                address: "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa".to_string()
            }
        );

        let intent = parse("#/address/bc1qxyz").unwrap();
        assert_eq!(
            intent,
            NavigationIntent::ShowAddressDetail {
                address: "bc1qxyz".to_string()
            }
        );
    }

    #[test]
    fn test_parse_cluster() {
        assert_eq!(
            parse("clusterx://cluster/9f1c2d").unwrap(),
            NavigationIntent::ShowClusterDetail {
                cluster_id: "9f1c2d".to_string()
            }
        );
    }

    #[test]
    fn test_parse_search() {
        assert_eq!(
            parse("/search?q=hello%20world").unwrap(),
            NavigationIntent::ShowSearchResults {
                query: "hello world".to_string()
            }
        );
        assert_eq!(
            parse("/search?foo=1&q=a+b").unwrap(),
            NavigationIntent::ShowSearchResults {
                query: "a b".to_string()
            }
        );
    }

    #[test]
    fn test_parse_clusters_page() {
        assert_eq!(
            parse("/clusters").unwrap(),
            NavigationIntent::ShowClustersList { page: None }
        );
        assert_eq!(
            parse("/clusters?page=3#top").unwrap(),
            NavigationIntent::ShowClustersList { page: Some(3) }
        );
    }

    #[test]
    fn test_parse_home_and_analytics() {
        assert_eq!(parse("/").unwrap(), NavigationIntent::ShowDashboard);
        assert_eq!(parse("").unwrap(), NavigationIntent::ShowDashboard);
        assert_eq!(parse("CLUSTERX:///analytics").unwrap(), NavigationIntent::ShowAnalytics);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse("/address/").is_none()); // Missing address
        assert!(parse("/search").is_none()); // Missing query
        assert!(parse("/search?q=%20%20").is_none()); // Blank query
        assert!(parse("/clusters?page=0").is_none()); // Pages are 1-based
        assert!(parse("/clusters?page=abc").is_none());
        assert!(parse("/unknown/x").is_none());
    }

    #[test]
    fn test_path_round_trip() {
        let intents = [
            NavigationIntent::ShowDashboard,
            NavigationIntent::ShowAddressDetail {
                address: "3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy".to_string(),
            },
            NavigationIntent::ShowClusterDetail {
                cluster_id: "c/1".to_string(),
            },
            NavigationIntent::ShowSearchResults {
                query: "mt gox & co".to_string(),
            },
            NavigationIntent::ShowClustersList { page: Some(2) },
            NavigationIntent::ShowClustersList { page: None },
            NavigationIntent::ShowAnalytics,
        ];
        for intent in intents {
            assert_eq!(parse(&to_path(&intent)), Some(intent.clone()), "{intent:?}");
        }
    }
}
