use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Naive layouts the backend emits (Python `isoformat()` without offset)
const NAIVE_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a backend timestamp.
/// Accepts RFC 3339 (`2024-03-01T10:00:00Z`, `+09:00` offsets) and naive
/// ISO-8601 which is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(s, layout).ok())
        .map(|naive| naive.and_utc())
}

/// Serde helper: optional timestamp that degrades to `None` instead of
/// failing the whole payload when the backend sends something odd.
pub fn deserialize_opt_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Format a BTC amount the way list views show it, e.g. "0.5000 BTC"
pub fn format_btc(amount: f64) -> String {
    format!("{amount:.4} BTC")
}

/// Shorten a long identifier for compact display: "1A1zP1eP…DivfNa"
pub fn short_id(id: &str, keep: usize) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() <= keep * 2 + 1 {
        return id.to_string();
    }
    let head: String = chars[..keep].iter().collect();
    let tail: String = chars[chars.len() - keep..].iter().collect();
    format!("{head}…{tail}")
}

/// Cluster label with the same fallback the list views use
pub fn cluster_display_name(id: &str, label: Option<&str>) -> String {
    match label {
        Some(l) if !l.trim().is_empty() => l.to_string(),
        _ => format!("Cluster {}", id.chars().take(8).collect::<String>()),
    }
}
