//! Exported metric names.

use once_cell::sync::Lazy;
use regex::Regex;

static ACRONYM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("acronym pattern"));
static CAMEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("camel pattern"));
static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("separator pattern"));

/// `readRequestCount` -> `read_request_count`, `HAState` -> `ha_state`,
/// `batch-size-avg` -> `batch_size_avg`.
pub fn snake_case(raw: &str) -> String {
    let split = ACRONYM.replace_all(raw, "${1}_${2}");
    let split = CAMEL.replace_all(&split, "${1}_${2}");
    let joined = NON_ALNUM.replace_all(&split, "_");
    joined.trim_matches('_').to_lowercase()
}

/// Joins the non-empty parts with `_`.
pub fn exported_name(prefix: &str, segment: &str, name: &str) -> String {
    [prefix, segment, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}
