//! Recognition and reconstruction of ad review center URLs
//!
//! All functions here are pure text transforms. The canonical URL shape is
//!
//! ```text
//! https://admanager.google.com/<networkCode>#creatives/ad_review_center/product=MOBILE&creativeId=<digits>&ecid=<digits>
//! ```
//!
//! Matching is deliberately permissive about the query-like suffix (anything up
//! to whitespace or a quote) as long as a `creativeId` token is present, because
//! the console emits these links with varying extra parameters.

use crate::model::IdentifierPair;
use once_cell::sync::Lazy;
use regex::Regex;

/// Host the extractor targets
pub const TARGET_HOST: &str = "admanager.google.com";

/// Product parameter fixed into every synthesized URL
pub const PRODUCT: &str = "MOBILE";

/// Network code used when the page address carries none
pub const DEFAULT_NETWORK_CODE: &str = "22849053685";

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https://admanager\.google\.com/\d+#creatives/ad_review_center/[^"'\s]+"#).expect("valid regex")
});

static CREATIVE_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"creativeId['":\s]*(\d+)"#).expect("valid regex"));

static ECID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r#"ecid['":\s]*(\d+)"#).expect("valid regex"));

static NETWORK_CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"admanager\.google\.com/(\d+)").expect("valid regex"));

static CREATIVE_ID_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"creativeId=(\d+)").expect("valid regex"));

static ECID_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"ecid=(\d+)").expect("valid regex"));

/// Scan arbitrary text for canonical review center URLs.
///
/// Returns non-overlapping matches in order of first appearance. Matches whose
/// suffix carries no `creativeId` token are discarded. Duplicates are kept; the
/// caller is responsible for deduplication.
pub fn match_direct_urls(text: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .filter(|url| url.contains("creativeId"))
        .collect()
}

/// Check whether a string is, in its entirety, one canonical review center URL.
///
/// Used by the clipboard capture path, which receives whole copied strings and
/// does not need the scan-over-text machinery.
pub fn is_canonical_url(text: &str) -> bool {
    let trimmed = text.trim();
    URL_PATTERN
        .find(trimmed)
        .map(|m| m.start() == 0 && m.end() == trimmed.len())
        .unwrap_or(false)
        && trimmed.contains("creativeId")
}

/// Scan text for creativeId/ecid label tokens and pair them positionally.
///
/// The i-th creative id is paired with the i-th ecid, up to the shorter list's
/// length. Creative ids with no companion ecid are dropped silently. Positional
/// pairing is a known limitation inherited from the console's output format:
/// the two token streams carry no structural link, so reordering or missing
/// companions will mispair. We preserve that behavior rather than guessing by
/// proximity.
pub fn extract_identifier_pairs(text: &str) -> Vec<IdentifierPair> {
    let creatives: Vec<&str> = CREATIVE_ID_PATTERN
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    let ecids: Vec<&str> = ECID_PATTERN
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();

    creatives
        .iter()
        .zip(ecids.iter())
        .map(|(creative_id, ecid)| IdentifierPair {
            creative_id: (*creative_id).to_string(),
            ecid: (*ecid).to_string(),
        })
        .collect()
}

/// Build the canonical URL for an identifier pair under a network code.
pub fn synthesize_url(network_code: &str, pair: &IdentifierPair) -> String {
    format!(
        "https://{}/{}#creatives/ad_review_center/product={}&creativeId={}&ecid={}",
        TARGET_HOST, network_code, PRODUCT, pair.creative_id, pair.ecid
    )
}

/// Parse the network code out of the current page address.
///
/// Falls back to [`DEFAULT_NETWORK_CODE`] when the address carries no numeric
/// segment after the host. Never fails.
pub fn resolve_network_code(location_url: &str) -> String {
    NETWORK_CODE_PATTERN
        .captures(location_url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_NETWORK_CODE.to_string())
}

/// Extract the creativeId parameter from a canonical URL
pub fn creative_id_of(url: &str) -> Option<String> {
    CREATIVE_ID_PARAM.captures(url).and_then(|c| c.get(1)).map(|m| m.as_str().to_string())
}

/// Extract the ecid parameter from a canonical URL
pub fn ecid_of(url: &str) -> Option<String> {
    ECID_PARAM.captures(url).and_then(|c| c.get(1)).map(|m| m.as_str().to_string())
}
