use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where an extracted URL was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UrlSource {
    /// Href of an anchor element
    Anchor,
    /// Visible page text
    Text,
    /// Mined from a client-framework global state object
    GlobalState,
    /// localStorage / sessionStorage value
    Storage,
    /// Intercepted network response body
    Network,
    /// Intercepted clipboard write
    Clipboard,
    /// Synthesized from a creativeId/ecid pair
    Constructed,
}

impl UrlSource {
    /// Stable string form used in exports
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlSource::Anchor => "anchor",
            UrlSource::Text => "text",
            UrlSource::GlobalState => "global-state",
            UrlSource::Storage => "storage",
            UrlSource::Network => "network",
            UrlSource::Clipboard => "clipboard",
            UrlSource::Constructed => "constructed",
        }
    }
}

/// One discovered review center URL with provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedUrl {
    /// Canonical review center URL
    pub url: String,

    /// Source the URL was first seen in
    pub source: UrlSource,

    /// creativeId parameter, when the URL carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creative_id: Option<String>,

    /// ecid parameter, when the URL carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecid: Option<String>,

    /// When the URL was discovered
    pub timestamp: DateTime<Utc>,
}

impl ExtractedUrl {
    /// Record a discovered URL, pulling the identifier parameters out of it
    pub fn new(url: impl Into<String>, source: UrlSource) -> Self {
        let url = url.into();
        let creative_id = crate::pattern::creative_id_of(&url);
        let ecid = crate::pattern::ecid_of(&url);
        Self { url, source, creative_id, ecid, timestamp: Utc::now() }
    }
}

/// A creativeId/ecid pair found side by side in page state
///
/// Transient: only used to synthesize a URL when no direct link exists.
/// Pairing is positional (see [`crate::pattern::extract_identifier_pairs`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierPair {
    pub creative_id: String,
    pub ecid: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracted_url_parses_ids() {
        let entry = ExtractedUrl::new(
            "https://admanager.google.com/123#creatives/ad_review_center/product=MOBILE&creativeId=7&ecid=8",
            UrlSource::Anchor,
        );

        assert_eq!(entry.creative_id.as_deref(), Some("7"));
        assert_eq!(entry.ecid.as_deref(), Some("8"));
        assert_eq!(entry.source, UrlSource::Anchor);
    }

    #[test]
    fn test_source_serialization() {
        let json = serde_json::to_string(&UrlSource::GlobalState).unwrap();
        assert_eq!(json, "\"global-state\"");

        let back: UrlSource = serde_json::from_str("\"clipboard\"").unwrap();
        assert_eq!(back, UrlSource::Clipboard);
    }

    #[test]
    fn test_source_as_str_matches_serde() {
        for source in [
            UrlSource::Anchor,
            UrlSource::Text,
            UrlSource::GlobalState,
            UrlSource::Storage,
            UrlSource::Network,
            UrlSource::Clipboard,
            UrlSource::Constructed,
        ] {
            let json = serde_json::to_string(&source).unwrap();
            assert_eq!(json, format!("\"{}\"", source.as_str()));
        }
    }

    #[test]
    fn test_extracted_url_roundtrip() {
        let entry = ExtractedUrl::new(
            "https://admanager.google.com/9#creatives/ad_review_center/product=MOBILE&creativeId=1&ecid=2",
            UrlSource::Network,
        );

        let json = serde_json::to_string(&entry).unwrap();
        let back: ExtractedUrl = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
