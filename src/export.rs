//! Result export: the CSV table and the structured report form

use crate::error::Result;
use crate::model::ExtractedUrl;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fixed CSV column order
const CSV_HEADERS: [&str; 5] = ["URL", "Creative ID", "ECID", "Source", "Timestamp"];

/// Render results as a CSV table.
///
/// Every field is quoted; embedded quotes are escaped by doubling, so fields
/// containing the delimiter or quote character are always safe.
pub fn to_csv(urls: &[ExtractedUrl]) -> String {
    let mut lines = Vec::with_capacity(urls.len() + 1);
    lines.push(CSV_HEADERS.iter().map(|h| quote(h)).collect::<Vec<_>>().join(","));

    for entry in urls {
        let timestamp = entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
        let row = [
            entry.url.as_str(),
            entry.creative_id.as_deref().unwrap_or(""),
            entry.ecid.as_deref().unwrap_or(""),
            entry.source.as_str(),
            timestamp.as_str(),
        ];
        lines.push(row.iter().map(|f| quote(f)).collect::<Vec<_>>().join(","));
    }

    lines.join("\n")
}

/// Write the CSV table to a file
pub fn write_csv(path: impl AsRef<Path>, urls: &[ExtractedUrl]) -> Result<()> {
    std::fs::write(path, to_csv(urls))?;
    Ok(())
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Structured record of one extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsReport {
    /// When the report was produced
    pub timestamp: DateTime<Utc>,

    /// Number of distinct URLs found
    pub total_urls: usize,

    /// Network code the run resolved
    pub network_code: String,

    /// The full deduplicated result set
    pub urls: Vec<ExtractedUrl>,
}

impl ResultsReport {
    /// Build a report over a finished result set
    pub fn new(network_code: impl Into<String>, urls: Vec<ExtractedUrl>) -> Self {
        Self { timestamp: Utc::now(), total_urls: urls.len(), network_code: network_code.into(), urls }
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON form to a file
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
