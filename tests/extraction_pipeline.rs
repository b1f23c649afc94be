//! Browserless end-to-end coverage of the extraction pipeline: hand-built DOM
//! trees and text feed the pure collector scans, results flow through the
//! aggregator, and the exports render the final set.

use ad_review_extractor::collect::PassiveCollector;
use ad_review_extractor::dom::{DomTree, ElementNode};
use ad_review_extractor::export::{to_csv, ResultsReport};
use ad_review_extractor::session::SessionManager;
use ad_review_extractor::{Settings, UrlSource};

fn anchor(href: &str, text: &str) -> ElementNode {
    let mut a = ElementNode::new("a");
    a.add_attribute("href", href);
    a.with_text(text)
}

/// A page with 5 anchors (3 canonical, 2 not) and one inline script block
/// exposing 2 creativeId/ecid pairs.
fn review_center_page() -> DomTree {
    let mut root = ElementNode::new("body");

    for i in 1..=3 {
        root.add_child(anchor(
            &format!(
                "https://admanager.google.com/123456#creatives/ad_review_center/product=MOBILE&creativeId={}&ecid={}",
                i,
                i + 100
            ),
            &format!("Review ad {}", i),
        ));
    }
    root.add_child(anchor("https://example.com/unrelated", "Elsewhere"));
    root.add_child(anchor("/settings", "Settings"));

    root.add_child(ElementNode::new("script").with_text(
        r#"window.__state = [{"creativeId": "789", "ecid": "101112"}, {"creativeId": "790", "ecid": "101113"}];"#,
    ));

    DomTree::new(root)
}

#[test]
fn test_end_to_end_five_urls_with_correct_sources() {
    let tree = review_center_page();
    let collector = PassiveCollector::new("123456");

    let manager = SessionManager::new(Settings::default());
    manager.start("tab-1");

    manager.add_urls("tab-1", collector.scan_anchors(&tree));
    manager.add_urls("tab-1", collector.scan_text(&tree.full_text()));
    manager.stop("tab-1");

    let results = manager.results("tab-1");
    assert_eq!(results.len(), 5);

    let anchors = results.iter().filter(|u| u.source == UrlSource::Anchor).count();
    let constructed = results.iter().filter(|u| u.source == UrlSource::Constructed).count();
    assert_eq!(anchors, 3);
    assert_eq!(constructed, 2);

    let synthesized = results.iter().find(|u| u.creative_id.as_deref() == Some("789")).expect("pair not synthesized");
    assert_eq!(
        synthesized.url,
        "https://admanager.google.com/123456#creatives/ad_review_center/product=MOBILE&creativeId=789&ecid=101112"
    );
    assert_eq!(synthesized.ecid.as_deref(), Some("101112"));
}

#[test]
fn test_rescan_does_not_grow_the_set() {
    let tree = review_center_page();
    let collector = PassiveCollector::new("123456");

    let manager = SessionManager::new(Settings::default());
    manager.start("tab-1");

    manager.add_urls("tab-1", collector.scan_anchors(&tree));
    manager.add_urls("tab-1", collector.scan_text(&tree.full_text()));
    let first_pass = manager.results("tab-1").len();

    // A second pass over the same page finds the same URLs.
    manager.add_urls("tab-1", collector.scan_anchors(&tree));
    manager.add_urls("tab-1", collector.scan_text(&tree.full_text()));

    assert_eq!(manager.results("tab-1").len(), first_pass);
}

#[test]
fn test_first_source_wins_across_scans() {
    let collector = PassiveCollector::new("123456");
    let manager = SessionManager::new(Settings::default());
    manager.start("tab-1");

    let url = "https://admanager.google.com/123456#creatives/ad_review_center/product=MOBILE&creativeId=1&ecid=2";

    let mut link = ElementNode::new("a");
    link.add_attribute("href", url);
    let tree = DomTree::new(ElementNode::new("body").with_children(vec![link]));

    manager.add_urls("tab-1", collector.scan_anchors(&tree));
    manager.add_urls("tab-1", collector.scan_text(&format!("also seen in text: {}", url)));

    let results = manager.results("tab-1");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].source, UrlSource::Anchor);
}

#[test]
fn test_report_and_csv_over_final_set() {
    let tree = review_center_page();
    let collector = PassiveCollector::new("123456");

    let manager = SessionManager::new(Settings::default());
    manager.start("tab-1");
    manager.add_urls("tab-1", collector.scan_anchors(&tree));
    manager.add_urls("tab-1", collector.scan_text(&tree.full_text()));

    let results = manager.results("tab-1");
    let report = ResultsReport::new("123456", results.clone());
    assert_eq!(report.total_urls, 5);
    assert_eq!(report.network_code, "123456");

    let csv = to_csv(&results);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 6); // header + 5 rows
    assert!(lines[1].contains("\"anchor\""));
    assert!(lines[5].contains("\"constructed\""));
}

#[test]
fn test_shadow_dom_urls_are_found() {
    let collector = PassiveCollector::new("9");

    let hidden = anchor(
        "https://admanager.google.com/9#creatives/ad_review_center/product=MOBILE&creativeId=5&ecid=6",
        "hidden in shadow",
    );
    let inner_host = ElementNode::new("x-menu").with_shadow_root(vec![hidden]);
    let outer_host = ElementNode::new("x-card").with_shadow_root(vec![inner_host]);
    let tree = DomTree::new(ElementNode::new("body").with_children(vec![outer_host]));

    let found = collector.scan_anchors(&tree);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].creative_id.as_deref(), Some("5"));
}
