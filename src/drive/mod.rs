//! Active interaction: coaxing the page into emitting URLs it never renders
//!
//! The console only reveals a creative's share link through its card menu
//! ("copy URL to share ad"), which writes to the clipboard. The driver opens
//! that menu card by card and clicks the entry; the clipboard interceptor
//! installed by [`crate::collect::PageInterceptor`] captures whatever gets
//! copied. Card failures are logged and skipped, never retried.

use crate::browser::BrowserSession;
use crate::error::{ExtractorError, Result};
use std::time::Duration;

/// States a single card moves through during one interaction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardState {
    Idle,
    MenuOpening,
    MenuOpen,
    ActionClicked,
    MenuClosing,
    Done,
    Error,
}

/// Final state of one processed card
#[derive(Debug, Clone)]
pub struct CardOutcome {
    /// Position of the card in the located card list
    pub index: usize,

    /// Terminal state: Done or Error
    pub state: CardState,
}

/// Locator lists and timing for the interaction pass.
///
/// The selector lists are ordered candidates, tried in sequence with the first
/// non-empty match winning. Console markup churns; keeping these configurable
/// is the difference between a settings change and a release.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Candidate selectors for the repeating creative cards
    pub card_selectors: Vec<String>,

    /// Candidate selectors for a card's "more actions" trigger
    pub trigger_selectors: Vec<String>,

    /// Phrase identifying the copy-link menu entry (matched case-insensitively
    /// against trimmed text content)
    pub copy_phrase: String,

    /// Settle delay after UI-changing actions. The menu is framework-rendered
    /// and exposes no structural ready signal; a fixed delay is a known
    /// fragility inherited from the page.
    pub settle_delay: Duration,

    /// Depth cap for the menu text search
    pub search_depth: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            card_selectors: vec![
                ".creative-card".to_string(),
                ".ad-card".to_string(),
                "[data-creative-id]".to_string(),
                ".creative-item".to_string(),
                ".review-card".to_string(),
            ],
            trigger_selectors: vec![
                ".more-actions".to_string(),
                ".dropdown-trigger".to_string(),
                ".menu-trigger".to_string(),
                "material-icon[title*=\"More\"]".to_string(),
                "[aria-label*=\"More\"]".to_string(),
            ],
            copy_phrase: "copy url to share ad".to_string(),
            settle_delay: Duration::from_millis(300),
            search_depth: 24,
        }
    }
}

impl DriverConfig {
    /// Default locators with the settle delay taken from settings
    pub fn with_settle_delay(delay: Duration) -> Self {
        Self { settle_delay: delay, ..Self::default() }
    }
}

/// Drives the per-card menu interaction
pub struct InteractionDriver {
    config: DriverConfig,
}

impl InteractionDriver {
    /// Create a driver with the given configuration
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    /// The driver's configuration
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Process every card currently on the page.
    ///
    /// Finding no cards is a soft miss, not an error. A card that fails mid
    /// sequence ends in [`CardState::Error`] and the loop continues with the
    /// next card.
    pub fn run(&self, session: &BrowserSession) -> Result<Vec<CardOutcome>> {
        self.run_with(session, |_, _| {})
    }

    /// [`InteractionDriver::run`] with a per-card progress callback
    /// `(processed, total)`
    pub fn run_with<F>(&self, session: &BrowserSession, mut progress: F) -> Result<Vec<CardOutcome>>
    where
        F: FnMut(usize, usize),
    {
        let located = self.locate_cards(session)?;

        let Some((card_selector, count)) = located else {
            log::info!("no creative cards located, skipping interaction pass");
            return Ok(Vec::new());
        };

        log::info!("processing {} cards matched by '{}'", count, card_selector);

        let mut outcomes = Vec::with_capacity(count);
        for index in 0..count {
            let state = self.process_card(session, &card_selector, index);
            if state == CardState::Error {
                log::warn!("card {} skipped after failed interaction", index);
            }
            outcomes.push(CardOutcome { index, state });
            progress(index + 1, count);
        }

        Ok(outcomes)
    }

    /// Try the card selector candidates in order; first non-empty match wins
    fn locate_cards(&self, session: &BrowserSession) -> Result<Option<(String, usize)>> {
        let selectors = serde_json::to_string(&self.config.card_selectors)?;
        let js = format!(
            r#"(function() {{
                var SELECTORS = {selectors};
                for (var i = 0; i < SELECTORS.length; i++) {{
                    try {{
                        var found = document.querySelectorAll(SELECTORS[i]);
                        if (found.length > 0) {{
                            return JSON.stringify({{ selector: SELECTORS[i], count: found.length }});
                        }}
                    }} catch (e) {{}}
                }}
                return JSON.stringify({{ selector: null, count: 0 }});
            }})()"#
        );

        let value = session.evaluate_parsed(&js)?;
        let count = value["count"].as_u64().unwrap_or(0) as usize;
        match value["selector"].as_str() {
            Some(selector) if count > 0 => Ok(Some((selector.to_string(), count))),
            _ => Ok(None),
        }
    }

    /// Drive one card through the interaction state machine
    fn process_card(&self, session: &BrowserSession, card_selector: &str, index: usize) -> CardState {
        let mut state = CardState::Idle;

        loop {
            log::debug!("card {}: {:?}", index, state);
            state = match state {
                CardState::Idle => match self.open_card_menu(session, card_selector, index) {
                    Ok(true) => CardState::MenuOpening,
                    Ok(false) => CardState::Error,
                    Err(e) => {
                        log::warn!("card {}: menu trigger failed: {}", index, e);
                        CardState::Error
                    }
                },
                CardState::MenuOpening => {
                    std::thread::sleep(self.config.settle_delay);
                    CardState::MenuOpen
                }
                CardState::MenuOpen => match self.click_copy_entry(session) {
                    Ok(true) => CardState::ActionClicked,
                    Ok(false) => CardState::Error,
                    Err(e) => {
                        log::warn!("card {}: copy entry click failed: {}", index, e);
                        CardState::Error
                    }
                },
                CardState::ActionClicked => {
                    // Best effort, not verified.
                    if let Err(e) = self.dismiss_menu(session) {
                        log::debug!("card {}: menu dismissal failed: {}", index, e);
                    }
                    CardState::MenuClosing
                }
                CardState::MenuClosing => {
                    std::thread::sleep(self.config.settle_delay);
                    CardState::Done
                }
                CardState::Done => return CardState::Done,
                CardState::Error => {
                    // Leave no menu hanging over the next card.
                    let _ = self.dismiss_menu(session);
                    return CardState::Error;
                }
            };
        }
    }

    /// Scroll the card into view and click its first visible menu trigger
    fn open_card_menu(&self, session: &BrowserSession, card_selector: &str, index: usize) -> Result<bool> {
        let selector = serde_json::to_string(card_selector)?;
        let triggers = serde_json::to_string(&self.config.trigger_selectors)?;
        let js = format!(
            r#"(function() {{
                var cards = document.querySelectorAll({selector});
                var card = cards[{index}];
                if (!card) return 'no-card';
                card.scrollIntoView({{ block: 'center' }});
                var TRIGGERS = {triggers};
                for (var i = 0; i < TRIGGERS.length; i++) {{
                    try {{
                        var trigger = card.querySelector(TRIGGERS[i]);
                        if (trigger && trigger.offsetParent !== null) {{
                            trigger.click();
                            return 'clicked';
                        }}
                    }} catch (e) {{}}
                }}
                return 'no-trigger';
            }})()"#
        );

        let outcome = session.evaluate_json(&js)?;
        Ok(outcome.as_str() == Some("clicked"))
    }

    /// Find the copy-link entry by text and click its nearest clickable ancestor
    fn click_copy_entry(&self, session: &BrowserSession) -> Result<bool> {
        targeted_click(session, &self.config.copy_phrase, self.config.search_depth)
    }

    /// Close the open menu: backdrop click, else blur plus Escape
    fn dismiss_menu(&self, session: &BrowserSession) -> Result<()> {
        let js = r#"(function() {
            var backdrop = document.querySelector('.cdk-overlay-backdrop, .backdrop');
            if (backdrop) {
                backdrop.click();
                return 'backdrop';
            }
            if (document.activeElement && document.activeElement.blur) {
                document.activeElement.blur();
            }
            document.dispatchEvent(new KeyboardEvent('keydown', { key: 'Escape' }));
            return 'escape';
        })()"#;

        session.evaluate_json(js).map(|_| ())
    }

    /// Scroll until the document stops growing.
    ///
    /// The page lazy-loads cards on scroll. Each round scrolls to the current
    /// bottom and waits the settle delay; the loop ends when two consecutive
    /// height readings are equal. Returns the number of scroll rounds.
    pub fn scroll_to_page_bottom(&self, session: &BrowserSession) -> Result<usize> {
        let js = r#"(function() {
            window.scrollTo(0, document.body.scrollHeight);
            return document.body.scrollHeight;
        })()"#;

        let mut rounds = 0;
        let mut last_height = -1_i64;

        loop {
            let height = session
                .evaluate_json(js)?
                .as_i64()
                .ok_or_else(|| ExtractorError::EvaluationFailed("document height not a number".to_string()))?;

            rounds += 1;
            if height == last_height {
                break;
            }
            last_height = height;
            std::thread::sleep(self.config.settle_delay);
        }

        log::debug!("lazy-load scroll settled after {} rounds", rounds);
        Ok(rounds)
    }
}

impl Default for InteractionDriver {
    fn default() -> Self {
        Self::new(DriverConfig::default())
    }
}

/// Click the element whose trimmed text contains `phrase`.
///
/// The search descends through open shadow roots (depth-bounded), prefers the
/// deepest matching element, then walks up to the nearest clickable ancestor
/// before clicking. Returns false when nothing matched.
pub fn targeted_click(session: &BrowserSession, phrase: &str, max_depth: usize) -> Result<bool> {
    let phrase_json = serde_json::to_string(&phrase.to_lowercase())?;
    let js = format!(
        r#"(function() {{
            var PHRASE = {phrase_json};
            var MAX_DEPTH = {max_depth};
            var CLICKABLE_TAGS = ['a', 'button', 'material-select-item', 'material-button'];
            var CLICKABLE_ROLES = ['button', 'link', 'menuitem', 'tab'];

            function isClickable(el) {{
                if (!el || !el.tagName) return false;
                if (CLICKABLE_TAGS.indexOf(el.tagName.toLowerCase()) !== -1) return true;
                var role = el.getAttribute && el.getAttribute('role');
                if (role && CLICKABLE_ROLES.indexOf(role) !== -1) return true;
                return Boolean(el.onclick);
            }}

            function findByText(root, depth) {{
                if (!root || depth > MAX_DEPTH) return null;
                var children = root.children || [];
                for (var i = 0; i < children.length; i++) {{
                    var el = children[i];
                    var text = (el.textContent || '').trim().toLowerCase();
                    if (text.indexOf(PHRASE) !== -1) {{
                        var deeper = findByText(el, depth + 1);
                        if (deeper) return deeper;
                        if (el.shadowRoot) {{
                            var inShadow = findByText(el.shadowRoot, depth + 1);
                            if (inShadow) return inShadow;
                        }}
                        return el;
                    }}
                    if (el.shadowRoot) {{
                        var found = findByText(el.shadowRoot, depth + 1);
                        if (found) return found;
                    }}
                }}
                return null;
            }}

            var target = findByText(document.body, 0);
            if (!target) return 'not-found';

            var clickable = target;
            while (clickable && !isClickable(clickable)) {{
                clickable = clickable.parentElement ||
                    (clickable.getRootNode && clickable.getRootNode().host) || null;
            }}
            (clickable || target).click();
            return 'clicked';
        }})()"#
    );

    let outcome = session.evaluate_json(&js)?;
    Ok(outcome.as_str() == Some("clicked"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_candidates() {
        let config = DriverConfig::default();

        assert_eq!(config.card_selectors[0], ".creative-card");
        assert!(config.trigger_selectors.iter().any(|s| s.contains("aria-label")));
        assert_eq!(config.copy_phrase, "copy url to share ad");
    }

    #[test]
    fn test_with_settle_delay() {
        let config = DriverConfig::with_settle_delay(Duration::from_millis(50));
        assert_eq!(config.settle_delay, Duration::from_millis(50));
        assert_eq!(config.card_selectors, DriverConfig::default().card_selectors);
    }

    // Integration tests (require Chrome to be installed)
    #[test]
    #[ignore]
    fn test_scroll_terminates_on_static_page() {
        use crate::browser::LaunchOptions;

        let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");
        session.navigate("data:text/html,<html><body><p>static</p></body></html>").expect("Failed to navigate");
        std::thread::sleep(Duration::from_millis(300));

        let driver = InteractionDriver::new(DriverConfig::with_settle_delay(Duration::from_millis(50)));
        let rounds = driver.scroll_to_page_bottom(&session).expect("scroll failed");

        // Height never changes, so the loop ends on the second reading.
        assert_eq!(rounds, 2);
    }

    #[test]
    #[ignore]
    fn test_targeted_click_clicks_shadow_content() {
        use crate::browser::LaunchOptions;

        let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");
        let html = concat!(
            "<html><body>",
            "<div id='host'></div>",
            "<script>",
            "var root = document.getElementById('host').attachShadow({mode: 'open'});",
            "root.innerHTML = \"<button onclick='window.__clicked = true'>Copy URL to share ad</button>\";",
            "</script>",
            "</body></html>"
        );
        session.navigate(&format!("data:text/html,{}", html)).expect("Failed to navigate");
        std::thread::sleep(Duration::from_millis(300));

        let clicked = targeted_click(&session, "copy url to share ad", 24).expect("click failed");
        assert!(clicked);

        let flag = session.evaluate_json("Boolean(window.__clicked)").expect("flag read failed");
        assert_eq!(flag.as_bool(), Some(true));
    }
}
