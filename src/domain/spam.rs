//! Spam heuristic for free-text messages.
//!
//! A message is spam when it matches any rule in a fixed set. Rules are
//! evaluated in declaration order and the first match wins; there is no
//! scoring.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Consecutive repetitions of one character that count as spam.
const REPEAT_THRESHOLD: usize = 11;

/// A single spam rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpamRule {
    /// Known spam vocabulary (viagra, casino, lottery, ...)
    Keyword,
    /// Three or more `http://` / `https://` links on one line
    LinkFlood,
    /// The same character eleven or more times in a row
    RepeatedCharacter,
    /// BBCode `[url=` markers
    BbCode,
    /// `<script` tags
    ScriptTag,
    /// `javascript:` URIs
    JavascriptUri,
    /// Inline event-handler syntax such as `onclick=`
    EventHandler,
}

impl SpamRule {
    /// All rules, in evaluation order.
    pub const ALL: [SpamRule; 7] = [
        SpamRule::Keyword,
        SpamRule::LinkFlood,
        SpamRule::RepeatedCharacter,
        SpamRule::BbCode,
        SpamRule::ScriptTag,
        SpamRule::JavascriptUri,
        SpamRule::EventHandler,
    ];

    /// Check whether `text` trips this rule.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            SpamRule::Keyword => KEYWORDS.is_match(text),
            SpamRule::LinkFlood => LINK_FLOOD.is_match(text),
            SpamRule::RepeatedCharacter => has_repeated_run(text, REPEAT_THRESHOLD),
            SpamRule::BbCode => BBCODE.is_match(text),
            SpamRule::ScriptTag => SCRIPT_TAG.is_match(text),
            SpamRule::JavascriptUri => JAVASCRIPT_URI.is_match(text),
            SpamRule::EventHandler => EVENT_HANDLER.is_match(text),
        }
    }

    /// Short identifier used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            SpamRule::Keyword => "keyword",
            SpamRule::LinkFlood => "link_flood",
            SpamRule::RepeatedCharacter => "repeated_character",
            SpamRule::BbCode => "bbcode",
            SpamRule::ScriptTag => "script_tag",
            SpamRule::JavascriptUri => "javascript_uri",
            SpamRule::EventHandler => "event_handler",
        }
    }
}

impl fmt::Display for SpamRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Word boundaries, word characters and line terminators are ASCII/JS style:
// accented letters are not word characters, and `\r`, U+2028 and U+2029 end
// a line like `\n` does.
static KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?-u:\b)(viagra|cialis|casino|lottery|winner|congratulations)(?-u:\b)")
        .expect("keyword pattern is valid")
});

static LINK_FLOOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(https?://[^\n\r\x{2028}\x{2029}]*){3,}").expect("link pattern is valid")
});

static BBCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[url=").expect("bbcode pattern is valid"));

static SCRIPT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<script").expect("script pattern is valid"));

static JAVASCRIPT_URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)javascript:").expect("javascript pattern is valid"));

static EVENT_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)on[0-9A-Za-z_]+\s*=").expect("event handler pattern is valid")
});

/// Whether some character (line breaks excluded) appears `threshold` or more
/// times in a row.
///
/// `regex` has no backreferences, so this rule is a linear scan.
fn has_repeated_run(text: &str, threshold: usize) -> bool {
    let mut previous: Option<char> = None;
    let mut run = 0usize;

    for c in text.chars() {
        if matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}') {
            previous = None;
            run = 0;
            continue;
        }
        if previous == Some(c) {
            run += 1;
        } else {
            previous = Some(c);
            run = 1;
        }
        if run >= threshold {
            return true;
        }
    }
    false
}

/// Return the first spam rule `text` matches, if any.
pub fn detect(text: &str) -> Option<SpamRule> {
    SpamRule::ALL.into_iter().find(|rule| rule.matches(text))
}

/// Check whether `text` looks like spam.
///
/// # Example
/// ```
/// use form_gatekeeper::is_spam;
///
/// assert!(is_spam("Congratulations, you are our lottery winner!"));
/// assert!(!is_spam("Bonjour, je souhaite refaire mon site vitrine."));
/// ```
pub fn is_spam(text: &str) -> bool {
    detect(text).is_some()
}
