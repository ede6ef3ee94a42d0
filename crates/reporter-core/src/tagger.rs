//! Keyword tagging for chat messages.
//!
//! Messages are checked against an ordered list of rules; the first rule
//! whose pattern matches wins, so a message carries at most one tag.

use regex::Regex;

/// Tag prefixed to messages that look like blockers.
pub const BLOCKER_TAG: &str = "[BLOCKER?]";
/// Tag prefixed to messages that look urgent.
pub const URGENT_TAG: &str = "[URGENT?]";
/// Tag prefixed to messages that look like action items.
pub const ACTION_TAG: &str = "[ACTION?]";

const BLOCKER_PATTERN: &str = r"(?i)\b(blocker|blocked|stuck)\b";
const URGENT_PATTERN: &str = r"(?i)\b(urgent|asap)\b";
const ACTION_PATTERN: &str = r"(?i)\b(action|todo|task|follow[- ]?up)\b";

/// A tag and the pattern that triggers it.
#[derive(Debug, Clone)]
pub struct TagRule {
    tag: String,
    pattern: Regex,
}

impl TagRule {
    /// Creates a rule from a regex pattern.
    pub fn new(tag: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            tag: tag.into(),
            pattern: Regex::new(pattern)?,
        })
    }

    /// Creates a rule matching any of `keywords` as whole words, ignoring case.
    pub fn from_keywords(
        tag: impl Into<String>,
        keywords: &[String],
    ) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(|k| {
                k.split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .collect();
        Self::new(tag, &format!(r"(?i)\b({})\b", alternatives.join("|")))
    }

    /// The tag text.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Ordered keyword tagger.
#[derive(Debug, Clone)]
pub struct KeywordTagger {
    rules: Vec<TagRule>,
}

impl KeywordTagger {
    /// Creates a tagger with the built-in blocker, urgent and action rules.
    pub fn new() -> Self {
        let rules = [
            (BLOCKER_TAG, BLOCKER_PATTERN),
            (URGENT_TAG, URGENT_PATTERN),
            (ACTION_TAG, ACTION_PATTERN),
        ]
        .into_iter()
        .filter_map(|(tag, pattern)| TagRule::new(tag, pattern).ok())
        .collect();
        Self { rules }
    }

    /// Creates a tagger with no rules.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Replaces the blocker keywords, keeping the other built-in rules.
    pub fn with_blocker_keywords(mut self, keywords: &[String]) -> Result<Self, regex::Error> {
        if keywords.iter().all(|k| k.trim().is_empty()) {
            return Ok(self);
        }
        let rule = TagRule::from_keywords(BLOCKER_TAG, keywords)?;
        match self.rules.iter_mut().find(|r| r.tag == BLOCKER_TAG) {
            Some(existing) => *existing = rule,
            None => self.rules.insert(0, rule),
        }
        Ok(self)
    }

    /// Appends a rule with the lowest priority.
    pub fn with_rule(mut self, rule: TagRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Returns the tag of the first matching rule.
    pub fn tag(&self, text: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(text))
            .map(TagRule::tag)
    }
}

impl Default for KeywordTagger {
    fn default() -> Self {
        Self::new()
    }
}
