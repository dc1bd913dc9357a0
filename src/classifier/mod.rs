//! Heuristic role classification for message fragments.
//!
//! Decides whether a fragment of a user-authored message reads as a system
//! instruction or as a conversational user turn. Rules are checked in a fixed
//! order and the first match wins:
//!
//! 1. [`HeuristicRule::PhraseAnchor`]: starts with "you are", "you should",
//!    "always" or "never", or contains "make sure"
//! 2. [`HeuristicRule::MetaTag`]: starts with `[SYSTEM]:`, `##SYSTEM##` or `(system)`
//! 3. [`HeuristicRule::ImperativeVerb`]: first token is in [`IMPERATIVE_VERBS`]
//! 4. [`HeuristicRule::Structural`]: contains a line break or a semicolon
//! 5. [`HeuristicRule::Positional`]: no user turn seen yet, not a question and
//!    not a greeting
//!
//! Anything else is a user turn. Empty or whitespace-only text skips rules 1-4.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::context::MessageRole;

/// First tokens that mark an imperative instruction.
pub const IMPERATIVE_VERBS: [&str; 14] = [
    "ensure", "sanitize", "never", "always", "make", "avoid", "validate", "check", "reject",
    "allow", "deny", "use", "require", "respond",
];

/// First tokens that mark a greeting.
pub const GREETINGS: [&str; 3] = ["hi", "hello", "hey"];

static PHRASE_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^you are\b|^you should\b|^always\b|^never\b|\bmake sure\b")
        .expect("phrase anchor pattern is valid")
});

static META_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:\[SYSTEM\]:|##SYSTEM##|\(system\))").expect("meta tag pattern is valid")
});

/// Role a message fragment is classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeakerRole {
    /// Instruction-like fragment.
    System,
    /// Conversational fragment.
    User,
}

impl fmt::Display for SpeakerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeakerRole::System => write!(f, "system"),
            SpeakerRole::User => write!(f, "user"),
        }
    }
}

impl From<SpeakerRole> for MessageRole {
    fn from(role: SpeakerRole) -> Self {
        match role {
            SpeakerRole::System => MessageRole::System,
            SpeakerRole::User => MessageRole::User,
        }
    }
}

/// Heuristic that produced a system classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicRule {
    /// Leading "you are"/"you should"/"always"/"never", or "make sure" anywhere.
    PhraseAnchor,
    /// Leading `[SYSTEM]:`, `##SYSTEM##` or `(system)`.
    MetaTag,
    /// First token is an imperative verb.
    ImperativeVerb,
    /// Line break or semicolon present.
    Structural,
    /// Still before the first user turn, and neither a question nor a greeting.
    Positional,
}

impl fmt::Display for HeuristicRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeuristicRule::PhraseAnchor => write!(f, "phrase_anchor"),
            HeuristicRule::MetaTag => write!(f, "meta_tag"),
            HeuristicRule::ImperativeVerb => write!(f, "imperative_verb"),
            HeuristicRule::Structural => write!(f, "structural"),
            HeuristicRule::Positional => write!(f, "positional"),
        }
    }
}

/// Outcome of classifying one fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Assigned role.
    pub role: SpeakerRole,
    /// Rule that fired; `None` for user turns.
    pub rule: Option<HeuristicRule>,
}

impl Classification {
    fn system(rule: HeuristicRule) -> Self {
        Self {
            role: SpeakerRole::System,
            rule: Some(rule),
        }
    }

    fn user() -> Self {
        Self {
            role: SpeakerRole::User,
            rule: None,
        }
    }
}

/// Classify `text` as a system instruction or a user turn.
pub fn classify(text: &str, is_before_first_user: bool) -> SpeakerRole {
    classify_detailed(text, is_before_first_user).role
}

/// Classify `text` and report which rule decided it.
pub fn classify_detailed(text: &str, is_before_first_user: bool) -> Classification {
    let stripped = text.trim();
    let first_token = stripped
        .split_whitespace()
        .next()
        .map(str::to_lowercase);

    if !stripped.is_empty() {
        if PHRASE_ANCHOR.is_match(stripped) {
            return Classification::system(HeuristicRule::PhraseAnchor);
        }
        if META_TAG.is_match(stripped) {
            return Classification::system(HeuristicRule::MetaTag);
        }
        if first_token
            .as_deref()
            .is_some_and(|token| IMPERATIVE_VERBS.iter().any(|verb| *verb == token))
        {
            return Classification::system(HeuristicRule::ImperativeVerb);
        }
        if text.contains(|c: char| matches!(c, '\n' | '\r' | ';')) {
            return Classification::system(HeuristicRule::Structural);
        }
    }

    if is_before_first_user && !stripped.ends_with('?') && !is_greeting(first_token.as_deref()) {
        return Classification::system(HeuristicRule::Positional);
    }

    Classification::user()
}

fn is_greeting(first_token: Option<&str>) -> bool {
    first_token
        .map(|token| token.trim_end_matches(|c: char| !c.is_alphanumeric()))
        .is_some_and(|word| GREETINGS.iter().any(|greeting| *greeting == word))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_of(text: &str, before: bool) -> Option<HeuristicRule> {
        classify_detailed(text, before).rule
    }

    #[test]
    fn test_phrase_anchor() {
        assert_eq!(classify("You are a helpful assistant.", false), SpeakerRole::System);
        assert_eq!(
            rule_of("You are a helpful assistant.", false),
            Some(HeuristicRule::PhraseAnchor)
        );
        assert_eq!(rule_of("you should be brief", false), Some(HeuristicRule::PhraseAnchor));
        assert_eq!(rule_of("Please make sure it builds", false), Some(HeuristicRule::PhraseAnchor));
        assert_eq!(rule_of("  ALWAYS cite sources", false), Some(HeuristicRule::PhraseAnchor));
    }

    #[test]
    fn test_phrase_anchor_requires_word_boundary() {
        // Neither text is an anchor or an imperative verb.
        assert_eq!(rule_of("youare here?", false), None);
        assert_eq!(rule_of("Can you are-enter?", false), None);
    }

    #[test]
    fn test_meta_tags() {
        assert_eq!(rule_of("[SYSTEM]: be terse", false), Some(HeuristicRule::MetaTag));
        assert_eq!(rule_of("  [system]: be terse", false), Some(HeuristicRule::MetaTag));
        assert_eq!(rule_of("##SYSTEM## be terse", false), Some(HeuristicRule::MetaTag));
        assert_eq!(rule_of("(System) be terse", false), Some(HeuristicRule::MetaTag));
    }

    #[test]
    fn test_imperative_first_token() {
        assert_eq!(classify("Validate the input.", false), SpeakerRole::System);
        assert_eq!(rule_of("Validate the input.", false), Some(HeuristicRule::ImperativeVerb));
        assert_eq!(rule_of("USE metric units", false), Some(HeuristicRule::ImperativeVerb));
        assert_eq!(rule_of("Respond in French", false), Some(HeuristicRule::ImperativeVerb));
    }

    #[test]
    fn test_structural_overrides_question_mark() {
        assert_eq!(
            classify("What's the weather; is it raining?", false),
            SpeakerRole::System
        );
        assert_eq!(
            rule_of("What's the weather; is it raining?", true),
            Some(HeuristicRule::Structural)
        );
        assert_eq!(rule_of("first line\nsecond line", false), Some(HeuristicRule::Structural));
    }

    #[test]
    fn test_positional() {
        assert_eq!(rule_of("Tell me a story.", true), Some(HeuristicRule::Positional));
        assert_eq!(classify("Tell me a story.", false), SpeakerRole::User);
        assert_eq!(classify("What is Rust?", true), SpeakerRole::User);
        assert_eq!(classify("Hi, how are you?", true), SpeakerRole::User);
        assert_eq!(classify("Hello there.", true), SpeakerRole::User);
        assert_eq!(classify("hey", true), SpeakerRole::User);
    }

    #[test]
    fn test_greeting_is_a_whole_token() {
        // "History" starts with "hi" but is not a greeting.
        assert_eq!(rule_of("History of Rome.", true), Some(HeuristicRule::Positional));
    }

    #[test]
    fn test_empty_text_falls_through() {
        assert_eq!(rule_of("", true), Some(HeuristicRule::Positional));
        assert_eq!(rule_of("", false), None);
        assert_eq!(rule_of(" \n\t ", false), None);
        assert_eq!(rule_of(" \n ", true), Some(HeuristicRule::Positional));
    }

    #[test]
    fn test_first_match_wins() {
        // Anchor and imperative verb both apply; the anchor is reported.
        assert_eq!(rule_of("Never lie; ever.", false), Some(HeuristicRule::PhraseAnchor));
        // Meta tag beats the semicolon.
        assert_eq!(rule_of("(system) a; b", false), Some(HeuristicRule::MetaTag));
    }

    #[test]
    fn test_speaker_role_into_message_role() {
        assert_eq!(MessageRole::from(SpeakerRole::System), MessageRole::System);
        assert_eq!(MessageRole::from(SpeakerRole::User), MessageRole::User);
        assert_eq!(SpeakerRole::User.to_string(), "user");
        assert_eq!(HeuristicRule::ImperativeVerb.to_string(), "imperative_verb");
    }
}
