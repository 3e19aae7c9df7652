//! Keyword-based feedback classification
//!
//! `classify` is a total pure function: keyword sets are checked in fixed
//! precedence order (bug, feature, question, complaint, praise, usage) and
//! the first match wins, so the same input always classifies identically.

use crate::types::FeedbackCategory;

const BUG_TERMS: &[&str] = &[
    "bug",
    "broken",
    "error",
    "crash",
    "doesn't work",
    "not working",
    "issue",
    "problem",
    "glitch",
    "fail",
];

const FEATURE_TERMS: &[&str] = &[
    "feature",
    "add",
    "would love",
    "wish",
    "could you",
    "suggestion",
    "enhancement",
    "improvement",
    "missing",
];

const QUESTION_TERMS: &[&str] = &[
    "how", "what", "why", "when", "where", "who", "which", "can", "could", "would", "should",
];

const COMPLAINT_TERMS: &[&str] = &[
    "hate",
    "annoying",
    "frustrated",
    "difficult",
    "hard",
    "confusing",
    "slow",
    "bad",
];

const PRAISE_TERMS: &[&str] = &[
    "love",
    "great",
    "awesome",
    "amazing",
    "fantastic",
    "helpful",
    "useful",
    "perfect",
    "excellent",
];

const USAGE_TERMS: &[&str] = &[
    "use", "using", "workflow", "process", "routine", "usually", "always", "typically",
];

/// Indicators that an *outbound* message is a question
///
/// Shared with probe accounting: any delivered text matching this detector
/// counts against the session's question budget.
const OUTBOUND_QUESTION_TERMS: &[&str] = &[
    "?", "how", "what", "why", "when", "where", "who", "which", "can you", "could you",
    "would you",
];

fn contains_any(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| haystack.contains(term))
}

/// Classify a free-text message into a feedback category
///
/// Total: always returns a category, defaulting to `General`.
pub fn classify(text: &str) -> FeedbackCategory {
    let lower = text.to_lowercase();

    if contains_any(&lower, BUG_TERMS) {
        return FeedbackCategory::BugReport;
    }
    if contains_any(&lower, FEATURE_TERMS) {
        return FeedbackCategory::FeatureRequest;
    }
    if contains_any(&lower, QUESTION_TERMS) || text.trim_end().ends_with('?') {
        return FeedbackCategory::Question;
    }
    if contains_any(&lower, COMPLAINT_TERMS) {
        return FeedbackCategory::Complaint;
    }
    if contains_any(&lower, PRAISE_TERMS) {
        return FeedbackCategory::Praise;
    }
    if contains_any(&lower, USAGE_TERMS) {
        return FeedbackCategory::UsagePattern;
    }

    FeedbackCategory::General
}

/// Detect whether an outbound message is a question
pub fn is_question(text: &str) -> bool {
    let lower = text.to_lowercase();
    contains_any(&lower, OUTBOUND_QUESTION_TERMS)
}
