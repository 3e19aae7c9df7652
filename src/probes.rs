//! Per-category probe question catalogs
//!
//! Fixed, ordered lists of Mom Test style follow-up questions. Selection
//! order is significant: the state machine offers the first candidate not
//! yet asked for the current feedback item.

use crate::types::FeedbackCategory;

const FEATURE_REQUEST_PROBES: &[&str] = &[
    "What problem were you trying to solve when you realized you needed this feature?",
    "How do you currently handle this without the feature? What's your workaround?",
    "Can you walk me through the last time you faced this exact situation?",
    "What would happen if this feature didn't exist at all?",
    "How often do you run into this issue - daily, weekly, or just occasionally?",
];

const BUG_REPORT_PROBES: &[&str] = &[
    "What were you trying to accomplish when this happened?",
    "How has this bug impacted your workflow or goals?",
    "What did you expect to happen instead?",
    "Is this something that happens every time or just sometimes?",
    "How did you end up working around this issue?",
];

const PAIN_POINT_PROBES: &[&str] = &[
    "How long have you been dealing with this problem?",
    "What solutions have you tried before finding our product?",
    "How much time or money does this problem cost you?",
    "What would your life look like if this problem was completely solved?",
    "Who else is affected by this problem besides you?",
];

const USAGE_PATTERN_PROBES: &[&str] = &[
    "What typically triggers you to use this feature?",
    "How does this fit into your broader workflow?",
    "What do you usually do right before and after using this?",
    "How did you discover this was possible?",
    "What would make this even more useful for you?",
];

const GENERAL_PROBES: &[&str] = &[
    "What were you hoping to achieve when you first tried our product?",
    "How does this compare to what you were using before?",
    "What almost stopped you from trying us out?",
    "What would you tell a friend who's considering using this?",
    "What's the most important thing we could improve?",
];

/// Ordered probe candidates for a feedback category
///
/// Categories without a dedicated catalog (complaints, praise, questions)
/// share the general list.
pub fn catalog(category: FeedbackCategory) -> &'static [&'static str] {
    match category {
        FeedbackCategory::FeatureRequest => FEATURE_REQUEST_PROBES,
        FeedbackCategory::BugReport => BUG_REPORT_PROBES,
        FeedbackCategory::PainPoint => PAIN_POINT_PROBES,
        FeedbackCategory::UsagePattern => USAGE_PATTERN_PROBES,
        _ => GENERAL_PROBES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_a_catalog() {
        for category in [
            FeedbackCategory::FeatureRequest,
            FeedbackCategory::BugReport,
            FeedbackCategory::PainPoint,
            FeedbackCategory::UsagePattern,
            FeedbackCategory::Complaint,
            FeedbackCategory::Praise,
            FeedbackCategory::Question,
            FeedbackCategory::General,
        ] {
            assert_eq!(catalog(category).len(), 5);
        }
    }

    #[test]
    fn test_fallback_categories_share_general_list() {
        assert_eq!(catalog(FeedbackCategory::Complaint), GENERAL_PROBES);
        assert_eq!(catalog(FeedbackCategory::Praise), GENERAL_PROBES);
    }

    #[test]
    fn test_catalog_order_is_stable() {
        assert_eq!(
            catalog(FeedbackCategory::BugReport)[0],
            "What were you trying to accomplish when this happened?"
        );
    }
}
