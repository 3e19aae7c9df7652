//! Privacy-safe theme extraction
//!
//! Maps a categorized message onto a small fixed vocabulary of theme
//! labels. Only the label crosses the session boundary; raw text never
//! leaves the session it came from.

use crate::types::FeedbackCategory;

/// Derive a theme label from category plus coarse sub-keyword buckets
///
/// Unmatched messages fall into a `{category}_general` bucket, so the
/// function is total over all category/text pairs.
pub fn derive_theme(category: FeedbackCategory, text: &str) -> String {
    let lower = text.to_lowercase();
    let contains = |terms: &[&str]| terms.iter().any(|t| lower.contains(t));

    match category {
        FeedbackCategory::BugReport => {
            if contains(&["payment", "billing", "charge", "subscription"]) {
                "payment_issues".to_string()
            } else if contains(&["login", "signup", "account", "password"]) {
                "authentication_issues".to_string()
            } else if contains(&["slow", "loading", "performance", "speed"]) {
                "performance_issues".to_string()
            } else if contains(&["crash", "freeze", "error", "broken"]) {
                "stability_issues".to_string()
            } else {
                "general_bugs".to_string()
            }
        }
        FeedbackCategory::FeatureRequest => {
            if contains(&["notification", "alert", "reminder"]) {
                "notification_features".to_string()
            } else if contains(&["search", "find", "filter"]) {
                "search_features".to_string()
            } else if contains(&["export", "import", "download", "upload"]) {
                "data_management".to_string()
            } else if contains(&["mobile", "app", "phone"]) {
                "mobile_features".to_string()
            } else {
                "general_features".to_string()
            }
        }
        FeedbackCategory::PainPoint => {
            if contains(&["confusing", "complex", "hard", "difficult"]) {
                "usability_confusion".to_string()
            } else if contains(&["time", "slow", "manual", "tedious"]) {
                "efficiency_issues".to_string()
            } else if contains(&["integration", "connect", "sync"]) {
                "integration_problems".to_string()
            } else {
                "workflow_friction".to_string()
            }
        }
        other => format!("{}_general", other),
    }
}

/// Fixed probe questions for a theme
///
/// Themes without a dedicated list share a generic triple, so every
/// insight starts with at least three candidate probes.
pub fn suggested_probes(theme: &str) -> Vec<String> {
    let probes: &[&str] = match theme {
        "payment_issues" => &[
            "Have you noticed any patterns with when payment issues occur?",
            "What's your typical flow when making payments?",
            "How do you currently handle payment-related problems?",
        ],
        "authentication_issues" => &[
            "What's your usual process for logging in?",
            "How often do you find yourself having to reset things?",
            "What would make the login experience smoother for you?",
        ],
        "performance_issues" => &[
            "What time of day do you typically use the app?",
            "How does the speed compare to other similar tools you use?",
            "What's your internet setup like when you're using it?",
        ],
        "usability_confusion" => &[
            "What's the first thing you try when you get stuck?",
            "How do you usually figure out new features?",
            "What would make the interface more intuitive for you?",
        ],
        "notification_features" => &[
            "How do you prefer to be notified about things?",
            "What notifications do you find most useful in other apps?",
            "How often would you want to hear from us?",
        ],
        "search_features" => &[
            "What do you typically search for most often?",
            "How do you organize your information currently?",
            "What would make finding things faster for you?",
        ],
        _ => &[
            "How often does this type of situation come up for you?",
            "What's your current workaround for this?",
            "How would solving this change your workflow?",
        ],
    };
    probes.iter().map(|p| p.to_string()).collect()
}
