//! Core data types for the Resonance feedback engine
//!
//! This module defines the fundamental data structures used throughout
//! resonance: feedback categories, conversation states, turns, structured
//! feedback items, cross-session insights, and the read-only projections
//! (context, export, stats) handed to collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Feedback category classification
///
/// Every inbound message maps to exactly one category; `General` is the
/// total-function default when nothing else matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    FeatureRequest,
    BugReport,
    Question,
    Complaint,
    Praise,
    UsagePattern,
    PainPoint,
    General,
}

impl FeedbackCategory {
    /// Whether a message of this category counts as collectable feedback
    ///
    /// Questions from the user are answered, not recorded as feedback.
    pub fn is_feedback(&self) -> bool {
        !matches!(self, FeedbackCategory::Question)
    }
}

impl std::fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedbackCategory::FeatureRequest => write!(f, "feature_request"),
            FeedbackCategory::BugReport => write!(f, "bug_report"),
            FeedbackCategory::Question => write!(f, "question"),
            FeedbackCategory::Complaint => write!(f, "complaint"),
            FeedbackCategory::Praise => write!(f, "praise"),
            FeedbackCategory::UsagePattern => write!(f, "usage_pattern"),
            FeedbackCategory::PainPoint => write!(f, "pain_point"),
            FeedbackCategory::General => write!(f, "general"),
        }
    }
}

/// Conversation state for a feedback session
///
/// States advance strictly forward: contact, collection, probing,
/// summarizing, thanking. `Summarizing` and `Thanking` make the session
/// eligible for export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    InitialContact,
    CollectingFeedback,
    ProbingDeeper,
    Summarizing,
    Thanking,
}

impl ConversationState {
    /// Terminal states where collected feedback becomes exportable
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConversationState::Summarizing | ConversationState::Thanking
        )
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationState::InitialContact => write!(f, "initial_contact"),
            ConversationState::CollectingFeedback => write!(f, "collecting_feedback"),
            ConversationState::ProbingDeeper => write!(f, "probing_deeper"),
            ConversationState::Summarizing => write!(f, "summarizing"),
            ConversationState::Thanking => write!(f, "thanking"),
        }
    }
}

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One message within a session, inbound or outbound
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Category, set only for inbound turns
    pub category: Option<FeedbackCategory>,
}

/// A structured feedback item extracted from one inbound message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredFeedback {
    /// Unique identifier for export correlation
    pub id: Uuid,

    /// Classified category
    pub category: FeedbackCategory,

    /// Short summary (raw text truncated to 200 chars)
    pub summary: String,

    /// Full original message text
    pub raw_text: String,

    /// Free-form extraction context
    pub context: HashMap<String, String>,

    /// When the item was extracted
    pub recorded_at: DateTime<Utc>,
}

impl StructuredFeedback {
    /// Build a feedback item from a classified message
    pub fn from_message(text: &str, category: FeedbackCategory) -> Self {
        let summary = if text.chars().count() > 200 {
            let truncated: String = text.chars().take(200).collect();
            format!("{}...", truncated)
        } else {
            text.to_string()
        };
        let mut context = HashMap::new();
        context.insert("analyzed_at".to_string(), Utc::now().to_rfc3339());

        Self {
            id: Uuid::new_v4(),
            category,
            summary,
            raw_text: text.to_string(),
            context,
            recorded_at: Utc::now(),
        }
    }
}

/// Coarse engagement tier derived from how much feedback a user has given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementTier {
    New,
    Engaged,
    PowerUser,
}

impl EngagementTier {
    /// Derive the tier from a total feedback-item count
    pub fn from_total(total: u32) -> Self {
        match total {
            0 => EngagementTier::New,
            1..=4 => EngagementTier::Engaged,
            _ => EngagementTier::PowerUser,
        }
    }
}

/// Per-user engagement counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// First time this session was seen
    pub first_contact: DateTime<Utc>,

    /// Total feedback items collected across the session
    pub total_feedback_items: u32,

    /// Tally per category
    pub by_category: HashMap<FeedbackCategory, u32>,
}

impl UserProfile {
    pub fn new() -> Self {
        Self {
            first_contact: Utc::now(),
            total_feedback_items: 0,
            by_category: HashMap::new(),
        }
    }

    /// Record one feedback item of the given category
    pub fn record_feedback(&mut self, category: FeedbackCategory) {
        self.total_feedback_items += 1;
        *self.by_category.entry(category).or_insert(0) += 1;
    }

    /// Current engagement tier, derived from totals
    pub fn engagement(&self) -> EngagementTier {
        EngagementTier::from_total(self.total_feedback_items)
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::new()
    }
}

/// Insight severity, derived from frequency and category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// Aggregate record for one recurring theme across all sessions
///
/// Privacy-preserving design: stores a coarse theme label and truncated
/// session-id hashes, never raw user text and never the session ids
/// themselves. The hashes exist only to deduplicate affected-session
/// counting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    /// Theme label from the fixed vocabulary (e.g. "payment_issues")
    pub theme: String,

    /// Category of the feedback that created the theme
    pub category: FeedbackCategory,

    /// How many times the theme has been reported, across all sessions
    pub frequency_count: u32,

    /// First and most recent occurrence
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,

    /// Fixed per-theme probe questions
    pub suggested_probes: Vec<String>,

    /// Truncated one-way hashes of session ids that reported the theme
    pub seen_session_hashes: HashSet<String>,
}

impl Insight {
    /// Number of distinct sessions that reported this theme
    ///
    /// Always equals the hash-set cardinality, so the count cannot drift
    /// from the dedup record.
    pub fn affected_sessions(&self) -> usize {
        self.seen_session_hashes.len()
    }

    /// Derived severity: high on frequency >= 5 or bug/pain categories,
    /// medium on frequency >= 3, low otherwise
    pub fn severity(&self) -> Severity {
        if self.frequency_count >= 5
            || matches!(
                self.category,
                FeedbackCategory::BugReport | FeedbackCategory::PainPoint
            )
        {
            Severity::High
        } else if self.frequency_count >= 3 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// Redacted per-theme rollup for stats and export payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightSummary {
    pub theme: String,
    pub category: FeedbackCategory,
    pub frequency_count: u32,
    pub affected_sessions: usize,
    pub severity: Severity,
}

impl From<&Insight> for InsightSummary {
    fn from(insight: &Insight) -> Self {
        Self {
            theme: insight.theme.clone(),
            category: insight.category,
            frequency_count: insight.frequency_count,
            affected_sessions: insight.affected_sessions(),
            severity: insight.severity(),
        }
    }
}

/// Role/content/category view of a turn, safe to hand to a generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnSummary {
    pub role: Role,
    pub content: String,
    pub category: Option<FeedbackCategory>,
}

/// Read-only session snapshot for the downstream text generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: String,
    pub state: ConversationState,
    pub current_category: Option<FeedbackCategory>,
    pub feedback_collected: u32,
    pub questions_asked: u32,
    pub engagement: EngagementTier,
    /// Most recent turns, newest last (role/content/category only)
    pub recent_turns: Vec<TurnSummary>,
    pub should_probe: bool,
    pub should_summarize: bool,
    /// Cross-session probe surfaced for this decision point, if any
    pub cross_session_probe: Option<String>,
    pub pending_probes_count: usize,
    pub last_interaction: DateTime<Utc>,
}

/// Everything exported when a session concludes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExport {
    pub session_id: String,
    pub state: ConversationState,
    pub questions_asked: u32,
    /// All non-question feedback gathered in the session
    pub feedback_items: Vec<StructuredFeedback>,
    /// Insights whose category matches an exported item and that recurred
    pub related_insights: Vec<InsightSummary>,
    pub collected_at: DateTime<Utc>,
}

/// Rollup counts across the whole engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_sessions: usize,
    /// Sessions with activity in the trailing 24 hours
    pub active_sessions: usize,
    pub total_feedback_items: u64,
    pub feedback_by_category: HashMap<FeedbackCategory, u64>,
    pub sessions_by_state: HashMap<ConversationState, usize>,
    pub insights: HashMap<String, InsightSummary>,
    pub last_activity: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_is_feedback() {
        assert!(FeedbackCategory::BugReport.is_feedback());
        assert!(FeedbackCategory::Praise.is_feedback());
        assert!(!FeedbackCategory::Question.is_feedback());
    }

    #[test]
    fn test_terminal_states() {
        assert!(ConversationState::Summarizing.is_terminal());
        assert!(ConversationState::Thanking.is_terminal());
        assert!(!ConversationState::ProbingDeeper.is_terminal());
    }

    #[test]
    fn test_feedback_summary_truncation() {
        let long = "x".repeat(500);
        let item = StructuredFeedback::from_message(&long, FeedbackCategory::General);
        assert_eq!(item.summary.chars().count(), 203); // 200 + "..."
        assert_eq!(item.raw_text.len(), 500);
    }

    #[test]
    fn test_engagement_tiers() {
        assert_eq!(EngagementTier::from_total(0), EngagementTier::New);
        assert_eq!(EngagementTier::from_total(3), EngagementTier::Engaged);
        assert_eq!(EngagementTier::from_total(5), EngagementTier::PowerUser);
    }

    #[test]
    fn test_severity_derivation() {
        let mut insight = Insight {
            theme: "search_features".to_string(),
            category: FeedbackCategory::FeatureRequest,
            frequency_count: 1,
            first_seen: Utc::now(),
            last_seen: Utc::now(),
            suggested_probes: vec![],
            seen_session_hashes: HashSet::new(),
        };
        assert_eq!(insight.severity(), Severity::Low);

        insight.frequency_count = 3;
        assert_eq!(insight.severity(), Severity::Medium);

        insight.frequency_count = 5;
        assert_eq!(insight.severity(), Severity::High);

        // Bug reports are high severity from the first occurrence
        insight.frequency_count = 1;
        insight.category = FeedbackCategory::BugReport;
        assert_eq!(insight.severity(), Severity::High);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_affected_sessions_is_hash_cardinality() {
        let mut insight = Insight {
            theme: "payment_issues".to_string(),
            category: FeedbackCategory::BugReport,
            frequency_count: 2,
            first_seen: Utc::now(),
            last_seen: Utc::now(),
            suggested_probes: vec![],
            seen_session_hashes: HashSet::new(),
        };
        assert_eq!(insight.affected_sessions(), 0);
        insight.seen_session_hashes.insert("ab12cd34".to_string());
        insight.seen_session_hashes.insert("ab12cd34".to_string());
        assert_eq!(insight.affected_sessions(), 1);
    }
}
