//! Per-session conversation record
//!
//! A `Session` owns everything the engine knows about one chat: the
//! bounded turn history, the outstanding feedback item, probe bookkeeping,
//! and the question budget counters. All mutation goes through enumerated
//! methods; there is no field-by-name update path.

use crate::types::{
    ConversationState, FeedbackCategory, Role, StructuredFeedback, Turn, UserProfile,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Default sliding-window size for turn history
pub const DEFAULT_HISTORY_WINDOW: usize = 20;

/// One feedback-collection conversation, keyed by an opaque session id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque id, stable for the lifetime of the conversation
    pub session_id: String,

    /// Current conversation state
    pub state: ConversationState,

    /// Sliding window of recent turns; older turns are discarded
    history: VecDeque<Turn>,

    /// Window capacity
    history_window: usize,

    /// Most recently extracted non-question feedback item
    pub current_feedback: Option<StructuredFeedback>,

    /// Probe questions already asked for the current feedback item
    pub pending_probes: HashSet<String>,

    /// Cross-session probes already surfaced in this session
    pub cross_session_probes_asked: HashSet<String>,

    /// Outbound turns that were questions; monotone, never reset
    pub questions_asked: u32,

    /// Non-question feedback items seen
    pub feedback_collected: u32,

    /// Engagement counters for this user
    pub user_profile: UserProfile,

    /// Updated on every inbound or outbound turn
    pub last_interaction: DateTime<Utc>,

    /// True between an inbound turn and the corresponding outbound turn
    pub awaiting_response: bool,

    /// Set once the session's feedback has been handed to the exporter
    pub exported: bool,

    /// Whether the cross-session probe draw for the current inbound turn
    /// has been consumed (one draw per decision point)
    probe_draw_done: bool,
}

impl Session {
    /// Create a fresh session in the initial state
    pub fn new(session_id: impl Into<String>, history_window: usize) -> Self {
        Self {
            session_id: session_id.into(),
            state: ConversationState::InitialContact,
            history: VecDeque::with_capacity(history_window),
            history_window,
            current_feedback: None,
            pending_probes: HashSet::new(),
            cross_session_probes_asked: HashSet::new(),
            questions_asked: 0,
            feedback_collected: 0,
            user_profile: UserProfile::new(),
            last_interaction: Utc::now(),
            awaiting_response: false,
            exported: false,
            probe_draw_done: false,
        }
    }

    /// Turns in the window, oldest first
    pub fn history(&self) -> impl Iterator<Item = &Turn> {
        self.history.iter()
    }

    /// Number of turns currently in the window
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// The newest `n` turns, oldest first
    pub fn recent_turns(&self, n: usize) -> Vec<&Turn> {
        let skip = self.history.len().saturating_sub(n);
        self.history.iter().skip(skip).collect()
    }

    /// Lowercased contents of the user turns among the newest `n` turns
    pub fn recent_user_texts(&self, n: usize) -> Vec<String> {
        self.recent_turns(n)
            .into_iter()
            .filter(|t| t.role == Role::User)
            .map(|t| t.content.to_lowercase())
            .collect()
    }

    /// Record an inbound user turn
    ///
    /// Flips `awaiting_response` on and re-arms the once-per-turn
    /// cross-session probe draw.
    pub fn record_user_turn(&mut self, content: &str, category: FeedbackCategory) {
        self.push_turn(Turn {
            role: Role::User,
            content: content.to_string(),
            timestamp: Utc::now(),
            category: Some(category),
        });
        self.awaiting_response = true;
        self.probe_draw_done = false;
    }

    /// Record an outbound assistant turn
    ///
    /// `is_question` comes from the shared outbound question detector and
    /// drives the budget counter.
    pub fn record_assistant_turn(&mut self, content: &str, is_question: bool) {
        self.push_turn(Turn {
            role: Role::Assistant,
            content: content.to_string(),
            timestamp: Utc::now(),
            category: None,
        });
        self.awaiting_response = false;
        if is_question {
            self.questions_asked += 1;
        }
    }

    /// Attach a freshly extracted feedback item as the current one
    ///
    /// Resets the per-item probe record and updates the user profile and
    /// feedback counter.
    pub fn attach_feedback(&mut self, feedback: StructuredFeedback) {
        self.user_profile.record_feedback(feedback.category);
        self.feedback_collected += 1;
        self.pending_probes.clear();
        self.current_feedback = Some(feedback);
    }

    /// Consume the single cross-session probe draw for this inbound turn
    ///
    /// Returns true exactly once per inbound turn; subsequent calls before
    /// the next inbound turn return false, making repeated context builds
    /// idempotent.
    pub fn take_probe_draw(&mut self) -> bool {
        if self.probe_draw_done {
            false
        } else {
            self.probe_draw_done = true;
            true
        }
    }

    /// All non-question feedback items reconstructible from the window,
    /// plus the current item if set
    pub fn feedback_history(&self) -> Vec<StructuredFeedback> {
        let mut items: Vec<StructuredFeedback> = self
            .history
            .iter()
            .filter(|t| t.role == Role::User)
            .filter_map(|t| {
                t.category
                    .filter(|c| c.is_feedback())
                    .map(|c| StructuredFeedback::from_message(&t.content, c))
            })
            .collect();
        if let Some(current) = &self.current_feedback {
            items.push(current.clone());
        }
        items
    }

    fn push_turn(&mut self, turn: Turn) {
        while self.history.len() >= self.history_window.max(1) {
            self.history.pop_front();
        }
        self.history.push_back(turn);
        self.last_interaction = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_window_eviction() {
        let mut session = Session::new("s1", 5);
        for i in 0..8 {
            session.record_user_turn(&format!("message {}", i), FeedbackCategory::General);
        }
        assert_eq!(session.history_len(), 5);
        // Oldest remaining turn is message 3
        let first = session.history().next().unwrap();
        assert_eq!(first.content, "message 3");
    }

    #[test]
    fn test_awaiting_response_flips() {
        let mut session = Session::new("s1", DEFAULT_HISTORY_WINDOW);
        session.record_user_turn("hello", FeedbackCategory::General);
        assert!(session.awaiting_response);
        session.record_assistant_turn("hi there", false);
        assert!(!session.awaiting_response);
    }

    #[test]
    fn test_question_counter_monotone() {
        let mut session = Session::new("s1", DEFAULT_HISTORY_WINDOW);
        session.record_assistant_turn("What happened?", true);
        session.record_assistant_turn("Thanks!", false);
        session.record_assistant_turn("Anything else?", true);
        assert_eq!(session.questions_asked, 2);
    }

    #[test]
    fn test_attach_feedback_updates_counters() {
        let mut session = Session::new("s1", DEFAULT_HISTORY_WINDOW);
        session.pending_probes.insert("old probe".to_string());
        let item = StructuredFeedback::from_message("it crashes", FeedbackCategory::BugReport);
        session.attach_feedback(item);

        assert_eq!(session.feedback_collected, 1);
        assert_eq!(session.user_profile.total_feedback_items, 1);
        // New item means a fresh probe record
        assert!(session.pending_probes.is_empty());
    }

    #[test]
    fn test_probe_draw_consumed_once_per_turn() {
        let mut session = Session::new("s1", DEFAULT_HISTORY_WINDOW);
        session.record_user_turn("hello", FeedbackCategory::General);
        assert!(session.take_probe_draw());
        assert!(!session.take_probe_draw());

        // A new inbound turn re-arms the draw
        session.record_user_turn("more", FeedbackCategory::General);
        assert!(session.take_probe_draw());
    }

    #[test]
    fn test_recent_user_texts_filters_assistant() {
        let mut session = Session::new("s1", DEFAULT_HISTORY_WINDOW);
        session.record_user_turn("It Broke", FeedbackCategory::BugReport);
        session.record_assistant_turn("What happened?", true);
        session.record_user_turn("I pressed send", FeedbackCategory::General);

        let texts = session.recent_user_texts(6);
        assert_eq!(texts, vec!["it broke".to_string(), "i pressed send".to_string()]);
    }
}
