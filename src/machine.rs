//! Conversation state machine
//!
//! Advances a session's state on each inbound message, decides whether to
//! probe or summarize under the question budget, and selects the next
//! probe question. Probing past the budget is structurally unreachable:
//! `select_probe` is only reached through `should_probe_deeper`, which
//! checks the budget first.

use crate::probes;
use crate::session::Session;
use crate::types::{ConversationState, FeedbackCategory};
use tracing::debug;

/// Phrases indicating the user described what happened (bug reports)
const WHAT_HAPPENED_MARKERS: &[&str] = &["when", "pressed", "clicked", "tried"];

/// Device or environment context markers
const CONTEXT_MARKERS: &[&str] = &["iphone", "android", "mobile", "wifi", "data"];

/// Explicit intent markers
const INTENT_MARKERS: &[&str] = &["trying to", "wanted to", "ordering", "using"];

/// Advance the session state for one inbound message
///
/// Rules are evaluated in order and cascade within a single message:
/// first contact always moves to collection, non-question feedback moves
/// collection straight on to probing, and probing moves to summarizing
/// once the budget is spent or detail is sufficient. A fresh session
/// opening with a bug report therefore lands in the probing state in one
/// step.
pub fn advance_on_inbound(
    session: &mut Session,
    category: FeedbackCategory,
    max_questions: u32,
) {
    let from = session.state;

    if session.state == ConversationState::InitialContact {
        session.state = ConversationState::CollectingFeedback;
    }
    if session.state == ConversationState::CollectingFeedback && category.is_feedback() {
        session.state = ConversationState::ProbingDeeper;
    }
    if session.state == ConversationState::ProbingDeeper
        && (session.questions_asked >= max_questions || has_sufficient_detail(session))
    {
        session.state = ConversationState::Summarizing;
    }

    if session.state != from {
        debug!(
            session_id = %session.session_id,
            from = %from,
            to = %session.state,
            "conversation state transition"
        );
    }
}

/// Whether enough detail has been gathered to stop probing
///
/// Bug reports need concrete repro context: a what-happened phrase plus a
/// device/context or intent marker within the last six turns' user
/// messages. Every other category has diminishing returns after two
/// probes.
pub fn has_sufficient_detail(session: &Session) -> bool {
    let Some(feedback) = &session.current_feedback else {
        return false;
    };

    if feedback.category == FeedbackCategory::BugReport {
        let recent = session.recent_user_texts(6);
        let contains = |terms: &[&str]| {
            recent
                .iter()
                .any(|msg| terms.iter().any(|t| msg.contains(t)))
        };

        let has_what_happened = contains(WHAT_HAPPENED_MARKERS);
        let has_context = contains(CONTEXT_MARKERS);
        let has_intent = contains(INTENT_MARKERS);

        return has_what_happened && (has_context || has_intent);
    }

    session.questions_asked >= 2
}

/// Whether the next reply should be a probe question
///
/// All of: budget not yet spent, a feedback item to probe about, detail
/// still insufficient, and the machine is in the probing state.
pub fn should_probe_deeper(session: &Session, max_questions: u32) -> bool {
    if session.questions_asked >= max_questions {
        return false;
    }
    if session.current_feedback.is_none() {
        return false;
    }
    if has_sufficient_detail(session) {
        return false;
    }
    session.state == ConversationState::ProbingDeeper
}

/// Whether the next reply should summarize collected feedback
pub fn should_summarize(session: &Session, max_questions: u32) -> bool {
    session.questions_asked >= max_questions
        || (session.questions_asked >= 2 && has_sufficient_detail(session))
}

/// Select the next probe for the current feedback item
///
/// Picks the first catalog candidate not already asked for this item and
/// records it before returning. `None` means the catalog is exhausted and
/// the caller should fall back to a generic continuation.
pub fn select_probe(session: &mut Session) -> Option<String> {
    let category = session.current_feedback.as_ref()?.category;

    let probe = probes::catalog(category)
        .iter()
        .find(|p| !session.pending_probes.contains(**p))
        .map(|p| p.to_string())?;

    session.pending_probes.insert(probe.clone());
    Some(probe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DEFAULT_HISTORY_WINDOW;
    use crate::types::StructuredFeedback;

    fn session_with_feedback(category: FeedbackCategory) -> Session {
        let mut session = Session::new("s1", DEFAULT_HISTORY_WINDOW);
        session.attach_feedback(StructuredFeedback::from_message("initial report", category));
        session
    }

    #[test]
    fn test_initial_contact_always_advances() {
        let mut session = Session::new("s1", DEFAULT_HISTORY_WINDOW);
        advance_on_inbound(&mut session, FeedbackCategory::Question, 3);
        assert_eq!(session.state, ConversationState::CollectingFeedback);
    }

    #[test]
    fn test_fresh_session_cascades_to_probing_on_feedback() {
        // A first message that is itself feedback crosses two rules at once
        let mut session = session_with_feedback(FeedbackCategory::BugReport);
        advance_on_inbound(&mut session, FeedbackCategory::BugReport, 3);
        assert_eq!(session.state, ConversationState::ProbingDeeper);
    }

    #[test]
    fn test_collecting_advances_on_feedback_only() {
        let mut session = Session::new("s1", DEFAULT_HISTORY_WINDOW);
        session.state = ConversationState::CollectingFeedback;

        advance_on_inbound(&mut session, FeedbackCategory::Question, 3);
        assert_eq!(session.state, ConversationState::CollectingFeedback);

        advance_on_inbound(&mut session, FeedbackCategory::BugReport, 3);
        assert_eq!(session.state, ConversationState::ProbingDeeper);
    }

    #[test]
    fn test_probing_advances_when_budget_spent() {
        let mut session = session_with_feedback(FeedbackCategory::General);
        session.state = ConversationState::ProbingDeeper;
        session.questions_asked = 3;

        advance_on_inbound(&mut session, FeedbackCategory::General, 3);
        assert_eq!(session.state, ConversationState::Summarizing);
    }

    #[test]
    fn test_bug_sufficiency_needs_what_plus_context_or_intent() {
        let mut session = session_with_feedback(FeedbackCategory::BugReport);
        session.record_user_turn("it broke", FeedbackCategory::BugReport);
        assert!(!has_sufficient_detail(&session));

        // What-happened marker alone is not enough
        session.record_user_turn("it happened when I pressed save", FeedbackCategory::General);
        assert!(!has_sufficient_detail(&session));

        // Adding a device marker completes the predicate
        session.record_user_turn("on my iphone", FeedbackCategory::General);
        assert!(has_sufficient_detail(&session));
    }

    #[test]
    fn test_non_bug_sufficiency_after_two_questions() {
        let mut session = session_with_feedback(FeedbackCategory::FeatureRequest);
        assert!(!has_sufficient_detail(&session));
        session.questions_asked = 2;
        assert!(has_sufficient_detail(&session));
    }

    #[test]
    fn test_should_probe_requires_all_conditions() {
        let mut session = session_with_feedback(FeedbackCategory::FeatureRequest);
        session.state = ConversationState::ProbingDeeper;
        assert!(should_probe_deeper(&session, 3));

        // Budget spent
        session.questions_asked = 3;
        assert!(!should_probe_deeper(&session, 3));

        // Sufficient detail
        session.questions_asked = 2;
        assert!(!should_probe_deeper(&session, 3));

        // No feedback item
        session.questions_asked = 0;
        session.current_feedback = None;
        assert!(!should_probe_deeper(&session, 3));
    }

    #[test]
    fn test_should_summarize() {
        let mut session = session_with_feedback(FeedbackCategory::General);
        assert!(!should_summarize(&session, 3));

        session.questions_asked = 3;
        assert!(should_summarize(&session, 3));

        session.questions_asked = 2;
        // Non-bug sufficiency holds at two questions
        assert!(should_summarize(&session, 3));
    }

    #[test]
    fn test_select_probe_never_repeats() {
        let mut session = session_with_feedback(FeedbackCategory::BugReport);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..5 {
            let probe = select_probe(&mut session).expect("catalog not exhausted");
            assert!(seen.insert(probe), "probe repeated");
        }
        // Catalog of five is now exhausted
        assert_eq!(select_probe(&mut session), None);
    }

    #[test]
    fn test_select_probe_without_feedback() {
        let mut session = Session::new("s1", DEFAULT_HISTORY_WINDOW);
        assert_eq!(select_probe(&mut session), None);
    }
}
