//! Session snapshot building and session-ending decisions
//!
//! Projects a session into the read-only `SessionContext` handed to the
//! text generator, decides when a session has concluded, and assembles
//! the export payload for the issue tracker.

use crate::config::ResonanceConfig;
use crate::insights::InsightBoard;
use crate::machine;
use crate::session::Session;
use crate::types::{SessionContext, SessionExport, TurnSummary};
use chrono::Utc;

/// How many recent turns the generator sees
const RECENT_TURNS: usize = 5;

/// Build the read-only context snapshot for one decision point
///
/// The cross-session probe draw is consumed here, at call time: the first
/// build after an inbound turn may surface a probe (subject to the
/// sampling roll), and every further build before the next inbound turn
/// is an idempotent read that surfaces nothing. `roll` is the caller's
/// uniform draw in [0, 1).
pub fn build_context(
    session: &mut Session,
    board: &InsightBoard,
    config: &ResonanceConfig,
    roll: f64,
) -> SessionContext {
    // A surfaced cross-probe becomes an outbound question, so the draw is
    // also gated on remaining question budget.
    let cross_session_probe = if config.enable_cross_session_insights
        && session.questions_asked < config.max_questions_per_session
        && session.take_probe_draw()
    {
        board.select_cross_probe(session, roll, config.cross_session_probe_rate)
    } else {
        None
    };

    let recent_turns = session
        .recent_turns(RECENT_TURNS)
        .into_iter()
        .map(|t| TurnSummary {
            role: t.role,
            content: t.content.clone(),
            category: t.category,
        })
        .collect();

    SessionContext {
        session_id: session.session_id.clone(),
        state: session.state,
        current_category: session.current_feedback.as_ref().map(|f| f.category),
        feedback_collected: session.feedback_collected,
        questions_asked: session.questions_asked,
        engagement: session.user_profile.engagement(),
        recent_turns,
        should_probe: machine::should_probe_deeper(session, config.max_questions_per_session),
        should_summarize: machine::should_summarize(session, config.max_questions_per_session),
        cross_session_probe,
        pending_probes_count: session.pending_probes.len(),
        last_interaction: session.last_interaction,
    }
}

/// Whether the session has concluded and its feedback is exportable
///
/// True in a terminal state, or once the question budget is spent with at
/// least one feedback item collected. Callers must re-evaluate after
/// recording the outbound turn, since that can spend the final question.
pub fn is_session_ending(session: &Session, max_questions: u32) -> bool {
    session.state.is_terminal()
        || (session.questions_asked >= max_questions && session.feedback_collected > 0)
}

/// Assemble the export payload for a concluded session
///
/// Includes every non-question feedback item reconstructible from the
/// history window plus the current item, and the recurring insights whose
/// category matches one of those items.
pub fn build_export(session: &Session, board: &InsightBoard) -> SessionExport {
    let feedback_items = session.feedback_history();
    let categories: Vec<_> = feedback_items.iter().map(|f| f.category).collect();
    let related_insights = board.related_to(&categories);

    SessionExport {
        session_id: session.session_id.clone(),
        state: session.state,
        questions_asked: session.questions_asked,
        feedback_items,
        related_insights,
        collected_at: Utc::now(),
    }
}
