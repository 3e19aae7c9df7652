//! The aggregate feedback engine
//!
//! `FeedbackEngine` owns the whole mutable state of the core: the session
//! store and the cross-session insight board, each behind its own
//! `tokio::sync::RwLock`. When both locks are needed they are always
//! acquired in the same order, sessions before insights. Mutation bodies
//! are short and never perform I/O while a lock is held; generation,
//! delivery, and export all happen outside.

use crate::classifier;
use crate::config::ResonanceConfig;
use crate::context;
use crate::error::{ResonanceError, Result};
use crate::insights::InsightBoard;
use crate::machine;
use crate::session::Session;
use crate::types::{SessionContext, SessionExport, StatsSnapshot, StructuredFeedback};
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// One inbound webhook-shaped event at the engine boundary
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub session_id: String,
    pub text: String,
    pub is_self_sent: bool,
}

/// Conversation state machine plus cross-session insight aggregator
///
/// Created at startup and torn down at shutdown; nothing persists across
/// process restarts.
pub struct FeedbackEngine {
    config: ResonanceConfig,
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    insights: Arc<RwLock<InsightBoard>>,
}

impl FeedbackEngine {
    pub fn new(config: ResonanceConfig) -> Self {
        Self {
            config,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            insights: Arc::new(RwLock::new(InsightBoard::new())),
        }
    }

    pub fn config(&self) -> &ResonanceConfig {
        &self.config
    }

    /// Filter and process one boundary event
    ///
    /// Self-sent messages and unmonitored sessions are ignored (Ok(None)),
    /// not errors; everything else flows into `process_inbound`.
    pub async fn process_event(&self, event: InboundEvent) -> Result<Option<Session>> {
        if event.is_self_sent {
            debug!(session_id = %event.session_id, "ignoring self-sent event");
            return Ok(None);
        }
        if !self.config.is_monitored(&event.session_id) {
            debug!(session_id = %event.session_id, "ignoring unmonitored session");
            return Ok(None);
        }
        self.process_inbound(&event.session_id, &event.text)
            .await
            .map(Some)
    }

    /// Process one inbound user message
    ///
    /// Creates the session on first contact, classifies the message,
    /// records the turn, extracts feedback, folds it into the insight
    /// board, and advances the state machine. Returns a snapshot of the
    /// updated session.
    pub async fn process_inbound(&self, session_id: &str, text: &str) -> Result<Session> {
        if !self.config.is_monitored(session_id) {
            return Err(ResonanceError::EventIgnored(format!(
                "session {} is not monitored",
                session_id
            )));
        }

        let category = classifier::classify(text);

        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(session_id, self.config.history_window));

        session.record_user_turn(text, category);

        let extracted = if category.is_feedback() {
            let feedback = StructuredFeedback::from_message(text, category);
            session.attach_feedback(feedback.clone());
            Some(feedback)
        } else {
            None
        };

        machine::advance_on_inbound(session, category, self.config.max_questions_per_session);

        if let Some(feedback) = extracted {
            if self.config.enable_cross_session_insights {
                // Lock order: sessions, then insights
                let mut insights = self.insights.write().await;
                let theme = insights.record_feedback(&feedback, session_id);
                debug!(session_id, theme = %theme, category = %category, "feedback recorded");
            }
        }

        Ok(session.clone())
    }

    /// Build the context snapshot for one decision point
    ///
    /// The sampling roll for cross-session probe surfacing is drawn here,
    /// outside the locks; the draw itself is consumed at most once per
    /// inbound turn regardless of how often this is called.
    pub async fn get_context(&self, session_id: &str) -> Option<SessionContext> {
        let roll = rand::random::<f64>();

        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(session_id)?;
        let insights = self.insights.read().await;

        Some(context::build_context(
            session,
            &insights,
            &self.config,
            roll,
        ))
    }

    /// Next probe question for the session's current feedback item
    ///
    /// Returns `None` unless the state machine says probing is warranted
    /// and an unused catalog probe remains. Probing past the question
    /// budget cannot happen here: the budget check is part of
    /// `should_probe_deeper`.
    pub async fn next_probe(&self, session_id: &str) -> Option<String> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(session_id)?;
        if !machine::should_probe_deeper(session, self.config.max_questions_per_session) {
            return None;
        }
        machine::select_probe(session)
    }

    /// Record an outbound message that was sent for this session
    ///
    /// The text runs through the same question detector used for probes;
    /// question-shaped replies spend the session's budget. The counter
    /// saturates at the configured maximum so it stays within bound even
    /// if a caller sends question-shaped text past the budget. Delivery
    /// failure does not roll this back.
    pub async fn mark_outbound_sent(&self, session_id: &str, text: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(session_id) {
            let spends_budget = classifier::is_question(text)
                && session.questions_asked < self.config.max_questions_per_session;
            session.record_assistant_turn(text, spends_budget);
        }
    }

    /// Whether the session has concluded (state or spent budget)
    pub async fn is_session_ending(&self, session_id: &str) -> bool {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(|s| context::is_session_ending(s, self.config.max_questions_per_session))
            .unwrap_or(false)
    }

    /// Claim the session's export payload, exactly once
    ///
    /// Returns `Some` only the first time a concluded session with
    /// collected feedback is claimed; the exported flag is set at claim
    /// time, before any exporter I/O runs.
    pub async fn begin_export(&self, session_id: &str) -> Option<SessionExport> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(session_id)?;

        if session.exported
            || session.feedback_collected == 0
            || !context::is_session_ending(session, self.config.max_questions_per_session)
        {
            return None;
        }
        session.exported = true;

        let insights = self.insights.read().await;
        let export = context::build_export(session, &insights);
        info!(
            session_id,
            items = export.feedback_items.len(),
            "session export claimed"
        );
        Some(export)
    }

    /// Claim export payloads for every unclaimed session with feedback
    ///
    /// Bulk sweep for operator-triggered triage; each session is marked
    /// exported as it is claimed.
    pub async fn collect_all_exports(&self) -> Vec<SessionExport> {
        let mut sessions = self.sessions.write().await;
        let insights = self.insights.read().await;

        let mut exports = Vec::new();
        for session in sessions.values_mut() {
            if session.exported || session.feedback_collected == 0 {
                continue;
            }
            session.exported = true;
            exports.push(context::build_export(session, &insights));
        }
        info!(count = exports.len(), "bulk export sweep");
        exports
    }

    /// Operator reset: drop a session entirely
    pub async fn reset_session(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(session_id).is_some();
        if removed {
            info!(session_id, "session reset");
        }
        removed
    }

    /// Read-only view of a session
    pub async fn get_session(&self, session_id: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).cloned()
    }

    /// Rollup statistics across all sessions and insights
    pub async fn get_stats(&self) -> StatsSnapshot {
        let sessions = self.sessions.read().await;
        let insights = self.insights.read().await;

        let cutoff = Utc::now() - Duration::hours(24);
        let mut sessions_by_state = HashMap::new();
        let mut feedback_by_category: HashMap<_, u64> = HashMap::new();
        let mut total_feedback_items: u64 = 0;
        let mut active_sessions = 0;
        let mut last_activity = None;

        for session in sessions.values() {
            *sessions_by_state.entry(session.state).or_insert(0) += 1;
            if session.last_interaction > cutoff {
                active_sessions += 1;
            }
            total_feedback_items += session.user_profile.total_feedback_items as u64;
            for (category, count) in &session.user_profile.by_category {
                *feedback_by_category.entry(*category).or_insert(0) += *count as u64;
            }
            last_activity = match last_activity {
                None => Some(session.last_interaction),
                Some(t) if session.last_interaction > t => Some(session.last_interaction),
                other => other,
            };
        }

        StatsSnapshot {
            total_sessions: sessions.len(),
            active_sessions,
            total_feedback_items,
            feedback_by_category,
            sessions_by_state,
            insights: insights.summaries(),
            last_activity,
        }
    }
}
