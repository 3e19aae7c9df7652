//! Cross-session insight aggregation
//!
//! Maintains frequency-counted, anonymized themes across all sessions.
//! Only theme labels and truncated session-id hashes are kept; raw text
//! and session ids never enter the board. A theme observed in a single
//! session is never surfaced into another session, so one chat's detail
//! cannot leak into a different chat.

use crate::session::Session;
use crate::themes;
use crate::types::{FeedbackCategory, Insight, InsightSummary, Severity, StructuredFeedback};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, info};

/// One-way truncated hash of a session id, used only for deduplicating
/// affected-session counts. Not a hard anonymity guarantee at scale.
pub fn session_hash(session_id: &str) -> String {
    let digest = Sha256::digest(session_id.as_bytes());
    format!("{:x}", digest).chars().take(8).collect()
}

/// Theme-keyed map of cross-session insights
#[derive(Debug, Default)]
pub struct InsightBoard {
    insights: HashMap<String, Insight>,
}

impl InsightBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one feedback item into the board, returning its theme
    ///
    /// Creates the insight on first occurrence, otherwise increments the
    /// frequency count and, for sessions not seen before under this
    /// theme, the affected-session record.
    pub fn record_feedback(&mut self, feedback: &StructuredFeedback, session_id: &str) -> String {
        let theme = themes::derive_theme(feedback.category, &feedback.raw_text);
        let hash = session_hash(session_id);
        let now = Utc::now();

        match self.insights.get_mut(&theme) {
            Some(insight) => {
                insight.frequency_count += 1;
                insight.last_seen = now;
                insight.seen_session_hashes.insert(hash);
                debug!(
                    theme = %theme,
                    frequency = insight.frequency_count,
                    affected = insight.affected_sessions(),
                    "insight updated"
                );
            }
            None => {
                let mut insight = Insight {
                    theme: theme.clone(),
                    category: feedback.category,
                    frequency_count: 1,
                    first_seen: now,
                    last_seen: now,
                    suggested_probes: themes::suggested_probes(&theme),
                    seen_session_hashes: Default::default(),
                };
                insight.seen_session_hashes.insert(hash);
                info!(theme = %theme, category = %feedback.category, "new cross-session insight");
                self.insights.insert(theme.clone(), insight);
            }
        }

        theme
    }

    pub fn get(&self, theme: &str) -> Option<&Insight> {
        self.insights.get(theme)
    }

    pub fn len(&self) -> usize {
        self.insights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insights.is_empty()
    }

    /// Redacted rollups for the stats snapshot
    pub fn summaries(&self) -> HashMap<String, InsightSummary> {
        self.insights
            .iter()
            .map(|(theme, insight)| (theme.clone(), InsightSummary::from(insight)))
            .collect()
    }

    /// Recurring insights whose category appears in the given set
    ///
    /// Used for export payloads: only themes seen more than once qualify.
    pub fn related_to(&self, categories: &[FeedbackCategory]) -> Vec<InsightSummary> {
        let mut related: Vec<InsightSummary> = self
            .insights
            .values()
            .filter(|i| i.frequency_count > 1 && categories.contains(&i.category))
            .map(InsightSummary::from)
            .collect();
        related.sort_by(|a, b| a.theme.cmp(&b.theme));
        related
    }

    /// Surface a cross-session probe into a session, if warranted
    ///
    /// `roll` is a uniform draw in [0, 1) made by the caller; surfacing
    /// only proceeds when it falls below `rate`. A qualifying insight must
    /// affect more than one session, carry at least medium severity, and
    /// still have a probe unused in this session. Selection prefers high
    /// severity, then frequency; the chosen probe is recorded into the
    /// session before it is returned, so it can never surface twice.
    pub fn select_cross_probe(
        &self,
        session: &mut Session,
        roll: f64,
        rate: f64,
    ) -> Option<String> {
        if roll >= rate {
            return None;
        }

        let mut candidates: Vec<&Insight> = self
            .insights
            .values()
            .filter(|i| {
                i.affected_sessions() > 1
                    && i.severity() >= Severity::Medium
                    && i.suggested_probes
                        .iter()
                        .any(|p| !session.cross_session_probes_asked.contains(p))
            })
            .collect();

        // Highest severity first, then frequency; theme name breaks ties
        // so selection is deterministic
        candidates.sort_by(|a, b| {
            b.severity()
                .cmp(&a.severity())
                .then(b.frequency_count.cmp(&a.frequency_count))
                .then(a.theme.cmp(&b.theme))
        });

        let insight = candidates.first()?;
        let probe = insight
            .suggested_probes
            .iter()
            .find(|p| !session.cross_session_probes_asked.contains(*p))?
            .clone();

        session.cross_session_probes_asked.insert(probe.clone());
        debug!(
            session_id = %session.session_id,
            theme = %insight.theme,
            "cross-session probe surfaced"
        );
        Some(probe)
    }
}
