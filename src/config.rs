//! Configuration for the Resonance feedback engine
//!
//! Settings load from an optional TOML file layered with `RESONANCE_`
//! environment variables, falling back to defaults that match the
//! reference deployment (3-question budget, 30% cross-session probe rate,
//! 20-turn history window).

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResonanceConfig {
    /// Hard cap on outbound question-turns per session
    pub max_questions_per_session: u32,

    /// Questions after which summarization is forced
    pub auto_summarize_threshold: u32,

    /// Probability of surfacing a cross-session probe at a decision point
    pub cross_session_probe_rate: f64,

    /// Master switch for the cross-session insight aggregator
    pub enable_cross_session_insights: bool,

    /// Sliding window of turns kept per session
    pub history_window: usize,

    /// Session ids the engine listens to; empty means monitor everything
    pub monitored_sessions: Vec<String>,

    /// Name the fallback replies introduce themselves with
    pub founder_name: String,

    /// Product name used in fallback replies
    pub product_name: String,
}

impl Default for ResonanceConfig {
    fn default() -> Self {
        Self {
            max_questions_per_session: 3,
            auto_summarize_threshold: 3,
            cross_session_probe_rate: 0.3,
            enable_cross_session_insights: true,
            history_window: 20,
            monitored_sessions: Vec::new(),
            founder_name: "the founder".to_string(),
            product_name: "the product".to_string(),
        }
    }
}

impl ResonanceConfig {
    /// Load configuration from an optional file plus RESONANCE_* env vars
    ///
    /// Missing file is fine; env vars override file values.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("RESONANCE").separator("__"))
            .build()?;

        // try_deserialize fails on an empty source set only if defaults
        // can't fill in, and #[serde(default)] guarantees they can
        Ok(settings.try_deserialize()?)
    }

    /// Check whether a session id is in the monitored set
    ///
    /// An empty monitored set means everything is monitored.
    pub fn is_monitored(&self, session_id: &str) -> bool {
        self.monitored_sessions.is_empty()
            || self.monitored_sessions.iter().any(|s| s == session_id)
    }
}
