//! Collaborator seams: generation, delivery, export
//!
//! The engine never talks to the network itself. These traits define the
//! function-call contracts for the external collaborators, and
//! `fallback_reply` provides the required per-state companion table used
//! when generation fails.

use crate::config::ResonanceConfig;
use crate::error::Result;
use crate::types::{ConversationState, SessionContext, SessionExport};
use async_trait::async_trait;

/// Turns a session context and the user's latest message into reply text
///
/// Assumed to fail independently of the core; callers substitute
/// `fallback_reply` for the session's state on failure.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, context: &SessionContext, user_message: &str) -> Result<String>;
}

/// Delivers outbound text to a session's channel
///
/// Fire-and-forget from the core's perspective: failure does not roll
/// back state mutations already applied.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(&self, session_id: &str, text: &str) -> Result<()>;
}

/// Receives a concluded session's feedback for issue-tracker triage
#[async_trait]
pub trait Exporter: Send + Sync {
    async fn export(&self, payload: &SessionExport) -> Result<()>;
}

/// Fixed fallback reply for a conversation state
///
/// One entry per state, used whenever the generator fails.
pub fn fallback_reply(state: ConversationState, config: &ResonanceConfig) -> String {
    match state {
        ConversationState::InitialContact => format!(
            "Hey! I'm {}. Would love to hear your thoughts on {}!",
            config.founder_name, config.product_name
        ),
        ConversationState::CollectingFeedback => {
            "Thanks for sharing that! Can you tell me more?".to_string()
        }
        ConversationState::ProbingDeeper => {
            "That's really helpful - what led to that situation?".to_string()
        }
        ConversationState::Summarizing => {
            "Thanks for all this feedback - it's incredibly valuable!".to_string()
        }
        ConversationState::Thanking => {
            "Really appreciate you taking the time to share this!".to_string()
        }
    }
}

/// Generator that only ever uses the fallback table
///
/// Useful for tests and the demo driver; a real deployment wires an LLM
/// client behind `ResponseGenerator` instead.
pub struct FallbackGenerator {
    config: ResonanceConfig,
}

impl FallbackGenerator {
    pub fn new(config: ResonanceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ResponseGenerator for FallbackGenerator {
    async fn generate(&self, context: &SessionContext, _user_message: &str) -> Result<String> {
        Ok(fallback_reply(context.state, &self.config))
    }
}
