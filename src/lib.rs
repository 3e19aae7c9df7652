//! Resonance - Cross-Chat Feedback Interview Engine
//!
//! Collects free-text feedback from many independent chat sessions,
//! classifies each message, decides when and what follow-up question to
//! ask under a strict per-session question budget, aggregates
//! privacy-preserving themes across sessions, and determines when a
//! session has concluded so export can run exactly once.
//!
//! # Architecture
//!
//! - **Classifier / Themes / Probes**: pure keyword heuristics and fixed
//!   catalogs
//! - **Session / Machine**: per-chat conversation record and its state
//!   machine
//! - **Insights**: anonymized cross-session theme aggregation
//! - **Engine**: the single aggregate state, behind async locks
//! - **Services**: trait seams for generation, delivery, and export
//!
//! # Example
//!
//! ```no_run
//! use resonance::{FeedbackEngine, ResonanceConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = FeedbackEngine::new(ResonanceConfig::default());
//!
//!     let session = engine
//!         .process_inbound("chat-1", "the app crashes when I open notifications")
//!         .await?;
//!     let context = engine.get_context(&session.session_id).await;
//!     println!("{:?}", context);
//!
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod insights;
pub mod machine;
pub mod probes;
pub mod services;
pub mod session;
pub mod themes;
pub mod types;

// Re-export commonly used types
pub use config::ResonanceConfig;
pub use engine::{FeedbackEngine, InboundEvent};
pub use error::{ResonanceError, Result};
pub use services::{fallback_reply, Delivery, Exporter, FallbackGenerator, ResponseGenerator};
pub use session::Session;
pub use types::{
    ConversationState, EngagementTier, FeedbackCategory, Insight, InsightSummary, Role,
    SessionContext, SessionExport, Severity, StatsSnapshot, StructuredFeedback, Turn, UserProfile,
};
