//! Property tests for the question budget and aggregation invariants

use proptest::prelude::*;
use resonance::{fallback_reply, FeedbackEngine, ResonanceConfig};
use std::collections::HashMap;

/// Mixed pool covering every classification path, including messages that
/// satisfy the bug-report sufficiency predicate
const MESSAGES: &[&str] = &[
    "the app crashes when I open settings",
    "payment failed with an error",
    "wish you could add dark mode",
    "how do I export my data?",
    "this is so confusing and slow",
    "love the new layout",
    "I was trying to sync on my iphone when it froze",
    "just checking in",
];

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever the message sequence, `questions_asked` never exceeds the
    /// configured maximum and probing is off once it gets there.
    #[test]
    fn question_budget_never_exceeded(
        indices in proptest::collection::vec(0usize..MESSAGES.len(), 1..40)
    ) {
        let rt = runtime();
        rt.block_on(async {
            // Probe rate 1.0 exercises the cross-session path as hard as
            // possible
            let config = ResonanceConfig {
                cross_session_probe_rate: 1.0,
                ..Default::default()
            };
            let max = config.max_questions_per_session;
            let engine = FeedbackEngine::new(config.clone());

            // A second session keeps the insight board supplied with
            // multi-session themes
            engine
                .process_inbound("other", "the app crashes constantly")
                .await
                .unwrap();

            for idx in indices {
                engine.process_inbound("chat-x", MESSAGES[idx]).await.unwrap();
                let context = engine.get_context("chat-x").await.unwrap();

                if context.questions_asked >= max {
                    prop_assert!(!context.should_probe);
                }

                // Reply the way the production flow would
                let reply = if let Some(probe) = context.cross_session_probe {
                    probe
                } else if context.should_probe {
                    engine
                        .next_probe("chat-x")
                        .await
                        .unwrap_or_else(|| fallback_reply(context.state, &config))
                } else {
                    fallback_reply(context.state, &config)
                };
                engine.mark_outbound_sent("chat-x", &reply).await;

                let session = engine.get_session("chat-x").await.unwrap();
                prop_assert!(session.questions_asked <= max);
            }
            Ok(())
        })?;
    }

    /// Insight counters only ever grow, and affected-session counts never
    /// exceed the number of distinct reporting sessions.
    #[test]
    fn insight_counters_are_monotone(
        events in proptest::collection::vec((0usize..3, 0usize..MESSAGES.len()), 1..40)
    ) {
        let rt = runtime();
        rt.block_on(async {
            let engine = FeedbackEngine::new(ResonanceConfig::default());
            let sessions = ["chat-a", "chat-b", "chat-c"];
            let mut previous: HashMap<String, (u32, usize)> = HashMap::new();

            for (session_idx, msg_idx) in events {
                engine
                    .process_inbound(sessions[session_idx], MESSAGES[msg_idx])
                    .await
                    .unwrap();

                let stats = engine.get_stats().await;
                for (theme, summary) in &stats.insights {
                    prop_assert!(summary.affected_sessions <= sessions.len());
                    if let Some((freq, affected)) = previous.get(theme) {
                        prop_assert!(summary.frequency_count >= *freq);
                        prop_assert!(summary.affected_sessions >= *affected);
                    }
                    previous.insert(
                        theme.clone(),
                        (summary.frequency_count, summary.affected_sessions),
                    );
                }
            }
            Ok(())
        })?;
    }
}
