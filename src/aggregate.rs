use crate::agent::{Agent, Intent};
use crate::chunk::{ChunkStatus, StreamChunk};
use crate::errors::ChatStreamError;

/// Running fold of one stream attempt.
///
/// Owned by a single attempt and discarded at its terminal state; the fold is
/// pure so it can be tested without any I/O.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AggregationState {
    text: String,
    agents: Vec<Agent>,
}

impl AggregationState {
    /// Creates an empty state for a fresh attempt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current best rendering of the full response so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Deduplicated agents seen so far, in detection order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Intents derived from the detected agents, deduplicated in order.
    pub fn intents(&self) -> Vec<Intent> {
        let mut intents = Vec::new();
        for agent in &self.agents {
            let intent = agent.intent();
            if !intents.contains(&intent) {
                intents.push(intent);
            }
        }
        intents
    }

    /// Folds one chunk into the state.
    ///
    /// Returns whether the accumulated text changed (the caller only fires
    /// its chunk callback on a change). An in-band `error` field fails the
    /// attempt immediately; nothing from such a chunk is merged.
    pub fn apply_chunk(&mut self, chunk: &StreamChunk) -> Result<bool, ChatStreamError> {
        if let Some(message) = &chunk.error {
            return Err(ChatStreamError::Backend {
                message: message.clone(),
            });
        }

        if !chunk.metadata.routed_to.is_empty() {
            // The router emits one authoritative decision, so this replaces
            // any agents recorded earlier instead of appending.
            let mut routed = Vec::new();
            for name in &chunk.metadata.routed_to {
                if let Some(agent) = Agent::parse(name)
                    && !routed.contains(&agent)
                {
                    routed.push(agent);
                }
            }
            self.agents = routed;
        }

        // Single-agent flows never send routedTo; record the per-chunk
        // agent label as it appears.
        if let Some(raw) = &chunk.agent_type
            && let Some(agent) = Agent::parse(raw)
            && !self.agents.contains(&agent)
        {
            self.agents.push(agent);
        }

        let Some(payload) = chunk.text() else {
            return Ok(false);
        };

        let previous_len = self.text.len();
        let changed = match chunk.status {
            Some(ChunkStatus::NewMessage) => {
                if self.text.is_empty() {
                    self.text = payload.to_string();
                } else {
                    self.text.push_str("\n\n");
                    self.text.push_str(payload);
                }
                self.text.len() != previous_len
            }
            // `streaming` records carry the full text-so-far, not deltas, so
            // every non-new_message status resolves to replace.
            _ => {
                if self.text == payload {
                    false
                } else {
                    self.text = payload.to_string();
                    true
                }
            }
        };
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkMetadata;

    fn chunk_with_status(text: &str, status: Option<ChunkStatus>) -> StreamChunk {
        StreamChunk {
            content: Some(text.to_string()),
            status,
            ..StreamChunk::default()
        }
    }

    #[test]
    fn streaming_status_replaces_with_full_text_so_far() {
        let mut state = AggregationState::new();
        for (payload, expected) in [("A", "A"), ("AB", "AB"), ("ABC", "ABC")] {
            let changed = state
                .apply_chunk(&chunk_with_status(payload, Some(ChunkStatus::Streaming)))
                .expect("apply");
            assert!(changed);
            assert_eq!(state.text(), expected);
        }
    }

    #[test]
    fn new_message_concatenates_with_double_newline() {
        let mut state = AggregationState::new();
        state
            .apply_chunk(&chunk_with_status("hello", Some(ChunkStatus::Complete)))
            .expect("apply");
        state
            .apply_chunk(&chunk_with_status("world", Some(ChunkStatus::NewMessage)))
            .expect("apply");
        assert_eq!(state.text(), "hello\n\nworld");
    }

    #[test]
    fn new_message_into_empty_state_sets_directly() {
        let mut state = AggregationState::new();
        state
            .apply_chunk(&chunk_with_status("first", Some(ChunkStatus::NewMessage)))
            .expect("apply");
        assert_eq!(state.text(), "first");
    }

    #[test]
    fn absent_and_unknown_statuses_replace() {
        let mut state = AggregationState::new();
        state
            .apply_chunk(&chunk_with_status("partial", Some(ChunkStatus::Streaming)))
            .expect("apply");
        state
            .apply_chunk(&chunk_with_status("final", None))
            .expect("apply");
        assert_eq!(state.text(), "final");
        state
            .apply_chunk(&chunk_with_status("other", Some(ChunkStatus::Other)))
            .expect("apply");
        assert_eq!(state.text(), "other");
    }

    #[test]
    fn identical_replace_payload_reports_no_change() {
        let mut state = AggregationState::new();
        assert!(
            state
                .apply_chunk(&chunk_with_status("same", Some(ChunkStatus::Streaming)))
                .expect("apply")
        );
        assert!(
            !state
                .apply_chunk(&chunk_with_status("same", Some(ChunkStatus::Complete)))
                .expect("apply")
        );
    }

    #[test]
    fn routed_to_replaces_agents_and_filters_unknown() {
        let mut state = AggregationState::new();
        let chunk = StreamChunk {
            agent_type: Some("medical".into()),
            ..StreamChunk::default()
        };
        state.apply_chunk(&chunk).expect("apply");
        assert_eq!(state.agents(), &[Agent::Medical]);

        let chunk = StreamChunk {
            metadata: ChunkMetadata {
                routed_to: vec!["nutrition".into(), "unknown_agent".into()],
            },
            ..StreamChunk::default()
        };
        state.apply_chunk(&chunk).expect("apply");
        assert_eq!(state.agents(), &[Agent::Nutrition]);
        assert_eq!(state.intents(), vec![Intent::DietInfo]);
    }

    #[test]
    fn agent_type_appends_without_duplicates() {
        let mut state = AggregationState::new();
        for _ in 0..2 {
            let chunk = StreamChunk {
                agent_type: Some("nutrition".into()),
                ..StreamChunk::default()
            };
            state.apply_chunk(&chunk).expect("apply");
        }
        assert_eq!(state.agents(), &[Agent::Nutrition]);
    }

    #[test]
    fn intents_deduplicate_across_agents() {
        let mut state = AggregationState::new();
        let chunk = StreamChunk {
            metadata: ChunkMetadata {
                routed_to: vec!["router".into(), "general".into(), "nutrition".into()],
            },
            ..StreamChunk::default()
        };
        state.apply_chunk(&chunk).expect("apply");
        assert_eq!(state.intents(), vec![Intent::ChitChat, Intent::DietInfo]);
    }

    #[test]
    fn error_chunk_fails_without_merging() {
        let mut state = AggregationState::new();
        state
            .apply_chunk(&chunk_with_status("kept", Some(ChunkStatus::Complete)))
            .expect("apply");
        let chunk = StreamChunk {
            content: Some("ignored".into()),
            error: Some("backend exploded".into()),
            ..StreamChunk::default()
        };
        let err = state.apply_chunk(&chunk).expect_err("should fail");
        assert!(matches!(err, ChatStreamError::Backend { message } if message == "backend exploded"));
        assert_eq!(state.text(), "kept");
    }

    #[test]
    fn metadata_only_chunk_is_a_text_noop() {
        let mut state = AggregationState::new();
        let chunk = StreamChunk {
            agent_type: Some("quiz".into()),
            ..StreamChunk::default()
        };
        let changed = state.apply_chunk(&chunk).expect("apply");
        assert!(!changed);
        assert_eq!(state.text(), "");
        assert_eq!(state.agents(), &[Agent::Quiz]);
    }
}
