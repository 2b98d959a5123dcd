/// Accumulation policy tag carried by each wire record.
///
/// Anything other than `new_message` resolves to "replace" semantics; the
/// variants are kept distinct so the aggregator can document the contract
/// per status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStatus {
    /// Incremental update. The backend sends the full text-so-far on every
    /// `streaming` record, not a delta, so this still replaces.
    Streaming,
    /// Intermediate processing notice.
    Processing,
    /// Authoritative final text for the response.
    Complete,
    /// Start of a distinct message within the same logical response.
    NewMessage,
    /// Unrecognized status; treated the same as `complete`.
    #[serde(other)]
    Other,
}

/// Router metadata attached to a chunk.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
pub struct ChunkMetadata {
    /// Ordered handler names chosen by the backend router for this query.
    #[serde(rename = "routedTo", default)]
    pub routed_to: Vec<String>,
}

/// One decoded record of the streaming wire protocol.
///
/// Exactly one of `content`/`answer`/`response` is populated in practice,
/// but all three are checked; see [`StreamChunk::text`].
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
pub struct StreamChunk {
    pub content: Option<String>,
    pub answer: Option<String>,
    pub response: Option<String>,
    pub status: Option<ChunkStatus>,
    #[serde(rename = "agentType")]
    pub agent_type: Option<String>,
    #[serde(default)]
    pub metadata: ChunkMetadata,
    /// Terminal in-band error; when set, the chunk fails the whole attempt
    /// regardless of its other fields.
    pub error: Option<String>,
}

impl StreamChunk {
    /// Extracts the chunk's text payload with a fixed fallback order:
    /// `content`, then `answer`, then `response`.
    pub fn text(&self) -> Option<&str> {
        self.content
            .as_deref()
            .or(self.answer.as_deref())
            .or(self.response.as_deref())
    }
}
