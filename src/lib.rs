//! Streaming chat client for the patient health assistant backend.
//!
//! Consumes the backend's newline-delimited `data: `-prefixed JSON stream,
//! folds the chunks into one evolving response text, and manages the
//! lifecycle of each "ask a question, stream an answer" attempt: incremental
//! callbacks, cooperative cancellation, an emergency-keyword fast path, and a
//! fixed fallback response when the backend is unreachable.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use health_chat_stream::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ChatStreamError> {
//! let transport = Arc::new(HttpTransport::new(
//!     HttpTransportConfig::new("https://api.example.com"),
//!     Arc::new(NoToken),
//! )?);
//!
//! let session = ChatSession::new(transport);
//! let response = session
//!     .start(
//!         "What should I eat after a workout?",
//!         StartOptions::new()
//!             .profile(UserProfile::Patient)
//!             .on_chunk(|text, is_complete| {
//!                 if !is_complete {
//!                     println!("so far: {text}");
//!                 }
//!             }),
//!     )
//!     .await?;
//!
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

/// Agent identifiers and the fixed agent-to-intent mapping.
pub mod agent;
/// The per-attempt chunk fold.
pub mod aggregate;
/// Wire chunk record and text extraction.
pub mod chunk;
/// Public error types used by the client API.
pub mod errors;
/// reqwest-backed transport and the bearer-token seam.
pub mod http;
/// Common imports for typical usage.
pub mod prelude;
/// Request body and user profile sent to the backend.
pub mod request;
/// Fixed emergency/fallback string tables and the keyword scan.
pub mod safety;
/// Stream session controller: start, cancel, reset.
pub mod session;
mod sse;
/// The transport capability the session controller depends on.
pub mod transport;

pub use agent::{Agent, Intent};
pub use aggregate::AggregationState;
pub use chunk::{ChunkMetadata, ChunkStatus, StreamChunk};
pub use errors::{ChatStreamError, TransportError};
pub use http::{HttpTransport, HttpTransportConfig, NoToken, StaticToken, TokenSource};
pub use request::{ChatRequest, UserProfile};
pub use safety::{EMERGENCY_RESPONSE, FALLBACK_RESPONSE};
pub use session::{ChatResponse, ChatSession, ChunkCallback, ErrorCallback, SessionStatus, StartOptions};
pub use transport::{ByteStream, Transport};
