use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::StreamExt as _;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::agent::{Agent, Intent};
use crate::aggregate::AggregationState;
use crate::errors::ChatStreamError;
use crate::request::{ChatRequest, UserProfile};
use crate::safety;
use crate::sse::chunk_stream;
use crate::transport::Transport;

/// Callback invoked with the accumulated text after every chunk that changes
/// it, and once more with `is_complete = true` at normal termination.
pub type ChunkCallback = Box<dyn FnMut(&str, bool) + Send>;

/// Callback invoked once on terminal failure. Never invoked on cancellation.
pub type ErrorCallback = Box<dyn FnOnce(&ChatStreamError) + Send>;

/// Lifecycle state of a [`ChatSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Streaming,
    Success,
    Cancelled,
    Error,
}

/// Terminal result of one stream attempt.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ChatResponse {
    /// Final response text (or a fixed template on the fast/fallback paths).
    pub content: String,
    /// Intents derived from the detected agents.
    pub intents: Vec<Intent>,
    /// Backend agents that handled the query.
    pub agents: Vec<Agent>,
    /// `1.0` for streamed and emergency responses, `0.0` for the
    /// network-failure fallback.
    pub confidence: f64,
    /// True when the content was synthesized locally rather than streamed.
    pub is_direct_response: bool,
    /// True only for the emergency fast path.
    pub is_emergency: bool,
}

/// Per-attempt options and callbacks for [`ChatSession::start`].
#[derive(Default)]
pub struct StartOptions {
    user_id: Option<String>,
    room_id: Option<String>,
    profile: UserProfile,
    on_chunk: Option<ChunkCallback>,
    on_error: Option<ErrorCallback>,
}

impl StartOptions {
    /// Creates empty options with the default profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the user identifier sent with the request.
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Sets the chat room identifier sent with the request.
    pub fn room_id(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }

    /// Sets the user profile sent with the request.
    pub fn profile(mut self, profile: UserProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Registers the incremental text callback.
    pub fn on_chunk(mut self, callback: impl FnMut(&str, bool) + Send + 'static) -> Self {
        self.on_chunk = Some(Box::new(callback));
        self
    }

    /// Registers the terminal failure callback.
    pub fn on_error(mut self, callback: impl FnOnce(&ChatStreamError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }
}

struct SessionState {
    status: SessionStatus,
    cancel: Option<watch::Sender<bool>>,
    last_error: Option<ChatStreamError>,
    // Monotonic attempt counter; a finished attempt only writes its terminal
    // state back if no newer attempt has started since.
    epoch: u64,
}

/// Controller for one logical "ask a question, stream an answer" surface.
///
/// Owns the cancellation token for the in-flight attempt and guarantees at
/// most one active stream per instance: starting while streaming cancels the
/// prior attempt first (last call wins). Instances are independent, so one
/// can be created per chat room.
pub struct ChatSession {
    transport: Arc<dyn Transport>,
    session_id: uuid::Uuid,
    state: Mutex<SessionState>,
}

impl ChatSession {
    /// Creates an idle session over the given transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            session_id: uuid::Uuid::new_v4(),
            state: Mutex::new(SessionState {
                status: SessionStatus::Idle,
                cancel: None,
                last_error: None,
                epoch: 0,
            }),
        }
    }

    /// Returns the logical session identifier sent with every request.
    pub fn session_id(&self) -> uuid::Uuid {
        self.session_id
    }

    /// Returns the current lifecycle state.
    pub fn status(&self) -> SessionStatus {
        self.state().status
    }

    /// Returns the retained error from the last failed attempt, if any.
    pub fn last_error(&self) -> Option<ChatStreamError> {
        self.state().last_error.clone()
    }

    /// Requests cooperative cancellation of the in-flight attempt.
    ///
    /// Idempotent; a no-op when nothing is streaming. The transport observes
    /// the signal at its next read boundary, and no further chunk callbacks
    /// fire for the attempt afterwards.
    pub fn cancel(&self) {
        let state = self.state();
        if let Some(cancel) = &state.cancel {
            debug!(session_id = %self.session_id, "cancellation requested");
            let _ = cancel.send(true);
        }
    }

    /// Returns the session to `Idle`, cancelling any in-flight attempt and
    /// clearing the retained error. Idempotent.
    pub fn reset(&self) {
        let mut state = self.state();
        if let Some(cancel) = state.cancel.take() {
            let _ = cancel.send(true);
        }
        // Take ownership of the session state away from the cancelled
        // attempt so its terminal write-back is discarded.
        state.epoch += 1;
        state.status = SessionStatus::Idle;
        state.last_error = None;
    }

    /// Drives one full attempt end to end.
    ///
    /// Resolves with the terminal [`ChatResponse`] on success, on the
    /// emergency fast path, and on transport failure (where the content is
    /// the fixed fallback template and `on_error` has been invoked for
    /// logging). Rejects with [`ChatStreamError::Backend`] on an in-band
    /// error record and with [`ChatStreamError::Cancelled`] when cancelled.
    pub async fn start(
        &self,
        query: &str,
        mut options: StartOptions,
    ) -> Result<ChatResponse, ChatStreamError> {
        if query.trim().is_empty() {
            return Err(ChatStreamError::Validation(
                "query must not be empty".into(),
            ));
        }

        // Last call wins: a live prior attempt is cancelled before anything
        // else, including the emergency fast path.
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let epoch = {
            let mut state = self.state();
            if let Some(previous) = state.cancel.take() {
                let _ = previous.send(true);
            }
            state.epoch += 1;
            state.cancel = Some(cancel_tx);
            state.status = SessionStatus::Streaming;
            state.last_error = None;
            state.epoch
        };

        if safety::detect_emergency(query) {
            debug!(session_id = %self.session_id, "emergency keyword matched, skipping backend");
            self.finish(epoch, SessionStatus::Success, None);
            return Ok(ChatResponse {
                content: safety::EMERGENCY_RESPONSE.to_string(),
                intents: vec![Intent::Emergency],
                agents: Vec::new(),
                confidence: 1.0,
                is_direct_response: true,
                is_emergency: true,
            });
        }

        let request = ChatRequest {
            query: query.to_string(),
            session_id: self.session_id,
            user_id: options.user_id.clone(),
            room_id: options.room_id.clone(),
            profile: options.profile,
        };
        debug!(session_id = %self.session_id, attempt = epoch, "starting chat stream attempt");

        let outcome = drive(
            self.transport.as_ref(),
            &request,
            &mut options.on_chunk,
            &mut cancel_rx,
        )
        .await;

        match outcome {
            Ok(response) => {
                debug!(session_id = %self.session_id, attempt = epoch, "chat stream completed");
                self.finish(epoch, SessionStatus::Success, None);
                Ok(response)
            }
            Err(ChatStreamError::Cancelled) => {
                // Cancellation resets to a clean slate: no retained error,
                // no on_error.
                debug!(session_id = %self.session_id, attempt = epoch, "chat stream cancelled");
                self.finish(epoch, SessionStatus::Cancelled, None);
                Err(ChatStreamError::Cancelled)
            }
            Err(err @ ChatStreamError::Transport(_)) => {
                // The UI always gets renderable content: substitute the fixed
                // fallback and surface the underlying error via on_error only.
                warn!(session_id = %self.session_id, attempt = epoch, error = %err, "transport failed, substituting fallback response");
                if let Some(on_error) = options.on_error.take() {
                    on_error(&err);
                }
                self.finish(epoch, SessionStatus::Error, Some(err));
                Ok(ChatResponse {
                    content: safety::FALLBACK_RESPONSE.to_string(),
                    intents: Vec::new(),
                    agents: Vec::new(),
                    confidence: 0.0,
                    is_direct_response: true,
                    is_emergency: false,
                })
            }
            Err(err) => {
                debug!(session_id = %self.session_id, attempt = epoch, error = %err, "chat stream failed");
                if let Some(on_error) = options.on_error.take() {
                    on_error(&err);
                }
                self.finish(epoch, SessionStatus::Error, Some(err.clone()));
                Err(err)
            }
        }
    }

    fn finish(&self, epoch: u64, status: SessionStatus, error: Option<ChatStreamError>) {
        let mut state = self.state();
        if state.epoch != epoch {
            // A newer attempt owns the session state now.
            return;
        }
        state.cancel = None;
        state.status = status;
        state.last_error = error;
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn drive(
    transport: &dyn Transport,
    request: &ChatRequest,
    on_chunk: &mut Option<ChunkCallback>,
    cancel_rx: &mut watch::Receiver<bool>,
) -> Result<ChatResponse, ChatStreamError> {
    let bytes = tokio::select! {
        biased;
        _ = cancelled(cancel_rx) => return Err(ChatStreamError::Cancelled),
        opened = transport.open(request) => opened?,
    };

    let mut chunks = std::pin::pin!(chunk_stream(bytes));
    let mut aggregation = AggregationState::new();
    loop {
        // Biased so a requested cancellation always wins the race against a
        // chunk that is already in flight; the late chunk is dropped.
        tokio::select! {
            biased;
            _ = cancelled(cancel_rx) => return Err(ChatStreamError::Cancelled),
            next = chunks.next() => match next {
                Some(Ok(chunk)) => {
                    if aggregation.apply_chunk(&chunk)?
                        && let Some(callback) = on_chunk.as_mut()
                    {
                        callback(aggregation.text(), false);
                    }
                }
                Some(Err(err)) => return Err(ChatStreamError::Transport(err)),
                None => {
                    if let Some(callback) = on_chunk.as_mut() {
                        callback(aggregation.text(), true);
                    }
                    return Ok(ChatResponse {
                        content: aggregation.text().to_string(),
                        intents: aggregation.intents(),
                        agents: aggregation.agents().to_vec(),
                        confidence: 1.0,
                        is_direct_response: false,
                        is_emergency: false,
                    });
                }
            }
        }
    }
}

async fn cancelled(cancel_rx: &mut watch::Receiver<bool>) {
    loop {
        if *cancel_rx.borrow() {
            return;
        }
        if cancel_rx.changed().await.is_err() {
            // Sender dropped without signalling; nothing will ever cancel us.
            futures::future::pending::<()>().await;
        }
    }
}
