use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;

use crate::errors::TransportError;
use crate::request::ChatRequest;

/// Raw response body as an async byte stream.
///
/// `Pin<Box<...>>` so implementations can be swapped behind dynamic dispatch.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send + 'static>>;

/// Capability for opening one streaming chat response.
///
/// The session controller depends only on this seam, so any HTTP client (or
/// a scripted fake in tests) can stand in for the real backend. Cancellation
/// is cooperative and owned by the controller; dropping the returned stream
/// aborts the underlying request.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request and returns the open response body stream.
    ///
    /// Fails on network errors and non-success HTTP statuses; never retries.
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream, TransportError>;
}
