//! Common imports for typical client usage.
//!
//! This module intentionally exports the most frequently used session and
//! transport types so application code needs fewer import lines.
pub use crate::{
    Agent, ChatResponse, ChatSession, ChatStreamError, HttpTransport, HttpTransportConfig, Intent,
    NoToken, SessionStatus, StartOptions, StaticToken, TokenSource, Transport, UserProfile,
};
