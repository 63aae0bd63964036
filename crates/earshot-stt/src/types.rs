//! Core types for the transcription layer

use thiserror::Error;

/// Opaque handle to one engine session. Issued by `TranscriptionEngine::open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

/// Output of a streaming transcription session.
///
/// `Partial` events are superseded by later events for the same session;
/// a `Final` terminates the session that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEvent {
    /// Incremental result for the utterance in progress
    Partial { text: String },
    /// Terminal result; the session is over after this
    Final { text: String },
    /// Engine-side failure; the session is unusable
    Error { message: String },
}

#[derive(Error, Debug)]
pub enum SttError {
    #[error("Unknown session: {0:?}")]
    UnknownSession(SessionId),

    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    #[error("Engine failure: {0}")]
    Engine(String),
}
