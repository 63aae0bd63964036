use crate::types::{SessionId, SttError, TranscriptEvent};

/// Interface to the external streaming transcription engine.
///
/// The session supervisor is the sole caller. Events are pulled with
/// `poll_event` rather than pushed over a channel so the supervisor's
/// single worker loop stays the only writer of session state, and so tests
/// can interleave events and clock advances deterministically.
pub trait TranscriptionEngine: Send {
    /// Open a new session. At most one session is open at a time; the
    /// supervisor cancels any prior session before calling this.
    fn open(&mut self) -> Result<SessionId, SttError>;

    /// Forward mono 16 kHz float samples to an open session.
    fn feed(&mut self, session: SessionId, samples: &[f32]) -> Result<(), SttError>;

    /// Request graceful finalization: stop accepting audio, let the engine
    /// emit its `Final` event in its own time.
    fn end_audio(&mut self, session: SessionId) -> Result<(), SttError>;

    /// Hard stop. No further events are expected from this session.
    fn cancel(&mut self, session: SessionId) -> Result<(), SttError>;

    /// Drain the next pending event for this session, if any. Non-blocking.
    fn poll_event(&mut self, session: SessionId) -> Option<TranscriptEvent>;
}
