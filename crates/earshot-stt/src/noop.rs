//! Placeholder engine so the pipeline can run end to end with no real
//! recognizer attached. Accepts audio and finalizes with empty text, which
//! the dispatcher then filters out.

use std::collections::VecDeque;

use crate::engine::TranscriptionEngine;
use crate::types::{SessionId, SttError, TranscriptEvent};

#[derive(Default)]
pub struct NoopEngine {
    next_id: u64,
    open_session: Option<SessionId>,
    pending: VecDeque<(SessionId, TranscriptEvent)>,
}

impl NoopEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TranscriptionEngine for NoopEngine {
    fn open(&mut self) -> Result<SessionId, SttError> {
        self.next_id += 1;
        let session = SessionId(self.next_id);
        self.open_session = Some(session);
        Ok(session)
    }

    fn feed(&mut self, session: SessionId, _samples: &[f32]) -> Result<(), SttError> {
        if self.open_session == Some(session) {
            Ok(())
        } else {
            Err(SttError::UnknownSession(session))
        }
    }

    fn end_audio(&mut self, session: SessionId) -> Result<(), SttError> {
        if self.open_session != Some(session) {
            return Err(SttError::UnknownSession(session));
        }
        self.pending
            .push_back((session, TranscriptEvent::Final { text: String::new() }));
        self.open_session = None;
        Ok(())
    }

    fn cancel(&mut self, session: SessionId) -> Result<(), SttError> {
        if self.open_session == Some(session) {
            self.open_session = None;
        }
        self.pending.retain(|(s, _)| *s != session);
        Ok(())
    }

    fn poll_event(&mut self, session: SessionId) -> Option<TranscriptEvent> {
        if self.pending.front().map(|(s, _)| *s) == Some(session) {
            return self.pending.pop_front().map(|(_, ev)| ev);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalizes_with_empty_text() {
        let mut engine = NoopEngine::new();
        let session = engine.open().unwrap();
        engine.feed(session, &[0.1; 256]).unwrap();
        engine.end_audio(session).unwrap();
        assert_eq!(
            engine.poll_event(session),
            Some(TranscriptEvent::Final { text: String::new() })
        );
    }
}
