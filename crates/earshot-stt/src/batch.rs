//! Adapter for batch acoustic-model engines.
//!
//! Some recognizers only expose a one-shot "samples in, text out" call.
//! `BatchEngine` buffers fed audio and emits a single synthetic `Final`
//! when audio input ends, so the supervisor drives batch and streaming
//! engines through the same interface.

use std::collections::VecDeque;

use crate::engine::TranscriptionEngine;
use crate::types::{SessionId, SttError, TranscriptEvent};

/// One-shot transcriber over a complete utterance buffer.
pub trait BatchTranscriber: Send {
    fn transcribe(&mut self, samples: &[f32]) -> Result<String, SttError>;
}

pub struct BatchEngine<T: BatchTranscriber> {
    transcriber: T,
    next_id: u64,
    open_session: Option<SessionId>,
    buffer: Vec<f32>,
    pending: VecDeque<(SessionId, TranscriptEvent)>,
}

impl<T: BatchTranscriber> BatchEngine<T> {
    pub fn new(transcriber: T) -> Self {
        Self {
            transcriber,
            next_id: 0,
            open_session: None,
            buffer: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    fn require_open(&self, session: SessionId) -> Result<(), SttError> {
        if self.open_session == Some(session) {
            Ok(())
        } else {
            Err(SttError::UnknownSession(session))
        }
    }
}

impl<T: BatchTranscriber> TranscriptionEngine for BatchEngine<T> {
    fn open(&mut self) -> Result<SessionId, SttError> {
        self.next_id += 1;
        let session = SessionId(self.next_id);
        self.open_session = Some(session);
        self.buffer.clear();
        Ok(session)
    }

    fn feed(&mut self, session: SessionId, samples: &[f32]) -> Result<(), SttError> {
        self.require_open(session)?;
        self.buffer.extend_from_slice(samples);
        Ok(())
    }

    fn end_audio(&mut self, session: SessionId) -> Result<(), SttError> {
        self.require_open(session)?;
        let audio = std::mem::take(&mut self.buffer);
        let event = match self.transcriber.transcribe(&audio) {
            Ok(text) => TranscriptEvent::Final { text },
            Err(e) => TranscriptEvent::Error {
                message: e.to_string(),
            },
        };
        self.pending.push_back((session, event));
        self.open_session = None;
        Ok(())
    }

    fn cancel(&mut self, session: SessionId) -> Result<(), SttError> {
        if self.open_session == Some(session) {
            self.open_session = None;
            self.buffer.clear();
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
