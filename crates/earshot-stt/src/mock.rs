//! Scripted engine for deterministic supervisor and pipeline tests.
//!
//! Tests hold a `ScriptHandle` to queue events and inspect the recorded
//! call order while the supervisor owns the engine itself.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::TranscriptionEngine;
use crate::types::{SessionId, SttError, TranscriptEvent};

#[derive(Default)]
struct ScriptInner {
    next_id: u64,
    open_session: Option<SessionId>,
    calls: Vec<String>,
    events: VecDeque<(SessionId, TranscriptEvent)>,
    fail_open: bool,
    samples_fed: u64,
}

pub struct ScriptedEngine {
    inner: Arc<Mutex<ScriptInner>>,
}

#[derive(Clone)]
pub struct ScriptHandle {
    inner: Arc<Mutex<ScriptInner>>,
}

impl ScriptedEngine {
    pub fn new() -> (Self, ScriptHandle) {
        let inner = Arc::new(Mutex::new(ScriptInner::default()));
        (
            Self {
                inner: inner.clone(),
            },
            ScriptHandle { inner },
        )
    }
}

impl ScriptHandle {
    /// Queue an event for the currently open session.
    pub fn push_event(&self, event: TranscriptEvent) {
        let mut inner = self.inner.lock();
        let session = inner
            .open_session
            .expect("no open session to push an event to");
        inner.events.push_back((session, event));
    }

    pub fn push_event_for(&self, session: SessionId, event: TranscriptEvent) {
        self.inner.lock().events.push_back((session, event));
    }

    pub fn current_session(&self) -> Option<SessionId> {
        self.inner.lock().open_session
    }

    /// Recorded engine calls, in order, e.g. `["open#1", "feed#1", "cancel#1"]`.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().calls.clone()
    }

    pub fn samples_fed(&self) -> u64 {
        self.inner.lock().samples_fed
    }

    /// Make the next `open` calls fail, to exercise restart deferral.
    pub fn set_fail_open(&self, fail: bool) {
        self.inner.lock().fail_open = fail;
    }
}

impl TranscriptionEngine for ScriptedEngine {
    fn open(&mut self) -> Result<SessionId, SttError> {
        let mut inner = self.inner.lock();
        if inner.fail_open {
            inner.calls.push("open!fail".to_string());
            return Err(SttError::Unavailable("scripted open failure".into()));
        }
        inner.next_id += 1;
        let session = SessionId(inner.next_id);
        inner.open_session = Some(session);
        inner.calls.push(format!("open#{}", session.0));
        Ok(session)
    }

    fn feed(&mut self, session: SessionId, samples: &[f32]) -> Result<(), SttError> {
        let mut inner = self.inner.lock();
        if inner.open_session != Some(session) {
            return Err(SttError::UnknownSession(session));
        }
        inner.samples_fed += samples.len() as u64;
        inner.calls.push(format!("feed#{}", session.0));
        Ok(())
    }

    fn end_audio(&mut self, session: SessionId) -> Result<(), SttError> {
        let mut inner = self.inner.lock();
        if inner.open_session != Some(session) {
            return Err(SttError::UnknownSession(session));
        }
        inner.calls.push(format!("end_audio#{}", session.0));
        Ok(())
    }

    fn cancel(&mut self, session: SessionId) -> Result<(), SttError> {
        let mut inner = self.inner.lock();
        inner.calls.push(format!("cancel#{}", session.0));
        if inner.open_session == Some(session) {
            inner.open_session = None;
            // Cancelled sessions deliver nothing further.
            inner.events.retain(|(s, _)| *s != session);
        }
        Ok(())
    }

    fn poll_event(&mut self, session: SessionId) -> Option<TranscriptEvent> {
        let mut inner = self.inner.lock();
        if inner.events.front().map(|(s, _)| *s) == Some(session) {
            return inner.events.pop_front().map(|(_, ev)| ev);
        }
        None
    }
}
