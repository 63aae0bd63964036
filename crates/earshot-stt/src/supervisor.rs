//! Streaming transcription session supervisor
//!
//! Owns the lifecycle of the single engine session: start, feed, staleness
//! tracking, graceful finalize, and watchdog recovery when the engine stops
//! producing terminal events. All timers are `Instant` deadlines checked in
//! `pump`, so behavior under a virtual clock matches production exactly.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::engine::TranscriptionEngine;
use crate::types::{SessionId, TranscriptEvent};

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Time since the transcript last *changed* before the session counts
    /// as stale.
    pub staleness_window: Duration,
    /// Hard backstop: tear down and restart if no qualifying event within
    /// this bound. Correctness must not depend on the engine's own
    /// liveness guarantees.
    pub watchdog_timeout: Duration,
    /// Gap between a Final and the next session, so the following
    /// utterance's onset is not truncated.
    pub restart_delay: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            staleness_window: Duration::from_millis(2_000),
            watchdog_timeout: Duration::from_secs(8),
            restart_delay: Duration::from_millis(200),
        }
    }
}

/// Counters kept by the supervisor for status reporting.
#[derive(Debug, Clone, Default)]
pub struct SupervisorMetrics {
    pub partial_count: u64,
    pub final_count: u64,
    pub error_count: u64,
    pub restart_count: u64,
    pub watchdog_fires: u64,
}

/// Coarse session phase, exposed for wiring and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Inactive,
    Active,
    Finalizing,
}

#[derive(Debug)]
struct SessionTrack {
    session: SessionId,
    /// Last time the transcript text changed; the staleness clock.
    last_update: Instant,
    last_text: String,
}

enum SessionState {
    Inactive,
    Active(SessionTrack),
    /// `end_audio` was requested; waiting for the engine's Final.
    Finalizing(SessionTrack),
}

pub struct SessionSupervisor<E: TranscriptionEngine> {
    engine: E,
    state: SessionState,
    watchdog_deadline: Option<Instant>,
    restart_deadline: Option<Instant>,
    cfg: SupervisorConfig,
    metrics: SupervisorMetrics,
}

impl<E: TranscriptionEngine> SessionSupervisor<E> {
    pub fn new(engine: E, cfg: SupervisorConfig) -> Self {
        Self {
            engine,
            state: SessionState::Inactive,
            watchdog_deadline: None,
            restart_deadline: None,
            cfg,
            metrics: SupervisorMetrics::default(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state {
            SessionState::Inactive => SessionPhase::Inactive,
            SessionState::Active(_) => SessionPhase::Active,
            SessionState::Finalizing(_) => SessionPhase::Finalizing,
        }
    }

    pub fn metrics(&self) -> SupervisorMetrics {
        self.metrics.clone()
    }

    /// Open a session, tearing down any existing one first. Exactly one
    /// session exists after this returns Ok.
    pub fn start(&mut self, now: Instant) -> Result<(), crate::types::SttError> {
        self.teardown_current();
        let session = self.engine.open()?;
        debug!(?session, "Transcription session opened");
        self.state = SessionState::Active(SessionTrack {
            session,
            last_update: now,
            last_text: String::new(),
        });
        self.watchdog_deadline = Some(now + self.cfg.watchdog_timeout);
        self.restart_deadline = None;
        Ok(())
    }

    /// Forward audio to the active session. No-op while `Inactive`, and
    /// dropped while `Finalizing` (audio input already ended).
    pub fn feed(&mut self, samples: &[f32], now: Instant) {
        let session = match &self.state {
            SessionState::Active(track) => track.session,
            _ => return,
        };
        if let Err(e) = self.engine.feed(session, samples) {
            warn!("Feeding transcription session failed: {}; restarting", e);
            self.metrics.error_count += 1;
            self.teardown_current();
            self.start_or_defer(now);
        }
    }

    /// Re-arm the watchdog. Called whenever the detector sees speech.
    pub fn note_speech(&mut self, now: Instant) {
        if !matches!(self.state, SessionState::Inactive) {
            self.watchdog_deadline = Some(now + self.cfg.watchdog_timeout);
        }
    }

    /// End audio input without cancelling, so the engine can still deliver
    /// its Final. Used when the detector decides speech has ended before
    /// the engine does.
    pub fn force_finalize(&mut self, now: Instant) {
        let state = std::mem::replace(&mut self.state, SessionState::Inactive);
        match state {
            SessionState::Active(track) => {
                debug!(session = ?track.session, "Requesting finalization");
                match self.engine.end_audio(track.session) {
                    Ok(()) => self.state = SessionState::Finalizing(track),
                    Err(e) => {
                        warn!("end_audio failed: {}; restarting session", e);
                        self.metrics.error_count += 1;
                        let _ = self.engine.cancel(track.session);
                        self.start_or_defer(now);
                    }
                }
            }
            other => self.state = other,
        }
    }

    /// True iff a session exists and its transcript has not changed for
    /// longer than the staleness window.
    pub fn is_stale(&self, now: Instant) -> bool {
        match &self.state {
            SessionState::Active(track) | SessionState::Finalizing(track) => {
                now.saturating_duration_since(track.last_update) > self.cfg.staleness_window
            }
            SessionState::Inactive => false,
        }
    }

    /// True iff the current session has produced non-blank transcript text.
    pub fn has_partial_text(&self) -> bool {
        match &self.state {
            SessionState::Active(track) | SessionState::Finalizing(track) => {
                !track.last_text.trim().is_empty()
            }
            SessionState::Inactive => false,
        }
    }

    /// Drain engine events and fire due deadlines. Called once per worker
    /// tick. Returns finalized utterance texts, at most one per Final.
    pub fn pump(&mut self, now: Instant) -> Vec<String> {
        let mut finals = Vec::new();

        loop {
            let session = match &self.state {
                SessionState::Active(track) | SessionState::Finalizing(track) => track.session,
                SessionState::Inactive => break,
            };
            let Some(event) = self.engine.poll_event(session) else {
                break;
            };
            match event {
                TranscriptEvent::Partial { text } => {
                    self.metrics.partial_count += 1;
                    if let SessionState::Active(track) | SessionState::Finalizing(track) =
                        &mut self.state
                    {
                        if text != track.last_text {
                            track.last_update = now;
                            track.last_text = text;
                        }
                    }
                }
                TranscriptEvent::Final { text } => {
                    self.metrics.final_count += 1;
                    info!(len = text.len(), "Transcription finalized");
                    self.state = SessionState::Inactive;
                    self.watchdog_deadline = None;
                    self.restart_deadline = Some(now + self.cfg.restart_delay);
                    finals.push(text);
                }
                TranscriptEvent::Error { message } => {
                    warn!("Transcription engine error: {}; restarting", message);
                    self.metrics.error_count += 1;
                    self.teardown_current();
                    self.start_or_defer(now);
                }
            }
        }

        if self.restart_deadline.is_some_and(|d| now >= d) {
            self.restart_deadline = None;
            self.start_or_defer(now);
        }

        if self.watchdog_deadline.is_some_and(|d| now >= d) {
            warn!("Session watchdog expired; forcing restart");
            self.metrics.watchdog_fires += 1;
            self.teardown_current();
            self.start_or_defer(now);
        }

        finals
    }

    /// Cancel any session without waiting for a Final and clear all
    /// deadlines. Accumulated partial text is discarded.
    pub fn stop(&mut self) {
        self.teardown_current();
        self.watchdog_deadline = None;
        self.restart_deadline = None;
    }

    fn teardown_current(&mut self) {
        let state = std::mem::replace(&mut self.state, SessionState::Inactive);
        if let SessionState::Active(track) | SessionState::Finalizing(track) = state {
            debug!(session = ?track.session, "Cancelling transcription session");
            if let Err(e) = self.engine.cancel(track.session) {
                warn!("Cancel failed: {}", e);
            }
        }
        self.watchdog_deadline = None;
    }

    fn start_or_defer(&mut self, now: Instant) {
        match self.start(now) {
            Ok(()) => self.metrics.restart_count += 1,
            Err(e) => {
                warn!("Session restart failed: {}; retrying shortly", e);
                self.restart_deadline = Some(now + self.cfg.restart_delay);
            }
        }
    }
}
