use std::time::Instant;

use crate::config::VadConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadState {
    Idle,
    Collecting,
}

/// Outcome of one window evaluation, for the caller to act on.
///
/// The state machine never talks to the session supervisor itself; the
/// worker loop that owns both turns `SpeechStart`/`SpeechOngoing` into
/// watchdog re-arms and `SpeechEnd` into a force-finalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadTransition {
    SpeechStart,
    SpeechOngoing,
    SpeechEnd,
    Quiet,
}

/// Segmentation state machine over per-window speech decisions.
///
/// Time is passed in explicitly so transitions are deterministic under a
/// virtual clock.
pub struct VadStateMachine {
    state: VadState,
    last_speech: Option<Instant>,
    silence_timeout: std::time::Duration,
}

impl VadStateMachine {
    pub fn new(config: &VadConfig) -> Self {
        Self {
            state: VadState::Idle,
            last_speech: None,
            silence_timeout: config.silence_timeout(),
        }
    }

    pub fn current_state(&self) -> VadState {
        self.state
    }

    /// Feed one window's fused speech decision.
    pub fn observe(&mut self, valid_speech: bool, now: Instant) -> VadTransition {
        match self.state {
            VadState::Idle => {
                if valid_speech {
                    self.state = VadState::Collecting;
                    self.last_speech = Some(now);
                    VadTransition::SpeechStart
                } else {
                    VadTransition::Quiet
                }
            }
            VadState::Collecting => {
                if valid_speech {
                    self.last_speech = Some(now);
                    return VadTransition::SpeechOngoing;
                }
                // last_speech is always Some while Collecting.
                let since_speech = self
                    .last_speech
                    .map(|t| now.saturating_duration_since(t))
                    .unwrap_or_default();
                if since_speech >= self.silence_timeout {
                    self.state = VadState::Idle;
                    self.last_speech = None;
                    VadTransition::SpeechEnd
                } else {
                    VadTransition::SpeechOngoing
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = VadState::Idle;
        self.last_speech = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn machine() -> VadStateMachine {
        VadStateMachine::new(&VadConfig::default())
    }

    #[test]
    fn starts_idle() {
        assert_eq!(machine().current_state(), VadState::Idle);
    }

    #[test]
    fn idle_stays_idle_without_speech() {
        let mut sm = machine();
        let mut now = Instant::now();
        for _ in 0..10 {
            assert_eq!(sm.observe(false, now), VadTransition::Quiet);
            assert_eq!(sm.current_state(), VadState::Idle);
            now += Duration::from_millis(975);
        }
    }

    #[test]
    fn speech_starts_collection() {
        let mut sm = machine();
        let now = Instant::now();
        assert_eq!(sm.observe(true, now), VadTransition::SpeechStart);
        assert_eq!(sm.current_state(), VadState::Collecting);
    }

    #[test]
    fn brief_pause_does_not_end_segment() {
        let mut sm = machine();
        let mut now = Instant::now();
        sm.observe(true, now);

        // 1 s of silence windows, under the 1.5 s timeout.
        now += Duration::from_millis(975);
        assert_eq!(sm.observe(false, now), VadTransition::SpeechOngoing);
        assert_eq!(sm.current_state(), VadState::Collecting);

        // Speech resumes and resets the silence clock.
        now += Duration::from_millis(975);
        assert_eq!(sm.observe(true, now), VadTransition::SpeechOngoing);
        assert_eq!(sm.current_state(), VadState::Collecting);
    }

    #[test]
    fn silence_timeout_ends_segment_exactly_once() {
        let mut sm = machine();
        let mut now = Instant::now();
        sm.observe(true, now);

        now += Duration::from_millis(975);
        assert_eq!(sm.observe(false, now), VadTransition::SpeechOngoing);
        now += Duration::from_millis(975);
        // 1.95 s since last speech, past the timeout.
        assert_eq!(sm.observe(false, now), VadTransition::SpeechEnd);
        assert_eq!(sm.current_state(), VadState::Idle);

        // Further silence produces no second end event.
        now += Duration::from_millis(975);
        assert_eq!(sm.observe(false, now), VadTransition::Quiet);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut sm = machine();
        sm.observe(true, Instant::now());
        sm.reset();
        assert_eq!(sm.current_state(), VadState::Idle);
    }
}
