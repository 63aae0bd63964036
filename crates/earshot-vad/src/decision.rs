use crate::classify::{is_silence_label, is_speech_label};
use crate::config::VadConfig;

/// Everything known about one classifier window at decision time.
///
/// `has_partial_text` and `transcript_stale` come from the transcription
/// session supervisor; the rest is local to the window.
#[derive(Debug, Clone, Copy)]
pub struct WindowSignals<'a> {
    pub label: &'a str,
    pub rms: f32,
    pub has_partial_text: bool,
    pub transcript_stale: bool,
}

/// Fused per-window speech decision.
///
/// The branch ordering here is the contract:
/// 1. A silence label combined with near-zero energy overrides everything.
/// 2. A transcript that exists but has stopped changing for longer than the
///    staleness window means the speaker has gone quiet, even though the
///    engine has not finalized yet.
/// 3. Otherwise a live transcript counts as speech on its own (the engine's
///    acoustic judgment spans more context than one window), and failing
///    that, a speech-like label above the volume floor does.
pub fn is_valid_speech(signals: &WindowSignals, cfg: &VadConfig) -> bool {
    if is_silence_label(signals.label) && signals.rms < cfg.very_low_volume {
        return false;
    }
    if signals.has_partial_text && signals.transcript_stale {
        return false;
    }
    signals.has_partial_text || (is_speech_label(signals.label) && signals.rms > cfg.min_volume)
}
