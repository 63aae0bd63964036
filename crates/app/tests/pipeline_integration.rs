//! End-to-end pipeline tests with synthetic audio, a scripted label
//! sequence, and a scripted engine, all on a virtual clock.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use earshot_app::dispatch::{CollectingSink, Dispatcher};
use earshot_app::pipeline::{PipelineConfig, SpeechPipeline};
use earshot_audio::{CapturedFrame, DeviceConfig};
use earshot_foundation::clock::{test_clock, TestClock};
use earshot_stt::mock::{ScriptHandle, ScriptedEngine};
use earshot_stt::TranscriptEvent;
use earshot_telemetry::PipelineMetrics;
use earshot_vad::{ClassifyError, SoundClassifier, VadState, WINDOW_SIZE_SAMPLES};

/// Serves queued labels in order, then the fallback forever.
struct QueueClassifier {
    labels: Mutex<VecDeque<&'static str>>,
    fallback: &'static str,
}

impl QueueClassifier {
    fn new(labels: &[&'static str], fallback: &'static str) -> Self {
        Self {
            labels: Mutex::new(labels.iter().copied().collect()),
            fallback,
        }
    }
}

impl SoundClassifier for QueueClassifier {
    fn classify(&self, _window: &[f32]) -> Result<String, ClassifyError> {
        let label = self
            .labels
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);
        Ok(label.to_string())
    }
}

const WINDOW: Duration = Duration::from_millis(975);

/// i16 amplitudes chosen so the conditioned (gain + gate) window RMS lands
/// where the scenario needs it.
const AMP_SPEECH: i16 = 1_092; // conditioned rms ≈ 0.05
const AMP_FAINT: i16 = 109; // gated, conditioned rms ≈ 0.0005
const AMP_MODERATE: i16 = 2_185; // conditioned rms ≈ 0.1

struct Harness {
    pipeline: SpeechPipeline<QueueClassifier, ScriptedEngine>,
    engine: ScriptHandle,
    sink: CollectingSink,
    clock: Arc<TestClock>,
    metrics: Arc<PipelineMetrics>,
}

impl Harness {
    fn new(labels: &[&'static str], fallback: &'static str) -> Self {
        let clock = test_clock();
        let metrics = Arc::new(PipelineMetrics::new());
        let sink = CollectingSink::new();
        let (engine, handle) = ScriptedEngine::new();
        let dispatcher = Dispatcher::new(Box::new(sink.clone()), metrics.clone());
        let mut pipeline = SpeechPipeline::new(
            PipelineConfig::default(),
            DeviceConfig {
                sample_rate: 16_000,
                channels: 1,
            },
            QueueClassifier::new(labels, fallback),
            engine,
            dispatcher,
            clock.clone(),
            metrics.clone(),
        )
        .unwrap();
        pipeline.start().unwrap();
        Self {
            pipeline,
            engine: handle,
            sink,
            clock,
            metrics,
        }
    }

    /// Ingest one full classifier window of constant-amplitude audio, run
    /// a tick, and advance the clock by the window duration.
    fn step(&mut self, amplitude: i16) {
        let frame = CapturedFrame {
            samples: vec![amplitude; WINDOW_SIZE_SAMPLES],
            sample_rate: 16_000,
            channels: 1,
            timestamp: Instant::now(),
        };
        self.pipeline.ingest(&frame);
        self.pipeline.tick();
        self.clock.advance(WINDOW);
    }

    fn tick(&mut self) {
        self.pipeline.tick();
    }
}

#[test]
fn faint_silence_never_leaves_idle() {
    // ~3.9 s of windows classified Silence at rms ≈ 0.0005.
    let mut h = Harness::new(&[], "Silence");
    for _ in 0..4 {
        h.step(AMP_FAINT);
        assert_eq!(h.pipeline.vad_state(), VadState::Idle);
    }
    assert!(h.sink.texts().is_empty());
    let calls = h.engine.calls();
    assert!(!calls.iter().any(|c| c.starts_with("end_audio")));
    assert!(!calls.iter().any(|c| c.starts_with("cancel")));
}

#[test]
fn sub_timeout_gap_keeps_collecting() {
    // 2 windows of speech, 1 window of moderate-volume silence (~1 s,
    // under the 1.5 s timeout), speech resumes.
    let mut h = Harness::new(&["Speech", "Speech", "Silence", "Speech"], "Silence");
    h.step(AMP_SPEECH);
    assert_eq!(h.pipeline.vad_state(), VadState::Collecting);
    h.step(AMP_SPEECH);
    h.step(AMP_MODERATE);
    assert_eq!(h.pipeline.vad_state(), VadState::Collecting);
    h.step(AMP_SPEECH);
    assert_eq!(h.pipeline.vad_state(), VadState::Collecting);

    let calls = h.engine.calls();
    assert!(!calls.iter().any(|c| c.starts_with("end_audio")));
}

#[test]
fn silence_timeout_finalizes_and_dispatches_once() {
    let mut h = Harness::new(&["Speech", "Speech"], "Silence");
    h.step(AMP_SPEECH);
    h.step(AMP_SPEECH);

    // First silent window: 0.975 s since speech, still collecting.
    h.step(AMP_FAINT);
    assert_eq!(h.pipeline.vad_state(), VadState::Collecting);

    // Second silent window: 1.95 s, past the timeout. Exactly one
    // graceful finalize request.
    h.step(AMP_FAINT);
    assert_eq!(h.pipeline.vad_state(), VadState::Idle);
    let calls = h.engine.calls();
    assert_eq!(
        calls.iter().filter(|c| c.starts_with("end_audio")).count(),
        1
    );

    // The engine's Final is forwarded exactly once, text untouched.
    h.engine.push_event(TranscriptEvent::Final {
        text: "turn on the lights".into(),
    });
    h.tick();
    assert_eq!(h.sink.texts(), vec!["turn on the lights".to_string()]);
    assert_eq!(h.metrics.snapshot().utterances_dispatched, 1);
}

#[test]
fn stale_transcript_ends_the_segment_without_a_final() {
    // The engine produces one partial and then goes quiet; the staleness
    // rule must end the segment even though no Final ever arrives on its
    // own, and the forced finalize then yields the buffered text.
    let mut h = Harness::new(&[], "Speech");
    h.step(AMP_SPEECH);
    assert_eq!(h.pipeline.vad_state(), VadState::Collecting);

    h.engine.push_event(TranscriptEvent::Partial { text: "你好".into() });
    h.tick();

    // Transcript unchanged from here on. Windows keep the speech label and
    // healthy volume, so only the staleness rule can end this.
    h.step(AMP_SPEECH); // same tick as the text change: fresh
    h.step(AMP_SPEECH); // 0.975 s since change: fresh
    h.step(AMP_SPEECH); // 1.95 s: still within the 2 s window
    h.step(AMP_SPEECH); // 2.925 s: stale, invalid
    assert_eq!(h.pipeline.vad_state(), VadState::Collecting);
    h.step(AMP_SPEECH); // second stale window trips the silence timeout
    assert_eq!(h.pipeline.vad_state(), VadState::Idle);

    assert!(h
        .engine
        .calls()
        .iter()
        .any(|c| c.starts_with("end_audio")));

    h.engine.push_event(TranscriptEvent::Final { text: "你好".into() });
    h.tick();
    assert_eq!(h.sink.texts(), vec!["你好".to_string()]);
}

#[test]
fn whitespace_final_is_not_dispatched() {
    let mut h = Harness::new(&["Speech", "Speech"], "Silence");
    h.step(AMP_SPEECH);
    h.step(AMP_SPEECH);
    h.step(AMP_FAINT);
    h.step(AMP_FAINT);

    h.engine.push_event(TranscriptEvent::Final { text: "  \n ".into() });
    h.tick();
    assert!(h.sink.texts().is_empty());
    assert_eq!(h.metrics.snapshot().utterances_dispatched, 0);
}

#[test]
fn hung_engine_is_restarted_by_the_watchdog() {
    // No speech, no engine events. The 8 s watchdog armed at start must
    // fire once and reopen a fresh session.
    let mut h = Harness::new(&[], "Silence");
    for _ in 0..10 {
        h.step(AMP_FAINT);
    }
    let calls = h.engine.calls();
    assert!(calls.contains(&"cancel#1".to_string()));
    assert!(calls.contains(&"open#2".to_string()));
    assert_eq!(h.metrics.snapshot().watchdog_fires, 1);
    assert!(h.sink.texts().is_empty());
}

#[test]
fn shutdown_discards_unfinalized_partials() {
    let mut h = Harness::new(&[], "Speech");
    h.step(AMP_SPEECH);
    h.engine.push_event(TranscriptEvent::Partial {
        text: "half said".into(),
    });
    h.tick();

    h.pipeline.shutdown();
    assert_eq!(h.pipeline.vad_state(), VadState::Idle);
    assert!(h.sink.texts().is_empty());
    assert!(h.engine.calls().contains(&"cancel#1".to_string()));
}
