//! The single-writer pipeline worker state.
//!
//! One instance of `SpeechPipeline` is owned by one worker task; every
//! state transition (supervisor, detector, dispatch) happens inside its
//! methods, so no ad hoc synchronization is needed anywhere downstream of
//! the ring buffer.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use earshot_audio::{
    downmix_to_mono_f32, CapturedFrame, ConditionerConfig, DeviceConfig, SampleConditioner,
    StreamResampler, WindowChunker,
};
use earshot_foundation::clock::SharedClock;
use earshot_foundation::AudioError;
use earshot_stt::supervisor::SessionPhase;
use earshot_stt::{SessionSupervisor, SttError, SupervisorConfig, TranscriptionEngine};
use earshot_telemetry::PipelineMetrics;
use earshot_vad::{
    is_valid_speech, rms, SoundClassifier, VadConfig, VadState, VadStateMachine, VadTransition,
    WindowSignals, SAMPLE_RATE_HZ,
};

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub vad: VadConfig,
    pub supervisor: SupervisorConfig,
    pub conditioner: ConditionerConfig,
}

pub struct SpeechPipeline<C: SoundClassifier, E: TranscriptionEngine> {
    resampler: StreamResampler,
    conditioner: SampleConditioner,
    chunker: WindowChunker,
    classifier: C,
    vad: VadStateMachine,
    vad_cfg: VadConfig,
    supervisor: SessionSupervisor<E>,
    dispatcher: crate::dispatch::Dispatcher,
    clock: SharedClock,
    metrics: Arc<PipelineMetrics>,
}

impl<C: SoundClassifier, E: TranscriptionEngine> SpeechPipeline<C, E> {
    pub fn new(
        config: PipelineConfig,
        device: DeviceConfig,
        classifier: C,
        engine: E,
        dispatcher: crate::dispatch::Dispatcher,
        clock: SharedClock,
        metrics: Arc<PipelineMetrics>,
    ) -> Result<Self, AudioError> {
        let resampler = StreamResampler::new(device.sample_rate, SAMPLE_RATE_HZ)?;
        let vad = VadStateMachine::new(&config.vad);
        let supervisor = SessionSupervisor::new(engine, config.supervisor);
        Ok(Self {
            resampler,
            conditioner: SampleConditioner::new(config.conditioner),
            chunker: WindowChunker::new(config.vad.window_size_samples),
            classifier,
            vad,
            vad_cfg: config.vad,
            supervisor,
            dispatcher,
            clock,
            metrics,
        })
    }

    /// Open the first transcription session. A failure here is a startup
    /// failure for the whole pipeline.
    pub fn start(&mut self) -> Result<(), SttError> {
        self.supervisor.start(self.clock.now())
    }

    /// Feed one captured frame through resampling, conditioning, the
    /// session, and any classifier windows it completes.
    pub fn ingest(&mut self, frame: &CapturedFrame) {
        let now = self.clock.now();
        let mono = downmix_to_mono_f32(&frame.samples, frame.channels);
        let mut samples = self.resampler.process(&mono);
        if samples.is_empty() {
            return;
        }
        self.conditioner.process(&mut samples);

        self.supervisor.feed(&samples, now);

        self.chunker.push(&samples);
        while let Some(window) = self.chunker.pop_window() {
            self.evaluate_window(&window, now);
        }
    }

    /// Drain supervisor events and fire due deadlines; dispatch any
    /// finalized utterances. Called once per worker iteration.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        for text in self.supervisor.pump(now) {
            self.dispatcher.dispatch(text, now);
        }
        let session = self.supervisor.metrics();
        self.metrics.set_session_restarts(session.restart_count);
        self.metrics.set_watchdog_fires(session.watchdog_fires);
    }

    /// Ordered teardown: the caller has already stopped capture; this
    /// cancels the session and drops unfinalized state.
    pub fn shutdown(&mut self) {
        self.supervisor.stop();
        self.vad.reset();
        self.chunker.clear();
        self.metrics.set_collecting(false);
    }

    pub fn vad_state(&self) -> VadState {
        self.vad.current_state()
    }

    pub fn session_phase(&self) -> SessionPhase {
        self.supervisor.phase()
    }

    fn evaluate_window(&mut self, window: &[f32], now: Instant) {
        let level = rms(window);
        self.metrics.update_rms(level);
        self.metrics.increment_windows_classified();

        // A classifier failure fails safe toward silence: the whole window
        // is treated as not-speech for this evaluation.
        let label = match self.classifier.classify(window) {
            Ok(label) => Some(label),
            Err(e) => {
                warn!("Classifier failure, treating window as silence: {}", e);
                None
            }
        };

        let valid = match &label {
            Some(label) => is_valid_speech(
                &WindowSignals {
                    label,
                    rms: level,
                    has_partial_text: self.supervisor.has_partial_text(),
                    transcript_stale: self.supervisor.is_stale(now),
                },
                &self.vad_cfg,
            ),
            None => false,
        };

        if valid {
            self.supervisor.note_speech(now);
        }

        match self.vad.observe(valid, now) {
            VadTransition::SpeechStart => {
                info!(
                    label = label.as_deref().unwrap_or("<classifier failed>"),
                    rms = level,
                    "Speech segment started"
                );
                self.metrics.set_collecting(true);
            }
            VadTransition::SpeechEnd => {
                info!("Speech segment ended, requesting finalization");
                self.metrics.set_collecting(false);
                self.supervisor.force_finalize(now);
            }
            VadTransition::SpeechOngoing | VadTransition::Quiet => {}
        }
    }
}
