//! Wires capture, the worker loop, and the utterance channel together.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use earshot_audio::{CaptureRingBuffer, CaptureThread, FrameReader};
use earshot_foundation::clock::real_clock;
use earshot_foundation::AppError;
use earshot_stt::TranscriptionEngine;
use earshot_telemetry::PipelineMetrics;
use earshot_vad::SoundClassifier;

use crate::dispatch::{ChannelSink, Dispatcher, Utterance};
use crate::pipeline::{PipelineConfig, SpeechPipeline};

/// Ring sized for several seconds of 48 kHz stereo, so a slow worker tick
/// never costs audio.
const RING_CAPACITY: usize = 16_384 * 16;

/// Worker poll cadence when the ring buffer is empty.
const IDLE_POLL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, Default)]
pub struct RuntimeOptions {
    /// Input device name; `None` uses the host default.
    pub device: Option<String>,
    pub pipeline: PipelineConfig,
}

/// Handle to the running pipeline. Dropping it does not stop anything;
/// call `shutdown`.
pub struct AppHandle {
    pub metrics: Arc<PipelineMetrics>,
    capture: CaptureThread,
    worker: JoinHandle<()>,
    running: Arc<AtomicBool>,
}

impl AppHandle {
    /// Stop in the required order: capture first (release the input tap),
    /// then the worker, whose teardown cancels the transcription session
    /// and clears all deadlines. Unfinalized partials are discarded.
    pub async fn shutdown(self) {
        info!("Shutting down earshot runtime");
        self.capture.stop();
        self.running.store(false, Ordering::Relaxed);
        let _ = self.worker.await;
    }
}

/// Start capture and the pipeline worker. Returns the handle and the
/// channel on which finalized utterances arrive.
pub fn start<C, E>(
    options: RuntimeOptions,
    classifier: C,
    engine: E,
) -> Result<(AppHandle, mpsc::Receiver<Utterance>), AppError>
where
    C: SoundClassifier + 'static,
    E: TranscriptionEngine + 'static,
{
    let metrics = Arc::new(PipelineMetrics::new());

    let ring = CaptureRingBuffer::new(RING_CAPACITY);
    let (producer, consumer) = ring.split();
    let (capture, device_config) =
        CaptureThread::spawn(producer, options.device.clone(), metrics.clone())?;
    info!(
        rate = device_config.sample_rate,
        channels = device_config.channels,
        "Capture started"
    );

    let mut reader = FrameReader::new(consumer, device_config.sample_rate, device_config.channels);

    let (utterance_tx, utterance_rx) = mpsc::channel::<Utterance>(64);
    let dispatcher = Dispatcher::new(Box::new(ChannelSink::new(utterance_tx)), metrics.clone());

    let mut pipeline = SpeechPipeline::new(
        options.pipeline,
        device_config,
        classifier,
        engine,
        dispatcher,
        real_clock(),
        metrics.clone(),
    )?;
    pipeline
        .start()
        .map_err(|e| AppError::Stt(e.to_string()))?;

    let running = Arc::new(AtomicBool::new(true));
    let worker_running = running.clone();
    let worker = tokio::spawn(async move {
        info!("Pipeline worker started");
        while worker_running.load(Ordering::Relaxed) {
            match reader.read_frame(4096) {
                Some(frame) => pipeline.ingest(&frame),
                None => tokio::time::sleep(IDLE_POLL).await,
            }
            pipeline.tick();
        }
        pipeline.shutdown();
        info!("Pipeline worker stopped");
    });

    Ok((
        AppHandle {
            metrics,
            capture,
            worker,
            running,
        },
        utterance_rx,
    ))
}
