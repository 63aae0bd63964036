use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::ring_buffer::CaptureProducer;
use earshot_foundation::AudioError;
use earshot_telemetry::PipelineMetrics;

/// Negotiated input stream parameters, reported back to the pipeline so it
/// can configure resampling.
#[derive(Debug, Clone, Copy)]
pub struct DeviceConfig {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Handle to the dedicated capture thread.
///
/// The cpal stream callback does exactly one thing: convert incoming
/// samples to i16 and push them into the ring buffer. Everything else runs
/// on the worker side of the buffer.
pub struct CaptureThread {
    handle: JoinHandle<()>,
    shutdown: Arc<AtomicBool>,
}

impl CaptureThread {
    /// Start capturing from the named device, or the host default.
    ///
    /// A start failure (no device, unsupported format, stream error) is
    /// returned to the caller; there is no automatic retry here.
    pub fn spawn(
        producer: CaptureProducer,
        device_name: Option<String>,
        metrics: Arc<PipelineMetrics>,
    ) -> Result<(Self, DeviceConfig), AudioError> {
        let running = Arc::new(AtomicBool::new(true));
        let shutdown = running.clone();
        let (started_tx, started_rx) = mpsc::channel::<Result<DeviceConfig, AudioError>>();

        let handle = thread::Builder::new()
            .name("audio-capture".to_string())
            .spawn(move || {
                let stream = match open_stream(producer, device_name.as_deref(), metrics) {
                    Ok((stream, cfg)) => {
                        let _ = started_tx.send(Ok(cfg));
                        stream
                    }
                    Err(e) => {
                        let _ = started_tx.send(Err(e));
                        return;
                    }
                };

                // The stream lives as long as this thread; the callback does
                // all the work.
                while running.load(Ordering::Relaxed) {
                    thread::sleep(Duration::from_millis(100));
                }
                drop(stream);
                tracing::info!("Audio capture thread stopped");
            })
            .map_err(|e| AudioError::Fatal(format!("Failed to spawn capture thread: {}", e)))?;

        let config = started_rx
            .recv_timeout(Duration::from_secs(5))
            .map_err(|_| AudioError::Fatal("Capture thread did not report startup".into()))??;

        Ok((Self { handle, shutdown }, config))
    }

    /// Stop the callback and release the input tap. First step of the
    /// pipeline shutdown order.
    pub fn stop(self) {
        self.shutdown.store(false, Ordering::Relaxed);
        let _ = self.handle.join();
    }
}

fn open_stream(
    producer: CaptureProducer,
    device_name: Option<&str>,
    metrics: Arc<PipelineMetrics>,
) -> Result<(Stream, DeviceConfig), AudioError> {
    let host = cpal::default_host();
    let device = match device_name {
        Some(name) => host
            .input_devices()
            .map_err(|e| AudioError::Fatal(e.to_string()))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or(AudioError::DeviceNotFound {
                name: Some(name.to_string()),
            })?,
        None => host
            .default_input_device()
            .ok_or(AudioError::DeviceNotFound { name: None })?,
    };

    let supported = device.default_input_config()?;
    let sample_format = supported.sample_format();
    let stream_config: StreamConfig = supported.into();
    let device_config = DeviceConfig {
        sample_rate: stream_config.sample_rate.0,
        channels: stream_config.channels,
    };

    tracing::info!(
        device = %device.name().unwrap_or_else(|_| "<unknown>".into()),
        rate = device_config.sample_rate,
        channels = device_config.channels,
        format = ?sample_format,
        "Opening input stream"
    );

    let producer = Arc::new(Mutex::new(producer));
    let err_fn = |e: cpal::StreamError| tracing::error!("Input stream error: {}", e);

    let stream = match sample_format {
        SampleFormat::I16 => {
            let producer = producer.clone();
            device.build_input_stream(
                &stream_config,
                move |data: &[i16], _| push_samples(&producer, &metrics, data),
                err_fn,
                None,
            )?
        }
        SampleFormat::F32 => {
            let producer = producer.clone();
            // Scratch buffer reused across callbacks; no steady-state
            // allocation on the real-time path.
            let mut scratch: Vec<i16> = Vec::with_capacity(8192);
            device.build_input_stream(
                &stream_config,
                move |data: &[f32], _| {
                    scratch.clear();
                    scratch.extend(data.iter().map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16));
                    push_samples(&producer, &metrics, &scratch);
                },
                err_fn,
                None,
            )?
        }
        SampleFormat::U16 => {
            let producer = producer.clone();
            let mut scratch: Vec<i16> = Vec::with_capacity(8192);
            device.build_input_stream(
                &stream_config,
                move |data: &[u16], _| {
                    scratch.clear();
                    scratch.extend(data.iter().map(|&s| (s as i32 - 32768) as i16));
                    push_samples(&producer, &metrics, &scratch);
                },
                err_fn,
                None,
            )?
        }
        other => {
            return Err(AudioError::FormatNotSupported {
                format: format!("{:?}", other),
            })
        }
    };

    stream.play()?;
    Ok((stream, device_config))
}

fn push_samples(producer: &Arc<Mutex<CaptureProducer>>, metrics: &PipelineMetrics, samples: &[i16]) {
    let dropped = producer.lock().write(samples);
    metrics.increment_capture_frames();
    if dropped > 0 {
        metrics.add_dropped_samples(dropped as u64);
    }
}
