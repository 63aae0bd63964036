use std::time::Instant;

use super::ring_buffer::CaptureConsumer;

/// Interleaved PCM block drained from the capture ring buffer.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
    pub timestamp: Instant,
}

/// Drains the ring buffer into timestamped frames on the worker side.
/// Timestamps are reconstructed from the running sample count, not wall
/// clock, so gaps in polling do not skew them.
pub struct FrameReader {
    consumer: CaptureConsumer,
    sample_rate: u32,
    channels: u16,
    samples_read: u64,
    start_time: Instant,
}

impl FrameReader {
    pub fn new(consumer: CaptureConsumer, sample_rate: u32, channels: u16) -> Self {
        Self {
            consumer,
            sample_rate,
            channels,
            samples_read: 0,
            start_time: Instant::now(),
        }
    }

    pub fn read_frame(&mut self, max_samples: usize) -> Option<CapturedFrame> {
        let mut buffer = vec![0i16; max_samples];
        let samples_read = self.consumer.read(&mut buffer);
        if samples_read == 0 {
            return None;
        }
        buffer.truncate(samples_read);

        let elapsed_frames = self.samples_read / self.channels.max(1) as u64;
        let elapsed_ms = elapsed_frames * 1000 / self.sample_rate as u64;
        let timestamp = self.start_time + std::time::Duration::from_millis(elapsed_ms);
        self.samples_read += samples_read as u64;

        Some(CapturedFrame {
            samples: buffer,
            sample_rate: self.sample_rate,
            channels: self.channels,
            timestamp,
        })
    }

    pub fn available_samples(&self) -> usize {
        self.consumer.slots()
    }
}
