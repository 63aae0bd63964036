pub mod capture;
pub mod chunker;
pub mod conditioner;
pub mod frame_reader;
pub mod resampler;
pub mod ring_buffer;

pub use capture::{CaptureThread, DeviceConfig};
pub use chunker::WindowChunker;
pub use conditioner::{downmix_to_mono_f32, ConditionerConfig, SampleConditioner};
pub use frame_reader::{CapturedFrame, FrameReader};
pub use resampler::StreamResampler;
pub use ring_buffer::{CaptureConsumer, CaptureProducer, CaptureRingBuffer};
