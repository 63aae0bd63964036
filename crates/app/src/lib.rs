pub mod dispatch;
pub mod pipeline;
pub mod runtime;

pub use dispatch::{ChannelSink, CollectingSink, Dispatcher, Utterance, UtteranceSink};
pub use pipeline::{PipelineConfig, SpeechPipeline};
pub use runtime::{AppHandle, RuntimeOptions};
