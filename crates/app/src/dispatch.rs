use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use earshot_telemetry::PipelineMetrics;

/// One finalized segment of speech, ready for the downstream consumer.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub text: String,
    pub timestamp: Instant,
}

/// Downstream consumer interface. Implementations must not block; the
/// pipeline does not wait on the consumer before resuming capture.
pub trait UtteranceSink: Send {
    fn on_utterance(&self, utterance: Utterance);
}

/// Sink backed by a tokio channel; the consumer drains at its own pace.
pub struct ChannelSink {
    tx: mpsc::Sender<Utterance>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Utterance>) -> Self {
        Self { tx }
    }
}

impl UtteranceSink for ChannelSink {
    fn on_utterance(&self, utterance: Utterance) {
        if let Err(e) = self.tx.try_send(utterance) {
            warn!("Utterance consumer not keeping up, dropping: {}", e);
        }
    }
}

/// In-memory sink for tests and embedding.
#[derive(Clone, Default)]
pub struct CollectingSink {
    utterances: Arc<Mutex<Vec<Utterance>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<String> {
        self.utterances.lock().iter().map(|u| u.text.clone()).collect()
    }
}

impl UtteranceSink for CollectingSink {
    fn on_utterance(&self, utterance: Utterance) {
        self.utterances.lock().push(utterance);
    }
}

/// Forwards finalized transcripts downstream, exactly once each, never
/// blank. Exactly-once holds because the supervisor goes `Inactive` on the
/// first Final of a session; a duplicate cannot arrive from that session.
pub struct Dispatcher {
    sink: Box<dyn UtteranceSink>,
    metrics: Arc<PipelineMetrics>,
}

impl Dispatcher {
    pub fn new(sink: Box<dyn UtteranceSink>, metrics: Arc<PipelineMetrics>) -> Self {
        Self { sink, metrics }
    }

    pub fn dispatch(&self, text: String, timestamp: Instant) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("Discarding blank finalized transcript");
            return;
        }
        self.metrics.increment_utterances();
        self.sink.on_utterance(Utterance {
            text: trimmed.to_string(),
            timestamp,
        });
    }
}
