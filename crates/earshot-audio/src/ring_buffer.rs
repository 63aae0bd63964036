use rtrb::{Consumer, Producer, RingBuffer};

/// Lock-free handoff between the capture callback and the worker loop.
///
/// Writes are partial: when the buffer is nearly full the callback writes
/// what fits and reports how many samples were dropped. The callback must
/// never wait on the consumer.
pub struct CaptureRingBuffer {
    producer: Producer<i16>,
    consumer: Consumer<i16>,
}

impl CaptureRingBuffer {
    pub fn new(capacity: usize) -> Self {
        let (producer, consumer) = RingBuffer::new(capacity);
        Self { producer, consumer }
    }

    pub fn split(self) -> (CaptureProducer, CaptureConsumer) {
        (
            CaptureProducer {
                producer: self.producer,
            },
            CaptureConsumer {
                consumer: self.consumer,
            },
        )
    }
}

/// Producer half, owned by the audio callback.
pub struct CaptureProducer {
    producer: Producer<i16>,
}

impl CaptureProducer {
    /// Write as many samples as fit. Returns the number of samples that
    /// did not fit and were dropped.
    pub fn write(&mut self, samples: &[i16]) -> usize {
        let writable = samples.len().min(self.producer.slots());
        if writable == 0 {
            return samples.len();
        }
        let mut chunk = match self.producer.write_chunk(writable) {
            Ok(chunk) => chunk,
            Err(_) => return samples.len(),
        };

        // The chunk may wrap; fill both slices.
        let (first, second) = chunk.as_mut_slices();
        let split = first.len();
        first.copy_from_slice(&samples[..split]);
        if !second.is_empty() {
            second.copy_from_slice(&samples[split..split + second.len()]);
        }
        chunk.commit_all();
        samples.len() - writable
    }

    pub fn slots(&self) -> usize {
        self.producer.slots()
    }
}

/// Consumer half, owned by the worker loop.
pub struct CaptureConsumer {
    consumer: Consumer<i16>,
}

impl CaptureConsumer {
    /// Read up to `buffer.len()` samples. Non-blocking.
    pub fn read(&mut self, buffer: &mut [i16]) -> usize {
        let chunk = match self.consumer.read_chunk(buffer.len()) {
            Ok(chunk) => chunk,
            Err(rtrb::chunks::ChunkError::TooFewSlots(available)) => {
                if available == 0 {
                    return 0;
                }
                match self.consumer.read_chunk(available) {
                    Ok(chunk) => chunk,
                    Err(_) => return 0,
                }
            }
        };

        let len = chunk.len();
        let (first, second) = chunk.as_slices();
        let split = first.len();
        buffer[..split].copy_from_slice(first);
        if !second.is_empty() {
            buffer[split..split + second.len()].copy_from_slice(second);
        }
        chunk.commit_all();
        len
    }

    pub fn slots(&self) -> usize {
        self.consumer.slots()
    }
}
