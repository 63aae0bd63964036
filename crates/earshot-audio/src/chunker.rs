/// Accumulates conditioned mono samples into fixed-length classifier
/// windows. The worker loop pushes whatever the resampler produced and
/// pops complete windows; leftovers carry over to the next window.
pub struct WindowChunker {
    window_size: usize,
    buffer: Vec<f32>,
}

impl WindowChunker {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            buffer: Vec::with_capacity(window_size * 2),
        }
    }

    pub fn push(&mut self, samples: &[f32]) {
        self.buffer.extend_from_slice(samples);
    }

    pub fn pop_window(&mut self) -> Option<Vec<f32>> {
        if self.buffer.len() < self.window_size {
            return None;
        }
        Some(self.buffer.drain(..self.window_size).collect())
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_window_until_full() {
        let mut chunker = WindowChunker::new(100);
        chunker.push(&[0.0; 99]);
        assert!(chunker.pop_window().is_none());
        chunker.push(&[0.5]);
        let window = chunker.pop_window().unwrap();
        assert_eq!(window.len(), 100);
        assert_eq!(window[99], 0.5);
    }

    #[test]
    fn leftover_carries_into_next_window() {
        let mut chunker = WindowChunker::new(4);
        chunker.push(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(chunker.pop_window().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
        assert!(chunker.pop_window().is_none());
        assert_eq!(chunker.buffered(), 2);

        chunker.push(&[7.0, 8.0]);
        assert_eq!(chunker.pop_window().unwrap(), vec![5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn multiple_windows_from_one_push() {
        let mut chunker = WindowChunker::new(2);
        chunker.push(&[1.0, 2.0, 3.0, 4.0]);
        assert!(chunker.pop_window().is_some());
        assert!(chunker.pop_window().is_some());
        assert!(chunker.pop_window().is_none());
    }
}
