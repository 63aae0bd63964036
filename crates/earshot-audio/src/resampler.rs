use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use earshot_foundation::AudioError;

/// Streaming resampler for mono f32 audio using rubato's sinc interpolation.
///
/// Maintains an internal buffer so arbitrary-sized input chunks can be fed;
/// output is emitted whenever a full processing chunk is available.
pub struct StreamResampler {
    in_rate: u32,
    out_rate: u32,
    resampler: Option<SincFixedIn<f32>>,
    input_buffer: Vec<f32>,
    chunk_size: usize,
}

impl StreamResampler {
    pub fn new(in_rate: u32, out_rate: u32) -> Result<Self, AudioError> {
        let chunk_size = 512;
        let resampler = if in_rate == out_rate {
            None
        } else {
            let params = SincInterpolationParameters {
                sinc_len: 64,
                f_cutoff: 0.95,
                interpolation: SincInterpolationType::Cubic,
                oversampling_factor: 128,
                window: WindowFunction::Blackman2,
            };
            let resampler = SincFixedIn::<f32>::new(
                out_rate as f64 / in_rate as f64,
                2.0,
                params,
                chunk_size,
                1,
            )
            .map_err(|e| AudioError::FormatNotSupported {
                format: format!("{} Hz -> {} Hz: {}", in_rate, out_rate, e),
            })?;
            Some(resampler)
        };

        Ok(Self {
            in_rate,
            out_rate,
            resampler,
            input_buffer: Vec::with_capacity(chunk_size * 2),
            chunk_size,
        })
    }

    /// Process a chunk of mono f32 samples. Returns whatever resampled
    /// output is ready; an engine-side error drops this chunk's output and
    /// keeps the stream alive.
    pub fn process(&mut self, input: &[f32]) -> Vec<f32> {
        let Some(resampler) = &mut self.resampler else {
            return input.to_vec();
        };

        self.input_buffer.extend_from_slice(input);

        let mut output = Vec::new();
        while self.input_buffer.len() >= self.chunk_size {
            let chunk: Vec<f32> = self.input_buffer.drain(..self.chunk_size).collect();
            match resampler.process(&[chunk], None) {
                Ok(frames) => {
                    if let Some(channel) = frames.first() {
                        output.extend_from_slice(channel);
                    }
                }
                Err(e) => {
                    tracing::warn!("Resampler error, dropping chunk: {}", e);
                    return output;
                }
            }
        }
        output
    }

    pub fn reset(&mut self) {
        self.input_buffer.clear();
        if let Some(resampler) = &mut self.resampler {
            resampler.reset();
        }
    }

    pub fn input_rate(&self) -> u32 {
        self.in_rate
    }

    pub fn output_rate(&self) -> u32 {
        self.out_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_same_rate() {
        let mut rs = StreamResampler::new(16_000, 16_000).unwrap();
        let input = vec![0.1f32, 0.2, 0.3];
        assert_eq!(rs.process(&input), input);
    }

    #[test]
    fn downsample_48k_to_16k_ratio() {
        let mut rs = StreamResampler::new(48_000, 16_000).unwrap();
        let input: Vec<f32> = (0..9_600).map(|i| ((i % 100) as f32 - 50.0) / 100.0).collect();

        let mut out = rs.process(&input);
        out.extend(rs.process(&input));

        // Two 0.2 s blocks at 48 kHz should yield roughly 0.4 s at 16 kHz,
        // minus filter latency.
        assert!(out.len() > 4_000 && out.len() < 7_000, "got {}", out.len());
    }

    #[test]
    fn upsample_16k_to_48k_constant_amplitude() {
        let mut rs = StreamResampler::new(16_000, 48_000).unwrap();
        let input = vec![0.25f32; 3_200];
        let out = rs.process(&input);
        assert!(!out.is_empty());
        // Skip filter edges, check the steady-state region.
        if out.len() > 200 {
            for &s in &out[100..out.len() - 100] {
                assert!((s - 0.25).abs() < 0.05, "sample {} drifted", s);
            }
        }
    }
}
