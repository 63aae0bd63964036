/// Short-time RMS energy over a window of float samples in [-1.0, 1.0].
pub fn rms(window: &[f32]) -> f32 {
    if window.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = window.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_squares / window.len() as f64).sqrt() as f32
}
