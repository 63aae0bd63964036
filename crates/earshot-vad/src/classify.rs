use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Window length {got} does not match classifier input length {expected}")]
    WindowLength { got: usize, expected: usize },

    #[error("Classifier failure: {0}")]
    Backend(String),
}

/// Adapter over the external audio-event classifier.
///
/// Pure function from a fixed-length window of mono 16 kHz float samples to
/// a best-label string. Implementations must be callable at the window rate
/// without blocking the capture callback, which is why classification runs
/// on the worker loop, never in the audio callback itself.
pub trait SoundClassifier: Send {
    fn classify(&self, window: &[f32]) -> Result<String, ClassifyError>;
}

/// Placeholder classifier for running the pipeline with no model attached.
/// Always reports "Unknown", so segmentation falls back to the transcript
/// and energy signals alone.
pub struct NullClassifier;

impl SoundClassifier for NullClassifier {
    fn classify(&self, _window: &[f32]) -> Result<String, ClassifyError> {
        Ok("Unknown".to_string())
    }
}

/// Label categories the classifier may report for human speech.
const SPEECH_LABELS: [&str; 4] = ["speech", "conversation", "narration", "monologue"];

/// True if the label falls into any speech-like category.
pub fn is_speech_label(label: &str) -> bool {
    let lower = label.to_lowercase();
    SPEECH_LABELS.iter().any(|cat| lower.contains(cat))
}

/// True if the classifier reported silence.
pub fn is_silence_label(label: &str) -> bool {
    label.to_lowercase().contains("silence")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speech_categories_match_case_insensitively() {
        assert!(is_speech_label("Speech"));
        assert!(is_speech_label("Conversation"));
        assert!(is_speech_label("Narration, monologue"));
        assert!(is_speech_label("Child speech, kid speaking"));
        assert!(!is_speech_label("Music"));
        assert!(!is_speech_label("Dog bark"));
    }

    #[test]
    fn silence_label_detection() {
        assert!(is_silence_label("Silence"));
        assert!(is_silence_label("silence"));
        assert!(!is_silence_label("Speech"));
    }
}
