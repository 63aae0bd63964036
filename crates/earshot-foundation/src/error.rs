use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Audio subsystem error: {0}")]
    Audio(#[from] AudioError),

    #[error("Transcription subsystem error: {0}")]
    Stt(String),

    #[error("Shutdown requested")]
    ShutdownRequested,

    #[error("Fatal error, cannot recover: {0}")]
    Fatal(String),
}

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Device not found: {name:?}")]
    DeviceNotFound { name: Option<String> },

    #[error("Format not supported: {format}")]
    FormatNotSupported { format: String },

    #[error("Buffer overflow, dropped {count} samples")]
    BufferOverflow { count: usize },

    #[error("CPAL error: {0}")]
    Cpal(#[from] cpal::StreamError),

    #[error("Build stream error: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Play stream error: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("Default stream config error: {0}")]
    DefaultStreamConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("Fatal error, cannot recover: {0}")]
    Fatal(String),
}

impl AudioError {
    /// Whether the capture path can keep running after this error.
    /// Overflow means dropped audio, not a dead stream.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AudioError::BufferOverflow { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_is_recoverable() {
        assert!(AudioError::BufferOverflow { count: 128 }.is_recoverable());
        assert!(!AudioError::Fatal("boom".into()).is_recoverable());
    }

    #[test]
    fn audio_error_converts_to_app_error() {
        let err: AppError = AudioError::DeviceNotFound { name: None }.into();
        assert!(matches!(err, AppError::Audio(_)));
    }
}
