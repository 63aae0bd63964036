pub mod classify;
pub mod config;
pub mod constants;
pub mod decision;
pub mod energy;
pub mod state;

pub use classify::{is_silence_label, is_speech_label, ClassifyError, NullClassifier, SoundClassifier};
pub use config::VadConfig;
pub use constants::{SAMPLE_RATE_HZ, WINDOW_DURATION_MS, WINDOW_SIZE_SAMPLES};
pub use decision::{is_valid_speech, WindowSignals};
pub use energy::rms;
pub use state::{VadStateMachine, VadState, VadTransition};
