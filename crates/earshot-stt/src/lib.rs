//! Transcription engine abstraction and session supervision for earshot
//!
//! The engine itself (on-device recognizer, server, batch model) is an
//! external collaborator behind the `TranscriptionEngine` trait; this crate
//! owns the lifecycle around it: starting sessions, feeding audio, tracking
//! transcript staleness, and recovering from engines that stall.

pub mod batch;
pub mod engine;
pub mod mock;
pub mod noop;
pub mod supervisor;
pub mod types;

pub use engine::TranscriptionEngine;
pub use supervisor::{SessionPhase, SessionSupervisor, SupervisorConfig, SupervisorMetrics};
pub use types::{SessionId, SttError, TranscriptEvent};
