pub mod clock;
pub mod error;

pub use clock::{real_clock, test_clock, Clock, RealClock, SharedClock, TestClock};
pub use error::{AppError, AudioError};
