//! Microphone input: frame acquisition and loudness extraction.

mod capture;
pub mod level;

pub use capture::AudioInput;
pub use level::{loudness, FRAME_SAMPLES, SAMPLE_RATE};
