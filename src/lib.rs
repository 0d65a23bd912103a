pub mod app;
pub mod audio;
pub mod backend;
pub mod config;
pub mod geometry;
pub mod logging;
pub mod pulse;
pub mod render;
pub mod sysmon;
pub mod terminal;
pub mod theme;
pub mod transcript;

pub use pulse::PulseTracker;
pub use transcript::{Speaker, TranscriptEntry, TranscriptLog};
