//! Music playback and spectrum analysis.
//!
//! A WAV track is looped on the default output device; the most recently played frames
//! are kept in a history ring that the render loop analyses once per frame.

mod fft;
mod system;
mod track;

use thiserror::Error;

// Re-export public types
pub use fft::{hann_window, SpectrumAnalyzer};
pub use system::AudioSystem;
pub use track::Track;

/// Errors opening a track or the output device
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to decode WAV file: {0}")]
    Wav(#[from] hound::Error),

    #[error("unsupported channel count {0} (expected mono or stereo)")]
    UnsupportedChannels(u16),

    #[error("track contains no audio frames")]
    EmptyTrack,

    #[error("no audio output device found")]
    NoOutputDevice,

    #[error("unsupported output sample format {0}")]
    UnsupportedSampleFormat(String),

    #[error("failed to get audio config: {0}")]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("invalid spectrum config: {0}")]
    InvalidConfig(String),
}
