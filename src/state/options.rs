//! Construction options for a talking view

use crate::speech::AudioStream;
use crate::text::{Color, HighlightStyle};
use std::time::Duration;

/// Settings a view is created with
#[derive(Debug, Clone, PartialEq)]
pub struct TalkingOptions {
    /// Background of the word being spoken
    pub spoken_background: Option<Color>,
    /// Foreground of the word being spoken
    pub spoken_foreground: Option<Color>,
    /// Stereo position, -1.0 (left) to 1.0 (right)
    pub voice_pan: f32,
    /// Loudness, 0.0 to 1.0
    pub voice_volume: f32,
    /// Pause before each word is sent to the synthesizer
    pub delay: Duration,
    /// Audio stream speech plays on
    pub stream: AudioStream,
    /// Voice language, e.g. "en-US"; engine default when None
    pub language: Option<String>,
}

impl Default for TalkingOptions {
    fn default() -> Self {
        Self {
            spoken_background: None,
            spoken_foreground: None,
            voice_pan: 0.0,
            voice_volume: 1.0,
            delay: Duration::ZERO,
            stream: AudioStream::System,
            language: None,
        }
    }
}

impl TalkingOptions {
    pub fn highlight_style(&self) -> HighlightStyle {
        HighlightStyle::new(self.spoken_background, self.spoken_foreground)
    }
}
