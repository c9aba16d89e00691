//! Speech synthesizer abstraction
//!
//! The view speaks one word per request and waits for the synthesizer to
//! report that word finished before sending the next, so every backend must
//! be able to deliver per-utterance completion events.

use super::events::{EventSink, UtteranceTag};
use crate::{Result, TalkError};
use log::info;
use std::str::FromStr;

/// How a speak request interacts with speech already queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueMode {
    /// Queue after whatever the engine is already saying
    #[default]
    Add,
}

/// Audio stream the engine should play on, where the platform has such a
/// notion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioStream {
    #[default]
    System,
    Music,
    Notification,
}

impl FromStr for AudioStream {
    type Err = TalkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(AudioStream::System),
            "music" => Ok(AudioStream::Music),
            "notification" => Ok(AudioStream::Notification),
            other => Err(TalkError::Config(format!("Unknown audio stream: {}", other))),
        }
    }
}

/// Parameters sent along with every speak request
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechParams {
    /// Stereo position, -1.0 (left) to 1.0 (right)
    pub pan: f32,
    /// Loudness, 0.0 (silent) to 1.0 (full)
    pub volume: f32,
    pub stream: AudioStream,
    pub utterance_id: Option<UtteranceTag>,
}

impl Default for SpeechParams {
    fn default() -> Self {
        Self {
            pan: 0.0,
            volume: 1.0,
            stream: AudioStream::System,
            utterance_id: None,
        }
    }
}

impl SpeechParams {
    /// Copy of these parameters carrying `tag` as the utterance id
    pub fn with_utterance_id(&self, tag: UtteranceTag) -> Self {
        Self {
            utterance_id: Some(tag),
            ..self.clone()
        }
    }
}

/// Speech synthesizer trait
///
/// Events for a request are pushed into the sink installed with
/// `set_event_sink`, tagged with the tag given to `speak`.
pub trait Synth: Send {
    /// Install the channel utterance events are reported on
    ///
    /// Fails when the engine cannot report utterance completion.
    fn set_event_sink(&mut self, sink: EventSink) -> Result<()>;

    /// Start speaking `text` as the utterance `tag`
    fn speak(
        &mut self,
        text: &str,
        mode: QueueMode,
        params: &SpeechParams,
        tag: &UtteranceTag,
    ) -> Result<()>;

    /// Silence the current utterance and drop anything queued
    fn stop(&mut self) -> Result<()>;

    /// Whether audio is currently playing
    fn is_speaking(&self) -> bool;

    /// Select a voice for `locale` (e.g. "en-US")
    fn set_language(&mut self, locale: &str) -> Result<()>;
}

/// Create a speech synthesizer that can report utterance completion
///
/// **Preference order:**
/// 1. Native TTS through the `tts` crate, when the platform backend
///    delivers utterance callbacks (Speech Dispatcher, AVFoundation, WinRT)
/// 2. espeak-ng subprocesses, whose exit marks the end of each word
///
/// If neither qualifies but the native engine exists, it is returned anyway
/// and binding it fails with a clear error.
pub fn create_synth() -> Result<Box<dyn Synth>> {
    use super::backends::espeak::EspeakSynth;
    use super::backends::native::NativeSynth;

    info!("Trying native TTS backend...");
    let native = match NativeSynth::new() {
        Ok(synth) if synth.supports_callbacks() => {
            info!("✓ Successfully initialized native TTS backend");
            return Ok(Box::new(synth));
        }
        Ok(synth) => {
            info!("✗ Native TTS backend cannot report utterance completion");
            Some(synth)
        }
        Err(e) => {
            info!("✗ Native TTS backend unavailable: {}", e);
            None
        }
    };

    info!("Trying espeak-ng backend...");
    match EspeakSynth::new() {
        Ok(synth) => {
            info!("✓ Successfully initialized espeak-ng backend");
            Ok(Box::new(synth))
        }
        Err(e) => match native {
            Some(synth) => {
                info!("✗ espeak-ng unavailable ({}), keeping native backend", e);
                Ok(Box::new(synth))
            }
            None => Err(TalkError::Speech(format!(
                "No speech backend available. Tried:\n\
                 1. Native TTS (install: sudo apt install speech-dispatcher)\n\
                 2. espeak-ng (install: sudo apt install espeak-ng)\n\
                 Error: {}",
                e
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = SpeechParams::default();
        assert_eq!(params.pan, 0.0);
        assert_eq!(params.volume, 1.0);
        assert_eq!(params.stream, AudioStream::System);
        assert!(params.utterance_id.is_none());
    }

    #[test]
    fn test_parse_stream() {
        assert_eq!("Music".parse::<AudioStream>().unwrap(), AudioStream::Music);
        assert_eq!(
            " notification ".parse::<AudioStream>().unwrap(),
            AudioStream::Notification
        );
        assert!("alarm".parse::<AudioStream>().is_err());
    }

    #[test]
    fn test_with_utterance_id_keeps_settings() {
        let params = SpeechParams {
            pan: -0.5,
            volume: 0.25,
            ..SpeechParams::default()
        };
        let tagged = params.with_utterance_id(UtteranceTag::new(4, 1));
        assert_eq!(tagged.pan, -0.5);
        assert_eq!(tagged.volume, 0.25);
        assert_eq!(tagged.utterance_id, Some(UtteranceTag::new(4, 1)));
    }
}
