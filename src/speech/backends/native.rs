//! Native Rust TTS backend using the tts crate
//!
//! This backend uses the `tts` crate which provides a unified interface to:
//! - Speech Dispatcher on Linux (via native bindings)
//! - AVFoundation on macOS/iOS (via native bindings)
//! - WinRT on Windows
//!
//! Utterance callbacks from the engine arrive on its own threads. Each is
//! matched to our tag by the engine's utterance id and forwarded as a
//! [`SynthEvent`] through the installed sink; ids of stopped utterances no
//! longer match anything and are dropped.

use crate::speech::{EventSink, QueueMode, SpeechParams, Synth, SynthEvent, UtteranceTag};
use crate::{Result, TalkError};
use log::{debug, error, warn};
use std::sync::{Arc, Mutex};
use tts::{Tts as TtsCrate, UtteranceId};

/// End callbacks remembered for ids `speak` has not registered yet
const EARLY_LIMIT: usize = 16;

/// Engine utterance ids and the tags they were spoken as
///
/// The engine may report an utterance finished before `speak` has recorded
/// its id; such ids are kept briefly so registering them reports at once.
#[derive(Debug)]
struct Pending<K> {
    entries: Vec<(K, UtteranceTag)>,
    early: Vec<K>,
}

impl<K: PartialEq + Clone> Pending<K> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            early: Vec::new(),
        }
    }

    /// Record `id` as `tag`; returns the tag if the engine already finished it
    fn register(&mut self, id: K, tag: UtteranceTag) -> Option<UtteranceTag> {
        if let Some(pos) = self.early.iter().position(|e| *e == id) {
            self.early.remove(pos);
            return Some(tag);
        }
        self.entries.push((id, tag));
        None
    }

    fn begin(&self, id: &K) -> Option<UtteranceTag> {
        self.entries
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, tag)| tag.clone())
    }

    fn finish(&mut self, id: &K) -> Option<UtteranceTag> {
        match self.entries.iter().position(|(k, _)| k == id) {
            Some(pos) => Some(self.entries.remove(pos).1),
            None => {
                if self.early.len() == EARLY_LIMIT {
                    self.early.remove(0);
                }
                self.early.push(id.clone());
                None
            }
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.early.clear();
    }
}

type SharedPending = Arc<Mutex<Pending<UtteranceId>>>;

/// Native TTS backend using the tts crate
pub struct NativeSynth {
    /// The tts crate's TTS instance
    tts: TtsCrate,

    /// Utterances the engine has not finished
    pending: SharedPending,

    sink: Option<EventSink>,

    /// Last volume pushed to the engine (0.0-1.0)
    volume: Option<f32>,

    /// Whether the missing-pan warning was already logged
    pan_warned: bool,
}

impl NativeSynth {
    /// Create a new native TTS synthesizer
    ///
    /// Initializes the platform-appropriate TTS backend
    pub fn new() -> Result<Self> {
        debug!("Creating native TTS backend");

        let tts = TtsCrate::default()
            .map_err(|e| TalkError::Speech(format!("Failed to initialize TTS: {}", e)))?;

        debug!("Native TTS backend created successfully");

        Ok(Self {
            tts,
            pending: Arc::new(Mutex::new(Pending::new())),
            sink: None,
            volume: None,
            pan_warned: false,
        })
    }

    /// Whether the platform backend reports utterance begin/end
    pub fn supports_callbacks(&self) -> bool {
        self.tts.supported_features().utterance_callbacks
    }

    /// Map a 0.0-1.0 volume onto the engine's own range
    fn convert_volume(volume: f32, min: f32, max: f32) -> f32 {
        min + (max - min) * volume.clamp(0.0, 1.0)
    }

    fn apply_params(&mut self, params: &SpeechParams) -> Result<()> {
        if params.pan != 0.0 && !self.pan_warned {
            warn!("Pan control not supported by native TTS, ignoring pan {}", params.pan);
            self.pan_warned = true;
        }

        if self.volume == Some(params.volume) {
            return Ok(());
        }
        self.volume = Some(params.volume);

        if !self.tts.supported_features().volume {
            warn!("Volume control not supported on this platform");
            return Ok(());
        }

        let converted = Self::convert_volume(
            params.volume,
            self.tts.min_volume(),
            self.tts.max_volume(),
        );
        debug!("Setting volume to {} (engine {})", params.volume, converted);
        self.tts
            .set_volume(converted)
            .map_err(|e| TalkError::Speech(format!("Failed to set volume: {}", e)))?;

        Ok(())
    }

    fn send(sink: &EventSink, event: SynthEvent) {
        if sink.send(event).is_err() {
            debug!("Event receiver gone, dropping utterance event");
        }
    }
}

impl Synth for NativeSynth {
    fn set_event_sink(&mut self, sink: EventSink) -> Result<()> {
        if !self.supports_callbacks() {
            return Err(TalkError::Bind(
                "native TTS backend does not report utterance completion".to_string(),
            ));
        }

        let bind_err = |e: tts::Error| TalkError::Bind(format!("Failed to set callback: {}", e));

        let (pending, begin_sink) = (self.pending.clone(), sink.clone());
        self.tts
            .on_utterance_begin(Some(Box::new(move |id| {
                let tag = pending.lock().ok().and_then(|p| p.begin(&id));
                match tag {
                    Some(tag) => Self::send(&begin_sink, SynthEvent::Started(tag)),
                    None => debug!("Begin callback for untracked utterance {:?}", id),
                }
            })))
            .map_err(bind_err)?;

        let (pending, end_sink) = (self.pending.clone(), sink.clone());
        self.tts
            .on_utterance_end(Some(Box::new(move |id| {
                let tag = match pending.lock() {
                    Ok(mut p) => p.finish(&id),
                    Err(e) => {
                        error!("Utterance map lock poisoned: {}", e);
                        None
                    }
                };
                match tag {
                    Some(tag) => Self::send(&end_sink, SynthEvent::Done(tag)),
                    None => debug!("End callback for untracked utterance {:?}", id),
                }
            })))
            .map_err(bind_err)?;

        self.sink = Some(sink);
        debug!("Native TTS utterance callbacks installed");
        Ok(())
    }

    fn speak(
        &mut self,
        text: &str,
        mode: QueueMode,
        params: &SpeechParams,
        tag: &UtteranceTag,
    ) -> Result<()> {
        self.apply_params(params)?;

        debug!("Speaking {:?} as {} ({:?}, {:?})", text, tag, mode, params.stream);
        let interrupt = match mode {
            QueueMode::Add => false,
        };
        let id = self.tts.speak(text, interrupt).map_err(|e| {
            error!("Failed to speak: {}", e);
            TalkError::Speech(format!("Speak failed: {}", e))
        })?;

        let id = match id {
            Some(id) => id,
            None => {
                // Completion could never be matched to this word
                let _ = self.tts.stop();
                return Err(TalkError::Speech(format!(
                    "Engine returned no utterance id for {}",
                    tag
                )));
            }
        };

        let finished = self
            .pending
            .lock()
            .map_err(|e| TalkError::Speech(format!("Utterance map lock poisoned: {}", e)))?
            .register(id, tag.clone());
        if let (Some(tag), Some(sink)) = (finished, self.sink.as_ref()) {
            debug!("Utterance {} finished before it was registered", tag);
            Self::send(sink, SynthEvent::Done(tag));
        }

        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        debug!("Stopping speech");
        if let Ok(mut pending) = self.pending.lock() {
            pending.clear();
        }

        if !self.tts.supported_features().stop {
            warn!("Stopping speech not supported on this platform");
            return Ok(());
        }

        self.tts.stop().map_err(|e| {
            error!("Failed to stop speech: {}", e);
            TalkError::Speech(format!("Stop failed: {}", e))
        })?;

        Ok(())
    }

    fn is_speaking(&self) -> bool {
        if !self.tts.supported_features().is_speaking {
            return false;
        }
        self.tts.is_speaking().unwrap_or(false)
    }

    fn set_language(&mut self, locale: &str) -> Result<()> {
        let wanted = locale.replace('_', "-").to_lowercase();
        debug!("Selecting voice for {}", wanted);

        if !self.tts.supported_features().voice {
            warn!("Voice selection not supported on this platform");
            return Ok(());
        }

        let voices = self
            .tts
            .voices()
            .map_err(|e| TalkError::Speech(format!("Failed to get voices: {}", e)))?;

        let voice = voices.iter().find(|v| {
            let lang = v.language().to_string().to_lowercase();
            lang == wanted || lang.starts_with(&format!("{}-", wanted))
        });

        match voice {
            Some(voice) => {
                debug!("Selecting voice: {}", voice.name());
                self.tts
                    .set_voice(voice)
                    .map_err(|e| TalkError::Speech(format!("Failed to set voice: {}", e)))?;
            }
            None => warn!("No voice for language {} (have {} voices)", locale, voices.len()),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_synth() {
        // May fail without speech-dispatcher or in CI without audio
        match NativeSynth::new() {
            Ok(synth) => println!(
                "✓ Native TTS backend initialized (callbacks: {})",
                synth.supports_callbacks()
            ),
            Err(e) => println!("⚠ TTS initialization failed (may be expected in CI): {}", e),
        }
    }

    fn tag(serial: u64) -> UtteranceTag {
        UtteranceTag::new(0, serial)
    }

    #[test]
    fn test_pending_matches_by_engine_id() {
        let mut pending = Pending::new();
        assert_eq!(pending.register(1u64, tag(1)), None);
        assert_eq!(pending.register(2u64, tag(2)), None);

        assert_eq!(pending.begin(&2), Some(tag(2)));
        assert_eq!(pending.finish(&1), Some(tag(1)));
        assert_eq!(pending.finish(&1), None);
        assert_eq!(pending.finish(&2), Some(tag(2)));
    }

    #[test]
    fn test_cancelled_utterance_end_does_not_report_resumed_tag() {
        let mut pending = Pending::new();
        pending.register(7u64, tag(1));

        // Pause: the engine is stopped and the map cleared
        pending.clear();
        // Resume speaks the same word again under a new id
        pending.register(8u64, tag(2));

        // The cancelled utterance's end callback arrives late
        assert_eq!(pending.finish(&7), None);
        assert_eq!(pending.begin(&8), Some(tag(2)));
        assert_eq!(pending.finish(&8), Some(tag(2)));
    }

    #[test]
    fn test_end_before_register_reports_on_register() {
        let mut pending = Pending::new();
        assert_eq!(pending.finish(&3u64), None);
        assert_eq!(pending.register(3u64, tag(4)), Some(tag(4)));
        assert_eq!(pending.finish(&3), None);
    }

    #[test]
    fn test_early_ids_are_bounded() {
        let mut pending = Pending::new();
        for id in 0..(EARLY_LIMIT as u64 + 4) {
            pending.finish(&id);
        }
        assert_eq!(pending.early.len(), EARLY_LIMIT);
        // The oldest were forgotten
        assert_eq!(pending.register(0u64, tag(1)), None);
    }

    #[test]
    fn test_volume_conversion() {
        assert_eq!(NativeSynth::convert_volume(0.0, 0.0, 1.0), 0.0);
        assert_eq!(NativeSynth::convert_volume(0.5, 0.0, 1.0), 0.5);
        assert_eq!(NativeSynth::convert_volume(1.0, 0.0, 100.0), 100.0);
        assert_eq!(NativeSynth::convert_volume(2.0, 0.0, 1.0), 1.0);
        assert_eq!(NativeSynth::convert_volume(-1.0, 0.0, 1.0), 0.0);
    }
}
