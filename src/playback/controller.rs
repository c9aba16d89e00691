//! Word-by-word playback with highlighting
//!
//! `TalkingText` owns the displayed document and a bound synthesizer. Each
//! advance finds the next word, highlights it, and schedules one speak
//! request. The next advance happens only when the synthesizer reports the
//! armed utterance done; events for any other tag are stale and ignored.
//!
//! Everything runs on the owner's event loop. Synthesizer events arrive on
//! the channel returned by [`TalkingText::bind`] and are fed back through
//! [`TalkingText::handle_event`]; deferred work runs from
//! [`TalkingText::run_scheduled`].

use super::scheduler::{Scheduler, Task};
use crate::speech::{AudioStream, QueueMode, SpeechParams, Synth, SynthEvent, UtteranceTag};
use crate::state::{SavedState, TalkingOptions};
use crate::text::{next_span, offset_after, Document, HighlightStyle, WordSpan};
use crate::{Result, TalkError};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

/// Called with `(start, end, word)` each time a new word comes up
pub type WordListener = Box<dyn FnMut(usize, usize, &str)>;

/// Position and activity of playback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackState {
    /// Byte offset the next word is searched from
    pub offset: usize,
    pub speaking: bool,
}

/// Coarse playback phase, derived from [`PlaybackState`]
///
/// A stopped view is indistinguishable from one that never started, so both
/// report `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Speaking,
    Paused,
}

/// A text view that speaks its content
pub struct TalkingText {
    document: Document,
    style: HighlightStyle,
    params: SpeechParams,
    delay: Duration,
    language: Option<String>,

    synth: Option<Box<dyn Synth>>,

    offset: usize,
    speaking: bool,

    /// Tag of the only utterance whose events are honoured
    armed: Option<UtteranceTag>,
    serial: u64,

    scheduler: Scheduler,
    listener: Option<WordListener>,
}

impl TalkingText {
    pub fn new(text: impl Into<String>, options: &TalkingOptions) -> Self {
        Self {
            document: Document::new(text),
            style: options.highlight_style(),
            params: SpeechParams {
                pan: options.voice_pan,
                volume: options.voice_volume,
                stream: options.stream,
                ..SpeechParams::default()
            },
            delay: options.delay,
            language: options.language.clone(),
            synth: None,
            offset: 0,
            speaking: false,
            armed: None,
            serial: 0,
            scheduler: Scheduler::new(),
            listener: None,
        }
    }

    // ========== Synthesizer binding ==========

    /// Attach a synthesizer and return the channel its events arrive on
    ///
    /// If the synthesizer cannot report utterance completion it is dropped,
    /// the view stays unbound and playback can never start.
    pub fn bind(&mut self, mut synth: Box<dyn Synth>) -> Result<Receiver<SynthEvent>> {
        self.stop_speaking();
        self.synth = None;

        let (tx, rx) = mpsc::channel();
        if let Err(e) = synth.set_event_sink(tx) {
            error!("Synthesizer bind failed: {}", e);
            return Err(match e {
                TalkError::Bind(msg) => TalkError::Bind(msg),
                other => TalkError::Bind(other.to_string()),
            });
        }

        if let Some(lang) = &self.language {
            if let Err(e) = synth.set_language(lang) {
                warn!("Failed to set language {}: {}", lang, e);
            }
        }

        info!("Synthesizer bound");
        self.synth = Some(synth);
        Ok(rx)
    }

    /// Stop playback and release the synthesizer
    pub fn unbind(&mut self) -> Option<Box<dyn Synth>> {
        self.stop_speaking();
        self.synth.take()
    }

    pub fn is_bound(&self) -> bool {
        self.synth.is_some()
    }

    // ========== Settings ==========

    /// Register the new-word listener, replacing any previous one
    pub fn set_on_new_word<F>(&mut self, listener: F)
    where
        F: FnMut(usize, usize, &str) + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn set_pan(&mut self, pan: f32) {
        self.params.pan = pan;
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.params.volume = volume;
    }

    pub fn set_stream(&mut self, stream: AudioStream) {
        self.params.stream = stream;
    }

    /// Pause before each word is handed to the synthesizer
    pub fn set_delay(&mut self, milliseconds: u64) {
        self.delay = Duration::from_millis(milliseconds);
    }

    pub fn set_style(&mut self, style: HighlightStyle) {
        self.style = style;
    }

    // ========== Accessors ==========

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn text(&self) -> &str {
        self.document.text()
    }

    pub fn style(&self) -> &HighlightStyle {
        &self.style
    }

    pub fn params(&self) -> &SpeechParams {
        &self.params
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Word currently highlighted
    pub fn highlighted(&self) -> Option<WordSpan> {
        self.document.highlighted()
    }

    /// Utterance whose completion playback is waiting for
    pub fn pending_utterance(&self) -> Option<&UtteranceTag> {
        self.armed.as_ref()
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            offset: self.offset,
            speaking: self.speaking,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.speaking {
            Phase::Speaking
        } else if self.offset > 0 {
            Phase::Paused
        } else {
            Phase::Idle
        }
    }

    // ========== Playback control ==========

    /// Start speaking from the current offset
    ///
    /// Does nothing while already speaking or when there is no word in the
    /// text. Fails only when no synthesizer is bound.
    pub fn start_speaking(&mut self) -> Result<()> {
        let synth = self.synth.as_ref().ok_or(TalkError::NotBound)?;

        if self.speaking || synth.is_speaking() {
            debug!("Already speaking, ignoring start");
            return Ok(());
        }

        if self.document.is_blank() {
            debug!("Nothing to speak");
            self.speaking = false;
            return Ok(());
        }

        info!("Speaking from offset {}", self.offset);
        self.speaking = true;
        self.advance();
        Ok(())
    }

    /// Stop speaking but keep the position
    pub fn pause_speaking(&mut self) {
        if !self.speaking && self.armed.is_none() && self.scheduler.is_empty() {
            return;
        }

        self.speaking = false;
        self.scheduler.cancel_all();
        self.armed = None;

        if let Some(synth) = self.synth.as_mut() {
            if let Err(e) = synth.stop() {
                warn!("Failed to stop synthesizer: {}", e);
            }
        }

        info!("Paused at offset {}", self.offset);
    }

    /// Stop speaking, rewind to the start and remove the highlight
    pub fn stop_speaking(&mut self) {
        self.pause_speaking();
        self.offset = 0;
        self.document.clear_highlight();
    }

    /// Replace the displayed text, stopping any playback
    pub fn update_text(&mut self, text: impl Into<String>) {
        self.stop_speaking();
        self.document = Document::new(text);
        debug!("Text replaced ({} bytes)", self.document.len());
    }

    /// Highlight the next word and schedule it to be spoken
    fn advance(&mut self) {
        let span = match next_span(self.document.text(), self.offset) {
            Some(span) => span,
            None => {
                debug!("No words after offset {}, stopping", self.offset);
                self.scheduler.schedule(Duration::ZERO, Task::Stop);
                return;
            }
        };

        if let Some(listener) = self.listener.as_mut() {
            listener(span.start, span.end, span.word(self.document.text()));
        }

        self.document.highlight(span);
        // Past the delimiter, but never beyond the end of the text
        self.offset = offset_after(self.document.text(), span);

        self.serial += 1;
        let tag = UtteranceTag::new(span.start, self.serial);
        debug!("Next word {}..{} as {}", span.start, span.end, tag);
        self.scheduler.schedule(self.delay, Task::Speak { span, tag });
    }

    /// Send a scheduled word to the synthesizer
    fn speak_word(&mut self, span: WordSpan, tag: UtteranceTag) {
        if !self.speaking {
            return;
        }

        let params = self.params.with_utterance_id(tag.clone());
        self.armed = Some(tag.clone());

        let result = match self.synth.as_mut() {
            Some(synth) => synth.speak(
                span.word(self.document.text()),
                QueueMode::Add,
                &params,
                &tag,
            ),
            None => Err(TalkError::NotBound),
        };

        if let Err(e) = result {
            warn!("Utterance {} failed to start: {}", tag, e);
            self.stop_speaking();
        }
    }

    // ========== Event loop integration ==========

    /// Feed one synthesizer event into the state machine
    pub fn handle_event(&mut self, event: SynthEvent) {
        match event {
            SynthEvent::Started(tag) => debug!("Utterance {} started", tag),
            SynthEvent::Done(tag) => self.on_utterance_done(&tag),
            SynthEvent::Error(tag) => self.on_utterance_error(&tag),
        }
    }

    /// Handle every event waiting on `events` without blocking
    ///
    /// Returns the number of events handled.
    pub fn drain_events(&mut self, events: &Receiver<SynthEvent>) -> usize {
        let mut handled = 0;
        while let Ok(event) = events.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    pub fn on_utterance_done(&mut self, tag: &UtteranceTag) {
        if self.armed.as_ref() != Some(tag) {
            debug!("Ignoring stale completion for {}", tag);
            return;
        }

        self.armed = None;
        if self.speaking {
            self.advance();
        }
    }

    pub fn on_utterance_error(&mut self, tag: &UtteranceTag) {
        if self.armed.as_ref() != Some(tag) {
            debug!("Ignoring stale error for {}", tag);
            return;
        }

        warn!("Utterance {} failed, stopping playback", tag);
        self.armed = None;
        self.stop_speaking();
    }

    /// Run deferred work that is due now
    ///
    /// Returns true if any task ran
    pub fn run_scheduled(&mut self) -> bool {
        self.run_scheduled_at(Instant::now())
    }

    /// Run deferred work due at `now`
    pub fn run_scheduled_at(&mut self, now: Instant) -> bool {
        let mut ran = false;
        while let Some(task) = self.scheduler.pop_due(now) {
            ran = true;
            match task {
                Task::Speak { span, tag } => self.speak_word(span, tag),
                Task::Stop => self.stop_speaking(),
            }
        }
        ran
    }

    /// Time until the next deferred task, for use as a poll timeout
    pub fn time_until_next_scheduled(&self) -> Option<Duration> {
        self.scheduler.time_until_next(Instant::now())
    }

    // ========== Persistence ==========

    /// Bundle the owner's state with the playback offset
    pub fn save_state(&self, owner: Value) -> SavedState {
        SavedState::new(owner, self.offset)
    }

    /// Restore the offset from `saved` and hand back the owner's state
    ///
    /// Playback is not resumed; the next `start_speaking` continues from the
    /// restored offset.
    pub fn restore_state(&mut self, saved: SavedState) -> Value {
        self.pause_speaking();
        self.offset = saved.offset.min(self.document.len());
        debug!("Restored offset {}", self.offset);
        saved.owner
    }
}
