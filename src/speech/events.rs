//! Utterance tags and the callbacks synthesizers report

use std::fmt;
use std::sync::mpsc::Sender;

const UTTERANCE_ID_BASE: &str = "talkingtext.utterance";

/// Identifies one speak request
///
/// Built from the byte offset of the spoken word plus a serial number, so a
/// word spoken again after a pause gets a tag distinct from its first run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UtteranceTag {
    start: usize,
    serial: u64,
}

impl UtteranceTag {
    pub fn new(start: usize, serial: u64) -> Self {
        Self { start, serial }
    }

    /// Offset of the word this utterance speaks
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }
}

impl fmt::Display for UtteranceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", UTTERANCE_ID_BASE, self.start, self.serial)
    }
}

/// Progress reported by a synthesizer for a tagged utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthEvent {
    /// Audio for the utterance began playing
    Started(UtteranceTag),
    /// The utterance finished playing
    Done(UtteranceTag),
    /// The utterance could not be synthesized or played
    Error(UtteranceTag),
}

impl SynthEvent {
    pub fn tag(&self) -> &UtteranceTag {
        match self {
            SynthEvent::Started(tag) | SynthEvent::Done(tag) | SynthEvent::Error(tag) => tag,
        }
    }
}

/// Channel end synthesizers push events into, from any thread
pub type EventSink = Sender<SynthEvent>;
