//! Speech synthesis system

pub mod backends;
pub mod events;
pub mod synth;

pub use events::{EventSink, SynthEvent, UtteranceTag};
pub use synth::{create_synth, AudioStream, QueueMode, SpeechParams, Synth};
