//! talkingtext - a text view that reads itself aloud
//!
//! Splits the displayed text into whitespace-delimited words, hands them to a
//! speech synthesizer one at a time, and keeps the spoken word highlighted
//! until the synthesizer reports it finished.

pub mod error;
pub mod playback;
pub mod speech;
pub mod state;
pub mod text;
pub mod view;

pub use error::{Result, TalkError};
pub use playback::{Phase, PlaybackState, TalkingText};
pub use state::{SavedState, TalkingOptions};
pub use text::{next_span, Document, WordSpan};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "talkingtext";
