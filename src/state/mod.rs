//! Settings and persisted playback state
//!
//! Configuration is read once at startup and turned into [`TalkingOptions`];
//! [`SavedState`] carries the playback offset across owner restarts.

pub mod config;
pub mod options;
pub mod saved;

pub use config::Config;
pub use options::TalkingOptions;
pub use saved::{SavedState, StateStore};
