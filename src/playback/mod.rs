//! Playback controller and its deferred-task queue

pub mod controller;
pub mod scheduler;

pub use controller::{Phase, PlaybackState, TalkingText, WordListener};
pub use scheduler::{Scheduler, Task};
