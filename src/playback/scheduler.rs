//! Deferred tasks run by the owning event loop
//!
//! Nothing here sleeps: tasks are stored with the instant they become due and
//! the loop asks for the ones that are ready. The loop uses
//! `time_until_next` as its poll timeout.

use crate::speech::UtteranceTag;
use crate::text::WordSpan;
use std::time::{Duration, Instant};

/// Work the playback controller defers to a later loop iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Send the word to the synthesizer
    Speak { span: WordSpan, tag: UtteranceTag },
    /// No words are left; stop playback
    Stop,
}

/// Queue of deferred tasks, ordered by due time then insertion
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: Vec<(Instant, Task)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Run `task` once `delay` has elapsed
    pub fn schedule(&mut self, delay: Duration, task: Task) {
        self.schedule_at(Instant::now() + delay, task);
    }

    pub fn schedule_at(&mut self, when: Instant, task: Task) {
        // Keep sorted; equal instants stay in insertion order
        let idx = self.tasks.partition_point(|(due, _)| *due <= when);
        self.tasks.insert(idx, (when, task));
    }

    /// Remove and return the earliest task due at `now`
    pub fn pop_due(&mut self, now: Instant) -> Option<Task> {
        match self.tasks.first() {
            Some((due, _)) if *due <= now => Some(self.tasks.remove(0).1),
            _ => None,
        }
    }

    /// Drop every pending task
    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Time from `now` until the next task is due
    ///
    /// Returns None if nothing is scheduled, zero if something is overdue
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.tasks
            .first()
            .map(|(due, _)| due.saturating_duration_since(now))
    }
}
