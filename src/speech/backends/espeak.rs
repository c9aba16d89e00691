//! espeak-ng subprocess backend
//!
//! Each word is spoken by its own `espeak-ng` process. A watcher thread polls
//! the process and reports `Done` when it exits cleanly or `Error` when it
//! fails. Processes killed by `stop` report nothing. The watcher and `stop`
//! share the `Child` under one lock, so a process is never signalled after it
//! has been reaped.
//!
//! Dependencies:
//! - espeak-ng (install with: sudo apt install espeak-ng)

use crate::speech::{
    AudioStream, EventSink, QueueMode, SpeechParams, Synth, SynthEvent, UtteranceTag,
};
use crate::{Result, TalkError};
use log::{debug, error, warn};
use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// How often the watcher checks whether the process exited
const WATCH_INTERVAL: Duration = Duration::from_millis(20);

/// A running espeak-ng process
struct Utterance {
    child: Arc<Mutex<Child>>,
    /// Set by the watcher once the process has exited
    finished: Arc<AtomicBool>,
    /// Set by `cancel`; suppresses the exit event
    cancelled: Arc<AtomicBool>,
}

impl Utterance {
    /// Watch `child`, reporting its exit as `tag` through `sink`
    fn watch(child: Child, sink: Option<EventSink>, tag: UtteranceTag) -> Self {
        let utterance = Self {
            child: Arc::new(Mutex::new(child)),
            finished: Arc::new(AtomicBool::new(false)),
            cancelled: Arc::new(AtomicBool::new(false)),
        };

        let child = utterance.child.clone();
        let finished = utterance.finished.clone();
        let cancelled = utterance.cancelled.clone();
        thread::spawn(move || {
            let status = Self::wait(&child);
            finished.store(true, Ordering::SeqCst);

            if cancelled.load(Ordering::SeqCst) {
                debug!("espeak-ng utterance {} cancelled", tag);
                return;
            }

            match status {
                Ok(status) if status.success() => {
                    EspeakSynth::report(&sink, SynthEvent::Done(tag));
                }
                Ok(status) => {
                    warn!("espeak-ng exited with {} for {}", status, tag);
                    EspeakSynth::report(&sink, SynthEvent::Error(tag));
                }
                Err(e) => {
                    error!("Failed to wait for espeak-ng: {}", e);
                    EspeakSynth::report(&sink, SynthEvent::Error(tag));
                }
            }
        });

        utterance
    }

    /// Poll until the process exits; the lock is held only per check
    fn wait(child: &Mutex<Child>) -> io::Result<ExitStatus> {
        loop {
            let polled = match child.lock() {
                Ok(mut child) => child.try_wait(),
                Err(_) => Err(io::Error::new(io::ErrorKind::Other, "child lock poisoned")),
            };
            match polled? {
                Some(status) => return Ok(status),
                None => thread::sleep(WATCH_INTERVAL),
            }
        }
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Silence the process without reporting its exit
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        match self.child.lock() {
            // A reaped child is not signalled again
            Ok(mut child) => {
                if let Err(e) = child.kill() {
                    debug!("Failed to kill espeak-ng process {}: {}", child.id(), e);
                }
            }
            Err(e) => error!("espeak-ng child lock poisoned: {}", e),
        }
    }
}

/// espeak-ng backend
pub struct EspeakSynth {
    /// Path to espeak-ng
    espeak_path: String,

    /// Voice name for espeak-ng
    voice: String,

    sink: Option<EventSink>,

    current: Option<Utterance>,
}

impl EspeakSynth {
    /// Create a new espeak-ng synthesizer
    ///
    /// Verifies espeak-ng is installed
    pub fn new() -> Result<Self> {
        debug!("Creating espeak-ng backend");

        let espeak_path = Self::find_espeak()?;
        debug!("Found espeak-ng at: {}", espeak_path);

        Ok(Self {
            espeak_path,
            voice: "en".to_string(),
            sink: None,
            current: None,
        })
    }

    /// Find espeak-ng executable
    fn find_espeak() -> Result<String> {
        let paths = ["espeak-ng", "/usr/bin/espeak-ng", "/usr/local/bin/espeak-ng"];

        for path in paths {
            if let Ok(status) = Command::new(path)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
            {
                if status.success() {
                    return Ok(path.to_string());
                }
            }
        }

        Err(TalkError::Speech(
            "espeak-ng not found. Install with: sudo apt install espeak-ng".to_string(),
        ))
    }

    /// Convert volume (0.0-1.0) to espeak amplitude (0-200)
    fn volume_to_amplitude(volume: f32) -> u8 {
        (volume.clamp(0.0, 1.0) * 200.0).round() as u8
    }

    /// Convert a locale such as "en_US" to an espeak voice name ("en-us")
    fn locale_to_voice(locale: &str) -> String {
        locale.trim().replace('_', "-").to_lowercase()
    }

    fn report(sink: &Option<EventSink>, event: SynthEvent) {
        if let Some(sink) = sink {
            if sink.send(event).is_err() {
                debug!("Event receiver gone, dropping utterance event");
            }
        }
    }
}

impl Synth for EspeakSynth {
    fn set_event_sink(&mut self, sink: EventSink) -> Result<()> {
        self.sink = Some(sink);
        Ok(())
    }

    fn speak(
        &mut self,
        text: &str,
        mode: QueueMode,
        params: &SpeechParams,
        tag: &UtteranceTag,
    ) -> Result<()> {
        if self.is_speaking() {
            // Words are sent one at a time; overlapping requests mean the
            // caller lost track of an utterance
            warn!("espeak-ng still speaking while {} was queued ({:?})", tag, mode);
        }
        if params.pan != 0.0 {
            debug!("espeak-ng has no pan control, ignoring pan {}", params.pan);
        }
        if params.stream != AudioStream::System {
            debug!("espeak-ng plays on the default output, ignoring {:?}", params.stream);
        }

        let mut cmd = Command::new(&self.espeak_path);
        cmd.arg("-v").arg(&self.voice);
        cmd.arg("-a").arg(Self::volume_to_amplitude(params.volume).to_string());
        cmd.arg("--").arg(text);
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        let child = cmd.spawn().map_err(|e| {
            error!("Failed to spawn espeak-ng: {}", e);
            TalkError::Speech(format!("Failed to start espeak-ng: {}", e))
        })?;

        debug!("espeak-ng speaking {:?} as {}", text, tag);
        Self::report(&self.sink, SynthEvent::Started(tag.clone()));
        self.current = Some(Utterance::watch(child, self.sink.clone(), tag.clone()));

        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(utterance) = self.current.take() {
            debug!("Stopping espeak-ng utterance");
            utterance.cancel();
        }
        Ok(())
    }

    fn is_speaking(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|u| !u.is_finished())
    }

    fn set_language(&mut self, locale: &str) -> Result<()> {
        let voice = Self::locale_to_voice(locale);
        if voice.is_empty() {
            return Err(TalkError::Speech("Empty locale".to_string()));
        }
        debug!("Setting voice to {}", voice);
        self.voice = voice;
        Ok(())
    }
}

impl Drop for EspeakSynth {
    fn drop(&mut self) {
        debug!("Shutting down espeak-ng backend");
        let _ = self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_conversion() {
        assert_eq!(EspeakSynth::volume_to_amplitude(0.0), 0);
        assert_eq!(EspeakSynth::volume_to_amplitude(0.5), 100);
        assert_eq!(EspeakSynth::volume_to_amplitude(1.0), 200);
        assert_eq!(EspeakSynth::volume_to_amplitude(3.0), 200);
    }

    #[test]
    fn test_locale_to_voice() {
        assert_eq!(EspeakSynth::locale_to_voice("en_US"), "en-us");
        assert_eq!(EspeakSynth::locale_to_voice(" it "), "it");
    }

    use std::sync::mpsc;

    fn wait_finished(utterance: &Utterance) {
        for _ in 0..250 {
            if utterance.is_finished() {
                return;
            }
            thread::sleep(Duration::from_millis(20));
        }
        panic!("process never finished");
    }

    #[test]
    fn test_clean_exit_reports_done() {
        let (tx, rx) = mpsc::channel();
        let child = Command::new("true").spawn().unwrap();
        let tag = UtteranceTag::new(0, 1);
        let _utterance = Utterance::watch(child, Some(tx), tag.clone());

        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event, SynthEvent::Done(tag));
    }

    #[test]
    fn test_failed_exit_reports_error() {
        let (tx, rx) = mpsc::channel();
        let child = Command::new("false").spawn().unwrap();
        let tag = UtteranceTag::new(3, 2);
        let _utterance = Utterance::watch(child, Some(tx), tag.clone());

        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event, SynthEvent::Error(tag));
    }

    #[test]
    fn test_cancel_kills_silently() {
        let (tx, rx) = mpsc::channel();
        let child = Command::new("sleep").arg("30").spawn().unwrap();
        let utterance = Utterance::watch(child, Some(tx), UtteranceTag::new(0, 1));
        assert!(!utterance.is_finished());

        utterance.cancel();
        wait_finished(&utterance);
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn test_cancel_after_reap_sends_no_signal() {
        let (tx, rx) = mpsc::channel();
        let child = Command::new("true").spawn().unwrap();
        let utterance = Utterance::watch(child, Some(tx), UtteranceTag::new(0, 1));
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        wait_finished(&utterance);

        // The pid may already belong to another process; the reaped handle
        // must not signal it
        utterance.cancel();
        assert!(utterance.child.lock().unwrap().try_wait().unwrap().is_some());
    }

    #[test]
    fn test_create_espeak_synth() {
        match EspeakSynth::new() {
            Ok(synth) => {
                assert!(!synth.is_speaking());
                println!("✓ espeak-ng backend available");
            }
            Err(e) => println!("⚠ espeak-ng backend not available: {}", e),
        }
    }
}
