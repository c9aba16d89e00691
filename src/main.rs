//! talkingtext main entry point
//!
//! Displays a text file and reads it aloud word by word. The event loop
//! watches stdin for playback keys, drains synthesizer events, and runs the
//! view's deferred tasks when they come due.

use anyhow::{bail, Context};
use log::{debug, error, info, warn};
use mio::{Events, Interest, Poll, Token};
use serde_json::json;
use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use talkingtext::speech::create_synth;
use talkingtext::state::{Config, StateStore};
use talkingtext::view::{
    self, create_default_keymap, get_terminal_size, is_tty, key_actions, KeyAction, TermiosGuard,
};
use talkingtext::{Phase, TalkingText};

/// Token for stdin in mio poll
const STDIN: Token = Token(0);

/// Longest the loop sleeps before checking synthesizer events
const MAX_WAIT: Duration = Duration::from_millis(50);

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let debug_mode = args.iter().any(|arg| arg == "--debug" || arg == "-d");

    if debug_mode {
        // Debug mode: write to talkingtext.log
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("talkingtext.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open talkingtext.log for debug logging: {}", e);
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }
        info!("talkingtext {} starting (debug mode)", talkingtext::VERSION);
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Error)
            .init();
    }

    let files: Vec<&String> = args
        .iter()
        .filter(|arg| *arg != "--debug" && *arg != "-d")
        .collect();
    let path = match files.as_slice() {
        [path] => PathBuf::from(path),
        _ => {
            eprintln!("Usage: {} [--debug] FILE", talkingtext::APP_NAME);
            process::exit(2);
        }
    };

    if let Err(e) = run(&path) {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(path: &Path) -> anyhow::Result<()> {
    let stdin_fd = io::stdin().as_raw_fd();
    if !is_tty(stdin_fd) {
        bail!("talkingtext needs an interactive terminal (stdin is not a TTY)");
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = Config::load().context("Failed to load configuration")?;
    info!("Configuration loaded from {:?}", config.path());

    let mut talking = TalkingText::new(text, &config.options());
    talking.set_on_new_word(|start, end, word| debug!("Word {}..{}: {:?}", start, end, word));

    let synth = create_synth().context("No speech synthesizer")?;
    let events = talking
        .bind(synth)
        .context("Speech synthesizer cannot report word completion")?;

    // Resume position from the previous run, without speaking
    let key = path
        .canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string();
    let store = StateStore::new(StateStore::default_dir()?);
    match store.load(&key) {
        Ok(Some(saved)) => {
            talking.restore_state(saved);
        }
        Ok(None) => {}
        Err(e) => warn!("Ignoring saved state: {}", e),
    }

    let keymap = create_default_keymap();
    let _guard = TermiosGuard::raw(stdin_fd)?;

    let mut poll = Poll::new()?;
    let mut stdin_source = mio::unix::SourceFd(&stdin_fd);
    poll.registry()
        .register(&mut stdin_source, STDIN, Interest::READABLE)?;
    let mut mio_events = Events::with_capacity(16);

    info!("Entering event loop");
    let mut last_drawn = None;

    loop {
        let snapshot = (talking.highlighted(), talking.phase(), talking.offset());
        if last_drawn != Some(snapshot) {
            draw(&talking, stdin_fd)?;
            last_drawn = Some(snapshot);
        }

        let timeout = talking
            .time_until_next_scheduled()
            .map_or(MAX_WAIT, |d| d.min(MAX_WAIT));

        if let Err(e) = poll.poll(&mut mio_events, Some(timeout)) {
            if e.kind() != io::ErrorKind::Interrupted {
                return Err(e.into());
            }
        }

        for event in mio_events.iter() {
            if event.token() != STDIN {
                continue;
            }

            let mut buf = [0u8; 64];
            let n = io::stdin().read(&mut buf)?;
            if n == 0 {
                return quit(&mut talking, &store, &key);
            }

            let actions = key_actions(&keymap, &buf[..n]);
            if actions.is_empty() {
                debug!("Unbound key {:?}", &buf[..n]);
            }
            for action in actions {
                match action {
                    KeyAction::TogglePause => {
                        if talking.is_speaking() {
                            talking.pause_speaking();
                        } else if let Err(e) = talking.start_speaking() {
                            error!("Cannot start speaking: {}", e);
                        }
                    }
                    KeyAction::Stop => talking.stop_speaking(),
                    KeyAction::Quit => return quit(&mut talking, &store, &key),
                }
            }
        }

        talking.drain_events(&events);
        talking.run_scheduled();
    }
}

/// Save the playback position and release the synthesizer
fn quit(talking: &mut TalkingText, store: &StateStore, key: &str) -> anyhow::Result<()> {
    talking.pause_speaking();
    let saved = talking.save_state(json!({ "path": key }));
    if let Err(e) = store.save(key, &saved) {
        warn!("Failed to save playback position: {}", e);
    }
    talking.unbind();

    let mut stdout = io::stdout();
    write!(stdout, "\r\n")?;
    stdout.flush()?;
    info!("Exiting at offset {}", saved.offset);
    Ok(())
}

/// Redraw the whole screen: text, then a status line
fn draw(talking: &TalkingText, fd: i32) -> anyhow::Result<()> {
    let (cols, rows) = get_terminal_size(fd)?;
    let document = talking.document();
    let body = view::render(document, talking.style(), cols);

    let status = match talking.phase() {
        Phase::Idle => "idle",
        Phase::Speaking => "speaking",
        Phase::Paused => "paused",
    };

    let mut stdout = io::stdout();
    write!(stdout, "\x1b[2J\x1b[H{}", body)?;

    // Status on the bottom row when the text leaves room, else below it
    if view::rendered_rows(&body) < usize::from(rows) {
        write!(stdout, "\x1b[{};1H", rows)?;
    } else {
        write!(stdout, "\r\n\r\n")?;
    }
    write!(
        stdout,
        "\x1b[7m [{}] word {}/{}  space: play/pause  s: stop  q: quit \x1b[0m",
        status,
        document.words_before(talking.offset()),
        document.word_count()
    )?;
    stdout.flush()?;
    Ok(())
}
