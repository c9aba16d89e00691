//! Key bindings for the terminal view

use std::collections::HashMap;

/// Key sequence type
pub type KeySequence = Vec<u8>;

/// Key map type
pub type KeyMap = HashMap<KeySequence, KeyAction>;

/// Playback command bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Start when idle or paused, pause when speaking
    TogglePause,
    Stop,
    Quit,
}

/// Create the default keymap
pub fn create_default_keymap() -> KeyMap {
    let mut map = HashMap::new();

    map.insert(b" ".to_vec(), KeyAction::TogglePause);
    map.insert(b"p".to_vec(), KeyAction::TogglePause);
    map.insert(b"\r".to_vec(), KeyAction::TogglePause);

    map.insert(b"s".to_vec(), KeyAction::Stop);
    map.insert(b"\x1b".to_vec(), KeyAction::Stop);

    map.insert(b"q".to_vec(), KeyAction::Quit);
    map.insert(b"\x03".to_vec(), KeyAction::Quit); // Ctrl+C
    map.insert(b"\x04".to_vec(), KeyAction::Quit); // Ctrl+D

    map
}

/// Actions for the bytes of one stdin read, in order
///
/// A read that is exactly a bound sequence maps to that action. Otherwise
/// each byte is looked up on its own, so fast repeated keys arriving in one
/// read all count. Unbound escape sequences (arrow keys and the like) are
/// ignored as a whole rather than read as Esc.
pub fn key_actions(keymap: &KeyMap, input: &[u8]) -> Vec<KeyAction> {
    if let Some(action) = keymap.get(input) {
        return vec![*action];
    }

    if input.len() > 1 && input[0] == 0x1b {
        return Vec::new();
    }

    input
        .iter()
        .filter_map(|byte| keymap.get(std::slice::from_ref(byte)).copied())
        .collect()
}
