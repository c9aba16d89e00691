//! Terminal presentation of a talking view

pub mod keymap;
pub mod render;
pub mod terminal;

pub use keymap::{create_default_keymap, key_actions, KeyAction, KeyMap};
pub use render::{render, rendered_rows, style_sequence};
pub use terminal::{get_terminal_size, is_tty, TermiosGuard};
