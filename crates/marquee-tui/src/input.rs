use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input action that can be performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    JumpToTop,
    JumpToBottom,
    TogglePointer,
    Rotate,
    Reset,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Esc, _) => Action::Quit,

        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => Action::ScrollDown,
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => Action::ScrollUp,
        (KeyCode::Char('d'), KeyModifiers::CONTROL) | (KeyCode::PageDown, _) => Action::PageDown,
        (KeyCode::Char('u'), KeyModifiers::CONTROL) | (KeyCode::PageUp, _) => Action::PageUp,
        (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => Action::JumpToTop,
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => Action::JumpToBottom,

        (KeyCode::Char('p'), KeyModifiers::NONE) => Action::TogglePointer,
        (KeyCode::Char('o'), KeyModifiers::NONE) => Action::Rotate,
        (KeyCode::Char('r'), KeyModifiers::NONE) => Action::Reset,

        _ => Action::None,
    }
}
