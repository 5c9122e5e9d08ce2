use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::session::TimerMode;

/// Which control currently owns the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Command,
    Url,
    Completed,
    Total,
    Work,
    Break,
}

impl Focus {
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Focus::Completed | Focus::Total | Focus::Work | Focus::Break
        )
    }
}

/// Every state mutation a key can trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Edit(Focus),
    Insert(char),
    Paste(String),
    Backspace,
    /// Enter in the URL field: resolve and load
    Load,
    /// Leave the field being edited
    Blur,
    ToggleTheatre,
    HideProgress,
    ShowProgress,
    SwitchMode(TimerMode),
    ToggleTimer,
    ResetTimer,
    OpenVideo,
    Quit,
}

/// Maps one key press to at most one action, given what has focus.
pub fn bind(focus: Focus, key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    match focus {
        Focus::Command => bind_command(key.code),
        Focus::Url => match key.code {
            KeyCode::Enter => Some(Action::Load),
            KeyCode::Esc | KeyCode::Tab => Some(Action::Blur),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Char(c) => Some(Action::Insert(c)),
            _ => None,
        },
        _ => match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Tab => Some(Action::Blur),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Char(c) => Some(Action::Insert(c)),
            _ => None,
        },
    }
}

fn bind_command(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Char('u') => Action::Edit(Focus::Url),
        KeyCode::Char('c') => Action::Edit(Focus::Completed),
        KeyCode::Char('T') => Action::Edit(Focus::Total),
        KeyCode::Char('w') => Action::Edit(Focus::Work),
        KeyCode::Char('b') => Action::Edit(Focus::Break),
        KeyCode::Char('t') => Action::ToggleTheatre,
        KeyCode::Char('h') => Action::HideProgress,
        KeyCode::Char('s') => Action::ShowProgress,
        KeyCode::Char('1') => Action::SwitchMode(TimerMode::Pomodoro),
        KeyCode::Char('2') => Action::SwitchMode(TimerMode::Counter),
        KeyCode::Char(' ') | KeyCode::Char('p') => Action::ToggleTimer,
        KeyCode::Char('r') => Action::ResetTimer,
        KeyCode::Char('o') => Action::OpenVideo,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        _ => return None,
    };
    Some(action)
}
