use log::{debug, info};

use crate::{
    embed::{self, EmbedRef},
    keymap::{self, Action, Focus},
    runtime::AppEvent,
    session::{SessionState, TimerMode},
    timer::{TickId, TickScheduler, TimerEngine},
};

/// What part of the screen a mutation touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    Nothing,
    Timer,
    Progress,
    Full,
}

impl Update {
    pub fn needs_redraw(self) -> bool {
        self != Update::Nothing
    }
}

/// What the event loop should do after an event
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Continue(Update),
    Open(EmbedRef),
    Quit,
}

/// The study screen: state, clock, and whichever field is being edited
#[derive(Debug)]
pub struct StudySession<S: TickScheduler> {
    state: SessionState,
    timer: TimerEngine<S>,
    focus: Focus,
    url_input: String,
    field_input: String,
}

impl<S: TickScheduler> StudySession<S> {
    pub fn new(state: SessionState, scheduler: S) -> Self {
        Self::with_timer(state, TimerEngine::new(scheduler))
    }

    pub fn with_timer(state: SessionState, timer: TimerEngine<S>) -> Self {
        Self {
            state,
            timer,
            focus: Focus::Command,
            url_input: String::new(),
            field_input: String::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn timer(&self) -> &TimerEngine<S> {
        &self.timer
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn url_input(&self) -> &str {
        &self.url_input
    }

    /// Raw text of the numeric field being edited, if any
    pub fn field_input(&self) -> Option<&str> {
        self.focus.is_numeric().then_some(self.field_input.as_str())
    }

    /// Resolves `input` and makes it the loaded video; unrecognized input
    /// unloads whatever was there.
    pub fn load(&mut self, input: &str) {
        self.url_input = input.to_string();
        self.state.video = embed::resolve(input);
        match &self.state.video {
            Some(video) => info!("loaded {}", video),
            None => info!("no embeddable video in {:?}", input),
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Flow {
        match event {
            AppEvent::Tick(id) => Flow::Continue(self.on_tick(id)),
            AppEvent::Resize => Flow::Continue(Update::Full),
            AppEvent::Paste(text) => match self.focus {
                Focus::Command => Flow::Continue(Update::Nothing),
                _ => Flow::Continue(self.apply(Action::Paste(text))),
            },
            AppEvent::Key(key) => match keymap::bind(self.focus, key) {
                None => Flow::Continue(Update::Nothing),
                Some(Action::Quit) => Flow::Quit,
                Some(Action::OpenVideo) => match &self.state.video {
                    Some(video) => Flow::Open(video.clone()),
                    None => Flow::Continue(Update::Nothing),
                },
                Some(action) => Flow::Continue(self.apply(action)),
            },
        }
    }

    pub fn on_tick(&mut self, id: TickId) -> Update {
        if self.timer.on_tick(&mut self.state, id) {
            Update::Timer
        } else {
            Update::Nothing
        }
    }

    /// Applies one action. `Quit` and `OpenVideo` belong to the event loop
    /// and change nothing here.
    pub fn apply(&mut self, action: Action) -> Update {
        debug!("action {:?} (focus {:?})", action, self.focus);
        match action {
            Action::Edit(focus) => self.edit(focus),
            Action::Insert(c) => self.insert(&c.to_string()),
            Action::Paste(text) => self.insert(&text),
            Action::Backspace => {
                match self.focus {
                    Focus::Command => return Update::Nothing,
                    Focus::Url => {
                        self.url_input.pop();
                        return Update::Full;
                    }
                    _ => {
                        self.field_input.pop();
                    }
                }
                self.apply_field()
            }
            Action::Load => {
                let input = self.url_input.clone();
                self.load(&input);
                self.focus = Focus::Command;
                Update::Full
            }
            Action::Blur => self.blur(),
            Action::ToggleTheatre => {
                self.state.theatre_mode = !self.state.theatre_mode;
                Update::Full
            }
            Action::HideProgress => {
                self.state.progress_visible = false;
                if matches!(self.focus, Focus::Completed | Focus::Total) {
                    self.focus = Focus::Command;
                }
                Update::Full
            }
            Action::ShowProgress => {
                self.state.progress_visible = true;
                Update::Full
            }
            Action::SwitchMode(mode) => {
                self.timer.switch_mode(&mut self.state, mode);
                if matches!(self.focus, Focus::Work | Focus::Break) {
                    self.focus = Focus::Command;
                }
                Update::Full
            }
            Action::ToggleTimer => {
                self.timer.toggle(&mut self.state);
                // minute fields are locked while the clock runs
                if self.state.running && matches!(self.focus, Focus::Work | Focus::Break) {
                    self.focus = Focus::Command;
                    return Update::Full;
                }
                Update::Timer
            }
            Action::ResetTimer => {
                self.timer.reset(&mut self.state);
                Update::Timer
            }
            Action::OpenVideo | Action::Quit => Update::Nothing,
        }
    }

    fn edit(&mut self, focus: Focus) -> Update {
        let allowed = match focus {
            Focus::Command | Focus::Url => true,
            Focus::Completed | Focus::Total => self.state.progress_visible,
            Focus::Work | Focus::Break => {
                self.state.timer_mode == TimerMode::Pomodoro && !self.state.running
            }
        };
        if !allowed {
            return Update::Nothing;
        }

        self.field_input = match focus {
            Focus::Completed => self.state.completed_count.to_string(),
            Focus::Total => self.state.total_count.to_string(),
            Focus::Work => self.state.work_minutes.to_string(),
            Focus::Break => self.state.break_minutes.to_string(),
            Focus::Command | Focus::Url => String::new(),
        };
        self.focus = focus;
        Update::Full
    }

    fn blur(&mut self) -> Update {
        if self.focus == Focus::Command {
            return Update::Nothing;
        }
        self.focus = Focus::Command;
        self.field_input.clear();
        Update::Full
    }

    fn insert(&mut self, text: &str) -> Update {
        match self.focus {
            Focus::Command => Update::Nothing,
            Focus::Url => {
                self.url_input
                    .extend(text.chars().filter(|c| !c.is_control()));
                Update::Full
            }
            _ => {
                let before = self.field_input.len();
                self.field_input
                    .extend(text.chars().filter(|c| c.is_ascii_digit() || *c == '-'));
                if self.field_input.len() == before {
                    return Update::Nothing;
                }
                self.apply_field()
            }
        }
    }

    /// Pushes the numeric field buffer into state, as on every keystroke of
    /// a number input.
    fn apply_field(&mut self) -> Update {
        let raw = self.field_input.as_str();
        match self.focus {
            Focus::Completed => {
                self.state.set_completed(raw);
                Update::Progress
            }
            Focus::Total => {
                self.state.set_total(raw);
                Update::Progress
            }
            Focus::Work => {
                self.state.set_work_minutes(raw);
                Update::Timer
            }
            Focus::Break => {
                self.state.set_break_minutes(raw);
                Update::Timer
            }
            Focus::Command | Focus::Url => Update::Nothing,
        }
    }
}
