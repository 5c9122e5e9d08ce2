// Library surface for headless/integration tests and reuse.
// The binary only adds terminal setup and the CLI on top of this.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod embed;
pub mod keymap;
pub mod runtime;
pub mod session;
pub mod timer;
pub mod ui;
pub mod util;

pub use app::{Flow, StudySession, Update};
pub use session::{Phase, SessionState, TimerMode};
