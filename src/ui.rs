use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthChar;
use webbrowser::Browser;

use crate::{
    app::StudySession,
    keymap::Focus,
    session::{Phase, SessionState, TimerMode},
    timer::TickScheduler,
    util::format_time,
};

const THEATRE_PLAYER_PERCENT: u16 = 70;
const NORMAL_PLAYER_PERCENT: u16 = 50;
const URL_PLACEHOLDER: &str = "Paste YouTube video or playlist URL... (u)";
const PLAYER_PLACEHOLDER: &str = "Paste a YouTube URL above to start focusing";
const CURSOR: &str = "▏";

/// Where each panel of the study screen goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub player: Rect,
    pub timer: Rect,
    pub progress: Rect,
    pub help: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect, state: &SessionState) -> Self {
        let player_percent = if state.theatre_mode {
            THEATRE_PLAYER_PERCENT
        } else {
            NORMAL_PLAYER_PERCENT
        };
        let progress_height = if state.progress_visible { 5 } else { 1 };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Percentage(player_percent),
                Constraint::Length(3),
                Constraint::Length(progress_height),
                Constraint::Min(0),
            ])
            .split(area);

        Self {
            header: chunks[0],
            player: chunks[1],
            timer: chunks[2],
            progress: chunks[3],
            help: chunks[4],
        }
    }
}

impl<S: TickScheduler> Widget for &StudySession<S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = ScreenLayout::new(area, self.state());

        render_header(self, layout.header, buf);
        render_player(self.state(), layout.player, buf);
        render_timer(self, layout.timer, buf);
        if self.state().progress_visible {
            render_progress(self, layout.progress, buf);
        } else {
            render_collapsed_progress(layout.progress, buf);
        }
        render_help(layout.help, buf);
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn focused_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

/// The longest suffix of `text` that fits in `width` columns.
fn tail_to_width(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (idx, c) in text.char_indices().rev() {
        used += c.width().unwrap_or(0);
        if used > width {
            return &text[idx + c.len_utf8()..];
        }
    }
    text
}

/// A numeric field: the raw buffer while editing, the state value otherwise.
fn field_span<S: TickScheduler>(
    session: &StudySession<S>,
    focus: Focus,
    value: u32,
    disabled: bool,
) -> Span<'static> {
    match session.field_input() {
        Some(raw) if session.focus() == focus => Span::styled(
            format!("[{}{}]", raw, CURSOR),
            bold().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED),
        ),
        _ if disabled => Span::styled(format!("[{}]", value), dim()),
        _ => Span::styled(format!("[{}]", value), bold()),
    }
}

fn render_header<S: TickScheduler>(session: &StudySession<S>, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(14)])
        .split(area);

    let editing = session.focus() == Focus::Url;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focused_border(editing))
        .title(Span::styled(" Focus Study ", bold().fg(Color::Cyan)));
    let inner_width = block.inner(chunks[0]).width as usize;

    let field = match (editing, session.url_input().is_empty()) {
        (true, _) => {
            let visible = tail_to_width(session.url_input(), inner_width.saturating_sub(1));
            Line::from(vec![Span::raw(visible.to_string()), Span::raw(CURSOR)])
        }
        (false, true) => Line::from(Span::styled(
            URL_PLACEHOLDER,
            dim().add_modifier(Modifier::ITALIC),
        )),
        (false, false) => Line::from(Span::raw(
            tail_to_width(session.url_input(), inner_width).to_string(),
        )),
    };
    Paragraph::new(field).block(block).render(chunks[0], buf);

    let theatre = if session.state().theatre_mode {
        "⊟ (t)"
    } else {
        "⊡ (t)"
    };
    Paragraph::new(Span::styled(theatre, bold()))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Theatre "))
        .render(chunks[1], buf);
}

fn render_player(state: &SessionState, area: Rect, buf: &mut Buffer) {
    let block = Block::default().borders(Borders::ALL).title(" Player ");

    let lines = match &state.video {
        Some(video) => {
            let kind = if video.is_playlist() {
                "Playlist"
            } else {
                "Video"
            };
            let mut lines = vec![
                Line::from(Span::styled(
                    format!("▶ {} {}", kind, video.id()),
                    bold().fg(Color::Green),
                )),
                Line::from(""),
                Line::from(Span::styled(video.embed_url(), dim())),
            ];
            if Browser::is_available() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "(o)pen in browser",
                    Style::default().add_modifier(Modifier::ITALIC),
                )));
            }
            lines
        }
        None => vec![Line::from(Span::styled(
            PLAYER_PLACEHOLDER,
            Style::default().fg(Color::Gray),
        ))],
    };

    // vertically center inside the panel
    let inner = block.inner(area);
    let pad = inner.height.saturating_sub(lines.len() as u16) / 2;
    let mut padded = vec![Line::from(""); pad as usize];
    padded.extend(lines);

    Paragraph::new(padded)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn render_timer<S: TickScheduler>(session: &StudySession<S>, area: Rect, buf: &mut Buffer) {
    let state = session.state();
    let selected = bold().fg(Color::Black).bg(Color::Cyan);

    let mode_span = |mode: TimerMode, label: &'static str| {
        if state.timer_mode == mode {
            Span::styled(label, selected)
        } else {
            Span::styled(label, dim())
        }
    };

    let mut spans = vec![
        mode_span(TimerMode::Pomodoro, " (1) Pomodoro "),
        Span::raw(" "),
        mode_span(TimerMode::Counter, " (2) Counter "),
        Span::raw("   "),
    ];

    if state.timer_mode == TimerMode::Pomodoro {
        let phase = match state.phase {
            Phase::Work => Span::styled("🎯 Work", bold().fg(Color::Red)),
            Phase::Break => Span::styled("☕ Break", bold().fg(Color::Green)),
        };
        spans.extend([
            phase,
            Span::raw("  "),
            field_span(session, Focus::Work, state.work_minutes, state.running),
            Span::styled(" min work (w) ", dim()),
            field_span(session, Focus::Break, state.break_minutes, state.running),
            Span::styled(" min break (b)", dim()),
            Span::raw("   "),
        ]);
    }

    spans.extend([
        Span::styled(format_time(state.display_seconds()), bold()),
        Span::raw("   "),
        Span::styled(if state.running { "⏸" } else { "▶" }, bold()),
        Span::styled(" (space)  ↻ (r)", dim()),
    ]);

    Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(" Timer "))
        .render(area, buf);
}

fn render_progress<S: TickScheduler>(session: &StudySession<S>, area: Rect, buf: &mut Buffer) {
    let state = session.state();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(" Course Progress ", bold()))
        .title_top(Line::from(Span::styled(" ▲ (h) ", dim())).right_aligned());
    let inner = block.inner(area);
    block.render(area, buf);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let counts = Line::from(vec![
        field_span(session, Focus::Completed, state.completed_count, false),
        Span::styled(" (c) / ", dim()),
        field_span(session, Focus::Total, state.total_count, false),
        Span::styled(" (T) videos completed", dim()),
    ]);
    Paragraph::new(counts).render(rows[0], buf);

    Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
        .ratio(state.progress_ratio())
        .label(Span::styled(state.progress_label(), bold()))
        .render(rows[1], buf);
}

fn render_collapsed_progress(area: Rect, buf: &mut Buffer) {
    Paragraph::new(Span::styled("▼ Show Progress (s)", dim()))
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_help(area: Rect, buf: &mut Buffer) {
    let items = [
        "• (u) paste a YouTube video or playlist URL, Enter to load, (o) to open it",
        "• (t) toggle theatre mode for a bigger player",
        "• (1) Pomodoro work/break cycles or (2) Counter, (space) start/pause, (r) reset",
        "• (c)/(T) track course progress, (h)/(s) hide or show it",
        "• (q) quit. Stay focused and productive! 🎯",
    ];
    let lines: Vec<Line> = items
        .iter()
        .map(|item| Line::from(Span::styled(*item, Style::default().fg(Color::Gray))))
        .collect();

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" How to Use "))
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::Action;
    use crate::timer::ManualScheduler;

    fn session() -> StudySession<ManualScheduler> {
        StudySession::new(SessionState::default(), ManualScheduler::new())
    }

    fn rendered(session: &StudySession<ManualScheduler>, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        session.render(area, &mut buffer);

        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn empty_session_shows_placeholders() {
        let text = rendered(&session(), 120, 40);
        assert!(text.contains("Focus Study"));
        assert!(text.contains(PLAYER_PLACEHOLDER));
        assert!(text.contains("25:00"));
        assert!(text.contains("Course Progress"));
        assert!(text.contains("0%"));
    }

    #[test]
    fn loaded_video_shows_embed_url() {
        let mut s = session();
        s.load("https://www.youtube.com/watch?v=abc123");
        let text = rendered(&s, 120, 40);
        assert!(text.contains("https://www.youtube.com/embed/abc123?autoplay=1"));
        assert!(!text.contains(PLAYER_PLACEHOLDER));
    }

    #[test]
    fn over_complete_progress_label() {
        let mut s = session();
        s.apply(Action::Edit(Focus::Completed));
        s.apply(Action::Backspace);
        s.apply(Action::Insert('1'));
        s.apply(Action::Insert('2'));
        s.apply(Action::Blur);
        let text = rendered(&s, 120, 40);
        assert!(text.contains("120%"));
    }

    #[test]
    fn collapsed_progress() {
        let mut s = session();
        s.apply(Action::HideProgress);
        let text = rendered(&s, 120, 40);
        assert!(text.contains("Show Progress"));
        assert!(!text.contains("Course Progress"));
    }

    #[test]
    fn counter_mode_hides_minute_fields() {
        let mut s = session();
        s.apply(Action::SwitchMode(TimerMode::Counter));
        let text = rendered(&s, 140, 40);
        assert!(!text.contains("min work"));
        assert!(text.contains("00:00"));
    }

    #[test]
    fn theatre_mode_gives_player_more_room() {
        let area = Rect::new(0, 0, 100, 60);
        let theatre = ScreenLayout::new(area, &SessionState::default());
        let normal = ScreenLayout::new(
            area,
            &SessionState {
                theatre_mode: false,
                ..SessionState::default()
            },
        );
        assert!(theatre.player.height > normal.player.height);
        assert_eq!(theatre.player.width, normal.player.width);
    }

    #[test]
    fn hidden_progress_takes_one_row() {
        let area = Rect::new(0, 0, 100, 60);
        let layout = ScreenLayout::new(
            area,
            &SessionState {
                progress_visible: false,
                ..SessionState::default()
            },
        );
        assert_eq!(layout.progress.height, 1);
    }

    #[test]
    fn small_area_does_not_panic() {
        let s = session();
        let _ = rendered(&s, 20, 5);
    }

    #[test]
    fn tail_to_width_keeps_the_end() {
        assert_eq!(tail_to_width("abcdef", 3), "def");
        assert_eq!(tail_to_width("abc", 10), "abc");
        assert_eq!(tail_to_width("", 0), "");
    }
}
