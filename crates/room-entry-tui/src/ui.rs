use anyhow::{anyhow, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};
use std::io;
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::form::{Field, FormController, FormState, Submit};
use crate::input::{map_key, pop_grapheme, push_capped, Action, Focus};
use crate::nav::Navigator;
use crate::store::KvStore;

const CARD_WIDTH: u16 = 40;
const CARD_HEIGHT: u16 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Joined(String),
    Cancelled,
}

/// Runs the "Enter Room" screen until the user joins or cancels.
pub fn run<S: KvStore, N: Navigator>(
    controller: &mut FormController<S, N>,
    max_field_len: usize,
) -> Result<()> {
    enable_raw_mode()?;
    let mut terminal = undo_on_err(enter_screen, || {
        let _ = disable_raw_mode();
    })?;

    let res = event_loop(&mut terminal, controller, max_field_len);
    cleanup(&mut terminal)?;
    match res? {
        Flow::Cancelled => Err(anyhow!("cancelled")),
        _ => Ok(()),
    }
}

/// Runs `setup`; if it fails, `undo` reverts whatever was done before it.
fn undo_on_err<T>(setup: impl FnOnce() -> Result<T>, undo: impl FnOnce()) -> Result<T> {
    setup().map_err(|e| {
        undo();
        e
    })
}

fn enter_screen() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    match Terminal::new(backend) {
        Ok(t) => Ok(t),
        Err(e) => {
            let mut out = io::stdout();
            let _ = execute!(out, LeaveAlternateScreen);
            Err(e.into())
        }
    }
}

fn event_loop<B: Backend, S: KvStore, N: Navigator>(
    terminal: &mut Terminal<B>,
    controller: &mut FormController<S, N>,
    max_field_len: usize,
) -> Result<Flow> {
    let mut focus = Focus::Field(Field::RoomId);
    loop {
        terminal.draw(|f| draw(f, controller.state(), focus))?;

        if let Event::Key(key) = event::read()? {
            let Some(action) = map_key(key) else { continue };
            match apply(controller, &mut focus, action, max_field_len) {
                Flow::Continue => {}
                done => return Ok(done),
            }
        }
    }
}

/// Feeds one key action into the form.
pub fn apply<S: KvStore, N: Navigator>(
    controller: &mut FormController<S, N>,
    focus: &mut Focus,
    action: Action,
    max_field_len: usize,
) -> Flow {
    match action {
        Action::Cancel => return Flow::Cancelled,
        Action::FocusNext => *focus = focus.next(),
        Action::FocusPrev => *focus = focus.prev(),
        Action::Insert(ch) => {
            if let Some(field) = focus.field() {
                let current = controller.state().values.get(field);
                if let Some(next) = push_capped(current, ch, max_field_len) {
                    controller.set_field(field, next);
                }
            }
        }
        Action::Backspace => {
            if let Some(field) = focus.field() {
                let next = pop_grapheme(controller.state().values.get(field));
                controller.set_field(field, next);
            }
        }
        Action::Submit => match controller.submit() {
            Submit::Joined(path) => return Flow::Joined(path),
            Submit::Blocked => {
                // jump to the first field that needs fixing
                if let Some(field) = Field::ALL
                    .into_iter()
                    .find(|f| controller.state().errors.get(*f).is_some())
                {
                    debug!(field = field.key(), "focus invalid field");
                    *focus = Focus::Field(field);
                }
            }
        },
    }
    Flow::Continue
}

fn label(field: Field) -> &'static str {
    match field {
        Field::RoomId => "Room ID",
        Field::Name => "Your Name",
    }
}

fn placeholder(field: Field) -> &'static str {
    match field {
        Field::RoomId => "Enter Room ID",
        Field::Name => "Enter Your Name",
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

pub fn draw(f: &mut Frame, state: &FormState, focus: Focus) {
    let size = f.size();
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(CARD_HEIGHT), Constraint::Length(1)])
        .split(size);

    let card = centered(outer[0], CARD_WIDTH, CARD_HEIGHT);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled("Enter Room", Style::default().add_modifier(Modifier::BOLD)));
    let inner = block.inner(card);
    f.render_widget(block, card);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    for (field, (input_area, error_area)) in
        Field::ALL.into_iter().zip([(rows[0], rows[1]), (rows[2], rows[3])])
    {
        draw_field(f, state, field, focus == Focus::Field(field), input_area, error_area);
    }

    let button_style = if focus == Focus::Button {
        Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let button = Paragraph::new(Span::styled("[ Join Room ]", button_style)).alignment(Alignment::Center);
    f.render_widget(button, rows[4]);

    let footer = Paragraph::new(Span::styled(
        "tab: next field  enter: join  esc: quit",
        Style::default().fg(Color::Gray),
    ))
    .alignment(Alignment::Center);
    f.render_widget(footer, outer[1]);
}

fn draw_field(f: &mut Frame, state: &FormState, field: Field, focused: bool, area: Rect, error_area: Rect) {
    let error = state.visible_error(field);
    let accent = match (error, focused) {
        (Some(_), _) => Style::default().fg(Color::Red),
        (None, true) => Style::default().fg(Color::Cyan),
        (None, false) => Style::default(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(accent)
        .title(Span::styled(label(field), accent));
    let inner = block.inner(area);

    let value = state.values.get(field);
    // keep one column free for the cursor
    let shown = visible_tail(value, inner.width.saturating_sub(1) as usize);
    let text = if value.is_empty() {
        let dim = if error.is_some() { Color::Red } else { Color::DarkGray };
        Line::from(Span::styled(placeholder(field), Style::default().fg(dim)))
    } else {
        Line::from(shown)
    };
    f.render_widget(Paragraph::new(text).block(block), area);

    if let Some(msg) = error {
        let p = Paragraph::new(Span::styled(msg, Style::default().fg(Color::Red)));
        f.render_widget(p, error_area);
    }

    if focused && inner.width > 0 {
        let typed = Line::from(shown).width() as u16;
        let x = inner.x + typed.min(inner.width - 1);
        f.set_cursor(x, inner.y);
    }
}

/// Longest suffix of `value` that fits in `cols` terminal columns.
fn visible_tail(value: &str, cols: usize) -> &str {
    let mut used = 0;
    let mut start = value.len();
    for (i, g) in value.grapheme_indices(true).rev() {
        let w = Span::raw(g).width();
        if used + w > cols {
            break;
        }
        used += w;
        start = i;
    }
    &value[start..]
}

fn cleanup(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    let w = terminal.backend_mut();
    execute!(w, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
