pub mod score_table;
pub mod screen;

use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
    Frame,
};

use crate::app::App;
use crate::clock::Clock;
use crate::delay::DelayPicker;
use crate::round_timer::Controls;
use screen::Screen;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;
const SCORE_TABLE_WIDTH: u16 = 24;

const START_COLOR: Color = Color::Rgb(2, 106, 42);
const STOP_COLOR: Color = Color::Rgb(252, 184, 18);

const KEYS: [(&str, &str); 5] = [
    ("space", "click"),
    ("s", "start/stop"),
    ("r", "reset scores"),
    ("c", "clear"),
    ("esc", "quit"),
];

pub fn controls_line(controls: Controls) -> Line<'static> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let bg = if controls.running {
        STOP_COLOR
    } else {
        START_COLOR
    };

    let mut spans = vec![Span::styled(
        format!(" {} ", controls.start_label),
        bold_style.bg(bg).fg(Color::White),
    )];
    if controls.reset_visible {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(" Reset ", bold_style.bg(Color::DarkGray)));
    }
    Line::from(spans)
}

pub fn legend() -> String {
    KEYS.iter()
        .map(|(key, action)| format!("({key}) {action}"))
        .join(" / ")
}

pub fn draw<C: Clock, D: DelayPicker>(app: &mut App<C, D>, f: &mut Frame) {
    let area = f.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // controls
            Constraint::Min(5),    // surface/summary + scores
            Constraint::Length(1), // legend
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(SCORE_TABLE_WIDTH)])
        .split(rows[1]);

    let timer = &app.timer;
    let buf = f.buffer_mut();

    Paragraph::new(controls_line(timer.controls())).render(rows[0], buf);

    app.surface_area = match screen::current_screen(timer) {
        Some(panel) => {
            panel.render(columns[0], buf);
            panel.accepts_clicks().then_some(columns[0])
        }
        None => None,
    };

    score_table::render_score_table(
        timer.results(),
        timer.config().max_attempts,
        columns[1],
        buf,
    );

    Paragraph::new(Span::styled(
        legend(),
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(rows[2], buf);
}
