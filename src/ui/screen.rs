use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::clock::Clock;
use crate::delay::DelayPicker;
use crate::round_timer::{RoundTimer, Surface};
use crate::session::{SessionEnd, Summary};

pub const NEUTRAL: Color = Color::Rgb(237, 255, 172);
pub const RED: Color = Color::Rgb(206, 63, 63);
pub const GREEN: Color = Color::Rgb(78, 197, 78);

/// A panel in the main area of the screen
pub trait Screen {
    fn render(&self, area: Rect, buf: &mut Buffer);

    /// Whether clicks landing on this panel reach the round timer
    fn accepts_clicks(&self) -> bool {
        false
    }
}

/// The coloured reaction surface
pub struct SurfaceScreen {
    pub surface: Surface,
    pub round: Option<(usize, usize)>,
}

impl SurfaceScreen {
    pub fn background(&self) -> Color {
        match self.surface {
            Surface::Neutral => NEUTRAL,
            Surface::Waiting => RED,
            Surface::Armed => GREEN,
        }
    }

    pub fn caption(&self) -> &'static str {
        match self.surface {
            Surface::Neutral => "Click in this area",
            Surface::Waiting => "Wait for green...",
            Surface::Armed => "Click!",
        }
    }
}

impl Screen for SurfaceScreen {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .style(Style::default().bg(self.background()).fg(Color::Black));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 {
            return;
        }

        let mut lines = vec![Line::from(Span::styled(
            self.caption(),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if let Some((round, total)) = self.round {
            lines.push(Line::from(format!("round {round}/{total}")));
        }

        let text_height = (lines.len() as u16).min(inner.height);
        let centered = Rect {
            y: inner.y + (inner.height - text_height) / 2,
            height: text_height,
            ..inner
        };

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(centered, buf);
    }

    fn accepts_clicks(&self) -> bool {
        true
    }
}

/// Average and counts shown once a session ends
pub struct SummaryScreen {
    pub summary: Summary,
    pub ending: Option<SessionEnd>,
}

impl Screen for SummaryScreen {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let title = match self.ending {
            Some(SessionEnd::Stopped) => "Session stopped",
            _ => "Session complete",
        };

        let best = self
            .summary
            .best_ms
            .map_or_else(|| "-".to_string(), |ms| format!("{ms} ms"));

        let lines = vec![
            Line::from(Span::styled(title, bold_style.fg(Color::Cyan))),
            Line::from(""),
            Line::from(vec![
                Span::raw("Average reaction time: "),
                Span::styled(format!("{} ms", self.summary.average_display()), bold_style),
            ]),
            Line::from(format!(
                "{} measured   {} missed   best {}   {:.2} sd",
                self.summary.measured, self.summary.missed, best, self.summary.std_dev_ms
            )),
            Line::from(""),
            Line::from(Span::styled("(s)tart a new session", dim_style)),
        ];

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Summary"))
            .render(area, buf);
    }
}

/// Helper to construct the panel for the timer's current state
pub fn current_screen<C: Clock, D: DelayPicker>(
    timer: &RoundTimer<C, D>,
) -> Option<Box<dyn Screen>> {
    if timer.surface_visible() {
        let session = timer.session();
        let round = timer
            .is_running()
            .then(|| (session.attempt_index + 1, session.max_attempts));
        Some(Box::new(SurfaceScreen {
            surface: timer.surface(),
            round,
        }))
    } else if timer.summary_visible() {
        Some(Box::new(SummaryScreen {
            summary: timer.summary(),
            ending: timer.session().ending,
        }))
    } else {
        None
    }
}
