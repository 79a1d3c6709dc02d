use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, Widget},
};

use crate::session::RoundResult;

/// Pure presenter for one scoreboard row; `index` is zero based
pub fn present_row(index: usize, result: &RoundResult) -> Row<'static> {
    let style = match result {
        RoundResult::Measured(ms) if *ms < 250 => Style::default().fg(Color::Green),
        RoundResult::Measured(ms) if *ms < 400 => Style::default().fg(Color::Yellow),
        RoundResult::Measured(_) => Style::default().fg(Color::Red),
        RoundResult::Missed => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    };

    Row::new(vec![
        Cell::from((index + 1).to_string()),
        Cell::from(result.to_string()).style(style),
    ])
}

pub fn render_score_table(
    results: &[RoundResult],
    max_attempts: usize,
    area: Rect,
    buf: &mut Buffer,
) {
    let header = Row::new(vec![Cell::from("#"), Cell::from("Result")]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = results
        .iter()
        .enumerate()
        .map(|(i, r)| present_row(i, r))
        .collect();

    let table = Table::new(rows, [Constraint::Length(4), Constraint::Min(10)])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Scores {}/{}", results.len(), max_attempts)),
        );

    Widget::render(table, area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn table_lists_results_in_order() {
        let area = Rect::new(0, 0, 24, 6);
        let mut buf = Buffer::empty(area);
        render_score_table(
            &[RoundResult::Measured(150), RoundResult::Missed],
            5,
            area,
            &mut buf,
        );

        assert!(row_text(&buf, 0).contains("Scores 2/5"));
        assert!(row_text(&buf, 2).contains("150 ms"));
        assert!(row_text(&buf, 3).contains("Missed"));
        assert!(row_text(&buf, 3).contains('2'));
    }
}
