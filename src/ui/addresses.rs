use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::App;

use super::truncate;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Addresses ({}) ", app.addresses.len()));

    if app.addresses.is_empty() {
        let empty = Paragraph::new("No addresses - press n to add one")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let flex = w.saturating_sub(38).max(10);

    let items: Vec<ListItem> = app
        .addresses
        .iter()
        .enumerate()
        .map(|(i, address)| {
            let style = if i == app.address_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let marker = if address.is_default { "*" } else { " " };

            let line = Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Green)),
                Span::raw(" "),
                Span::styled(format!("{:<12}", truncate(&address.recipient, 12)), style),
                Span::styled(
                    format!("{:<13}", address.phone),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    format!(
                        "{:<flex$}",
                        truncate(&format!("{} {}", address.region, address.detail), flex)
                    ),
                    Style::default().fg(Color::Gray),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(app.address_index));
    frame.render_stateful_widget(list, area, &mut state);
}
