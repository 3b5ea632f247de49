use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::types::fmt_cents;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Wallet ");

    let lines = match app.balance_cents {
        Some(balance) => vec![
            Line::raw(""),
            Line::from(vec![
                Span::raw("  Balance: "),
                Span::styled(
                    fmt_cents(balance),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::raw(""),
            Line::from(Span::styled(
                "  Press i to recharge",
                Style::default().fg(Color::Gray),
            )),
        ],
        None => vec![
            Line::raw(""),
            Line::from(Span::styled(
                "  Loading balance...",
                Style::default().fg(Color::Gray),
            )),
        ],
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
