use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::types::fmt_cents;

use super::{format_age, truncate};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" Goods ({} of {}) ", app.goods.len(), app.goods.total());
    let block = Block::default().borders(Borders::ALL).title(title);

    if app.goods.is_empty() && !app.goods.is_loading() {
        let empty = Paragraph::new("No goods found - try / to change the search")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let fixed = 46; // prices(20) + discount(10) + seller(~12) + age(4)
    let flex = w.saturating_sub(fixed).max(10);

    let items: Vec<ListItem> = app
        .goods
        .items()
        .iter()
        .enumerate()
        .map(|(i, goods)| {
            let style = if i == app.goods_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let line = Line::from(vec![
                Span::styled(format!("{:<flex$}", truncate(&goods.title, flex)), style),
                Span::raw(" "),
                Span::styled(
                    format!("{:>9}", fmt_cents(goods.price_cents)),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    format!("{:>9}", fmt_cents(goods.group_price_cents)),
                    Style::default().fg(Color::Green),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{:<9}", goods.discount_text),
                    Style::default().fg(Color::Magenta),
                ),
                Span::styled(
                    format!("@{:<11}", truncate(&goods.seller.nickname, 11)),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    format_age(goods.created_at),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(app.goods_index));
    frame.render_stateful_widget(list, area, &mut state);
}
