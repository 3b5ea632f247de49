use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::types::{fmt_cents, OrderRole, OrderStatus};

use super::{format_age, truncate};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(format!(
        " {} orders ({} of {}) ",
        app.order_role,
        app.orders.len(),
        app.orders.total()
    ));

    if app.orders.is_empty() && !app.orders.is_loading() {
        let empty = Paragraph::new("No orders")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let fixed = 52; // status(11) + hint(10) + amount(10) + peer(~13) + age(4) + gaps
    let flex = w.saturating_sub(fixed).max(10);

    let items: Vec<ListItem> = app
        .orders
        .items()
        .iter()
        .enumerate()
        .map(|(i, order)| {
            let style = if i == app.order_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let status_color = match order.status {
                OrderStatus::Created => Color::Yellow,
                OrderStatus::Paid | OrderStatus::Shipped => Color::Cyan,
                OrderStatus::Completed | OrderStatus::Reviewed => Color::Green,
                OrderStatus::Cancelled => Color::DarkGray,
            };

            let peer = match app.order_role {
                OrderRole::Bought => &order.seller,
                OrderRole::Sold => &order.buyer,
            };

            // Next step available on Enter, if any
            let hint = match app.order_role {
                OrderRole::Bought => order.status.buyer_action(),
                OrderRole::Sold => (order.status == OrderStatus::Paid).then_some("ship"),
            };
            let hint = hint.map(|h| format!("⏎ {}", h)).unwrap_or_default();

            let line = Line::from(vec![
                Span::styled(
                    format!("{:<11}", order.status.to_string()),
                    Style::default().fg(status_color),
                ),
                Span::styled(format!("{:<10}", hint), Style::default().fg(Color::Yellow)),
                Span::styled(format!("{:<flex$}", truncate(&order.goods_title, flex)), style),
                Span::raw(" "),
                Span::styled(
                    format!("{:>9}", fmt_cents(order.amount_cents)),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("@{:<12}", truncate(&peer.nickname, 12)),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    format_age(order.created_at),
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
    state.select(Some(app.order_index));
    frame.render_stateful_widget(list, area, &mut state);
}
