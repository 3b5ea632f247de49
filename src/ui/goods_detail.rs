use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::App;
use crate::types::fmt_cents;

use super::{format_age, truncate};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(9), Constraint::Percentage(45)])
        .split(area);

    render_detail(frame, app, chunks[0]);
    render_comments(frame, app, chunks[1]);
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Listing ");

    let Some(goods) = &app.current_goods else {
        let empty = Paragraph::new("Loading listing...")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            goods.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(
                fmt_cents(goods.price_cents),
                Style::default().fg(Color::Gray),
            ),
            Span::raw("  "),
            Span::styled(
                format!(
                    "{} with {}+ buyers",
                    fmt_cents(goods.group_price_cents),
                    goods.group_size
                ),
                Style::default().fg(Color::Green),
            ),
            Span::raw("  "),
            Span::styled(
                goods.discount_text.clone(),
                Style::default().fg(Color::Magenta),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format!("@{}", goods.seller.nickname),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw("  "),
            Span::styled(goods.status.to_string(), Style::default().fg(Color::Gray)),
            Span::raw("  "),
            Span::styled(
                format!("listed {} ago", format_age(goods.created_at)),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ];

    if !goods.images.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("{} photo(s): {}", goods.images.len(), goods.images[0]),
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::raw(""));
    lines.push(Line::raw(goods.description.clone()));

    let detail = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(detail, area);
}

fn render_comments(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Comments ({} of {}) ", app.comments.len(), app.comments.total()));

    if app.comments.is_empty() && !app.comments.is_loading() {
        let empty = Paragraph::new("No comments yet")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let flex = w.saturating_sub(22).max(10);

    let items: Vec<ListItem> = app
        .comments
        .items()
        .iter()
        .enumerate()
        .map(|(i, comment)| {
            let style = if i == app.comment_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let line = Line::from(vec![
                Span::styled(
                    format!("@{:<12}", truncate(&comment.author.nickname, 12)),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(format!("{:<flex$}", truncate(&comment.content, flex)), style),
                Span::raw("  "),
                Span::styled(
                    format_age(comment.created_at),
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
    if !app.comments.is_empty() {
        state.select(Some(app.comment_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}
