use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::action::HomeSection;
use crate::app::App;
use crate::types::fmt_cents;

use super::{format_age, truncate};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_announcements(frame, app, chunks[0]);
    render_hot_goods(frame, app, chunks[1]);
}

fn section_block(title: String, is_active: bool) -> Block<'static> {
    let title_style = if is_active {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, title_style))
        .border_style(if is_active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        })
}

fn render_announcements(frame: &mut Frame, app: &App, area: Rect) {
    let is_active = app.home_section == HomeSection::Announcements;
    let block = section_block(
        format!(" Announcements ({}) ", app.announcements.len()),
        is_active,
    );

    if app.announcements.is_empty() && !app.announcements.is_loading() {
        let empty = Paragraph::new("No announcements")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let flex = w.saturating_sub(40).max(10);

    let items: Vec<ListItem> = app
        .announcements
        .items()
        .iter()
        .enumerate()
        .map(|(i, ann)| {
            let style = if is_active && i == app.announcement_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let line = Line::from(vec![
                Span::styled(format!("{:<30}", truncate(&ann.title, 30)), style),
                Span::raw("  "),
                Span::styled(
                    format!("{:<flex$}", truncate(&ann.content, flex)),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw("  "),
                Span::styled(format_age(ann.created_at), Style::default().fg(Color::DarkGray)),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    if is_active && !app.announcements.is_empty() {
        state.select(Some(app.announcement_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_hot_goods(frame: &mut Frame, app: &App, area: Rect) {
    let is_active = app.home_section == HomeSection::HotGoods;
    let block = section_block(format!(" Hot ({}) ", app.hot_goods.len()), is_active);

    if app.hot_goods.is_empty() && !app.hot_goods.is_loading() {
        let empty = Paragraph::new("Nothing trending right now")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let flex = w.saturating_sub(44).max(10);

    let items: Vec<ListItem> = app
        .hot_goods
        .items()
        .iter()
        .enumerate()
        .map(|(i, goods)| {
            let style = if is_active && i == app.hot_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let line = Line::from(vec![
                Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("{:<flex$}", truncate(&goods.title, flex)), style),
                Span::raw("  "),
                Span::styled(
                    format!("{:>9}", fmt_cents(goods.group_price_cents)),
                    Style::default().fg(Color::Green),
                ),
                Span::raw("  "),
                Span::styled(
                    format!("{:<8}", goods.discount_text),
                    Style::default().fg(Color::Magenta),
                ),
                Span::raw("  "),
                Span::styled(
                    format!("@{}", goods.seller.nickname),
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
    if is_active && !app.hot_goods.is_empty() {
        state.select(Some(app.hot_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}
