use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::action::ProfileTab;
use crate::app::App;
use crate::types::fmt_cents;

use super::{format_age, truncate};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    render_profile_card(frame, app, chunks[0]);
    match app.profile_tab {
        ProfileTab::Favorites => render_favorites(frame, app, chunks[1]),
        ProfileTab::Follows => render_follows(frame, app, chunks[1]),
    }
}

fn render_profile_card(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Me ");

    let lines = match &app.profile {
        Some(profile) => vec![
            Line::from(vec![
                Span::styled(
                    profile.user.nickname.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(
                    format!(
                        "{} listed, {} sold",
                        profile.goods_count, profile.sold_count
                    ),
                    Style::default().fg(Color::Gray),
                ),
            ]),
            Line::from(Span::styled(
                profile.signature.clone(),
                Style::default().fg(Color::DarkGray),
            )),
        ],
        None => vec![Line::from(Span::styled(
            "Loading profile...",
            Style::default().fg(Color::Gray),
        ))],
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_favorites(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(format!(
        " Favorites ({} of {}) ",
        app.favorites.len(),
        app.favorites.total()
    ));

    if app.favorites.is_empty() && !app.favorites.is_loading() {
        let empty = Paragraph::new("No favorites yet")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let flex = w.saturating_sub(26).max(10);

    let items: Vec<ListItem> = app
        .favorites
        .items()
        .iter()
        .enumerate()
        .map(|(i, goods)| {
            let style = if i == app.favorite_index {
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
                    format!("{:>9}", fmt_cents(goods.group_price_cents)),
                    Style::default().fg(Color::Green),
                ),
                Span::raw("  "),
                Span::styled(goods.status.to_string(), Style::default().fg(Color::Gray)),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(app.favorite_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_follows(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(format!(
        " Following ({} of {}) ",
        app.follows.len(),
        app.follows.total()
    ));

    if app.follows.is_empty() && !app.follows.is_loading() {
        let empty = Paragraph::new("Not following anyone")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .follows
        .items()
        .iter()
        .enumerate()
        .map(|(i, follow)| {
            let style = if i == app.follow_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let line = Line::from(vec![
                Span::styled(format!("@{:<20}", truncate(&follow.user.nickname, 20)), style),
                Span::styled(
                    format!("followed {} ago", format_age(follow.followed_at)),
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
    state.select(Some(app.follow_index));
    frame.render_stateful_widget(list, area, &mut state);
}
