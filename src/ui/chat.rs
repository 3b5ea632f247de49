use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::types::MessageKind;

use super::{format_age, truncate};

pub fn render_conversations(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Conversations ({}) ", app.conversations.len()));

    if app.conversations.is_empty() && !app.conversations.is_loading() {
        let empty = Paragraph::new("No conversations yet")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let flex = w.saturating_sub(28).max(10);

    let items: Vec<ListItem> = app
        .conversations
        .items()
        .iter()
        .enumerate()
        .map(|(i, conversation)| {
            let style = if i == app.conversation_index {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let unread = if conversation.unread > 0 {
                format!("({}) ", conversation.unread)
            } else {
                String::new()
            };

            let line = Line::from(vec![
                Span::styled(
                    format!("@{:<14}", truncate(&conversation.peer.nickname, 14)),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(unread, Style::default().fg(Color::Red)),
                Span::styled(
                    format!("{:<flex$}", truncate(&conversation.last_message, flex)),
                    style,
                ),
                Span::raw("  "),
                Span::styled(
                    format_age(conversation.updated_at),
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
    state.select(Some(app.conversation_index));
    frame.render_stateful_widget(list, area, &mut state);
}

pub fn render_messages(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(format!(
        " Messages ({} of {}) ",
        app.messages.len(),
        app.messages.total()
    ));

    if app.messages.is_empty() && !app.messages.is_loading() {
        let empty = Paragraph::new("No messages - press i to say hello")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let peer_id = app
        .chat_peer
        .as_ref()
        .map(|peer| peer.id)
        .unwrap_or_default();

    let items: Vec<ListItem> = app
        .messages
        .items()
        .iter()
        .enumerate()
        .map(|(i, message)| {
            let style = if i == app.message_index {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            // Lists arrive newest-first; sender side decides the color
            let from_peer = message.from_id == peer_id;
            let who_color = if from_peer { Color::Cyan } else { Color::Green };
            let content = match message.kind {
                MessageKind::Text => message.content.clone(),
                MessageKind::Image => format!("[image] {}", message.content),
            };

            let line = Line::from(vec![
                Span::styled(
                    format!("{:>4} ", format_age(message.created_at)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    if from_peer { "them " } else { "  me " },
                    Style::default().fg(who_color),
                ),
                Span::styled(content, style),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(app.message_index));
    frame.render_stateful_widget(list, area, &mut state);
}
