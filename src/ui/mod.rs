mod addresses;
mod chat;
mod goods_detail;
mod goods_list;
mod home;
mod orders;
mod profile;
mod wallet;

use chrono::Utc;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, InputMode, Screen};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match app.screen {
        Screen::Home => home::render(frame, app, chunks[1]),
        Screen::Goods => goods_list::render(frame, app, chunks[1]),
        Screen::GoodsDetail => goods_detail::render(frame, app, chunks[1]),
        Screen::Orders => orders::render(frame, app, chunks[1]),
        Screen::Conversations => chat::render_conversations(frame, app, chunks[1]),
        Screen::Messages => chat::render_messages(frame, app, chunks[1]),
        Screen::Profile => profile::render(frame, app, chunks[1]),
        Screen::Wallet => wallet::render(frame, app, chunks[1]),
        Screen::Addresses => addresses::render(frame, app, chunks[1]),
    }

    render_status_bar(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.screen {
        Screen::Home => "stall - Home".to_string(),
        Screen::Goods => match app.goods_filter.keyword.as_deref() {
            Some(keyword) => format!("stall - Goods \"{}\"", keyword),
            None => "stall - Goods".to_string(),
        },
        Screen::GoodsDetail => match &app.current_goods {
            Some(goods) => format!("stall - {}", truncate(&goods.title, 50)),
            None => "stall - Goods".to_string(),
        },
        Screen::Orders => format!("stall - Orders ({})", app.order_role),
        Screen::Conversations => {
            if app.unread > 0 {
                format!("stall - Chats ({} unread)", app.unread)
            } else {
                "stall - Chats".to_string()
            }
        }
        Screen::Messages => match &app.chat_peer {
            Some(peer) => format!("stall - Chat with {}", peer.nickname),
            None => "stall - Chat".to_string(),
        },
        Screen::Profile => "stall - Profile".to_string(),
        Screen::Wallet => "stall - Wallet".to_string(),
        Screen::Addresses => "stall - Addresses".to_string(),
    };

    let header = Paragraph::new(Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )]))
    .style(Style::default().bg(Color::DarkGray));

    frame.render_widget(header, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if app.input_mode != InputMode::Normal {
        let prompt = match app.input_mode {
            InputMode::Search => "search",
            InputMode::Chat => "message (/img <path> to send a picture)",
            InputMode::Recharge => "recharge amount",
            InputMode::NewAddress => "recipient, phone, region, street",
            InputMode::Review(_) => "review ([1-5] text)",
            InputMode::Normal => "",
        };
        Line::from(vec![
            Span::styled(format!("{}> ", prompt), Style::default().fg(Color::Cyan)),
            Span::raw(app.input.clone()),
            Span::styled("▏", Style::default().fg(Color::Yellow)),
        ])
    } else if let Some(error) = &app.error {
        Line::from(vec![Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )])
    } else if let Some(notice) = &app.notice {
        Line::from(vec![Span::styled(
            notice.clone(),
            Style::default().fg(Color::Green),
        )])
    } else if app.is_loading() {
        Line::from(vec![Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        )])
    } else {
        let help = match app.screen {
            Screen::Home => {
                "Tab: sections | j/k: nav | Enter: open | g/o/c/p/w/a: goods/orders/chats/profile/wallet/addr | r: refresh | q: quit"
            }
            Screen::Goods => "j/k: nav | Enter: open | /: search | r: refresh | q: back",
            Screen::GoodsDetail => {
                "j/k: comments | b: buy | f/F: (un)favorite | w/W: (un)follow seller | m: chat | q: back"
            }
            Screen::Orders => "Tab: bought/sold | j/k: nav | Enter: act | r: refresh | q: back",
            Screen::Conversations => "j/k: nav | Enter: open | r: refresh | q: back",
            Screen::Messages => "j/k: nav | i: write | r: refresh | q: back",
            Screen::Profile => "Tab: favorites/follows | j/k: nav | Enter: open | d: remove | q: back",
            Screen::Wallet => "i: recharge | r: refresh | q: back",
            Screen::Addresses => "n: add | d: delete | D: set default | j/k: nav | q: back",
        };
        Line::from(vec![Span::styled(help, Style::default().fg(Color::Gray))])
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}

/// Char-boundary-safe truncation with an ellipsis; titles here are often CJK.
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", keep)
}

pub(crate) fn format_age(dt: chrono::DateTime<chrono::Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(dt);

    if duration.num_days() > 0 {
        format!("{}d", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m", duration.num_minutes())
    } else {
        "now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_string_unchanged() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn truncate_long_string_gets_ellipsis() {
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn truncate_handles_multibyte() {
        // Must not panic on non-ASCII boundaries
        assert_eq!(truncate("二手自行车九成新出售", 8), "二手自行车...");
    }
}
