use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One page of a remote list, as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Compact user record embedded in goods, orders, and conversations.
/// The backend omits it freely, so it must default cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserBrief {
    pub id: u64,
    pub nickname: String,
    pub avatar: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoodsStatus {
    OnSale,
    Reserved,
    Sold,
    Delisted,
}

impl GoodsStatus {
    pub fn from_api(s: &str) -> Self {
        match s {
            "reserved" => GoodsStatus::Reserved,
            "sold" => GoodsStatus::Sold,
            "delisted" => GoodsStatus::Delisted,
            _ => GoodsStatus::OnSale,
        }
    }
}

impl fmt::Display for GoodsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoodsStatus::OnSale => write!(f, "On sale"),
            GoodsStatus::Reserved => write!(f, "Reserved"),
            GoodsStatus::Sold => write!(f, "Sold"),
            GoodsStatus::Delisted => write!(f, "Delisted"),
        }
    }
}

/// A listed item, normalized for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goods {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub price_cents: i64,
    pub group_price_cents: i64,
    /// Buyers needed before the group price unlocks
    pub group_size: u32,
    pub images: Vec<String>,
    pub seller: UserBrief,
    pub category_id: Option<u64>,
    pub status: GoodsStatus,
    pub created_at: DateTime<Utc>,
    /// Derived at normalization time, e.g. "25% off"
    pub discount_text: String,
}

/// Server-side filters for the goods list endpoint
#[derive(Debug, Clone, Default)]
pub struct GoodsFilter {
    pub category_id: Option<u64>,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub author: UserBrief,
    pub content: String,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Which side of an order the current user is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderRole {
    #[default]
    Bought,
    Sold,
}

impl OrderRole {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            OrderRole::Bought => "buyer",
            OrderRole::Sold => "seller",
        }
    }
}

impl fmt::Display for OrderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderRole::Bought => write!(f, "Bought"),
            OrderRole::Sold => write!(f, "Sold"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Created,
    Paid,
    Shipped,
    Completed,
    Reviewed,
    Cancelled,
}

impl OrderStatus {
    pub fn from_api(s: &str) -> Self {
        match s {
            "paid" => OrderStatus::Paid,
            "shipped" => OrderStatus::Shipped,
            "completed" => OrderStatus::Completed,
            "reviewed" => OrderStatus::Reviewed,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Created,
        }
    }

    /// Next action available to the buyer, if any
    pub fn buyer_action(&self) -> Option<&'static str> {
        match self {
            OrderStatus::Created => Some("pay"),
            OrderStatus::Shipped => Some("confirm"),
            OrderStatus::Completed => Some("review"),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Created => write!(f, "Unpaid"),
            OrderStatus::Paid => write!(f, "Paid"),
            OrderStatus::Shipped => write!(f, "Shipped"),
            OrderStatus::Completed => write!(f, "Completed"),
            OrderStatus::Reviewed => write!(f, "Reviewed"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub goods_id: u64,
    pub goods_title: String,
    pub goods_image: Option<String>,
    pub buyer: UserBrief,
    pub seller: UserBrief,
    pub amount_cents: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub peer: UserBrief,
    pub goods_id: Option<u64>,
    pub last_message: String,
    pub unread: u32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Text,
    Image,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub from_id: u64,
    pub to_id: u64,
    pub kind: MessageKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowedUser {
    pub user: UserBrief,
    pub followed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: u64,
    pub recipient: String,
    pub phone: String,
    pub region: String,
    pub detail: String,
    pub is_default: bool,
}

/// Input for creating a new delivery address
#[derive(Debug, Clone, Serialize)]
pub struct AddressDraft {
    pub recipient: String,
    pub phone: String,
    pub region: String,
    pub detail: String,
}

/// Per-user display profile, cached locally per user id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user: UserBrief,
    pub signature: String,
    pub goods_count: u32,
    pub sold_count: u32,
}

/// Format an integer cent amount as "¥12.50"
pub fn fmt_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    format!("{}¥{}.{:02}", sign, abs / 100, abs % 100)
}

/// Derived group-buy discount text, e.g. "25% off". Empty when the group
/// price is not actually a discount.
pub fn discount_label(price_cents: i64, group_price_cents: i64) -> String {
    if price_cents <= 0 || group_price_cents <= 0 || group_price_cents >= price_cents {
        return String::new();
    }
    let pct = ((price_cents - group_price_cents) * 100 + price_cents / 2) / price_cents;
    format!("{}% off", pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_cents_basic() {
        assert_eq!(fmt_cents(1250), "¥12.50");
        assert_eq!(fmt_cents(5), "¥0.05");
        assert_eq!(fmt_cents(0), "¥0.00");
    }

    #[test]
    fn fmt_cents_negative() {
        assert_eq!(fmt_cents(-1999), "-¥19.99");
    }

    #[test]
    fn discount_label_quarter_off() {
        assert_eq!(discount_label(10000, 7500), "25% off");
    }

    #[test]
    fn discount_label_rounds() {
        // 2999 -> 2000 is a 33.3% discount
        assert_eq!(discount_label(2999, 2000), "33% off");
    }

    #[test]
    fn discount_label_no_discount() {
        assert_eq!(discount_label(1000, 1000), "");
        assert_eq!(discount_label(1000, 1200), "");
        assert_eq!(discount_label(0, 0), "");
    }

    #[test]
    fn order_status_from_api_unknown_is_created() {
        assert_eq!(OrderStatus::from_api("???"), OrderStatus::Created);
        assert_eq!(OrderStatus::from_api("shipped"), OrderStatus::Shipped);
    }

    #[test]
    fn buyer_action_by_status() {
        assert_eq!(OrderStatus::Created.buyer_action(), Some("pay"));
        assert_eq!(OrderStatus::Shipped.buyer_action(), Some("confirm"));
        assert_eq!(OrderStatus::Completed.buyer_action(), Some("review"));
        assert_eq!(OrderStatus::Reviewed.buyer_action(), None);
        assert_eq!(OrderStatus::Cancelled.buyer_action(), None);
    }
}
