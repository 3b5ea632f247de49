use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    Address, AddressDraft, Announcement, ChatMessage, Comment, Conversation, FollowedUser, Goods,
    GoodsFilter, Order, OrderRole, Page, Profile,
};

// Page sizes are fixed per screen; the backend caps pageSize at 20.
pub const GOODS_PAGE_SIZE: u32 = 10;
pub const HOT_PAGE_SIZE: u32 = 10;
pub const FAVORITES_PAGE_SIZE: u32 = 10;
pub const ORDERS_PAGE_SIZE: u32 = 10;
pub const MESSAGES_PAGE_SIZE: u32 = 20;
pub const CONVERSATIONS_PAGE_SIZE: u32 = 20;
pub const FOLLOWS_PAGE_SIZE: u32 = 20;
pub const COMMENTS_PAGE_SIZE: u32 = 10;
pub const ANNOUNCEMENTS_PAGE_SIZE: u32 = 10;

/// The remote marketplace, as seen by the client. Implemented by
/// [`HttpBackend`](crate::api::HttpBackend) in production and by in-memory
/// stubs in tests.
#[async_trait]
#[allow(dead_code)]
pub trait Backend: Send + Sync + std::fmt::Debug {
    // Paged lists. `page` is 1-based; each returns one page plus the
    // backend's total count for that query.
    async fn list_goods(&self, filter: &GoodsFilter, page: u32) -> Result<Page<Goods>>;
    async fn list_hot_goods(&self, page: u32) -> Result<Page<Goods>>;
    async fn list_favorites(&self, user_id: u64, page: u32) -> Result<Page<Goods>>;
    async fn list_orders(&self, role: OrderRole, page: u32) -> Result<Page<Order>>;
    async fn list_messages(&self, peer_id: u64, page: u32) -> Result<Page<ChatMessage>>;
    async fn list_conversations(&self, page: u32) -> Result<Page<Conversation>>;
    async fn list_follows(&self, user_id: u64, page: u32) -> Result<Page<FollowedUser>>;
    async fn list_comments(&self, goods_id: u64, page: u32) -> Result<Page<Comment>>;
    async fn list_announcements(&self, page: u32) -> Result<Page<Announcement>>;

    // Single-shot reads
    async fn get_goods(&self, id: u64) -> Result<Goods>;
    async fn get_profile(&self, user_id: u64) -> Result<Profile>;
    async fn unread_count(&self) -> Result<u32>;
    async fn wallet_balance(&self) -> Result<i64>;
    async fn list_addresses(&self) -> Result<Vec<Address>>;

    // Order lifecycle
    async fn create_order(&self, goods_id: u64, address_id: u64) -> Result<u64>;
    async fn pay_order(&self, order_id: u64) -> Result<()>;
    async fn ship_order(&self, order_id: u64) -> Result<()>;
    async fn confirm_order(&self, order_id: u64) -> Result<()>;
    async fn review_order(&self, order_id: u64, rating: u8, content: &str) -> Result<()>;

    // Social
    async fn set_favorite(&self, goods_id: u64, on: bool) -> Result<()>;
    async fn set_follow(&self, user_id: u64, on: bool) -> Result<()>;
    async fn send_message(&self, peer_id: u64, content: &str) -> Result<()>;

    // Wallet and addresses
    async fn recharge(&self, amount_cents: i64) -> Result<()>;
    async fn add_address(&self, draft: &AddressDraft) -> Result<u64>;
    async fn delete_address(&self, address_id: u64) -> Result<()>;
    async fn set_default_address(&self, address_id: u64) -> Result<()>;

    /// Upload an image to the object-store collaborator; returns the stored URL.
    async fn upload_image(&self, seller_id: u64, filename: &str, bytes: Vec<u8>) -> Result<String>;
}
