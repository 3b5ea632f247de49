use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::backend::Backend;
use crate::error::{Result, StallError};
use crate::types::{
    Address, AddressDraft, Announcement, ChatMessage, Comment, Conversation, FollowedUser, Goods,
    GoodsFilter, GoodsStatus, MessageKind, Order, OrderRole, OrderStatus, Page, Profile, UserBrief,
    discount_label,
};

/// Requests that outlive this are reported as recoverable failures instead
/// of hanging the screen.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpBackend {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StallError::Api(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<serde_json::Value> {
        let response = self
            .request(req)
            .send()
            .await
            .map_err(|e| StallError::Api(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(StallError::Auth("backend rejected the token".to_string()));
        }
        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(StallError::Api(format!("backend {}: {}", status, text)));
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| StallError::Api(e.to_string()))?;
        unwrap_envelope(envelope)
    }

    async fn get_data(&self, path_and_query: &str) -> Result<serde_json::Value> {
        debug!(path = path_and_query, "GET");
        self.send(self.client.get(self.url(path_and_query))).await
    }

    async fn post_data(&self, path: &str, body: serde_json::Value) -> Result<serde_json::Value> {
        debug!(path, "POST");
        self.send(self.client.post(self.url(path)).json(&body)).await
    }

    async fn delete_data(&self, path: &str) -> Result<serde_json::Value> {
        debug!(path, "DELETE");
        self.send(self.client.delete(self.url(path))).await
    }

    async fn get_page<W: DeserializeOwned>(&self, path_and_query: &str) -> Result<(Vec<W>, u64)> {
        let data = self.get_data(path_and_query).await?;
        decode_page(data)
    }
}

// Response envelope shared by every endpoint

#[derive(Deserialize)]
struct Envelope {
    msg: String,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
}

fn unwrap_envelope(env: Envelope) -> Result<serde_json::Value> {
    if env.msg == "success" {
        Ok(env.data)
    } else {
        Err(StallError::Api(env.error.unwrap_or(env.msg)))
    }
}

fn decode_page<W: DeserializeOwned>(data: serde_json::Value) -> Result<(Vec<W>, u64)> {
    #[derive(Deserialize)]
    struct PageData<W> {
        #[serde(default = "Vec::new")]
        list: Vec<W>,
        #[serde(default)]
        total: u64,
    }

    let page: PageData<W> =
        serde_json::from_value(data).map_err(|e| StallError::Api(e.to_string()))?;
    Ok((page.list, page.total))
}

/// Field-level coercion for backend payloads: absent or malformed values
/// collapse to the type's default instead of failing the whole page. Used
/// for `images` arrays and nested user objects, which the backend does not
/// guarantee.
fn lenient<'de, D, T>(de: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(de)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn parse_datetime(s: &str) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&chrono::Utc))
        .unwrap_or_else(|_| chrono::Utc::now())
}

fn parse_optional_datetime(s: Option<&str>) -> chrono::DateTime<chrono::Utc> {
    s.map(parse_datetime).unwrap_or_else(chrono::Utc::now)
}

/// Decimal yuan on the wire, integer cents in the client
fn yuan_to_cents(amount: Option<f64>) -> i64 {
    amount.map(|a| (a * 100.0).round() as i64).unwrap_or(0)
}

// Wire types, straight off the JSON. Every field the backend may omit is
// Option (or lenient) here; normalization into crate::types happens once,
// in the wire_* functions below.

#[derive(Debug, Default, Deserialize)]
struct WireUser {
    id: Option<u64>,
    nickname: Option<String>,
    avatar: Option<String>,
}

#[derive(Deserialize)]
struct WireGoods {
    id: Option<u64>,
    title: Option<String>,
    description: Option<String>,
    price: Option<f64>,
    group_price: Option<f64>,
    group_size: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    images: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    seller: WireUser,
    category_id: Option<u64>,
    status: Option<String>,
    created_at: Option<String>,
}

#[derive(Deserialize)]
struct WireComment {
    id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    user: WireUser,
    content: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    images: Vec<String>,
    created_at: Option<String>,
}

#[derive(Deserialize)]
struct WireOrder {
    id: Option<u64>,
    goods_id: Option<u64>,
    goods_title: Option<String>,
    goods_image: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    buyer: WireUser,
    #[serde(default, deserialize_with = "lenient")]
    seller: WireUser,
    amount: Option<f64>,
    status: Option<String>,
    created_at: Option<String>,
}

#[derive(Deserialize)]
struct WireConversation {
    #[serde(default, deserialize_with = "lenient")]
    user: WireUser,
    goods_id: Option<u64>,
    last_message: Option<String>,
    unread: Option<u32>,
    updated_at: Option<String>,
}

#[derive(Deserialize)]
struct WireMessage {
    id: Option<u64>,
    from_id: Option<u64>,
    to_id: Option<u64>,
    kind: Option<String>,
    content: Option<String>,
    created_at: Option<String>,
}

#[derive(Deserialize)]
struct WireFollow {
    #[serde(default, deserialize_with = "lenient")]
    user: WireUser,
    created_at: Option<String>,
}

#[derive(Deserialize)]
struct WireAnnouncement {
    id: Option<u64>,
    title: Option<String>,
    content: Option<String>,
    created_at: Option<String>,
}

#[derive(Deserialize)]
struct WireAddress {
    id: Option<u64>,
    recipient: Option<String>,
    phone: Option<String>,
    region: Option<String>,
    detail: Option<String>,
    is_default: Option<bool>,
}

#[derive(Deserialize)]
struct WireProfile {
    #[serde(default, deserialize_with = "lenient")]
    user: WireUser,
    signature: Option<String>,
    goods_count: Option<u32>,
    sold_count: Option<u32>,
}

fn wire_user(u: WireUser) -> UserBrief {
    UserBrief {
        id: u.id.unwrap_or(0),
        nickname: u.nickname.unwrap_or_else(|| "unknown".to_string()),
        avatar: u.avatar.unwrap_or_default(),
    }
}

fn wire_goods(g: WireGoods) -> Goods {
    let price_cents = yuan_to_cents(g.price);
    let group_price_cents = yuan_to_cents(g.group_price);
    Goods {
        id: g.id.unwrap_or(0),
        title: g.title.unwrap_or_default(),
        description: g.description.unwrap_or_default(),
        price_cents,
        group_price_cents,
        group_size: g.group_size.unwrap_or(0),
        images: g.images,
        seller: wire_user(g.seller),
        category_id: g.category_id,
        status: GoodsStatus::from_api(g.status.as_deref().unwrap_or("")),
        created_at: parse_optional_datetime(g.created_at.as_deref()),
        discount_text: discount_label(price_cents, group_price_cents),
    }
}

fn wire_comment(c: WireComment) -> Comment {
    Comment {
        id: c.id.unwrap_or(0),
        author: wire_user(c.user),
        content: c.content.unwrap_or_default(),
        images: c.images,
        created_at: parse_optional_datetime(c.created_at.as_deref()),
    }
}

fn wire_order(o: WireOrder) -> Order {
    Order {
        id: o.id.unwrap_or(0),
        goods_id: o.goods_id.unwrap_or(0),
        goods_title: o.goods_title.unwrap_or_default(),
        goods_image: o.goods_image,
        buyer: wire_user(o.buyer),
        seller: wire_user(o.seller),
        amount_cents: yuan_to_cents(o.amount),
        status: OrderStatus::from_api(o.status.as_deref().unwrap_or("")),
        created_at: parse_optional_datetime(o.created_at.as_deref()),
    }
}

fn wire_conversation(c: WireConversation) -> Conversation {
    Conversation {
        peer: wire_user(c.user),
        goods_id: c.goods_id,
        last_message: c.last_message.unwrap_or_default(),
        unread: c.unread.unwrap_or(0),
        updated_at: parse_optional_datetime(c.updated_at.as_deref()),
    }
}

fn wire_message(m: WireMessage) -> ChatMessage {
    ChatMessage {
        id: m.id.unwrap_or(0),
        from_id: m.from_id.unwrap_or(0),
        to_id: m.to_id.unwrap_or(0),
        kind: match m.kind.as_deref() {
            Some("image") => MessageKind::Image,
            _ => MessageKind::Text,
        },
        content: m.content.unwrap_or_default(),
        created_at: parse_optional_datetime(m.created_at.as_deref()),
    }
}

fn wire_follow(f: WireFollow) -> FollowedUser {
    FollowedUser {
        user: wire_user(f.user),
        followed_at: parse_optional_datetime(f.created_at.as_deref()),
    }
}

fn wire_announcement(a: WireAnnouncement) -> Announcement {
    Announcement {
        id: a.id.unwrap_or(0),
        title: a.title.unwrap_or_default(),
        content: a.content.unwrap_or_default(),
        created_at: parse_optional_datetime(a.created_at.as_deref()),
    }
}

fn wire_address(a: WireAddress) -> Address {
    Address {
        id: a.id.unwrap_or(0),
        recipient: a.recipient.unwrap_or_default(),
        phone: a.phone.unwrap_or_default(),
        region: a.region.unwrap_or_default(),
        detail: a.detail.unwrap_or_default(),
        is_default: a.is_default.unwrap_or(false),
    }
}

fn page_into<W, T>(raw: (Vec<W>, u64), map: fn(W) -> T) -> Page<T> {
    Page {
        items: raw.0.into_iter().map(map).collect(),
        total: raw.1,
    }
}

fn goods_query(filter: &GoodsFilter, page: u32, page_size: u32) -> String {
    let mut query = format!("/goods?page={}&pageSize={}", page, page_size);
    if let Some(category) = filter.category_id {
        query.push_str(&format!("&category_id={}", category));
    }
    if let Some(keyword) = filter.keyword.as_deref() {
        if !keyword.is_empty() {
            query.push_str(&format!("&keyword={}", urlencoding::encode(keyword)));
        }
    }
    query
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_goods(&self, filter: &GoodsFilter, page: u32) -> Result<Page<Goods>> {
        let query = goods_query(filter, page, crate::backend::GOODS_PAGE_SIZE);
        let raw: (Vec<WireGoods>, u64) = self.get_page(&query).await?;
        Ok(page_into(raw, wire_goods))
    }

    async fn list_hot_goods(&self, page: u32) -> Result<Page<Goods>> {
        let query = format!(
            "/goods/hot?page={}&pageSize={}",
            page,
            crate::backend::HOT_PAGE_SIZE
        );
        let raw: (Vec<WireGoods>, u64) = self.get_page(&query).await?;
        Ok(page_into(raw, wire_goods))
    }

    async fn list_favorites(&self, user_id: u64, page: u32) -> Result<Page<Goods>> {
        let query = format!(
            "/favorites?user_id={}&page={}&pageSize={}",
            user_id,
            page,
            crate::backend::FAVORITES_PAGE_SIZE
        );
        let raw: (Vec<WireGoods>, u64) = self.get_page(&query).await?;
        Ok(page_into(raw, wire_goods))
    }

    async fn list_orders(&self, role: OrderRole, page: u32) -> Result<Page<Order>> {
        let query = format!(
            "/orders?role={}&page={}&pageSize={}",
            role.as_api_str(),
            page,
            crate::backend::ORDERS_PAGE_SIZE
        );
        let raw: (Vec<WireOrder>, u64) = self.get_page(&query).await?;
        Ok(page_into(raw, wire_order))
    }

    async fn list_messages(&self, peer_id: u64, page: u32) -> Result<Page<ChatMessage>> {
        let query = format!(
            "/messages?peer_id={}&page={}&pageSize={}",
            peer_id,
            page,
            crate::backend::MESSAGES_PAGE_SIZE
        );
        let raw: (Vec<WireMessage>, u64) = self.get_page(&query).await?;
        Ok(page_into(raw, wire_message))
    }

    async fn list_conversations(&self, page: u32) -> Result<Page<Conversation>> {
        let query = format!(
            "/conversations?page={}&pageSize={}",
            page,
            crate::backend::CONVERSATIONS_PAGE_SIZE
        );
        let raw: (Vec<WireConversation>, u64) = self.get_page(&query).await?;
        Ok(page_into(raw, wire_conversation))
    }

    async fn list_follows(&self, user_id: u64, page: u32) -> Result<Page<FollowedUser>> {
        let query = format!(
            "/follows?user_id={}&page={}&pageSize={}",
            user_id,
            page,
            crate::backend::FOLLOWS_PAGE_SIZE
        );
        let raw: (Vec<WireFollow>, u64) = self.get_page(&query).await?;
        Ok(page_into(raw, wire_follow))
    }

    async fn list_comments(&self, goods_id: u64, page: u32) -> Result<Page<Comment>> {
        let query = format!(
            "/comments?goods_id={}&page={}&pageSize={}",
            goods_id,
            page,
            crate::backend::COMMENTS_PAGE_SIZE
        );
        let raw: (Vec<WireComment>, u64) = self.get_page(&query).await?;
        Ok(page_into(raw, wire_comment))
    }

    async fn list_announcements(&self, page: u32) -> Result<Page<Announcement>> {
        let query = format!(
            "/announcements?page={}&pageSize={}",
            page,
            crate::backend::ANNOUNCEMENTS_PAGE_SIZE
        );
        let raw: (Vec<WireAnnouncement>, u64) = self.get_page(&query).await?;
        Ok(page_into(raw, wire_announcement))
    }

    async fn get_goods(&self, id: u64) -> Result<Goods> {
        let data = self.get_data(&format!("/goods/{}", id)).await?;
        let wire: WireGoods =
            serde_json::from_value(data).map_err(|e| StallError::Api(e.to_string()))?;
        Ok(wire_goods(wire))
    }

    async fn get_profile(&self, user_id: u64) -> Result<Profile> {
        let data = self
            .get_data(&format!("/users/{}/profile", user_id))
            .await?;
        let wire: WireProfile =
            serde_json::from_value(data).map_err(|e| StallError::Api(e.to_string()))?;
        Ok(Profile {
            user: wire_user(wire.user),
            signature: wire.signature.unwrap_or_default(),
            goods_count: wire.goods_count.unwrap_or(0),
            sold_count: wire.sold_count.unwrap_or(0),
        })
    }

    async fn unread_count(&self) -> Result<u32> {
        let data = self.get_data("/messages/unread").await?;
        Ok(data.get("count").and_then(|c| c.as_u64()).unwrap_or(0) as u32)
    }

    async fn wallet_balance(&self) -> Result<i64> {
        let data = self.get_data("/wallet").await?;
        let balance = data.get("balance").and_then(|b| b.as_f64());
        Ok(yuan_to_cents(balance))
    }

    async fn list_addresses(&self) -> Result<Vec<Address>> {
        #[derive(Deserialize)]
        struct AddressList {
            #[serde(default = "Vec::new")]
            list: Vec<WireAddress>,
        }
        let data = self.get_data("/addresses").await?;
        let list: AddressList =
            serde_json::from_value(data).map_err(|e| StallError::Api(e.to_string()))?;
        Ok(list.list.into_iter().map(wire_address).collect())
    }

    async fn create_order(&self, goods_id: u64, address_id: u64) -> Result<u64> {
        let body = serde_json::json!({ "goods_id": goods_id, "address_id": address_id });
        let data = self.post_data("/orders", body).await?;
        data.get("id")
            .and_then(|id| id.as_u64())
            .ok_or_else(|| StallError::Api("order created without an id".to_string()))
    }

    async fn pay_order(&self, order_id: u64) -> Result<()> {
        self.post_data(&format!("/orders/{}/pay", order_id), serde_json::json!({}))
            .await?;
        Ok(())
    }

    async fn ship_order(&self, order_id: u64) -> Result<()> {
        self.post_data(&format!("/orders/{}/ship", order_id), serde_json::json!({}))
            .await?;
        Ok(())
    }

    async fn confirm_order(&self, order_id: u64) -> Result<()> {
        self.post_data(
            &format!("/orders/{}/confirm", order_id),
            serde_json::json!({}),
        )
        .await?;
        Ok(())
    }

    async fn review_order(&self, order_id: u64, rating: u8, content: &str) -> Result<()> {
        let body = serde_json::json!({ "rating": rating, "content": content });
        self.post_data(&format!("/orders/{}/review", order_id), body)
            .await?;
        Ok(())
    }

    async fn set_favorite(&self, goods_id: u64, on: bool) -> Result<()> {
        if on {
            self.post_data("/favorites", serde_json::json!({ "goods_id": goods_id }))
                .await?;
        } else {
            self.delete_data(&format!("/favorites/{}", goods_id)).await?;
        }
        Ok(())
    }

    async fn set_follow(&self, user_id: u64, on: bool) -> Result<()> {
        if on {
            self.post_data("/follows", serde_json::json!({ "user_id": user_id }))
                .await?;
        } else {
            self.delete_data(&format!("/follows/{}", user_id)).await?;
        }
        Ok(())
    }

    async fn send_message(&self, peer_id: u64, content: &str) -> Result<()> {
        let body = serde_json::json!({ "to": peer_id, "content": content });
        self.post_data("/messages", body).await?;
        Ok(())
    }

    async fn recharge(&self, amount_cents: i64) -> Result<()> {
        let body = serde_json::json!({ "amount": amount_cents as f64 / 100.0 });
        self.post_data("/wallet/recharge", body).await?;
        Ok(())
    }

    async fn add_address(&self, draft: &AddressDraft) -> Result<u64> {
        let body = serde_json::to_value(draft).map_err(|e| StallError::Api(e.to_string()))?;
        let data = self.post_data("/addresses", body).await?;
        data.get("id")
            .and_then(|id| id.as_u64())
            .ok_or_else(|| StallError::Api("address created without an id".to_string()))
    }

    async fn delete_address(&self, address_id: u64) -> Result<()> {
        self.delete_data(&format!("/addresses/{}", address_id))
            .await?;
        Ok(())
    }

    async fn set_default_address(&self, address_id: u64) -> Result<()> {
        self.post_data(
            &format!("/addresses/{}/default", address_id),
            serde_json::json!({}),
        )
        .await?;
        Ok(())
    }

    async fn upload_image(&self, seller_id: u64, filename: &str, bytes: Vec<u8>) -> Result<String> {
        // The object-store collaborator answers outside the usual envelope:
        // a bare `{ "url": ... }` on success.
        #[derive(Deserialize)]
        struct Uploaded {
            url: String,
        }

        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .text("seller_id", seller_id.to_string())
            .part("file", part);

        debug!(filename, "POST /oss/upload");
        let response = self
            .request(self.client.post(self.url("/oss/upload")).multipart(form))
            .send()
            .await
            .map_err(|e| StallError::Api(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(StallError::Api(format!("upload failed: {}", status)));
        }

        let uploaded: Uploaded = response
            .json()
            .await
            .map_err(|e| StallError::Api(e.to_string()))?;
        Ok(uploaded.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(value: serde_json::Value) -> Envelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn success_envelope_yields_data() {
        let env = envelope(json!({ "msg": "success", "data": { "list": [], "total": 0 } }));
        let data = unwrap_envelope(env).unwrap();
        assert_eq!(data["total"], 0);
    }

    #[test]
    fn error_envelope_is_recoverable_api_error() {
        let env = envelope(json!({ "msg": "error", "error": "goods not found" }));
        let err = unwrap_envelope(env).unwrap_err();
        assert!(matches!(err, StallError::Api(ref m) if m == "goods not found"));
    }

    #[test]
    fn error_envelope_without_message_falls_back_to_msg() {
        let env = envelope(json!({ "msg": "forbidden" }));
        let err = unwrap_envelope(env).unwrap_err();
        assert!(matches!(err, StallError::Api(ref m) if m == "forbidden"));
    }

    #[test]
    fn decode_page_defaults_missing_fields() {
        let (items, total) = decode_page::<WireGoods>(json!({})).unwrap();
        assert!(items.is_empty());
        assert_eq!(total, 0);
    }

    #[test]
    fn goods_missing_images_normalizes_to_empty_vec() {
        let wire: WireGoods = serde_json::from_value(json!({
            "id": 3, "title": "lamp", "price": 12.5
        }))
        .unwrap();
        let goods = wire_goods(wire);
        assert!(goods.images.is_empty());
        assert_eq!(goods.price_cents, 1250);
    }

    #[test]
    fn goods_malformed_images_coerces_to_empty_vec() {
        let wire: WireGoods = serde_json::from_value(json!({
            "id": 3, "images": "not-an-array"
        }))
        .unwrap();
        assert!(wire_goods(wire).images.is_empty());
    }

    #[test]
    fn goods_malformed_seller_coerces_to_default() {
        let wire: WireGoods = serde_json::from_value(json!({
            "id": 3, "seller": 42
        }))
        .unwrap();
        let goods = wire_goods(wire);
        assert_eq!(goods.seller.id, 0);
        assert_eq!(goods.seller.nickname, "unknown");
    }

    #[test]
    fn goods_discount_text_derived_from_prices() {
        let wire: WireGoods = serde_json::from_value(json!({
            "id": 1, "price": 100.0, "group_price": 75.0, "group_size": 3
        }))
        .unwrap();
        let goods = wire_goods(wire);
        assert_eq!(goods.discount_text, "25% off");
        assert_eq!(goods.group_price_cents, 7500);
    }

    #[test]
    fn full_page_of_goods_decodes() {
        let data = json!({
            "list": [
                { "id": 1, "title": "bike", "price": 300.0, "images": ["a.jpg"],
                  "seller": { "id": 9, "nickname": "sam" }, "status": "sold",
                  "created_at": "2025-11-02T10:00:00Z" },
                { "id": 2, "title": "desk", "price": 80.0 }
            ],
            "total": 14
        });
        let (items, total) = decode_page::<WireGoods>(data).unwrap();
        assert_eq!(total, 14);
        let goods: Vec<Goods> = items.into_iter().map(wire_goods).collect();
        assert_eq!(goods[0].seller.nickname, "sam");
        assert_eq!(goods[0].status, GoodsStatus::Sold);
        assert_eq!(goods[1].images.len(), 0);
        assert_eq!(goods[1].seller.id, 0);
    }

    #[test]
    fn message_kind_defaults_to_text() {
        let wire: WireMessage = serde_json::from_value(json!({
            "id": 1, "from_id": 2, "to_id": 3, "content": "hi"
        }))
        .unwrap();
        assert_eq!(wire_message(wire).kind, MessageKind::Text);

        let wire: WireMessage = serde_json::from_value(json!({
            "id": 1, "kind": "image", "content": "x.jpg"
        }))
        .unwrap();
        assert_eq!(wire_message(wire).kind, MessageKind::Image);
    }

    #[test]
    fn yuan_conversion_rounds() {
        assert_eq!(yuan_to_cents(Some(12.5)), 1250);
        assert_eq!(yuan_to_cents(Some(0.015)), 2);
        assert_eq!(yuan_to_cents(None), 0);
    }

    #[test]
    fn goods_query_includes_filters() {
        let filter = GoodsFilter {
            category_id: Some(4),
            keyword: Some("coffee table".to_string()),
        };
        let q = goods_query(&filter, 2, 10);
        assert_eq!(q, "/goods?page=2&pageSize=10&category_id=4&keyword=coffee%20table");
    }

    #[test]
    fn goods_query_skips_empty_keyword() {
        let filter = GoodsFilter {
            category_id: None,
            keyword: Some(String::new()),
        };
        assert_eq!(goods_query(&filter, 1, 10), "/goods?page=1&pageSize=10");
    }
}
