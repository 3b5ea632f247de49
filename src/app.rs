use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;
use tracing::warn;

use crate::action::{Action, HomeSection, ListId, ProfileTab};
use crate::backend::{self, Backend};
use crate::event::Event;
use crate::loader::{LoadMode, PageRequest, PageState};
use crate::store::Store;
use crate::types::{
    Address, AddressDraft, Announcement, ChatMessage, Comment, Conversation, FollowedUser, Goods,
    GoodsFilter, Order, OrderRole, OrderStatus, Page, Profile, UserBrief,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,         // Announcements + hot ranking
    Goods,        // Browse / search listings
    GoodsDetail,  // One listing with its comments
    Orders,       // Bought / sold tabs
    Conversations,
    Messages,     // One chat thread
    Profile,      // Favorites / follows tabs
    Wallet,
    Addresses,
}

/// What the shared text input line is currently feeding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
    Chat,
    Recharge,
    NewAddress,
    Review(u64),
}

// Ticks are 250ms; poll unread every ~5s while the conversation list is up.
const UNREAD_POLL_TICKS: u64 = 20;

pub struct App {
    pub screen: Screen,
    prev_screen: Option<Screen>,

    // Home
    pub announcements: PageState<Announcement>,
    pub hot_goods: PageState<Goods>,
    pub home_section: HomeSection,
    pub announcement_index: usize,
    pub hot_index: usize,

    // Goods browse/search
    pub goods: PageState<Goods>,
    pub goods_index: usize,
    pub goods_filter: GoodsFilter,

    // Goods detail
    pub current_goods: Option<Goods>,
    pub comments: PageState<Comment>,
    pub comment_index: usize,

    // Orders
    pub orders: PageState<Order>,
    pub order_index: usize,
    pub order_role: OrderRole,

    // Chat
    pub conversations: PageState<Conversation>,
    pub conversation_index: usize,
    pub messages: PageState<ChatMessage>,
    pub message_index: usize,
    pub chat_peer: Option<UserBrief>,
    pub unread: u32,

    // Profile
    pub profile_tab: ProfileTab,
    pub favorites: PageState<Goods>,
    pub favorite_index: usize,
    pub follows: PageState<FollowedUser>,
    pub follow_index: usize,
    pub profile: Option<Profile>,

    // Wallet / addresses
    pub balance_cents: Option<i64>,
    pub addresses: Vec<Address>,
    pub address_index: usize,

    pub input_mode: InputMode,
    pub input: String,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub should_quit: bool,

    tick_count: u64,
    backend: Arc<dyn Backend>,
    store: Store,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(backend: Arc<dyn Backend>, store: Store, action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            screen: Screen::Home,
            prev_screen: None,

            announcements: PageState::new(backend::ANNOUNCEMENTS_PAGE_SIZE),
            hot_goods: PageState::new(backend::HOT_PAGE_SIZE),
            home_section: HomeSection::default(),
            announcement_index: 0,
            hot_index: 0,

            goods: PageState::new(backend::GOODS_PAGE_SIZE),
            goods_index: 0,
            goods_filter: GoodsFilter::default(),

            current_goods: None,
            comments: PageState::new(backend::COMMENTS_PAGE_SIZE),
            comment_index: 0,

            orders: PageState::new(backend::ORDERS_PAGE_SIZE),
            order_index: 0,
            order_role: OrderRole::default(),

            conversations: PageState::new(backend::CONVERSATIONS_PAGE_SIZE),
            conversation_index: 0,
            messages: PageState::new(backend::MESSAGES_PAGE_SIZE),
            message_index: 0,
            chat_peer: None,
            unread: 0,

            profile_tab: ProfileTab::default(),
            favorites: PageState::new(backend::FAVORITES_PAGE_SIZE),
            favorite_index: 0,
            follows: PageState::new(backend::FOLLOWS_PAGE_SIZE),
            follow_index: 0,
            profile: None,

            balance_cents: None,
            addresses: Vec::new(),
            address_index: 0,

            input_mode: InputMode::default(),
            input: String::new(),
            error: None,
            notice: None,
            should_quit: false,

            tick_count: 0,
            backend,
            store,
            action_tx,
        }
    }

    fn user_id(&self) -> u64 {
        self.store.current_user_id().unwrap_or(0)
    }

    /// Any fetch in flight, for the status bar
    pub fn is_loading(&self) -> bool {
        self.announcements.is_loading()
            || self.hot_goods.is_loading()
            || self.goods.is_loading()
            || self.comments.is_loading()
            || self.orders.is_loading()
            || self.conversations.is_loading()
            || self.messages.is_loading()
            || self.favorites.is_loading()
            || self.follows.is_loading()
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::OpenHome,
            Event::Tick => Action::Tick,
            Event::Key(key) => self.handle_key(key),
            _ => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        if self.input_mode != InputMode::Normal {
            return match key.code {
                KeyCode::Enter => Action::InputConfirm,
                KeyCode::Esc => Action::InputCancel,
                KeyCode::Backspace => Action::InputBackspace,
                KeyCode::Char(c) => Action::InputChar(c),
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.screen == Screen::Home {
                    Action::Quit
                } else {
                    Action::Back
                }
            }
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Enter => Action::Select,
            KeyCode::Tab => Action::SwitchSection,
            KeyCode::Char('r') => Action::Refresh,

            // Global navigation lives on the home screen
            KeyCode::Char('g') if self.screen == Screen::Home => Action::OpenGoods,
            KeyCode::Char('o') if self.screen == Screen::Home => Action::OpenOrders,
            KeyCode::Char('c') if self.screen == Screen::Home => Action::OpenConversations,
            KeyCode::Char('p') if self.screen == Screen::Home => Action::OpenProfile,
            KeyCode::Char('w') if self.screen == Screen::Home => Action::OpenWallet,
            KeyCode::Char('a') if self.screen == Screen::Home => Action::OpenAddresses,

            KeyCode::Char('/') if self.screen == Screen::Goods => Action::StartSearch,

            // Goods detail
            KeyCode::Char('b') if self.screen == Screen::GoodsDetail => Action::Buy,
            KeyCode::Char('f') if self.screen == Screen::GoodsDetail => Action::ToggleFavorite(true),
            KeyCode::Char('F') if self.screen == Screen::GoodsDetail => {
                Action::ToggleFavorite(false)
            }
            KeyCode::Char('w') if self.screen == Screen::GoodsDetail => Action::ToggleFollow(true),
            KeyCode::Char('W') if self.screen == Screen::GoodsDetail => Action::ToggleFollow(false),
            KeyCode::Char('m') if self.screen == Screen::GoodsDetail => {
                match &self.current_goods {
                    Some(goods) => Action::OpenChat(goods.seller.clone()),
                    None => Action::None,
                }
            }

            KeyCode::Char('i') if self.screen == Screen::Messages => Action::StartChatInput,
            KeyCode::Char('i') if self.screen == Screen::Wallet => Action::StartRecharge,

            KeyCode::Char('n') if self.screen == Screen::Addresses => Action::StartNewAddress,
            KeyCode::Char('D') if self.screen == Screen::Addresses => Action::SetDefaultAddress,
            KeyCode::Char('d')
                if matches!(self.screen, Screen::Addresses | Screen::Profile) =>
            {
                Action::DeleteSelected
            }

            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        // A transient notice or error survives until the next user-visible
        // action; anything but quit/back/tick clears it.
        if !matches!(action, Action::Quit | Action::Back | Action::Tick | Action::None) {
            self.error = None;
            self.notice = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Tick => {
                self.tick_count = self.tick_count.wrapping_add(1);
                if self.screen == Screen::Conversations
                    && self.tick_count % UNREAD_POLL_TICKS == 0
                {
                    self.spawn_unread();
                }
            }
            Action::Back => self.go_back(),
            Action::ScrollUp => self.scroll_up(),
            Action::ScrollDown => self.scroll_down(),
            Action::Select => self.select(),
            Action::SwitchSection => self.switch_section(),
            Action::Refresh => self.refresh_focused(),

            // Screen navigation
            Action::OpenHome => {
                self.screen = Screen::Home;
                self.announcement_index = 0;
                self.hot_index = 0;
                self.spawn_load_announcements(LoadMode::Refresh);
                self.spawn_load_hot(LoadMode::Refresh);
            }
            Action::OpenGoods => {
                self.screen = Screen::Goods;
                self.spawn_load_goods(LoadMode::Refresh);
            }
            Action::OpenOrders => {
                self.screen = Screen::Orders;
                self.orders.reset();
                self.order_index = 0;
                self.spawn_load_orders(LoadMode::Refresh);
            }
            Action::OpenConversations => {
                self.screen = Screen::Conversations;
                self.spawn_load_conversations(LoadMode::Refresh);
                self.spawn_unread();
            }
            Action::OpenProfile => {
                self.screen = Screen::Profile;
                self.profile_tab = ProfileTab::default();
                self.profile = self.store.profile(self.user_id());
                self.spawn_load_profile();
                self.spawn_load_favorites(LoadMode::Refresh);
            }
            Action::OpenWallet => {
                self.screen = Screen::Wallet;
                self.spawn_load_wallet();
            }
            Action::OpenAddresses => {
                self.screen = Screen::Addresses;
                self.address_index = 0;
                self.spawn_load_addresses();
            }
            Action::OpenGoodsDetail(goods) => {
                self.prev_screen = Some(self.screen);
                self.store.push_browse_history(goods.id);
                self.spawn_load_goods_detail(goods.id);
                self.current_goods = Some(*goods);
                self.comments.reset();
                self.comment_index = 0;
                self.spawn_load_comments(LoadMode::Refresh);
                self.screen = Screen::GoodsDetail;
            }
            Action::OpenChat(peer) => {
                self.messages.reset();
                self.message_index = 0;
                self.chat_peer = Some(peer);
                self.spawn_load_messages(LoadMode::Refresh);
                self.screen = Screen::Messages;
            }

            // Mutations on the selected row
            Action::Buy => {
                if let Some(goods) = &self.current_goods {
                    self.spawn_buy(goods.id);
                }
            }
            Action::ToggleFavorite(on) => {
                if let Some(goods) = &self.current_goods {
                    self.spawn_toggle_favorite(goods.id, on);
                }
            }
            Action::ToggleFollow(on) => {
                if let Some(goods) = &self.current_goods {
                    self.spawn_toggle_follow(goods.seller.id, on);
                }
            }
            Action::DeleteSelected => self.delete_selected(),
            Action::SetDefaultAddress => {
                if let Some(address) = self.addresses.get(self.address_index) {
                    let backend = Arc::clone(&self.backend);
                    let id = address.id;
                    self.spawn_op(
                        async move { backend.set_default_address(id).await },
                        Action::AddressesUpdated("Default address set"),
                    );
                }
            }

            // Text entry
            Action::StartSearch => {
                self.input_mode = InputMode::Search;
                self.input.clear();
            }
            Action::StartChatInput => {
                if self.chat_peer.is_some() {
                    self.input_mode = InputMode::Chat;
                    self.input.clear();
                }
            }
            Action::StartRecharge => {
                self.input_mode = InputMode::Recharge;
                self.input.clear();
            }
            Action::StartNewAddress => {
                self.input_mode = InputMode::NewAddress;
                self.input.clear();
            }
            Action::InputChar(c) => self.input.push(c),
            Action::InputBackspace => {
                self.input.pop();
            }
            Action::InputCancel => {
                self.input_mode = InputMode::Normal;
                self.input.clear();
            }
            Action::InputConfirm => self.confirm_input(),

            // Paginated list completions
            Action::AnnouncementsLoaded(page, req) => {
                if self.announcements.complete(&req, page.items, page.total)
                    && req.mode == LoadMode::Refresh
                {
                    self.announcement_index = 0;
                }
            }
            Action::HotGoodsLoaded(page, req) => {
                if self.hot_goods.complete(&req, page.items, page.total)
                    && req.mode == LoadMode::Refresh
                {
                    self.hot_index = 0;
                }
            }
            Action::GoodsLoaded(page, req) => {
                if self.goods.complete(&req, page.items, page.total)
                    && req.mode == LoadMode::Refresh
                {
                    self.goods_index = 0;
                }
            }
            Action::FavoritesLoaded(page, req) => {
                if self.favorites.complete(&req, page.items, page.total)
                    && req.mode == LoadMode::Refresh
                {
                    self.favorite_index = 0;
                }
            }
            Action::OrdersLoaded(page, req) => {
                if self.orders.complete(&req, page.items, page.total)
                    && req.mode == LoadMode::Refresh
                {
                    self.order_index = 0;
                }
            }
            Action::MessagesLoaded(page, req) => {
                if self.messages.complete(&req, page.items, page.total)
                    && req.mode == LoadMode::Refresh
                {
                    self.message_index = 0;
                }
            }
            Action::ConversationsLoaded(page, req) => {
                if self.conversations.complete(&req, page.items, page.total)
                    && req.mode == LoadMode::Refresh
                {
                    self.conversation_index = 0;
                }
            }
            Action::FollowsLoaded(page, req) => {
                if self.follows.complete(&req, page.items, page.total)
                    && req.mode == LoadMode::Refresh
                {
                    self.follow_index = 0;
                }
            }
            Action::CommentsLoaded(page, req) => {
                if self.comments.complete(&req, page.items, page.total)
                    && req.mode == LoadMode::Refresh
                {
                    self.comment_index = 0;
                }
            }
            Action::ListFailed { list, req, error } => {
                let current = match list {
                    ListId::Announcements => self.announcements.fail(&req),
                    ListId::HotGoods => self.hot_goods.fail(&req),
                    ListId::Goods => self.goods.fail(&req),
                    ListId::Favorites => self.favorites.fail(&req),
                    ListId::Orders => self.orders.fail(&req),
                    ListId::Messages => self.messages.fail(&req),
                    ListId::Conversations => self.conversations.fail(&req),
                    ListId::Follows => self.follows.fail(&req),
                    ListId::Comments => self.comments.fail(&req),
                };
                // Failures of orphaned requests stay silent
                if current {
                    self.error = Some(error);
                }
            }

            // Single-shot completions
            Action::GoodsDetailLoaded(goods) => {
                let showing = self
                    .current_goods
                    .as_ref()
                    .map(|g| g.id == goods.id)
                    .unwrap_or(false);
                if self.screen == Screen::GoodsDetail && showing {
                    self.current_goods = Some(*goods);
                }
            }
            Action::ProfileLoaded(profile) => {
                self.store.set_profile(&profile);
                self.profile = Some(*profile);
            }
            Action::WalletLoaded(balance) => {
                self.balance_cents = Some(balance);
            }
            Action::AddressesLoaded(addresses) => {
                self.addresses = addresses;
                if self.address_index >= self.addresses.len() {
                    self.address_index = 0;
                }
            }
            Action::UnreadLoaded(count) => {
                self.unread = count;
            }

            // Mutation completions
            Action::OrderUpdated(msg) => {
                self.notice = Some(msg.to_string());
                if self.screen == Screen::Orders {
                    self.spawn_load_orders(LoadMode::Refresh);
                }
            }
            Action::FavoriteUpdated(msg) => {
                self.notice = Some(msg.to_string());
                if self.screen == Screen::Profile && self.profile_tab == ProfileTab::Favorites {
                    self.spawn_load_favorites(LoadMode::Refresh);
                }
            }
            Action::FollowUpdated(msg) => {
                self.notice = Some(msg.to_string());
                if self.screen == Screen::Profile && self.profile_tab == ProfileTab::Follows {
                    self.spawn_load_follows(LoadMode::Refresh);
                }
            }
            Action::MessageSent => {
                self.spawn_load_messages(LoadMode::Refresh);
            }
            Action::WalletUpdated => {
                self.notice = Some("Recharge submitted".to_string());
                self.spawn_load_wallet();
            }
            Action::AddressesUpdated(msg) => {
                self.notice = Some(msg.to_string());
                self.spawn_load_addresses();
            }

            Action::Error(msg) => {
                self.error = Some(msg);
            }
            Action::None => {}
        }
    }

    fn go_back(&mut self) {
        match self.screen {
            Screen::Home => {
                self.should_quit = true;
            }
            Screen::GoodsDetail => {
                // Screen unmount discards its page state
                self.comments.reset();
                self.current_goods = None;
                self.screen = self.prev_screen.take().unwrap_or(Screen::Goods);
            }
            Screen::Messages => {
                self.messages.reset();
                self.chat_peer = None;
                self.screen = Screen::Conversations;
                self.spawn_load_conversations(LoadMode::Refresh);
            }
            Screen::Goods => {
                self.goods.reset();
                self.goods_filter = GoodsFilter::default();
                self.goods_index = 0;
                self.screen = Screen::Home;
            }
            Screen::Orders => {
                self.orders.reset();
                self.screen = Screen::Home;
            }
            Screen::Conversations => {
                self.conversations.reset();
                self.screen = Screen::Home;
            }
            Screen::Profile => {
                self.favorites.reset();
                self.follows.reset();
                self.screen = Screen::Home;
            }
            Screen::Wallet | Screen::Addresses => {
                self.screen = Screen::Home;
            }
        }
    }

    fn switch_section(&mut self) {
        match self.screen {
            Screen::Home => {
                self.home_section = match self.home_section {
                    HomeSection::Announcements => HomeSection::HotGoods,
                    HomeSection::HotGoods => HomeSection::Announcements,
                };
            }
            Screen::Orders => {
                // Role flip retargets the list; reset fences the old fetch
                self.order_role = match self.order_role {
                    OrderRole::Bought => OrderRole::Sold,
                    OrderRole::Sold => OrderRole::Bought,
                };
                self.orders.reset();
                self.order_index = 0;
                self.spawn_load_orders(LoadMode::Refresh);
            }
            Screen::Profile => {
                self.profile_tab = match self.profile_tab {
                    ProfileTab::Favorites => ProfileTab::Follows,
                    ProfileTab::Follows => ProfileTab::Favorites,
                };
                match self.profile_tab {
                    ProfileTab::Favorites => self.spawn_load_favorites(LoadMode::Refresh),
                    ProfileTab::Follows => self.spawn_load_follows(LoadMode::Refresh),
                }
            }
            _ => {}
        }
    }

    fn refresh_focused(&mut self) {
        match self.screen {
            Screen::Home => {
                self.spawn_load_announcements(LoadMode::Refresh);
                self.spawn_load_hot(LoadMode::Refresh);
            }
            Screen::Goods => self.spawn_load_goods(LoadMode::Refresh),
            Screen::GoodsDetail => {
                if let Some(goods) = &self.current_goods {
                    self.spawn_load_goods_detail(goods.id);
                }
                self.spawn_load_comments(LoadMode::Refresh);
            }
            Screen::Orders => self.spawn_load_orders(LoadMode::Refresh),
            Screen::Conversations => self.spawn_load_conversations(LoadMode::Refresh),
            Screen::Messages => self.spawn_load_messages(LoadMode::Refresh),
            Screen::Profile => match self.profile_tab {
                ProfileTab::Favorites => self.spawn_load_favorites(LoadMode::Refresh),
                ProfileTab::Follows => self.spawn_load_follows(LoadMode::Refresh),
            },
            Screen::Wallet => self.spawn_load_wallet(),
            Screen::Addresses => self.spawn_load_addresses(),
        }
    }

    fn scroll_up(&mut self) {
        let index = match self.screen {
            Screen::Home => match self.home_section {
                HomeSection::Announcements => &mut self.announcement_index,
                HomeSection::HotGoods => &mut self.hot_index,
            },
            Screen::Goods => &mut self.goods_index,
            Screen::GoodsDetail => &mut self.comment_index,
            Screen::Orders => &mut self.order_index,
            Screen::Conversations => &mut self.conversation_index,
            Screen::Messages => &mut self.message_index,
            Screen::Profile => match self.profile_tab {
                ProfileTab::Favorites => &mut self.favorite_index,
                ProfileTab::Follows => &mut self.follow_index,
            },
            Screen::Addresses => &mut self.address_index,
            Screen::Wallet => return,
        };
        if *index > 0 {
            *index -= 1;
        }
    }

    fn scroll_down(&mut self) {
        // Advance the cursor; hitting the last row of an open-ended list
        // fetches the next page.
        macro_rules! advance {
            ($index:expr, $len:expr) => {{
                if $len > 0 && $index < $len - 1 {
                    $index += 1;
                }
                $len > 0 && $index == $len - 1
            }};
        }

        match self.screen {
            Screen::Home => match self.home_section {
                HomeSection::Announcements => {
                    if advance!(self.announcement_index, self.announcements.len())
                        && self.announcements.has_more()
                    {
                        self.spawn_load_announcements(LoadMode::Append);
                    }
                }
                HomeSection::HotGoods => {
                    if advance!(self.hot_index, self.hot_goods.len()) && self.hot_goods.has_more() {
                        self.spawn_load_hot(LoadMode::Append);
                    }
                }
            },
            Screen::Goods => {
                if advance!(self.goods_index, self.goods.len()) && self.goods.has_more() {
                    self.spawn_load_goods(LoadMode::Append);
                }
            }
            Screen::GoodsDetail => {
                if advance!(self.comment_index, self.comments.len()) && self.comments.has_more() {
                    self.spawn_load_comments(LoadMode::Append);
                }
            }
            Screen::Orders => {
                if advance!(self.order_index, self.orders.len()) && self.orders.has_more() {
                    self.spawn_load_orders(LoadMode::Append);
                }
            }
            Screen::Conversations => {
                if advance!(self.conversation_index, self.conversations.len())
                    && self.conversations.has_more()
                {
                    self.spawn_load_conversations(LoadMode::Append);
                }
            }
            Screen::Messages => {
                if advance!(self.message_index, self.messages.len()) && self.messages.has_more() {
                    self.spawn_load_messages(LoadMode::Append);
                }
            }
            Screen::Profile => match self.profile_tab {
                ProfileTab::Favorites => {
                    if advance!(self.favorite_index, self.favorites.len())
                        && self.favorites.has_more()
                    {
                        self.spawn_load_favorites(LoadMode::Append);
                    }
                }
                ProfileTab::Follows => {
                    if advance!(self.follow_index, self.follows.len()) && self.follows.has_more() {
                        self.spawn_load_follows(LoadMode::Append);
                    }
                }
            },
            Screen::Addresses => {
                if !self.addresses.is_empty() && self.address_index < self.addresses.len() - 1 {
                    self.address_index += 1;
                }
            }
            Screen::Wallet => {}
        }
    }

    fn select(&mut self) {
        match self.screen {
            Screen::Home => {
                if self.home_section == HomeSection::HotGoods {
                    if let Some(goods) = self.hot_goods.get(self.hot_index) {
                        let goods = Box::new(goods.clone());
                        self.update(Action::OpenGoodsDetail(goods));
                    }
                }
            }
            Screen::Goods => {
                if let Some(goods) = self.goods.get(self.goods_index) {
                    let goods = Box::new(goods.clone());
                    self.update(Action::OpenGoodsDetail(goods));
                }
            }
            Screen::Orders => {
                let order = self.orders.get(self.order_index).cloned();
                if let Some(order) = order {
                    self.act_on_order(order);
                }
            }
            Screen::Conversations => {
                if let Some(conversation) = self.conversations.get(self.conversation_index) {
                    let peer = conversation.peer.clone();
                    self.update(Action::OpenChat(peer));
                }
            }
            Screen::Profile => {
                if self.profile_tab == ProfileTab::Favorites {
                    if let Some(goods) = self.favorites.get(self.favorite_index) {
                        let goods = Box::new(goods.clone());
                        self.update(Action::OpenGoodsDetail(goods));
                    }
                }
            }
            _ => {}
        }
    }

    fn act_on_order(&mut self, order: Order) {
        let backend = Arc::clone(&self.backend);
        let id = order.id;
        match self.order_role {
            OrderRole::Bought => match order.status {
                OrderStatus::Created => self.spawn_op(
                    async move { backend.pay_order(id).await },
                    Action::OrderUpdated("Order paid"),
                ),
                OrderStatus::Shipped => self.spawn_op(
                    async move { backend.confirm_order(id).await },
                    Action::OrderUpdated("Receipt confirmed"),
                ),
                OrderStatus::Completed => {
                    self.input_mode = InputMode::Review(id);
                    self.input.clear();
                }
                _ => {}
            },
            OrderRole::Sold => {
                if order.status == OrderStatus::Paid {
                    self.spawn_op(
                        async move { backend.ship_order(id).await },
                        Action::OrderUpdated("Marked as shipped"),
                    );
                }
            }
        }
    }

    fn delete_selected(&mut self) {
        match self.screen {
            Screen::Addresses => {
                if let Some(address) = self.addresses.get(self.address_index) {
                    let backend = Arc::clone(&self.backend);
                    let id = address.id;
                    self.spawn_op(
                        async move { backend.delete_address(id).await },
                        Action::AddressesUpdated("Address removed"),
                    );
                }
            }
            Screen::Profile => match self.profile_tab {
                ProfileTab::Favorites => {
                    if let Some(goods) = self.favorites.get(self.favorite_index) {
                        self.spawn_toggle_favorite(goods.id, false);
                    }
                }
                ProfileTab::Follows => {
                    if let Some(follow) = self.follows.get(self.follow_index) {
                        self.spawn_toggle_follow(follow.user.id, false);
                    }
                }
            },
            _ => {}
        }
    }

    fn confirm_input(&mut self) {
        let mode = self.input_mode;
        let input = std::mem::take(&mut self.input);
        self.input_mode = InputMode::Normal;

        match mode {
            InputMode::Normal => {}
            InputMode::Search => {
                let keyword = input.trim();
                self.goods_filter.keyword = if keyword.is_empty() {
                    None
                } else {
                    Some(keyword.to_string())
                };
                // New query: old pages must not leak into the new list
                self.goods.reset();
                self.goods_index = 0;
                self.spawn_load_goods(LoadMode::Refresh);
            }
            InputMode::Chat => {
                let Some(peer) = self.chat_peer.clone() else {
                    return;
                };
                let content = input.trim().to_string();
                if content.is_empty() {
                    return;
                }
                if let Some(path) = content.strip_prefix("/img ") {
                    self.spawn_send_image(peer.id, path.trim().to_string());
                } else {
                    let backend = Arc::clone(&self.backend);
                    self.spawn_op(
                        async move { backend.send_message(peer.id, &content).await },
                        Action::MessageSent,
                    );
                }
            }
            InputMode::Recharge => match parse_yuan(&input) {
                Some(cents) => {
                    let backend = Arc::clone(&self.backend);
                    self.spawn_op(
                        async move { backend.recharge(cents).await },
                        Action::WalletUpdated,
                    );
                }
                None => {
                    self.error = Some("Enter a positive amount, e.g. 50 or 9.90".to_string());
                }
            },
            InputMode::NewAddress => match parse_address(&input) {
                Some(draft) => {
                    let backend = Arc::clone(&self.backend);
                    self.spawn_op(
                        async move { backend.add_address(&draft).await.map(|_| ()) },
                        Action::AddressesUpdated("Address added"),
                    );
                }
                None => {
                    self.error =
                        Some("Format: recipient, phone, region, street address".to_string());
                }
            },
            InputMode::Review(order_id) => {
                let (rating, content) = parse_review(&input);
                if content.is_empty() {
                    self.error = Some("Review text cannot be empty".to_string());
                    return;
                }
                let backend = Arc::clone(&self.backend);
                self.spawn_op(
                    async move { backend.review_order(order_id, rating, &content).await },
                    Action::OrderUpdated("Review posted"),
                );
            }
        }
    }

    // Task spawning. Every paged fetch is tagged with its PageRequest so the
    // completion can be fenced; simple operations report back one action.

    fn spawn_list<T, Fut>(
        &self,
        req: PageRequest,
        list: ListId,
        fut: Fut,
        done: fn(Page<T>, PageRequest) -> Action,
    ) where
        T: Send + 'static,
        Fut: std::future::Future<Output = crate::error::Result<Page<T>>> + Send + 'static,
    {
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match fut.await {
                Ok(page) => {
                    tx.send(done(page, req)).ok();
                }
                Err(e) => {
                    warn!(?list, error = %e, "list fetch failed");
                    tx.send(Action::ListFailed {
                        list,
                        req,
                        error: e.to_string(),
                    })
                    .ok();
                }
            }
        });
    }

    fn spawn_op<Fut>(&self, fut: Fut, done: Action)
    where
        Fut: std::future::Future<Output = crate::error::Result<()>> + Send + 'static,
    {
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match fut.await {
                Ok(()) => {
                    tx.send(done).ok();
                }
                Err(e) => {
                    warn!(error = %e, "operation failed");
                    tx.send(Action::Error(e.to_string())).ok();
                }
            }
        });
    }

    fn spawn_load_announcements(&mut self, mode: LoadMode) {
        let Some(req) = self.announcements.begin(mode) else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        self.spawn_list(
            req,
            ListId::Announcements,
            async move { backend.list_announcements(req.page).await },
            Action::AnnouncementsLoaded,
        );
    }

    fn spawn_load_hot(&mut self, mode: LoadMode) {
        let Some(req) = self.hot_goods.begin(mode) else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        self.spawn_list(
            req,
            ListId::HotGoods,
            async move { backend.list_hot_goods(req.page).await },
            Action::HotGoodsLoaded,
        );
    }

    fn spawn_load_goods(&mut self, mode: LoadMode) {
        let Some(req) = self.goods.begin(mode) else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        let filter = self.goods_filter.clone();
        self.spawn_list(
            req,
            ListId::Goods,
            async move { backend.list_goods(&filter, req.page).await },
            Action::GoodsLoaded,
        );
    }

    fn spawn_load_favorites(&mut self, mode: LoadMode) {
        let Some(req) = self.favorites.begin(mode) else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        let user_id = self.user_id();
        self.spawn_list(
            req,
            ListId::Favorites,
            async move { backend.list_favorites(user_id, req.page).await },
            Action::FavoritesLoaded,
        );
    }

    fn spawn_load_orders(&mut self, mode: LoadMode) {
        let Some(req) = self.orders.begin(mode) else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        let role = self.order_role;
        self.spawn_list(
            req,
            ListId::Orders,
            async move { backend.list_orders(role, req.page).await },
            Action::OrdersLoaded,
        );
    }

    fn spawn_load_conversations(&mut self, mode: LoadMode) {
        let Some(req) = self.conversations.begin(mode) else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        self.spawn_list(
            req,
            ListId::Conversations,
            async move { backend.list_conversations(req.page).await },
            Action::ConversationsLoaded,
        );
    }

    fn spawn_load_messages(&mut self, mode: LoadMode) {
        let Some(peer) = self.chat_peer.clone() else {
            return;
        };
        let Some(req) = self.messages.begin(mode) else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        self.spawn_list(
            req,
            ListId::Messages,
            async move { backend.list_messages(peer.id, req.page).await },
            Action::MessagesLoaded,
        );
    }

    fn spawn_load_follows(&mut self, mode: LoadMode) {
        let Some(req) = self.follows.begin(mode) else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        let user_id = self.user_id();
        self.spawn_list(
            req,
            ListId::Follows,
            async move { backend.list_follows(user_id, req.page).await },
            Action::FollowsLoaded,
        );
    }

    fn spawn_load_comments(&mut self, mode: LoadMode) {
        let Some(goods) = &self.current_goods else {
            return;
        };
        let goods_id = goods.id;
        let Some(req) = self.comments.begin(mode) else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        self.spawn_list(
            req,
            ListId::Comments,
            async move { backend.list_comments(goods_id, req.page).await },
            Action::CommentsLoaded,
        );
    }

    fn spawn_load_goods_detail(&self, id: u64) {
        let tx = self.action_tx.clone();
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            match backend.get_goods(id).await {
                Ok(goods) => {
                    tx.send(Action::GoodsDetailLoaded(Box::new(goods))).ok();
                }
                Err(e) => {
                    tx.send(Action::Error(e.to_string())).ok();
                }
            }
        });
    }

    fn spawn_load_profile(&self) {
        let tx = self.action_tx.clone();
        let backend = Arc::clone(&self.backend);
        let user_id = self.user_id();
        tokio::spawn(async move {
            match backend.get_profile(user_id).await {
                Ok(profile) => {
                    tx.send(Action::ProfileLoaded(Box::new(profile))).ok();
                }
                Err(e) => {
                    tx.send(Action::Error(e.to_string())).ok();
                }
            }
        });
    }

    fn spawn_load_wallet(&self) {
        let tx = self.action_tx.clone();
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            match backend.wallet_balance().await {
                Ok(balance) => {
                    tx.send(Action::WalletLoaded(balance)).ok();
                }
                Err(e) => {
                    tx.send(Action::Error(e.to_string())).ok();
                }
            }
        });
    }

    fn spawn_load_addresses(&self) {
        let tx = self.action_tx.clone();
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            match backend.list_addresses().await {
                Ok(addresses) => {
                    tx.send(Action::AddressesLoaded(addresses)).ok();
                }
                Err(e) => {
                    tx.send(Action::Error(e.to_string())).ok();
                }
            }
        });
    }

    fn spawn_unread(&self) {
        let tx = self.action_tx.clone();
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            // Background poll; failures are logged, never surfaced
            match backend.unread_count().await {
                Ok(count) => {
                    tx.send(Action::UnreadLoaded(count)).ok();
                }
                Err(e) => {
                    warn!(error = %e, "unread poll failed");
                }
            }
        });
    }

    fn spawn_buy(&self, goods_id: u64) {
        let backend = Arc::clone(&self.backend);
        self.spawn_op(
            async move {
                let addresses = backend.list_addresses().await?;
                let address = addresses
                    .iter()
                    .find(|a| a.is_default)
                    .or_else(|| addresses.first())
                    .ok_or_else(|| {
                        crate::error::StallError::Api(
                            "add a delivery address before buying".to_string(),
                        )
                    })?;
                backend.create_order(goods_id, address.id).await?;
                Ok(())
            },
            Action::OrderUpdated("Order created"),
        );
    }

    fn spawn_toggle_favorite(&self, goods_id: u64, on: bool) {
        let backend = Arc::clone(&self.backend);
        let msg = if on {
            "Added to favorites"
        } else {
            "Removed from favorites"
        };
        self.spawn_op(
            async move { backend.set_favorite(goods_id, on).await },
            Action::FavoriteUpdated(msg),
        );
    }

    fn spawn_toggle_follow(&self, user_id: u64, on: bool) {
        let backend = Arc::clone(&self.backend);
        let msg = if on { "Following seller" } else { "Unfollowed" };
        self.spawn_op(
            async move { backend.set_follow(user_id, on).await },
            Action::FollowUpdated(msg),
        );
    }

    fn spawn_send_image(&self, peer_id: u64, path: String) {
        let backend = Arc::clone(&self.backend);
        let user_id = self.user_id();
        self.spawn_op(
            async move {
                let bytes = std::fs::read(&path)?;
                let filename = std::path::Path::new(&path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "image".to_string());
                let url = backend.upload_image(user_id, &filename, bytes).await?;
                backend.send_message(peer_id, &url).await
            },
            Action::MessageSent,
        );
    }
}

/// "50" or "9.90" in yuan -> cents
fn parse_yuan(input: &str) -> Option<i64> {
    let amount: f64 = input.trim().parse().ok()?;
    if amount <= 0.0 || !amount.is_finite() {
        return None;
    }
    Some((amount * 100.0).round() as i64)
}

/// "recipient, phone, region, street address" -> draft
fn parse_address(input: &str) -> Option<AddressDraft> {
    let parts: Vec<&str> = input.splitn(4, ',').map(str::trim).collect();
    if parts.len() != 4 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(AddressDraft {
        recipient: parts[0].to_string(),
        phone: parts[1].to_string(),
        region: parts[2].to_string(),
        detail: parts[3].to_string(),
    })
}

/// Review input is "<rating> <text>" with rating 1-5; a missing rating
/// defaults to 5.
fn parse_review(input: &str) -> (u8, String) {
    let trimmed = input.trim();
    let mut chars = trimmed.chars();
    if let Some(first) = chars.next() {
        if let Some(rating) = first.to_digit(10) {
            if (1..=5).contains(&rating) {
                let rest = chars.as_str().trim();
                if !rest.is_empty() {
                    return (rating as u8, rest.to_string());
                }
            }
        }
    }
    (5, trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, StallError};
    use async_trait::async_trait;

    #[test]
    fn parse_yuan_amounts() {
        assert_eq!(parse_yuan("50"), Some(5000));
        assert_eq!(parse_yuan("9.90"), Some(990));
        assert_eq!(parse_yuan("0"), None);
        assert_eq!(parse_yuan("-3"), None);
        assert_eq!(parse_yuan("abc"), None);
    }

    #[test]
    fn parse_address_four_fields() {
        let draft = parse_address("Li Lei, 13800001111, Haidian, Dorm 5 Room 201").unwrap();
        assert_eq!(draft.recipient, "Li Lei");
        assert_eq!(draft.phone, "13800001111");
        assert_eq!(draft.region, "Haidian");
        assert_eq!(draft.detail, "Dorm 5 Room 201");

        assert!(parse_address("only, three, fields").is_none());
        assert!(parse_address("a, , c, d").is_none());
    }

    #[test]
    fn parse_review_rating_prefix() {
        assert_eq!(parse_review("4 pretty good"), (4, "pretty good".to_string()));
        assert_eq!(parse_review("great seller"), (5, "great seller".to_string()));
        // A bare digit with no text is treated as the review text
        assert_eq!(parse_review("3"), (5, "3".to_string()));
    }

    /// Serves deterministic goods pages: total 25, pages of GOODS_PAGE_SIZE.
    #[derive(Debug)]
    struct StubBackend;

    fn stub_goods(id: u64) -> Goods {
        Goods {
            id,
            title: format!("goods {}", id),
            description: String::new(),
            price_cents: 1000,
            group_price_cents: 800,
            group_size: 2,
            images: vec![],
            seller: UserBrief::default(),
            category_id: None,
            status: crate::types::GoodsStatus::OnSale,
            created_at: chrono::Utc::now(),
            discount_text: String::new(),
        }
    }

    #[async_trait]
    impl Backend for StubBackend {
        async fn list_goods(&self, _filter: &GoodsFilter, page: u32) -> Result<Page<Goods>> {
            let total = 25u64;
            let size = backend::GOODS_PAGE_SIZE as u64;
            let start = (page as u64 - 1) * size;
            let end = (start + size).min(total);
            let items = (start..end).map(stub_goods).collect();
            Ok(Page { items, total })
        }
        async fn list_hot_goods(&self, _page: u32) -> Result<Page<Goods>> {
            Ok(Page { items: vec![], total: 0 })
        }
        async fn list_favorites(&self, _user_id: u64, _page: u32) -> Result<Page<Goods>> {
            Ok(Page { items: vec![], total: 0 })
        }
        async fn list_orders(&self, _role: OrderRole, _page: u32) -> Result<Page<Order>> {
            Ok(Page { items: vec![], total: 0 })
        }
        async fn list_messages(&self, _peer_id: u64, _page: u32) -> Result<Page<ChatMessage>> {
            Ok(Page { items: vec![], total: 0 })
        }
        async fn list_conversations(&self, _page: u32) -> Result<Page<Conversation>> {
            Ok(Page { items: vec![], total: 0 })
        }
        async fn list_follows(&self, _user_id: u64, _page: u32) -> Result<Page<FollowedUser>> {
            Ok(Page { items: vec![], total: 0 })
        }
        async fn list_comments(&self, _goods_id: u64, _page: u32) -> Result<Page<Comment>> {
            Ok(Page { items: vec![], total: 0 })
        }
        async fn list_announcements(&self, _page: u32) -> Result<Page<Announcement>> {
            Ok(Page { items: vec![], total: 0 })
        }
        async fn get_goods(&self, id: u64) -> Result<Goods> {
            Ok(stub_goods(id))
        }
        async fn get_profile(&self, _user_id: u64) -> Result<Profile> {
            Err(StallError::Api("no profile".to_string()))
        }
        async fn unread_count(&self) -> Result<u32> {
            Ok(0)
        }
        async fn wallet_balance(&self) -> Result<i64> {
            Ok(0)
        }
        async fn list_addresses(&self) -> Result<Vec<Address>> {
            Ok(vec![])
        }
        async fn create_order(&self, _goods_id: u64, _address_id: u64) -> Result<u64> {
            Ok(1)
        }
        async fn pay_order(&self, _order_id: u64) -> Result<()> {
            Ok(())
        }
        async fn ship_order(&self, _order_id: u64) -> Result<()> {
            Ok(())
        }
        async fn confirm_order(&self, _order_id: u64) -> Result<()> {
            Ok(())
        }
        async fn review_order(&self, _order_id: u64, _rating: u8, _content: &str) -> Result<()> {
            Ok(())
        }
        async fn set_favorite(&self, _goods_id: u64, _on: bool) -> Result<()> {
            Ok(())
        }
        async fn set_follow(&self, _user_id: u64, _on: bool) -> Result<()> {
            Ok(())
        }
        async fn send_message(&self, _peer_id: u64, _content: &str) -> Result<()> {
            Ok(())
        }
        async fn recharge(&self, _amount_cents: i64) -> Result<()> {
            Ok(())
        }
        async fn add_address(&self, _draft: &AddressDraft) -> Result<u64> {
            Ok(1)
        }
        async fn delete_address(&self, _address_id: u64) -> Result<()> {
            Ok(())
        }
        async fn set_default_address(&self, _address_id: u64) -> Result<()> {
            Ok(())
        }
        async fn upload_image(
            &self,
            _seller_id: u64,
            _filename: &str,
            _bytes: Vec<u8>,
        ) -> Result<String> {
            Ok("http://oss/img.jpg".to_string())
        }
    }

    fn test_app() -> (App, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let store = Store::new(
            std::env::temp_dir().join(format!("stall-app-test-{}", std::process::id())),
        );
        (App::new(Arc::new(StubBackend), store, tx), rx)
    }

    /// Drain actions until one matches, applying everything in order.
    async fn pump_until(
        app: &mut App,
        rx: &mut mpsc::UnboundedReceiver<Action>,
        matches: fn(&Action) -> bool,
    ) {
        loop {
            let action = rx.recv().await.expect("action channel closed");
            let hit = matches(&action);
            app.update(action);
            if hit {
                break;
            }
        }
    }

    #[tokio::test]
    async fn open_goods_loads_first_page() {
        let (mut app, mut rx) = test_app();
        app.update(Action::OpenGoods);
        assert!(app.goods.is_loading());

        pump_until(&mut app, &mut rx, |a| matches!(a, Action::GoodsLoaded(..))).await;
        assert_eq!(app.goods.len(), 10);
        assert!(app.goods.has_more());
        assert!(!app.goods.is_loading());
    }

    #[tokio::test]
    async fn scroll_to_end_appends_next_page() {
        let (mut app, mut rx) = test_app();
        app.update(Action::OpenGoods);
        pump_until(&mut app, &mut rx, |a| matches!(a, Action::GoodsLoaded(..))).await;

        // Walk the cursor to the last row; the append fires there
        for _ in 0..9 {
            app.update(Action::ScrollDown);
        }
        assert!(app.goods.is_loading());
        pump_until(&mut app, &mut rx, |a| matches!(a, Action::GoodsLoaded(..))).await;
        assert_eq!(app.goods.len(), 20);

        // Third page finishes the list
        for _ in 0..10 {
            app.update(Action::ScrollDown);
        }
        pump_until(&mut app, &mut rx, |a| matches!(a, Action::GoodsLoaded(..))).await;
        assert_eq!(app.goods.len(), 25);
        assert!(!app.goods.has_more());

        // And once exhausted, scrolling issues nothing
        app.update(Action::ScrollDown);
        assert!(!app.goods.is_loading());
    }

    #[tokio::test]
    async fn retarget_fences_stale_completion() {
        let (mut app, mut rx) = test_app();
        app.update(Action::OpenGoods);

        // The first page's completion is sitting in the channel; retarget
        // the list before applying it.
        let stale = rx.recv().await.expect("first completion");
        assert!(matches!(stale, Action::GoodsLoaded(..)));

        app.update(Action::StartSearch);
        for c in "bike".chars() {
            app.update(Action::InputChar(c));
        }
        app.update(Action::InputConfirm);

        // Stale completion must be dropped by the fence
        app.update(stale);
        assert_eq!(app.goods.len(), 0);

        // The retargeted fetch lands normally
        pump_until(&mut app, &mut rx, |a| matches!(a, Action::GoodsLoaded(..))).await;
        assert_eq!(app.goods.len(), 10);
        assert_eq!(app.goods_filter.keyword.as_deref(), Some("bike"));
    }

    #[tokio::test]
    async fn load_while_loading_is_ignored() {
        let (mut app, mut rx) = test_app();
        app.update(Action::OpenGoods);
        assert!(app.goods.is_loading());

        // Re-entry while in flight spawns nothing new
        app.update(Action::Refresh);

        pump_until(&mut app, &mut rx, |a| matches!(a, Action::GoodsLoaded(..))).await;
        assert_eq!(app.goods.len(), 10);
        // Exactly one completion was produced
        assert!(rx.try_recv().is_err());
    }
}
