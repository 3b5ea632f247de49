use crate::error::StallError;
use crate::loader::PageRequest;
use crate::types::{
    Address, Announcement, ChatMessage, Comment, Conversation, FollowedUser, Goods, Order, Page,
    Profile, UserBrief,
};

/// Section of the home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeSection {
    #[default]
    Announcements,
    HotGoods,
}

/// Tab selection for the profile screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileTab {
    #[default]
    Favorites,
    Follows,
}

/// Identifies which paginated list a completion or failure belongs to, so
/// the update loop can route it to the right `PageState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListId {
    Announcements,
    HotGoods,
    Goods,
    Favorites,
    Orders,
    Messages,
    Conversations,
    Follows,
    Comments,
}

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    Back,
    ScrollUp,
    ScrollDown,
    Select,
    SwitchSection,
    Refresh,
    Tick,

    // Screen navigation
    OpenHome,
    OpenGoods,
    OpenOrders,
    OpenConversations,
    OpenProfile,
    OpenWallet,
    OpenAddresses,
    OpenGoodsDetail(Box<Goods>),
    OpenChat(UserBrief),

    // Context-sensitive mutations on the selected row
    Buy,
    ToggleFavorite(bool),
    ToggleFollow(bool),
    DeleteSelected,
    SetDefaultAddress,

    // Text entry (search, chat, recharge, quick-add address, review)
    StartSearch,
    StartChatInput,
    StartRecharge,
    StartNewAddress,
    InputChar(char),
    InputBackspace,
    InputConfirm,
    InputCancel,

    // Paginated list completions, tagged with the request that started them
    AnnouncementsLoaded(Page<Announcement>, PageRequest),
    HotGoodsLoaded(Page<Goods>, PageRequest),
    GoodsLoaded(Page<Goods>, PageRequest),
    FavoritesLoaded(Page<Goods>, PageRequest),
    OrdersLoaded(Page<Order>, PageRequest),
    MessagesLoaded(Page<ChatMessage>, PageRequest),
    ConversationsLoaded(Page<Conversation>, PageRequest),
    FollowsLoaded(Page<FollowedUser>, PageRequest),
    CommentsLoaded(Page<Comment>, PageRequest),
    ListFailed {
        list: ListId,
        req: PageRequest,
        error: String,
    },

    // Single-shot completions
    GoodsDetailLoaded(Box<Goods>),
    ProfileLoaded(Box<Profile>),
    WalletLoaded(i64),
    AddressesLoaded(Vec<Address>),
    UnreadLoaded(u32),

    // Mutations
    OrderUpdated(&'static str),
    FavoriteUpdated(&'static str),
    FollowUpdated(&'static str),
    MessageSent,
    WalletUpdated,
    AddressesUpdated(&'static str),

    Error(String),
    None,
}

impl From<StallError> for Action {
    fn from(err: StallError) -> Self {
        Action::Error(err.to_string())
    }
}
