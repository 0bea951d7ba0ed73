use serde::{Deserialize, Serialize};

/// Global role. The first registered user is always an `Admin`; everyone
/// after that starts as a `Member` and can only be promoted by an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    /// Wire encoding used by the permission-change endpoint: 1 = admin,
    /// 2 = member. Anything else is rejected by the caller.
    pub fn from_permission_id(id: u64) -> Option<Role> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Member),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub password_hash: String,
    pub name_first: String,
    pub name_last: String,
    pub handle: String,
    pub role: Role,
    /// Active session marker: the token claim this user is currently logged
    /// in under. `None` after logout, reassigned on login.
    pub session: Option<String>,
    pub reset_code: Option<String>,
    /// Ids of messages this user authored, in delivery order.
    pub authored_message_ids: Vec<u64>,
    pub profile_img_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: u64,
    pub name: String,
    pub is_public: bool,
    /// Member user ids, insertion-ordered.
    pub members: Vec<u64>,
    /// Owner user ids, insertion-ordered. Owners are always members.
    pub owners: Vec<u64>,
    /// Message ids in delivery order, oldest first.
    pub message_ids: Vec<u64>,
}

impl Channel {
    pub fn is_member(&self, user_id: u64) -> bool {
        self.members.contains(&user_id)
    }

    pub fn is_owner(&self, user_id: u64) -> bool {
        self.owners.contains(&user_id)
    }
}

/// The only reaction kind currently supported. Reactions are stored as a
/// kind -> reactor-set table so further kinds can be added to the allow-set
/// without a model change.
pub const THUMBS_UP: u64 = 1;

pub const VALID_REACT_IDS: &[u64] = &[THUMBS_UP];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct React {
    pub react_id: u64,
    /// Users who reacted with this kind, at most once each.
    pub u_ids: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub channel_id: u64,
    pub author_id: u64,
    /// 1..=1000 chars while the message exists; editing to empty deletes it.
    pub body: String,
    /// Unix seconds at delivery time.
    pub time_created: i64,
    pub reacts: Vec<React>,
    pub is_pinned: bool,
}

impl Message {
    pub fn new(id: u64, channel_id: u64, author_id: u64, body: String, time_created: i64) -> Self {
        Message {
            id,
            channel_id,
            author_id,
            body,
            time_created,
            reacts: VALID_REACT_IDS
                .iter()
                .map(|&react_id| React { react_id, u_ids: Vec::new() })
                .collect(),
            is_pinned: false,
        }
    }

    pub fn react_mut(&mut self, react_id: u64) -> Option<&mut React> {
        self.reacts.iter_mut().find(|r| r.react_id == react_id)
    }
}

/// Per-channel standup buffering window. At most one per channel; reused
/// across runs rather than recreated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandupWindow {
    pub channel_id: u64,
    pub is_active: bool,
    /// Unix seconds the window closes, `None` while inactive.
    pub time_finish: Option<i64>,
    /// User the flushed message is authored as.
    pub starter: Option<u64>,
    /// Buffered `"handle: text"` lines in arrival order.
    pub lines: Vec<String>,
}

impl StandupWindow {
    pub fn inactive(channel_id: u64) -> Self {
        StandupWindow {
            channel_id,
            is_active: false,
            time_finish: None,
            starter: None,
            lines: Vec::new(),
        }
    }
}
