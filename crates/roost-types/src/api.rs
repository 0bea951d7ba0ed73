use serde::{Deserialize, Serialize};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name_first: String,
    pub name_last: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub u_id: u64,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub is_success: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordResetSubmit {
    pub reset_code: String,
    pub new_password: String,
}

// -- Users --

/// Public profile fields, as returned by `/users/*` and embedded in
/// channel details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub u_id: u64,
    pub email: String,
    pub name_first: String,
    pub name_last: String,
    pub handle_str: String,
    pub profile_img_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: Profile,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<Profile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetNameRequest {
    pub name_first: String,
    pub name_last: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetEmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetHandleRequest {
    pub handle_str: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionChangeRequest {
    pub u_id: u64,
    pub permission_id: u64,
}

// -- Channels --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateChannelRequest {
    pub name: String,
    pub is_public: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateChannelResponse {
    pub channel_id: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelSummary {
    pub channel_id: u64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ChannelsResponse {
    pub channels: Vec<ChannelSummary>,
}

/// Member identity as embedded in channel details: no email or handle,
/// just enough to render a member list.
#[derive(Debug, Clone, Serialize)]
pub struct MemberProfile {
    pub u_id: u64,
    pub name_first: String,
    pub name_last: String,
    pub profile_img_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChannelDetails {
    pub name: String,
    pub owner_members: Vec<MemberProfile>,
    pub all_members: Vec<MemberProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetUserRequest {
    pub u_id: u64,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendLaterRequest {
    pub message: String,
    /// Unix seconds; must not be in the past.
    pub time_sent: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageIdResponse {
    pub message_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditMessageRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReactRequest {
    pub react_id: u64,
}

/// Reaction state as seen by one caller: `is_this_user_reacted` is computed
/// per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReactView {
    pub react_id: u64,
    pub u_ids: Vec<u64>,
    pub is_this_user_reacted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageView {
    pub message_id: u64,
    pub u_id: u64,
    pub message: String,
    pub time_created: i64,
    pub reacts: Vec<ReactView>,
    pub is_pinned: bool,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct MessagesPage {
    pub messages: Vec<MessageView>,
    pub start: usize,
    /// `-1` once the oldest message has been included, else `start + 50`.
    pub end: i64,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub messages: Vec<MessageView>,
}

// -- Standups --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StandupStartRequest {
    pub length: i64,
}

#[derive(Debug, Serialize)]
pub struct StandupStartResponse {
    pub time_finish: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StandupSendRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StandupActiveResponse {
    pub is_active: bool,
    pub time_finish: Option<i64>,
}
