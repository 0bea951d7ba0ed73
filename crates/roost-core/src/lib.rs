pub mod auth;
pub mod channels;
pub mod error;
pub mod messages;
pub mod sched;
pub mod standup;
pub mod token;
pub mod users;
mod validate;

use std::sync::Mutex;

use roost_types::api::{MemberProfile, Profile};
use roost_types::models::{Channel, Message, StandupWindow, User};

use crate::error::{CoreError, CoreResult};

/// Current wall-clock time in unix seconds.
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Everything the process knows, behind one lock. There is no persistence:
/// state lives for the lifetime of the process and is reset by [`Store::clear`].
#[derive(Debug, Default)]
pub struct State {
    pub users: Vec<User>,
    pub channels: Vec<Channel>,
    /// Global message log in delivery order.
    pub messages: Vec<Message>,
    /// Next message id. Ids start at 1 and are never reused, including for
    /// deferred sends that reserve an id before the message materializes.
    pub msg_counter: u64,
    pub standups: Vec<StandupWindow>,
}

impl State {
    fn new() -> Self {
        State { msg_counter: 1, ..State::default() }
    }
}

/// Process-wide in-memory store. Every public operation takes the lock for
/// its full duration, so each call is atomic with respect to the shared
/// state — including the timer tasks for deferred sends and standup expiry.
pub struct Store {
    auth_key: String,
    state: Mutex<State>,
}

impl Store {
    pub fn new(auth_key: impl Into<String>) -> Self {
        Store {
            auth_key: auth_key.into(),
            state: Mutex::new(State::new()),
        }
    }

    pub fn auth_key(&self) -> &str {
        &self.auth_key
    }

    pub(crate) fn with_state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&State) -> T,
    {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&state)
    }

    pub(crate) fn with_state_mut<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut State) -> T,
    {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    /// Reset every store to its empty initial state. Exposed for test
    /// isolation; the only persistence-adjacent primitive in the system.
    ///
    /// Deferred tasks are not cancellable: a send-later or standup timer
    /// scheduled before `clear()` still fires into the reset store, and its
    /// reserved id can collide with freshly allocated ones. Callers relying
    /// on `clear()` for isolation must not have timers pending.
    pub fn clear(&self) {
        self.with_state_mut(|state| *state = State::new());
    }
}

// Lookup helpers shared by every service module. Lookups that can fail do
// so with the error kind the operation contract requires: an unresolvable
// token is an access failure, a bad target id an input failure.
impl State {
    pub(crate) fn user_by_claim(&self, claim: &str) -> CoreResult<&User> {
        self.users
            .iter()
            .find(|u| u.session.as_deref() == Some(claim))
            .ok_or_else(|| CoreError::access("Invalid Token"))
    }

    pub(crate) fn user(&self, u_id: u64) -> CoreResult<&User> {
        self.users
            .iter()
            .find(|u| u.id == u_id)
            .ok_or_else(|| CoreError::input("Invalid User ID"))
    }

    pub(crate) fn user_mut(&mut self, u_id: u64) -> CoreResult<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.id == u_id)
            .ok_or_else(|| CoreError::input("Invalid User ID"))
    }

    pub(crate) fn channel(&self, channel_id: u64) -> CoreResult<&Channel> {
        self.channels
            .iter()
            .find(|c| c.id == channel_id)
            .ok_or_else(|| CoreError::input(format!("Channel: {channel_id} does not exist")))
    }

    pub(crate) fn channel_mut(&mut self, channel_id: u64) -> CoreResult<&mut Channel> {
        self.channels
            .iter_mut()
            .find(|c| c.id == channel_id)
            .ok_or_else(|| CoreError::input(format!("Channel: {channel_id} does not exist")))
    }

    pub(crate) fn message(&self, message_id: u64) -> CoreResult<&Message> {
        self.messages
            .iter()
            .find(|m| m.id == message_id)
            .ok_or_else(|| CoreError::input(format!("Message: {message_id} does not exist")))
    }

    pub(crate) fn message_mut(&mut self, message_id: u64) -> CoreResult<&mut Message> {
        self.messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| CoreError::input(format!("Message: {message_id} does not exist")))
    }

    pub(crate) fn is_admin(&self, u_id: u64) -> bool {
        self.users
            .iter()
            .any(|u| u.id == u_id && u.role == roost_types::models::Role::Admin)
    }

    pub(crate) fn require_member(&self, channel_id: u64, u_id: u64) -> CoreResult<()> {
        if self.channel(channel_id)?.is_member(u_id) {
            Ok(())
        } else {
            Err(CoreError::access(
                "You must be a member of the channel to view its details",
            ))
        }
    }

    pub(crate) fn profile(&self, user: &User) -> Profile {
        Profile {
            u_id: user.id,
            email: user.email.clone(),
            name_first: user.name_first.clone(),
            name_last: user.name_last.clone(),
            handle_str: user.handle.clone(),
            profile_img_url: user.profile_img_url.clone(),
        }
    }

    pub(crate) fn member_profile(&self, u_id: u64) -> MemberProfile {
        match self.user(u_id) {
            Ok(user) => MemberProfile {
                u_id: user.id,
                name_first: user.name_first.clone(),
                name_last: user.name_last.clone(),
                profile_img_url: user.profile_img_url.clone(),
            },
            // Membership lists only ever hold registered ids; users are
            // never deleted within a process lifetime.
            Err(_) => MemberProfile {
                u_id,
                name_first: String::new(),
                name_last: String::new(),
                profile_img_url: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_resets_counter_and_stores() {
        let store = Store::new("test-key");
        let (_, token) = store
            .register("ada@example.com", "hunter22", "Ada", "Lovelace")
            .unwrap();
        let channel_id = store.channels_create(&token, "general", true).unwrap();
        store.message_send(&token, channel_id, "hello").unwrap();

        store.clear();

        store.with_state(|state| {
            assert!(state.users.is_empty());
            assert!(state.channels.is_empty());
            assert!(state.messages.is_empty());
            assert!(state.standups.is_empty());
            assert_eq!(state.msg_counter, 1);
        });
    }
}
