//! Message lifecycle: send, deferred send, edit, remove, reactions,
//! pinning, and search.

use std::sync::Arc;

use roost_types::api::{MessageView, ReactView};
use roost_types::models::{Message, VALID_REACT_IDS};
use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::{State, Store, now};

impl State {
    /// Materialize a message in the log, the channel's id list, and the
    /// author's authored list. Shared by immediate send, deferred delivery,
    /// and standup flushes; validation happens before this point.
    pub(crate) fn deliver(&mut self, m_id: u64, channel_id: u64, author_id: u64, body: String) {
        self.messages.push(Message::new(m_id, channel_id, author_id, body, now()));
        if let Ok(channel) = self.channel_mut(channel_id) {
            channel.message_ids.push(m_id);
        }
        if let Ok(author) = self.user_mut(author_id) {
            author.authored_message_ids.push(m_id);
        }
    }

    /// View of a message relative to one caller; reaction membership is
    /// computed per request rather than stored.
    pub(crate) fn message_view(&self, message: &Message, caller: u64) -> MessageView {
        MessageView {
            message_id: message.id,
            u_id: message.author_id,
            message: message.body.clone(),
            time_created: message.time_created,
            reacts: message
                .reacts
                .iter()
                .map(|r| ReactView {
                    react_id: r.react_id,
                    u_ids: r.u_ids.clone(),
                    is_this_user_reacted: r.u_ids.contains(&caller),
                })
                .collect(),
            is_pinned: message.is_pinned,
        }
    }

    /// Authorship, global admin role, or channel ownership each allow
    /// editing and removing a message.
    fn check_can_modify(&self, caller: u64, m_id: u64) -> CoreResult<()> {
        let message = self.message(m_id)?;
        if message.author_id == caller
            || self.is_admin(caller)
            || self.channel(message.channel_id)?.is_owner(caller)
        {
            Ok(())
        } else {
            Err(CoreError::access("You are not authorised to alter this channel"))
        }
    }

    /// Pinning requires channel ownership or the admin role; authorship is
    /// not enough.
    fn check_can_pin(&self, caller: u64, m_id: u64) -> CoreResult<()> {
        let message = self.message(m_id)?;
        let channel_id = message.channel_id;
        self.require_member(channel_id, caller)?;
        if self.is_admin(caller) || self.channel(channel_id)?.is_owner(caller) {
            Ok(())
        } else {
            Err(CoreError::access("You are not authorised to alter this channel"))
        }
    }
}

fn check_body_length(body: &str) -> CoreResult<()> {
    let len = body.chars().count();
    if !(1..=1000).contains(&len) {
        return Err(CoreError::input(
            "Messages should be between 0 and 1000 characters long",
        ));
    }
    Ok(())
}

impl Store {
    /// Send a message to a channel the caller belongs to. Returns the new
    /// message's id.
    pub fn message_send(&self, token: &str, channel_id: u64, body: &str) -> CoreResult<u64> {
        let caller = self.resolve(token)?;
        self.with_state_mut(|state| {
            state.channel(channel_id)?;
            check_body_length(body)?;
            state.require_member(channel_id, caller)?;

            let m_id = state.msg_counter;
            state.msg_counter += 1;
            state.deliver(m_id, channel_id, caller, body.to_string());
            Ok(m_id)
        })
    }

    /// Schedule a message for delivery at `time_sent` (unix seconds). The
    /// id is allocated and reserved immediately; the message itself
    /// materializes when the timer fires, independent of any further client
    /// activity.
    pub fn message_send_later(
        self: &Arc<Self>,
        token: &str,
        channel_id: u64,
        body: &str,
        time_sent: i64,
    ) -> CoreResult<u64> {
        let caller = self.resolve(token)?;
        let m_id = self.with_state_mut(|state| {
            state.channel(channel_id)?;
            check_body_length(body)?;
            if time_sent < now() {
                return Err(CoreError::input("Time sent is in the past"));
            }
            state.require_member(channel_id, caller)?;

            let m_id = state.msg_counter;
            state.msg_counter += 1;
            Ok(m_id)
        })?;

        let body = body.to_string();
        self.spawn_at(time_sent, move |store| {
            info!(m_id, channel_id, "delivering deferred message");
            store.with_state_mut(|state| state.deliver(m_id, channel_id, caller, body));
        });

        Ok(m_id)
    }

    /// Replace a message's body in place. An empty body is defined as
    /// deletion and delegates to [`Store::message_remove`].
    pub fn message_edit(&self, token: &str, m_id: u64, body: &str) -> CoreResult<()> {
        if body.chars().count() > 1000 {
            return Err(CoreError::input(
                "Messages should be between 0 and 1000 characters long",
            ));
        }
        if body.is_empty() {
            return self.message_remove(token, m_id);
        }

        let caller = self.resolve(token)?;
        self.with_state_mut(|state| {
            state.check_can_modify(caller, m_id)?;
            state.message_mut(m_id)?.body = body.to_string();
            Ok(())
        })
    }

    /// Delete a message from the log, its channel, and its author's
    /// authored list.
    pub fn message_remove(&self, token: &str, m_id: u64) -> CoreResult<()> {
        let caller = self.resolve(token)?;
        self.with_state_mut(|state| {
            state.check_can_modify(caller, m_id)?;
            let author_id = state.message(m_id)?.author_id;

            state.messages.retain(|m| m.id != m_id);
            for channel in &mut state.channels {
                channel.message_ids.retain(|&id| id != m_id);
            }
            if let Ok(author) = state.user_mut(author_id) {
                author.authored_message_ids.retain(|&id| id != m_id);
            }
            Ok(())
        })
    }

    /// React to a message. Reacting twice with the same kind is rejected,
    /// not ignored.
    pub fn message_react(&self, token: &str, m_id: u64, react_id: u64) -> CoreResult<()> {
        let caller = self.resolve(token)?;
        self.with_state_mut(|state| {
            state.message(m_id)?;
            check_react_id(react_id)?;
            let react = state
                .message_mut(m_id)?
                .react_mut(react_id)
                .ok_or_else(|| CoreError::input(format!("React {react_id} does not exist")))?;
            if react.u_ids.contains(&caller) {
                return Err(CoreError::input(format!("Message already has react {react_id}")));
            }
            react.u_ids.push(caller);
            Ok(())
        })
    }

    /// Remove the caller's reaction. Unreacting without a prior react is
    /// rejected.
    pub fn message_unreact(&self, token: &str, m_id: u64, react_id: u64) -> CoreResult<()> {
        let caller = self.resolve(token)?;
        self.with_state_mut(|state| {
            state.message(m_id)?;
            check_react_id(react_id)?;
            let react = state
                .message_mut(m_id)?
                .react_mut(react_id)
                .ok_or_else(|| CoreError::input(format!("React {react_id} does not exist")))?;
            if !react.u_ids.contains(&caller) {
                return Err(CoreError::input(format!("Message does not have react {react_id}")));
            }
            react.u_ids.retain(|&u| u != caller);
            Ok(())
        })
    }

    pub fn message_pin(&self, token: &str, m_id: u64) -> CoreResult<()> {
        let caller = self.resolve(token)?;
        self.with_state_mut(|state| {
            if state.message(m_id)?.is_pinned {
                return Err(CoreError::input("Message is already pinned"));
            }
            state.check_can_pin(caller, m_id)?;
            state.message_mut(m_id)?.is_pinned = true;
            Ok(())
        })
    }

    pub fn message_unpin(&self, token: &str, m_id: u64) -> CoreResult<()> {
        let caller = self.resolve(token)?;
        self.with_state_mut(|state| {
            if !state.message(m_id)?.is_pinned {
                return Err(CoreError::input("Message is already unpinned"));
            }
            state.check_can_pin(caller, m_id)?;
            state.message_mut(m_id)?.is_pinned = false;
            Ok(())
        })
    }

    /// Case-sensitive substring search over the caller's own authored
    /// messages, in authoring order.
    pub fn search(&self, token: &str, query: &str) -> CoreResult<Vec<MessageView>> {
        let caller = self.resolve(token)?;
        self.with_state(|state| {
            let authored = &state.user(caller)?.authored_message_ids;
            Ok(authored
                .iter()
                .filter_map(|&m_id| state.message(m_id).ok())
                .filter(|m| m.body.contains(query))
                .map(|m| state.message_view(m, caller))
                .collect())
        })
    }
}

fn check_react_id(react_id: u64) -> CoreResult<()> {
    if VALID_REACT_IDS.contains(&react_id) {
        Ok(())
    } else {
        Err(CoreError::input(format!("React {react_id} does not exist")))
    }
}
