//! Channel and membership store: creation, listing, join/invite/leave,
//! ownership management, and paginated message retrieval.

use roost_types::api::{ChannelDetails, ChannelSummary, MessagesPage};
use roost_types::models::Channel;
use tracing::info;

use crate::Store;
use crate::error::{CoreError, CoreResult};

/// Page size for `channel_messages`.
pub const MESSAGES_PAGE: usize = 50;

impl Store {
    /// Create a channel. The creator becomes a member and the sole owner
    /// atomically with creation.
    pub fn channels_create(&self, token: &str, name: &str, is_public: bool) -> CoreResult<u64> {
        let caller = self.resolve(token)?;
        if name.chars().count() > 20 {
            return Err(CoreError::input("Channel name too long"));
        }

        let channel_id = self.with_state_mut(|state| {
            let channel_id = state.channels.len() as u64 + 1;
            state.channels.push(Channel {
                id: channel_id,
                name: name.to_string(),
                is_public,
                members: vec![caller],
                owners: vec![caller],
                message_ids: Vec::new(),
            });
            channel_id
        });

        info!(channel_id, owner = caller, "created channel");
        Ok(channel_id)
    }

    /// Channels the caller is a member of, in creation order.
    pub fn channels_list(&self, token: &str) -> CoreResult<Vec<ChannelSummary>> {
        let caller = self.resolve(token)?;
        self.with_state(|state| {
            Ok(state
                .channels
                .iter()
                .filter(|c| c.is_member(caller))
                .map(|c| ChannelSummary { channel_id: c.id, name: c.name.clone() })
                .collect())
        })
    }

    /// Every channel in the system, public and private alike.
    pub fn channels_listall(&self, token: &str) -> CoreResult<Vec<ChannelSummary>> {
        self.resolve(token)?;
        self.with_state(|state| {
            Ok(state
                .channels
                .iter()
                .map(|c| ChannelSummary { channel_id: c.id, name: c.name.clone() })
                .collect())
        })
    }

    /// Name and membership of a channel the caller belongs to.
    pub fn channel_details(&self, token: &str, channel_id: u64) -> CoreResult<ChannelDetails> {
        let caller = self.resolve(token)?;
        self.with_state(|state| {
            let channel = state.channel(channel_id)?;
            state.require_member(channel_id, caller)?;
            Ok(ChannelDetails {
                name: channel.name.clone(),
                owner_members: channel.owners.iter().map(|&u| state.member_profile(u)).collect(),
                all_members: channel.members.iter().map(|&u| state.member_profile(u)).collect(),
            })
        })
    }

    /// Join a channel. Private channels admit only global admins and users
    /// who are already owners of the channel.
    pub fn channel_join(&self, token: &str, channel_id: u64) -> CoreResult<()> {
        let caller = self.resolve(token)?;
        self.with_state_mut(|state| {
            let channel = state.channel(channel_id)?;
            if channel.is_member(caller) {
                return Err(CoreError::input("User already a member of this channel"));
            }
            if !channel.is_public && !state.is_admin(caller) && !channel.is_owner(caller) {
                return Err(CoreError::access("User is not authorised to join channel"));
            }
            state.channel_mut(channel_id)?.members.push(caller);
            Ok(())
        })
    }

    /// Add another user to a channel the caller belongs to. The target is a
    /// member immediately; there is no pending-invite step.
    pub fn channel_invite(&self, token: &str, channel_id: u64, u_id: u64) -> CoreResult<()> {
        let caller = self.resolve(token)?;
        self.with_state_mut(|state| {
            state.user(u_id)?;
            let channel = state.channel(channel_id)?;
            state.require_member(channel_id, caller)?;
            if channel.is_member(u_id) {
                return Err(CoreError::input("User already a member of this channel"));
            }
            state.channel_mut(channel_id)?.members.push(u_id);
            Ok(())
        })
    }

    /// Leave a channel, dropping ownership along with membership.
    pub fn channel_leave(&self, token: &str, channel_id: u64) -> CoreResult<()> {
        let caller = self.resolve(token)?;
        self.with_state_mut(|state| {
            state.channel(channel_id)?;
            state.require_member(channel_id, caller)?;
            let channel = state.channel_mut(channel_id)?;
            channel.members.retain(|&u| u != caller);
            channel.owners.retain(|&u| u != caller);
            Ok(())
        })
    }

    /// Promote a member to channel owner. The caller must be a global admin
    /// or a current owner; the target must already be a member.
    pub fn channel_addowner(&self, token: &str, channel_id: u64, u_id: u64) -> CoreResult<()> {
        let caller = self.resolve(token)?;
        self.with_state_mut(|state| {
            let channel = state.channel(channel_id)?;
            if channel.is_owner(u_id) {
                return Err(CoreError::input("User is already an owner"));
            }
            if !state.is_admin(caller) && !channel.is_owner(caller) {
                return Err(CoreError::access("User is not an owner"));
            }
            state.user(u_id)?;
            if !state.channel(channel_id)?.is_member(u_id) {
                return Err(CoreError::input("User is not a member of this channel"));
            }
            state.channel_mut(channel_id)?.owners.push(u_id);
            Ok(())
        })
    }

    /// Demote a channel owner. The target stays a member.
    pub fn channel_removeowner(&self, token: &str, channel_id: u64, u_id: u64) -> CoreResult<()> {
        let caller = self.resolve(token)?;
        self.with_state_mut(|state| {
            let channel = state.channel(channel_id)?;
            if !state.is_admin(caller) && !channel.is_owner(caller) {
                return Err(CoreError::access("User is not an owner"));
            }
            if !channel.is_owner(u_id) {
                return Err(CoreError::input("User being removed as owner is not an owner"));
            }
            state.channel_mut(channel_id)?.owners.retain(|&u| u != u_id);
            Ok(())
        })
    }

    /// Kick a user from a channel entirely. Admin/owner only; kicking
    /// yourself is rejected (leave exists for that).
    pub fn channel_removemember(&self, token: &str, channel_id: u64, u_id: u64) -> CoreResult<()> {
        let caller = self.resolve(token)?;
        self.with_state_mut(|state| {
            state.user(u_id)?;
            let channel = state.channel(channel_id)?;
            if !state.is_admin(caller) && !channel.is_owner(caller) {
                return Err(CoreError::access("User is not an owner"));
            }
            if caller == u_id {
                return Err(CoreError::input(
                    "Removing yourself from the channel is not allowed",
                ));
            }
            let channel = state.channel_mut(channel_id)?;
            channel.owners.retain(|&u| u != u_id);
            channel.members.retain(|&u| u != u_id);
            Ok(())
        })
    }

    /// Up to 50 messages, most recent first, starting `start` back from the
    /// most recent. `end` is `-1` once the oldest message is included,
    /// otherwise `start + 50`.
    pub fn channel_messages(
        &self,
        token: &str,
        channel_id: u64,
        start: usize,
    ) -> CoreResult<MessagesPage> {
        let caller = self.resolve(token)?;
        self.with_state(|state| {
            let channel = state.channel(channel_id)?;
            state.require_member(channel_id, caller)?;
            if start > channel.message_ids.len() {
                return Err(CoreError::input("Messages do not exist"));
            }

            let messages = channel
                .message_ids
                .iter()
                .rev()
                .skip(start)
                .take(MESSAGES_PAGE)
                .filter_map(|&m_id| state.message(m_id).ok())
                .map(|m| state.message_view(m, caller))
                .collect();

            let end = if start + MESSAGES_PAGE >= channel.message_ids.len() {
                -1
            } else {
                (start + MESSAGES_PAGE) as i64
            };

            Ok(MessagesPage { messages, start, end })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (Store, String, String) {
        let store = Store::new("test-key");
        let (_, admin) = store
            .register("ada@example.com", "hunter22", "Ada", "Lovelace")
            .unwrap();
        let (_, member) = store
            .register("bob@example.com", "hunter22", "Bob", "Byte")
            .unwrap();
        (store, admin, member)
    }

    #[test]
    fn create_makes_creator_member_and_owner() {
        let (store, _, bob) = seeded();
        let channel_id = store.channels_create(&bob, "general", true).unwrap();
        assert_eq!(channel_id, 1);

        let details = store.channel_details(&bob, channel_id).unwrap();
        assert_eq!(details.name, "general");
        assert_eq!(details.all_members.len(), 1);
        assert_eq!(details.owner_members.len(), 1);
        assert_eq!(details.owner_members[0].u_id, 2);
    }

    #[test]
    fn create_rejects_long_name() {
        let (store, ada, _) = seeded();
        assert_eq!(
            store.channels_create(&ada, "twenty-one characters", true),
            Err(CoreError::input("Channel name too long"))
        );
    }

    #[test]
    fn listings_filter_by_membership() {
        let (store, ada, bob) = seeded();
        store.channels_create(&ada, "ada-only", true).unwrap();
        let shared = store.channels_create(&ada, "shared", true).unwrap();
        store.channel_join(&bob, shared).unwrap();

        let mine: Vec<u64> = store.channels_list(&bob).unwrap().iter().map(|c| c.channel_id).collect();
        assert_eq!(mine, vec![shared]);

        let all = store.channels_listall(&bob).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn private_join_requires_admin_or_owner() {
        let (store, ada, bob) = seeded();
        let private = store.channels_create(&bob, "secret", false).unwrap();

        let (_, carol) = store
            .register("carol@example.com", "hunter22", "Carol", "Chan")
            .unwrap();
        assert_eq!(
            store.channel_join(&carol, private),
            Err(CoreError::access("User is not authorised to join channel"))
        );

        // Global admin may enter private channels.
        store.channel_join(&ada, private).unwrap();
    }

    #[test]
    fn double_join_rejected() {
        let (store, ada, bob) = seeded();
        let channel_id = store.channels_create(&ada, "general", true).unwrap();
        store.channel_join(&bob, channel_id).unwrap();
        assert_eq!(
            store.channel_join(&bob, channel_id),
            Err(CoreError::input("User already a member of this channel"))
        );
    }

    #[test]
    fn invite_rules() {
        let (store, ada, bob) = seeded();
        let channel_id = store.channels_create(&ada, "general", true).unwrap();

        assert_eq!(
            store.channel_invite(&ada, channel_id, 99),
            Err(CoreError::input("Invalid User ID"))
        );
        assert_eq!(
            store.channel_invite(&ada, 99, 2),
            Err(CoreError::input("Channel: 99 does not exist"))
        );
        // Non-members cannot invite.
        assert!(matches!(
            store.channel_invite(&bob, channel_id, 2),
            Err(CoreError::Access(_))
        ));

        store.channel_invite(&ada, channel_id, 2).unwrap();
        assert_eq!(
            store.channel_invite(&ada, channel_id, 2),
            Err(CoreError::input("User already a member of this channel"))
        );
    }

    #[test]
    fn leave_drops_both_roles() {
        let (store, ada, bob) = seeded();
        let channel_id = store.channels_create(&ada, "general", true).unwrap();
        store.channel_join(&bob, channel_id).unwrap();
        store.channel_addowner(&ada, channel_id, 2).unwrap();

        store.channel_leave(&bob, channel_id).unwrap();
        let details = store.channel_details(&ada, channel_id).unwrap();
        assert!(details.all_members.iter().all(|m| m.u_id != 2));
        assert!(details.owner_members.iter().all(|m| m.u_id != 2));

        // Rejoining starts back at plain membership.
        store.channel_join(&bob, channel_id).unwrap();
        let details = store.channel_details(&ada, channel_id).unwrap();
        assert!(details.owner_members.iter().all(|m| m.u_id != 2));
    }

    #[test]
    fn ownership_transitions() {
        let (store, ada, bob) = seeded();
        let channel_id = store.channels_create(&ada, "general", true).unwrap();

        // Target must be a member before promotion.
        assert_eq!(
            store.channel_addowner(&ada, channel_id, 2),
            Err(CoreError::input("User is not a member of this channel"))
        );
        store.channel_join(&bob, channel_id).unwrap();

        // Non-owner cannot promote.
        let (_, carol) = store
            .register("carol@example.com", "hunter22", "Carol", "Chan")
            .unwrap();
        store.channel_join(&carol, channel_id).unwrap();
        assert_eq!(
            store.channel_addowner(&carol, channel_id, 2),
            Err(CoreError::access("User is not an owner"))
        );

        store.channel_addowner(&ada, channel_id, 2).unwrap();
        assert_eq!(
            store.channel_addowner(&ada, channel_id, 2),
            Err(CoreError::input("User is already an owner"))
        );

        store.channel_removeowner(&bob, channel_id, 1).unwrap();
        assert_eq!(
            store.channel_removeowner(&bob, channel_id, 1),
            Err(CoreError::input("User being removed as owner is not an owner"))
        );
        // Demoted owners stay members.
        let details = store.channel_details(&ada, channel_id).unwrap();
        assert!(details.all_members.iter().any(|m| m.u_id == 1));
    }

    #[test]
    fn remove_member_rules() {
        let (store, ada, bob) = seeded();
        let channel_id = store.channels_create(&ada, "general", true).unwrap();
        store.channel_join(&bob, channel_id).unwrap();

        assert_eq!(
            store.channel_removemember(&bob, channel_id, 1),
            Err(CoreError::access("User is not an owner"))
        );
        assert_eq!(
            store.channel_removemember(&ada, channel_id, 1),
            Err(CoreError::input("Removing yourself from the channel is not allowed"))
        );

        store.channel_removemember(&ada, channel_id, 2).unwrap();
        let details = store.channel_details(&ada, channel_id).unwrap();
        assert!(details.all_members.iter().all(|m| m.u_id != 2));
    }

    #[test]
    fn details_requires_membership() {
        let (store, ada, bob) = seeded();
        let channel_id = store.channels_create(&ada, "general", true).unwrap();
        assert!(matches!(
            store.channel_details(&bob, channel_id),
            Err(CoreError::Access(_))
        ));
        assert!(matches!(
            store.channel_details(&ada, 42),
            Err(CoreError::Input(_))
        ));
    }

    #[test]
    fn pagination_window_and_end_marker() {
        let (store, ada, _) = seeded();
        let channel_id = store.channels_create(&ada, "general", true).unwrap();
        for i in 0..51 {
            store.message_send(&ada, channel_id, &format!("msg {i}")).unwrap();
        }

        let page = store.channel_messages(&ada, channel_id, 0).unwrap();
        assert_eq!(page.messages.len(), 50);
        assert_eq!(page.end, 50);
        // Most recent first.
        assert_eq!(page.messages[0].message, "msg 50");
        assert_eq!(page.messages[49].message, "msg 1");

        let page = store.channel_messages(&ada, channel_id, 50).unwrap();
        assert_eq!(page.messages.len(), 1);
        assert_eq!(page.messages[0].message, "msg 0");
        assert_eq!(page.end, -1);

        assert_eq!(
            store.channel_messages(&ada, channel_id, 52),
            Err(CoreError::input("Messages do not exist"))
        );
    }

    #[test]
    fn pagination_small_channel() {
        let (store, ada, _) = seeded();
        let channel_id = store.channels_create(&ada, "general", true).unwrap();
        let page = store.channel_messages(&ada, channel_id, 0).unwrap();
        assert!(page.messages.is_empty());
        assert_eq!(page.end, -1);

        store.message_send(&ada, channel_id, "only one").unwrap();
        let page = store.channel_messages(&ada, channel_id, 0).unwrap();
        assert_eq!(page.messages.len(), 1);
        assert_eq!(page.end, -1);
    }
}
