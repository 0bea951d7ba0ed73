//! User directory: profiles, profile mutation, listing, and the global
//! admin permission switch.

use roost_types::api::Profile;
use roost_types::models::Role;

use crate::Store;
use crate::error::{CoreError, CoreResult};
use crate::validate::{
    check_email_format, check_email_unique, check_handle_unique, check_handle_valid, check_name,
};

impl Store {
    /// Public profile of `u_id`, visible to any authenticated caller.
    pub fn user_profile(&self, token: &str, u_id: u64) -> CoreResult<Profile> {
        self.resolve(token)?;
        self.with_state(|state| {
            let user = state.user(u_id)?;
            Ok(state.profile(user))
        })
    }

    /// Every registered user's public profile, in registration order.
    pub fn users_all(&self, token: &str) -> CoreResult<Vec<Profile>> {
        self.resolve(token)?;
        self.with_state(|state| Ok(state.users.iter().map(|u| state.profile(u)).collect()))
    }

    pub fn user_set_name(&self, token: &str, name_first: &str, name_last: &str) -> CoreResult<()> {
        let caller = self.resolve(token)?;
        check_name(name_first)?;
        check_name(name_last)?;
        self.with_state_mut(|state| {
            let user = state.user_mut(caller)?;
            user.name_first = name_first.to_string();
            user.name_last = name_last.to_string();
            Ok(())
        })
    }

    /// Change the caller's email. Stored lower-cased.
    pub fn user_set_email(&self, token: &str, email: &str) -> CoreResult<()> {
        let caller = self.resolve(token)?;
        check_email_format(email)?;
        self.with_state_mut(|state| {
            check_email_unique(state, email)?;
            state.user_mut(caller)?.email = email.to_lowercase();
            Ok(())
        })
    }

    pub fn user_set_handle(&self, token: &str, handle: &str) -> CoreResult<()> {
        let caller = self.resolve(token)?;
        check_handle_valid(handle)?;
        self.with_state_mut(|state| {
            check_handle_unique(state, handle)?;
            state.user_mut(caller)?.handle = handle.to_string();
            Ok(())
        })
    }

    /// Set a user's global role. Admin-only; the permission id must be one
    /// of the two known values (1 = admin, 2 = member).
    pub fn admin_permission_change(
        &self,
        token: &str,
        u_id: u64,
        permission_id: u64,
    ) -> CoreResult<()> {
        let caller = self.resolve(token)?;
        self.with_state_mut(|state| {
            state.user(u_id)?;
            let role = Role::from_permission_id(permission_id)
                .ok_or_else(|| CoreError::input("Invalid Permission ID"))?;
            if !state.is_admin(caller) {
                return Err(CoreError::access("User is not an admin"));
            }
            state.user_mut(u_id)?.role = role;
            Ok(())
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
    fn profile_and_listing() {
        let (store, admin, _) = seeded();
        let profile = store.user_profile(&admin, 2).unwrap();
        assert_eq!(profile.u_id, 2);
        assert_eq!(profile.handle_str, "bobbyte");
        assert_eq!(profile.email, "bob@example.com");

        let all = store.users_all(&admin).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].u_id, 1);
        assert_eq!(all[1].u_id, 2);

        assert_eq!(
            store.user_profile(&admin, 99),
            Err(CoreError::input("Invalid User ID"))
        );
        assert!(store.users_all("garbage").is_err());
    }

    #[test]
    fn set_name_and_handle() {
        let (store, _, member) = seeded();
        store.user_set_name(&member, "Robert", "Byte").unwrap();
        store.user_set_handle(&member, "rbyte").unwrap();
        let profile = store.user_profile(&member, 2).unwrap();
        assert_eq!(profile.name_first, "Robert");
        assert_eq!(profile.handle_str, "rbyte");

        assert_eq!(
            store.user_set_handle(&member, "x"),
            Err(CoreError::input("Handle should be between 2 and 20 characters long"))
        );
        assert_eq!(
            store.user_set_handle(&member, "adalovelace"),
            Err(CoreError::input("Handle taken by another user"))
        );
    }

    #[test]
    fn set_email_lowercases() {
        let (store, _, member) = seeded();
        store.user_set_email(&member, "Bob.Byte@Example.com").unwrap();
        assert_eq!(store.user_profile(&member, 2).unwrap().email, "bob.byte@example.com");

        assert_eq!(
            store.user_set_email(&member, "ada@example.com"),
            Err(CoreError::input("Email taken by another user"))
        );
        assert_eq!(
            store.user_set_email(&member, "nope"),
            Err(CoreError::input("Email is invalid"))
        );
    }

    #[test]
    fn permission_change_gating() {
        let (store, admin, member) = seeded();

        // Non-admin denied even with valid targets.
        assert_eq!(
            store.admin_permission_change(&member, 1, 2),
            Err(CoreError::access("User is not an admin"))
        );

        // Bad permission id rejected before the role check.
        assert_eq!(
            store.admin_permission_change(&member, 1, 3),
            Err(CoreError::input("Invalid Permission ID"))
        );
        assert_eq!(
            store.admin_permission_change(&admin, 99, 1),
            Err(CoreError::input("Invalid User ID"))
        );

        store.admin_permission_change(&admin, 2, 1).unwrap();
        store.with_state(|state| assert!(state.is_admin(2)));

        // A promoted admin can demote others.
        store.admin_permission_change(&member, 1, 2).unwrap();
        store.with_state(|state| assert!(!state.is_admin(1)));
    }
}
