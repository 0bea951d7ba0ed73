//! Registration, login/logout, and the password-reset flow.

use roost_types::models::{Role, User};
use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::token::{decode_token, encode_token, hash_password, make_reset_code};
use crate::validate::{
    check_email_format, check_email_unique, check_name, check_password, derive_handle,
};
use crate::{Store, now};

impl Store {
    /// Create a user and log them in. The first registered user becomes the
    /// global admin; everyone after starts as a member.
    pub fn register(
        &self,
        email: &str,
        password: &str,
        name_first: &str,
        name_last: &str,
    ) -> CoreResult<(u64, String)> {
        check_email_format(email)?;
        check_password(password)?;
        check_name(name_first)?;
        check_name(name_last)?;

        let u_id = self.with_state_mut(|state| {
            check_email_unique(state, email)?;

            let u_id = state.users.len() as u64 + 1;
            let role = if state.users.is_empty() { Role::Admin } else { Role::Member };
            let handle = derive_handle(state, name_first, name_last);

            state.users.push(User {
                id: u_id,
                email: email.to_string(),
                password_hash: hash_password(password),
                name_first: name_first.to_string(),
                name_last: name_last.to_string(),
                handle,
                role,
                session: Some(u_id.to_string()),
                reset_code: None,
                authored_message_ids: Vec::new(),
                profile_img_url: None,
            });
            Ok(u_id)
        })?;

        info!(u_id, "registered user");
        Ok((u_id, encode_token(self.auth_key(), u_id)))
    }

    /// Authenticate by email and password, issuing a fresh token. Any
    /// previously issued token for the user becomes valid again too: the
    /// session is per user, not per token.
    pub fn login(&self, email: &str, password: &str) -> CoreResult<(u64, String)> {
        check_email_format(email)?;
        let hash = hash_password(password);

        let u_id = self.with_state_mut(|state| {
            let user = state
                .users
                .iter_mut()
                .find(|u| u.email == email)
                .ok_or_else(|| CoreError::input("Email does not belong to a user"))?;
            if user.password_hash != hash {
                return Err(CoreError::input("Incorrect password"));
            }
            user.session = Some(user.id.to_string());
            Ok(user.id)
        })?;

        Ok((u_id, encode_token(self.auth_key(), u_id)))
    }

    /// Invalidate the caller's session. Subsequent calls with any token for
    /// this user fail until the next login.
    pub fn logout(&self, token: &str) -> CoreResult<bool> {
        let claim = decode_token(self.auth_key(), token)
            .ok_or_else(|| CoreError::access("Invalid Token"))?;

        self.with_state_mut(|state| {
            let u_id = state.user_by_claim(&claim)?.id;
            state.user_mut(u_id)?.session = None;
            Ok(true)
        })
    }

    /// Resolve a bearer token to a user id. Every other operation starts
    /// with this check.
    pub fn resolve(&self, token: &str) -> CoreResult<u64> {
        let claim = decode_token(self.auth_key(), token)
            .ok_or_else(|| CoreError::access("Invalid Token"))?;
        self.with_state(|state| state.user_by_claim(&claim).map(|u| u.id))
    }

    /// Produce a one-shot reset code for the account with this email. The
    /// code is handed to an external mailer; the core only stores and later
    /// consumes it.
    pub fn password_reset_request(&self, email: &str) -> CoreResult<String> {
        self.with_state_mut(|state| {
            let user = state
                .users
                .iter_mut()
                .find(|u| u.email == email)
                .ok_or_else(|| CoreError::input("Email does not exist"))?;
            let code = make_reset_code(email, now());
            user.reset_code = Some(code.clone());
            Ok(code)
        })
    }

    /// Consume a reset code and set a new password.
    pub fn password_reset(&self, reset_code: &str, new_password: &str) -> CoreResult<()> {
        self.with_state_mut(|state| {
            let user = state
                .users
                .iter_mut()
                .find(|u| u.reset_code.as_deref() == Some(reset_code))
                .ok_or_else(|| CoreError::input("Invalid password reset code"))?;
            check_password(new_password)?;
            user.password_hash = hash_password(new_password);
            user.reset_code = None;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::new("test-key")
    }

    #[test]
    fn register_login_round_trip() {
        let store = store();
        let (u_id, token) = store
            .register("ada@example.com", "hunter22", "Ada", "Lovelace")
            .unwrap();
        assert_eq!(u_id, 1);
        assert_eq!(store.resolve(&token).unwrap(), 1);

        assert!(store.logout(&token).unwrap());
        assert_eq!(
            store.resolve(&token),
            Err(CoreError::access("Invalid Token"))
        );

        let (again, token2) = store.login("ada@example.com", "hunter22").unwrap();
        assert_eq!(again, u_id);
        assert_eq!(store.resolve(&token2).unwrap(), u_id);
    }

    #[test]
    fn first_user_is_admin() {
        let store = store();
        store.register("a@example.com", "hunter22", "Ada", "Lovelace").unwrap();
        store.register("b@example.com", "hunter22", "Bob", "Byte").unwrap();
        store.with_state(|state| {
            assert_eq!(state.users[0].role, Role::Admin);
            assert_eq!(state.users[1].role, Role::Member);
        });
    }

    #[test]
    fn register_validation() {
        let store = store();
        assert_eq!(
            store.register("not-an-email", "hunter22", "Ada", "Lovelace"),
            Err(CoreError::input("Email is invalid"))
        );
        assert_eq!(
            store.register("ada@example.com", "pw", "Ada", "Lovelace"),
            Err(CoreError::input("Invalid password; too little characters"))
        );
        assert!(store.register("ada@example.com", "hunter22", "", "Lovelace").is_err());
        assert!(
            store
                .register("ada@example.com", "hunter22", "Ada", &"x".repeat(51))
                .is_err()
        );

        store.register("ada@example.com", "hunter22", "Ada", "Lovelace").unwrap();
        assert_eq!(
            store.register("ada@example.com", "hunter22", "Ada", "Lovelace"),
            Err(CoreError::input("Email taken by another user"))
        );
    }

    #[test]
    fn login_failures() {
        let store = store();
        store.register("ada@example.com", "hunter22", "Ada", "Lovelace").unwrap();
        assert_eq!(
            store.login("ada@example.com", "wrongpw"),
            Err(CoreError::input("Incorrect password"))
        );
        assert_eq!(
            store.login("nobody@example.com", "hunter22"),
            Err(CoreError::input("Email does not belong to a user"))
        );
    }

    #[test]
    fn tokens_differ_between_users() {
        let store = store();
        let (_, t1) = store.register("a@example.com", "hunter22", "Ada", "Lovelace").unwrap();
        let (_, t2) = store.register("b@example.com", "hunter22", "Bob", "Byte").unwrap();
        assert_ne!(t1, t2);
    }

    #[test]
    fn garbage_token_fails_closed() {
        let store = store();
        store.register("a@example.com", "hunter22", "Ada", "Lovelace").unwrap();
        assert!(store.resolve("garbage").is_err());
        assert!(store.logout("garbage").is_err());
    }

    #[test]
    fn password_reset_flow() {
        let store = store();
        store.register("ada@example.com", "hunter22", "Ada", "Lovelace").unwrap();

        let code = store.password_reset_request("ada@example.com").unwrap();
        store.password_reset(&code, "newpassword").unwrap();

        assert!(store.login("ada@example.com", "hunter22").is_err());
        store.login("ada@example.com", "newpassword").unwrap();

        // Code is one-shot.
        assert_eq!(
            store.password_reset(&code, "anotherpw"),
            Err(CoreError::input("Invalid password reset code"))
        );
    }

    #[test]
    fn password_reset_rejects_bad_input() {
        let store = store();
        store.register("ada@example.com", "hunter22", "Ada", "Lovelace").unwrap();
        assert_eq!(
            store.password_reset_request("nobody@example.com"),
            Err(CoreError::input("Email does not exist"))
        );
        let code = store.password_reset_request("ada@example.com").unwrap();
        assert_eq!(
            store.password_reset(&code, "tiny"),
            Err(CoreError::input("Invalid password; too little characters"))
        );
    }
}
