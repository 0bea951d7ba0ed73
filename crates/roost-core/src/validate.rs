//! Field validators shared by registration and profile mutation. Each
//! returns the `InputError` the operation contract specifies.

use std::sync::LazyLock;

use regex::Regex;

use crate::State;
use crate::error::{CoreError, CoreResult};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").expect("email regex")
});

pub(crate) fn check_email_format(email: &str) -> CoreResult<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(CoreError::input("Email is invalid"))
    }
}

pub(crate) fn check_email_unique(state: &State, email: &str) -> CoreResult<()> {
    if state.users.iter().any(|u| u.email == email) {
        Err(CoreError::input("Email taken by another user"))
    } else {
        Ok(())
    }
}

pub(crate) fn check_password(password: &str) -> CoreResult<()> {
    if password.chars().count() < 6 {
        Err(CoreError::input("Invalid password; too little characters"))
    } else {
        Ok(())
    }
}

pub(crate) fn check_name(name: &str) -> CoreResult<()> {
    let len = name.chars().count();
    if !(1..=50).contains(&len) {
        Err(CoreError::input(
            "Name must be between 1 and 50 characters inclusive",
        ))
    } else {
        Ok(())
    }
}

pub(crate) fn check_handle_valid(handle: &str) -> CoreResult<()> {
    let len = handle.chars().count();
    if !(2..=20).contains(&len) {
        Err(CoreError::input(
            "Handle should be between 2 and 20 characters long",
        ))
    } else {
        Ok(())
    }
}

pub(crate) fn check_handle_unique(state: &State, handle: &str) -> CoreResult<()> {
    if state.users.iter().any(|u| u.handle == handle) {
        Err(CoreError::input("Handle taken by another user"))
    } else {
        Ok(())
    }
}

/// Derive a unique handle from a user's names: spaces stripped, lowercased,
/// cut to 20 chars. On collision the base is cut to 18, any digits dropped,
/// and a sequence number appended — zero-padded to two digits below 10,
/// raw beyond that ("…01", "…09", "…10", "…11").
pub(crate) fn derive_handle(state: &State, name_first: &str, name_last: &str) -> String {
    let base = format!(
        "{}{}",
        name_first.replace(' ', ""),
        name_last.replace(' ', "")
    )
    .to_lowercase();
    let mut handle: String = base.chars().take(20).collect();

    let mut seq = 0u32;
    while state.users.iter().any(|u| u.handle == handle) {
        seq += 1;
        let mut stem: String = handle.chars().take(18).collect();
        stem.retain(|c| !c.is_ascii_digit());
        handle = if seq < 10 {
            format!("{stem}0{seq}")
        } else {
            format!("{stem}{seq}")
        };
    }

    handle
}
