//! Thin HTTP boundary over `roost-core`: request parsing, bearer-token
//! extraction, and error-to-response mapping. No business rules live here.

pub mod auth;
pub mod channels;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod standup;
pub mod users;

use std::sync::Arc;

use roost_core::Store;

pub type AppState = Arc<Store>;
