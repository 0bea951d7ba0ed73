use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use roost_api::{AppState, auth, channels, messages, standup, users};
use roost_core::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roost=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let auth_key =
        std::env::var("ROOST_AUTH_KEY").unwrap_or_else(|_| "dev-secret-change-me".into());
    let host = std::env::var("ROOST_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("ROOST_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // The single process-wide store; timers for deferred sends and standup
    // expiry hold their own handles to it.
    let store: AppState = Arc::new(Store::new(auth_key));

    let app = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/passwordreset/request", post(auth::password_reset_request))
        .route("/auth/passwordreset/reset", post(auth::password_reset))
        .route("/users", get(users::all))
        .route("/users/{u_id}", get(users::profile))
        .route("/users/name", put(users::set_name))
        .route("/users/email", put(users::set_email))
        .route("/users/handle", put(users::set_handle))
        .route("/admin/permissions", post(users::permission_change))
        .route("/channels", post(channels::create).get(channels::list_mine))
        .route("/channels/all", get(channels::list_all))
        .route("/channels/{channel_id}/details", get(channels::details))
        .route("/channels/{channel_id}/join", post(channels::join))
        .route("/channels/{channel_id}/invite", post(channels::invite))
        .route("/channels/{channel_id}/leave", post(channels::leave))
        .route("/channels/{channel_id}/addowner", post(channels::add_owner))
        .route("/channels/{channel_id}/removeowner", post(channels::remove_owner))
        .route("/channels/{channel_id}/removemember", post(channels::remove_member))
        .route(
            "/channels/{channel_id}/messages",
            get(channels::messages).post(messages::send),
        )
        .route("/channels/{channel_id}/messages/sendlater", post(messages::send_later))
        .route(
            "/messages/{message_id}",
            put(messages::edit).delete(messages::remove),
        )
        .route("/messages/{message_id}/react", post(messages::react))
        .route("/messages/{message_id}/unreact", post(messages::unreact))
        .route("/messages/{message_id}/pin", post(messages::pin))
        .route("/messages/{message_id}/unpin", post(messages::unpin))
        .route("/search", get(messages::search))
        .route("/standup/{channel_id}/start", post(standup::start))
        .route("/standup/{channel_id}/send", post(standup::send))
        .route("/standup/{channel_id}/active", get(standup::active))
        .route("/clear", delete(auth::clear))
        .with_state(store)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Roost server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
