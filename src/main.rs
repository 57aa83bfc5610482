use std::sync::Arc;

use livechat::{api::GraphqlClient, app, auth, config::Config, identity::CognitoIdentity, AppState};
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::load().map_err(|e| e.0)?;

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(config.session_minutes)));

    let app_state = AppState {
        api: Arc::new(GraphqlClient::new(config.graphql_endpoint.clone())),
        identity: Arc::new(CognitoIdentity::new(&config.auth.domain)),
        clients: auth::Clients::from_config(&config.auth).map_err(|e| e.0)?,
        push_auth: config.push_auth(),
    };

    let app = app(app_state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("listening on {}", config.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
