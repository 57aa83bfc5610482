pub mod composer;
pub mod controller;
pub mod loader;
pub mod render;
pub mod store;
mod ws;

use axum::{
    debug_handler,
    extract::{Extension, State},
    response::Html,
    routing::get,
    Router,
};

use crate::{include_res, session::Credentials, AppResult, AppState};

use self::{loader::load_initial, render::render_chatbox};

/// Routes of the chat page. They expect `Credentials` in the request
/// extensions, so mount them behind `auth::require_session`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(page))
        .route("/ws", get(ws::page_ws))
}

#[debug_handler(state = AppState)]
async fn page(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
) -> AppResult<Html<String>> {
    let initial = load_initial(&*state.identity, &*state.api, Some(&credentials)).await;

    // no user context on the server render
    let chatbox = render_chatbox(&initial.messages, None);
    let seed = serde_json::to_string(&initial.messages)?.replace('<', "\\u003c");

    Ok(Html(
        include_res!(str, "/pages/index.html")
            .replace("{chatbox}", &chatbox)
            .replace("{initial_messages}", &seed),
    ))
}
