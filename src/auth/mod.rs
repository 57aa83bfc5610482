mod clients;
mod gate;
mod lockin;
mod login;
mod logout;

use axum::{routing::get, Router};

use crate::AppState;

pub use clients::Clients;
pub use gate::require_session;

/// Sign-in and sign-out routes. These sit outside the gate.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login::login))
        .route("/lockin", get(lockin::lockin))
        .route("/logout", get(logout::logout))
}

/// Only same-site paths are followed after sign-in or sign-out.
pub(crate) fn safe_return_url(url: &str) -> Option<&str> {
    (url.starts_with('/') && !url.starts_with("//") && !url.contains('\\')).then_some(url)
}
