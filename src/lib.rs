pub mod api;
pub mod auth;
pub mod chat;
pub mod config;
pub mod identity;
pub mod model;
pub mod res;
pub mod session;

use std::sync::Arc;

use axum::{extract::FromRef, http::StatusCode, middleware, response::{IntoResponse, Response}, routing::get, Router};
use serde_json::Value;

use api::{AuthMode, ChatApi};
use identity::IdentityService;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub api: Arc<dyn ChatApi>,
    pub identity: Arc<dyn IdentityService>,
    pub clients: auth::Clients,
    /// Credentials for the push channel; the session's own when unset.
    pub push_auth: Option<AuthMode>,
}

/// The whole site: chat behind the sign-in gate, auth routes and static
/// resources in front of it.
pub fn app(state: AppState) -> Router {
    let chat = chat::router()
        .route_layer(middleware::from_fn(auth::require_session));

    Router::new()
        .merge(chat)
        .merge(auth::router())
        .route("/chat.css", get(res::stylesheet))
        .route("/chat.js", get(res::script))
        .with_state(state)
}

pub trait GetField {
    fn get_str_field(&self, field: &str) -> AppResult<String>;
    fn get_obj_field(&self, field: &str) -> AppResult<&Value>;
}

impl GetField for serde_json::Value {
    fn get_str_field(&self, field: &str) -> AppResult<String> {
        Ok(
            self.get(field)
            .ok_or(format!("expected {field} in {self}"))?
            .as_str()
            .ok_or(format!("expected {field} in {self} to be string"))?
            .to_owned()
        )
    }

    fn get_obj_field(&self, field: &str) -> AppResult<&Value> {
        self.get(field)
        .ok_or(format!("expected {field} in {self}").into())
    }
}


pub type AppResult<T> = Result<T, AppError>;
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("request failed: {:#}\n{}", self.0, self.0.backtrace());
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        Self(anyhow::Error::msg(err))
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        Self(anyhow::Error::msg(err.to_owned()))
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(serde_json::Error);
apperr_impl!(tower_sessions::session::Error);
apperr_impl!(axum::Error);
apperr_impl!(reqwest::Error);
apperr_impl!(oauth2::url::ParseError);
apperr_impl!(api::ApiError);
apperr_impl!(std::io::Error);

impl<E: core::error::Error + Send + Sync + 'static, R: oauth2::ErrorResponse + Send + Sync + 'static> From<oauth2::RequestTokenError<E, R>> for AppError {
    fn from(err: oauth2::RequestTokenError<E, R>) -> Self {
        Self(anyhow::Error::from(err))
    }
}
