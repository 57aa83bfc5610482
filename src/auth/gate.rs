use axum::{extract::Request, middleware::Next, response::{IntoResponse, Redirect, Response}};
use tower_sessions::Session;
use tracing::debug;

use crate::{session::{Credentials, CREDENTIALS}, AppResult};

/// Lets a request through only with signed-in credentials, which it hands
/// to the handler as a `Credentials` extension. Everything else goes to
/// sign-in and comes back afterwards.
pub async fn require_session(
    session: Session,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let Some(credentials) = session.get::<Credentials>(CREDENTIALS).await? else {
        debug!(path = %request.uri().path(), "no session, redirecting to sign-in");
        let target = format!("/login?return_url={}", request.uri().path());
        return Ok(Redirect::to(&target).into_response());
    };

    request.extensions_mut().insert(credentials);
    Ok(next.run(request).await)
}
