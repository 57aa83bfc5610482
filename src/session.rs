use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::AuthMode;

pub const CSRF_STATE: &str = "csrf_state";
pub const PKCE_VERIFIER: &str = "pkce_verifier";
pub const RETURN_URL: &str = "return_url";
pub const CREDENTIALS: &str = "credentials";

/// Tokens of a signed-in user, as kept in the session.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
}

impl Credentials {
    /// Call the API on this user's behalf.
    pub fn auth_mode(&self) -> AuthMode {
        AuthMode::UserPool(self.access_token.clone())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}
