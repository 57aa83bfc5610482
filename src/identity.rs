use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::{api::ApiError, model::User, session::Credentials};

/// Outcome of identity resolution. Why a user could not be resolved is not
/// observable past this point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Resolved(User),
    Unresolved,
}

#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Fails when there is no live session behind `credentials`.
    async fn current_authenticated_user(
        &self,
        credentials: Option<&Credentials>,
    ) -> Result<User, ApiError>;
}

pub async fn resolve_user(
    service: &dyn IdentityService,
    credentials: Option<&Credentials>,
) -> Identity {
    match service.current_authenticated_user(credentials).await {
        Ok(user) => Identity::Resolved(user),
        Err(e) => {
            debug!("identity unresolved: {e}");
            Identity::Unresolved
        }
    }
}

#[derive(Deserialize)]
struct UserInfo {
    username: String,
}

/// Resolves users against the user pool's `userInfo` endpoint.
#[derive(Clone)]
pub struct CognitoIdentity {
    userinfo_url: String,
    http: reqwest::Client,
}

impl CognitoIdentity {
    /// `domain` is the hosted auth domain, e.g. `https://x.auth.eu-west-1.amazoncognito.com`.
    pub fn new(domain: &str) -> Self {
        Self {
            userinfo_url: format!("{}/oauth2/userInfo", domain.trim_end_matches('/')),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl IdentityService for CognitoIdentity {
    async fn current_authenticated_user(
        &self,
        credentials: Option<&Credentials>,
    ) -> Result<User, ApiError> {
        let credentials = credentials.ok_or(ApiError::MissingCredentials)?;
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(&credentials.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        let info: UserInfo = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(User::new(info.username))
    }
}
