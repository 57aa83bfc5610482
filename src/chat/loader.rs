use tracing::{debug, warn};

use crate::{
    api::ChatApi,
    identity::{resolve_user, Identity, IdentityService},
    model::Message,
    session::Credentials,
};

/// What a page is seeded with before its first render.
#[derive(Debug, Default)]
pub struct InitialData {
    pub messages: Vec<Message>,
}

/// Server-side fetch for the initial render. Never fails: without a user, or
/// when the fetch fails, the page starts from an empty collection.
pub async fn load_initial(
    identity: &dyn IdentityService,
    api: &dyn ChatApi,
    credentials: Option<&Credentials>,
) -> InitialData {
    let Some(credentials) = credentials else {
        return InitialData::default();
    };
    let Identity::Resolved(user) = resolve_user(identity, Some(credentials)).await else {
        return InitialData::default();
    };

    match api.list_messages(&credentials.auth_mode()).await {
        Ok(messages) => {
            debug!(user = %user.username, count = messages.len(), "seeded page");
            InitialData { messages }
        }
        Err(e) => {
            warn!(user = %user.username, "initial listMessages failed: {e}");
            InitialData::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use crate::{
        api::{ApiError, AuthMode, Subscription},
        model::{CreateMessageInput, User},
    };

    use super::*;

    struct Fixed(Option<User>);

    #[async_trait]
    impl IdentityService for Fixed {
        async fn current_authenticated_user(
            &self,
            _credentials: Option<&Credentials>,
        ) -> Result<User, ApiError> {
            self.0.clone().ok_or(ApiError::MissingCredentials)
        }
    }

    struct Listing(Result<Vec<Message>, String>);

    #[async_trait]
    impl ChatApi for Listing {
        async fn list_messages(&self, auth: &AuthMode) -> Result<Vec<Message>, ApiError> {
            assert_eq!(auth, &AuthMode::UserPool("token".into()));
            self.0.clone().map_err(ApiError::Graphql)
        }

        async fn create_message(
            &self,
            _auth: &AuthMode,
            _input: CreateMessageInput,
        ) -> Result<Message, ApiError> {
            unreachable!()
        }

        async fn on_create_message(&self, _auth: &AuthMode) -> Result<Subscription, ApiError> {
            unreachable!()
        }
    }

    fn credentials() -> Credentials {
        Credentials { access_token: "token".into() }
    }

    fn hi() -> Message {
        Message {
            id: "1".into(),
            owner: "alice".into(),
            message: "hi".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[tokio::test]
    async fn resolved_user_gets_messages_on_their_behalf() {
        let data = load_initial(
            &Fixed(Some(User::new("alice"))),
            &Listing(Ok(vec![hi()])),
            Some(&credentials()),
        )
        .await;
        assert_eq!(data.messages, vec![hi()]);
    }

    #[tokio::test]
    async fn unresolved_user_starts_empty() {
        let data = load_initial(&Fixed(None), &Listing(Ok(vec![hi()])), Some(&credentials())).await;
        assert!(data.messages.is_empty());

        let data = load_initial(&Fixed(Some(User::new("alice"))), &Listing(Ok(vec![hi()])), None).await;
        assert!(data.messages.is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_starts_empty() {
        let data = load_initial(
            &Fixed(Some(User::new("alice"))),
            &Listing(Err("Network error".into())),
            Some(&credentials()),
        )
        .await;
        assert!(data.messages.is_empty());
    }
}
