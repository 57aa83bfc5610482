mod documents;
mod graphql;
mod sse;

use std::fmt;

use async_trait::async_trait;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::model::{CreateMessageInput, Message};

pub use graphql::GraphqlClient;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("graphql: {0}")]
    Graphql(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("no session credentials")]
    MissingCredentials,
}

/// Which credential set an API call is made with.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// The signed-in user's session token.
    UserPool(String),
    ApiKey(String),
}

impl fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthMode::UserPool(_) => write!(f, "UserPool(..)"),
            AuthMode::ApiKey(_) => write!(f, "ApiKey(..)"),
        }
    }
}

#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Every message in the collection, following pagination to the end.
    async fn list_messages(&self, auth: &AuthMode) -> Result<Vec<Message>, ApiError>;

    async fn create_message(
        &self,
        auth: &AuthMode,
        input: CreateMessageInput,
    ) -> Result<Message, ApiError>;

    /// Opens the push channel of newly created messages.
    async fn on_create_message(&self, auth: &AuthMode) -> Result<Subscription, ApiError>;
}

/// Handle on a live `onCreateMessage` subscription.
///
/// The producing task is aborted when the handle is dropped, so nothing is
/// delivered after the owner lets go of it.
pub struct Subscription {
    rx: mpsc::Receiver<Message>,
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn new(rx: mpsc::Receiver<Message>, task: JoinHandle<()>) -> Self {
        Self { rx, task }
    }

    /// Next created message, or `None` once the channel has ended.
    pub async fn next(&mut self) -> Option<Message> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
        self.rx.close();
        tracing::debug!("unsubscribed from onCreateMessage");
    }
}
