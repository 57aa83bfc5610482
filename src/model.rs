use serde::{Deserialize, Serialize};

/// One chat line as stored by the managed API.
///
/// `id` and `created_at` are assigned by the backend on creation and never by
/// this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub owner: String,
    pub message: String,
    /// ISO-8601 timestamp; lexicographic order is chronological order.
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self { username: username.into() }
    }
}

/// Body of a `createMessage` mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateMessageInput {
    pub message: String,
    pub owner: String,
}
