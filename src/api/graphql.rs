use async_trait::async_trait;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::model::{CreateMessageInput, Message};

use super::{
    documents::{CREATE_MESSAGE, LIST_MESSAGES, ON_CREATE_MESSAGE},
    sse::SseDecoder,
    ApiError, AuthMode, ChatApi, Subscription,
};

const SUBSCRIPTION_BUFFER: usize = 64;

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListMessagesData {
    list_messages: MessagePage,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessagePage {
    items: Vec<Message>,
    next_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateMessageData {
    create_message: Message,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OnCreateMessageData {
    on_create_message: Message,
}

/// HTTP client for the managed GraphQL endpoint.
///
/// Queries and mutations are plain JSON POSTs; subscriptions use GraphQL
/// over server-sent events on the same endpoint.
#[derive(Clone)]
pub struct GraphqlClient {
    endpoint: String,
    http: reqwest::Client,
}

impl GraphqlClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }

    fn request(&self, auth: &AuthMode) -> reqwest::RequestBuilder {
        let request = self.http.post(&self.endpoint);
        match auth {
            AuthMode::UserPool(token) => request.header("Authorization", token),
            AuthMode::ApiKey(key) => request.header("x-api-key", key),
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        auth: &AuthMode,
        query: &str,
        variables: Value,
    ) -> Result<T, ApiError> {
        let response = self
            .request(auth)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        let body: GraphqlResponse<T> = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        into_data(body)
    }
}

fn into_data<T>(response: GraphqlResponse<T>) -> Result<T, ApiError> {
    if !response.errors.is_empty() {
        let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(ApiError::Graphql(messages.join("; ")));
    }
    response
        .data
        .ok_or_else(|| ApiError::Decode("response without data".to_owned()))
}

/// Maps a non-stream reply to a subscription request. Endpoints without
/// subscriptions over HTTP answer with a plain GraphQL error document.
fn rejected_subscription(body: &str) -> ApiError {
    match serde_json::from_str::<GraphqlResponse<Value>>(body).map(into_data) {
        Ok(Err(e)) => e,
        _ => ApiError::Decode("onCreateMessage: expected an event stream".to_owned()),
    }
}

#[async_trait]
impl ChatApi for GraphqlClient {
    async fn list_messages(&self, auth: &AuthMode) -> Result<Vec<Message>, ApiError> {
        let mut messages = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let data: ListMessagesData = self
                .execute(auth, LIST_MESSAGES, json!({ "nextToken": next_token }))
                .await?;
            messages.extend(data.list_messages.items);

            match data.list_messages.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }
        debug!(count = messages.len(), "listed messages");
        Ok(messages)
    }

    async fn create_message(
        &self,
        auth: &AuthMode,
        input: CreateMessageInput,
    ) -> Result<Message, ApiError> {
        let data: CreateMessageData = self
            .execute(auth, CREATE_MESSAGE, json!({ "input": input }))
            .await?;
        Ok(data.create_message)
    }

    async fn on_create_message(&self, auth: &AuthMode) -> Result<Subscription, ApiError> {
        let mut response = self
            .request(auth)
            .header("Accept", "text/event-stream")
            .json(&json!({ "query": ON_CREATE_MESSAGE, "variables": {} }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        let is_event_stream = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("text/event-stream"));
        if !is_event_stream {
            return Err(rejected_subscription(&response.text().await?));
        }

        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let task = tokio::spawn(async move {
            let mut decoder = SseDecoder::default();
            loop {
                let chunk = match response.chunk().await {
                    Ok(Some(chunk)) => chunk,
                    Ok(None) => break,
                    Err(e) => {
                        warn!("onCreateMessage stream failed: {e}");
                        break;
                    }
                };

                for event in decoder.push(&chunk) {
                    match event.event.as_deref() {
                        Some("complete") => return,
                        Some("next") | None => {}
                        Some(other) => {
                            debug!("ignoring SSE event {other}");
                            continue;
                        }
                    }

                    let parsed = serde_json::from_str::<GraphqlResponse<OnCreateMessageData>>(
                        &event.data,
                    )
                    .map_err(|e| ApiError::Decode(e.to_string()))
                    .and_then(into_data);
                    match parsed {
                        Ok(data) => {
                            if tx.send(data.on_create_message).await.is_err() {
                                return;
                            }
                        }
                        Err(e) => warn!("onCreateMessage: {e}"),
                    }
                }
            }
        });

        Ok(Subscription::new(rx, task))
    }
}
