use axum::{
    debug_handler,
    extract::{
        ws::{Message as WsMessage, WebSocket},
        Extension, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, Instrument};
use uuid::Uuid;

use crate::{model::Message, session::Credentials, AppState};

use super::{
    controller::{PageCommand, PageController, PageView},
    render::render_chatbox,
};

const COMMAND_BUFFER: usize = 32;
const VIEW_BUFFER: usize = 32;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientFrame {
    Mount { messages: Vec<Message> },
    Edit { text: String },
    Submit,
}

#[derive(Debug, Serialize)]
struct ViewFrame {
    chatbox: String,
    draft: String,
    ready: bool,
    cleared: bool,
}

impl From<PageView> for ViewFrame {
    fn from(view: PageView) -> Self {
        Self {
            chatbox: render_chatbox(&view.messages, view.user.as_ref()),
            draft: view.draft,
            ready: view.user.is_some(),
            cleared: view.cleared,
        }
    }
}

#[debug_handler(state = AppState)]
pub(crate) async fn page_ws(
    State(state): State<AppState>,
    Extension(credentials): Extension<Credentials>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let mount_id = Uuid::now_v7();
    ws.on_upgrade(move |socket| {
        mount(socket, state, credentials).instrument(tracing::info_span!("page", mount = %mount_id))
    })
}

/// One websocket is one mounted page; it unmounts when the socket closes.
async fn mount(socket: WebSocket, state: AppState, credentials: Credentials) {
    let (mut sender, mut receiver) = socket.split();

    let Some(initial) = await_mount(&mut receiver).await else {
        return;
    };
    info!(seeded = initial.len(), "page mounted");

    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (view_tx, mut view_rx) = mpsc::channel::<PageView>(VIEW_BUFFER);

    let controller = PageController::new(
        state.api.clone(),
        state.identity.clone(),
        Some(credentials),
        state.push_auth.clone(),
    );
    let mut controller_task =
        tokio::spawn(controller.run(initial, command_rx, view_tx).in_current_span());

    let mut view_task = tokio::spawn(async move {
        while let Some(view) = view_rx.recv().await {
            let Ok(frame) = serde_json::to_string(&ViewFrame::from(view)) else {
                continue;
            };
            if sender.send(WsMessage::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    let mut controller_done = false;
    loop {
        tokio::select! {
            msg = receiver.next() => {
                let Some(Ok(msg)) = msg else {
                    break;
                };
                let WsMessage::Text(text) = msg else {
                    continue;
                };
                let Some(command) = page_command(&text) else {
                    continue;
                };
                if command_tx.send(command).await.is_err() {
                    break;
                }
            }
            _ = &mut view_task => break,
            _ = &mut controller_task => {
                controller_done = true;
                break;
            }
        }
    }

    drop(command_tx);
    if !controller_done {
        let _ = controller_task.await;
    }
    view_task.abort();
    info!("page closed");
}

/// Reads frames until the page's embedded seed arrives. `None` when the
/// socket goes away first.
async fn await_mount<S, E>(receiver: &mut S) -> Option<Vec<Message>>
where
    S: Stream<Item = Result<WsMessage, E>> + Unpin,
{
    loop {
        match receiver.next().await {
            Some(Ok(WsMessage::Text(text))) => match serde_json::from_str(&text) {
                Ok(ClientFrame::Mount { messages }) => return Some(messages),
                Ok(frame) => debug!("frame before mount: {frame:?}"),
                Err(e) => debug!("bad frame: {e}"),
            },
            Some(Ok(_)) => continue,
            _ => return None,
        }
    }
}

/// Commands of a mounted page; a repeated mount is ignored.
fn page_command(text: &str) -> Option<PageCommand> {
    match serde_json::from_str(text) {
        Ok(ClientFrame::Edit { text }) => Some(PageCommand::Edit(text)),
        Ok(ClientFrame::Submit) => Some(PageCommand::Submit),
        Ok(ClientFrame::Mount { .. }) => None,
        Err(e) => {
            debug!("bad frame: {e}");
            None
        }
    }
}
