use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinSet};
use tracing::{debug, error, info, warn, Instrument};

use crate::{
    api::{ApiError, AuthMode, ChatApi, Subscription},
    identity::{resolve_user, Identity, IdentityService},
    model::{CreateMessageInput, Message, User},
    session::Credentials,
};

use super::{composer::Composer, store::SyncStore};

/// Input from the browser side of a mounted page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCommand {
    Edit(String),
    Submit,
}

/// Snapshot pushed to the browser after each state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub user: Option<User>,
    /// Display order.
    pub messages: Vec<Message>,
    pub draft: String,
    /// Set on the view that follows a submission.
    pub cleared: bool,
}

enum TaskOutcome {
    Identity(Identity),
    Subscribed(Option<Subscription>),
    Refetched(Result<Vec<Message>, ApiError>),
}

/// Drives one mounted page: identity resolution, the push subscription, the
/// refetch and message submission all funnel into a single loop that owns
/// the store.
pub struct PageController {
    api: Arc<dyn ChatApi>,
    identity: Arc<dyn IdentityService>,
    credentials: Option<Credentials>,
    push_auth: Option<AuthMode>,
}

impl PageController {
    /// `push_auth` selects the credentials for the push channel; `None`
    /// means the session's own.
    pub fn new(
        api: Arc<dyn ChatApi>,
        identity: Arc<dyn IdentityService>,
        credentials: Option<Credentials>,
        push_auth: Option<AuthMode>,
    ) -> Self {
        Self {
            api,
            identity,
            credentials,
            push_auth,
        }
    }

    /// Runs until `commands` closes, which is the unmount. Returning drops
    /// the subscription and any in-flight identity or refetch work. Creation
    /// requests already issued are left to finish.
    pub async fn run(
        self,
        initial: Vec<Message>,
        mut commands: mpsc::Receiver<PageCommand>,
        views: mpsc::Sender<PageView>,
    ) {
        let mut store = SyncStore::new(initial);
        let mut composer = Composer::default();
        let mut tasks = JoinSet::new();
        let mut subscription: Option<Subscription> = None;

        let identity = self.identity.clone();
        let credentials = self.credentials.clone();
        let identity_task = tasks
            .spawn(async move {
                TaskOutcome::Identity(resolve_user(&*identity, credentials.as_ref()).await)
            })
            .id();

        let api = self.api.clone();
        let push_auth = self.push_auth.clone().or_else(|| self.auth_mode());
        tasks.spawn(async move { TaskOutcome::Subscribed(subscribe(&*api, push_auth).await) });

        if views.send(view(&store, &composer, false)).await.is_err() {
            return;
        }

        loop {
            let changed = tokio::select! {
                // browser input is handled in the order it was sent, ahead of
                // anything that completed meanwhile
                biased;

                command = commands.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    match command {
                        PageCommand::Edit(text) => {
                            composer.edit(text);
                            None
                        }
                        PageCommand::Submit => match composer.submit(store.user()) {
                            Ok(input) => {
                                self.create(input);
                                Some(true)
                            }
                            Err(e) => {
                                debug!("submission ignored: {e}");
                                None
                            }
                        },
                    }
                }
                arrival = next_arrival(&mut subscription) => match arrival {
                    Some(message) => {
                        debug!(id = %message.id, owner = %message.owner, "message pushed");
                        store.push_arrival(message);
                        Some(false)
                    }
                    None => {
                        warn!("push channel ended");
                        subscription = None;
                        None
                    }
                },
                Some(joined) = tasks.join_next_with_id() => match joined {
                    Ok((_, outcome)) => self.apply(outcome, &mut store, &mut subscription, &mut tasks),
                    Err(e) if e.id() == identity_task => {
                        // the slot must not stay unknown
                        error!("identity resolution failed: {e}");
                        let outcome = TaskOutcome::Identity(Identity::Unresolved);
                        self.apply(outcome, &mut store, &mut subscription, &mut tasks)
                    }
                    Err(e) => {
                        error!("page task failed: {e}");
                        None
                    }
                },
            };

            if let Some(cleared) = changed {
                if views.send(view(&store, &composer, cleared)).await.is_err() {
                    break;
                }
            }
        }

        drop(subscription);
        debug!("page unmounted");
    }

    fn auth_mode(&self) -> Option<AuthMode> {
        self.credentials.as_ref().map(Credentials::auth_mode)
    }

    /// Issues `createMessage` off the page loop, so an unmount right after
    /// sending does not cancel it. The result is only logged.
    fn create(&self, input: CreateMessageInput) {
        let api = self.api.clone();
        let auth = self.auth_mode();
        tokio::spawn(
            async move {
                let result = match auth {
                    Some(auth) => api.create_message(&auth, input).await,
                    None => Err(ApiError::MissingCredentials),
                };
                match result {
                    Ok(message) => debug!(id = %message.id, "message created"),
                    Err(e) => error!("createMessage failed: {e}"),
                }
            }
            .in_current_span(),
        );
    }

    /// Folds a finished task into the store. Returns `Some` when the view
    /// changed.
    fn apply(
        &self,
        outcome: TaskOutcome,
        store: &mut SyncStore,
        subscription: &mut Option<Subscription>,
        tasks: &mut JoinSet<TaskOutcome>,
    ) -> Option<bool> {
        match outcome {
            TaskOutcome::Identity(identity) => {
                if let Some(user) = store.resolve(identity) {
                    info!(user = %user.username, "user resolved, refetching messages");
                    if let Some(auth) = self.auth_mode() {
                        let api = self.api.clone();
                        tasks.spawn(async move {
                            TaskOutcome::Refetched(api.list_messages(&auth).await)
                        });
                    }
                } else {
                    info!("user unresolved");
                }
                Some(false)
            }
            TaskOutcome::Refetched(Ok(messages)) => {
                debug!(count = messages.len(), "refetched messages");
                store.replace_all(messages);
                Some(false)
            }
            TaskOutcome::Refetched(Err(e)) => {
                error!("listMessages failed: {e}");
                None
            }
            TaskOutcome::Subscribed(opened) => {
                *subscription = opened;
                None
            }
        }
    }
}

async fn subscribe(api: &dyn ChatApi, auth: Option<AuthMode>) -> Option<Subscription> {
    let Some(auth) = auth else {
        warn!("no credentials for onCreateMessage, page will not update live");
        return None;
    };
    match api.on_create_message(&auth).await {
        Ok(subscription) => Some(subscription),
        Err(e) => {
            error!("onCreateMessage subscription failed, page will not update live: {e}");
            None
        }
    }
}

async fn next_arrival(subscription: &mut Option<Subscription>) -> Option<Message> {
    match subscription {
        Some(subscription) => subscription.next().await,
        None => std::future::pending().await,
    }
}

fn view(store: &SyncStore, composer: &Composer, cleared: bool) -> PageView {
    PageView {
        user: store.user().cloned(),
        messages: store.ordered(),
        draft: composer.text().to_owned(),
        cleared,
    }
}
