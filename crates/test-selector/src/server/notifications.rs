//! Server → client traffic that follows population state.

use std::{panic::AssertUnwindSafe, sync::Arc};

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tower_lsp::{
    Client,
    lsp_types::{MessageType, Url, notification::Notification},
};
use tracing::{debug, warn};

use crate::{population::PopulationState, progress::ProgressToken, selector::TestSelector};

const CLIENT_NOTIFICATION_PREFIX: &str = "test-selector:";

/// `testSelector/populationState`, sent on every state transition.
#[derive(Debug)]
pub enum PopulationStateNotification {}

impl Notification for PopulationStateNotification {
    type Params = PopulationStateParams;

    const METHOD: &'static str = "testSelector/populationState";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationStateParams {
    pub uri: Url,
    /// `"loading"`, `"empty"` or `"populated"`.
    pub state: String,
    pub count: usize,
    pub generation: u64,
}

impl PopulationStateParams {
    pub fn new(
        uri: Url,
        state: &PopulationState,
        generation: u64,
    ) -> Self {
        Self {
            uri,
            state: state.label().to_string(),
            count: state.count(),
            generation: state.population().map_or(generation, |population| population.generation),
        }
    }
}

/// Optional client features negotiated in `initialize`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ClientFeatures {
    pub(crate) work_done_progress: bool,
    pub(crate) code_lens_refresh: bool,
    /// The client accepts versioned `documentChanges` in a `WorkspaceEdit`.
    pub(crate) document_changes: bool,
}

/// Forward every state change of `selector` to the client until the
/// selector is dropped.
pub(crate) fn spawn_state_watcher(
    client: Client,
    uri: Url,
    selector: &Arc<TestSelector>,
    features: ClientFeatures,
) -> JoinHandle<()> {
    let mut receiver = selector.subscribe();
    let selector = Arc::downgrade(selector);

    tokio::spawn(async move {
        let mut progress: Option<ProgressToken> = None;
        let mut reported_duplicates: Vec<String> = Vec::new();

        while receiver.changed().await.is_ok() {
            let state = receiver.borrow_and_update().clone();
            let generation = selector.upgrade().map_or(0, |selector| selector.generation());
            let params = PopulationStateParams::new(uri.clone(), &state, generation);
            debug!("[notify] {} → {} ({} tests, gen {})", short_name(&uri), params.state, params.count, params.generation);

            let sent = AssertUnwindSafe(client.send_notification::<PopulationStateNotification>(params))
                .catch_unwind()
                .await;
            if sent.is_err() {
                warn!("populationState notification panicked (client may have disconnected)");
                break;
            }

            if let Some(population) = state.population() {
                let duplicates = population.index.duplicates();
                if duplicates != reported_duplicates.as_slice() {
                    reported_duplicates = duplicates.to_vec();
                    if let Some(message) = duplicate_names_message(&uri, duplicates) {
                        let _ = AssertUnwindSafe(client.show_message(MessageType::WARNING, message)).catch_unwind().await;
                    }
                }
            }

            if features.work_done_progress {
                match (&state, progress.take()) {
                    (PopulationState::Loading, None) => {
                        progress = Some(ProgressToken::begin(&client, "Scanning tests", Some(short_name(&uri))).await);
                    },
                    (PopulationState::Loading, Some(token)) => progress = Some(token),
                    (_, Some(token)) => token.end(Some(format!("{} test(s)", state.count()))).await,
                    (_, None) => {},
                }
            }

            if features.code_lens_refresh && !state.is_loading() {
                let refreshed = AssertUnwindSafe(client.code_lens_refresh()).catch_unwind().await;
                if let Ok(Err(error)) = refreshed {
                    debug!("codeLens/refresh failed: {error}");
                }
            }
        }

        debug!("[notify] watcher for {} stopped", short_name(&uri));
    })
}

/// Warning for test names declared more than once in `uri`, or `None`
/// when every name is unique.
pub(crate) fn duplicate_names_message(
    uri: &Url,
    duplicates: &[String],
) -> Option<String> {
    if duplicates.is_empty() {
        return None;
    }
    Some(prefixed_client_message(format!(
        "{} declares {} more than once; only the last declaration of each is used",
        short_name(uri),
        duplicates.join(", "),
    )))
}

pub(crate) fn prefixed_client_message(message: impl AsRef<str>) -> String {
    format!("{CLIENT_NOTIFICATION_PREFIX} {}", message.as_ref())
}

pub(crate) fn short_name(uri: &Url) -> String {
    uri.path().rsplit('/').next().unwrap_or(uri.path()).to_owned()
}

#[cfg(test)]
#[path = "../../tests/src/server/notifications_tests.rs"]
mod tests;
