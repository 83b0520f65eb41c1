//! Work-done progress via `$/progress`.
//!
//! A population run is mirrored as one progress session: `Begin` when the
//! pipeline publishes `Loading`, `End` when it publishes a result.

use std::{
    panic::AssertUnwindSafe,
    sync::atomic::{AtomicU64, Ordering},
};

use futures::FutureExt;
use tower_lsp::{Client, lsp_types::*};
use tracing::{debug, warn};

const TITLE_PREFIX: &str = "test-selector:";

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// An open progress session.
///
/// Dropping it without [`end`](Self::end) still sends `End` so the editor
/// never keeps a stuck indicator.
pub struct ProgressToken {
    session: Option<(Client, NumberOrString)>,
}

impl ProgressToken {
    pub async fn begin(
        client: &Client,
        title: &str,
        message: Option<String>,
    ) -> Self {
        let session = SESSION_COUNTER.fetch_add(1, Ordering::Relaxed);
        let token = NumberOrString::String(format!("testSelector/{}/{session}", title.trim()));
        let title = prefixed_progress_title(title);

        // Detached; `Begin` does not wait for the create response.
        tokio::spawn({
            let client = client.clone();
            let token = token.clone();
            async move {
                let created = AssertUnwindSafe(
                    client.send_request::<request::WorkDoneProgressCreate>(WorkDoneProgressCreateParams {
                        token,
                    }),
                )
                .catch_unwind()
                .await;
                match created {
                    Ok(Ok(())) => {},
                    Ok(Err(error)) => debug!("workDoneProgress/create failed: {error}"),
                    Err(_) => warn!("workDoneProgress/create panicked (client may have disconnected)"),
                }
            }
        });

        let begin = WorkDoneProgress::Begin(WorkDoneProgressBegin {
            title: title.clone(),
            cancellable: Some(false),
            message,
            percentage: None,
        });
        if !send_progress(client, token.clone(), begin).await {
            warn!("[progress] `{title}` could not start (client may have disconnected)");
            return Self {
                session: None,
            };
        }

        debug!("[progress] begin `{title}` ({token:?})");
        Self {
            session: Some((client.clone(), token)),
        }
    }

    pub async fn end(
        mut self,
        message: Option<String>,
    ) {
        if let Some((client, token)) = self.session.take() {
            debug!("[progress] end {token:?}");
            send_progress(
                &client,
                token,
                WorkDoneProgress::End(WorkDoneProgressEnd {
                    message,
                }),
            )
            .await;
        }
    }
}

impl Drop for ProgressToken {
    fn drop(&mut self) {
        let Some((client, token)) = self.session.take() else {
            return;
        };
        debug!("[progress] dropped {token:?}");
        tokio::spawn(async move {
            let end = WorkDoneProgress::End(WorkDoneProgressEnd {
                message: Some("Cancelled".to_string()),
            });
            send_progress(&client, token, end).await;
        });
    }
}

/// `false` if sending panicked.
async fn send_progress(
    client: &Client,
    token: NumberOrString,
    value: WorkDoneProgress,
) -> bool {
    let params = ProgressParams {
        token,
        value: ProgressParamsValue::WorkDone(value),
    };
    AssertUnwindSafe(client.send_notification::<notification::Progress>(params)).catch_unwind().await.is_ok()
}

fn prefixed_progress_title(title: &str) -> String {
    let title = title.trim();
    match title.strip_prefix(TITLE_PREFIX) {
        Some(_) => title.to_owned(),
        None => format!("{TITLE_PREFIX} {title}"),
    }
}

#[cfg(test)]
#[path = "../tests/src/progress_tests.rs"]
mod tests;
