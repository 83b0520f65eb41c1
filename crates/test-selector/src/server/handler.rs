use std::{collections::HashMap, panic::AssertUnwindSafe, time::Duration};

use futures::FutureExt;
use serde_json::{Value, json};
use tower_lsp::{
    LanguageServer,
    jsonrpc::{self, Result},
    lsp_types::*,
};
use tracing::{debug, info, warn};

use crate::{
    buffer::BufferError,
    config::ServerSettings,
    document::Document,
    error::SelectorError,
    selector::TestSelector,
    server::{
        commands::{ALL_COMMANDS, SelectorCommand},
        lsp::{declaration_code_lens, declaration_location, declaration_symbol, minimal_text_edit},
        notifications::{ClientFeatures, prefixed_client_message, short_name},
        state::TestSelectorServer,
    },
};

#[tower_lsp::async_trait]
impl LanguageServer for TestSelectorServer {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> Result<InitializeResult> {
        info!("Initializing test-selector...");

        if let Some(folders) = params.workspace_folders {
            *self.workspace_roots.write().await = folders;
        } else if let Some(root) = params.root_uri {
            *self.workspace_roots.write().await = vec![WorkspaceFolder {
                uri: root,
                name: "root".to_string(),
            }];
        }

        let capabilities = &params.capabilities;
        self.set_client_features(ClientFeatures {
            work_done_progress: capabilities.window.as_ref().and_then(|w| w.work_done_progress).unwrap_or(false),
            code_lens_refresh: capabilities
                .workspace
                .as_ref()
                .and_then(|w| w.code_lens.as_ref())
                .and_then(|c| c.refresh_support)
                .unwrap_or(false),
            document_changes: capabilities
                .workspace
                .as_ref()
                .and_then(|w| w.workspace_edit.as_ref())
                .and_then(|e| e.document_changes)
                .unwrap_or(false),
        });

        let file_settings = self.workspace_file_settings().await.unwrap_or_else(|error| {
            warn!("Ignoring settings file: {error}");
            ServerSettings::default()
        });
        let initial_settings = match params.initialization_options.as_ref() {
            Some(payload) => file_settings.merged_with_payload(payload),
            None => file_settings,
        };
        if let Err(error) = self.apply_settings(initial_settings).await {
            warn!("Invalid selector settings, using defaults: {error}");
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::INCREMENTAL)),
                document_symbol_provider: Some(OneOf::Left(true)),
                code_lens_provider: Some(CodeLensOptions {
                    resolve_provider: Some(false),
                }),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: ALL_COMMANDS.iter().map(|command| command.to_string()).collect(),
                    work_done_progress_options: Default::default(),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "test-selector".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(
        &self,
        _: InitializedParams,
    ) {
        let patterns = self.patterns.read().await.clone();
        info!(
            "test-selector initialized (declarations: `{}`, suppress: `{}`)",
            patterns.declaration_source(),
            patterns.suppress_source()
        );
    }

    async fn did_change_configuration(
        &self,
        params: DidChangeConfigurationParams,
    ) {
        let current = self.settings_snapshot().await;
        let merged = current.merged_with_payload(&params.settings);
        if merged == current {
            return;
        }

        match self.apply_settings(merged).await {
            Ok(true) => {
                info!("Applied updated test-selector settings");
                self.rebuild_selectors().await;
            },
            Ok(false) => info!("Applied updated test-selector settings (patterns unchanged)"),
            Err(error) => {
                warn!("Rejected selector settings: {error}");
                self.show_warning(format!("Invalid selector settings, keeping previous patterns: {error}")).await;
            },
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down test-selector");
        for entry in self.selectors.iter() {
            entry.value().cancel();
        }
        Ok(())
    }

    async fn did_open(
        &self,
        params: DidOpenTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        let version = params.text_document.version;
        let filename = short_name(&uri);

        info!("Opened {filename} (v{version}, {} bytes)", text.len());
        self.log_to_client(MessageType::INFO, format!("Opened {filename}")).await;

        self.document_store.open(uri.clone(), text, version);
        self.spawn_populate(&uri).await;
    }

    async fn did_change(
        &self,
        params: DidChangeTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        self.document_store.apply_changes(&uri, params.content_changes, params.text_document.version);

        let generation = {
            let mut g = self.change_generation.entry(uri.clone()).or_insert(0);
            *g += 1;
            *g
        };
        let debounce_ms = self.settings_snapshot().await.population.debounce_ms;
        let selector = self.selector_for(&uri).await;
        let generations = self.change_generation.clone();
        let document_store = self.document_store.clone();

        tokio::spawn(async move {
            if debounce_ms > 0 {
                tokio::time::sleep(Duration::from_millis(debounce_ms)).await;
            }
            if generations.get(&uri).is_none_or(|current| *current != generation) {
                debug!("[change] {}: superseded edit burst (gen {generation})", short_name(&uri));
                return;
            }
            if let Some(snapshot) = document_store.snapshot(&uri) {
                selector.populate(snapshot).await;
            }
        });
    }

    async fn did_close(
        &self,
        params: DidCloseTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        info!("Closed {}", short_name(&uri));
        self.document_store.close(&uri);
        self.forget(&uri);
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let uri = params.text_document.uri;
        let symbols = self.with_population(&uri, |document, selector| {
            selector.population().map(|population| {
                population.result.iter().map(|declaration| declaration_symbol(document, declaration)).collect()
            })
        });
        Ok(symbols.flatten().map(DocumentSymbolResponse::Nested))
    }

    async fn code_lens(
        &self,
        params: CodeLensParams,
    ) -> Result<Option<Vec<CodeLens>>> {
        let uri = params.text_document.uri;
        let lenses = self.with_population(&uri, |document, selector| {
            selector.population().map(|population| {
                population.result.iter().map(|declaration| declaration_code_lens(document, declaration)).collect()
            })
        });
        Ok(lenses.flatten())
    }

    async fn execute_command(
        &self,
        params: ExecuteCommandParams,
    ) -> Result<Option<Value>> {
        let command = SelectorCommand::parse(&params.command, &params.arguments)
            .map_err(|error| jsonrpc::Error::invalid_params(error.to_string()))?;
        debug!("[command] {command:?}");

        match command {
            SelectorCommand::ToggleSuppression {
                uri,
                name,
            } => {
                self.mutate(&uri, |selector, document| {
                    selector.toggle_suppression(document, &name).map(|edit| usize::from(edit.is_some()))
                })
                .await
            },
            SelectorCommand::SetSuppressed {
                uri,
                name,
                suppressed,
            } => {
                self.mutate(&uri, |selector, document| {
                    selector.set_suppressed(document, &name, suppressed).map(|edit| usize::from(edit.is_some()))
                })
                .await
            },
            SelectorCommand::SetAllSuppressed {
                uri,
                suppressed,
            } => {
                self.mutate(&uri, |selector, document| {
                    selector.set_all_suppressed(document, suppressed).map(|edits| edits.len())
                })
                .await
            },
            SelectorCommand::Navigate {
                uri,
                name,
            } => self.navigate(&uri, &name).await,
            SelectorCommand::Filter {
                uri,
                pattern,
            } => {
                let selector = self.open_selector(&uri)?;
                Ok(Some(json!(selector.filter(&pattern))))
            },
            SelectorCommand::Refresh {
                uri,
            } => {
                let outcome = self.populate(&uri).await.ok_or_else(|| not_open(&uri))?;
                Ok(serde_json::to_value(outcome).ok())
            },
        }
    }
}

impl TestSelectorServer {
    fn open_selector(
        &self,
        uri: &Url,
    ) -> Result<std::sync::Arc<TestSelector>> {
        self.existing_selector(uri).ok_or_else(|| not_open(uri))
    }

    fn with_population<R>(
        &self,
        uri: &Url,
        f: impl FnOnce(&Document, &TestSelector) -> R,
    ) -> Option<R> {
        let selector = self.existing_selector(uri)?;
        self.document_store.with_document(uri, |document| f(document, &selector))
    }

    /// Run `mutation` against a scratch copy of the document mirror and
    /// ship the difference to the client as one `workspace/applyEdit`.
    async fn mutate<F>(
        &self,
        uri: &Url,
        mutation: F,
    ) -> Result<Option<Value>>
    where
        F: FnOnce(&TestSelector, &mut Document) -> std::result::Result<usize, SelectorError>,
    {
        let lock = self.mutation_lock(uri);
        let _guard = lock.lock().await;

        let selector = self.open_selector(uri)?;
        let original = self.document_store.get(uri).ok_or_else(|| not_open(uri))?;
        let mut scratch = original.clone();

        let edits = match mutation(&selector, &mut scratch) {
            Ok(edits) => edits,
            Err(error) => return Err(self.selector_failure(error).await),
        };
        let Some(text_edit) = minimal_text_edit(&original, &scratch.text) else {
            return Ok(Some(json!({ "applied": false, "edits": 0 })));
        };

        // Versioned so the client refuses it if the user typed since `original`.
        let workspace_edit = if self.client_features().document_changes {
            WorkspaceEdit {
                document_changes: Some(DocumentChanges::Edits(vec![TextDocumentEdit {
                    text_document: OptionalVersionedTextDocumentIdentifier {
                        uri: uri.clone(),
                        version: Some(original.version),
                    },
                    edits: vec![OneOf::Left(text_edit)],
                }])),
                ..Default::default()
            }
        } else {
            WorkspaceEdit {
                changes: Some(HashMap::from([(uri.clone(), vec![text_edit])])),
                ..Default::default()
            }
        };
        if self.document_store.with_document(uri, |current| current.version) != Some(original.version) {
            let reason = format!("{} changed while the edit was planned", short_name(uri));
            let error = SelectorError::MutationTransactionFailure(BufferError::Rejected(reason));
            return Err(self.selector_failure(error).await);
        }
        let response = AssertUnwindSafe(self.client.apply_edit(workspace_edit)).catch_unwind().await;
        let rejection = match response {
            Ok(Ok(response)) if response.applied => None,
            Ok(Ok(response)) => Some(response.failure_reason.unwrap_or_else(|| "client declined the edit".to_string())),
            Ok(Err(error)) => Some(error.to_string()),
            Err(_) => Some("client disconnected".to_string()),
        };
        if let Some(reason) = rejection {
            let error = SelectorError::MutationTransactionFailure(BufferError::Rejected(reason));
            return Err(self.selector_failure(error).await);
        }

        let summary = format!("Applied {edits} suppression edit(s) to {}", short_name(uri));
        info!("{summary}");
        self.log_to_client(MessageType::LOG, summary).await;
        // The client echoes the edit via didChange; until then the index
        // tracks the scratch text.
        selector.populate(scratch.text.into()).await;
        Ok(Some(json!({ "applied": true, "edits": edits })))
    }

    async fn navigate(
        &self,
        uri: &Url,
        name: &str,
    ) -> Result<Option<Value>> {
        let selector = self.open_selector(uri)?;
        let document = self.document_store.get(uri).ok_or_else(|| not_open(uri))?;
        let target = match selector.navigate_to(&document, name) {
            Ok(target) => target,
            Err(error) => return Err(self.selector_failure(error).await),
        };
        let location = declaration_location(&document, target);

        let client = self.client.clone();
        let show = ShowDocumentParams {
            uri: location.uri.clone(),
            external: Some(false),
            take_focus: Some(true),
            selection: Some(location.range),
        };
        tokio::spawn(async move {
            match AssertUnwindSafe(client.show_document(show)).catch_unwind().await {
                Ok(Ok(true)) => {},
                Ok(Ok(false)) => debug!("window/showDocument declined"),
                Ok(Err(error)) => debug!("window/showDocument failed: {error}"),
                Err(_) => warn!("window/showDocument panicked (client may have disconnected)"),
            }
        });

        Ok(serde_json::to_value(location).ok())
    }

    async fn selector_failure(
        &self,
        error: SelectorError,
    ) -> jsonrpc::Error {
        warn!("{error}");
        self.show_warning(error.to_string()).await;
        match error {
            SelectorError::UnknownDeclaration(_) | SelectorError::StaleDeclaration(_) => {
                jsonrpc::Error::invalid_params(error.to_string())
            },
            SelectorError::MutationTransactionFailure(_) => jsonrpc::Error {
                code: jsonrpc::ErrorCode::InternalError,
                message: error.to_string().into(),
                data: None,
            },
        }
    }

    async fn show_warning(
        &self,
        message: impl AsRef<str>,
    ) {
        let _ = AssertUnwindSafe(self.client.show_message(MessageType::WARNING, prefixed_client_message(message)))
            .catch_unwind()
            .await;
    }

    async fn log_to_client(
        &self,
        kind: MessageType,
        message: impl AsRef<str>,
    ) {
        if !self.settings_snapshot().await.logging.level.allows(kind) {
            return;
        }
        let _ = AssertUnwindSafe(self.client.log_message(kind, prefixed_client_message(message)))
            .catch_unwind()
            .await;
    }
}

fn not_open(uri: &Url) -> jsonrpc::Error {
    jsonrpc::Error::invalid_params(format!("{} is not open", short_name(uri)))
}
