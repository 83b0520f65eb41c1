use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};
use tower_lsp::{
    Client,
    lsp_types::{Url, WorkspaceFolder},
};
use tracing::{debug, info, warn};

use crate::{
    config::{ConfigFileError, ServerSettings},
    document::DocumentStore,
    population::PopulationOutcome,
    scan::{PatternError, SelectorPatterns},
    selector::TestSelector,
    server::notifications::{ClientFeatures, spawn_state_watcher},
};

/// The test-selector backend that implements the Language Server Protocol.
pub struct TestSelectorServer {
    /// The LSP client handle, used to send notifications and requests back.
    pub(crate) client: Client,

    /// Thread-safe store of all open documents.
    pub(crate) document_store: Arc<DocumentStore>,

    /// One selector per open document, created lazily from `patterns`.
    pub(crate) selectors: Arc<DashMap<Url, Arc<TestSelector>>>,

    /// Serialises suppression edits per document so two commands never
    /// plan against the same pre-edit text.
    pub(crate) mutation_locks: DashMap<Url, Arc<Mutex<()>>>,

    /// Debounce generation for re-population on edits.
    ///
    /// Bumped on every `did_change`; only the latest generation scans after
    /// the idle delay.
    pub(crate) change_generation: Arc<DashMap<Url, u64>>,

    /// Workspace root folders, populated during `initialize`.
    pub(crate) workspace_roots: RwLock<Vec<WorkspaceFolder>>,

    /// Runtime server settings updated from LSP configuration.
    pub(crate) settings: Arc<RwLock<ServerSettings>>,

    /// Patterns compiled from `settings`; the last valid set stays in force.
    pub(crate) patterns: RwLock<Arc<SelectorPatterns>>,

    pub(crate) client_features: StdMutex<ClientFeatures>,
}

impl TestSelectorServer {
    pub fn new(client: Client) -> Self {
        let settings = ServerSettings::default();
        let patterns = settings.selector.framework.patterns();
        Self {
            client,
            document_store: Arc::new(DocumentStore::new()),
            selectors: Arc::new(DashMap::new()),
            mutation_locks: DashMap::new(),
            change_generation: Arc::new(DashMap::new()),
            workspace_roots: RwLock::new(Vec::new()),
            settings: Arc::new(RwLock::new(settings)),
            patterns: RwLock::new(patterns),
            client_features: StdMutex::new(ClientFeatures::default()),
        }
    }

    pub(crate) async fn settings_snapshot(&self) -> ServerSettings {
        self.settings.read().await.clone()
    }

    pub(crate) fn client_features(&self) -> ClientFeatures {
        *self.client_features.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_client_features(
        &self,
        features: ClientFeatures,
    ) {
        *self.client_features.lock().unwrap_or_else(PoisonError::into_inner) = features;
    }

    /// Store `settings` and recompile patterns.
    ///
    /// Returns `Ok(true)` when the effective patterns changed. On a pattern
    /// error the settings are still stored but the previous patterns stay.
    pub(crate) async fn apply_settings(
        &self,
        settings: ServerSettings,
    ) -> Result<bool, PatternError> {
        let compiled = settings.selector.compile();
        *self.settings.write().await = settings;
        let compiled = compiled?;

        let mut patterns = self.patterns.write().await;
        let changed = !Arc::ptr_eq(&patterns, &compiled)
            && (patterns.declaration_source() != compiled.declaration_source()
                || patterns.suppress_source() != compiled.suppress_source()
                || patterns.marker_text() != compiled.marker_text()
                || patterns.skip_blank_lines() != compiled.skip_blank_lines());
        *patterns = compiled;
        Ok(changed)
    }

    /// Settings from the nearest `.test-selector.toml` above the first
    /// workspace root, or defaults.
    pub(crate) async fn workspace_file_settings(&self) -> Result<ServerSettings, ConfigFileError> {
        let root = self.workspace_roots.read().await.iter().find_map(|folder| folder.uri.to_file_path().ok());
        match root {
            Some(root) => ServerSettings::discover(&root),
            None => Ok(ServerSettings::default()),
        }
    }

    /// Selector for `uri`, created (with its client watcher) on first use.
    pub(crate) async fn selector_for(
        &self,
        uri: &Url,
    ) -> Arc<TestSelector> {
        if let Some(existing) = self.selectors.get(uri) {
            return Arc::clone(&existing);
        }
        let patterns = Arc::clone(&*self.patterns.read().await);
        let features = self.client_features();
        let entry = self.selectors.entry(uri.clone()).or_insert_with(|| {
            let selector = Arc::new(TestSelector::new(patterns));
            spawn_state_watcher(self.client.clone(), uri.clone(), &selector, features);
            selector
        });
        Arc::clone(&entry)
    }

    pub(crate) fn existing_selector(
        &self,
        uri: &Url,
    ) -> Option<Arc<TestSelector>> {
        self.selectors.get(uri).map(|entry| Arc::clone(&entry))
    }

    pub(crate) fn mutation_lock(
        &self,
        uri: &Url,
    ) -> Arc<Mutex<()>> {
        Arc::clone(&self.mutation_locks.entry(uri.clone()).or_default())
    }

    /// Re-populate `uri` from the current document mirror.
    pub(crate) async fn populate(
        &self,
        uri: &Url,
    ) -> Option<PopulationOutcome> {
        let snapshot = self.document_store.snapshot(uri)?;
        let selector = self.selector_for(uri).await;
        let outcome = selector.populate(snapshot).await;
        debug!("[populate] {uri}: {outcome:?}");
        Some(outcome)
    }

    /// Schedule [`populate`](Self::populate) without waiting for it.
    pub(crate) async fn spawn_populate(
        &self,
        uri: &Url,
    ) {
        let Some(snapshot) = self.document_store.snapshot(uri) else {
            return;
        };
        let selector = self.selector_for(uri).await;
        tokio::spawn(async move {
            selector.populate(snapshot).await;
        });
    }

    /// Drop every selector so the next use picks up new patterns, then
    /// re-populate all open documents.
    pub(crate) async fn rebuild_selectors(&self) {
        self.selectors.clear();
        let uris = self.document_store.all_uris();
        info!("Re-scanning {} open document(s) with new patterns", uris.len());
        for uri in uris {
            self.spawn_populate(&uri).await;
        }
    }

    pub(crate) fn forget(
        &self,
        uri: &Url,
    ) {
        if let Some((_, selector)) = self.selectors.remove(uri) {
            selector.clear();
        } else {
            warn!("close for untracked document {uri}");
        }
        self.mutation_locks.remove(uri);
        self.change_generation.remove(uri);
    }
}
