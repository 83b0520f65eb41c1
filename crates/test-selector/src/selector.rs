//! One selector per buffer: scanner, mutator, population state and filter
//! behind a single handle that hosts (the LSP server, the CLI) drive.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

use crate::{
    buffer::{BufferSnapshot, MutableBuffer, TextBuffer},
    edit::{SuppressionEdit, SuppressionMutator},
    error::SelectorError,
    filter::FilterState,
    navigation::{self, DeclarationLocation},
    population::{Population, PopulationOutcome, PopulationPipeline, PopulationState},
    scan::{DeclarationIndex, DeclarationScanner, SelectorPatterns, TestFramework},
};

#[derive(Debug)]
pub struct TestSelector {
    scanner: Arc<DeclarationScanner>,
    mutator: SuppressionMutator,
    pipeline: PopulationPipeline,
    filter: Mutex<FilterState>,
}

impl Default for TestSelector {
    fn default() -> Self {
        Self::with_framework(TestFramework::default())
    }
}

impl TestSelector {
    pub fn new(patterns: Arc<SelectorPatterns>) -> Self {
        Self {
            scanner: Arc::new(DeclarationScanner::new(Arc::clone(&patterns))),
            mutator: SuppressionMutator::new(patterns),
            pipeline: PopulationPipeline::new(),
            filter: Mutex::new(FilterState::default()),
        }
    }

    pub fn with_framework(framework: TestFramework) -> Self {
        Self::new(framework.patterns())
    }

    pub fn patterns(&self) -> &Arc<SelectorPatterns> {
        self.scanner.patterns()
    }

    pub fn scanner(&self) -> &DeclarationScanner {
        &self.scanner
    }

    pub fn mutator(&self) -> &SuppressionMutator {
        &self.mutator
    }

    pub fn subscribe(&self) -> watch::Receiver<PopulationState> {
        self.pipeline.subscribe()
    }

    pub fn state(&self) -> PopulationState {
        self.pipeline.current()
    }

    pub fn generation(&self) -> u64 {
        self.pipeline.generation()
    }

    pub async fn populate(
        &self,
        snapshot: BufferSnapshot,
    ) -> PopulationOutcome {
        self.pipeline.populate(Arc::clone(&self.scanner), snapshot).await
    }

    /// Latest published population, if any.
    pub fn population(&self) -> Option<Arc<Population>> {
        self.pipeline.current().population().cloned()
    }

    /// Index to check names against. Empty while loading or when nothing
    /// was found, so every lookup then fails with `UnknownDeclaration`.
    pub fn index(&self) -> DeclarationIndex {
        self.population().map(|population| population.index.clone()).unwrap_or_default()
    }

    pub fn plan_suppression<B: TextBuffer + ?Sized>(
        &self,
        buffer: &B,
        name: &str,
        suppressed: bool,
    ) -> Result<Option<SuppressionEdit>, SelectorError> {
        self.mutator.plan(buffer, &self.index(), name, suppressed)
    }

    pub fn set_suppressed<B: MutableBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        name: &str,
        suppressed: bool,
    ) -> Result<Option<SuppressionEdit>, SelectorError> {
        self.mutator.set_suppressed(buffer, &self.index(), name, suppressed)
    }

    pub fn toggle_suppression<B: MutableBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        name: &str,
    ) -> Result<Option<SuppressionEdit>, SelectorError> {
        self.mutator.toggle(buffer, &self.index(), name)
    }

    /// Suppress or restore every declaration of the latest population.
    pub fn set_all_suppressed<B: MutableBuffer + ?Sized>(
        &self,
        buffer: &mut B,
        suppressed: bool,
    ) -> Result<Vec<SuppressionEdit>, SelectorError> {
        let Some(population) = self.population() else {
            return Ok(Vec::new());
        };
        self.mutator.set_all_suppressed(buffer, &population.index, population.result.names(), suppressed)
    }

    pub fn navigate_to<B: TextBuffer + ?Sized>(
        &self,
        buffer: &B,
        name: &str,
    ) -> Result<DeclarationLocation, SelectorError> {
        navigation::locate(buffer, &self.index(), name)
    }

    /// Apply a filter pattern and return the visible names in buffer order.
    pub fn filter(
        &self,
        pattern: &str,
    ) -> Vec<String> {
        self.filter.lock().unwrap_or_else(PoisonError::into_inner).update(pattern);
        self.visible_names()
    }

    /// Names visible under the current filter.
    pub fn visible_names(&self) -> Vec<String> {
        let filter = self.filter.lock().unwrap_or_else(PoisonError::into_inner);
        self.population()
            .map(|population| filter.visible(&population.result).into_iter().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    pub fn cancel(&self) {
        self.pipeline.cancel();
    }

    pub fn clear(&self) {
        self.pipeline.clear();
        self.filter.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[cfg(test)]
#[path = "../tests/src/selector_tests.rs"]
mod tests;
