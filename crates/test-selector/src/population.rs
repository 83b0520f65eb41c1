//! Three-phase population of the declaration list.
//!
//! ```text
//!  Pre (caller)          Background (blocking pool)        Post (caller)
//!  publish Loading  ──►  scan snapshot + build index  ──►  publish Empty | Populated
//! ```
//!
//! [`PopulationPipeline::populate`] is a single async function whose two
//! await points are the hand-offs. Each call takes a new generation under
//! the state channel's lock; Post publishes only if its generation is still
//! the latest, so overlapping requests can never publish out of order and
//! [`cancel`](PopulationPipeline::cancel) simply retires the current
//! generation.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    buffer::BufferSnapshot,
    scan::{DeclarationIndex, DeclarationScanner, ScanResult},
};

/// Result of one completed scan.
#[derive(Debug, Clone)]
pub struct Population {
    pub result: ScanResult,
    pub index: DeclarationIndex,
    pub generation: u64,
}

/// What the declaration view should show.
#[derive(Debug, Clone, Default)]
pub enum PopulationState {
    #[default]
    Loading,
    Empty,
    Populated(Arc<Population>),
}

impl PopulationState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Empty => "empty",
            Self::Populated(_) => "populated",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn population(&self) -> Option<&Arc<Population>> {
        match self {
            Self::Populated(population) => Some(population),
            _ => None,
        }
    }

    pub fn count(&self) -> usize {
        self.population().map_or(0, |population| population.result.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum PopulationOutcome {
    /// Post ran and published `Empty` or `Populated`.
    Published {
        generation: u64,
        count: usize,
    },
    /// A newer request or a cancellation retired this one before Post.
    Superseded {
        generation: u64,
    },
    /// The background scan panicked; `Empty` was published if still current.
    Failed {
        generation: u64,
    },
}

/// Single-writer publisher of [`PopulationState`] for one buffer.
#[derive(Debug)]
pub struct PopulationPipeline {
    state: watch::Sender<PopulationState>,
    generation: AtomicU64,
}

impl Default for PopulationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl PopulationPipeline {
    pub fn new() -> Self {
        let (state, _) = watch::channel(PopulationState::Loading);
        Self {
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PopulationState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> PopulationState {
        self.state.borrow().clone()
    }

    /// Latest generation handed out (0 before the first request).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn populate(
        &self,
        scanner: Arc<DeclarationScanner>,
        snapshot: BufferSnapshot,
    ) -> PopulationOutcome {
        // Pre.
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = PopulationState::Loading;
        });
        debug!("[populate] gen {generation}: loading ({} bytes)", snapshot.as_str().len());

        // Background.
        let background = tokio::task::spawn_blocking(move || {
            let result = scanner.scan(&snapshot);
            let index = DeclarationIndex::build(&result);
            (result, index)
        })
        .await;

        // Post.
        let (result, index) = match background {
            Ok(scanned) => scanned,
            Err(error) => {
                warn!("[populate] gen {generation}: background scan failed: {error}");
                let published = self.publish_if_current(generation, PopulationState::Empty);
                return if published {
                    PopulationOutcome::Failed {
                        generation,
                    }
                } else {
                    PopulationOutcome::Superseded {
                        generation,
                    }
                };
            },
        };

        let count = result.len();
        let next = if result.is_empty() {
            PopulationState::Empty
        } else {
            PopulationState::Populated(Arc::new(Population {
                result,
                index,
                generation,
            }))
        };

        if self.publish_if_current(generation, next) {
            debug!("[populate] gen {generation}: published {count} declaration(s)");
            PopulationOutcome::Published {
                generation,
                count,
            }
        } else {
            debug!("[populate] gen {generation}: superseded, discarding");
            PopulationOutcome::Superseded {
                generation,
            }
        }
    }

    /// Retire any in-flight request. A view stuck in `Loading` drops to `Empty`.
    pub fn cancel(&self) {
        self.state.send_if_modified(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            if state.is_loading() {
                *state = PopulationState::Empty;
                true
            } else {
                false
            }
        });
    }

    /// Retire any in-flight request and show nothing (e.g. buffer closed).
    pub fn clear(&self) {
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = PopulationState::Empty;
        });
    }

    fn publish_if_current(
        &self,
        generation: u64,
        next: PopulationState,
    ) -> bool {
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = next;
            true
        })
    }
}

#[cfg(test)]
#[path = "../tests/src/population_tests.rs"]
mod tests;
