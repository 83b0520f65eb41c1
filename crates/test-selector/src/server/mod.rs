pub mod commands;
pub(crate) mod handler;
pub(crate) mod lsp;
pub mod notifications;
pub(crate) mod state;

pub use notifications::{PopulationStateNotification, PopulationStateParams};
pub use state::TestSelectorServer;
