pub mod buffer;
pub mod config;
pub mod document;
pub mod edit;
pub mod error;
pub mod filter;
pub mod navigation;
pub mod population;
pub mod progress;
pub mod scan;
pub mod selector;
pub mod server;

pub use buffer::{BufferError, BufferSnapshot, EditTransaction, FileBuffer, MutableBuffer, TextBuffer};
pub use config::ServerSettings;
pub use edit::{EditKind, SuppressionEdit, SuppressionMutator};
pub use error::SelectorError;
pub use filter::{FilterState, SearchFilter};
pub use navigation::DeclarationLocation;
pub use population::{Population, PopulationOutcome, PopulationPipeline, PopulationState};
pub use scan::{
    DeclarationIndex, DeclarationScanner, LineCursor, PatternError, ScanResult, SelectorPatterns, TestDeclaration,
    TestFramework,
};
pub use selector::TestSelector;
pub use server::TestSelectorServer;
