pub mod cursor;
mod index;
mod patterns;
mod scanner;

pub use cursor::{Line, LineCursor, find_line_containing, next_line};
pub use index::DeclarationIndex;
pub use patterns::{PatternError, SelectorPatterns, TestFramework};
pub use scanner::{DeclarationScanner, ScanResult, TestDeclaration};
