use std::collections::HashMap;

use tracing::warn;

use super::scanner::{ScanResult, TestDeclaration};

/// Name → declaration map built from one [`ScanResult`].
///
/// Never patched: every population cycle builds a fresh index. Offsets are
/// only exact for the snapshot the index came from; names stay usable for
/// live re-resolution after the buffer changes.
#[derive(Debug, Clone, Default)]
pub struct DeclarationIndex {
    by_name: HashMap<String, TestDeclaration>,
    duplicates: Vec<String>,
}

impl DeclarationIndex {
    /// Last declaration wins when names repeat; each repeated name is
    /// reported once through [`duplicates`](Self::duplicates).
    pub fn build(result: &ScanResult) -> Self {
        let mut by_name = HashMap::with_capacity(result.len());
        let mut duplicates = Vec::new();

        for declaration in result {
            if let Some(previous) = by_name.insert(declaration.name.clone(), declaration.clone()) {
                warn!(
                    "duplicate test name '{}' (lines {} and {}), keeping the later one",
                    previous.name,
                    previous.line + 1,
                    declaration.line + 1,
                );
                if !duplicates.contains(&previous.name) {
                    duplicates.push(previous.name);
                }
            }
        }

        Self {
            by_name,
            duplicates,
        }
    }

    pub fn lookup(
        &self,
        name: &str,
    ) -> Option<&TestDeclaration> {
        self.by_name.get(name)
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Names that occurred more than once in the scan.
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }
}

#[cfg(test)]
#[path = "../../tests/src/scan/index_tests.rs"]
mod tests;
