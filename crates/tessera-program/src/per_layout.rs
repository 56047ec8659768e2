//! Per-cluster-layout variant selection.
//!
//! The compiler may emit one [`ProgramMetadata`] per physical cluster
//! placement of the same network; this map keys them by their
//! partial-cluster-layout bitmap.

use tracing::error;

use crate::error::{ProgramError, Result};
use crate::program::ProgramMetadata;
use tessera_chip::clusters::is_layout_ignore;

/// Compiled variants of one program, keyed by cluster-layout bitmap.
///
/// Insertion order is preserved: a lookup with the
/// [`PARTIAL_CLUSTERS_LAYOUT_IGNORE`](tessera_chip::clusters::PARTIAL_CLUSTERS_LAYOUT_IGNORE)
/// sentinel deterministically returns the first-registered variant.
#[derive(Debug, Clone, Default)]
pub struct ProgramMetadataPerLayout {
    variants: Vec<(u32, ProgramMetadata)>,
}

impl ProgramMetadataPerLayout {
    /// Create an empty variant map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the variant compiled for `bitmap`.
    pub fn add_metadata(&mut self, metadata: ProgramMetadata, bitmap: u32) {
        if let Some(entry) = self.variants.iter_mut().find(|(key, _)| *key == bitmap) {
            entry.1 = metadata;
        } else {
            self.variants.push((bitmap, metadata));
        }
    }

    /// The variant compiled for `bitmap`, or the first-registered variant
    /// when `bitmap` is the "any layout" sentinel.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramError::EmptyLayoutMap`] for a sentinel lookup on an
    /// empty map, [`ProgramError::LayoutNotFound`] when no variant matches a
    /// concrete bitmap.
    pub fn metadata(&self, bitmap: u32) -> Result<&ProgramMetadata> {
        if is_layout_ignore(bitmap) {
            return self
                .variants
                .first()
                .map(|(_, metadata)| metadata)
                .ok_or_else(|| {
                    error!("no cluster-layout variants registered");
                    ProgramError::EmptyLayoutMap
                });
        }

        if let Some((_, metadata)) = self.variants.iter().find(|(key, _)| *key == bitmap) {
            return Ok(metadata);
        }
        error!("no metadata for partial clusters layout bitmap {bitmap:#x}");
        Err(ProgramError::LayoutNotFound { bitmap })
    }

    /// Number of registered variants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// True if no variant is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}
