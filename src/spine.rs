//! Reading-order expansion.

use crate::package::{Manifest, ManifestItem, SpineEntry};

/// Iterator over the resolved reading order of a package.
///
/// Direct items pass through; references are looked up by identifier, then
/// by href. Entries that resolve to nothing are logged and skipped.
pub struct SpineWalker<'a> {
    entries: std::slice::Iter<'a, SpineEntry>,
    manifest: &'a Manifest,
}

impl<'a> SpineWalker<'a> {
    pub fn new(spine: &'a [SpineEntry], manifest: &'a Manifest) -> Self {
        Self {
            entries: spine.iter(),
            manifest,
        }
    }
}

impl<'a> Iterator for SpineWalker<'a> {
    type Item = &'a ManifestItem;

    fn next(&mut self) -> Option<Self::Item> {
        for entry in self.entries.by_ref() {
            match entry {
                SpineEntry::Item(item) => return Some(item),
                SpineEntry::Ref(reference) => {
                    let resolved = self
                        .manifest
                        .by_id(reference)
                        .or_else(|| self.manifest.by_href(reference));
                    match resolved {
                        Some(item) => return Some(item),
                        None => {
                            tracing::warn!(
                                idref = %reference,
                                "Spine entry not found in manifest, skipping"
                            );
                        }
                    }
                }
            }
        }
        None
    }
}

/// Resolve a spine against its manifest.
pub fn walk_spine<'a>(spine: &'a [SpineEntry], manifest: &'a Manifest) -> SpineWalker<'a> {
    SpineWalker::new(spine, manifest)
}
