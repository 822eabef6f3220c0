//! Manifest items and the two read-only lookup indices.

use std::collections::HashMap;

use crate::path;

/// A declared content item of the package.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ManifestItem {
    /// Unique identifier (OPF `id`).
    pub id: String,
    /// Package-relative, normalized and percent-decoded path.
    pub href: String,
    pub media_type: String,
    /// OPF `properties` flags (e.g. `cover-image`, `nav`).
    pub properties: Vec<String>,
}

impl ManifestItem {
    pub fn new(
        id: impl Into<String>,
        href: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.properties.push(property.into());
        self
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p == property)
    }
}

/// Ordered manifest with lookup by identifier and by href.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    items: Vec<ManifestItem>,
    by_id: HashMap<String, usize>,
    by_href: HashMap<String, usize>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manifest, keeping declaration order.
    ///
    /// Items whose identifier or href was already declared are dropped with a
    /// warning; the first declaration wins.
    pub fn from_items(items: impl IntoIterator<Item = ManifestItem>) -> Self {
        let mut manifest = Self::new();
        for item in items {
            manifest.push(item);
        }
        manifest
    }

    /// Append an item. Returns false if it collided with an earlier item.
    pub fn push(&mut self, item: ManifestItem) -> bool {
        if self.by_id.contains_key(&item.id) {
            tracing::warn!(
                id = %item.id,
                href = %item.href,
                "Duplicate manifest id, ignoring item"
            );
            return false;
        }
        if self.by_href.contains_key(&item.href) {
            tracing::warn!(
                id = %item.id,
                href = %item.href,
                "Duplicate manifest href, ignoring item"
            );
            return false;
        }

        let index = self.items.len();
        self.by_id.insert(item.id.clone(), index);
        self.by_href.insert(item.href.clone(), index);
        self.items.push(item);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, ManifestItem> {
        self.items.iter()
    }

    pub fn by_id(&self, id: &str) -> Option<&ManifestItem> {
        self.by_id.get(id).map(|&i| &self.items[i])
    }

    /// Look up an href, falling back to its percent-decoded form.
    pub fn by_href(&self, href: &str) -> Option<&ManifestItem> {
        self.by_href
            .get(href)
            .or_else(|| self.by_href.get(path::decode(href).as_ref()))
            .map(|&i| &self.items[i])
    }

    /// Resolve an image source path found in the document at `base_href`.
    ///
    /// Tries each of [`path::reference_candidates`] in turn and returns the
    /// first index hit.
    pub fn resolve_reference(&self, base_href: &str, src: &str) -> Option<&ManifestItem> {
        path::reference_candidates(path::dirname(base_href), src)
            .iter()
            .find_map(|candidate| self.by_href(candidate))
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestItem;
    type IntoIter = std::slice::Iter<'a, ManifestItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<ManifestItem> for Manifest {
    fn from_iter<I: IntoIterator<Item = ManifestItem>>(iter: I) -> Self {
        Self::from_items(iter)
    }
}
