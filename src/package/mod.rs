//! The source package: manifest, reading order, metadata and guide.
//!
//! A [`Package`] is the parsed, read-only view of an EPUB's OPF document.
//! Item payloads are not held here; they are read on demand through a
//! [`ContentSource`] so that only one image is in memory at a time.

mod epub;
mod manifest;
mod opf;

pub use epub::{Epub, ZipContent};
pub use manifest::{Manifest, ManifestItem};
pub use opf::{parse_container_xml, parse_opf};

use std::collections::HashMap;
use std::io;

/// Entry in the reading order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpineEntry {
    /// An already-resolved manifest item.
    Item(ManifestItem),
    /// A reference (OPF `idref`) still to be resolved against the manifest.
    Ref(String),
}

/// A legacy `<guide>` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideReference {
    /// The `type` attribute, e.g. "cover" or "toc".
    pub kind: String,
    /// Package-relative href, possibly with a `#fragment`.
    pub href: String,
}

impl GuideReference {
    pub fn new(kind: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            href: href.into(),
        }
    }
}

/// A `<meta>` element from the package metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaElement {
    pub name: Option<String>,
    pub content: Option<String>,
    pub property: Option<String>,
}

impl MetaElement {
    /// EPUB 2 style `<meta name="..." content="..."/>`.
    pub fn named(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            content: Some(content.into()),
            property: None,
        }
    }
}

/// One metadata section.
///
/// The OPF `<metadata>` element forms a block; legacy OEB packages split it
/// into `<dc-metadata>` and `<x-metadata>` blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaBlock {
    pub elements: Vec<MetaElement>,
}

/// Parsed package document.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub title: Option<String>,
    pub manifest: Manifest,
    pub spine: Vec<SpineEntry>,
    pub metadata: Vec<MetaBlock>,
    pub guide: Vec<GuideReference>,
}

/// Random access to item payloads by manifest href.
pub trait ContentSource {
    /// Read the full payload of the item at `href`.
    fn read(&mut self, href: &str) -> io::Result<Vec<u8>>;
}

impl<C: ContentSource + ?Sized> ContentSource for &mut C {
    fn read(&mut self, href: &str) -> io::Result<Vec<u8>> {
        (**self).read(href)
    }
}

/// In-memory content keyed by href.
#[derive(Debug, Clone, Default)]
pub struct MemoryContent {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, href: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.entries.insert(href.into(), data.into());
    }

    pub fn with(mut self, href: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(href, data);
        self
    }
}

impl ContentSource for MemoryContent {
    fn read(&mut self, href: &str) -> io::Result<Vec<u8>> {
        self.entries.get(href).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("No content for {}", href),
            )
        })
    }
}
