//! Cover image resolution.
//!
//! Four independent strategies are tried in a fixed order and the first one
//! that produces a candidate wins:
//!
//! 1. [`declared_property`]: an item flagged `cover-image` (EPUB 3)
//! 2. [`metadata_pointer`]: `<meta name="cover" content="id"/>` (EPUB 2)
//! 3. [`guide_pointer`]: the first image of the `<guide>` cover page
//! 4. [`naming_convention`]: an image named like a cover, or the only image
//!
//! Each strategy returns the chosen item together with every candidate it
//! saw, which is only used for diagnostics.

use std::fmt;

use crate::media;
use crate::package::{ContentSource, GuideReference, Manifest, ManifestItem, MetaBlock, Package};
use crate::path;
use crate::scan::{ImageRefs, ScanOptions};
use crate::util::decode_xml;

/// The detection strategy that produced a cover candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "snake_case"))]
pub enum CoverStrategy {
    DeclaredProperty,
    MetadataPointer,
    GuidePointer,
    NamingConvention,
}

impl CoverStrategy {
    /// Cascade order.
    pub const ALL: [CoverStrategy; 4] = [
        CoverStrategy::DeclaredProperty,
        CoverStrategy::MetadataPointer,
        CoverStrategy::GuidePointer,
        CoverStrategy::NamingConvention,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CoverStrategy::DeclaredProperty => "manifest_property",
            CoverStrategy::MetadataPointer => "metadata",
            CoverStrategy::GuidePointer => "guide",
            CoverStrategy::NamingConvention => "id_convention",
        }
    }
}

impl fmt::Display for CoverStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A manifest item some strategy considered as the cover.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CoverCandidate {
    pub strategy: CoverStrategy,
    pub item: ManifestItem,
}

/// Outcome of the strategy that succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CoverResolution {
    pub strategy: CoverStrategy,
    /// The chosen cover; always the first of `candidates`.
    pub item: ManifestItem,
    pub candidates: Vec<CoverCandidate>,
}

impl CoverResolution {
    /// Build a resolution from a strategy's candidates; the first one is chosen.
    fn from_candidates<'m>(
        strategy: CoverStrategy,
        items: impl IntoIterator<Item = &'m ManifestItem>,
    ) -> Option<Self> {
        let candidates: Vec<_> = items
            .into_iter()
            .map(|item| CoverCandidate {
                strategy,
                item: item.clone(),
            })
            .collect();
        let item = candidates.first()?.item.clone();
        Some(Self {
            strategy,
            item,
            candidates,
        })
    }
}

/// Runs the cover strategy cascade over a package.
pub struct CoverResolver<'a> {
    package: &'a Package,
    scan: ScanOptions,
}

impl<'a> CoverResolver<'a> {
    pub fn new(package: &'a Package) -> Self {
        Self {
            package,
            scan: ScanOptions::default(),
        }
    }

    /// Element vocabulary used when scanning the guide's cover page.
    pub fn with_scan_options(mut self, scan: ScanOptions) -> Self {
        self.scan = scan;
        self
    }

    /// Try each strategy in order and stop at the first that yields a candidate.
    pub fn resolve<C: ContentSource + ?Sized>(&self, content: &mut C) -> Option<CoverResolution> {
        let manifest = &self.package.manifest;

        for strategy in CoverStrategy::ALL {
            let found = match strategy {
                CoverStrategy::DeclaredProperty => declared_property(manifest),
                CoverStrategy::MetadataPointer => {
                    metadata_pointer(manifest, &self.package.metadata)
                }
                CoverStrategy::GuidePointer => {
                    guide_pointer(manifest, &self.package.guide, content, self.scan)
                }
                CoverStrategy::NamingConvention => naming_convention(manifest),
            };

            let Some(resolution) = found else {
                tracing::debug!(strategy = %strategy, "No cover candidate");
                continue;
            };

            // The naming convention reports its own ambiguity.
            if strategy != CoverStrategy::NamingConvention && resolution.candidates.len() > 1 {
                warn_candidates(&resolution);
            }
            tracing::info!(
                strategy = %strategy,
                id = %resolution.item.id,
                href = %resolution.item.href,
                "Resolved cover image"
            );
            return Some(resolution);
        }

        tracing::info!("No cover image found");
        None
    }
}

/// Strategy 1: items flagged with the `cover-image` property, in manifest order.
pub fn declared_property(manifest: &Manifest) -> Option<CoverResolution> {
    CoverResolution::from_candidates(
        CoverStrategy::DeclaredProperty,
        manifest.iter().filter(|item| item.has_property("cover-image")),
    )
}

/// Strategy 2: the first `<meta name="cover">` pointer, resolved by identifier.
///
/// Within a block only the first `name="cover"` element counts; a block whose
/// marker has no `content` defers to the next block.
pub fn metadata_pointer(manifest: &Manifest, metadata: &[MetaBlock]) -> Option<CoverResolution> {
    let cover_id = metadata.iter().find_map(|block| {
        block
            .elements
            .iter()
            .find(|meta| meta.name.as_deref() == Some("cover"))
            .and_then(|meta| meta.content.as_deref())
            .filter(|id| !id.is_empty())
    })?;

    match manifest.by_id(cover_id) {
        Some(item) => CoverResolution::from_candidates(CoverStrategy::MetadataPointer, [item]),
        None => {
            tracing::warn!(id = %cover_id, "Cover id from metadata not found in manifest");
            None
        }
    }
}

/// Strategy 3: the first image of the document the `cover` guide entry points at.
///
/// Only the first guide entry typed `cover` (case-insensitive) is examined.
/// Image sources are resolved only against that document's directory (no
/// raw-path fallback) and must have an `image/*` media type. A guide entry that points straight
/// at an image uses that image.
pub fn guide_pointer<C: ContentSource + ?Sized>(
    manifest: &Manifest,
    guide: &[GuideReference],
    content: &mut C,
    scan: ScanOptions,
) -> Option<CoverResolution> {
    let reference = guide
        .iter()
        .find(|r| r.kind.eq_ignore_ascii_case("cover"))?;

    let href = path::strip_fragment(&reference.href);
    let Some(page) = manifest.by_href(href) else {
        tracing::warn!(href = %reference.href, "Guide cover page not found in manifest");
        return None;
    };

    if media::is_image(&page.media_type) {
        return CoverResolution::from_candidates(CoverStrategy::GuidePointer, [page]);
    }

    let data = match content.read(&page.href) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(href = %page.href, error = %e, "Cannot read guide cover page");
            return None;
        }
    };

    let text = decode_xml(&data);
    let mut images = Vec::new();
    for found in ImageRefs::new(text.as_bytes(), scan) {
        let image_ref = match found {
            Ok(image_ref) => image_ref,
            Err(e) => {
                tracing::warn!(href = %page.href, error = %e, "Malformed guide cover page");
                break;
            }
        };
        let Some(src) = image_ref.src else { continue };
        let target = path::normalize(&path::join(path::dirname(&page.href), &src));
        match manifest.by_href(&target) {
            Some(item) if media::is_image(&item.media_type) => images.push(item),
            Some(item) => {
                tracing::debug!(
                    src = %src,
                    media_type = %item.media_type,
                    "Guide cover reference is not an image"
                );
            }
            None => {
                tracing::debug!(
                    src = %src,
                    page = %page.href,
                    "Guide cover image not found in manifest"
                );
            }
        }
    }

    CoverResolution::from_candidates(CoverStrategy::GuidePointer, images)
}

/// Strategy 4: the first image whose id or href mentions "cover", or the
/// manifest's only image.
///
/// Every qualifying item is kept as a candidate. When the manifest holds more
/// than one image the guess is ambiguous and a warning lists the candidates.
pub fn naming_convention(manifest: &Manifest) -> Option<CoverResolution> {
    let image_count = manifest
        .iter()
        .filter(|item| media::is_image(&item.media_type))
        .count();
    let sole_image = image_count == 1;

    let resolution = CoverResolution::from_candidates(
        CoverStrategy::NamingConvention,
        manifest.iter().filter(|item| {
            media::is_image(&item.media_type)
                && (sole_image
                    || item.id.to_lowercase().contains("cover")
                    || item.href.to_lowercase().contains("cover"))
        }),
    )?;

    if image_count > 1 {
        warn_candidates(&resolution);
    }
    Some(resolution)
}

fn warn_candidates(resolution: &CoverResolution) {
    tracing::warn!(
        "Found {} potential cover images:",
        resolution.candidates.len()
    );
    for candidate in &resolution.candidates {
        tracing::warn!("  - {}: {}", candidate.strategy, candidate.item.href);
    }
    tracing::warn!("Using {} as the cover image.", resolution.item.href);
}
