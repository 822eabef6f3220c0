//! Per-document raster image extraction.

use crate::media;
use crate::package::{Manifest, ManifestItem};
use crate::scan::{ImageRefs, ScanOptions};

/// Lazy iterator over the raster images a content document references.
///
/// Yields manifest items in document order. References without a source,
/// references that resolve to nothing and non-raster targets are logged and
/// skipped. A malformed document ends the iteration early. Deduplication
/// against already emitted pages is left to the caller, which owns that set.
pub struct DocumentImages<'m, 'd> {
    refs: ImageRefs<'d>,
    manifest: &'m Manifest,
    document: &'d str,
}

impl<'m, 'd> DocumentImages<'m, 'd> {
    /// Scan `data`, the payload of the document at `document` (its manifest href).
    pub fn new(
        manifest: &'m Manifest,
        document: &'d str,
        data: &'d [u8],
        options: ScanOptions,
    ) -> Self {
        Self {
            refs: ImageRefs::new(data, options),
            manifest,
            document,
        }
    }
}

impl<'m> Iterator for DocumentImages<'m, '_> {
    type Item = &'m ManifestItem;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let image_ref = match self.refs.next()? {
                Ok(image_ref) => image_ref,
                Err(e) => {
                    tracing::error!(
                        document = %self.document,
                        error = %e,
                        "Malformed content document, skipping the rest of it"
                    );
                    return None;
                }
            };

            let Some(src) = image_ref.src else {
                tracing::debug!(
                    document = %self.document,
                    position = image_ref.position,
                    "Image element without a source"
                );
                continue;
            };

            let Some(item) = self.manifest.resolve_reference(self.document, &src) else {
                tracing::warn!(
                    document = %self.document,
                    src = %src,
                    "Image not found in manifest"
                );
                continue;
            };

            if !media::is_cbz_raster(&item.media_type) {
                tracing::warn!(
                    href = %item.href,
                    media_type = %item.media_type,
                    "Unsupported image type, skipping"
                );
                continue;
            }

            return Some(item);
        }
    }
}
