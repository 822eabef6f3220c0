//! The conversion driver.

use std::path::Path;

use crate::cbz::{CbzConfig, CbzWriter, PageSink};
use crate::cover::{CoverResolution, CoverResolver};
use crate::error::Result;
use crate::extract::DocumentImages;
use crate::media;
use crate::package::{ContentSource, Epub, ManifestItem, Package};
use crate::scan::ScanOptions;
use crate::sequencer::{Page, PageNaming, PageSequencer};
use crate::spine::walk_spine;
use crate::util::decode_xml;

/// Configuration for a conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    pub naming: PageNaming,
    /// Run the cover cascade and put the cover first (default true).
    pub detect_cover: bool,
    /// Also treat SVG `<image>` elements as image references (default false).
    pub svg_image_refs: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            naming: PageNaming::default(),
            detect_cover: true,
            svg_image_refs: false,
        }
    }
}

impl ConvertConfig {
    pub fn with_naming(mut self, naming: PageNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_detect_cover(mut self, detect_cover: bool) -> Self {
        self.detect_cover = detect_cover;
        self
    }

    pub fn with_svg_image_refs(mut self, svg_image_refs: bool) -> Self {
        self.svg_image_refs = svg_image_refs;
        self
    }

    fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            svg_images: self.svg_image_refs,
        }
    }
}

/// What a conversion produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConversionReport {
    pub title: Option<String>,
    /// The resolved cover, even if its type kept it from becoming a page.
    pub cover: Option<CoverResolution>,
    pub pages: Vec<Page>,
}

impl ConversionReport {
    /// True when the first page is the cover.
    pub fn has_cover_page(&self) -> bool {
        self.pages.first().is_some_and(|page| page.cover)
    }
}

/// Turns a package's images into an ordered page sequence.
///
/// The cover (if any) comes first, followed by every supported raster image
/// referenced from the reading order, each at its first occurrence.
///
/// # Example
///
/// ```
/// use epub2cbz::{Converter, ManifestItem, MemoryContent, Package, SpineEntry};
///
/// let mut package = Package::default();
/// package.manifest.push(ManifestItem::new("p1", "p1.xhtml", "application/xhtml+xml"));
/// package.manifest.push(ManifestItem::new("img", "img.jpg", "image/jpeg"));
/// package.spine.push(SpineEntry::Ref("p1".into()));
///
/// let mut content = MemoryContent::new()
///     .with("p1.xhtml", r#"<html><img src="img.jpg"/></html>"#)
///     .with("img.jpg", b"JPEG".to_vec());
/// let mut pages = Vec::new();
///
/// let report = Converter::new().convert(&package, &mut content, &mut pages)?;
/// assert_eq!(pages[0].0, "page_001_cover.jpg");
/// assert!(report.has_cover_page());
/// # Ok::<(), epub2cbz::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConvertConfig,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ConvertConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Emit every page of `package` into `sink`.
    ///
    /// Only sink errors are returned; everything else is logged and skipped.
    pub fn convert<C, S>(
        &self,
        package: &Package,
        content: &mut C,
        sink: &mut S,
    ) -> Result<ConversionReport>
    where
        C: ContentSource + ?Sized,
        S: PageSink + ?Sized,
    {
        let scan = self.config.scan_options();
        let mut sequencer = PageSequencer::new(self.config.naming.clone());

        let cover = if self.config.detect_cover {
            CoverResolver::new(package)
                .with_scan_options(scan)
                .resolve(content)
        } else {
            tracing::debug!("Cover detection disabled");
            None
        };

        if let Some(cover) = &cover {
            if media::is_cbz_raster(&cover.item.media_type) {
                emit(&mut sequencer, &cover.item, true, content, sink)?;
            } else {
                tracing::warn!(
                    href = %cover.item.href,
                    media_type = %cover.item.media_type,
                    "Cover is not a supported raster image, not adding it as a page"
                );
            }
        }

        for document in walk_spine(&package.spine, &package.manifest) {
            if !media::is_markup(&document.media_type) {
                tracing::debug!(
                    href = %document.href,
                    media_type = %document.media_type,
                    "Spine item is not a content document, skipping"
                );
                continue;
            }

            let data = match content.read(&document.href) {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!(
                        href = %document.href,
                        error = %e,
                        "Cannot read content document, skipping"
                    );
                    continue;
                }
            };
            let text = decode_xml(&data);

            let images =
                DocumentImages::new(&package.manifest, &document.href, text.as_bytes(), scan);
            for image in images {
                if sequencer.is_processed(&image.href) {
                    tracing::debug!(href = %image.href, "Image already added");
                    continue;
                }
                emit(&mut sequencer, image, false, content, sink)?;
            }
        }

        let pages = sequencer.into_pages();
        tracing::info!(pages = pages.len(), "Conversion finished");

        Ok(ConversionReport {
            title: package.title.clone(),
            cover,
            pages,
        })
    }
}

/// Read an image's bytes and hand them to the sequencer. Unreadable payloads
/// are skipped.
fn emit<C, S>(
    sequencer: &mut PageSequencer,
    item: &ManifestItem,
    cover: bool,
    content: &mut C,
    sink: &mut S,
) -> Result<()>
where
    C: ContentSource + ?Sized,
    S: PageSink + ?Sized,
{
    let data = match content.read(&item.href) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(href = %item.href, error = %e, "Cannot read image, skipping");
            return Ok(());
        }
    };
    sequencer.emit(item, &data, cover, sink)?;
    Ok(())
}

/// Convert an EPUB file to a CBZ file with default settings.
///
/// # Example
///
/// ```no_run
/// let report = epub2cbz::convert_epub("book.epub", "book.cbz")?;
/// println!("{} pages", report.pages.len());
/// # Ok::<(), epub2cbz::Error>(())
/// ```
pub fn convert_epub(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<ConversionReport> {
    convert_epub_with(input, output, &Converter::new(), CbzConfig::default())
}

/// Convert an EPUB file to a CBZ file with explicit settings.
///
/// The output file is only created once the input opened successfully.
pub fn convert_epub_with(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    converter: &Converter,
    cbz: CbzConfig,
) -> Result<ConversionReport> {
    let mut epub = Epub::open(input)?;
    let file = std::fs::File::create(output)?;
    let mut writer = CbzWriter::with_config(std::io::BufWriter::new(file), cbz);

    let report = converter.convert(&epub.package, &mut epub.content, &mut writer)?;
    writer.finish()?;
    Ok(report)
}
