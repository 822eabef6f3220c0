//! # epub2cbz
//!
//! Turn image-based EPUB books (comics, manga, scanned picture books) into
//! CBZ page archives.
//!
//! ## Features
//!
//! - Cover detection through a cascade of four strategies (EPUB 3 property,
//!   EPUB 2 metadata, guide reference, naming convention)
//! - Pages in reading order, each image once, at its first occurrence
//! - Only JPEG, PNG and GIF become pages
//! - Deterministic, byte-identical output
//!
//! ## Quick Start
//!
//! ```no_run
//! use epub2cbz::convert_epub;
//!
//! let report = convert_epub("book.epub", "book.cbz")?;
//! for page in &report.pages {
//!     println!("{} <- {}", page.filename, page.href);
//! }
//! # Ok::<(), epub2cbz::Error>(())
//! ```
//!
//! ## Step by Step
//!
//! The pipeline pieces can be driven separately, e.g. to inspect the cover
//! or to write pages somewhere other than a ZIP file:
//!
//! ```no_run
//! use epub2cbz::{CbzConfig, CbzWriter, ConvertConfig, Converter, CoverResolver, Epub};
//!
//! let mut epub = Epub::open("book.epub")?;
//!
//! if let Some(cover) = CoverResolver::new(&epub.package).resolve(&mut epub.content) {
//!     println!("cover: {} (via {})", cover.item.href, cover.strategy);
//! }
//!
//! let config = ConvertConfig::default().with_svg_image_refs(true);
//! let converter = Converter::new().with_config(config);
//! let file = std::fs::File::create("book.cbz")?;
//! let writer = std::io::BufWriter::new(file);
//! let mut cbz = CbzWriter::with_config(writer, CbzConfig::deflated(Some(6)));
//! converter.convert(&epub.package, &mut epub.content, &mut cbz)?;
//! cbz.finish()?;
//! # Ok::<(), epub2cbz::Error>(())
//! ```

pub mod cbz;
pub mod convert;
pub mod cover;
pub mod error;
pub mod extract;
pub mod media;
pub mod package;
pub mod path;
pub mod scan;
pub mod sequencer;
pub mod spine;
pub(crate) mod util;

pub use cbz::{CbzConfig, CbzWriter, Compression, NullSink, PageSink};
pub use convert::{ConversionReport, ConvertConfig, Converter, convert_epub, convert_epub_with};
pub use cover::{CoverCandidate, CoverResolution, CoverResolver, CoverStrategy};
pub use error::{Error, Result};
pub use package::{
    ContentSource, Epub, GuideReference, Manifest, ManifestItem, MemoryContent, MetaBlock,
    MetaElement, Package, SpineEntry,
};
pub use sequencer::{Page, PageNaming, PageSequencer};
