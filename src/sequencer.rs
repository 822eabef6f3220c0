//! Page numbering and emission.

use std::collections::HashSet;

use crate::cbz::PageSink;
use crate::error::Result;
use crate::package::ManifestItem;
use crate::path;

/// Output filename template: `{prefix}{ordinal:0width}{cover_suffix}{ext}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNaming {
    pub prefix: String,
    /// Minimum digits of the ordinal; larger ordinals just get wider.
    pub width: usize,
    /// Appended to the cover page's ordinal.
    pub cover_suffix: String,
}

impl Default for PageNaming {
    fn default() -> Self {
        Self {
            prefix: "page_".to_string(),
            width: 3,
            cover_suffix: "_cover".to_string(),
        }
    }
}

impl PageNaming {
    /// Filename for the page at `ordinal` whose source lives at `href`.
    ///
    /// ```
    /// use epub2cbz::PageNaming;
    ///
    /// let naming = PageNaming::default();
    /// assert_eq!(naming.filename(1, true, "images/cover.jpeg"), "page_001_cover.jpeg");
    /// assert_eq!(naming.filename(12, false, "p12.png"), "page_012.png");
    /// ```
    pub fn filename(&self, ordinal: u32, cover: bool, href: &str) -> String {
        let marker = if cover { self.cover_suffix.as_str() } else { "" };
        format!(
            "{}{:0width$}{}{}",
            self.prefix,
            ordinal,
            marker,
            path::extension(href),
            width = self.width
        )
    }
}

/// One emitted page.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Page {
    pub ordinal: u32,
    pub id: String,
    pub href: String,
    pub media_type: String,
    pub filename: String,
    pub cover: bool,
}

/// Assigns ordinals and writes pages, each source href at most once.
#[derive(Debug, Default)]
pub struct PageSequencer {
    naming: PageNaming,
    processed: HashSet<String>,
    pages: Vec<Page>,
}

impl PageSequencer {
    pub fn new(naming: PageNaming) -> Self {
        Self {
            naming,
            ..Default::default()
        }
    }

    /// Whether `href` has already been emitted.
    pub fn is_processed(&self, href: &str) -> bool {
        self.processed.contains(href)
    }

    /// Write `item` as the next page.
    ///
    /// Returns `Ok(None)` without touching the sink if the href was already
    /// emitted. The cover flag only takes effect on the first page. The href
    /// is marked processed once the sink accepted the data; a sink error is
    /// returned as is and leaves the sequence unchanged.
    pub fn emit<S: PageSink + ?Sized>(
        &mut self,
        item: &ManifestItem,
        data: &[u8],
        cover: bool,
        sink: &mut S,
    ) -> Result<Option<&Page>> {
        if self.is_processed(&item.href) {
            return Ok(None);
        }

        let ordinal = self.pages.len() as u32 + 1;
        let cover = cover && ordinal == 1;
        let filename = self.naming.filename(ordinal, cover, &item.href);

        sink.write_page(&filename, data)?;
        tracing::info!(page = %filename, src = %item.href, "Added page");

        self.processed.insert(item.href.clone());
        self.pages.push(Page {
            ordinal,
            id: item.id.clone(),
            href: item.href.clone(),
            media_type: item.media_type.clone(),
            filename,
            cover,
        });
        Ok(self.pages.last())
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}
