//! In-memory EPUB fixtures.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Builds a minimal EPUB with its package document under `OEBPS/`.
#[derive(Default)]
pub struct EpubBuilder {
    items: Vec<String>,
    spine: Vec<String>,
    metadata: Vec<String>,
    guide: Vec<String>,
    files: Vec<(String, Vec<u8>)>,
}

impl EpubBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a manifest item.
    pub fn item(mut self, id: &str, href: &str, media_type: &str) -> Self {
        self.items.push(format!(
            r#"<item id="{id}" href="{href}" media-type="{media_type}"/>"#
        ));
        self
    }

    /// Declare an item flagged with the `cover-image` property.
    pub fn cover_item(mut self, id: &str, href: &str, media_type: &str) -> Self {
        self.items.push(format!(
            r#"<item id="{id}" href="{href}" media-type="{media_type}" properties="cover-image"/>"#
        ));
        self
    }

    /// Declare an XHTML document, add it to the spine and store its body.
    pub fn page(self, id: &str, href: &str, body: &str) -> Self {
        let document = format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>{id}</title></head><body>{body}</body></html>"#
        );
        self.item(id, href, "application/xhtml+xml")
            .spine(id)
            .file(href, document.into_bytes())
    }

    /// Declare an image and store its payload.
    pub fn image(self, id: &str, href: &str, media_type: &str, data: &[u8]) -> Self {
        self.item(id, href, media_type).file(href, data.to_vec())
    }

    pub fn spine(mut self, idref: &str) -> Self {
        self.spine.push(idref.to_string());
        self
    }

    pub fn meta_cover(mut self, id: &str) -> Self {
        self.metadata
            .push(format!(r#"<meta name="cover" content="{id}"/>"#));
        self
    }

    pub fn guide(mut self, kind: &str, href: &str) -> Self {
        self.guide
            .push(format!(r#"<reference type="{kind}" title="{kind}" href="{href}"/>"#));
        self
    }

    /// Store a payload at `href` (relative to the package document).
    pub fn file(mut self, href: &str, data: impl Into<Vec<u8>>) -> Self {
        self.files.push((href.to_string(), data.into()));
        self
    }

    pub fn opf(&self) -> String {
        let itemrefs: String = self
            .spine
            .iter()
            .map(|id| format!(r#"<itemref idref="{id}"/>"#))
            .collect();
        let guide = if self.guide.is_empty() {
            String::new()
        } else {
            format!("<guide>{}</guide>", self.guide.concat())
        };
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
<metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
<dc:identifier id="uid">urn:uuid:test</dc:identifier>
<dc:title>Test Comic</dc:title>
{}
</metadata>
<manifest>
{}
</manifest>
<spine>{}</spine>
{}
</package>"#,
            self.metadata.concat(),
            self.items.join("\n"),
            itemrefs,
            guide
        )
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        zip.start_file("mimetype", stored).unwrap();
        zip.write_all(b"application/epub+zip").unwrap();

        zip.start_file("META-INF/container.xml", stored).unwrap();
        zip.write_all(
            br#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
<rootfiles><rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/></rootfiles>
</container>"#,
        )
        .unwrap();

        zip.start_file("OEBPS/content.opf", stored).unwrap();
        zip.write_all(self.opf().as_bytes()).unwrap();

        for (href, data) in &self.files {
            zip.start_file(format!("OEBPS/{href}"), stored).unwrap();
            zip.write_all(data).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }
}

/// Entry names and payloads of a CBZ, in archive order.
pub fn read_cbz(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            (entry.name().to_string(), data)
        })
        .collect()
}

pub fn names(entries: &[(String, Vec<u8>)]) -> Vec<&str> {
    entries.iter().map(|(name, _)| name.as_str()).collect()
}
