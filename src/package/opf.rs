//! OPF package document and container.xml parsing.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{GuideReference, Manifest, ManifestItem, MetaBlock, MetaElement, Package, SpineEntry};
use crate::error::{Error, Result};
use crate::path;
use crate::util::{attr_value, decode_xml, local_name, resolve_entity};

const OPF_MEDIA_TYPE: &str = "application/oebps-package+xml";

/// Parse META-INF/container.xml to find the OPF path.
///
/// Prefers the first rootfile declared as an OPF package; otherwise takes the
/// first rootfile of any type.
pub fn parse_container_xml(bytes: &[u8]) -> Result<String> {
    let content = decode_xml(bytes);
    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    let mut fallback: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if local_name(e.name().as_ref()) == b"rootfile" =>
            {
                let mut full_path = None;
                let mut media_type = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"full-path" => full_path = Some(attr_value(&attr.value)),
                        b"media-type" => media_type = Some(attr_value(&attr.value)),
                        _ => {}
                    }
                }
                let Some(full_path) = full_path.filter(|p| !p.is_empty()) else {
                    continue;
                };
                if media_type.as_deref() == Some(OPF_MEDIA_TYPE) {
                    return Ok(full_path);
                }
                fallback.get_or_insert(full_path);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    fallback.ok_or_else(|| Error::MissingElement("rootfile in container.xml".into()))
}

/// Parse an OPF package document.
///
/// Manifest and guide hrefs are normalized relative to the OPF's own
/// directory; spine entries are left as unresolved `idref`s.
pub fn parse_opf(content: &str) -> Result<Package> {
    // Text is not trimmed per event: a title split by entity references
    // would lose the spaces around them.
    let mut reader = Reader::from_str(content);

    let mut opf = OpfBuilder::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"metadata" | b"dc-metadata" | b"x-metadata" => {
                        opf.metadata.push(MetaBlock::default());
                        opf.open_blocks.push(opf.metadata.len() - 1);
                    }
                    b"title" if !opf.open_blocks.is_empty() && opf.title.is_none() => {
                        opf.in_title = true;
                        opf.buf_text.clear();
                    }
                    b"guide" => opf.in_guide = true,
                    _ => opf.element(&e),
                }
            }
            Ok(Event::Empty(e)) => opf.element(&e),
            Ok(Event::Text(e)) => {
                if opf.in_title {
                    opf.buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if opf.in_title {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        opf.buf_text.push_str(&resolved);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"metadata" | b"dc-metadata" | b"x-metadata" => {
                        opf.open_blocks.pop();
                    }
                    b"title" if opf.in_title => {
                        opf.in_title = false;
                        let title = opf.buf_text.trim();
                        if !title.is_empty() {
                            opf.title = Some(title.to_string());
                        }
                    }
                    b"guide" => opf.in_guide = false,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Ok(opf.finish())
}

#[derive(Default)]
struct OpfBuilder {
    title: Option<String>,
    items: Vec<ManifestItem>,
    spine: Vec<SpineEntry>,
    metadata: Vec<MetaBlock>,
    guide: Vec<GuideReference>,

    open_blocks: Vec<usize>,
    in_guide: bool,
    in_title: bool,
    buf_text: String,
}

impl OpfBuilder {
    /// Handle an element that carries everything we need in its attributes.
    fn element(&mut self, e: &BytesStart<'_>) {
        let name = e.name();
        match local_name(name.as_ref()) {
            b"item" => self.item(e),
            b"itemref" => {
                if let Some(idref) = attr(e, b"idref").filter(|s| !s.is_empty()) {
                    self.spine.push(SpineEntry::Ref(idref));
                }
            }
            b"meta" => {
                if let Some(&block) = self.open_blocks.last() {
                    self.metadata[block].elements.push(MetaElement {
                        name: attr(e, b"name"),
                        content: attr(e, b"content"),
                        property: attr(e, b"property"),
                    });
                }
            }
            b"reference" if self.in_guide => {
                if let (Some(kind), Some(href)) = (attr(e, b"type"), attr(e, b"href")) {
                    self.guide.push(GuideReference::new(kind, package_href_with_fragment(&href)));
                }
            }
            _ => {}
        }
    }

    fn item(&mut self, e: &BytesStart<'_>) {
        let mut id = String::new();
        let mut href = String::new();
        let mut media_type = String::new();
        let mut properties = Vec::new();

        for attr in e.attributes().flatten() {
            match local_name(attr.key.as_ref()) {
                b"id" => id = attr_value(&attr.value),
                b"href" => href = attr_value(&attr.value),
                b"media-type" => media_type = attr_value(&attr.value),
                b"properties" => {
                    properties = attr_value(&attr.value)
                        .split_ascii_whitespace()
                        .map(str::to_string)
                        .collect()
                }
                _ => {}
            }
        }

        if id.is_empty() || href.is_empty() {
            tracing::warn!(id = %id, href = %href, "Manifest item without id or href, ignoring");
            return;
        }

        self.items.push(ManifestItem {
            id,
            href: package_href(&href),
            media_type,
            properties,
        });
    }

    fn finish(self) -> Package {
        Package {
            title: self.title,
            manifest: Manifest::from_items(self.items),
            spine: self.spine,
            metadata: self.metadata,
            guide: self.guide,
        }
    }
}

/// First attribute whose local name matches `key`, entity-unescaped.
fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| local_name(a.key.as_ref()) == key)
        .map(|a| attr_value(&a.value))
}

/// Normalize an OPF href to the form used as the manifest href index key.
fn package_href(raw: &str) -> String {
    path::normalize(&path::decode(raw))
}

fn package_href_with_fragment(raw: &str) -> String {
    match raw.split_once('#') {
        Some((file, fragment)) if !file.is_empty() => {
            format!("{}#{}", package_href(file), fragment)
        }
        Some(_) => raw.to_string(),
        None => package_href(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_container_xml() {
        let container = br#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

        assert_eq!(parse_container_xml(container).unwrap(), "OEBPS/content.opf");
    }

    #[test]
    fn test_parse_container_xml_with_bom() {
        let mut container = vec![0xEF, 0xBB, 0xBF];
        container.extend_from_slice(
            br#"<container><rootfiles><rootfile full-path="content.opf"/></rootfiles></container>"#,
        );

        assert_eq!(parse_container_xml(&container).unwrap(), "content.opf");
    }

    #[test]
    fn test_parse_container_xml_prefers_opf_rootfile() {
        let container = br#"<container><rootfiles>
    <rootfile full-path="book.pdf" media-type="application/pdf"/>
    <rootfile full-path="OPS/package.opf" media-type="application/oebps-package+xml"/>
</rootfiles></container>"#;

        assert_eq!(parse_container_xml(container).unwrap(), "OPS/package.opf");
    }

    #[test]
    fn test_parse_container_xml_without_rootfile() {
        let result = parse_container_xml(b"<container><rootfiles/></container>");
        assert!(matches!(result, Err(Error::MissingElement(_))));
    }

    #[test]
    fn test_parse_opf_manifest_order_and_properties() {
        let opf = r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Comic &amp; Stories</dc:title>
  </metadata>
  <manifest>
    <item id="p1" href="text/p1.xhtml" media-type="application/xhtml+xml"/>
    <item id="cover" href="images/cover%20art.jpg" media-type="image/jpeg" properties="cover-image svg"/>
    <item id="nav" href="./nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
  </manifest>
  <spine>
    <itemref idref="p1"/>
    <itemref idref="nav" linear="no"/>
  </spine>
</package>"#;

        let package = parse_opf(opf).unwrap();

        assert_eq!(package.title.as_deref(), Some("Comic & Stories"));
        let hrefs: Vec<_> = package.manifest.iter().map(|i| i.href.as_str()).collect();
        assert_eq!(hrefs, vec!["text/p1.xhtml", "images/cover art.jpg", "nav.xhtml"]);

        let cover = package.manifest.by_id("cover").unwrap();
        assert_eq!(cover.properties, vec!["cover-image", "svg"]);
        assert!(cover.has_property("cover-image"));

        assert_eq!(
            package.spine,
            vec![SpineEntry::Ref("p1".into()), SpineEntry::Ref("nav".into())]
        );
    }

    #[test]
    fn test_parse_opf_metadata_blocks() {
        let opf = r#"<?xml version="1.0"?>
<package version="2.0">
  <metadata>
    <meta name="generator" content="tool"/>
    <meta name="cover" content="img7"/>
  </metadata>
  <manifest/>
  <spine/>
</package>"#;

        let package = parse_opf(opf).unwrap();
        assert_eq!(package.metadata.len(), 1);
        assert_eq!(
            package.metadata[0].elements,
            vec![
                MetaElement::named("generator", "tool"),
                MetaElement::named("cover", "img7"),
            ]
        );
    }

    #[test]
    fn test_parse_opf_legacy_oeb_metadata_sections() {
        let opf = r#"<package>
  <metadata>
    <dc-metadata><dc:Title xmlns:dc="http://purl.org/dc/elements/1.0/">Old</dc:Title></dc-metadata>
    <x-metadata><meta name="cover" content="c1"></meta></x-metadata>
  </metadata>
</package>"#;

        let package = parse_opf(opf).unwrap();
        // <metadata> plus its two sub-sections
        assert_eq!(package.metadata.len(), 3);
        assert!(package.metadata[1].elements.is_empty());
        assert_eq!(package.metadata[2].elements, vec![MetaElement::named("cover", "c1")]);
    }

    #[test]
    fn test_parse_opf_epub3_meta_property() {
        let opf = r#"<package><metadata>
    <meta property="dcterms:modified">2024-01-01T00:00:00Z</meta>
</metadata></package>"#;

        let package = parse_opf(opf).unwrap();
        let meta = &package.metadata[0].elements[0];
        assert_eq!(meta.property.as_deref(), Some("dcterms:modified"));
        assert_eq!(meta.name, None);
    }

    #[test]
    fn test_parse_opf_guide() {
        let opf = r#"<package>
  <manifest/>
  <guide>
    <reference type="Cover" title="Cover" href="text/../titlepage.xhtml#top"/>
    <reference type="toc" href="toc.xhtml"/>
  </guide>
</package>"#;

        let package = parse_opf(opf).unwrap();
        assert_eq!(
            package.guide,
            vec![
                GuideReference::new("Cover", "titlepage.xhtml#top"),
                GuideReference::new("toc", "toc.xhtml"),
            ]
        );
    }

    #[test]
    fn test_parse_opf_skips_items_without_href() {
        let opf = r#"<package><manifest>
    <item id="broken" media-type="image/png"/>
    <item id="ok" href="ok.png" media-type="image/png"/>
</manifest></package>"#;

        let package = parse_opf(opf).unwrap();
        assert_eq!(package.manifest.len(), 1);
        assert!(package.manifest.by_id("ok").is_some());
    }

    #[test]
    fn test_parse_opf_malformed() {
        assert!(parse_opf("<package><manifest></spine>").is_err());
    }
}
