//! Streaming scan of content documents for image references.
//!
//! [`ImageRefs`] walks a document with a namespace-aware pull parser and
//! yields the source path of every image element in document order. It is
//! lazy and single-pass: the document is only parsed as far as the consumer
//! pulls.

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, QName, ResolveResult};

use crate::util::attr_value;

pub const XHTML_NS: &[u8] = b"http://www.w3.org/1999/xhtml";
pub const SVG_NS: &[u8] = b"http://www.w3.org/2000/svg";
const XLINK_NS: &[u8] = b"http://www.w3.org/1999/xlink";

/// Which elements count as image references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Also report SVG `<image>` elements (`xlink:href` / `href`).
    pub svg_images: bool,
}

/// One image element found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Source path as written in the document; `None` if the attribute is absent.
    pub src: Option<String>,
    /// Byte offset of the element in the document, for diagnostics.
    pub position: u64,
}

/// Lazy iterator over the image references of one document.
///
/// Yields `Err` once if the document turns out to be malformed, then stops.
pub struct ImageRefs<'a> {
    reader: NsReader<&'a [u8]>,
    options: ScanOptions,
    done: bool,
}

impl<'a> ImageRefs<'a> {
    pub fn new(document: &'a [u8], options: ScanOptions) -> Self {
        let mut reader = NsReader::from_reader(document);
        // Content documents are often sloppy HTML; only real syntax errors
        // should end the scan.
        reader.config_mut().check_end_names = false;
        Self {
            reader,
            options,
            done: false,
        }
    }

    fn image_ref(&self, kind: ElementKind, e: &BytesStart<'_>) -> ImageRef {
        let src_key: &[u8] = match kind {
            ElementKind::Img => b"src",
            ElementKind::SvgImage => b"href",
        };

        let src = e
            .attributes()
            .flatten()
            .find(|attr| {
                attr.key.local_name().as_ref() == src_key
                    && (attr.key.prefix().is_none() || self.is_xlink(attr.key))
            })
            .map(|attr| attr_value(&attr.value));

        ImageRef {
            src,
            position: self.reader.buffer_position() as u64,
        }
    }

    fn is_xlink(&self, key: QName<'_>) -> bool {
        matches!(
            self.reader.resolve_attribute(key).0,
            ResolveResult::Bound(Namespace(XLINK_NS))
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum ElementKind {
    Img,
    SvgImage,
}

impl ElementKind {
    /// `img` with no namespace or in the XHTML namespace, optionally SVG `image`.
    fn of(ns: &ResolveResult<'_>, e: &BytesStart<'_>, options: ScanOptions) -> Option<Self> {
        match (ns, e.local_name().as_ref()) {
            (ResolveResult::Unbound, b"img") => Some(ElementKind::Img),
            (ResolveResult::Bound(Namespace(XHTML_NS)), b"img") => Some(ElementKind::Img),
            (ResolveResult::Bound(Namespace(SVG_NS)), b"image") if options.svg_images => {
                Some(ElementKind::SvgImage)
            }
            _ => None,
        }
    }
}

impl Iterator for ImageRefs<'_> {
    type Item = Result<ImageRef, quick_xml::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let (ns, event) = match self.reader.read_resolved_event() {
                Ok(resolved) => resolved,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            match event {
                Event::Start(e) | Event::Empty(e) => {
                    if let Some(kind) = ElementKind::of(&ns, &e, self.options) {
                        return Some(Ok(self.image_ref(kind, &e)));
                    }
                }
                Event::Eof => {
                    self.done = true;
                    return None;
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn srcs(doc: &str, options: ScanOptions) -> Vec<Option<String>> {
        ImageRefs::new(doc.as_bytes(), options)
            .map(|r| r.unwrap().src)
            .collect()
    }

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_plain_and_namespaced_img_in_document_order() {
        let doc = r#"<?xml version="1.0"?>
<html xmlns:xhtml="http://www.w3.org/1999/xhtml">
  <body>
    <img src="a.jpg"/>
    <xhtml:img src="b.png"/>
    <p><img src="c.gif"></img></p>
  </body>
</html>"#;

        assert_eq!(
            srcs(doc, ScanOptions::default()),
            vec![some("a.jpg"), some("b.png"), some("c.gif")]
        );
    }

    #[test]
    fn test_default_xhtml_namespace() {
        let doc = r#"<html xmlns="http://www.w3.org/1999/xhtml"><body><img src="../images/p1.jpg" alt="x"/></body></html>"#;
        assert_eq!(srcs(doc, ScanOptions::default()), vec![some("../images/p1.jpg")]);
    }

    #[test]
    fn test_img_in_foreign_namespace_is_ignored() {
        let doc = r#"<root xmlns:x="urn:other"><x:img src="nope.jpg"/><img src="yes.jpg"/></root>"#;
        assert_eq!(srcs(doc, ScanOptions::default()), vec![some("yes.jpg")]);
    }

    #[test]
    fn test_missing_src_is_reported_as_none() {
        let doc = r#"<html><img alt="no source"/><img src="ok.png"/></html>"#;
        assert_eq!(srcs(doc, ScanOptions::default()), vec![None, some("ok.png")]);
    }

    #[test]
    fn test_src_entities_are_unescaped() {
        let doc = r#"<html><img src="a&amp;b.jpg"/></html>"#;
        assert_eq!(srcs(doc, ScanOptions::default()), vec![some("a&b.jpg")]);
    }

    #[test]
    fn test_svg_image_only_when_enabled() {
        let doc = r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:xlink="http://www.w3.org/1999/xlink">
<body><svg xmlns="http://www.w3.org/2000/svg"><image xlink:href="cover.jpeg"/></svg>
<img src="p1.jpg"/></body></html>"#;

        assert_eq!(srcs(doc, ScanOptions::default()), vec![some("p1.jpg")]);
        assert_eq!(
            srcs(doc, ScanOptions { svg_images: true }),
            vec![some("cover.jpeg"), some("p1.jpg")]
        );
    }

    #[test]
    fn test_mismatched_end_tags_are_tolerated() {
        let doc = r#"<html><body><p><img src="a.jpg"/></div><img src="b.jpg"/></body></html>"#;
        assert_eq!(
            srcs(doc, ScanOptions::default()),
            vec![some("a.jpg"), some("b.jpg")]
        );
    }

    #[test]
    fn test_malformed_document_yields_error_then_stops() {
        let doc = r#"<html><img src="a.jpg"/><!-- never closed <img src="b.jpg"/>"#;
        let mut refs = ImageRefs::new(doc.as_bytes(), ScanOptions::default());

        assert_eq!(refs.next().unwrap().unwrap().src, some("a.jpg"));
        assert!(refs.next().unwrap().is_err());
        assert!(refs.next().is_none());
    }

    #[test]
    fn test_is_lazy() {
        // The scan stops at the first reference without touching the broken tail.
        let doc = r#"<html><img src="first.jpg"/><<<<"#;
        let first = ImageRefs::new(doc.as_bytes(), ScanOptions::default()).next();
        assert_eq!(first.unwrap().unwrap().src, some("first.jpg"));
    }
}
