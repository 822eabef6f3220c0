//! Cover detection against complete EPUB packages.

mod common;

use std::io::Cursor;

use common::EpubBuilder;
use epub2cbz::scan::ScanOptions;
use epub2cbz::{CoverResolver, CoverStrategy, Epub};

fn resolve(epub: Vec<u8>) -> Option<(CoverStrategy, String)> {
    let mut epub = Epub::from_reader(Cursor::new(epub)).unwrap();
    CoverResolver::new(&epub.package)
        .resolve(&mut epub.content)
        .map(|cover| (cover.strategy, cover.item.href))
}

fn signals() -> EpubBuilder {
    EpubBuilder::new()
        .page("tp", "text/titlepage.xhtml", r#"<img src="../images/guide.jpg"/>"#)
        .image("guide", "images/guide.jpg", "image/jpeg", b"g")
        .image("meta", "images/meta.jpg", "image/jpeg", b"m")
        .image("named-cover", "images/named.jpg", "image/jpeg", b"n")
        .meta_cover("meta")
        .guide("cover", "text/titlepage.xhtml")
}

#[test]
fn test_property_beats_all_other_signals() {
    let epub = signals()
        .cover_item("flag", "images/flag.jpg", "image/jpeg")
        .build();
    assert_eq!(
        resolve(epub),
        Some((CoverStrategy::DeclaredProperty, "images/flag.jpg".into()))
    );
}

#[test]
fn test_metadata_beats_guide_and_naming() {
    assert_eq!(
        resolve(signals().build()),
        Some((CoverStrategy::MetadataPointer, "images/meta.jpg".into()))
    );
}

#[test]
fn test_guide_beats_naming() {
    let epub = EpubBuilder::new()
        .page("tp", "text/titlepage.xhtml", r#"<img src="../images/guide.jpg"/>"#)
        .image("guide", "images/guide.jpg", "image/jpeg", b"g")
        .image("named-cover", "images/named.jpg", "image/jpeg", b"n")
        .guide("COVER", "text/titlepage.xhtml#start")
        .build();
    assert_eq!(
        resolve(epub),
        Some((CoverStrategy::GuidePointer, "images/guide.jpg".into()))
    );
}

#[test]
fn test_guide_svg_image_needs_svg_scanning() {
    let epub = EpubBuilder::new()
        .page(
            "tp",
            "text/titlepage.xhtml",
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><image xlink:href="../images/g.jpg"/></svg>"#,
        )
        .image("a", "images/g.jpg", "image/jpeg", b"g")
        .image("b", "images/other.jpg", "image/jpeg", b"o")
        .guide("cover", "text/titlepage.xhtml")
        .build();

    let mut epub = Epub::from_reader(Cursor::new(epub)).unwrap();
    assert!(CoverResolver::new(&epub.package).resolve(&mut epub.content).is_none());

    let cover = CoverResolver::new(&epub.package)
        .with_scan_options(ScanOptions { svg_images: true })
        .resolve(&mut epub.content)
        .unwrap();
    assert_eq!(cover.item.href, "images/g.jpg");
}

#[test]
fn test_naming_convention_and_candidates() {
    let epub = EpubBuilder::new()
        .image("p1", "images/p1.jpg", "image/jpeg", b"1")
        .image("img-cover", "images/front.jpg", "image/jpeg", b"f")
        .image("p2", "images/back_cover.jpg", "image/jpeg", b"b")
        .build();

    let mut epub = Epub::from_reader(Cursor::new(epub)).unwrap();
    let cover = CoverResolver::new(&epub.package)
        .resolve(&mut epub.content)
        .unwrap();

    assert_eq!(cover.strategy, CoverStrategy::NamingConvention);
    assert_eq!(cover.item.id, "img-cover");
    let hrefs: Vec<_> = cover.candidates.iter().map(|c| c.item.href.as_str()).collect();
    assert_eq!(hrefs, vec!["images/front.jpg", "images/back_cover.jpg"]);
}

#[test]
fn test_sole_image_is_cover() {
    let epub = EpubBuilder::new()
        .page("p1", "p1.xhtml", "<p>text only</p>")
        .image("art", "art.png", "image/png", b"a")
        .build();
    assert_eq!(
        resolve(epub),
        Some((CoverStrategy::NamingConvention, "art.png".into()))
    );
}

#[test]
fn test_no_cover() {
    let epub = EpubBuilder::new()
        .image("a", "a.png", "image/png", b"a")
        .image("b", "b.png", "image/png", b"b")
        .build();
    assert_eq!(resolve(epub), None);
}
