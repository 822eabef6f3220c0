//! EPUB container reading.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek};
use std::path::Path;

use zip::ZipArchive;

use super::{ContentSource, Package, parse_container_xml, parse_opf};
use crate::error::{Error, Result};
use crate::path;
use crate::util::decode_xml;

const CONTAINER_PATH: &str = "META-INF/container.xml";

/// An opened EPUB: the parsed package plus lazy access to item payloads.
///
/// The two halves are public so they can be borrowed independently: the
/// converter reads the package while pulling bytes from the content.
///
/// # Example
///
/// ```no_run
/// use epub2cbz::Epub;
///
/// let epub = Epub::open("book.epub")?;
/// println!("{} manifest items", epub.package.manifest.len());
/// # Ok::<(), epub2cbz::Error>(())
/// ```
pub struct Epub<R> {
    pub package: Package,
    pub content: ZipContent<R>,
}

impl Epub<BufReader<File>> {
    /// Open an EPUB file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> Epub<R> {
    /// Open an EPUB from any [`Read`] + [`Seek`] source.
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;

        // 1. Find the OPF path from container.xml
        let container = read_entry(&mut archive, CONTAINER_PATH)
            .map_err(|e| Error::InvalidEpub(format!("cannot read {}: {}", CONTAINER_PATH, e)))?;
        let opf_path = parse_container_xml(&container)?;
        let opf_dir = path::dirname(&opf_path).to_string();

        // 2. Parse the OPF; manifest hrefs are relative to its directory
        let opf_bytes = read_entry(&mut archive, &opf_path)
            .map_err(|e| Error::InvalidEpub(format!("cannot read {}: {}", opf_path, e)))?;
        let package = parse_opf(&decode_xml(&opf_bytes))?;

        tracing::debug!(
            opf = %opf_path,
            manifest = package.manifest.len(),
            spine = package.spine.len(),
            guide = package.guide.len(),
            "Parsed package document"
        );

        Ok(Self {
            package,
            content: ZipContent { archive, opf_dir },
        })
    }
}

/// Item payloads served straight from the EPUB's ZIP archive.
pub struct ZipContent<R> {
    archive: ZipArchive<R>,
    /// Directory of the OPF inside the archive ("" at the root).
    opf_dir: String,
}

impl<R: Read + Seek> ZipContent<R> {
    /// Archive entry name for a manifest href.
    ///
    /// Hrefs may climb above the OPF's directory, so the joined path is
    /// normalized before the exact-name lookup.
    pub fn entry_name(&self, href: &str) -> String {
        path::normalize(&path::join(&self.opf_dir, href))
    }
}

impl<R: Read + Seek> ContentSource for ZipContent<R> {
    fn read(&mut self, href: &str) -> io::Result<Vec<u8>> {
        let name = self.entry_name(href);
        read_entry(&mut self.archive, &name)
    }
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> io::Result<Vec<u8>> {
    let mut file = archive.by_name(name).map_err(|e| match e {
        zip::result::ZipError::FileNotFound => io::Error::new(
            io::ErrorKind::NotFound,
            format!("File not found in ZIP: {}", name),
        ),
        other => io::Error::other(other),
    })?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    Ok(data)
}
