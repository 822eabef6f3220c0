use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::PageSink;
use crate::error::Result;

/// How page entries are stored in the archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    /// No compression; JPEG/PNG/GIF data is already compressed.
    #[default]
    Stored,
    Deflated,
}

/// Configuration for CBZ output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CbzConfig {
    pub compression: Compression,
    /// Deflate level (0-9); `None` uses the library default.
    pub compression_level: Option<i64>,
}

impl CbzConfig {
    pub fn deflated(level: Option<i64>) -> Self {
        Self {
            compression: Compression::Deflated,
            compression_level: level,
        }
    }

    fn file_options(&self) -> SimpleFileOptions {
        // A fixed timestamp keeps output byte-identical across runs.
        let options = SimpleFileOptions::default().last_modified_time(DateTime::default());
        match self.compression {
            Compression::Stored => options.compression_method(CompressionMethod::Stored),
            Compression::Deflated => options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(self.compression_level),
        }
    }
}

/// Writes pages as entries of a CBZ (ZIP) archive, in call order.
///
/// # Example
///
/// ```no_run
/// use epub2cbz::{CbzWriter, PageSink};
///
/// let mut cbz = CbzWriter::create("out.cbz")?;
/// cbz.write_page("page_001.jpg", &std::fs::read("scan.jpg")?)?;
/// cbz.finish()?;
/// # Ok::<(), epub2cbz::Error>(())
/// ```
pub struct CbzWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: SimpleFileOptions,
}

impl CbzWriter<BufWriter<File>> {
    /// Create (or truncate) a CBZ file on disk.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Seek> CbzWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, CbzConfig::default())
    }

    pub fn with_config(writer: W, config: CbzConfig) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            options: config.file_options(),
        }
    }

    /// Write the central directory and return the underlying writer.
    pub fn finish(self) -> Result<W> {
        let mut writer = self.zip.finish()?;
        writer.flush()?;
        Ok(writer)
    }
}

impl<W: Write + Seek> PageSink for CbzWriter<W> {
    fn write_page(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.zip.start_file(name, self.options)?;
        self.zip.write_all(data)?;
        Ok(())
    }
}
