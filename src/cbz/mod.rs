//! Page output: the [`PageSink`] trait and the CBZ archive writer.

mod writer;

pub use writer::{CbzConfig, CbzWriter, Compression};

use crate::error::Result;

/// Destination for emitted pages, written in page order.
pub trait PageSink {
    /// Persist one page. Any error aborts the conversion.
    fn write_page(&mut self, name: &str, data: &[u8]) -> Result<()>;
}

impl<S: PageSink + ?Sized> PageSink for &mut S {
    fn write_page(&mut self, name: &str, data: &[u8]) -> Result<()> {
        (**self).write_page(name, data)
    }
}

/// Collects pages in memory.
impl PageSink for Vec<(String, Vec<u8>)> {
    fn write_page(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.push((name.to_string(), data.to_vec()));
        Ok(())
    }
}

/// Discards pages; used for dry runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PageSink for NullSink {
    fn write_page(&mut self, _name: &str, _data: &[u8]) -> Result<()> {
        Ok(())
    }
}
