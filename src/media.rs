//! Media type classification.

/// Raster formats that CBZ readers display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Jpeg,
    Png,
    Gif,
}

impl RasterFormat {
    /// Match a manifest media type exactly against the supported raster types.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            "image/jpeg" => Some(RasterFormat::Jpeg),
            "image/png" => Some(RasterFormat::Png),
            "image/gif" => Some(RasterFormat::Gif),
            _ => None,
        }
    }
}

/// True for the three media types that may become pages.
pub fn is_cbz_raster(media_type: &str) -> bool {
    RasterFormat::from_media_type(media_type).is_some()
}

/// Loose image check used by cover heuristics (`image/*`, including SVG).
pub fn is_image(media_type: &str) -> bool {
    media_type.starts_with("image")
}

/// True for media types the image scanner can read as markup.
pub fn is_markup(media_type: &str) -> bool {
    let media_type = media_type
        .split(';')
        .next()
        .unwrap_or(media_type)
        .trim()
        .to_ascii_lowercase();
    matches!(
        media_type.as_str(),
        "application/xhtml+xml"
            | "text/html"
            | "application/xml"
            | "text/xml"
            | "application/x-dtbook+xml"
            | "text/x-oeb1-document"
    )
}
