//! Href arithmetic for package-relative paths.
//!
//! Manifest hrefs are always `/`-separated archive paths, never filesystem
//! paths, so these helpers work on strings instead of `std::path`. They follow
//! POSIX `dirname`/`join`/`normpath`/`splitext` semantics.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;

/// Remove a `#fragment` suffix.
pub fn strip_fragment(href: &str) -> &str {
    href.split_once('#').map_or(href, |(path, _)| path)
}

/// Directory part of an href ("text/ch1.xhtml" -> "text", "ch1.xhtml" -> "").
pub fn dirname(href: &str) -> &str {
    match href.rfind('/') {
        Some(i) => {
            let head = &href[..=i];
            if head.bytes().all(|b| b == b'/') {
                head
            } else {
                head.trim_end_matches('/')
            }
        }
        None => "",
    }
}

/// Join a relative path onto a directory. Absolute paths replace the base.
pub fn join(dir: &str, path: &str) -> String {
    if path.starts_with('/') || dir.is_empty() {
        path.to_string()
    } else if dir.ends_with('/') {
        format!("{dir}{path}")
    } else {
        format!("{dir}/{path}")
    }
}

/// Collapse `.`, `..` and repeated separators.
///
/// Leading `..` segments of a relative path are kept; `..` at the root of an
/// absolute path is dropped. An empty result is `"."`.
pub fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// File extension of the last path segment, including the dot.
///
/// Leading dots do not start an extension (".hidden" has none).
pub fn extension(href: &str) -> &str {
    let name = href.rsplit('/').next().unwrap_or(href);
    let stem_start = name.len() - name.trim_start_matches('.').len();
    match name[stem_start..].rfind('.') {
        Some(i) => &name[stem_start + i..],
        None => "",
    }
}

/// Percent-decode an href, leaving it untouched if the result is not UTF-8.
pub fn decode(href: &str) -> Cow<'_, str> {
    if !href.contains('%') {
        return Cow::Borrowed(href);
    }
    percent_decode_str(href)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(href))
}

/// Lookup keys for an image source path, in the order they should be tried.
///
/// Absolute paths are looked up as-is. Relative paths are tried joined onto
/// the referencing document's directory, then the normalized join, then raw.
pub fn reference_candidates(base_dir: &str, src: &str) -> Vec<String> {
    if src.starts_with('/') {
        return vec![src.to_string()];
    }
    let joined = join(base_dir, src);
    let normalized = normalize(&joined);
    vec![joined, normalized, src.to_string()]
}
