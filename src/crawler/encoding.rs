//! Character encoding selection for fetched bodies
//!
//! The same decision feeds the `encoding_guess` recorded on a page and the
//! decoder used by the extractor. Precedence:
//! 1. Byte order mark
//! 2. Charset declared by the server (`Content-Type`)
//! 3. `<meta charset>` or `<meta http-equiv="content-type">` in the first 1024 bytes
//! 4. chardetng guess

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

/// Bytes scanned for a `<meta>` charset declaration
const META_PRESCAN_BYTES: usize = 1024;

/// Picks the encoding used to decode a body
///
/// Unknown declared labels are ignored. Returns `None` for an empty body.
pub fn sniff_encoding(body: &[u8], declared: Option<&str>) -> Option<&'static Encoding> {
    if body.is_empty() {
        return None;
    }
    if let Some((encoding, _)) = Encoding::for_bom(body) {
        return Some(encoding);
    }
    if let Some(encoding) = declared.and_then(|label| resolve_label(label.as_bytes())) {
        return Some(encoding);
    }
    if let Some(encoding) = meta_charset(body) {
        return Some(encoding);
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    Some(detector.guess(None, true))
}

/// Lowercase name of the encoding [`sniff_encoding`] picks
///
/// # Example
///
/// ```
/// use onpage_crawl::crawler::detect_encoding;
///
/// let body = b"<html><head><meta charset=\"KOI8-R\"></head></html>";
/// assert_eq!(detect_encoding(body, None), Some("koi8-r".to_string()));
/// assert_eq!(detect_encoding(body, Some("iso-8859-2")), Some("iso-8859-2".to_string()));
/// ```
pub fn detect_encoding(body: &[u8], declared: Option<&str>) -> Option<String> {
    sniff_encoding(body, declared).map(|encoding| encoding.name().to_lowercase())
}

/// Extracts the lowercase charset parameter of a Content-Type value
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        (!value.is_empty()).then(|| value.to_lowercase())
    })
}

/// Charset declared by a `<meta>` tag near the start of the document
///
/// Covers both `<meta charset="...">` and the `content` attribute of
/// `<meta http-equiv="content-type">`.
fn meta_charset(body: &[u8]) -> Option<&'static Encoding> {
    let head = &body[..body.len().min(META_PRESCAN_BYTES)];
    let lower = head.to_ascii_lowercase();

    let mut rest = lower.as_slice();
    while let Some(start) = find(rest, b"<meta") {
        let tag = &rest[start..];
        let end = tag.iter().position(|&b| b == b'>').unwrap_or(tag.len());
        if let Some(encoding) = charset_in_tag(&tag[..end]) {
            // A meta declaration cannot describe a UTF-16 document; it was read as ASCII
            return Some(if encoding.output_encoding() == UTF_8 {
                UTF_8
            } else {
                encoding
            });
        }
        rest = &tag[end..];
    }
    None
}

fn charset_in_tag(tag: &[u8]) -> Option<&'static Encoding> {
    let mut rest = tag;
    while let Some(pos) = find(rest, b"charset") {
        rest = &rest[pos + b"charset".len()..];
        let after = trim_start(rest);
        let Some(value) = after.strip_prefix(b"=") else {
            continue;
        };
        let value = trim_start(value);
        let value = value
            .strip_prefix(b"\"")
            .or_else(|| value.strip_prefix(b"'"))
            .unwrap_or(value);
        let len = value
            .iter()
            .position(|&b| matches!(b, b'"' | b'\'' | b';' | b'/' | b'>') || b.is_ascii_whitespace())
            .unwrap_or(value.len());
        if let Some(encoding) = resolve_label(&value[..len]) {
            return Some(encoding);
        }
    }
    None
}

fn resolve_label(label: &[u8]) -> Option<&'static Encoding> {
    let encoding = Encoding::for_label(label)?;
    // Documents decode x-user-defined as windows-1252
    Some(if encoding == encoding_rs::X_USER_DEFINED {
        WINDOWS_1252
    } else {
        encoding
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn trim_start(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}
