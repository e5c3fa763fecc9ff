//! Attachment module.
//!
//! This module contains the representation of a decoded attachment
//! and the filename helpers used to store it on disk.

use log::{debug, warn};
use mailparse::{parse_content_disposition, parse_content_type, ParsedMail};

use super::header::{decode_latin1, first_chunk, first_raw_header};

/// Characters rejected by common filesystems.
const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Represents an attachment payload with its decoded filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// The decoded filename, as shown to the user.
    pub filename: String,
    /// The transfer-decoded payload, untouched.
    pub data: Vec<u8>,
}

impl Attachment {
    /// Returns the filename to use on disk.
    pub fn sanitized_filename(&self) -> String {
        sanitize_filename(&self.filename)
    }
}

/// Makes a name safe to use as a single path segment: line breaks are
/// removed, other control characters and reserved characters become
/// underscores. A name made of dots only (or empty) becomes `_`.
pub fn sanitize_filename(name: &str) -> String {
    let name: String = name
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .map(|c| {
            if c.is_control() || RESERVED_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    if name.chars().all(|c| c == '.') {
        String::from("_")
    } else {
        name
    }
}

/// Decodes an attachment filename. Only its first encoded-word chunk
/// is used. When the declared charset cannot decode it, the bytes are
/// read as Latin-1.
pub fn decode_filename(raw: &str) -> String {
    let chunk = first_chunk(raw);
    let decoded = chunk.decode();

    if decoded.lossless {
        decoded.text
    } else {
        warn!(
            "cannot decode filename {:?} using charset {:?}, falling back to latin-1",
            raw, chunk.charset
        );
        decode_latin1(&chunk.bytes)
    }
}

/// Finds the raw filename of a part: the `filename` parameter of the
/// Content-Disposition header, then the `name` parameter of the
/// Content-Type header.
pub(crate) fn raw_filename(part: &ParsedMail) -> Option<String> {
    let headers = part.get_headers();

    let disposition = first_raw_header(&headers, "Content-Disposition");
    let filename = parse_content_disposition(&disposition)
        .params
        .remove("filename")
        .filter(|name| !name.is_empty());

    filename.or_else(|| {
        let ctype = first_raw_header(&headers, "Content-Type");
        parse_content_type(&ctype)
            .params
            .remove("name")
            .filter(|name| !name.is_empty())
    })
}

/// Extracts the decoded filename of an attachment part, if any.
pub(crate) fn attachment_filename(part: &ParsedMail) -> Option<String> {
    let raw = raw_filename(part)?;
    let filename = decode_filename(&raw);
    debug!("attachment filename: {:?}", filename);
    Some(filename)
}

#[cfg(test)]
mod test_sanitize_filename {
    use super::sanitize_filename;

    #[test]
    fn test_reserved_chars() {
        assert_eq!("a_b_c_d_e_f_g_h_i_.pdf", sanitize_filename(r#"a<b>c:d"e/f\g|h?i*.pdf"#));
        assert_eq!("report.pdf", sanitize_filename("re\r\nport.pdf"));
        assert_eq!("tab_name.txt", sanitize_filename("tab\tname.txt"));
        assert_eq!("..__etc_passwd", sanitize_filename("../\0etc/passwd"));
    }

    #[test]
    fn test_dots_only() {
        assert_eq!("_", sanitize_filename(".."));
        assert_eq!("_", sanitize_filename(""));
        assert_eq!("_", sanitize_filename("\r\n"));
    }

    #[test]
    fn test_idempotent() {
        for name in [
            "résumé.pdf",
            "a<b>:c.txt",
            "..",
            "line\nbreak",
            "\u{7f}del",
            "日本語?.doc",
        ] {
            let once = sanitize_filename(name);
            assert_eq!(once, sanitize_filename(&once));
            assert!(!once.contains(|c: char| "<>:\"/\\|?*\r\n".contains(c)));
        }
    }
}
