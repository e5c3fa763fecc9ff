//! Header decoding module.
//!
//! This module decodes MIME encoded-words (RFC 2047) found in header
//! values and converts raw bytes to text following a declared
//! charset. Every function here is best-effort: nothing fails, the
//! result tells whether decoding was lossless instead.

use base64::{
    alphabet,
    engine::{general_purpose::GeneralPurposeConfig, DecodePaddingMode, GeneralPurpose},
    Engine,
};
use charset::Charset;
use log::{trace, warn};
use mailparse::{MailHeader, MailHeaderMap};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Charset used when none is declared, or when the declared one is
/// unknown.
pub const DEFAULT_CHARSET: &str = "utf-8";

static ENCODED_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"=\?([^?]*)\?([bBqQ])\?(.*?)\?=").unwrap());

static FOLDING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n([ \t])").unwrap());

/// Base64 engine tolerating missing or extra padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Represents text decoded from raw bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    /// `false` when some bytes could not be represented in the
    /// charset and were dropped.
    pub lossless: bool,
}

/// Decodes bytes using the given charset, or [`DEFAULT_CHARSET`] when
/// missing or unknown. Bytes the charset cannot represent are dropped.
pub fn decode_text(bytes: &[u8], charset: Option<&str>) -> DecodedText {
    let label = charset.map(str::trim).unwrap_or(DEFAULT_CHARSET);
    let charset = Charset::for_label(label.as_bytes()).or_else(|| {
        warn!("unknown charset {:?}, using {}", label, DEFAULT_CHARSET);
        Charset::for_label(DEFAULT_CHARSET.as_bytes())
    });

    let Some(charset) = charset else {
        let text = String::from_utf8_lossy(bytes);
        return DecodedText {
            lossless: !text.contains(char::REPLACEMENT_CHARACTER),
            text: text.replace(char::REPLACEMENT_CHARACTER, ""),
        };
    };

    let (text, had_errors) = charset.decode_without_bom_handling(bytes);
    if had_errors {
        DecodedText {
            text: text.replace(char::REPLACEMENT_CHARACTER, ""),
            lossless: false,
        }
    } else {
        DecodedText {
            text: text.into_owned(),
            lossless: true,
        }
    }
}

/// Decodes bytes using one byte per character, which never fails.
pub fn decode_latin1(bytes: &[u8]) -> String {
    charset::decode_latin1(bytes).into_owned()
}

/// Returns the text of a raw header value: UTF-8 when valid, Latin-1
/// otherwise. Folded lines are unfolded.
pub fn raw_header_text(header: &MailHeader) -> String {
    let raw = header.get_value_raw();
    let text = match decode_text(raw, None) {
        DecodedText {
            text,
            lossless: true,
        } => text,
        _ => decode_latin1(raw),
    };

    FOLDING.replace_all(text.trim(), "$1").to_string()
}

/// Returns the unfolded raw text of the first header with the given
/// key, or an empty string.
pub fn first_raw_header<M: MailHeaderMap + ?Sized>(headers: &M, key: &str) -> String {
    headers
        .get_first_header(key)
        .map(raw_header_text)
        .unwrap_or_default()
}

/// Represents a run of a header value sharing the same charset, still
/// as raw bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderChunk {
    pub bytes: Vec<u8>,
    /// The declared charset, `None` for unencoded text.
    pub charset: Option<String>,
}

impl HeaderChunk {
    fn plain(text: &str) -> Self {
        Self {
            bytes: text.as_bytes().to_vec(),
            charset: None,
        }
    }

    pub fn decode(&self) -> DecodedText {
        decode_text(&self.bytes, self.charset.as_deref())
    }
}

#[derive(Debug)]
enum Word {
    Plain(String),
    Encoded { bytes: Vec<u8>, charset: String },
}

impl Word {
    fn is_encoded(&self) -> bool {
        matches!(self, Self::Encoded { .. })
    }

    fn is_blank(&self) -> bool {
        matches!(self, Self::Plain(text) if text.chars().all(char::is_whitespace))
    }
}

fn hex_digit(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|digit| digit as u8)
}

fn decode_q(encoded: &str) -> Vec<u8> {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'_' => decoded.push(b' '),
            b'=' if i + 2 < bytes.len() => {
                match (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        decoded.push(hi << 4 | lo);
                        i += 2;
                    }
                    _ => decoded.push(b'='),
                }
            }
            byte => decoded.push(byte),
        }
        i += 1;
    }

    decoded
}

fn decode_word(caps: &Captures) -> Option<Word> {
    // drops the RFC 2231 language suffix, as in "utf-8*en"
    let charset = caps[1].split('*').next().unwrap_or_default().to_lowercase();
    let encoded = &caps[3];

    let bytes = match &caps[2] {
        "b" | "B" => {
            let encoded: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
            LENIENT_BASE64.decode(encoded).ok()?
        }
        _ => decode_q(encoded),
    };

    Some(Word::Encoded { bytes, charset })
}

fn lex_words(value: &str) -> Vec<Word> {
    let mut words = Vec::new();

    for line in value.lines() {
        let mut cursor = 0;

        for caps in ENCODED_WORD.captures_iter(line) {
            let Some(token) = caps.get(0) else {
                continue;
            };

            let plain = &line[cursor..token.start()];
            let plain = if cursor == 0 { plain.trim_start() } else { plain };
            if !plain.is_empty() {
                words.push(Word::Plain(plain.to_owned()));
            }

            match decode_word(&caps) {
                Some(word) => words.push(word),
                None => {
                    warn!("cannot decode encoded-word {:?}, keeping it as is", token.as_str());
                    words.push(Word::Plain(token.as_str().to_owned()));
                }
            }

            cursor = token.end();
        }

        let plain = &line[cursor..];
        let plain = if cursor == 0 { plain.trim_start() } else { plain };
        if !plain.is_empty() {
            words.push(Word::Plain(plain.to_owned()));
        }
    }

    // whitespace between two encoded-words is not part of the text
    let mut i = 1;
    while i + 1 < words.len() {
        if words[i].is_blank() && words[i - 1].is_encoded() && words[i + 1].is_encoded() {
            words.remove(i);
        } else {
            i += 1;
        }
    }

    words
}

/// Splits a header value into chunks of same-charset text. Adjacent
/// encoded-words sharing a charset are merged, as are adjacent
/// unencoded runs.
pub fn split_chunks(value: &str) -> Vec<HeaderChunk> {
    if !ENCODED_WORD.is_match(value) {
        return vec![HeaderChunk::plain(value)];
    }

    let mut chunks: Vec<HeaderChunk> = Vec::new();

    for word in lex_words(value) {
        let (bytes, charset) = match word {
            Word::Plain(text) => (text.into_bytes(), None),
            Word::Encoded { bytes, charset } => (bytes, Some(charset)),
        };

        match chunks.last_mut() {
            Some(last) if last.charset == charset => {
                if charset.is_none() {
                    last.bytes.push(b' ');
                }
                last.bytes.extend(bytes);
            }
            _ => chunks.push(HeaderChunk { bytes, charset }),
        }
    }

    trace!("header chunks: {:?}", chunks);
    chunks
}

/// Returns the first chunk of the header value. Any text following a
/// charset switch is left out.
pub fn first_chunk(value: &str) -> HeaderChunk {
    split_chunks(value).into_iter().next().unwrap_or_default()
}

/// Decodes the first chunk of the header value, dropping undecodable
/// bytes.
pub fn decode_first_word(value: &str) -> String {
    first_chunk(value).decode().text
}
