//! Best-effort transfer and header decoding.
//!
//! Decoding never fails: when bytes cannot be decoded they are passed through
//! untouched, since a mis-declared encoding is common and not worth dropping
//! an attachment over.

use std::sync::LazyLock;

use base64::Engine;
use log::debug;
use regex::Regex;
use rustyknife::rfc2047::encoded_word;

use super::message::TransferEncoding;

static ENCODED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"=\?[^?\s]+\?[BbQq]\?[^?\s]*\?=").unwrap());
static ENCODED_WORD_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(=\?[^?\s]+\?[BbQq]\?[^?\s]*\?=)\s+(=\?)").unwrap());

/// Decodes fetched section bytes according to the part's declared encoding.
///
/// Parts with an unknown encoding are tried as base64.
pub fn decode_transfer(raw: &[u8], encoding: TransferEncoding) -> Vec<u8> {
    match encoding {
        TransferEncoding::Base64 | TransferEncoding::Unknown => {
            decode_base64(raw).unwrap_or_else(|| raw.to_vec())
        }
        TransferEncoding::QuotedPrintable => {
            match quoted_printable::decode(raw, quoted_printable::ParseMode::Robust) {
                Ok(decoded) => decoded,
                Err(e) => {
                    debug!("Quoted-printable decode failed, keeping raw bytes: {}", e);
                    raw.to_vec()
                }
            }
        }
        TransferEncoding::SevenBit | TransferEncoding::EightBit | TransferEncoding::Binary => {
            raw.to_vec()
        }
    }
}

/// Standard base64 with line breaks and other whitespace ignored.
fn decode_base64(raw: &[u8]) -> Option<Vec<u8>> {
    let compact: Vec<u8> = raw
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return None;
    }
    base64::engine::general_purpose::STANDARD
        .decode(&compact)
        .ok()
}

/// Decodes RFC 2047 encoded words (`=?UTF-8?B?...?=`) in a header value.
///
/// Whitespace between adjacent encoded words is dropped. Words that fail to
/// decode are left as-is.
pub fn decode_header_words(value: &str) -> String {
    if !value.contains("=?") {
        return value.to_string();
    }

    let mut joined = value.to_string();
    while ENCODED_WORD_GAP.is_match(&joined) {
        joined = ENCODED_WORD_GAP.replace_all(&joined, "$1$2").into_owned();
    }

    ENCODED_WORD
        .replace_all(&joined, |caps: &regex::Captures| {
            let word = &caps[0];
            match encoded_word(word.as_bytes()) {
                Ok((rest, text)) if rest.is_empty() => text,
                _ => {
                    debug!("Leaving undecodable header word as-is: {}", word);
                    word.to_string()
                }
            }
        })
        .into_owned()
}
