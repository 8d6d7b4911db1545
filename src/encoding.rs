//! Percent codec: measure, encode, re-encode, decode, validate.
//!
//! Every operation takes the target part's [`AllowedSet`]; bytes outside
//! the set travel as `%HH` triplets with uppercase hex in canonical form.

use alloc::string::String;
use alloc::vec::Vec;

use crate::charset::{AllowedSet, is_hexdig};
use crate::error::{Error, Result};

/// Options for the percent codec.
#[derive(Debug, Clone, Copy)]
pub struct EncodeOpts {
    /// Decode `+` as a space (HTML form convention).
    pub plus_to_space: bool,
    /// Permit NUL bytes, literal or as `%00`.
    pub allow_null: bool,
    /// Produce lowercase hex digits when encoding.
    pub lower_case: bool,
}

impl Default for EncodeOpts {
    fn default() -> Self {
        Self {
            plus_to_space: false,
            allow_null: true,
            lower_case: false,
        }
    }
}

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";
const HEX_LOWER: &[u8; 16] = b"0123456789abcdef";

fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        _ => b - b'A' + 10,
    }
}

fn hex_digits(octet: u8, opts: EncodeOpts) -> [u8; 2] {
    let digits = if opts.lower_case { HEX_LOWER } else { HEX_UPPER };
    [digits[(octet >> 4) as usize], digits[(octet & 0xF) as usize]]
}

/// Number of bytes `src` occupies once every byte outside `allowed` is
/// written as a `%HH` triplet.
pub fn encoded_size(src: &[u8], allowed: AllowedSet) -> usize {
    src.iter()
        .map(|&b| if allowed.contains(b) { 1 } else { 3 })
        .sum()
}

/// Percent-encode `src` into `dest`, returning the bytes written.
///
/// `dest` must hold at least [`encoded_size`] bytes.
pub fn encode(dest: &mut [u8], src: &[u8], allowed: AllowedSet, opts: EncodeOpts) -> usize {
    let mut w = 0;
    for &b in src {
        if allowed.contains(b) {
            dest[w] = b;
            w += 1;
        } else {
            let hex = hex_digits(b, opts);
            dest[w] = b'%';
            dest[w + 1] = hex[0];
            dest[w + 2] = hex[1];
            w += 3;
        }
    }
    w
}

/// Percent-encode `src` into a new string.
pub fn encode_to_string(src: &str, allowed: AllowedSet) -> String {
    let mut out = Vec::with_capacity(encoded_size(src.as_bytes(), allowed));
    encode_append(&mut out, src.as_bytes(), allowed, EncodeOpts::default());
    // Output is ASCII by construction.
    String::from_utf8(out).unwrap_or_default()
}

/// Append-encode into a growable buffer.
pub(crate) fn encode_append(buf: &mut Vec<u8>, src: &[u8], allowed: AllowedSet, opts: EncodeOpts) {
    buf.reserve(src.len());
    for &b in src {
        if allowed.contains(b) {
            buf.push(b);
        } else {
            let hex = hex_digits(b, opts);
            buf.push(b'%');
            buf.push(hex[0]);
            buf.push(hex[1]);
        }
    }
}

/// Size of the canonical re-encoding of already-encoded input.
///
/// Assumes `src` passed [`validate`].
pub fn re_encoded_size(src: &[u8], allowed: AllowedSet) -> usize {
    let mut r = 0;
    let mut n = 0;
    while r < src.len() {
        let b = src[r];
        if b == b'%' {
            let octet = (hex_value(src[r + 1]) << 4) | hex_value(src[r + 2]);
            n += if allowed.contains(octet) { 1 } else { 3 };
            r += 3;
        } else {
            n += if allowed.contains(b) { 1 } else { 3 };
            r += 1;
        }
    }
    n
}

/// Canonically re-encode validated input: triplets whose octet is allowed
/// become literal, everything else that must be escaped gets uppercase
/// (or per-`opts`) hex. Returns the bytes written.
pub fn re_encode(dest: &mut [u8], src: &[u8], allowed: AllowedSet, opts: EncodeOpts) -> usize {
    let mut r = 0;
    let mut w = 0;
    while r < src.len() {
        let b = src[r];
        if b == b'%' {
            let octet = (hex_value(src[r + 1]) << 4) | hex_value(src[r + 2]);
            if allowed.contains(octet) {
                dest[w] = octet;
                w += 1;
            } else {
                let hex = hex_digits(octet, opts);
                dest[w] = b'%';
                dest[w + 1] = hex[0];
                dest[w + 2] = hex[1];
                w += 3;
            }
            r += 3;
        } else if allowed.contains(b) {
            dest[w] = b;
            w += 1;
            r += 1;
        } else {
            let hex = hex_digits(b, opts);
            dest[w] = b'%';
            dest[w + 1] = hex[0];
            dest[w + 2] = hex[1];
            w += 3;
            r += 1;
        }
    }
    w
}

/// Canonicalize a validated span in place: literal bytes stay verbatim,
/// escape triplets decode when their octet is in `decode_set` and get
/// uppercase hex otherwise. Returns the new (never larger) length.
///
/// Keeping literals untouched means separators already validated into a
/// part cannot change, so the part's structure is preserved; and since
/// the output only shrinks, the write index never passes the read index.
pub(crate) fn canonicalize_in_place(buf: &mut [u8], decode_set: AllowedSet) -> usize {
    let mut r = 0;
    let mut w = 0;
    while r < buf.len() {
        if buf[r] == b'%' {
            let octet = (hex_value(buf[r + 1]) << 4) | hex_value(buf[r + 2]);
            if decode_set.contains(octet) {
                buf[w] = octet;
                w += 1;
            } else {
                buf[w] = b'%';
                buf[w + 1] = buf[r + 1].to_ascii_uppercase();
                buf[w + 2] = buf[r + 2].to_ascii_uppercase();
                w += 3;
            }
            r += 3;
        } else {
            buf[w] = buf[r];
            w += 1;
            r += 1;
        }
    }
    w
}

/// Scan `src` for well-formed percent escapes.
///
/// Returns the decoded byte count. Fails with [`Error::MissingPctHexdig`]
/// when a `%` has fewer than two following bytes, [`Error::BadPctHexdig`]
/// when either is not a hex digit, and [`Error::IllegalNull`] for NUL
/// bytes when `opts.allow_null` is off.
pub fn validate(src: &[u8], opts: EncodeOpts) -> Result<usize> {
    let mut r = 0;
    let mut n = 0;
    while r < src.len() {
        let b = src[r];
        if b == b'%' {
            if r + 2 >= src.len() {
                return Err(Error::MissingPctHexdig);
            }
            if !is_hexdig(src[r + 1]) || !is_hexdig(src[r + 2]) {
                return Err(Error::BadPctHexdig);
            }
            let octet = (hex_value(src[r + 1]) << 4) | hex_value(src[r + 2]);
            if octet == 0 && !opts.allow_null {
                return Err(Error::IllegalNull);
            }
            r += 3;
        } else {
            if b == 0 && !opts.allow_null {
                return Err(Error::IllegalNull);
            }
            r += 1;
        }
        n += 1;
    }
    Ok(n)
}

/// Like [`validate`], additionally requiring every literal byte to lie in
/// `allowed`. Literal NUL is [`Error::IllegalNull`]; any other stray byte
/// is [`Error::Syntax`].
pub(crate) fn validate_in_set(src: &[u8], allowed: AllowedSet, opts: EncodeOpts) -> Result<usize> {
    let mut r = 0;
    let mut n = 0;
    while r < src.len() {
        let b = src[r];
        if b == b'%' {
            if r + 2 >= src.len() {
                return Err(Error::MissingPctHexdig);
            }
            if !is_hexdig(src[r + 1]) || !is_hexdig(src[r + 2]) {
                return Err(Error::BadPctHexdig);
            }
            let octet = (hex_value(src[r + 1]) << 4) | hex_value(src[r + 2]);
            if octet == 0 && !opts.allow_null {
                return Err(Error::IllegalNull);
            }
            r += 3;
        } else if allowed.contains(b) {
            r += 1;
        } else if b == 0 {
            return Err(Error::IllegalNull);
        } else {
            return Err(Error::Syntax);
        }
        n += 1;
    }
    Ok(n)
}

/// Decode `src` into `dest` after validating it.
///
/// Returns the bytes written; [`Error::NoSpace`] if `dest` is too small.
pub fn decode(dest: &mut [u8], src: &[u8], opts: EncodeOpts) -> Result<usize> {
    let n = validate(src, opts)?;
    if dest.len() < n {
        return Err(Error::NoSpace);
    }
    Ok(decode_unchecked(dest, src, opts))
}

/// Decode previously validated input into `dest`, returning bytes written.
pub fn decode_unchecked(dest: &mut [u8], src: &[u8], opts: EncodeOpts) -> usize {
    let mut r = 0;
    let mut w = 0;
    while r < src.len() {
        let b = src[r];
        if b == b'%' {
            dest[w] = (hex_value(src[r + 1]) << 4) | hex_value(src[r + 2]);
            r += 3;
        } else if b == b'+' && opts.plus_to_space {
            dest[w] = b' ';
            r += 1;
        } else {
            dest[w] = b;
            r += 1;
        }
        w += 1;
    }
    w
}

/// Decode a validated string into a new `String`.
///
/// The caller guarantees the decoded bytes are UTF-8; non-UTF-8 decodes
/// fail with [`Error::Syntax`].
pub fn decode_to_string(src: &str, opts: EncodeOpts) -> Result<String> {
    let n = validate(src.as_bytes(), opts)?;
    let mut out = alloc::vec![0u8; n];
    decode_unchecked(&mut out, src.as_bytes(), opts);
    String::from_utf8(out).map_err(|_| Error::Syntax)
}

/// Append-decode validated input into a growable buffer.
pub(crate) fn decode_append(buf: &mut Vec<u8>, src: &[u8], opts: EncodeOpts) {
    buf.reserve(src.len());
    let mut r = 0;
    while r < src.len() {
        let b = src[r];
        if b == b'%' {
            buf.push((hex_value(src[r + 1]) << 4) | hex_value(src[r + 2]));
            r += 3;
        } else if b == b'+' && opts.plus_to_space {
            buf.push(b' ');
            r += 1;
        } else {
            buf.push(b);
            r += 1;
        }
    }
}

/// Decoded size of validated input: one byte per escape triplet.
pub(crate) fn decoded_size(src: &[u8]) -> usize {
    src.len() - 2 * memchr::memchr_iter(b'%', src).count()
}

/// Whether validated encoded input decodes to exactly `plain`.
pub(crate) fn decode_eq(encoded: &[u8], plain: &[u8]) -> bool {
    let mut r = 0;
    let mut i = 0;
    while r < encoded.len() {
        let octet = if encoded[r] == b'%' {
            let v = (hex_value(encoded[r + 1]) << 4) | hex_value(encoded[r + 2]);
            r += 3;
            v
        } else {
            let v = encoded[r];
            r += 1;
            v
        };
        if i >= plain.len() || plain[i] != octet {
            return false;
        }
        i += 1;
    }
    i == plain.len()
}
