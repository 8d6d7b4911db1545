//! Path segment views and the segment editor.
//!
//! A path's segments are not fully determined by its text: `/` holds zero
//! segments after a fresh parse but one empty segment after
//! `push_back("")` wrote it. The part table's segment count is therefore
//! authoritative, and the serialized form disambiguates through a prefix:
//!
//! ```text
//! ""      prefix of a rootless path
//! "/"     prefix of an absolute path
//! "./"    guard: rootless path whose first segment is empty or would
//!         read as a scheme
//! "/./"   guard: absolute path whose first segment is empty
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use crate::charset::PATH_CHARS;
use crate::encoding::{
    EncodeOpts, decode_to_string, decoded_size, encode_to_string, validate_in_set,
};
use crate::error::Result;
use crate::parts::Part;
use crate::url::Url;

/// Length of the structural prefix before the first segment's content.
pub(crate) fn path_prefix(path: &[u8]) -> usize {
    if path.starts_with(b"/./") {
        3
    } else if path.starts_with(b"./") {
        2
    } else if path.starts_with(b"/") {
        1
    } else {
        0
    }
}

/// Segment count of freshly parsed path text.
///
/// A dot prefix is only ever written to carry a following segment, so an
/// empty remainder still counts one there.
pub(crate) fn count_segments(path: &[u8]) -> usize {
    let prefix = path_prefix(path);
    let rem = &path[prefix..];
    if rem.is_empty() {
        usize::from(prefix >= 2)
    } else {
        1 + memchr::memchr_iter(b'/', rem).count()
    }
}

/// Content byte range of segment `i` within `path`.
///
/// `i` must be less than the stored segment count.
pub(crate) fn segment_range(path: &[u8], i: usize) -> (usize, usize) {
    let mut start = path_prefix(path);
    let mut k = 0;
    loop {
        let end = start + memchr::memchr(b'/', &path[start..]).unwrap_or(path.len() - start);
        if k == i {
            return (start, end);
        }
        k += 1;
        start = end + 1;
    }
}

/// Iterator over a path's raw (percent-encoded) segments.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    path: &'a str,
    pos: usize,
    remaining: usize,
}

impl<'a> Segments<'a> {
    pub(crate) fn new(path: &'a str, nseg: usize) -> Self {
        Self {
            path,
            pos: path_prefix(path.as_bytes()),
            remaining: nseg,
        }
    }

    /// Number of segments not yet yielded.
    pub fn len(&self) -> usize {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let bytes = self.path.as_bytes();
        let end = self.pos
            + memchr::memchr(b'/', &bytes[self.pos..]).unwrap_or(bytes.len() - self.pos);
        let seg = &self.path[self.pos..end];
        self.pos = end + 1;
        Some(seg)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Segments<'_> {}

/// Mutable view over a URL's path segments.
///
/// Plain-text values are percent-encoded on the way in; `_encoded`
/// variants validate instead and preserve the given bytes.
#[derive(Debug)]
pub struct SegmentsMut<'u> {
    url: &'u mut Url,
}

impl<'u> SegmentsMut<'u> {
    pub(crate) fn new(url: &'u mut Url) -> Self {
        Self { url }
    }

    pub fn len(&self) -> usize {
        self.url.tab.nseg as usize
    }

    pub fn is_empty(&self) -> bool {
        self.url.tab.nseg == 0
    }

    /// Remove every segment. An absolute path keeps its `/`.
    pub fn clear(&mut self) -> Result<()> {
        let n = self.len();
        self.url.edit_segments(0, n, &[])
    }

    /// Replace all segments with `segs`.
    pub fn assign<'s>(&mut self, segs: impl IntoIterator<Item = &'s str>) -> Result<()> {
        let enc = encode_all(segs);
        let n = self.len();
        self.url.edit_segments(0, n, &enc)
    }

    pub fn assign_encoded<'s>(&mut self, segs: impl IntoIterator<Item = &'s str>) -> Result<()> {
        let enc = validate_all(segs)?;
        let n = self.len();
        self.url.edit_segments(0, n, &enc)
    }

    /// Insert one segment before position `at`.
    pub fn insert(&mut self, at: usize, seg: &str) -> Result<()> {
        self.url
            .edit_segments(at, at, &[encode_to_string(seg, PATH_CHARS)])
    }

    pub fn insert_encoded(&mut self, at: usize, seg: &str) -> Result<()> {
        let enc = validate_one(seg)?;
        self.url.edit_segments(at, at, &[enc])
    }

    /// Erase the segments in `[from, to)`.
    pub fn erase(&mut self, from: usize, to: usize) -> Result<()> {
        self.url.edit_segments(from, to, &[])
    }

    /// Replace the segments in `[from, to)` with `segs`.
    pub fn replace<'s>(
        &mut self,
        from: usize,
        to: usize,
        segs: impl IntoIterator<Item = &'s str>,
    ) -> Result<()> {
        let enc = encode_all(segs);
        self.url.edit_segments(from, to, &enc)
    }

    pub fn replace_encoded<'s>(
        &mut self,
        from: usize,
        to: usize,
        segs: impl IntoIterator<Item = &'s str>,
    ) -> Result<()> {
        let enc = validate_all(segs)?;
        self.url.edit_segments(from, to, &enc)
    }

    pub fn push_back(&mut self, seg: &str) -> Result<()> {
        let n = self.len();
        self.insert(n, seg)
    }

    pub fn push_back_encoded(&mut self, seg: &str) -> Result<()> {
        let n = self.len();
        self.insert_encoded(n, seg)
    }

    pub fn pop_back(&mut self) -> Result<()> {
        let n = self.len();
        if n == 0 {
            return Ok(());
        }
        self.erase(n - 1, n)
    }
}

fn encode_all<'s>(segs: impl IntoIterator<Item = &'s str>) -> Vec<String> {
    segs.into_iter()
        .map(|s| encode_to_string(s, PATH_CHARS))
        .collect()
}

fn validate_one(seg: &str) -> Result<String> {
    validate_in_set(seg.as_bytes(), PATH_CHARS, EncodeOpts::default())?;
    Ok(String::from(seg))
}

fn validate_all<'s>(segs: impl IntoIterator<Item = &'s str>) -> Result<Vec<String>> {
    segs.into_iter().map(validate_one).collect()
}

impl Url {
    /// Core segment-splice: replace segments `[first, last)` with the
    /// already-encoded `segs`, recomputing the structural prefix when the
    /// edit touches the front of the path.
    pub(crate) fn edit_segments(&mut self, first: usize, last: usize, segs: &[String]) -> Result<()> {
        let nseg = self.tab.nseg as usize;
        debug_assert!(first <= last && last <= nseg);

        let has_auth = self.tab.has_authority();
        let has_scheme = !self.tab.is_empty(Part::Scheme);
        let path_start = self.tab.start(Part::Path);
        let path = self.tab.raw(&self.buf, Part::Path);
        let absolute = path.starts_with(b"/") || has_auth;
        let n_after = nseg - (last - first) + segs.len();

        let (r0, r1, content) = if first == 0 {
            if n_after == 0 {
                // erasing everything keeps the path's own absoluteness
                let content: &[u8] = if path.starts_with(b"/") { b"/" } else { b"" };
                (0, path.len(), Vec::from(content))
            } else {
                let s0: &[u8] = match segs.first() {
                    Some(s) => s.as_bytes(),
                    None => {
                        let (lo, hi) = segment_range(path, last);
                        &path[lo..hi]
                    }
                };
                let prefix = path_front(absolute, has_auth, has_scheme, s0, n_after);
                let r1 = if last == nseg {
                    path.len()
                } else {
                    segment_range(path, last).0
                };
                let mut content = Vec::with_capacity(r1);
                content.extend_from_slice(prefix.as_bytes());
                for (i, seg) in segs.iter().enumerate() {
                    if i > 0 {
                        content.push(b'/');
                    }
                    content.extend_from_slice(seg.as_bytes());
                }
                if last < nseg && !segs.is_empty() {
                    content.push(b'/');
                }
                (0, r1, content)
            }
        } else {
            let r0 = segment_range(path, first - 1).1;
            let r1 = if last == nseg {
                path.len()
            } else if last == first {
                r0
            } else {
                segment_range(path, last - 1).1
            };
            let mut content = Vec::new();
            for seg in segs {
                content.push(b'/');
                content.extend_from_slice(seg.as_bytes());
            }
            (r0, r1, content)
        };

        self.splice_within(Part::Path, path_start + r0, path_start + r1, &content)?;
        self.tab.nseg = n_after as u32;
        let new_path = self.tab.raw(&self.buf, Part::Path);
        self.tab.set_decoded(Part::Path, decoded_size(new_path));
        self.check_invariants();
        Ok(())
    }
}

/// Choose the structural prefix for a path whose first segment is `s0`.
fn path_front(absolute: bool, has_auth: bool, has_scheme: bool, s0: &[u8], n: usize) -> &'static str {
    if absolute {
        if s0.is_empty() && (n == 1 || !has_auth) {
            "/./"
        } else {
            "/"
        }
    } else if s0.is_empty() {
        "./"
    } else if !has_scheme && memchr::memchr(b':', s0).is_some() {
        "./"
    } else {
        ""
    }
}

/// Decode one path segment.
pub(crate) fn decode_segment(seg: &str) -> String {
    decode_to_string(seg, EncodeOpts::default()).unwrap_or_default()
}

/// Decoding iterator over a path's segments.
#[derive(Debug, Clone)]
pub struct DecodedSegments<'a> {
    inner: Segments<'a>,
}

impl<'a> DecodedSegments<'a> {
    pub(crate) fn new(inner: Segments<'a>) -> Self {
        Self { inner }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Iterator for DecodedSegments<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.inner.next().map(decode_segment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for DecodedSegments<'_> {}
