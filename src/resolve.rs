//! Reference resolution (RFC 3986 §5.2.2, strict).

use alloc::string::String;
use alloc::vec::Vec;
use crate::error::{Error, Result};
use crate::parser;
use crate::parts::Part;
use crate::url::Url;
use crate::url_base::UrlBase;

impl Url {
    /// Resolve `reference` against this URL as the base.
    ///
    /// Fails with [`Error::NotABase`] when the base has no scheme.
    pub fn resolve<R: UrlBase>(&self, reference: &R) -> Result<Url> {
        if self.tab.is_empty(Part::Scheme) {
            return Err(Error::NotABase);
        }
        let rt = reference.table();
        let rb = reference.raw_bytes();

        // ref with its own scheme: adopt it wholesale
        if !rt.is_empty(Part::Scheme) {
            let mut out = Url::from_parsed(reference.as_str(), rt.clone());
            out.remove_dot_segments()?;
            return Ok(out);
        }

        let mut text = Vec::with_capacity(self.len() + rb.len());
        // base scheme, always
        text.extend_from_slice(self.tab.raw(&self.buf, Part::Scheme));

        if rt.has_authority() {
            // authority window: "//" through port
            text.extend_from_slice(&rb[rt.start(Part::User)..rt.end(Part::Port)]);
            text.extend_from_slice(rt.raw(rb, Part::Path));
            text.extend_from_slice(rt.raw(rb, Part::Query));
        } else {
            text.extend_from_slice(&self.buf[self.tab.start(Part::User)..self.tab.end(Part::Port)]);

            let ref_path = rt.raw(rb, Part::Path);
            if ref_path.is_empty() {
                text.extend_from_slice(self.tab.raw(&self.buf, Part::Path));
                if !rt.is_empty(Part::Query) {
                    text.extend_from_slice(rt.raw(rb, Part::Query));
                } else {
                    text.extend_from_slice(self.tab.raw(&self.buf, Part::Query));
                }
            } else {
                if ref_path.starts_with(b"/") {
                    text.extend_from_slice(ref_path);
                } else {
                    let merged = self.merge_path(ref_path);
                    text.extend_from_slice(&merged);
                }
                text.extend_from_slice(rt.raw(rb, Part::Query));
            }
        }

        if !rt.is_empty(Part::Fragment) {
            text.extend_from_slice(rt.raw(rb, Part::Fragment));
        } else if rt.raw(rb, Part::Path).is_empty() && !rt.has_authority() {
            // an empty reference path keeps the base fragment too
            text.extend_from_slice(self.tab.raw(&self.buf, Part::Fragment));
        }

        let text = String::from_utf8(text).map_err(|_| Error::Syntax)?;
        let tab = parser::parse_uri(&text)?;
        let mut out = Url::from_parsed(&text, tab);
        out.remove_dot_segments()?;
        Ok(out)
    }

    /// §5.2.3 merge: the base path up to its last `/`, then the
    /// reference path. With an authority and an empty base path, the
    /// reference hangs off the root.
    fn merge_path(&self, ref_path: &[u8]) -> Vec<u8> {
        let base_path = self.tab.raw(&self.buf, Part::Path);
        let mut out = Vec::with_capacity(base_path.len() + 1 + ref_path.len());
        if self.tab.has_authority() && base_path.is_empty() {
            out.push(b'/');
        } else if let Some(i) = memchr::memrchr(b'/', base_path) {
            out.extend_from_slice(&base_path[..=i]);
        }
        out.extend_from_slice(ref_path);
        out
    }
}
