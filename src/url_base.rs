//! Shared read-only surface over a buffer and its part table.
//!
//! [`Url`](crate::Url) and [`UrlView`](crate::UrlView) both implement
//! [`UrlBase`]; bring the trait into scope to use the accessors. The
//! trait is sealed — outside types cannot implement it.

use alloc::string::String;
use alloc::vec::Vec;
use crate::encoding::{EncodeOpts, decode_append};
use crate::params::{DecodedParams, Params};
use crate::parts::{HostType, Part, PartTable, SchemeKind};
use crate::segments::{DecodedSegments, Segments};

pub(crate) mod sealed {
    use crate::parts::PartTable;

    pub trait Raw {
        /// Serialization bytes, without the NUL terminator.
        fn raw_bytes(&self) -> &[u8];
        fn table(&self) -> &PartTable;
    }
}

fn part_str<'a>(bytes: &'a [u8], tab: &PartTable, p: Part) -> &'a str {
    let content = tab.content(bytes, p);
    debug_assert!(content.is_ascii());
    // Invariant: only ASCII is ever stored.
    unsafe { core::str::from_utf8_unchecked(content) }
}

fn str_range(bytes: &[u8], lo: usize, hi: usize) -> &str {
    debug_assert!(bytes[lo..hi].is_ascii());
    unsafe { core::str::from_utf8_unchecked(&bytes[lo..hi]) }
}

fn decode_part(bytes: &[u8], tab: &PartTable, p: Part) -> String {
    let content = tab.content(bytes, p);
    let mut out = Vec::with_capacity(tab.decoded_len(p));
    decode_append(&mut out, content, EncodeOpts::default());
    String::from_utf8(out).unwrap_or_default()
}

/// Read-only accessors shared by owning and borrowed URLs.
///
/// `encoded_*` accessors return the stored bytes; the plain accessors
/// allocate and percent-decode, sized by the part table's decoded tally.
pub trait UrlBase: sealed::Raw {
    /// The whole serialization.
    fn as_str(&self) -> &str {
        str_range(self.raw_bytes(), 0, self.raw_bytes().len())
    }

    //---- scheme ----

    fn has_scheme(&self) -> bool {
        !self.table().is_empty(Part::Scheme)
    }

    /// The scheme without its `:`, if present.
    fn scheme(&self) -> Option<&str> {
        if !self.has_scheme() {
            return None;
        }
        Some(part_str(self.raw_bytes(), self.table(), Part::Scheme))
    }

    fn scheme_kind(&self) -> SchemeKind {
        self.table().scheme
    }

    //---- authority ----

    fn has_authority(&self) -> bool {
        self.table().has_authority()
    }

    /// The authority text without the leading `//`.
    fn encoded_authority(&self) -> &str {
        let tab = self.table();
        let (lo, _) = tab.content_range(Part::User);
        str_range(self.raw_bytes(), lo, tab.end(Part::Port))
    }

    /// Whether a userinfo (and its `@`) is present.
    fn has_userinfo(&self) -> bool {
        !self.table().is_empty(Part::Pass)
    }

    /// The userinfo (`user[:password]`) without its `@`, raw.
    fn encoded_userinfo(&self) -> &str {
        let tab = self.table();
        if !self.has_userinfo() {
            return "";
        }
        let (lo, _) = tab.content_range(Part::User);
        str_range(self.raw_bytes(), lo, tab.end(Part::Pass) - 1)
    }

    /// The userinfo, percent-decoded.
    fn userinfo(&self) -> String {
        let tab = self.table();
        let mut out = Vec::with_capacity(
            tab.decoded_len(Part::User) + 1 + tab.decoded_len(Part::Pass),
        );
        decode_append(
            &mut out,
            self.encoded_userinfo().as_bytes(),
            EncodeOpts::default(),
        );
        String::from_utf8(out).unwrap_or_default()
    }

    fn encoded_user(&self) -> &str {
        part_str(self.raw_bytes(), self.table(), Part::User)
    }

    fn user(&self) -> String {
        decode_part(self.raw_bytes(), self.table(), Part::User)
    }

    /// Whether a password (after a `:`) is present.
    fn has_password(&self) -> bool {
        self.table().len(Part::Pass) > 1
    }

    fn encoded_password(&self) -> &str {
        part_str(self.raw_bytes(), self.table(), Part::Pass)
    }

    fn password(&self) -> String {
        decode_part(self.raw_bytes(), self.table(), Part::Pass)
    }

    //---- host ----

    fn host_type(&self) -> HostType {
        self.table().host_type
    }

    /// The host as stored: reg-name, dotted quad, or bracketed literal.
    fn encoded_host(&self) -> &str {
        part_str(self.raw_bytes(), self.table(), Part::Host)
    }

    fn host(&self) -> String {
        decode_part(self.raw_bytes(), self.table(), Part::Host)
    }

    /// The parsed address when the host is an IPv4 literal.
    fn host_ipv4(&self) -> Option<[u8; 4]> {
        let tab = self.table();
        if tab.host_type != HostType::Ipv4 {
            return None;
        }
        let mut out = [0u8; 4];
        out.copy_from_slice(&tab.ip_addr[..4]);
        Some(out)
    }

    /// The parsed address when the host is an IPv6 literal.
    fn host_ipv6(&self) -> Option<[u8; 16]> {
        let tab = self.table();
        if tab.host_type != HostType::Ipv6 {
            return None;
        }
        Some(tab.ip_addr)
    }

    //---- port ----

    fn has_port(&self) -> bool {
        !self.table().is_empty(Part::Port)
    }

    /// The port digits as stored (may be empty even when `:` is present).
    fn port(&self) -> &str {
        part_str(self.raw_bytes(), self.table(), Part::Port)
    }

    /// The numeric port; 0 when absent or numberless.
    fn port_number(&self) -> u16 {
        self.table().port_number
    }

    fn has_port_number(&self) -> bool {
        self.table().has_port_number
    }

    /// The port in use: explicit number, or the scheme's default.
    fn port_or_default(&self) -> Option<u16> {
        if self.table().has_port_number {
            Some(self.table().port_number)
        } else {
            self.table().scheme.default_port()
        }
    }

    //---- path ----

    fn encoded_path(&self) -> &str {
        part_str(self.raw_bytes(), self.table(), Part::Path)
    }

    fn path(&self) -> String {
        decode_part(self.raw_bytes(), self.table(), Part::Path)
    }

    fn is_path_absolute(&self) -> bool {
        self.encoded_path().starts_with('/')
    }

    fn segment_count(&self) -> usize {
        self.table().nseg as usize
    }

    /// Iterator over raw path segments.
    fn encoded_segments(&self) -> Segments<'_> {
        Segments::new(self.encoded_path(), self.segment_count())
    }

    /// Iterator over decoded path segments.
    fn segments(&self) -> DecodedSegments<'_> {
        DecodedSegments::new(self.encoded_segments())
    }

    //---- query ----

    fn has_query(&self) -> bool {
        !self.table().is_empty(Part::Query)
    }

    fn encoded_query(&self) -> &str {
        part_str(self.raw_bytes(), self.table(), Part::Query)
    }

    fn query(&self) -> String {
        decode_part(self.raw_bytes(), self.table(), Part::Query)
    }

    fn param_count(&self) -> usize {
        self.table().nparam as usize
    }

    /// Iterator over raw query parameters.
    fn encoded_params(&self) -> Params<'_> {
        Params::new(self.encoded_query(), self.param_count())
    }

    /// Iterator over decoded query parameters (`+` decodes as space).
    fn params(&self) -> DecodedParams<'_> {
        DecodedParams::new(self.encoded_params())
    }

    //---- fragment ----

    fn has_fragment(&self) -> bool {
        !self.table().is_empty(Part::Fragment)
    }

    fn encoded_fragment(&self) -> &str {
        part_str(self.raw_bytes(), self.table(), Part::Fragment)
    }

    fn fragment(&self) -> String {
        decode_part(self.raw_bytes(), self.table(), Part::Fragment)
    }
}

impl sealed::Raw for crate::Url {
    fn raw_bytes(&self) -> &[u8] {
        &self.buf[..self.buf.len() - 1]
    }

    fn table(&self) -> &PartTable {
        &self.tab
    }
}

impl UrlBase for crate::Url {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Url;

    #[test]
    fn test_accessors() {
        let url = Url::parse("https://u%20x:p@example.com:8080/a%20b/c?k=v#f").unwrap();
        assert_eq!(url.scheme(), Some("https"));
        assert_eq!(url.encoded_user(), "u%20x");
        assert_eq!(url.user(), "u x");
        assert_eq!(url.encoded_password(), "p");
        assert_eq!(url.encoded_userinfo(), "u%20x:p");
        assert_eq!(url.userinfo(), "u x:p");
        assert_eq!(url.encoded_authority(), "u%20x:p@example.com:8080");
        assert_eq!(url.encoded_host(), "example.com");
        assert_eq!(url.port(), "8080");
        assert_eq!(url.port_number(), 8080);
        assert_eq!(url.encoded_path(), "/a%20b/c");
        assert_eq!(url.path(), "/a b/c");
        assert_eq!(url.encoded_query(), "k=v");
        assert_eq!(url.encoded_fragment(), "f");
        assert!(url.is_path_absolute());
    }

    #[test]
    fn test_absent_parts() {
        let url = Url::parse("/a/b").unwrap();
        assert_eq!(url.scheme(), None);
        assert!(!url.has_authority());
        assert!(!url.has_userinfo());
        assert!(!url.has_port());
        assert!(!url.has_query());
        assert!(!url.has_fragment());
        assert_eq!(url.encoded_authority(), "");
        assert_eq!(url.encoded_userinfo(), "");
    }

    #[test]
    fn test_port_or_default() {
        let url = Url::parse("https://h/").unwrap();
        assert_eq!(url.port_or_default(), Some(443));
        let url = Url::parse("https://h:8443/").unwrap();
        assert_eq!(url.port_or_default(), Some(8443));
        let url = Url::parse("x://h/").unwrap();
        assert_eq!(url.port_or_default(), None);
    }

    #[test]
    fn test_segments_and_params_iterators() {
        let url = Url::parse("http://h/a/b%20c?x=1&y&z=%202").unwrap();
        let segs: Vec<String> = url.segments().collect();
        assert_eq!(segs, ["a", "b c"]);

        let params: Vec<(String, Option<String>)> = url.params().collect();
        assert_eq!(
            params,
            [
                ("x".into(), Some("1".into())),
                ("y".into(), None),
                ("z".into(), Some(" 2".into())),
            ]
        );
    }
}
