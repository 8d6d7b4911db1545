//! Read-only URL view over an externally owned string slice.

use crate::error::Result;
use crate::parser;
use crate::parts::PartTable;
use crate::url::Url;
use crate::url_base::{UrlBase, sealed};

/// A parsed URL borrowing its text from the caller.
///
/// Exposes the same read surface as [`Url`] through [`UrlBase`]; any
/// mutation requires copying into an owning [`Url`] first.
#[derive(Debug, Clone)]
pub struct UrlView<'a> {
    s: &'a str,
    tab: PartTable,
}

impl<'a> UrlView<'a> {
    /// Parse a URI-reference without copying it.
    pub fn parse(s: &'a str) -> Result<Self> {
        Ok(Self {
            s,
            tab: parser::parse_uri_reference(s)?,
        })
    }

    /// Parse a URI (scheme required).
    pub fn parse_uri(s: &'a str) -> Result<Self> {
        Ok(Self {
            s,
            tab: parser::parse_uri(s)?,
        })
    }

    /// Parse an absolute-URI (scheme required, no fragment).
    pub fn parse_absolute(s: &'a str) -> Result<Self> {
        Ok(Self {
            s,
            tab: parser::parse_absolute_uri(s)?,
        })
    }

    /// Parse an origin-form request target (`/path?query`).
    pub fn parse_origin_form(s: &'a str) -> Result<Self> {
        Ok(Self {
            s,
            tab: parser::parse_origin_form(s)?,
        })
    }

    /// Parse an authority-form request target (`host:port`).
    pub fn parse_authority_form(s: &'a str) -> Result<Self> {
        Ok(Self {
            s,
            tab: parser::parse_authority_form(s)?,
        })
    }

    pub(crate) fn from_parts(s: &'a str, tab: PartTable) -> Self {
        Self { s, tab }
    }

    /// The whole serialization.
    pub fn as_str(&self) -> &'a str {
        self.s
    }

    pub fn len(&self) -> usize {
        self.s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    /// Copy into an owning, mutable URL.
    ///
    /// An authority-form view gains the `//` marker its request-target
    /// grammar omits, making it a well-formed URI-reference.
    pub fn to_url(&self) -> Url {
        let bare_authority = self.tab.is_empty(crate::parts::Part::User)
            && (!self.tab.is_empty(crate::parts::Part::Host)
                || !self.tab.is_empty(crate::parts::Part::Port));
        if bare_authority {
            let mut url = Url::new();
            if url.set_encoded_authority(self.s).is_ok() {
                return url;
            }
        }
        Url::from_parsed(self.s, self.tab.clone())
    }
}

impl sealed::Raw for UrlView<'_> {
    fn raw_bytes(&self) -> &[u8] {
        self.s.as_bytes()
    }

    fn table(&self) -> &PartTable {
        &self.tab
    }
}

impl UrlBase for UrlView<'_> {}

impl From<UrlView<'_>> for Url {
    fn from(view: UrlView<'_>) -> Url {
        view.to_url()
    }
}

impl core::fmt::Display for UrlView<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.s)
    }
}
