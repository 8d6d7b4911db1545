//! RFC 3986 URLs as first-class mutable values, plus a path-template
//! router.
//!
//! The heart of the crate is [`Url`]: one contiguous buffer holding a
//! complete URI-reference, with a part table locating every component.
//! Components are read zero-copy, set (plain or pre-encoded), removed,
//! and normalized in place; percent-encoded octets are preserved exactly
//! wherever RFC 3986 distinguishes them from their decoded form.
//!
//! ```
//! use ruri::{Url, UrlBase};
//!
//! # fn main() -> ruri::Result<()> {
//! let mut url = Url::parse("https://example.com/a/b?x=1")?;
//! url.set_host("api.example.com")?;
//! url.segments_mut().push_back("c d")?;
//! assert_eq!(url.as_str(), "https://api.example.com/a/b/c%20d?x=1");
//! assert_eq!(url.encoded_host(), "api.example.com");
//! assert_eq!(url.path(), "/a/b/c d");
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`] maps path templates (`/users/{id}`, `/files/{p+}`) to
//! resources with deterministic precedence:
//!
//! ```
//! use ruri::Router;
//!
//! # fn main() -> ruri::Result<()> {
//! let mut router = Router::new();
//! router.insert("/users/{id}", "user")?;
//! let m = router.find("/users/42")?;
//! assert_eq!(m.params.get("id"), Some("42"));
//! # Ok(())
//! # }
//! ```
//!
//! Neither type is internally synchronized: values may be shared freely
//! for reads, and mutation requires exclusive access. All work is CPU
//! and local memory; nothing blocks.

#![cfg_attr(not(feature = "std"), no_std)]

// The whole crate allocates through `alloc`, so `std` and `no_std`
// builds share one set of imports.
extern crate alloc;

// Internal modules (not public API)
mod charset;
mod encoding;
mod error;
mod ipv4;
mod ipv6;
mod normalize;
mod params;
mod parser;
mod parts;
mod resolve;
mod router;
mod segments;
mod url;
mod url_base;
mod view;

// Public API
pub use charset::{
    AllowedSet, FRAGMENT_CHARS, HOST_CHARS, PASS_CHARS, PATH_CHARS, QUERY_CHARS, USER_CHARS,
};
pub use encoding::{
    EncodeOpts, decode, decode_to_string, decode_unchecked, encode, encode_to_string,
    encoded_size, re_encode, re_encoded_size, validate,
};
pub use error::{Error, Result};
pub use ipv4::{parse_ipv4, serialize_ipv4};
pub use ipv6::{parse_ipv6, serialize_ipv6};
pub use params::{DecodedParams, Param, Params, ParamsMut};
pub use parts::{HostType, SchemeKind};
pub use router::{RouteMatch, RouteParams, Router};
pub use segments::{DecodedSegments, Segments, SegmentsMut};
pub use url::Url;
pub use url_base::UrlBase;
pub use view::UrlView;
