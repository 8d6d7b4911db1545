//! Query parameter views and the parameter editor.
//!
//! The query splits on `&`; each parameter splits at its first `=`. A
//! parameter with no `=` has no value, distinct from an empty one. The
//! part table's parameter count is authoritative: a lone `?` is one
//! empty parameter, and writing an empty parameter list removes the `?`
//! itself.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::charset::QUERY_PARAM_CHARS;
use crate::encoding::{
    EncodeOpts, decode_eq, decode_to_string, decoded_size, encode_append, validate_in_set,
};
use crate::error::Result;
use crate::parts::Part;
use crate::url::Url;

/// One raw query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param<'a> {
    pub key: &'a str,
    /// `None` for `k`, `Some("")` for `k=`
    pub value: Option<&'a str>,
}

/// Iterator over a query's raw parameters.
#[derive(Debug, Clone)]
pub struct Params<'a> {
    content: &'a str,
    pos: usize,
    remaining: usize,
}

impl<'a> Params<'a> {
    /// `content` is the query text without its `?`.
    pub(crate) fn new(content: &'a str, nparam: usize) -> Self {
        Self {
            content,
            pos: 0,
            remaining: nparam,
        }
    }

    pub fn len(&self) -> usize {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }
}

impl<'a> Iterator for Params<'a> {
    type Item = Param<'a>;

    fn next(&mut self) -> Option<Param<'a>> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let bytes = self.content.as_bytes();
        let end = self.pos
            + memchr::memchr(b'&', &bytes[self.pos..]).unwrap_or(bytes.len() - self.pos);
        let pair = &self.content[self.pos..end];
        self.pos = end + 1;
        Some(match pair.split_once('=') {
            Some((k, v)) => Param {
                key: k,
                value: Some(v),
            },
            None => Param {
                key: pair,
                value: None,
            },
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Params<'_> {}

/// Decoding iterator over query parameters; `+` decodes as a space.
#[derive(Debug, Clone)]
pub struct DecodedParams<'a> {
    inner: Params<'a>,
}

impl<'a> DecodedParams<'a> {
    pub(crate) fn new(inner: Params<'a>) -> Self {
        Self { inner }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

fn decode_component(s: &str) -> String {
    let opts = EncodeOpts {
        plus_to_space: true,
        ..EncodeOpts::default()
    };
    decode_to_string(s, opts).unwrap_or_default()
}

impl Iterator for DecodedParams<'_> {
    type Item = (String, Option<String>);

    fn next(&mut self) -> Option<Self::Item> {
        let p = self.inner.next()?;
        Some((decode_component(p.key), p.value.map(decode_component)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for DecodedParams<'_> {}

/// Mutable view over a URL's query parameters.
#[derive(Debug)]
pub struct ParamsMut<'u> {
    url: &'u mut Url,
}

impl<'u> ParamsMut<'u> {
    pub(crate) fn new(url: &'u mut Url) -> Self {
        Self { url }
    }

    pub fn len(&self) -> usize {
        self.url.tab.nparam as usize
    }

    pub fn is_empty(&self) -> bool {
        self.url.tab.nparam == 0
    }

    /// First value for `key`, decoded. `Some(None)` is a valueless key.
    pub fn get(&self, key: &str) -> Option<Option<String>> {
        self.raw_params()
            .into_iter()
            .find(|p| raw_key_eq(p, key))
            .map(|p| split_value(&p).map(|v| decode_component(v)))
    }

    /// All values for `key`, decoded.
    pub fn get_all(&self, key: &str) -> Vec<Option<String>> {
        self.raw_params()
            .into_iter()
            .filter(|p| raw_key_eq(p, key))
            .map(|p| split_value(&p).map(|v| decode_component(v)))
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.raw_params().into_iter().any(|p| raw_key_eq(&p, key))
    }

    /// Remove every parameter, and the `?` with them.
    pub fn clear(&mut self) -> Result<()> {
        let n = self.len();
        self.splice(0, n, Vec::new())
    }

    /// Replace all parameters with `pairs`.
    pub fn assign<'s>(
        &mut self,
        pairs: impl IntoIterator<Item = (&'s str, Option<&'s str>)>,
    ) -> Result<()> {
        let enc = pairs.into_iter().map(encode_pair).collect();
        let n = self.len();
        self.splice(0, n, enc)
    }

    /// Append one parameter.
    pub fn append(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        let n = self.len();
        self.splice(n, n, alloc::vec![encode_pair((key, value))])
    }

    /// Append one parameter from already-encoded text.
    pub fn append_encoded(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        let n = self.len();
        let pair = validate_pair(key, value)?;
        self.splice(n, n, alloc::vec![pair])
    }

    /// Insert one parameter before position `at`.
    pub fn insert(&mut self, at: usize, key: &str, value: Option<&str>) -> Result<()> {
        self.splice(at, at, alloc::vec![encode_pair((key, value))])
    }

    /// Erase the parameters in `[from, to)`.
    pub fn erase(&mut self, from: usize, to: usize) -> Result<()> {
        self.splice(from, to, Vec::new())
    }

    /// Set `key` to one value: the first occurrence is replaced, the
    /// rest are dropped, and a missing key is appended.
    pub fn set(&mut self, key: &str, value: Option<&str>) -> Result<()> {
        let mut list = self.raw_params();
        let mut found = false;
        list.retain(|p| {
            if !raw_key_eq(p, key) {
                return true;
            }
            if found {
                return false;
            }
            found = true;
            true
        });
        let pair = encode_pair((key, value));
        match list.iter().position(|p| raw_key_eq(p, key)) {
            Some(i) => list[i] = pair,
            None => list.push(pair),
        }
        self.write_list(list)
    }

    /// Remove every parameter matching `key`; returns how many.
    pub fn remove(&mut self, key: &str) -> Result<usize> {
        let mut list = self.raw_params();
        let before = list.len();
        list.retain(|p| !raw_key_eq(p, key));
        let removed = before - list.len();
        self.write_list(list)?;
        Ok(removed)
    }

    /// Replace parameters `[from, to)` with freshly encoded `pairs`.
    fn splice(
        &mut self,
        from: usize,
        to: usize,
        pairs: Vec<String>,
    ) -> Result<()> {
        let mut list = self.raw_params();
        debug_assert!(from <= to && to <= list.len());
        list.splice(from..to, pairs);
        self.write_list(list)
    }

    /// Current raw parameter texts (`k=v` or `k`).
    fn raw_params(&self) -> Vec<String> {
        let content = self.url.tab.content(&self.url.buf, Part::Query);
        let content = core::str::from_utf8(content).unwrap_or("");
        Params::new(content, self.url.tab.nparam as usize)
            .map(|p| match p.value {
                Some(v) => {
                    let mut s = String::with_capacity(p.key.len() + 1 + v.len());
                    s.push_str(p.key);
                    s.push('=');
                    s.push_str(v);
                    s
                }
                None => p.key.to_string(),
            })
            .collect()
    }

    fn write_list(&mut self, list: Vec<String>) -> Result<()> {
        if list.is_empty() {
            self.url.shrink_parts(Part::Query, Part::Fragment as usize, 0);
            self.url.tab.nparam = 0;
            self.url.tab.set_decoded(Part::Query, 0);
            self.url.check_invariants();
            return Ok(());
        }
        let mut content = Vec::with_capacity(1 + list.iter().map(|p| p.len() + 1).sum::<usize>());
        content.push(b'?');
        for (i, pair) in list.iter().enumerate() {
            if i > 0 {
                content.push(b'&');
            }
            content.extend_from_slice(pair.as_bytes());
        }
        self.url
            .write_parts(Part::Query, Part::Fragment as usize, &content)?;
        self.url.tab.nparam = list.len() as u32;
        let dec = decoded_size(&content[1..]);
        self.url.tab.set_decoded(Part::Query, dec);
        self.url.check_invariants();
        Ok(())
    }
}

/// Raw parameter key equality against a plain-text key.
fn raw_key_eq(raw_pair: &str, key: &str) -> bool {
    let raw_key = match raw_pair.split_once('=') {
        Some((k, _)) => k,
        None => raw_pair,
    };
    decode_eq(raw_key.as_bytes(), key.as_bytes())
}

fn split_value(raw_pair: &str) -> Option<&str> {
    raw_pair.split_once('=').map(|(_, v)| v)
}

fn encode_pair((key, value): (&str, Option<&str>)) -> String {
    let mut out = Vec::new();
    encode_append(&mut out, key.as_bytes(), QUERY_PARAM_CHARS, EncodeOpts::default());
    if let Some(v) = value {
        out.push(b'=');
        encode_append(&mut out, v.as_bytes(), QUERY_PARAM_CHARS, EncodeOpts::default());
    }
    String::from_utf8(out).unwrap_or_default()
}

fn validate_pair(key: &str, value: Option<&str>) -> Result<String> {
    validate_in_set(key.as_bytes(), QUERY_PARAM_CHARS, EncodeOpts::default())?;
    let mut out = String::from(key);
    if let Some(v) = value {
        validate_in_set(v.as_bytes(), QUERY_PARAM_CHARS, EncodeOpts::default())?;
        out.push('=');
        out.push_str(v);
    }
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::url_base::UrlBase;

    #[test]
    fn test_iterate() {
        let url = Url::parse("http://h/?a=1&b&c=").unwrap();
        let params: Vec<Param<'_>> = url.encoded_params().collect();
        assert_eq!(params.len(), 3);
        assert_eq!(params[0], Param { key: "a", value: Some("1") });
        assert_eq!(params[1], Param { key: "b", value: None });
        assert_eq!(params[2], Param { key: "c", value: Some("") });
    }

    #[test]
    fn test_lone_question_mark_is_one_empty_param() {
        let url = Url::parse("http://h/?").unwrap();
        let params: Vec<Param<'_>> = url.encoded_params().collect();
        assert_eq!(params, [Param { key: "", value: None }]);
    }

    #[test]
    fn test_append_and_serialize() {
        let mut url = Url::parse("http://h/").unwrap();
        url.params_mut().append("k", Some("v 1")).unwrap();
        url.params_mut().append("flag", None).unwrap();
        assert_eq!(url.as_str(), "http://h/?k=v%201&flag");
        assert_eq!(url.param_count(), 2);
    }

    #[test]
    fn test_separators_are_encoded_inside_values() {
        let mut url = Url::parse("http://h/").unwrap();
        url.params_mut().append("a&b", Some("c=d+e")).unwrap();
        assert_eq!(url.as_str(), "http://h/?a%26b=c%3Dd%2Be");
        let decoded: Vec<(String, Option<String>)> = url.params().collect();
        assert_eq!(decoded, [("a&b".into(), Some("c=d+e".into()))]);
    }

    #[test]
    fn test_set_and_remove() {
        let mut url = Url::parse("http://h/?a=1&b=2&a=3").unwrap();
        url.params_mut().set("a", Some("9")).unwrap();
        assert_eq!(url.as_str(), "http://h/?a=9&b=2");

        let removed = url.params_mut().remove("a").unwrap();
        assert_eq!(removed, 1);
        assert_eq!(url.as_str(), "http://h/?b=2");

        url.params_mut().set("c", None).unwrap();
        assert_eq!(url.as_str(), "http://h/?b=2&c");
    }

    #[test]
    fn test_clear_removes_question_mark() {
        let mut url = Url::parse("http://h/?a=1").unwrap();
        url.params_mut().clear().unwrap();
        assert_eq!(url.as_str(), "http://h/");
        assert_eq!(url.param_count(), 0);
    }

    #[test]
    fn test_insert_and_erase() {
        let mut url = Url::parse("http://h/?a=1&c=3").unwrap();
        url.params_mut().insert(1, "b", Some("2")).unwrap();
        assert_eq!(url.as_str(), "http://h/?a=1&b=2&c=3");
        url.params_mut().erase(0, 2).unwrap();
        assert_eq!(url.as_str(), "http://h/?c=3");
    }

    #[test]
    fn test_get_and_contains() {
        let mut url = Url::parse("http://h/?k%20x=1&k%20x=2&f").unwrap();
        let pm = url.params_mut();
        assert_eq!(pm.get("k x"), Some(Some("1".to_string())));
        assert_eq!(pm.get_all("k x").len(), 2);
        assert_eq!(pm.get("f"), Some(None));
        assert!(pm.contains("f"));
        assert!(!pm.contains("zz"));
    }

    #[test]
    fn test_plus_decodes_as_space_in_params() {
        let url = Url::parse("http://h/?q=a+b").unwrap();
        let decoded: Vec<(String, Option<String>)> = url.params().collect();
        assert_eq!(decoded, [("q".into(), Some("a b".into()))]);
    }
}
