//! Path segment templates: a literal, or a replacement field `{id}` with
//! an optional `?`, `+`, or `*` modifier.

use alloc::string::String;
use alloc::vec::Vec;

use crate::charset::PATH_CHARS;
use crate::encoding::{EncodeOpts, decode_eq, decode_unchecked, validate_in_set};
use crate::error::{Error, Result};

/// Field modifier, in match-precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Modifier {
    /// `{id}`: exactly one segment
    None,
    /// `{id?}`: zero or one segment
    Optional,
    /// `{id+}`: one or more segments
    Plus,
    /// `{id*}`: zero or more segments
    Star,
}

/// One parsed template segment.
#[derive(Debug, Clone)]
pub(crate) struct SegmentTemplate {
    /// Decoded literal text, or the field's identifier
    text: String,
    is_literal: bool,
    modifier: Modifier,
}

impl SegmentTemplate {
    /// The empty literal carried by a trie's root node.
    pub(crate) fn root() -> Self {
        Self {
            text: String::new(),
            is_literal: true,
            modifier: Modifier::None,
        }
    }

    /// Parse one template segment: a replacement field in braces, or a
    /// percent-encoded literal.
    pub(crate) fn parse(seg: &str) -> Result<Self> {
        if let Some(inner) = seg.strip_prefix('{') {
            let inner = inner.strip_suffix('}').ok_or(Error::Syntax)?;
            let (id, modifier) = match inner.as_bytes().last().copied() {
                Some(b'?') => (&inner[..inner.len() - 1], Modifier::Optional),
                Some(b'+') => (&inner[..inner.len() - 1], Modifier::Plus),
                Some(b'*') => (&inner[..inner.len() - 1], Modifier::Star),
                _ => (inner, Modifier::None),
            };
            if !id
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_')
            {
                return Err(Error::Syntax);
            }
            return Ok(Self {
                text: String::from(id),
                is_literal: false,
                modifier,
            });
        }

        let n = validate_in_set(seg.as_bytes(), PATH_CHARS, EncodeOpts::default())?;
        let mut decoded = alloc::vec![0u8; n];
        decode_unchecked(&mut decoded, seg.as_bytes(), EncodeOpts::default());
        Ok(Self {
            text: String::from_utf8(decoded).map_err(|_| Error::Syntax)?,
            is_literal: true,
            modifier: Modifier::None,
        })
    }

    /// Whether one raw request segment satisfies this template.
    /// Fields accept any segment; literals compare decoded.
    pub(crate) fn matches(&self, seg: &str) -> bool {
        if self.is_literal {
            decode_eq(seg.as_bytes(), self.text.as_bytes())
        } else {
            true
        }
    }

    /// The field identifier (empty for literals and anonymous fields).
    pub(crate) fn id(&self) -> &str {
        if self.is_literal { "" } else { &self.text }
    }

    pub(crate) fn is_literal(&self) -> bool {
        self.is_literal
    }

    pub(crate) fn has_modifier(&self) -> bool {
        !self.is_literal && self.modifier != Modifier::None
    }

    pub(crate) fn is_optional(&self) -> bool {
        self.modifier == Modifier::Optional
    }

    pub(crate) fn is_plus(&self) -> bool {
        self.modifier == Modifier::Plus
    }

    pub(crate) fn is_star(&self) -> bool {
        self.modifier == Modifier::Star
    }

    /// Whether the template may match zero request segments.
    pub(crate) fn matches_empty(&self) -> bool {
        self.is_optional() || self.is_star()
    }

    /// Sibling match order: literal, then unique, then `?`, `+`, `*`.
    pub(crate) fn precedence(&self) -> u8 {
        if self.is_literal {
            return 0;
        }
        match self.modifier {
            Modifier::None => 1,
            Modifier::Optional => 2,
            Modifier::Plus => 3,
            Modifier::Star => 4,
        }
    }
}

/// Two templates are the same node key when both are literal with equal
/// text, or both are fields with the same modifier (ids don't matter).
impl PartialEq for SegmentTemplate {
    fn eq(&self, other: &Self) -> bool {
        if self.is_literal != other.is_literal {
            return false;
        }
        if self.is_literal {
            return self.text == other.text;
        }
        self.modifier == other.modifier
    }
}

impl Eq for SegmentTemplate {}

/// Tokenize a template path into segments, ignoring one leading `/`.
pub(crate) fn parse_template_path(path: &str) -> Result<Vec<SegmentTemplate>> {
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() {
        return Ok(Vec::new());
    }
    path.split('/').map(SegmentTemplate::parse).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_literal() {
        let t = SegmentTemplate::parse("users").unwrap();
        assert!(t.is_literal());
        assert!(t.matches("users"));
        assert!(t.matches("user%73"));
        assert!(!t.matches("user"));
        assert_eq!(t.id(), "");
    }

    #[test]
    fn test_parse_fields() {
        let t = SegmentTemplate::parse("{id}").unwrap();
        assert!(!t.is_literal());
        assert!(!t.has_modifier());
        assert_eq!(t.id(), "id");
        assert!(t.matches("anything"));

        assert!(SegmentTemplate::parse("{x?}").unwrap().is_optional());
        assert!(SegmentTemplate::parse("{x+}").unwrap().is_plus());
        assert!(SegmentTemplate::parse("{x*}").unwrap().is_star());
        assert_eq!(SegmentTemplate::parse("{}").unwrap().id(), "");
        assert_eq!(SegmentTemplate::parse("{?}").unwrap().id(), "");
    }

    #[test]
    fn test_parse_rejects() {
        assert!(SegmentTemplate::parse("{unclosed").is_err());
        assert!(SegmentTemplate::parse("{bad id}").is_err());
        assert!(SegmentTemplate::parse("sp ace").is_err());
        assert!(SegmentTemplate::parse("%zz").is_err());
    }

    #[test]
    fn test_equality_ignores_id() {
        let a = SegmentTemplate::parse("{a}").unwrap();
        let b = SegmentTemplate::parse("{b}").unwrap();
        let c = SegmentTemplate::parse("{c?}").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);

        let x = SegmentTemplate::parse("x").unwrap();
        let y = SegmentTemplate::parse("y").unwrap();
        assert_ne!(x, y);
        assert_ne!(x, a);
    }

    #[test]
    fn test_precedence_order() {
        let lit = SegmentTemplate::parse("x").unwrap();
        let unique = SegmentTemplate::parse("{a}").unwrap();
        let opt = SegmentTemplate::parse("{a?}").unwrap();
        let plus = SegmentTemplate::parse("{a+}").unwrap();
        let star = SegmentTemplate::parse("{a*}").unwrap();
        assert!(lit.precedence() < unique.precedence());
        assert!(unique.precedence() < opt.precedence());
        assert!(opt.precedence() < plus.precedence());
        assert!(plus.precedence() < star.precedence());
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(parse_template_path("/").unwrap().len(), 0);
        assert_eq!(parse_template_path("").unwrap().len(), 0);
        assert_eq!(parse_template_path("/a/b").unwrap().len(), 2);
        assert_eq!(parse_template_path("a//b").unwrap().len(), 3);
        assert_eq!(parse_template_path("/users/{id}").unwrap().len(), 2);
    }
}
