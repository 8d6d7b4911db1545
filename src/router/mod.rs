//! Path-template router: an arena trie of segment templates with a
//! nondeterministic matcher.
//!
//! Templates are `/`-separated segments, each a literal or a field
//! (`{id}`, `{id?}`, `{id+}`, `{id*}`). Sibling order is deterministic:
//! literal, then unmodified field, then `?`, `+`, `*`.
//!
//! The matcher recurses only where more than one child could accept the
//! next segment; depth is bounded by the request path's segment count
//! plus the trie depth, roughly one hundred bytes of stack per level.
//! Callers routing untrusted, deeply nested paths should bound the
//! segment count before matching.

mod template;

use alloc::vec;
use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::parser::validate_path_text;
use crate::segments::{Segments, count_segments, path_prefix};
use template::{SegmentTemplate, parse_template_path};

struct Node<T> {
    seg: SegmentTemplate,
    parent: usize,
    children: Vec<usize>,
    resource: Option<T>,
}

/// A router mapping path templates to resources.
///
/// Like the URL engine, a router is freely shareable for concurrent
/// matching; insertion requires exclusive access.
pub struct Router<T> {
    nodes: Vec<Node<T>>,
}

/// `(node, span lo, span hi)` of one matched field.
type Binding = (usize, usize, usize);

/// A successful match: the resource and its field bindings.
#[derive(Debug)]
pub struct RouteMatch<'r, 'p, T> {
    /// The matched route's resource.
    pub value: &'r T,
    /// Field bindings in match order.
    pub params: RouteParams<'r, 'p>,
}

/// Ordered field bindings from a match; values are the raw
/// percent-encoded spans of the request path.
#[derive(Debug, Clone, Default)]
pub struct RouteParams<'r, 'p> {
    items: Vec<(&'r str, &'p str)>,
}

impl<'r, 'p> RouteParams<'r, 'p> {
    /// Value bound to the first field with the given id.
    pub fn get(&self, id: &str) -> Option<&'p str> {
        self.items
            .iter()
            .find(|(k, _)| *k == id)
            .map(|&(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'r str, &'p str)> + '_ {
        self.items.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                seg: SegmentTemplate::root(),
                parent: 0,
                children: Vec::new(),
                resource: None,
            }],
        }
    }

    /// Insert a template path, overwriting the resource of an existing
    /// identical route.
    ///
    /// `.` segments are skipped and `..` walks up one level, discarding
    /// a just-created empty leaf. A template that ends above the root
    /// fails with [`Error::InvalidArgument`] and leaves the router
    /// untouched.
    pub fn insert(&mut self, template: &str, resource: T) -> Result<()> {
        let segs = parse_template_path(template)?;

        let committed = self.nodes.len();
        let mut touched_parents: Vec<usize> = Vec::new();
        let mut cur = 0;
        let mut level: i32 = 0;

        for seg in &segs {
            if is_dot(seg) {
                continue;
            }
            if is_dot_dot(seg) {
                // below-root excursions only count levels
                if level > 0 || cur == 0 {
                    level -= 1;
                    continue;
                }
                let parent = self.nodes[cur].parent;
                if cur == self.nodes.len() - 1
                    && self.nodes[cur].resource.is_none()
                    && self.nodes[cur].children.is_empty()
                {
                    // discard the leaf this insertion just created
                    self.nodes[parent].children.retain(|&c| c != cur);
                    self.nodes.pop();
                }
                cur = parent;
                continue;
            }
            if level < 0 {
                level += 1;
                continue;
            }

            let existing = self.nodes[cur]
                .children
                .iter()
                .copied()
                .find(|&ci| self.nodes[ci].seg == *seg);
            match existing {
                Some(ci) => cur = ci,
                None => {
                    let idx = self.nodes.len();
                    self.nodes.push(Node {
                        seg: seg.clone(),
                        parent: cur,
                        children: Vec::new(),
                        resource: None,
                    });
                    let at = self.nodes[cur]
                        .children
                        .iter()
                        .position(|&ci| {
                            self.nodes[ci].seg.precedence() > seg.precedence()
                        })
                        .unwrap_or(self.nodes[cur].children.len());
                    self.nodes[cur].children.insert(at, idx);
                    if cur < committed {
                        touched_parents.push(cur);
                    }
                    cur = idx;
                }
            }
        }

        if level != 0 {
            // roll back: drop new nodes and unlink them from old parents
            for p in touched_parents {
                self.nodes[p].children.retain(|&c| c < committed);
            }
            self.nodes.truncate(committed);
            return Err(Error::InvalidArgument);
        }

        self.nodes[cur].resource = Some(resource);
        Ok(())
    }

    /// Match a request path, returning the resource and field bindings,
    /// or [`Error::Mismatch`].
    pub fn find<'r, 'p>(&'r self, path: &'p str) -> Result<RouteMatch<'r, 'p, T>> {
        validate_path_text(path.as_bytes())?;
        let nseg = count_segments(path.as_bytes());
        let segs: Vec<&str> = Segments::new(path, nseg).collect();

        let mut starts = Vec::with_capacity(segs.len());
        let mut pos = path_prefix(path.as_bytes());
        for s in &segs {
            starts.push(pos);
            pos += s.len() + 1;
        }

        let mut binds: Vec<Binding> = Vec::new();
        let found = self.try_match(&segs, &starts, path.len(), 0, 0, 0, &mut binds);
        let Some(node) = found else {
            return Err(Error::Mismatch);
        };
        let Some(value) = self.nodes[node].resource.as_ref() else {
            return Err(Error::Mismatch);
        };

        let items = binds
            .iter()
            .map(|&(ni, lo, hi)| (self.nodes[ni].seg.id(), &path[lo..hi]))
            .collect();
        Ok(RouteMatch {
            value,
            params: RouteParams { items },
        })
    }

    /// The NFA evaluator. Consumes request segments from `it`, walking
    /// the trie from `cur`; recursion happens only where more than one
    /// child could accept the segment, or a modifier child must try
    /// several span lengths (longest first).
    #[allow(clippy::too_many_arguments)]
    fn try_match(
        &self,
        segs: &[&str],
        starts: &[usize],
        path_len: usize,
        mut it: usize,
        mut cur: usize,
        mut level: i32,
        binds: &mut Vec<Binding>,
    ) -> Option<usize> {
        while it < segs.len() {
            let s = segs[it];
            if s == "." {
                it += 1;
                continue;
            }
            if s == ".." {
                if level > 0 || cur == 0 {
                    level -= 1;
                } else {
                    cur = self.nodes[cur].parent;
                }
                it += 1;
                continue;
            }
            if level < 0 {
                level += 1;
                it += 1;
                continue;
            }

            // branch iff more than one child could accept `s`
            let children = &self.nodes[cur].children;
            let mut branch = false;
            if children.len() > 1 {
                let mut lower_bound = 0;
                for &ci in children {
                    let c = &self.nodes[ci].seg;
                    if c.is_literal() || !c.has_modifier() {
                        lower_bound += i32::from(c.matches(s));
                    } else {
                        lower_bound = 2;
                    }
                    if lower_bound > 1 {
                        branch = true;
                        break;
                    }
                }
            }

            let span_end = starts[it] + s.len();
            let mut consumed_inline = false;
            let mut found = None;
            for &ci in children {
                let c = &self.nodes[ci].seg;
                if !c.matches(s) {
                    continue;
                }
                if c.is_literal() || !c.has_modifier() {
                    if branch {
                        let mark = binds.len();
                        if !c.is_literal() {
                            binds.push((ci, starts[it], span_end));
                        }
                        if let Some(r) =
                            self.try_match(segs, starts, path_len, it + 1, ci, level, binds)
                        {
                            found = Some(r);
                            break;
                        }
                        binds.truncate(mark);
                    } else {
                        if !c.is_literal() {
                            binds.push((ci, starts[it], span_end));
                        }
                        cur = ci;
                        consumed_inline = true;
                        break;
                    }
                } else if c.is_optional() {
                    // consuming the segment is the longest match: first
                    let mark = binds.len();
                    binds.push((ci, starts[it], span_end));
                    if let Some(r) =
                        self.try_match(segs, starts, path_len, it + 1, ci, level, binds)
                    {
                        found = Some(r);
                        break;
                    }
                    binds.truncate(mark);
                    binds.push((ci, starts[it], starts[it]));
                    if let Some(r) = self.try_match(segs, starts, path_len, it, ci, level, binds)
                    {
                        found = Some(r);
                        break;
                    }
                    binds.truncate(mark);
                } else {
                    // {+} and {*}: try every span, longest first; {+}
                    // must consume at least one segment
                    let shortest = if self.nodes[ci].seg.is_plus() {
                        it + 1
                    } else {
                        it
                    };
                    for rest in (shortest..=segs.len()).rev() {
                        let mark = binds.len();
                        let span = if rest > it {
                            (starts[it], starts[rest - 1] + segs[rest - 1].len())
                        } else {
                            (starts[it], starts[it])
                        };
                        binds.push((ci, span.0, span.1));
                        if let Some(r) =
                            self.try_match(segs, starts, path_len, rest, ci, level, binds)
                        {
                            found = Some(r);
                            break;
                        }
                        binds.truncate(mark);
                    }
                    if found.is_some() {
                        break;
                    }
                }
            }
            if let Some(r) = found {
                return Some(r);
            }
            if !consumed_inline {
                level += 1;
            }
            it += 1;
        }

        if level != 0 {
            // the path ended above or below every inserted route
            return None;
        }
        if self.nodes[cur].resource.is_some() {
            return Some(cur);
        }
        // the input is exhausted; a resource may still be reachable
        // through children that can match nothing
        self.descend_empty(cur, path_len, binds)
    }

    /// Final zero-consumption descent through `?` and `*` children.
    fn descend_empty(
        &self,
        cur: usize,
        path_len: usize,
        binds: &mut Vec<Binding>,
    ) -> Option<usize> {
        for &ci in &self.nodes[cur].children {
            if !self.nodes[ci].seg.matches_empty() {
                continue;
            }
            let mark = binds.len();
            binds.push((ci, path_len, path_len));
            if self.nodes[ci].resource.is_some() {
                return Some(ci);
            }
            if let Some(r) = self.descend_empty(ci, path_len, binds) {
                return Some(r);
            }
            binds.truncate(mark);
        }
        None
    }
}

fn is_dot(seg: &SegmentTemplate) -> bool {
    seg.is_literal() && seg.matches(".")
}

fn is_dot_dot(seg: &SegmentTemplate) -> bool {
    seg.is_literal() && seg.matches("..")
}

impl<T: core::fmt::Debug> core::fmt::Debug for Router<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (i, n) in self.nodes.iter().enumerate() {
            map.entry(&i, &(n.parent, &n.children, &n.resource));
        }
        map.finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_routes() {
        let mut r = Router::new();
        r.insert("/", "root").unwrap();
        r.insert("/users", "users").unwrap();
        r.insert("/users/all", "all").unwrap();

        assert_eq!(*r.find("/").unwrap().value, "root");
        assert_eq!(*r.find("/users").unwrap().value, "users");
        assert_eq!(*r.find("/users/all").unwrap().value, "all");
        assert_eq!(r.find("/nope").unwrap_err(), Error::Mismatch);
        assert_eq!(r.find("/users/42").unwrap_err(), Error::Mismatch);
    }

    #[test]
    fn test_literal_beats_field() {
        let mut r = Router::new();
        r.insert("/users/{id}", "field").unwrap();
        r.insert("/users/me", "lit").unwrap();

        let m = r.find("/users/me").unwrap();
        assert_eq!(*m.value, "lit");
        assert!(m.params.is_empty());

        let m = r.find("/users/42").unwrap();
        assert_eq!(*m.value, "field");
        assert_eq!(m.params.get("id"), Some("42"));
    }

    #[test]
    fn test_plus_binds_whole_span() {
        let mut r = Router::new();
        r.insert("/files/{p+}", "files").unwrap();

        let m = r.find("/files/a/b/c").unwrap();
        assert_eq!(*m.value, "files");
        assert_eq!(m.params.get("p"), Some("a/b/c"));

        assert_eq!(r.find("/files").unwrap_err(), Error::Mismatch);
    }

    #[test]
    fn test_star_matches_zero() {
        let mut r = Router::new();
        r.insert("/docs/{rest*}", "docs").unwrap();

        assert_eq!(r.find("/docs/a/b").unwrap().params.get("rest"), Some("a/b"));
        let m = r.find("/docs").unwrap();
        assert_eq!(*m.value, "docs");
        assert_eq!(m.params.get("rest"), Some(""));
    }

    #[test]
    fn test_optional() {
        let mut r = Router::new();
        r.insert("/user/{id?}", "user").unwrap();

        assert_eq!(r.find("/user/7").unwrap().params.get("id"), Some("7"));
        assert_eq!(r.find("/user").unwrap().params.get("id"), Some(""));
        assert_eq!(r.find("/user/7/x").unwrap_err(), Error::Mismatch);
    }

    #[test]
    fn test_greedy_then_backtrack() {
        let mut r = Router::new();
        r.insert("/{a+}/end", "x").unwrap();

        let m = r.find("/p/q/end").unwrap();
        assert_eq!(m.params.get("a"), Some("p/q"));
        assert_eq!(r.find("/p/q").unwrap_err(), Error::Mismatch);
    }

    #[test]
    fn test_branch_order_is_deterministic() {
        let mut r = Router::new();
        r.insert("/x/{v*}", "star").unwrap();
        r.insert("/x/{v+}", "plus").unwrap();
        r.insert("/x/{v?}", "opt").unwrap();
        r.insert("/x/{v}", "unique").unwrap();
        r.insert("/x/lit", "lit").unwrap();

        assert_eq!(*r.find("/x/lit").unwrap().value, "lit");
        assert_eq!(*r.find("/x/other").unwrap().value, "unique");
        assert_eq!(*r.find("/x").unwrap().value, "opt");
        assert_eq!(*r.find("/x/a/b").unwrap().value, "plus");
    }

    #[test]
    fn test_dot_segments_in_template_and_request() {
        let mut r = Router::new();
        r.insert("/a/./b", "ab").unwrap();
        assert_eq!(*r.find("/a/b").unwrap().value, "ab");
        assert_eq!(*r.find("/a/./b").unwrap().value, "ab");
        assert_eq!(*r.find("/a/x/../b").unwrap().value, "ab");

        let mut r = Router::new();
        r.insert("/a/b/../c", "ac").unwrap();
        assert_eq!(*r.find("/a/c").unwrap().value, "ac");
        assert_eq!(r.find("/a/b/c").unwrap_err(), Error::Mismatch);
    }

    #[test]
    fn test_dotdot_above_root_insertion() {
        // ending below the root is an error, and nothing is left behind
        let mut r: Router<&str> = Router::new();
        assert_eq!(
            r.insert("/../../b", "x").unwrap_err(),
            Error::InvalidArgument
        );
        assert_eq!(r.find("/b").unwrap_err(), Error::Mismatch);
        assert_eq!(r.find("/").unwrap_err(), Error::Mismatch);

        // a matched excursion recovers: segments spent below the root
        // restore the level and the resource lands on the root
        let mut r = Router::new();
        r.insert("/a/../../b", "root").unwrap();
        assert_eq!(*r.find("/").unwrap().value, "root");
        // the "a" leaf was discarded on the way back up
        assert_eq!(r.find("/a").unwrap_err(), Error::Mismatch);
    }

    #[test]
    fn test_duplicate_insert_overwrites() {
        let mut r = Router::new();
        r.insert("/u/{a}", 1).unwrap();
        r.insert("/u/{b}", 2).unwrap();
        assert_eq!(*r.find("/u/x").unwrap().value, 2);
        assert_eq!(r.find("/u/x").unwrap().params.get("a"), Some("x"));
    }

    #[test]
    fn test_percent_encoded_literals() {
        let mut r = Router::new();
        r.insert("/caf%C3%A9", "cafe").unwrap();
        assert_eq!(*r.find("/caf%C3%A9").unwrap().value, "cafe");

        let mut r = Router::new();
        r.insert("/a%20b", "sp").unwrap();
        assert_eq!(*r.find("/a%20b").unwrap().value, "sp");
        assert_eq!(r.find("/a%20c").unwrap_err(), Error::Mismatch);
    }

    #[test]
    fn test_bindings_are_raw() {
        let mut r = Router::new();
        r.insert("/f/{name}", "f").unwrap();
        assert_eq!(r.find("/f/a%20b").unwrap().params.get("name"), Some("a%20b"));
    }

    #[test]
    fn test_invalid_request_path() {
        let r: Router<&str> = Router::new();
        assert!(r.find("/a b").is_err());
        assert!(r.find("/%zz").is_err());
    }
}
