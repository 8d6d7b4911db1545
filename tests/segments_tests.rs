#![allow(clippy::unwrap_used, clippy::panic, clippy::expect_used)]

/// Segment-editor tests.
///
/// `check` applies an edit to the URL parsed from `before`, then
/// verifies the path text and the resulting segment sequence.
use ruri::{SegmentsMut, Url, UrlBase};

fn check(f: fn(&mut SegmentsMut<'_>), before: &str, path_after: &str, segs: &[&str]) {
    let mut url = Url::parse(before).unwrap();
    f(&mut url.segments_mut());
    assert_eq!(url.encoded_path(), path_after, "path after edit of {before:?}");
    let got: Vec<&str> = url.encoded_segments().collect();
    assert_eq!(got, segs, "segments after edit of {before:?}");
    assert_eq!(url.segment_count(), segs.len());
}

#[test]
fn test_clear() {
    let f = |ps: &mut SegmentsMut<'_>| ps.clear().unwrap();
    check(f, "", "", &[]);
    check(f, "/", "/", &[]);
    check(f, "/index.htm", "/", &[]);
    check(f, "index.htm", "", &[]);
    check(f, "/path/to/file.txt", "/", &[]);
    check(f, "Program%20Files", "", &[]);
    check(f, "x://y/", "/", &[]);
}

#[test]
fn test_assign() {
    let f = |ps: &mut SegmentsMut<'_>| {
        ps.assign_encoded(["path", "to%23", "file.txt"]).unwrap();
    };
    check(f, "", "path/to%23/file.txt", &["path", "to%23", "file.txt"]);
    check(f, "/", "/path/to%23/file.txt", &["path", "to%23", "file.txt"]);
    check(f, "/index.htm", "/path/to%23/file.txt", &["path", "to%23", "file.txt"]);
    check(f, "index.htm", "path/to%23/file.txt", &["path", "to%23", "file.txt"]);
}

#[test]
fn test_assign_plain_encodes() {
    let f = |ps: &mut SegmentsMut<'_>| {
        ps.assign(["path", "to#", "file.txt?"]).unwrap();
    };
    check(f, "/x", "/path/to%23/file.txt%3F", &["path", "to%23", "file.txt%3F"]);
}

#[test]
fn test_insert_empty_segment_at_front() {
    let f = |ps: &mut SegmentsMut<'_>| ps.insert(0, "").unwrap();
    check(f, "", "./", &[""]);
    check(f, "/", "/./", &[""]);
    check(f, "/index.htm", "/.//index.htm", &["", "index.htm"]);
    check(f, "index.htm", ".//index.htm", &["", "index.htm"]);
    check(f, "path/to/file.txt", ".//path/to/file.txt", &["", "path", "to", "file.txt"]);
    check(f, "/path/to/file.txt", "/.//path/to/file.txt", &["", "path", "to", "file.txt"]);
    check(f, "x:", "./", &[""]);
}

#[test]
fn test_insert_plain_at_front() {
    let f = |ps: &mut SegmentsMut<'_>| ps.insert(0, "my seg#").unwrap();
    check(f, "", "my%20seg%23", &["my%20seg%23"]);
    check(f, "/", "/my%20seg%23", &["my%20seg%23"]);
    check(f, "/index.htm", "/my%20seg%23/index.htm", &["my%20seg%23", "index.htm"]);
    check(f, "index.htm", "my%20seg%23/index.htm", &["my%20seg%23", "index.htm"]);
}

#[test]
fn test_insert_in_middle() {
    let f = |ps: &mut SegmentsMut<'_>| ps.insert_encoded(1, "my%20seg").unwrap();
    check(f, "path/to", "path/my%20seg/to", &["path", "my%20seg", "to"]);
    check(f, "/path/to", "/path/my%20seg/to", &["path", "my%20seg", "to"]);
}

#[test]
fn test_erase_first_segment() {
    let f = |ps: &mut SegmentsMut<'_>| ps.erase(0, 1).unwrap();
    check(f, "//x/y/", "/./", &[""]);
    check(f, "/x/", "/./", &[""]);
    check(f, "x/", "./", &[""]);
    check(f, "x:.//", "./", &[""]);
    check(f, "path/to/file.txt", "to/file.txt", &["to", "file.txt"]);
}

#[test]
fn test_erase_middle_and_tail() {
    let f = |ps: &mut SegmentsMut<'_>| ps.erase(1, 2).unwrap();
    check(f, "x://y///", "//", &["", ""]);
    check(f, ".///", ".//", &["", ""]);
    check(f, "/a/b/c", "/a/c", &["a", "c"]);

    let g = |ps: &mut SegmentsMut<'_>| ps.erase(1, 3).unwrap();
    check(g, "/a/b/c", "/a", &["a"]);
}

#[test]
fn test_replace_first_with_empty() {
    let f = |ps: &mut SegmentsMut<'_>| {
        ps.replace(0, 1, [""]).unwrap();
    };
    check(f, "path/to/file.txt", ".//to/file.txt", &["", "to", "file.txt"]);
    check(f, "/path/to/file.txt", "/.//to/file.txt", &["", "to", "file.txt"]);
}

#[test]
fn test_replace_range_with_fewer() {
    let f = |ps: &mut SegmentsMut<'_>| {
        ps.replace(0, 2, ["the"]).unwrap();
    };
    check(f, "path/to/the/file.txt", "the/the/file.txt", &["the", "the", "file.txt"]);
}

#[test]
fn test_push_back() {
    let f = |ps: &mut SegmentsMut<'_>| ps.push_back("").unwrap();
    check(f, "", "./", &[""]);
    check(f, "/", "/./", &[""]);
    check(f, "./", ".//", &["", ""]);
    check(f, "/./", "/.//", &["", ""]);

    let g = |ps: &mut SegmentsMut<'_>| ps.push_back(":").unwrap();
    check(g, "", "./:", &[":"]);
    check(g, "/", "/:", &[":"]);
}

#[test]
fn test_pop_back() {
    let f = |ps: &mut SegmentsMut<'_>| ps.pop_back().unwrap();
    check(f, ".//", "./", &[""]);
    check(f, "/.//", "/./", &[""]);
    check(f, "x://y//", "/", &[""]);
    check(f, "x://y/.//", "/./", &[""]);
    check(f, "x://y/.///", "/.//", &["", ""]);
    check(f, "/a/b", "/a", &["a"]);
}

#[test]
fn test_segment_count_survives_reparse_forms() {
    // "/" written by an edit carries one segment; a fresh parse of "/"
    // carries none
    let mut url = Url::parse("x://y//").unwrap();
    url.segments_mut().pop_back().unwrap();
    assert_eq!(url.encoded_path(), "/");
    assert_eq!(url.segment_count(), 1);

    let fresh = Url::parse("x://y/").unwrap();
    assert_eq!(fresh.encoded_path(), "/");
    assert_eq!(fresh.segment_count(), 0);
}

#[test]
fn test_decoded_iteration() {
    let url = Url::parse("/a%20b/c%2Fd").unwrap();
    let decoded: Vec<String> = url.segments().collect();
    assert_eq!(decoded, ["a b", "c/d"]);
}

#[test]
fn test_authority_keeps_path_absolute() {
    // inserting at the front of an authority URL cannot make the path
    // relative
    let mut url = Url::parse("x://y/a").unwrap();
    url.segments_mut().insert(0, "b").unwrap();
    assert_eq!(url.encoded_path(), "/b/a");

    let mut url = Url::parse("x://y").unwrap();
    url.segments_mut().push_back("a").unwrap();
    assert_eq!(url.encoded_path(), "/a");
}
