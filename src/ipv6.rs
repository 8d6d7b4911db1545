/// IPv6 address parsing and printing per RFC 4291 text forms,
/// including `::` contraction and a trailing embedded IPv4 address.
use alloc::string::String;
use alloc::vec::Vec;
use crate::error::{Error, Result};
use crate::ipv4::parse_ipv4;
use core::fmt::Write;

/// Parse an IPv6 address, with or without the `[` `]` wrapping used in
/// URL authorities. Returns the 16-byte address.
pub fn parse_ipv6(input: &str) -> Result<[u8; 16]> {
    let input = match input.strip_prefix('[') {
        Some(rest) => rest.strip_suffix(']').ok_or(Error::Syntax)?,
        None => input,
    };

    // Zone identifiers (RFC 6874) are not part of the URL grammar.
    if input.contains('%') {
        return Err(Error::Syntax);
    }

    // Trailing embedded IPv4 (e.g. "::FFFF:1.2.3.4")
    let has_embedded_ipv4 = input
        .rfind(':')
        .is_some_and(|pos| input[pos + 1..].contains('.'));

    let groups = if has_embedded_ipv4 {
        parse_groups_with_ipv4(input)?
    } else {
        parse_groups(input)?
    };

    let mut addr = [0u8; 16];
    for (i, g) in groups.iter().enumerate() {
        addr[2 * i] = (g >> 8) as u8;
        addr[2 * i + 1] = (g & 0xFF) as u8;
    }
    Ok(addr)
}

/// Parse a pure hex-group address (no embedded IPv4).
fn parse_groups(input: &str) -> Result<[u16; 8]> {
    let mut groups = [0u16; 8];

    let Some(contraction) = input.find("::") else {
        // No :: contraction: exactly 8 groups required
        let parsed = parse_group_list(input)?;
        if parsed.len() != 8 {
            return Err(Error::Syntax);
        }
        groups.copy_from_slice(&parsed);
        return Ok(groups);
    };

    let before = parse_group_list(&input[..contraction])?;
    let after = parse_group_list(&input[contraction + 2..])?;

    // At least one group must be elided by the contraction
    let total = before.len() + after.len();
    if total > 7 {
        return Err(Error::Syntax);
    }

    fill_around_contraction(&mut groups, &before, &after, 8);
    Ok(groups)
}

/// Parse hex groups followed by a dotted-quad tail filling the last two.
fn parse_groups_with_ipv4(input: &str) -> Result<[u16; 8]> {
    let last_colon = input.rfind(':').ok_or(Error::Syntax)?;
    let mut head = &input[..last_colon];
    let tail = &input[last_colon + 1..];

    // When the byte before the tail separator is also ':', the separator
    // is the second half of a contraction; keep it with the head.
    if head.ends_with(':') {
        head = &input[..last_colon + 1];
    }

    let v4 = parse_ipv4(tail)?;
    let mut groups = [0u16; 8];
    groups[6] = (u16::from(v4[0]) << 8) | u16::from(v4[1]);
    groups[7] = (u16::from(v4[2]) << 8) | u16::from(v4[3]);

    // A bare ":" head would mean the input began ":1.2.3.4"
    if head.is_empty() || head == ":" {
        return Err(Error::Syntax);
    }

    if let Some(contraction) = head.find("::") {
        let before = parse_group_list(&head[..contraction])?;
        let after = parse_group_list(&head[contraction + 2..])?;
        if before.len() + after.len() > 5 {
            return Err(Error::Syntax);
        }
        fill_around_contraction(&mut groups, &before, &after, 6);
    } else {
        // No contraction: exactly 6 hex groups before the IPv4 tail
        let parsed = parse_group_list(head)?;
        if parsed.len() != 6 {
            return Err(Error::Syntax);
        }
        groups[..6].copy_from_slice(&parsed);
    }

    Ok(groups)
}

/// Place `before` at the front and `after` flush against `width`.
fn fill_around_contraction(groups: &mut [u16; 8], before: &[u16], after: &[u16], width: usize) {
    groups[..before.len()].copy_from_slice(before);
    let after_start = width - after.len();
    groups[after_start..width].copy_from_slice(after);
}

/// Parse one `h16` group: 1-4 hex digits.
fn parse_group(s: &str) -> Result<u16> {
    if s.is_empty() || s.len() > 4 {
        return Err(Error::Syntax);
    }
    u16::from_str_radix(s, 16).map_err(|_| Error::Syntax)
}

/// Parse colon-separated hex groups; empty input is an empty list.
fn parse_group_list(s: &str) -> Result<Vec<u16>> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(':').map(parse_group).collect()
}

/// Print an IPv6 address in bracketed canonical form, compressing the
/// longest zero run.
pub fn serialize_ipv6(addr: &[u8; 16]) -> String {
    let mut groups = [0u16; 8];
    for (i, g) in groups.iter_mut().enumerate() {
        *g = (u16::from(addr[2 * i]) << 8) | u16::from(addr[2 * i + 1]);
    }

    let (compress_start, compress_len) = find_longest_zero_run(&groups);

    let mut result = String::with_capacity(41);
    result.push('[');

    // Only runs of 2+ zero groups are compressed
    let compress_range = compress_start
        .filter(|_| compress_len > 1)
        .map(|start| start..start + compress_len);

    let mut i = 0;
    while i < 8 {
        if let Some(ref range) = compress_range
            && range.start == i
        {
            result.push_str("::");
            i = range.end;
            continue;
        }

        if i > 0 && !result.ends_with("::") {
            result.push(':');
        }

        let _ = write!(&mut result, "{:x}", groups[i]);
        i += 1;
    }

    result.push(']');
    result
}

/// Find the longest run of consecutive zero groups.
fn find_longest_zero_run(groups: &[u16; 8]) -> (Option<usize>, usize) {
    let mut best_start: Option<usize> = None;
    let mut best_len = 0;
    let mut run_start: Option<usize> = None;
    let mut run_len = 0;

    for (i, &g) in groups.iter().enumerate() {
        if g == 0 {
            if run_start.is_none() {
                run_start = Some(i);
                run_len = 1;
            } else {
                run_len += 1;
            }
            if run_len > best_len {
                best_start = run_start;
                best_len = run_len;
            }
        } else {
            run_start = None;
            run_len = 0;
        }
    }

    (best_start, best_len)
}
