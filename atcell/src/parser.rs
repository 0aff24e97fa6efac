//! Primitive AT-token parsers.
//!
//! These mirror `gsmi_parse_number`/`gsmi_parse_hexnumber`/`gsmi_parse_string`/
//! `gsmi_parse_ip`/`gsmi_parse_mac` from the original C implementation
//! (`original_source/src/gsm/gsm_parser.c`): a cursor into the remainder of
//! a response line is advanced past one token at a time, tolerating the
//! leading comma/quote punctuation AT lines are built from. Unlike the C
//! originals these return the parsed value alongside the advanced
//! remainder rather than mutating a pointer in place, since that is the
//! idiomatic shape for a `&str` cursor in Rust.

use std::net::Ipv4Addr;

/// Skips a single leading `,` or `"` if present.
fn skip_one(s: &str, ch: char) -> &str {
    s.strip_prefix(ch).unwrap_or(s)
}

/// Parses a signed integer token, tolerating leading `,`/`"` punctuation and
/// a trailing `,` separator. Returns `(value, rest)`.
pub fn parse_i32(s: &str) -> (i32, &str) {
    let mut rest = skip_one(s, '"');
    rest = skip_one(rest, ',');
    rest = skip_one(rest, '"');

    let negative = rest.starts_with('-');
    if negative {
        rest = &rest[1..];
    }

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    let value: i64 = rest[..digits_len].parse().unwrap_or(0);
    rest = &rest[digits_len..];
    rest = skip_one(rest, ',');

    let value = if negative { -value } else { value };
    (value as i32, rest)
}

/// Parses an unsigned integer token. See [`parse_i32`].
pub fn parse_u32(s: &str) -> (u32, &str) {
    let (v, rest) = parse_i32(s);
    (v.max(0) as u32, rest)
}

/// Parses a hexadecimal token (no `0x` prefix, as the modem emits it).
pub fn parse_hex(s: &str) -> (u32, &str) {
    let mut rest = skip_one(s, '"');
    rest = skip_one(rest, ',');
    rest = skip_one(rest, '"');

    let digits_len = rest
        .bytes()
        .take_while(u8::is_ascii_hexdigit)
        .count();
    let value = u32::from_str_radix(&rest[..digits_len], 16).unwrap_or(0);
    rest = &rest[digits_len..];
    rest = skip_one(rest, ',');
    (value, rest)
}

/// Parses a `"quoted string"` token with a byte-for-byte copy (the AT
/// dialects this engine targets never escape `"` inside a quoted field, so
/// no unescaping is performed — see §6 of the spec on SMS text escaping
/// being the emitter's job, not the parser's). Returns `(contents, rest)`.
pub fn parse_quoted_string(s: &str) -> (&str, &str) {
    let mut rest = skip_one(s, ',');
    rest = skip_one(rest, '"');
    match rest.find('"') {
        Some(end) => {
            let contents = &rest[..end];
            let mut after = &rest[end + 1..];
            after = skip_one(after, ',');
            (contents, after)
        }
        None => {
            // Unterminated: treat the remainder up to the next comma (or
            // end of line) as the value, matching the C parser's
            // best-effort behavior on malformed input.
            let end = rest.find(',').unwrap_or(rest.len());
            let contents = &rest[..end];
            let after = skip_one(&rest[end..], ',');
            (contents, after)
        }
    }
}

/// Parses a dotted-quad IPv4 address: `a.b.c.d` or `"a.b.c.d"`.
pub fn parse_ipv4(s: &str) -> (Option<Ipv4Addr>, &str) {
    let mut rest = skip_one(s, '"');
    rest = skip_one(rest, ',');
    rest = skip_one(rest, '"');

    let mut octets = [0u8; 4];
    for (i, octet) in octets.iter_mut().enumerate() {
        let (v, r) = parse_u32_dotted(rest);
        *octet = v as u8;
        rest = r;
        if i < 3 {
            rest = rest.strip_prefix('.').unwrap_or(rest);
        }
    }
    rest = skip_one(rest, '"');
    rest = skip_one(rest, ',');
    (Some(Ipv4Addr::from(octets)), rest)
}

fn parse_u32_dotted(s: &str) -> (u32, &str) {
    let digits_len = s.bytes().take_while(u8::is_ascii_digit).count();
    let value = s[..digits_len].parse().unwrap_or(0);
    (value, &s[digits_len..])
}

/// Formats an IPv4 address the way the dialect formatters embed it in AT
/// argument lists: a bare dotted quad, no quotes (callers quote it
/// themselves when the AT syntax requires a quoted string argument).
pub fn format_ipv4(ip: Ipv4Addr) -> String {
    ip.to_string()
}

/// Parses a colon-separated MAC address: `aa:bb:cc:dd:ee:ff`.
pub fn parse_mac(s: &str) -> (Option<[u8; 6]>, &str) {
    let mut rest = skip_one(s, '"');
    let mut mac = [0u8; 6];
    for (i, byte) in mac.iter_mut().enumerate() {
        let (v, r) = parse_hex(rest);
        *byte = v as u8;
        rest = r;
        if i < 5 {
            rest = rest.strip_prefix(':').unwrap_or(rest);
        }
    }
    rest = skip_one(rest, '"');
    rest = skip_one(rest, ',');
    (Some(mac), rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_negative_integers() {
        assert_eq!(parse_i32("42,rest").0, 42);
        assert_eq!(parse_i32("-7,rest").0, -7);
        assert_eq!(parse_i32("\"5\",rest").0, 5);
    }

    #[test]
    fn integer_parse_advances_past_separator() {
        let (v, rest) = parse_i32("1,2,3");
        assert_eq!(v, 1);
        assert_eq!(rest, "2,3");
    }

    #[test]
    fn parses_hex() {
        assert_eq!(parse_hex("1a2b,rest").0, 0x1a2b);
    }

    #[test]
    fn parses_quoted_string() {
        let (s, rest) = parse_quoted_string("\"hello\",next");
        assert_eq!(s, "hello");
        assert_eq!(rest, "next");
    }

    #[test]
    fn parses_quoted_string_leading_comma() {
        let (s, rest) = parse_quoted_string(",\"SM\",3");
        assert_eq!(s, "SM");
        assert_eq!(rest, "3");
    }

    #[test]
    fn round_trips_ipv4() {
        let ip: Ipv4Addr = "10.0.0.7".parse().unwrap();
        let formatted = format_ipv4(ip);
        let (parsed, _) = parse_ipv4(&formatted);
        assert_eq!(parsed, Some(ip));
    }

    #[test]
    fn parses_ipv4_quoted() {
        let (ip, rest) = parse_ipv4("\"192.168.1.1\",x");
        assert_eq!(ip, Some(Ipv4Addr::new(192, 168, 1, 1)));
        assert_eq!(rest, "x");
    }

    #[test]
    fn round_trips_mac() {
        let (mac, _) = parse_mac("de:ad:be:ef:00:01");
        assert_eq!(mac, Some([0xde, 0xad, 0xbe, 0xef, 0x00, 0x01]));
    }
}
