//! Grammar helpers shared by the field codecs
//!
//! Each codec is a short sequence of these rules: strip the field name,
//! split on a delimiter that is not inside quotes or angle brackets, then
//! match the pieces. Failures carry the field and sub-rule that broke.

use std::fmt;
use std::str::FromStr;

use crate::error::{CodecError, CodecResult};
use crate::headers::HeaderName;
use crate::types::{Protocol, Version};

/// Strip line terminators and surrounding whitespace; fail on nothing left.
pub(crate) fn trim_line<'a>(field: &'static str, raw: &'a str) -> CodecResult<&'a str> {
    let line = raw.trim_matches(|c: char| c.is_ascii_whitespace());
    if line.is_empty() {
        return Err(CodecError::empty(field));
    }
    Ok(line)
}

/// Return the payload of a `Name: payload` line when `Name` (long or
/// compact form, any case) is `expected`.
pub(crate) fn strip_field_name(raw: &str, expected: HeaderName) -> CodecResult<&str> {
    let field = expected.as_str();
    let line = trim_line(field, raw)?;
    let (name, payload) = line
        .split_once(':')
        .ok_or_else(|| CodecError::unrecognized(field, line))?;
    match name.trim().parse::<HeaderName>() {
        Ok(name) if name == expected => Ok(payload.trim()),
        _ => Err(CodecError::unrecognized(field, line)),
    }
}

/// Split on `sep` wherever it is outside a quoted string or `<...>`.
pub(crate) fn split_outside(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut depth = 0usize;
    let mut start = 0;

    for (i, ch) in s.char_indices() {
        if in_quotes {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_quotes = true,
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Find `ch` outside a quoted string
pub(crate) fn find_outside_quotes(s: &str, ch: char) -> Option<usize> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if in_quotes {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == ch {
            return Some(i);
        }
    }
    None
}

/// Remove one pair of surrounding double quotes, if present.
pub(crate) fn unquote(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

/// Parse an all-digit numeral into `T`, reporting overflow instead of
/// wrapping or truncating.
pub(crate) fn parse_unsigned<T: FromStr>(
    field: &'static str,
    subfield: &'static str,
    text: &str,
) -> CodecResult<T> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CodecError::missing(field, subfield));
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::pattern(field, subfield, text, "an unsigned integer"));
    }
    text.parse::<T>()
        .map_err(|_| CodecError::overflow(field, subfield, text, std::any::type_name::<T>()))
}

/// Split `host[:port]`. A bracketed IPv6 literal is returned without its
/// brackets; a bare IPv6 literal (more than one colon) is taken whole as the
/// host.
pub(crate) fn split_host_port<'a>(
    field: &'static str,
    hostport: &'a str,
) -> CodecResult<(&'a str, Option<u16>)> {
    let hostport = hostport.trim();
    let (host, port) = if hostport.starts_with('[') {
        match hostport.find(']') {
            Some(end) => {
                let (host, rest) = (&hostport[1..end], &hostport[end + 1..]);
                match rest.strip_prefix(':') {
                    Some(port) => (host, Some(port)),
                    None if rest.is_empty() => (host, None),
                    None => {
                        return Err(CodecError::pattern(field, "host", hostport, "[ipv6]:port"))
                    }
                }
            }
            None => return Err(CodecError::pattern(field, "host", hostport, "[ipv6]:port")),
        }
    } else if hostport.matches(':').count() == 1 {
        match hostport.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (hostport, None),
        }
    } else {
        (hostport, None)
    };

    let port = match port {
        Some(port) => match parse_unsigned::<u16>(field, "port", port)? {
            0 => None,
            port => Some(port),
        },
        None => None,
    };
    Ok((host.trim(), port))
}

/// Write `host[:port]`, bracketing an IPv6 host so its colons cannot be
/// read as the port separator.
pub(crate) fn write_host_port(
    f: &mut fmt::Formatter<'_>,
    host: &str,
    port: Option<u16>,
) -> fmt::Result {
    if host.contains(':') {
        write!(f, "[{}]", host)?;
    } else {
        f.write_str(host)?;
    }
    match port.filter(|p| *p != 0) {
        Some(port) => write!(f, ":{}", port),
        None => Ok(()),
    }
}

/// `SIP/2.0` as used by the start lines and Via
pub(crate) fn parse_protocol_version(
    field: &'static str,
    text: &str,
) -> CodecResult<(Protocol, Version)> {
    let (protocol, version) = text
        .trim()
        .split_once('/')
        .ok_or_else(|| CodecError::missing(field, "version"))?;
    let protocol = protocol
        .parse::<Protocol>()
        .map_err(|_| CodecError::not_allowed(field, "protocol", protocol, "SIP"))?;
    let version = version
        .parse::<Version>()
        .map_err(|_| CodecError::pattern(field, "version", version, "major.minor"))?;
    Ok((protocol, version))
}

/// The protocol speaks exactly one version.
pub(crate) fn check_version(field: &'static str, version: Version) -> CodecResult<()> {
    if version != Version::SIP_2_0 {
        return Err(CodecError::not_allowed(
            field,
            "version",
            version.to_string(),
            Version::SIP_2_0.to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_strip_field_name() {
        assert_eq!(
            strip_field_name("Call-ID: abc@host\r\n", HeaderName::CallId),
            Ok("abc@host")
        );
        assert_eq!(strip_field_name("i:abc", HeaderName::CallId), Ok("abc"));
        assert_eq!(strip_field_name("call-id :  abc ", HeaderName::CallId), Ok("abc"));

        let err = strip_field_name("Contact: <sip:x>", HeaderName::To).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnrecognizedField);
        let err = strip_field_name("To <sip:x>", HeaderName::To).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnrecognizedField);
        let err = strip_field_name(" \r\n", HeaderName::To).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyInput);
    }

    #[test]
    fn test_split_outside() {
        assert_eq!(
            split_outside(r#"realm="a,b",nonce="c""#, ','),
            vec![r#"realm="a,b""#, r#"nonce="c""#]
        );
        assert_eq!(
            split_outside("<sip:a;lr>,<sip:b>", ','),
            vec!["<sip:a;lr>", "<sip:b>"]
        );
        assert_eq!(
            split_outside(r#""x;y" <sip:a;lr>;tag=1"#, ';'),
            vec![r#""x;y" <sip:a;lr>"#, "tag=1"]
        );
        assert_eq!(find_outside_quotes(r#""a<b" <sip:c>"#, '<'), Some(6));
        assert_eq!(unquote(r#" "nonce" "#), "nonce");
        assert_eq!(unquote("bare"), "bare");
    }

    #[test]
    fn test_parse_unsigned() {
        assert_eq!(parse_unsigned::<u32>("Expires", "delta", "3600"), Ok(3600));
        assert_eq!(
            parse_unsigned::<u8>("Max-Forwards", "hops", "256").unwrap_err().kind(),
            ErrorKind::NumericOverflow
        );
        assert_eq!(
            parse_unsigned::<u32>("Expires", "delta", "-1").unwrap_err().kind(),
            ErrorKind::PatternMismatch
        );
        assert_eq!(
            parse_unsigned::<u32>("Expires", "delta", "").unwrap_err().kind(),
            ErrorKind::MissingRequiredSubfield
        );
    }

    #[test]
    fn test_split_host_port() {
        assert_eq!(split_host_port("URI", "192.168.0.1:5060"), Ok(("192.168.0.1", Some(5060))));
        assert_eq!(split_host_port("URI", "3402000000"), Ok(("3402000000", None)));
        assert_eq!(split_host_port("URI", "[fe80::1]:5060"), Ok(("fe80::1", Some(5060))));
        assert_eq!(split_host_port("URI", "[fe80::1]"), Ok(("fe80::1", None)));
        assert_eq!(split_host_port("URI", "fe80::1"), Ok(("fe80::1", None)));
        assert_eq!(split_host_port("URI", "host:0"), Ok(("host", None)));
        assert_eq!(
            split_host_port("URI", "host:70000").unwrap_err().kind(),
            ErrorKind::NumericOverflow
        );
    }

    #[test]
    fn test_protocol_version() {
        assert_eq!(
            parse_protocol_version("Status-Line", "sip/2.0"),
            Ok((Protocol::SIP, Version::SIP_2_0))
        );
        assert_eq!(
            parse_protocol_version("Status-Line", "HTTP/1.1").unwrap_err().kind(),
            ErrorKind::EnumMismatch
        );
        assert!(check_version("Via", Version::new(3, 0)).is_err());
    }
}
