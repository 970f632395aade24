//! Input validation utilities
//!
//! Shared checks used by the field validators: header-value injection,
//! display names, identifiers and IP literals.

use std::net::{IpAddr, Ipv6Addr};

use crate::error::{CodecError, CodecResult};
use crate::types::is_token_byte;

/// True when `host` is an IPv4/IPv6 literal, bracketed IPv6 included.
pub fn is_ip_literal(host: &str) -> bool {
    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    bare.parse::<IpAddr>().is_ok()
}

/// A host as stored: a name, an IPv4 literal or an unbracketed IPv6 literal.
/// Brackets are added on output, so a stored host may not carry them.
pub fn validate_host(field: &'static str, subfield: &'static str, host: &str) -> CodecResult<()> {
    if host.bytes().any(|b| {
        b.is_ascii_whitespace() || matches!(b, b';' | b',' | b'<' | b'>' | b'[' | b']' | b'"')
    }) {
        return Err(CodecError::pattern(
            field,
            subfield,
            host,
            "a host name or an IP address without brackets",
        ));
    }
    if host.contains(':') && host.parse::<Ipv6Addr>().is_err() {
        return Err(CodecError::pattern(field, subfield, host, "an IPv6 address"));
    }
    Ok(())
}

/// Validate UTF-8 display name text that will be emitted inside quotes
pub fn validate_display_name(field: &'static str, name: &str) -> CodecResult<()> {
    for ch in name.chars() {
        match ch {
            '\0'..='\x08' | '\x0A'..='\x1F' | '\x7F' => {
                return Err(CodecError::pattern(
                    field,
                    "display-name",
                    name,
                    "text without control characters",
                ));
            }
            '"' | '\\' => {
                return Err(CodecError::pattern(
                    field,
                    "display-name",
                    name,
                    "text without quotes or backslashes",
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Reject CR, LF and NUL so a value cannot split or truncate its line.
pub fn validate_header_value(
    field: &'static str,
    subfield: &'static str,
    value: &str,
) -> CodecResult<()> {
    if value.bytes().any(|b| matches!(b, b'\r' | b'\n' | 0)) {
        return Err(CodecError::pattern(
            field,
            subfield,
            value,
            "a single-line value without CR, LF or NUL",
        ));
    }
    Ok(())
}

/// Non-empty, single-line text. Surrounding whitespace is rejected because
/// the decoder trims it.
pub fn validate_free_text(
    field: &'static str,
    subfield: &'static str,
    value: &str,
) -> CodecResult<()> {
    if value.trim().is_empty() {
        return Err(CodecError::missing(field, subfield));
    }
    validate_header_value(field, subfield, value)?;
    if value.trim() != value {
        return Err(CodecError::pattern(
            field,
            subfield,
            value,
            "text without leading or trailing whitespace",
        ));
    }
    Ok(())
}

/// Non-empty RFC 3261 token
pub fn validate_token(field: &'static str, subfield: &'static str, value: &str) -> CodecResult<()> {
    if value.is_empty() {
        return Err(CodecError::missing(field, subfield));
    }
    if !value.bytes().all(is_token_byte) {
        return Err(CodecError::pattern(field, subfield, value, "a token"));
    }
    Ok(())
}

/// Device identifier: exactly `length` ASCII digits.
pub fn validate_identifier(
    field: &'static str,
    subfield: &'static str,
    value: &str,
    length: usize,
) -> CodecResult<()> {
    if value.is_empty() {
        return Err(CodecError::missing(field, subfield));
    }
    if value.len() != length || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::pattern(
            field,
            subfield,
            value,
            format!("{} digits", length),
        ));
    }
    Ok(())
}

/// Cross-check a declared Content-Length against the body actually carried
pub fn validate_content_length(declared: u32, actual_body_length: usize) -> CodecResult<()> {
    let matches = usize::try_from(declared).map_or(false, |d| d == actual_body_length);
    if !matches {
        return Err(CodecError::inconsistent(
            "Content-Length",
            format!(
                "declared {} but body is {} bytes",
                declared, actual_body_length
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_ip_literals() {
        assert!(is_ip_literal("192.168.0.1"));
        assert!(is_ip_literal("::1"));
        assert!(is_ip_literal("[fe80::1]"));
        assert!(!is_ip_literal("3402000000"));
        assert!(!is_ip_literal("example.com"));
        assert!(!is_ip_literal("[3402000000]"));
    }

    #[test]
    fn test_host_shape() {
        assert!(validate_host("Via", "sent-by", "192.168.0.1").is_ok());
        assert!(validate_host("Via", "sent-by", "fe80::1").is_ok());
        assert!(validate_host("Via", "sent-by", "3402000000").is_ok());
        assert_eq!(
            validate_host("Via", "sent-by", "[fe80::1]").unwrap_err().kind(),
            ErrorKind::PatternMismatch
        );
        assert!(validate_host("URI", "host", "fe80::1:5060:x").is_err());
        assert!(validate_host("URI", "host", "a b").is_err());
    }

    #[test]
    fn test_header_value_injection() {
        assert!(validate_header_value("User-Agent", "product", "IPC V1.0").is_ok());
        let err = validate_header_value("User-Agent", "product", "IPC\r\nVia: x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PatternMismatch);
        assert!(validate_header_value("User-Agent", "product", "a\0b").is_err());
        assert_eq!(
            validate_free_text("Content-Type", "media-type", "  ").unwrap_err().kind(),
            ErrorKind::MissingRequiredSubfield
        );
        assert!(validate_free_text("User-Agent", "product", "IP Camera").is_ok());
        assert_eq!(
            validate_free_text("User-Agent", "product", " IP Camera").unwrap_err().kind(),
            ErrorKind::PatternMismatch
        );
    }

    #[test]
    fn test_display_name() {
        assert!(validate_display_name("From", "Camera 01\t").is_ok());
        assert!(validate_display_name("From", "摄像机").is_ok());
        assert!(validate_display_name("From", "a\"b").is_err());
        assert!(validate_display_name("From", "a\nb").is_err());
    }

    #[test]
    fn test_identifier_and_token() {
        assert!(validate_identifier("URI", "user", "34020000002000000001", 20).is_ok());
        assert_eq!(
            validate_identifier("URI", "user", "3402000000200000000a", 20).unwrap_err().kind(),
            ErrorKind::PatternMismatch
        );
        assert_eq!(
            validate_identifier("URI", "user", "", 20).unwrap_err().kind(),
            ErrorKind::MissingRequiredSubfield
        );
        assert!(validate_token("Via", "branch", "z9hG4bK-524287-1").is_ok());
        assert!(validate_token("Via", "branch", "z9 hG4bK").is_err());
    }

    #[test]
    fn test_content_length_cross_check() {
        assert!(validate_content_length(5, 5).is_ok());
        let err = validate_content_length(10, 5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CrossFieldInconsistency);
        assert!(err.to_string().contains("declared 10 but body is 5 bytes"));
    }
}
