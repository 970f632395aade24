//! Request-Line codec: `METHOD request-uri SIP/2.0`

use std::fmt;

use crate::codec::Codec;
use crate::error::{CodecError, CodecResult};
use crate::parsing::{check_version, parse_protocol_version, trim_line};
use crate::profile::Profile;
use crate::types::{Method, Protocol, Version};
use crate::uri::Uri;

const FIELD: &str = "Request-Line";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub uri: Uri,
    pub protocol: Protocol,
    pub version: Version,
}

impl RequestLine {
    pub fn new(method: Method, uri: Uri) -> Self {
        RequestLine {
            method,
            uri,
            protocol: Protocol::SIP,
            version: Version::SIP_2_0,
        }
    }
}

impl Codec for RequestLine {
    fn decode_with(raw: &str, profile: &Profile) -> CodecResult<Self> {
        let line = trim_line(FIELD, raw)?;
        let mut tokens = line.split_ascii_whitespace();

        let method = tokens
            .next()
            .ok_or_else(|| CodecError::missing(FIELD, "method"))?;
        let method = method
            .parse::<Method>()
            .map_err(|_| CodecError::not_allowed(FIELD, "method", method, profile.method_list()))?;

        let uri = tokens
            .next()
            .ok_or_else(|| CodecError::missing(FIELD, "request-uri"))?;
        let uri = Uri::decode_with(uri, profile).map_err(|e| e.within(FIELD))?;

        let version = tokens
            .next()
            .ok_or_else(|| CodecError::missing(FIELD, "version"))?;
        let (protocol, version) = parse_protocol_version(FIELD, version)?;

        if let Some(extra) = tokens.next() {
            return Err(CodecError::pattern(
                FIELD,
                "version",
                extra,
                "end of line after SIP/2.0",
            ));
        }

        Ok(RequestLine {
            method,
            uri,
            protocol,
            version,
        })
    }

    fn validate_with(&self, profile: &Profile) -> CodecResult<()> {
        if !profile.allows_method(self.method) {
            return Err(CodecError::not_allowed(
                FIELD,
                "method",
                self.method.to_string(),
                profile.method_list(),
            ));
        }
        check_version(FIELD, self.version)?;
        self.uri
            .validate_with(profile)
            .map_err(|e| e.within(FIELD))
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}/{}",
            self.method, self.uri, self.protocol, self.version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_register_line() {
        let raw = "REGISTER sip:34020000002000000001@3402000000 SIP/2.0";
        let line = RequestLine::parse(raw).unwrap();
        assert_eq!(line.method, Method::REGISTER);
        assert_eq!(line.uri.user, "34020000002000000001");
        assert_eq!(line.uri.host, "3402000000");
        assert_eq!(line.uri.port_or_zero(), 0);
        assert_eq!(line.protocol, Protocol::SIP);
        assert_eq!(line.version, Version::SIP_2_0);
        assert_eq!(line.serialize().unwrap(), format!("{}\r\n", raw));
    }

    #[test]
    fn test_method_case_normalized() {
        let line =
            RequestLine::parse("message sip:34020000002000000001@3402000000 sip/2.0\r\n").unwrap();
        assert_eq!(line.method, Method::MESSAGE);
        assert_eq!(
            line.to_string(),
            "MESSAGE sip:34020000002000000001@3402000000 SIP/2.0"
        );
    }

    #[test]
    fn test_rejections() {
        let err = RequestLine::parse("FETCH sip:34020000002000000001@3402000000 SIP/2.0")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EnumMismatch);

        let err = RequestLine::parse("INVITE sip:34020000002000000001@3402000000 SIP/3.0")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EnumMismatch);

        let err = RequestLine::parse("INVITE sip:34020000002000000001@3402000000").unwrap_err();
        assert_eq!(err, CodecError::missing(FIELD, "version"));

        let err = RequestLine::parse("INVITE sip:34020000002000000001@9999999999 SIP/2.0")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CrossFieldInconsistency);
        assert_eq!(err.path(), vec!["Request-Line", "URI"]);
    }

    #[test]
    fn test_restricted_vocabulary() {
        let profile = Profile::gb28181().with_methods([Method::REGISTER]);
        let line = RequestLine::new(
            Method::INVITE,
            Uri::new("34020000001320000001", "3402000000"),
        );
        assert!(line.validate().is_ok());
        assert_eq!(
            line.serialize_with(&profile).unwrap_err().kind(),
            ErrorKind::EnumMismatch
        );
    }
}
