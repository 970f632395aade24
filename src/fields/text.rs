//! Free-text fields: Content-Type, User-Agent

use std::fmt;

use crate::codec::Codec;
use crate::error::CodecResult;
use crate::headers::HeaderName;
use crate::parsing::strip_field_name;
use crate::profile::Profile;
use crate::validation::validate_free_text;

macro_rules! text_field {
    ($(#[$meta:meta])* $name:ident, $header:expr, $subfield:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                $name(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Codec for $name {
            fn decode_with(raw: &str, _profile: &Profile) -> CodecResult<Self> {
                let payload = strip_field_name(raw, $header)?;
                Ok($name(payload.to_string()))
            }

            fn validate_with(&self, _profile: &Profile) -> CodecResult<()> {
                validate_free_text($header.as_str(), $subfield, &self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}: {}", $header, self.0)
            }
        }
    };
}

text_field!(
    /// Media type of the body, e.g. `Application/MANSCDP+xml`
    ContentType,
    HeaderName::ContentType,
    "media-type"
);

text_field!(UserAgent, HeaderName::UserAgent, "product");

impl ContentType {
    pub const MANSCDP: &'static str = "Application/MANSCDP+xml";
    pub const SDP: &'static str = "application/sdp";

    /// `type/subtype` without parameters, lower-cased
    pub fn essence(&self) -> String {
        self.0
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    pub fn is_manscdp(&self) -> bool {
        self.essence() == Self::MANSCDP.to_ascii_lowercase()
    }

    pub fn is_sdp(&self) -> bool {
        self.essence() == Self::SDP
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CodecError, ErrorKind};

    #[test]
    fn test_content_type() {
        let ct = ContentType::parse("c: Application/MANSCDP+xml").unwrap();
        assert!(ct.is_manscdp());
        assert!(!ct.is_sdp());
        assert_eq!(ct.serialize().unwrap(), "Content-Type: Application/MANSCDP+xml\r\n");
        assert!(ContentType::new("application/sdp; charset=utf-8").is_sdp());
    }

    #[test]
    fn test_user_agent_keeps_spaces() {
        let ua = UserAgent::parse("User-Agent: IP Camera V2.0 (build 7)").unwrap();
        assert_eq!(ua.as_str(), "IP Camera V2.0 (build 7)");
        assert_eq!(ua.to_string(), "User-Agent: IP Camera V2.0 (build 7)");
    }

    #[test]
    fn test_text_rejections() {
        assert_eq!(
            UserAgent::parse("User-Agent:   ").unwrap_err(),
            CodecError::missing("User-Agent", "product")
        );
        assert_eq!(
            UserAgent::new("x\r\nVia: evil").validate().unwrap_err().kind(),
            ErrorKind::PatternMismatch
        );
    }
}
