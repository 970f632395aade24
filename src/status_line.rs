//! Status-Line codec: `SIP/2.0 code reason-phrase`

use std::fmt;

use crate::codec::Codec;
use crate::error::{CodecError, CodecResult};
use crate::parsing::{check_version, parse_protocol_version, parse_unsigned, trim_line};
use crate::profile::Profile;
use crate::status::StatusClass;
use crate::types::{Protocol, Version};
use crate::validation::validate_header_value;

const FIELD: &str = "Status-Line";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub protocol: Protocol,
    pub version: Version,
    pub code: u16,
    pub reason: String,
}

impl StatusLine {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        StatusLine {
            protocol: Protocol::SIP,
            version: Version::SIP_2_0,
            code,
            reason: reason.into(),
        }
    }

    /// Build a line with the canonical reason phrase from the profile's tables.
    pub fn for_code(code: u16, profile: &Profile) -> CodecResult<Self> {
        profile
            .status()
            .reason_phrase(code)
            .map(|phrase| StatusLine::new(code, phrase))
            .ok_or_else(|| CodecError::lookup_miss(FIELD, code))
    }

    pub fn class(&self, profile: &Profile) -> Option<StatusClass> {
        profile.status().lookup(self.code).map(|(class, _)| class)
    }

    pub fn is_final(&self) -> bool {
        self.code >= 200
    }
}

impl Codec for StatusLine {
    fn decode_with(raw: &str, _profile: &Profile) -> CodecResult<Self> {
        let line = trim_line(FIELD, raw)?;

        let (version, rest) = line
            .split_once(|c: char| c.is_ascii_whitespace())
            .ok_or_else(|| CodecError::missing(FIELD, "status-code"))?;
        let (protocol, version) = parse_protocol_version(FIELD, version)?;

        let rest = rest.trim_start();
        let (code, reason) = match rest.split_once(|c: char| c.is_ascii_whitespace()) {
            Some((code, reason)) => (code, reason.trim()),
            None => (rest, ""),
        };
        let code = parse_unsigned::<u16>(FIELD, "status-code", code)?;

        Ok(StatusLine {
            protocol,
            version,
            code,
            reason: reason.to_string(),
        })
    }

    fn validate_with(&self, profile: &Profile) -> CodecResult<()> {
        check_version(FIELD, self.version)?;
        if self.reason.trim().is_empty() {
            return Err(CodecError::missing(FIELD, "reason-phrase"));
        }
        validate_header_value(FIELD, "reason-phrase", &self.reason)?;
        profile.status().check(FIELD, self.code, &self.reason)?;
        Ok(())
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} {} {}",
            self.protocol, self.version, self.code, self.reason
        )
    }
}
