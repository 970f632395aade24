//! The parse / validate / serialize contract shared by every entity

use std::fmt;

use crate::error::CodecResult;
use crate::profile::Profile;

/// Two-phase codec.
///
/// `decode_with` applies the grammar only; `parse_with` decodes and then
/// validates, so a parsed value is never returned in a state that
/// `validate_with` would reject. `Display` renders the unchecked wire form,
/// and `serialize_with` validates before rendering it as a CRLF-terminated
/// line.
pub trait Codec: Sized + fmt::Display {
    fn decode_with(raw: &str, profile: &Profile) -> CodecResult<Self>;

    /// Pure check; never mutates and gives the same answer every call.
    fn validate_with(&self, profile: &Profile) -> CodecResult<()>;

    fn parse_with(raw: &str, profile: &Profile) -> CodecResult<Self> {
        let value = Self::decode_with(raw, profile)?;
        value.validate_with(profile)?;
        Ok(value)
    }

    fn serialize_with(&self, profile: &Profile) -> CodecResult<String> {
        self.validate_with(profile)?;
        Ok(format!("{}\r\n", self))
    }

    fn parse(raw: &str) -> CodecResult<Self> {
        Self::parse_with(raw, Profile::global())
    }

    fn validate(&self) -> CodecResult<()> {
        self.validate_with(Profile::global())
    }

    fn serialize(&self) -> CodecResult<String> {
        self.serialize_with(Profile::global())
    }
}
