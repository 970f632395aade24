//! CSeq: `sequence-number METHOD`

use std::fmt;

use crate::codec::Codec;
use crate::error::{CodecError, CodecResult};
use crate::headers::HeaderName;
use crate::limits::MAX_CSEQ;
use crate::parsing::{parse_unsigned, strip_field_name};
use crate::profile::Profile;
use crate::types::Method;

const FIELD: &str = "CSeq";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CSeq {
    pub seq: u32,
    pub method: Method,
}

impl CSeq {
    pub fn new(seq: u32, method: Method) -> Self {
        CSeq { seq, method }
    }

    /// The CSeq of the next request in the same dialog
    pub fn next(&self, method: Method) -> CodecResult<Self> {
        let seq = self
            .seq
            .checked_add(1)
            .filter(|s| *s <= MAX_CSEQ)
            .ok_or_else(|| {
                CodecError::overflow(
                    FIELD,
                    "sequence-number",
                    format!("{}+1", self.seq),
                    "31-bit",
                )
            })?;
        Ok(CSeq { seq, method })
    }
}

impl Codec for CSeq {
    fn decode_with(raw: &str, profile: &Profile) -> CodecResult<Self> {
        let payload = strip_field_name(raw, HeaderName::CSeq)?;
        let mut tokens = payload.split_ascii_whitespace();

        let seq = tokens
            .next()
            .ok_or_else(|| CodecError::missing(FIELD, "sequence-number"))?;
        let seq = parse_unsigned::<u32>(FIELD, "sequence-number", seq)?;

        let method = tokens
            .next()
            .ok_or_else(|| CodecError::missing(FIELD, "method"))?;
        let method = method
            .parse::<Method>()
            .map_err(|_| CodecError::not_allowed(FIELD, "method", method, profile.method_list()))?;

        if let Some(extra) = tokens.next() {
            return Err(CodecError::pattern(FIELD, "method", extra, "end of field after method"));
        }
        Ok(CSeq { seq, method })
    }

    fn validate_with(&self, profile: &Profile) -> CodecResult<()> {
        if self.seq > MAX_CSEQ {
            return Err(CodecError::overflow(
                FIELD,
                "sequence-number",
                self.seq.to_string(),
                "31-bit",
            ));
        }
        if !profile.allows_method(self.method) {
            return Err(CodecError::not_allowed(
                FIELD,
                "method",
                self.method.to_string(),
                profile.method_list(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for CSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", HeaderName::CSeq, self.seq, self.method)
    }
}
