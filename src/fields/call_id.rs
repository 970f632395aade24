//! Call-ID: `id[@host]`

use std::fmt;

use crate::codec::Codec;
use crate::error::{CodecError, CodecResult};
use crate::headers::HeaderName;
use crate::parsing::strip_field_name;
use crate::profile::Profile;
use crate::validation::validate_header_value;

const FIELD: &str = "Call-ID";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallId {
    pub id: String,
    pub host: Option<String>,
}

impl CallId {
    pub fn new(id: impl Into<String>) -> Self {
        CallId {
            id: id.into(),
            host: None,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }
}

fn check_word(subfield: &'static str, value: &str) -> CodecResult<()> {
    if value.is_empty() {
        return Err(CodecError::missing(FIELD, subfield));
    }
    validate_header_value(FIELD, subfield, value)?;
    if value.chars().any(|c| c.is_whitespace() || c == '@') {
        return Err(CodecError::pattern(FIELD, subfield, value, "a word without spaces or '@'"));
    }
    Ok(())
}

impl Codec for CallId {
    fn decode_with(raw: &str, _profile: &Profile) -> CodecResult<Self> {
        let payload = strip_field_name(raw, HeaderName::CallId)?;
        let (id, host) = match payload.split_once('@') {
            Some((id, host)) => (id.trim(), Some(host.trim()).filter(|h| !h.is_empty())),
            None => (payload, None),
        };
        Ok(CallId {
            id: id.to_string(),
            host: host.map(str::to_string),
        })
    }

    fn validate_with(&self, _profile: &Profile) -> CodecResult<()> {
        check_word("id", &self.id)?;
        if let Some(host) = &self.host {
            check_word("host", host)?;
        }
        Ok(())
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", HeaderName::CallId, self.id)?;
        if let Some(host) = self.host.as_deref().filter(|h| !h.is_empty()) {
            write!(f, "@{}", host)?;
        }
        Ok(())
    }
}
