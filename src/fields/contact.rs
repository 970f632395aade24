//! Contact: `["display name"] <uri>[;params]`

use std::fmt;

use super::address::{validate_display, validate_uri, write_name_addr, NameAddr};
use crate::codec::Codec;
use crate::error::{CodecError, CodecResult};
use crate::headers::HeaderName;
use crate::parsing::strip_field_name;
use crate::profile::Profile;
use crate::types::Params;
use crate::uri::Uri;

const FIELD: &str = "Contact";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub display_name: Option<String>,
    pub uri: Uri,
    /// Parameters after the closing `>`, e.g. `expires`
    pub params: Params,
}

impl Contact {
    pub fn new(uri: Uri) -> Self {
        Contact {
            display_name: None,
            uri,
            params: Params::new(),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: Option<&str>) -> Self {
        self.params.insert(key, value.map(str::to_string));
        self
    }

    /// The `expires` contact parameter, when present and numeric
    pub fn expires(&self) -> Option<u32> {
        self.params.get("expires").flatten()?.parse().ok()
    }
}

impl Codec for Contact {
    fn decode_with(raw: &str, profile: &Profile) -> CodecResult<Self> {
        let payload = strip_field_name(raw, HeaderName::Contact)?;
        let addr = NameAddr::decode(FIELD, payload, profile)?;
        let uri = addr.uri.ok_or_else(|| CodecError::missing(FIELD, "uri"))?;
        Ok(Contact {
            display_name: addr.display_name,
            uri,
            params: addr.params,
        })
    }

    fn validate_with(&self, profile: &Profile) -> CodecResult<()> {
        validate_display(FIELD, self.display_name.as_deref())?;
        validate_uri(FIELD, Some(&self.uri), profile)?;
        self.params.validate(FIELD)
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", HeaderName::Contact)?;
        write_name_addr(f, self.display_name.as_deref(), Some(&self.uri))?;
        write!(f, "{}", self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_contact_with_params() {
        let contact = Contact::parse(
            "Contact: <sip:34020000001320000001@192.168.1.64:5060>;expires=3600;+sip.instance",
        )
        .unwrap();
        assert_eq!(contact.uri.port, Some(5060));
        assert_eq!(contact.expires(), Some(3600));
        assert_eq!(contact.params.get("+sip.instance"), Some(None));
        assert_eq!(
            contact.serialize().unwrap(),
            "Contact: <sip:34020000001320000001@192.168.1.64:5060>;expires=3600;+sip.instance\r\n"
        );
    }

    #[test]
    fn test_contact_display_name() {
        let contact = Contact::parse("m: \"NVR\" <sip:34020000001180000001@3402000000>").unwrap();
        assert_eq!(contact.display_name.as_deref(), Some("NVR"));
        assert_eq!(
            contact.to_string(),
            "Contact: \"NVR\" <sip:34020000001180000001@3402000000>"
        );
    }

    #[test]
    fn test_contact_requires_uri() {
        let err = Contact::parse("Contact: <>").unwrap_err();
        assert_eq!(err, CodecError::missing(FIELD, "uri"));

        let err = Contact::parse("Contact: <sip:34020000001320000001@192.168.1.64>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredSubfield);
        assert_eq!(err.path(), vec!["Contact", "URI"]);
    }
}
