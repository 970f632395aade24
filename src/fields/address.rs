//! Name-addr grammar shared by From, To, Contact and Route:
//! `["display name"] <uri>[;params]` or a bare `uri[;params]`.

use std::fmt;

use crate::codec::Codec;
use crate::error::{CodecError, CodecResult};
use crate::headers::HeaderName;
use crate::parsing::{find_outside_quotes, strip_field_name, unquote};
use crate::profile::Profile;
use crate::types::Params;
use crate::uri::Uri;
use crate::validation::{validate_display_name, validate_token};

/// One decoded name-addr
#[derive(Debug, Default)]
pub(crate) struct NameAddr {
    pub display_name: Option<String>,
    pub uri: Option<Uri>,
    pub params: Params,
}

impl NameAddr {
    pub fn decode(field: &'static str, text: &str, profile: &Profile) -> CodecResult<Self> {
        let text = text.trim();
        let (display, uri, rest) = match find_outside_quotes(text, '<') {
            Some(open) => {
                let close = text[open..]
                    .find('>')
                    .map(|i| open + i)
                    .ok_or_else(|| CodecError::pattern(field, "uri", text, "<uri>"))?;
                (&text[..open], &text[open + 1..close], &text[close + 1..])
            }
            None => match text.split_once(';') {
                Some((uri, params)) => ("", uri, params),
                None => ("", text, ""),
            },
        };

        let display = unquote(display);
        let uri = uri.trim();
        let uri = if uri.is_empty() {
            None
        } else {
            Some(Uri::decode_with(uri, profile).map_err(|e| e.within(field))?)
        };

        Ok(NameAddr {
            display_name: (!display.is_empty()).then(|| display.to_string()),
            uri,
            params: Params::parse(rest),
        })
    }

    /// Move the `tag` parameter out of the list.
    pub fn take_tag(&mut self) -> Option<String> {
        self.params.remove("tag").map(Option::unwrap_or_default)
    }
}

pub(crate) fn validate_display(field: &'static str, display_name: Option<&str>) -> CodecResult<()> {
    match display_name {
        Some(name) => validate_display_name(field, name),
        None => Ok(()),
    }
}

pub(crate) fn validate_uri(
    field: &'static str,
    uri: Option<&Uri>,
    profile: &Profile,
) -> CodecResult<()> {
    uri.ok_or_else(|| CodecError::missing(field, "uri"))?
        .validate_with(profile)
        .map_err(|e| e.within(field))
}

/// `"display" <uri>` with the display part omitted when empty.
pub(crate) fn write_name_addr(
    f: &mut fmt::Formatter<'_>,
    display_name: Option<&str>,
    uri: Option<&Uri>,
) -> fmt::Result {
    if let Some(name) = display_name.filter(|n| !n.trim().is_empty()) {
        write!(f, "\"{}\" ", name)?;
    }
    match uri {
        Some(uri) => write!(f, "<{}>", uri),
        None => write!(f, "<>"),
    }
}

/// From and To share one grammar and differ only in their field name.
macro_rules! tagged_address_field {
    ($(#[$meta:meta])* $name:ident, $header:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Default)]
        pub struct $name {
            pub display_name: Option<String>,
            /// Optional while decoding, required by validation
            pub uri: Option<Uri>,
            pub tag: Option<String>,
            /// Parameters other than `tag`, in wire order
            pub params: Params,
        }

        impl $name {
            pub fn new(uri: Uri) -> Self {
                $name {
                    uri: Some(uri),
                    ..Default::default()
                }
            }

            pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
                self.display_name = Some(name.into());
                self
            }

            pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
                self.tag = Some(tag.into());
                self
            }
        }

        impl Codec for $name {
            fn decode_with(raw: &str, profile: &Profile) -> CodecResult<Self> {
                let field = $header.as_str();
                let payload = strip_field_name(raw, $header)?;
                let mut addr = NameAddr::decode(field, payload, profile)?;
                let tag = addr.take_tag();
                Ok($name {
                    display_name: addr.display_name,
                    uri: addr.uri,
                    tag,
                    params: addr.params,
                })
            }

            fn validate_with(&self, profile: &Profile) -> CodecResult<()> {
                let field = $header.as_str();
                validate_display(field, self.display_name.as_deref())?;
                validate_uri(field, self.uri.as_ref(), profile)?;
                if let Some(tag) = &self.tag {
                    validate_token(field, "tag", tag)?;
                }
                if self.params.contains("tag") {
                    return Err(CodecError::pattern(
                        field,
                        "parameter name",
                        "tag",
                        "a parameter other than tag",
                    ));
                }
                self.params.validate(field)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}: ", $header)?;
                write_name_addr(f, self.display_name.as_deref(), self.uri.as_ref())?;
                if let Some(tag) = &self.tag {
                    write!(f, ";tag={}", tag)?;
                }
                write!(f, "{}", self.params)
            }
        }
    };
}

tagged_address_field!(
    /// The From field: the logical originator of the request
    FromHeader,
    HeaderName::From
);

tagged_address_field!(
    /// The To field: the logical recipient of the request
    ToHeader,
    HeaderName::To
);
