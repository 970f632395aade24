//! Header block: line splitting, field dispatch and the aggregate record
//!
//! A block is split into logical lines (folded continuations joined), each
//! line is dispatched by the name before its first colon, long or RFC 3261
//! compact form, compared ASCII case-insensitively. Names outside the
//! recognised set are preserved as [`ExtensionField`]s.

use std::fmt;

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::{debug, trace};

use crate::codec::Codec;
use crate::error::{CodecError, CodecResult};
use crate::fields::{
    Authorization, CSeq, CallId, Contact, ContentLength, ContentType, Expires, FromHeader,
    MaxForwards, Route, ToHeader, UserAgent, Via, WwwAuthenticate,
};
use crate::limits::ParserLimits;
use crate::profile::Profile;
use crate::validation::{validate_header_value, validate_token};

const FIELD: &str = "Header";

/// Recognised field names. Parsing accepts the long name or the compact
/// form in any case; `Display` gives the canonical long name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum HeaderName {
    #[strum(to_string = "Via", serialize = "v")]
    Via,
    #[strum(to_string = "From", serialize = "f")]
    From,
    #[strum(to_string = "To", serialize = "t")]
    To,
    #[strum(to_string = "Call-ID", serialize = "i")]
    CallId,
    #[strum(to_string = "CSeq")]
    CSeq,
    #[strum(to_string = "Contact", serialize = "m")]
    Contact,
    #[strum(to_string = "Route")]
    Route,
    #[strum(to_string = "Max-Forwards")]
    MaxForwards,
    #[strum(to_string = "Expires")]
    Expires,
    #[strum(to_string = "Content-Length", serialize = "l")]
    ContentLength,
    #[strum(to_string = "Content-Type", serialize = "c")]
    ContentType,
    #[strum(to_string = "User-Agent")]
    UserAgent,
    #[strum(to_string = "Authorization")]
    Authorization,
    #[strum(to_string = "WWW-Authenticate")]
    WwwAuthenticate,
}

impl HeaderName {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// RFC 3261 compact form, if the field has one
    pub fn compact(&self) -> Option<&'static str> {
        match self {
            HeaderName::Via => Some("v"),
            HeaderName::From => Some("f"),
            HeaderName::To => Some("t"),
            HeaderName::CallId => Some("i"),
            HeaderName::Contact => Some("m"),
            HeaderName::ContentLength => Some("l"),
            HeaderName::ContentType => Some("c"),
            _ => None,
        }
    }
}

/// Emission order of the aggregate. Extension fields go just before
/// Content-Length, which always closes the block.
pub const CANONICAL_ORDER: [HeaderName; 14] = [
    HeaderName::Via,
    HeaderName::Route,
    HeaderName::From,
    HeaderName::To,
    HeaderName::CallId,
    HeaderName::CSeq,
    HeaderName::Contact,
    HeaderName::Authorization,
    HeaderName::WwwAuthenticate,
    HeaderName::MaxForwards,
    HeaderName::Expires,
    HeaderName::UserAgent,
    HeaderName::ContentType,
    HeaderName::ContentLength,
];

/// Split a header block into logical lines.
///
/// Accepts CRLF or bare LF. A line starting with SP or HT continues the
/// previous one and is joined with a single space. Blank lines are skipped.
pub fn unfold_lines(block: &str, limits: &ParserLimits) -> CodecResult<Vec<String>> {
    let mut lines: Vec<String> = Vec::new();

    for physical in block.split('\n') {
        let physical = physical.strip_suffix('\r').unwrap_or(physical);
        if physical.trim().is_empty() {
            continue;
        }

        if physical.starts_with([' ', '\t']) {
            let last = lines
                .last_mut()
                .ok_or_else(|| CodecError::unrecognized(FIELD, physical))?;
            last.push(' ');
            last.push_str(physical.trim());
            if last.len() > limits.max_header_line_length {
                return Err(CodecError::limit(
                    FIELD,
                    "header line length",
                    last.len(),
                    limits.max_header_line_length,
                ));
            }
            continue;
        }

        if physical.len() > limits.max_header_line_length {
            return Err(CodecError::limit(
                FIELD,
                "header line length",
                physical.len(),
                limits.max_header_line_length,
            ));
        }
        if lines.len() >= limits.max_headers {
            return Err(CodecError::limit(
                FIELD,
                "header count",
                lines.len() + 1,
                limits.max_headers,
            ));
        }
        lines.push(physical.to_string());
    }

    Ok(lines)
}

/// A header line whose name is outside the recognised set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionField {
    pub name: String,
    pub value: String,
}

impl ExtensionField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        ExtensionField {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn validate(&self) -> CodecResult<()> {
        const EXTENSION: &str = "Extension";
        validate_token(EXTENSION, "name", &self.name)?;
        if self.name.parse::<HeaderName>().is_ok() {
            return Err(CodecError::pattern(
                EXTENSION,
                "name",
                self.name.as_str(),
                "a name outside the recognised fields",
            ));
        }
        validate_header_value(EXTENSION, "value", &self.value)?;
        if self.value.trim() != self.value {
            return Err(CodecError::pattern(
                EXTENSION,
                "value",
                self.value.as_str(),
                "a value without leading or trailing whitespace",
            ));
        }
        Ok(())
    }
}

impl fmt::Display for ExtensionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// The header aggregate: at most one of each recognised field plus any
/// preserved extension fields. Presence reflects the input; validation
/// covers only the fields that are present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    via: Option<Via>,
    route: Option<Route>,
    from: Option<FromHeader>,
    to: Option<ToHeader>,
    call_id: Option<CallId>,
    cseq: Option<CSeq>,
    contact: Option<Contact>,
    authorization: Option<Authorization>,
    www_authenticate: Option<WwwAuthenticate>,
    max_forwards: Option<MaxForwards>,
    expires: Option<Expires>,
    user_agent: Option<UserAgent>,
    content_type: Option<ContentType>,
    content_length: Option<ContentLength>,
    extensions: Vec<ExtensionField>,
}

/// Getter, setter, builder, mutable getter and take for each field slot
macro_rules! header_accessors {
    ($($field:ident, $set:ident, $with:ident, $get_mut:ident, $take:ident: $ty:ty;)*) => {
        impl Header {
            $(
                pub fn $field(&self) -> Option<&$ty> {
                    self.$field.as_ref()
                }

                /// Store the field, returning the value it replaces.
                pub fn $set(&mut self, value: $ty) -> Option<$ty> {
                    self.$field.replace(value)
                }

                pub fn $with(mut self, value: $ty) -> Self {
                    self.$field = Some(value);
                    self
                }

                pub fn $get_mut(&mut self) -> Option<&mut $ty> {
                    self.$field.as_mut()
                }

                pub fn $take(&mut self) -> Option<$ty> {
                    self.$field.take()
                }
            )*
        }
    };
}

header_accessors! {
    via, set_via, with_via, via_mut, take_via: Via;
    route, set_route, with_route, route_mut, take_route: Route;
    from, set_from, with_from, from_mut, take_from: FromHeader;
    to, set_to, with_to, to_mut, take_to: ToHeader;
    call_id, set_call_id, with_call_id, call_id_mut, take_call_id: CallId;
    cseq, set_cseq, with_cseq, cseq_mut, take_cseq: CSeq;
    contact, set_contact, with_contact, contact_mut, take_contact: Contact;
    authorization, set_authorization, with_authorization, authorization_mut,
        take_authorization: Authorization;
    www_authenticate, set_www_authenticate, with_www_authenticate, www_authenticate_mut,
        take_www_authenticate: WwwAuthenticate;
    max_forwards, set_max_forwards, with_max_forwards, max_forwards_mut,
        take_max_forwards: MaxForwards;
    expires, set_expires, with_expires, expires_mut, take_expires: Expires;
    user_agent, set_user_agent, with_user_agent, user_agent_mut, take_user_agent: UserAgent;
    content_type, set_content_type, with_content_type, content_type_mut,
        take_content_type: ContentType;
    content_length, set_content_length, with_content_length, content_length_mut,
        take_content_length: ContentLength;
}

/// Decode `line` into `slot`; a repeated field keeps the last value.
fn decode_into<T: Codec>(
    slot: &mut Option<T>,
    line: &str,
    profile: &Profile,
    name: HeaderName,
) -> CodecResult<()> {
    let value = T::decode_with(line, profile).map_err(|e| e.within(FIELD))?;
    if slot.replace(value).is_some() {
        debug!(field = %name, "repeated header field, keeping the last value");
    }
    Ok(())
}

fn check<T: Codec>(field: Option<&T>, profile: &Profile) -> CodecResult<()> {
    match field {
        Some(field) => field.validate_with(profile).map_err(|e| e.within(FIELD)),
        None => Ok(()),
    }
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extensions(&self) -> &[ExtensionField] {
        &self.extensions
    }

    /// First extension field with this name, compared case-insensitively
    pub fn extension(&self, name: &str) -> Option<&ExtensionField> {
        self.extensions
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn push_extension(&mut self, field: ExtensionField) {
        self.extensions.push(field);
    }

    pub fn contains(&self, name: HeaderName) -> bool {
        match name {
            HeaderName::Via => self.via.is_some(),
            HeaderName::From => self.from.is_some(),
            HeaderName::To => self.to.is_some(),
            HeaderName::CallId => self.call_id.is_some(),
            HeaderName::CSeq => self.cseq.is_some(),
            HeaderName::Contact => self.contact.is_some(),
            HeaderName::Route => self.route.is_some(),
            HeaderName::MaxForwards => self.max_forwards.is_some(),
            HeaderName::Expires => self.expires.is_some(),
            HeaderName::ContentLength => self.content_length.is_some(),
            HeaderName::ContentType => self.content_type.is_some(),
            HeaderName::UserAgent => self.user_agent.is_some(),
            HeaderName::Authorization => self.authorization.is_some(),
            HeaderName::WwwAuthenticate => self.www_authenticate.is_some(),
        }
    }

    /// Number of lines this aggregate serializes to
    pub fn len(&self) -> usize {
        CANONICAL_ORDER.iter().filter(|n| self.contains(**n)).count() + self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode one logical line into its slot.
    pub fn decode_line(&mut self, line: &str, profile: &Profile) -> CodecResult<()> {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| CodecError::unrecognized(FIELD, line))?;
        let name = name.trim();

        let known = match name.parse::<HeaderName>() {
            Ok(known) => known,
            Err(_) => {
                if name.is_empty() || validate_token(FIELD, "name", name).is_err() {
                    return Err(CodecError::unrecognized(FIELD, line));
                }
                debug!(name, "preserving unrecognized header field");
                self.extensions.push(ExtensionField::new(name, value.trim()));
                return Ok(());
            }
        };
        trace!(field = %known, "dispatching header line");

        match known {
            HeaderName::Via => decode_into(&mut self.via, line, profile, known),
            HeaderName::From => decode_into(&mut self.from, line, profile, known),
            HeaderName::To => decode_into(&mut self.to, line, profile, known),
            HeaderName::CallId => decode_into(&mut self.call_id, line, profile, known),
            HeaderName::CSeq => decode_into(&mut self.cseq, line, profile, known),
            HeaderName::Contact => decode_into(&mut self.contact, line, profile, known),
            HeaderName::Route => decode_into(&mut self.route, line, profile, known),
            HeaderName::MaxForwards => decode_into(&mut self.max_forwards, line, profile, known),
            HeaderName::Expires => decode_into(&mut self.expires, line, profile, known),
            HeaderName::ContentLength => {
                decode_into(&mut self.content_length, line, profile, known)
            }
            HeaderName::ContentType => decode_into(&mut self.content_type, line, profile, known),
            HeaderName::UserAgent => decode_into(&mut self.user_agent, line, profile, known),
            HeaderName::Authorization => decode_into(&mut self.authorization, line, profile, known),
            HeaderName::WwwAuthenticate => {
                decode_into(&mut self.www_authenticate, line, profile, known)
            }
        }
    }

    fn write_field(&self, f: &mut fmt::Formatter<'_>, name: HeaderName) -> fmt::Result {
        fn line<T: fmt::Display>(f: &mut fmt::Formatter<'_>, field: Option<&T>) -> fmt::Result {
            match field {
                Some(field) => write!(f, "{}\r\n", field),
                None => Ok(()),
            }
        }
        match name {
            HeaderName::Via => line(f, self.via.as_ref()),
            HeaderName::From => line(f, self.from.as_ref()),
            HeaderName::To => line(f, self.to.as_ref()),
            HeaderName::CallId => line(f, self.call_id.as_ref()),
            HeaderName::CSeq => line(f, self.cseq.as_ref()),
            HeaderName::Contact => line(f, self.contact.as_ref()),
            HeaderName::Route => line(f, self.route.as_ref()),
            HeaderName::MaxForwards => line(f, self.max_forwards.as_ref()),
            HeaderName::Expires => line(f, self.expires.as_ref()),
            HeaderName::ContentLength => line(f, self.content_length.as_ref()),
            HeaderName::ContentType => line(f, self.content_type.as_ref()),
            HeaderName::UserAgent => line(f, self.user_agent.as_ref()),
            HeaderName::Authorization => line(f, self.authorization.as_ref()),
            HeaderName::WwwAuthenticate => line(f, self.www_authenticate.as_ref()),
        }
    }
}

impl Codec for Header {
    fn decode_with(raw: &str, profile: &Profile) -> CodecResult<Self> {
        if raw.trim().is_empty() {
            return Err(CodecError::empty(FIELD));
        }
        let mut header = Header::new();
        for line in unfold_lines(raw, profile.limits())? {
            header.decode_line(&line, profile)?;
        }
        Ok(header)
    }

    fn validate_with(&self, profile: &Profile) -> CodecResult<()> {
        check(self.via.as_ref(), profile)?;
        check(self.route.as_ref(), profile)?;
        check(self.from.as_ref(), profile)?;
        check(self.to.as_ref(), profile)?;
        check(self.call_id.as_ref(), profile)?;
        check(self.cseq.as_ref(), profile)?;
        check(self.contact.as_ref(), profile)?;
        check(self.authorization.as_ref(), profile)?;
        check(self.www_authenticate.as_ref(), profile)?;
        check(self.max_forwards.as_ref(), profile)?;
        check(self.expires.as_ref(), profile)?;
        check(self.user_agent.as_ref(), profile)?;
        check(self.content_type.as_ref(), profile)?;
        check(self.content_length.as_ref(), profile)?;
        for extension in &self.extensions {
            extension.validate().map_err(|e| e.within(FIELD))?;
        }
        Ok(())
    }

    /// Every line is already CRLF-terminated; an empty aggregate is "".
    fn serialize_with(&self, profile: &Profile) -> CodecResult<String> {
        self.validate_with(profile)?;
        Ok(self.to_string())
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in CANONICAL_ORDER {
            if name == HeaderName::ContentLength {
                for extension in &self.extensions {
                    write!(f, "{}\r\n", extension)?;
                }
            }
            self.write_field(f, name)?;
        }
        Ok(())
    }
}
