//! Authorization and WWW-Authenticate:
//! `Scheme name="value",name="value",...,algorithm=MD5`
//!
//! Parameters outside the recognised set are kept verbatim, in wire order,
//! and re-emitted after the recognised ones.

use std::fmt;

use crate::codec::Codec;
use crate::error::{CodecError, CodecResult};
use crate::headers::HeaderName;
use crate::parsing::{split_outside, strip_field_name, unquote};
use crate::profile::Profile;
use crate::types::{Algorithm, AuthScheme};
use crate::uri::Uri;
use crate::validation::{validate_header_value, validate_token};

/// An unrecognised `name=value` pair; `value` keeps any quotes it arrived with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthParam {
    pub name: String,
    pub value: String,
}

impl AuthParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        AuthParam {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Value with surrounding quotes removed
    pub fn unquoted(&self) -> &str {
        unquote(&self.value)
    }

    /// `reserved` lists the names the owning field decodes into dedicated
    /// members; an extra parameter under one of them would shadow it.
    fn validate(&self, field: &'static str, reserved: &[&str]) -> CodecResult<()> {
        validate_token(field, "parameter name", &self.name)?;
        if reserved.iter().any(|r| r.eq_ignore_ascii_case(&self.name)) {
            return Err(CodecError::pattern(
                field,
                "parameter name",
                self.name.as_str(),
                "a parameter without a dedicated field",
            ));
        }
        validate_header_value(field, "parameter value", &self.value)?;
        match self.value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
            Some(inner) if !is_closed_quoted(inner) => Err(CodecError::pattern(
                field,
                "parameter value",
                self.value.as_str(),
                "a quoted string with escaped inner quotes",
            )),
            Some(_) => Ok(()),
            None if self.value.chars().any(|c| c == ',' || c == '"' || c.is_whitespace()) => {
                Err(CodecError::pattern(
                    field,
                    "parameter value",
                    self.value.as_str(),
                    "a token or a quoted string",
                ))
            }
            None => Ok(()),
        }
    }
}

/// True when every quote inside `inner` is escaped and no escape is left
/// dangling before the closing quote.
fn is_closed_quoted(inner: &str) -> bool {
    let mut escaped = false;
    for c in inner.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return false,
            _ => {}
        }
    }
    !escaped
}

const AUTHORIZATION_KEYS: [&str; 6] = [
    "username",
    "realm",
    "nonce",
    "uri",
    "response",
    "algorithm",
];
const CHALLENGE_KEYS: [&str; 3] = ["realm", "nonce", "algorithm"];

/// Split `Scheme k=v,k=v` into the scheme and its raw pairs.
fn decode_challenge<'a>(
    field: &'static str,
    payload: &'a str,
) -> CodecResult<(AuthScheme, Vec<(&'a str, &'a str)>)> {
    let (scheme, rest) = payload
        .split_once(|c: char| c.is_ascii_whitespace())
        .unwrap_or((payload, ""));
    if scheme.is_empty() {
        return Err(CodecError::missing(field, "scheme"));
    }
    let scheme = scheme
        .parse::<AuthScheme>()
        .map_err(|_| CodecError::not_allowed(field, "scheme", scheme, "Digest, Basic"))?;

    let mut pairs = Vec::new();
    for item in split_outside(rest, ',').into_iter().map(str::trim) {
        if item.is_empty() {
            continue;
        }
        let (name, value) = item
            .split_once('=')
            .ok_or_else(|| CodecError::pattern(field, "parameter", item, "name=value"))?;
        pairs.push((name.trim(), value.trim()));
    }
    Ok((scheme, pairs))
}

fn decode_algorithm(field: &'static str, value: &str) -> CodecResult<Algorithm> {
    let value = unquote(value);
    value
        .parse::<Algorithm>()
        .map_err(|_| CodecError::not_allowed(field, "algorithm", value, "MD5"))
}

/// Quoted-string parameters: present, single-line and free of quotes.
fn check_quoted(field: &'static str, subfield: &'static str, value: &str) -> CodecResult<()> {
    if value.trim().is_empty() {
        return Err(CodecError::missing(field, subfield));
    }
    validate_header_value(field, subfield, value)?;
    if value.contains(['"', '\\']) {
        return Err(CodecError::pattern(field, subfield, value, "text without quotes"));
    }
    Ok(())
}

fn write_tail(
    f: &mut fmt::Formatter<'_>,
    algorithm: Option<Algorithm>,
    extra: &[AuthParam],
) -> fmt::Result {
    if let Some(algorithm) = algorithm {
        write!(f, ",algorithm={}", algorithm)?;
    }
    for param in extra {
        write!(f, ",{}={}", param.name, param.value)?;
    }
    Ok(())
}

/// Client credentials answering a challenge
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Authorization {
    pub scheme: AuthScheme,
    pub username: String,
    pub realm: String,
    pub nonce: String,
    /// Required by validation
    pub uri: Option<Uri>,
    pub response: String,
    pub algorithm: Option<Algorithm>,
    pub extra: Vec<AuthParam>,
}

impl Authorization {
    pub fn digest(
        username: impl Into<String>,
        realm: impl Into<String>,
        nonce: impl Into<String>,
        uri: Uri,
        response: impl Into<String>,
    ) -> Self {
        Authorization {
            scheme: AuthScheme::Digest,
            username: username.into(),
            realm: realm.into(),
            nonce: nonce.into(),
            uri: Some(uri),
            response: response.into(),
            algorithm: Some(Algorithm::Md5),
            extra: Vec::new(),
        }
    }

    /// Look up an unrecognised parameter such as `qop` or `cnonce`
    pub fn extra(&self, name: &str) -> Option<&AuthParam> {
        self.extra.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

impl Codec for Authorization {
    fn decode_with(raw: &str, profile: &Profile) -> CodecResult<Self> {
        const FIELD: &str = "Authorization";
        let payload = strip_field_name(raw, HeaderName::Authorization)?;
        let (scheme, pairs) = decode_challenge(FIELD, payload)?;

        let mut auth = Authorization {
            scheme,
            ..Default::default()
        };
        for (name, value) in pairs {
            match name.to_ascii_lowercase().as_str() {
                "username" => auth.username = unquote(value).to_string(),
                "realm" => auth.realm = unquote(value).to_string(),
                "nonce" => auth.nonce = unquote(value).to_string(),
                "response" => auth.response = unquote(value).to_string(),
                "uri" => {
                    let uri = unquote(value).trim_start_matches('<').trim_end_matches('>');
                    auth.uri = Some(Uri::decode_with(uri, profile).map_err(|e| e.within(FIELD))?);
                }
                "algorithm" => auth.algorithm = Some(decode_algorithm(FIELD, value)?),
                _ => auth.extra.push(AuthParam::new(name, value)),
            }
        }
        Ok(auth)
    }

    fn validate_with(&self, profile: &Profile) -> CodecResult<()> {
        const FIELD: &str = "Authorization";
        check_quoted(FIELD, "username", &self.username)?;
        check_quoted(FIELD, "realm", &self.realm)?;
        check_quoted(FIELD, "nonce", &self.nonce)?;
        self.uri
            .as_ref()
            .ok_or_else(|| CodecError::missing(FIELD, "uri"))?
            .validate_with(profile)
            .map_err(|e| e.within(FIELD))?;
        check_quoted(FIELD, "response", &self.response)?;
        self.extra
            .iter()
            .try_for_each(|p| p.validate(FIELD, &AUTHORIZATION_KEYS))
    }
}

impl fmt::Display for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} username=\"{}\",realm=\"{}\",nonce=\"{}\"",
            HeaderName::Authorization,
            self.scheme,
            self.username,
            self.realm,
            self.nonce
        )?;
        if let Some(uri) = &self.uri {
            write!(f, ",uri=\"{}\"", uri)?;
        }
        write!(f, ",response=\"{}\"", self.response)?;
        write_tail(f, self.algorithm, &self.extra)
    }
}

/// Server challenge carried by a 401 response
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WwwAuthenticate {
    pub scheme: AuthScheme,
    pub realm: String,
    pub nonce: String,
    pub algorithm: Option<Algorithm>,
    pub extra: Vec<AuthParam>,
}

impl WwwAuthenticate {
    pub fn digest(realm: impl Into<String>, nonce: impl Into<String>) -> Self {
        WwwAuthenticate {
            scheme: AuthScheme::Digest,
            realm: realm.into(),
            nonce: nonce.into(),
            algorithm: None,
            extra: Vec::new(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    pub fn extra(&self, name: &str) -> Option<&AuthParam> {
        self.extra.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

impl Codec for WwwAuthenticate {
    fn decode_with(raw: &str, _profile: &Profile) -> CodecResult<Self> {
        const FIELD: &str = "WWW-Authenticate";
        let payload = strip_field_name(raw, HeaderName::WwwAuthenticate)?;
        let (scheme, pairs) = decode_challenge(FIELD, payload)?;

        let mut challenge = WwwAuthenticate {
            scheme,
            ..Default::default()
        };
        for (name, value) in pairs {
            match name.to_ascii_lowercase().as_str() {
                "realm" => challenge.realm = unquote(value).to_string(),
                "nonce" => challenge.nonce = unquote(value).to_string(),
                "algorithm" => challenge.algorithm = Some(decode_algorithm(FIELD, value)?),
                _ => challenge.extra.push(AuthParam::new(name, value)),
            }
        }
        Ok(challenge)
    }

    fn validate_with(&self, _profile: &Profile) -> CodecResult<()> {
        const FIELD: &str = "WWW-Authenticate";
        check_quoted(FIELD, "realm", &self.realm)?;
        check_quoted(FIELD, "nonce", &self.nonce)?;
        self.extra
            .iter()
            .try_for_each(|p| p.validate(FIELD, &CHALLENGE_KEYS))
    }
}

impl fmt::Display for WwwAuthenticate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} realm=\"{}\",nonce=\"{}\"",
            HeaderName::WwwAuthenticate,
            self.scheme,
            self.realm,
            self.nonce
        )?;
        write_tail(f, self.algorithm, &self.extra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const AUTHORIZATION: &str = "Authorization: Digest username=\"34020000001320000001\",realm=\"3402000000\",nonce=\"9bd055\",uri=\"sip:34020000002000000001@3402000000\",response=\"fe2b3ba9\",algorithm=MD5";

    #[test]
    fn test_authorization_round_trip() {
        let auth = Authorization::parse(AUTHORIZATION).unwrap();
        assert_eq!(auth.scheme, AuthScheme::Digest);
        assert_eq!(auth.username, "34020000001320000001");
        assert_eq!(auth.realm, "3402000000");
        assert_eq!(auth.nonce, "9bd055");
        assert_eq!(auth.response, "fe2b3ba9");
        assert_eq!(auth.algorithm, Some(Algorithm::Md5));
        assert_eq!(auth.uri.as_ref().map(|u| u.host.as_str()), Some("3402000000"));
        assert_eq!(auth.serialize().unwrap(), format!("{}\r\n", AUTHORIZATION));
    }

    #[test]
    fn test_authorization_normalizes_case_and_keeps_unknown() {
        let auth = Authorization::parse(
            "Authorization: digest Username=\"34020000001320000001\", realm=\"3402000000\", nonce=\"n\", uri=\"sip:34020000002000000001@3402000000\", response=\"r\", algorithm=md5, qop=auth, nc=00000001, cnonce=\"0a4f113b\"",
        )
        .unwrap();
        assert_eq!(auth.extra.len(), 3);
        assert_eq!(auth.extra("CNONCE").map(AuthParam::unquoted), Some("0a4f113b"));
        assert_eq!(
            auth.to_string(),
            "Authorization: Digest username=\"34020000001320000001\",realm=\"3402000000\",nonce=\"n\",uri=\"sip:34020000002000000001@3402000000\",response=\"r\",algorithm=MD5,qop=auth,nc=00000001,cnonce=\"0a4f113b\""
        );
    }

    #[test]
    fn test_authorization_rejections() {
        let err = Authorization::parse(&AUTHORIZATION.replace("MD5", "SHA-256")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EnumMismatch);

        let err = Authorization::parse(&AUTHORIZATION.replace("Digest", "Bearer")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EnumMismatch);

        let err = Authorization::parse(&AUTHORIZATION.replace(",response=\"fe2b3ba9\"", ""))
            .unwrap_err();
        assert_eq!(err, CodecError::missing("Authorization", "response"));

        let err = Authorization::parse(&AUTHORIZATION.replace("@3402000000\"", "@9999999999\""))
            .unwrap_err();
        assert_eq!(err.path(), vec!["Authorization", "URI"]);
    }

    #[test]
    fn test_extra_may_not_shadow_recognised_params() {
        let mut auth = Authorization::parse(AUTHORIZATION).unwrap();
        auth.extra.push(AuthParam::new("Realm", "\"other\""));
        let err = auth.serialize().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PatternMismatch);
        assert_eq!(err.field(), "Authorization");

        let mut challenge = WwwAuthenticate::digest("3402000000", "abc");
        challenge.extra.push(AuthParam::new("nonce", "\"def\""));
        assert!(challenge.validate().is_err());

        // Authorization-only names are plain extras on a challenge.
        challenge.extra = vec![AuthParam::new("response", "\"r\"")];
        let wire = challenge.serialize().unwrap();
        assert_eq!(WwwAuthenticate::parse(&wire), Ok(challenge));
    }

    #[test]
    fn test_extra_quoted_values() {
        let mut challenge = WwwAuthenticate::digest("3402000000", "abc");
        challenge.extra = vec![
            AuthParam::new("opaque", "\"a\\\"b\""),
            AuthParam::new("qop", "\"auth,auth-int\""),
        ];
        let wire = challenge.serialize().unwrap();
        assert_eq!(WwwAuthenticate::parse(&wire), Ok(challenge.clone()));

        challenge.extra = vec![AuthParam::new("opaque", "\"a\"b\"")];
        assert!(challenge.validate().is_err());
        challenge.extra = vec![AuthParam::new("opaque", "\"a\\\"")];
        assert!(challenge.validate().is_err());
    }

    #[test]
    fn test_www_authenticate() {
        let challenge = WwwAuthenticate::parse(
            "WWW-Authenticate: Digest realm=\"3402000000\",nonce=\"6fe9ba44a76be22a\"",
        )
        .unwrap();
        assert_eq!(challenge.algorithm, None);
        assert_eq!(
            challenge.serialize().unwrap(),
            "WWW-Authenticate: Digest realm=\"3402000000\",nonce=\"6fe9ba44a76be22a\"\r\n"
        );

        let challenge = WwwAuthenticate::digest("3402000000", "abc")
            .with_algorithm(Algorithm::Md5);
        assert_eq!(
            challenge.to_string(),
            "WWW-Authenticate: Digest realm=\"3402000000\",nonce=\"abc\",algorithm=MD5"
        );
    }

    #[test]
    fn test_www_authenticate_keeps_unknown_params() {
        let challenge = WwwAuthenticate::parse(
            "www-authenticate: Digest realm=\"3402000000\", nonce=\"abc\", qop=\"auth,auth-int\", stale=FALSE",
        )
        .unwrap();
        assert_eq!(challenge.extra("qop").map(AuthParam::unquoted), Some("auth,auth-int"));
        assert!(challenge.to_string().ends_with(",qop=\"auth,auth-int\",stale=FALSE"));

        let err = WwwAuthenticate::parse("WWW-Authenticate: Digest nonce=\"abc\"").unwrap_err();
        assert_eq!(err, CodecError::missing("WWW-Authenticate", "realm"));
    }
}
