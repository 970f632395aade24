//! SIP URI codec: `scheme:identifier@host[:port][;params]`

use std::fmt;

use crate::codec::Codec;
use crate::error::{CodecError, CodecResult};
use crate::parsing::{split_host_port, trim_line, write_host_port};
use crate::profile::Profile;
use crate::types::{Params, Scheme};
use crate::validation::{is_ip_literal, validate_host, validate_identifier};

const FIELD: &str = "URI";

/// A device or platform address.
///
/// `host` is either an IP literal, in which case `port` is mandatory, or the
/// realm: the leading digits of `user` as configured by the profile.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Uri {
    pub scheme: Scheme,
    pub user: String,
    pub host: String,
    /// `None` and `Some(0)` both mean unset
    pub port: Option<u16>,
    pub params: Params,
}

impl Uri {
    pub fn new(user: impl Into<String>, host: impl Into<String>) -> Self {
        Uri {
            scheme: Scheme::SIP,
            user: user.into(),
            host: host.into(),
            port: None,
            params: Params::new(),
        }
    }

    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port).filter(|p| *p != 0);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: Option<&str>) -> Self {
        self.params.insert(key, value.map(str::to_string));
        self
    }

    /// Port as carried on the wire, 0 when unset
    pub fn port_or_zero(&self) -> u16 {
        self.port.unwrap_or(0)
    }

    /// Realm digits of the identifier under `profile`
    pub fn realm<'a>(&'a self, profile: &Profile) -> Option<&'a str> {
        self.user.get(..profile.realm_prefix_length())
    }

    pub fn is_ip_host(&self) -> bool {
        is_ip_literal(&self.host)
    }
}

impl Codec for Uri {
    fn decode_with(raw: &str, profile: &Profile) -> CodecResult<Self> {
        let line = trim_line(FIELD, raw)?;

        let (scheme, rest) = line
            .split_once(':')
            .ok_or_else(|| CodecError::missing(FIELD, "scheme"))?;
        let scheme = scheme
            .trim()
            .parse::<Scheme>()
            .map_err(|_| CodecError::not_allowed(FIELD, "scheme", scheme, profile.scheme_list()))?;

        let (user, rest) = rest
            .split_once('@')
            .ok_or_else(|| CodecError::missing(FIELD, "user"))?;

        let (hostport, params) = match rest.split_once(';') {
            Some((hostport, params)) => (hostport, Params::parse(params)),
            None => (rest, Params::new()),
        };
        let (host, port) = split_host_port(FIELD, hostport)?;

        Ok(Uri {
            scheme,
            user: user.trim().to_string(),
            host: host.to_string(),
            port,
            params,
        })
    }

    fn validate_with(&self, profile: &Profile) -> CodecResult<()> {
        if !profile.allows_scheme(self.scheme) {
            return Err(CodecError::not_allowed(
                FIELD,
                "scheme",
                self.scheme.to_string(),
                profile.scheme_list(),
            ));
        }
        validate_identifier(FIELD, "user", &self.user, profile.id_length())?;

        let host = self.host.trim();
        if host.is_empty() {
            return Err(CodecError::missing(FIELD, "host"));
        }
        validate_host(FIELD, "host", &self.host)?;
        if is_ip_literal(host) {
            if self.port_or_zero() == 0 {
                return Err(CodecError::missing(FIELD, "port"));
            }
        } else {
            let realm = self.realm(profile).unwrap_or_default();
            if host != realm {
                return Err(CodecError::inconsistent(
                    FIELD,
                    format!(
                        "host {:?} must equal the {}-digit realm {:?} of user {:?}",
                        host,
                        profile.realm_prefix_length(),
                        realm,
                        self.user
                    ),
                ));
            }
        }

        self.params.validate(FIELD)
    }

    /// URIs are embedded in other lines, so no terminator is added.
    fn serialize_with(&self, profile: &Profile) -> CodecResult<String> {
        self.validate_with(profile)?;
        Ok(self.to_string())
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@", self.scheme, self.user)?;
        write_host_port(f, &self.host, self.port)?;
        write!(f, "{}", self.params)
    }
}
