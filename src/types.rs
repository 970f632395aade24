//! Common types and enums used throughout the gbsip codec

use std::fmt;
use std::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::{CodecError, CodecResult};

/// URI schemes accepted in the request URI and name-addr fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Scheme {
    #[default]
    SIP,
    SIPS,
}

/// Protocol token of the Request-Line, Status-Line and Via sent-protocol.
/// Always emitted upper-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Protocol {
    #[default]
    SIP,
}

/// SIP methods as defined in RFC 3261 and extensions
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Method {
    INVITE,
    ACK,
    OPTIONS,
    BYE,
    CANCEL,
    REGISTER,
    PRACK,     // RFC 3262
    SUBSCRIBE, // RFC 6665
    NOTIFY,    // RFC 6665
    PUBLISH,   // RFC 3903
    INFO,      // RFC 6086
    REFER,     // RFC 3515
    MESSAGE,   // RFC 3428
    UPDATE,    // RFC 3311
}

/// Via transport; GB28181 signalling runs over UDP or TCP only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Transport {
    #[default]
    UDP,
    TCP,
}

/// Authentication scheme of Authorization and WWW-Authenticate.
/// Displayed in title case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum AuthScheme {
    #[default]
    Digest,
    Basic,
}

/// Digest algorithm; the profile only defines MD5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Algorithm {
    #[default]
    #[strum(serialize = "MD5")]
    Md5,
}

/// Protocol version carried as `major.minor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    /// The only version this profile speaks
    pub const SIP_2_0: Version = Version { major: 2, minor: 0 };

    pub const fn new(major: u8, minor: u8) -> Self {
        Version { major, minor }
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::SIP_2_0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for Version {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s.split_once('.').ok_or(())?;
        if major.is_empty()
            || minor.len() != 1
            || !major.bytes().all(|b| b.is_ascii_digit())
            || !minor.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(());
        }
        Ok(Version {
            major: major.parse().map_err(|_| ())?,
            minor: minor.parse().map_err(|_| ())?,
        })
    }
}

/// Ordered extension parameter list.
///
/// Insertion order is kept so re-serialization is deterministic. Keys compare
/// ASCII case-insensitively; inserting an existing key replaces its value in
/// place (last wins). An empty value is stored as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    entries: Vec<(String, Option<String>)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        let key = key.into();
        let value = value.filter(|v| !v.is_empty());
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder form of [`Params::insert`]
    pub fn with(mut self, key: impl Into<String>, value: Option<&str>) -> Self {
        self.insert(key, value.map(str::to_string));
        self
    }

    /// `None` when the key is absent, `Some(None)` for a flag parameter.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_deref())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<Option<String>> {
        let pos = self
            .entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a `;`-separated `key[=value]` list. Leading/trailing separators
    /// and empty segments are skipped.
    pub fn parse(list: &str) -> Self {
        let mut params = Params::new();
        for segment in list.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            match segment.split_once('=') {
                Some((key, value)) => {
                    params.insert(key.trim(), Some(value.trim().to_string()))
                }
                None => params.insert(segment, None),
            }
        }
        params
    }

    /// Reject keys and values that would break the wire grammar.
    pub fn validate(&self, field: &'static str) -> CodecResult<()> {
        for (key, value) in self.iter() {
            if key.is_empty() || !key.bytes().all(is_token_byte) {
                return Err(CodecError::pattern(field, "parameter name", key, "a token"));
            }
            if let Some(value) = value {
                if value
                    .bytes()
                    .any(|b| matches!(b, b';' | b',' | b'<' | b'>' | b'\r' | b'\n' | b' ' | 0))
                {
                    return Err(CodecError::pattern(
                        field,
                        "parameter value",
                        value,
                        "a value without separators",
                    ));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.iter() {
            match value {
                Some(value) => write!(f, ";{}={}", key, value)?,
                None => write!(f, ";{}", key)?,
            }
        }
        Ok(())
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// RFC 3261 token characters
pub(crate) fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'-' | b'.' | b'!' | b'%' | b'*' | b'_' | b'+' | b'`' | b'\'' | b'~'
        )
}
