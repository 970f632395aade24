//! Via: `SIP/2.0/UDP host[:port][;rport[=n]];branch=x[;received=y]`

use std::fmt;

use crate::codec::Codec;
use crate::error::{CodecError, CodecResult};
use crate::headers::HeaderName;
use crate::parsing::{
    check_version, parse_protocol_version, parse_unsigned, split_host_port, strip_field_name,
    write_host_port,
};
use crate::profile::Profile;
use crate::types::{Params, Protocol, Transport, Version};
use crate::validation::{is_ip_literal, validate_header_value, validate_host, validate_token};

const FIELD: &str = "Via";

/// Parameters with dedicated fields; they may not also appear in `params`.
const RESERVED: [&str; 3] = ["rport", "branch", "received"];

/// The two present states of the `rport` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rport {
    /// `;rport` with no value: the sender asks for symmetric response routing
    Requested,
    /// `;rport=n`: the port the request was received from
    Port(u16),
}

impl Rport {
    /// Read a wire value. 1 is the present-without-value sentinel, so
    /// `;rport=1` means the same as a bare `;rport`.
    pub fn from_value(port: u16) -> Self {
        match port {
            1 => Rport::Requested,
            port => Rport::Port(port),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Via {
    pub protocol: Protocol,
    pub version: Version,
    pub transport: Transport,
    pub host: String,
    pub port: Option<u16>,
    pub rport: Option<Rport>,
    pub branch: String,
    pub received: Option<String>,
    /// Any other parameters, in wire order
    pub params: Params,
}

impl Via {
    pub fn new(transport: Transport, host: impl Into<String>, branch: impl Into<String>) -> Self {
        Via {
            protocol: Protocol::SIP,
            version: Version::SIP_2_0,
            transport,
            host: host.into(),
            port: None,
            rport: None,
            branch: branch.into(),
            received: None,
            params: Params::new(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port).filter(|p| *p != 0);
        self
    }

    pub fn with_rport(mut self, rport: Rport) -> Self {
        self.rport = Some(rport);
        self
    }

    pub fn with_received(mut self, received: impl Into<String>) -> Self {
        self.received = Some(received.into());
        self
    }

    /// Integer encoding of `rport`: 0 absent, 1 requested, otherwise the port.
    pub fn rport_sentinel(&self) -> u16 {
        match self.rport {
            None => 0,
            Some(Rport::Requested) => 1,
            Some(Rport::Port(port)) => port,
        }
    }

    /// Stamp the address a request actually came from, as a server does
    /// before relaying or answering it.
    pub fn stamp_source(&mut self, received: impl Into<String>, port: u16) {
        self.received = Some(received.into());
        if self.rport.is_some() {
            self.rport = Some(Rport::from_value(port));
        }
    }
}

impl Codec for Via {
    fn decode_with(raw: &str, _profile: &Profile) -> CodecResult<Self> {
        let payload = strip_field_name(raw, HeaderName::Via)?;

        let (sent_protocol, rest) = payload
            .split_once(|c: char| c.is_ascii_whitespace())
            .ok_or_else(|| CodecError::missing(FIELD, "sent-by"))?;
        let (protocol_version, transport) = sent_protocol
            .rsplit_once('/')
            .ok_or_else(|| {
                CodecError::pattern(FIELD, "sent-protocol", sent_protocol, "SIP/2.0/UDP")
            })?;
        let (protocol, version) = parse_protocol_version(FIELD, protocol_version)?;
        let transport = transport
            .parse::<Transport>()
            .map_err(|_| CodecError::not_allowed(FIELD, "transport", transport, "UDP, TCP"))?;

        let mut segments = rest.split(';');
        let sent_by = segments.next().unwrap_or_default().trim();
        if sent_by.is_empty() {
            return Err(CodecError::missing(FIELD, "sent-by"));
        }
        let (host, port) = split_host_port(FIELD, sent_by)?;

        let mut via = Via {
            protocol,
            version,
            transport,
            host: host.to_string(),
            port,
            rport: None,
            branch: String::new(),
            received: None,
            params: Params::new(),
        };

        for segment in segments.map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = match segment.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (segment, None),
            };
            if key.eq_ignore_ascii_case("rport") {
                via.rport = Some(match value.filter(|v| !v.is_empty()) {
                    Some(port) => {
                        Rport::from_value(parse_unsigned::<u16>(FIELD, "rport", port)?)
                    }
                    None => Rport::Requested,
                });
            } else if key.eq_ignore_ascii_case("branch") {
                via.branch = value.unwrap_or_default().to_string();
            } else if key.eq_ignore_ascii_case("received") {
                via.received = Some(value.unwrap_or_default().to_string());
            } else {
                via.params.insert(key, value.map(str::to_string));
            }
        }

        Ok(via)
    }

    fn validate_with(&self, _profile: &Profile) -> CodecResult<()> {
        check_version(FIELD, self.version)?;

        let host = self.host.trim();
        if host.is_empty() {
            return Err(CodecError::missing(FIELD, "sent-by"));
        }
        validate_host(FIELD, "sent-by", &self.host)?;
        if is_ip_literal(host) && self.port.unwrap_or(0) == 0 {
            return Err(CodecError::missing(FIELD, "port"));
        }

        match (self.rport, self.received.as_deref()) {
            (Some(Rport::Port(port @ (0 | 1))), _) => {
                return Err(CodecError::pattern(
                    FIELD,
                    "rport",
                    port.to_string(),
                    "a port in 2-65535",
                ));
            }
            (Some(Rport::Port(_)), None | Some("")) => {
                return Err(CodecError::inconsistent(
                    FIELD,
                    "rport carries a response port but received is not set",
                ));
            }
            _ => {}
        }

        validate_token(FIELD, "branch", &self.branch)?;

        if let Some(received) = &self.received {
            if received.is_empty() {
                return Err(CodecError::missing(FIELD, "received"));
            }
            validate_header_value(FIELD, "received", received)?;
            if received.bytes().any(|b| b.is_ascii_whitespace() || matches!(b, b';' | b',')) {
                return Err(CodecError::pattern(FIELD, "received", received, "an address"));
            }
        }

        if let Some(key) = RESERVED.iter().copied().find(|key| self.params.contains(key)) {
            return Err(CodecError::pattern(
                FIELD,
                "parameter name",
                key,
                "a parameter without a dedicated field",
            ));
        }
        self.params.validate(FIELD)
    }
}

impl fmt::Display for Via {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{}/{} ",
            HeaderName::Via,
            self.protocol,
            self.version,
            self.transport
        )?;
        write_host_port(f, &self.host, self.port)?;
        match self.rport {
            Some(Rport::Requested) => write!(f, ";rport;branch={}", self.branch)?,
            Some(Rport::Port(port)) => write!(f, ";rport={};branch={}", port, self.branch)?,
            None => write!(f, ";branch={}", self.branch)?,
        }
        if let Some(received) = &self.received {
            write!(f, ";received={}", received)?;
        }
        write!(f, "{}", self.params)
    }
}
