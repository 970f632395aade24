//! Whole-message framing: start line, header block, body
//!
//! The first line is a Status-Line when it starts with `SIP/` and a
//! Request-Line otherwise. The header block ends at the first empty line and
//! everything after it is the body. Body length is not checked against
//! Content-Length here; [`Message::validate_content_length`] is offered to
//! the transport layer that owns framing.

use std::fmt;

use tracing::trace;

use crate::codec::Codec;
use crate::error::{CodecError, CodecResult};
use crate::fields::ContentLength;
use crate::headers::Header;
use crate::profile::Profile;
use crate::request_line::RequestLine;
use crate::status_line::StatusLine;
use crate::types::Method;
use crate::validation::validate_content_length;

const FIELD: &str = "Message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartLine {
    Request(RequestLine),
    Status(StatusLine),
}

impl StartLine {
    pub fn is_request(&self) -> bool {
        matches!(self, StartLine::Request(_))
    }

    pub fn request(&self) -> Option<&RequestLine> {
        match self {
            StartLine::Request(line) => Some(line),
            StartLine::Status(_) => None,
        }
    }

    pub fn status(&self) -> Option<&StatusLine> {
        match self {
            StartLine::Status(line) => Some(line),
            StartLine::Request(_) => None,
        }
    }
}

fn is_status_line(line: &str) -> bool {
    line.get(..4)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("SIP/"))
}

impl Codec for StartLine {
    fn decode_with(raw: &str, profile: &Profile) -> CodecResult<Self> {
        if is_status_line(raw.trim_start()) {
            trace!("classified start line as Status-Line");
            StatusLine::decode_with(raw, profile).map(StartLine::Status)
        } else {
            trace!("classified start line as Request-Line");
            RequestLine::decode_with(raw, profile).map(StartLine::Request)
        }
    }

    fn validate_with(&self, profile: &Profile) -> CodecResult<()> {
        match self {
            StartLine::Request(line) => line.validate_with(profile),
            StartLine::Status(line) => line.validate_with(profile),
        }
    }
}

impl fmt::Display for StartLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartLine::Request(line) => fmt::Display::fmt(line, f),
            StartLine::Status(line) => fmt::Display::fmt(line, f),
        }
    }
}

impl From<RequestLine> for StartLine {
    fn from(line: RequestLine) -> Self {
        StartLine::Request(line)
    }
}

impl From<StatusLine> for StartLine {
    fn from(line: StatusLine) -> Self {
        StartLine::Status(line)
    }
}

/// A parsed message: start line, header aggregate and opaque body bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub start_line: StartLine,
    pub header: Header,
    pub body: Vec<u8>,
}

impl Message {
    pub fn new(start_line: impl Into<StartLine>, header: Header) -> Self {
        Message {
            start_line: start_line.into(),
            header,
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn is_request(&self) -> bool {
        self.start_line.is_request()
    }

    /// Request method, or the CSeq method for a response
    pub fn method(&self) -> Option<Method> {
        match &self.start_line {
            StartLine::Request(line) => Some(line.method),
            StartLine::Status(_) => self.header.cseq().map(|cseq| cseq.method),
        }
    }

    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Set Content-Length to the current body size.
    pub fn sync_content_length(&mut self) -> CodecResult<()> {
        let length = ContentLength::of(&self.body).ok_or_else(|| {
            CodecError::overflow(
                "Content-Length",
                "length",
                self.body.len().to_string(),
                "u32",
            )
        })?;
        self.header.set_content_length(length);
        Ok(())
    }

    /// Cross-check a present Content-Length against the body. An absent
    /// Content-Length passes.
    pub fn validate_content_length(&self) -> CodecResult<()> {
        match self.header.content_length() {
            Some(declared) => validate_content_length(declared.value(), self.body.len()),
            None => Ok(()),
        }
    }

    pub fn validate_with(&self, profile: &Profile) -> CodecResult<()> {
        self.start_line.validate_with(profile)?;
        self.header.validate_with(profile)
    }

    pub fn validate(&self) -> CodecResult<()> {
        self.validate_with(Profile::global())
    }
}

/// Split off the first line, tolerating CRLF or bare LF.
fn split_line(text: &str) -> (&str, &str) {
    match text.split_once('\n') {
        Some((line, rest)) => (line.strip_suffix('\r').unwrap_or(line), rest),
        None => (text, ""),
    }
}

/// Split the text after the start line at the first empty line.
fn split_head(text: &str) -> (&str, &str) {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']).is_empty() {
            return (&text[..offset], &text[offset + line.len()..]);
        }
        offset += line.len();
    }
    (text, "")
}

pub fn parse_message(raw: &str) -> CodecResult<Message> {
    parse_message_with(raw, Profile::global())
}

/// Frame, decode and validate a complete message.
pub fn parse_message_with(raw: &str, profile: &Profile) -> CodecResult<Message> {
    let limits = profile.limits();
    if raw.len() > limits.max_message_size {
        return Err(CodecError::limit(
            FIELD,
            "message size",
            raw.len(),
            limits.max_message_size,
        ));
    }

    // Leading CRLFs are keep-alive padding.
    let text = raw.trim_start_matches(['\r', '\n']);
    if text.trim().is_empty() {
        return Err(CodecError::empty(FIELD));
    }

    let (first, rest) = split_line(text);
    let start_line = StartLine::parse_with(first, profile)?;

    let (block, body) = split_head(rest);
    if body.len() > limits.max_body_size {
        return Err(CodecError::limit(
            FIELD,
            "body size",
            body.len(),
            limits.max_body_size,
        ));
    }

    let header = if block.trim().is_empty() {
        Header::default()
    } else {
        Header::parse_with(block, profile)?
    };

    Ok(Message {
        start_line,
        header,
        body: body.as_bytes().to_vec(),
    })
}

pub fn serialize_message(message: &Message) -> CodecResult<String> {
    serialize_message_with(message, Profile::global())
}

/// Validate and render: start line, header lines, blank line, body.
pub fn serialize_message_with(message: &Message, profile: &Profile) -> CodecResult<String> {
    let body = std::str::from_utf8(&message.body).map_err(|e| {
        CodecError::pattern(
            FIELD,
            "body",
            format!("invalid byte at offset {}", e.valid_up_to()),
            "UTF-8 text",
        )
    })?;

    let mut out = message.start_line.serialize_with(profile)?;
    out.push_str(&message.header.serialize_with(profile)?);
    out.push_str("\r\n");
    out.push_str(body);
    Ok(out)
}
