//! gbsip - SIP message grammar codec for GB28181 signaling
//!
//! Converts between wire text and typed, validated values for the URI, the
//! Request-Line and Status-Line, fourteen header fields, the header
//! aggregate and whole messages. Every entity implements [`Codec`]; the
//! tables it consults live in an immutable [`Profile`].
//!
//! ```
//! use gbsip::{parse_message, serialize_message};
//!
//! let raw = "SIP/2.0 200 OK\r\nCSeq: 1 REGISTER\r\nContent-Length: 0\r\n\r\n";
//! let message = parse_message(raw).unwrap();
//! assert_eq!(serialize_message(&message).unwrap(), raw);
//! ```

pub mod batch;
pub mod codec;
pub mod error;
pub mod fields;
pub mod headers;
pub mod limits;
pub mod message;
mod parsing;
pub mod profile;
pub mod request_line;
pub mod status;
pub mod status_line;
pub mod types;
pub mod uri;
pub mod validation;

pub use batch::{BatchConfig, BatchParser};
pub use codec::Codec;
pub use error::{CodecError, CodecResult, ErrorKind};
pub use fields::{
    AuthParam, Authorization, CSeq, CallId, Contact, ContentLength, ContentType, Expires,
    FromHeader, MaxForwards, Route, RouteEntry, Rport, ToHeader, UserAgent, Via,
    WwwAuthenticate,
};
pub use headers::{ExtensionField, Header, HeaderName};
pub use limits::ParserLimits;
pub use message::{
    parse_message, parse_message_with, serialize_message, serialize_message_with, Message,
    StartLine,
};
pub use profile::Profile;
pub use request_line::RequestLine;
pub use status::{StatusClass, StatusTable, StatusTables};
pub use status_line::StatusLine;
pub use types::{Algorithm, AuthScheme, Method, Params, Protocol, Scheme, Transport, Version};
pub use uri::Uri;
